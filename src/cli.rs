// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras and document types
//! - Capturing a document interactively (or with `--yes`)
//! - Showing and saving the configuration

use doccapture::backends::camera::{CameraBackendType, Facing, MediaAcquisition};
use doccapture::backends::create_source;
use doccapture::config::Config;
use doccapture::constants::timing;
use doccapture::errors::{AppError, AppResult};
use doccapture::flow::binder::{DEFAULT_FILE_INPUT, DEFAULT_PREVIEW};
use doccapture::flow::{
    BindingTarget, CaptureSession, CaptureSurface, DocumentType, FormDocument, SurfaceStatus,
};
use doccapture::pipelines::photo::{FrameCapture, StillImage};
use doccapture::storage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type StdinLines = Lines<BufReader<Stdin>>;

/// Options of the `capture` command
pub struct CaptureOptions {
    pub document: DocumentType,
    pub backend: Option<CameraBackendType>,
    pub frames: Vec<PathBuf>,
    pub facing: Option<Facing>,
    pub output: Option<PathBuf>,
    pub auto_accept: bool,
    pub json: bool,
}

/// List all available cameras
pub fn list_cameras(backend: Option<CameraBackendType>) -> Result<(), Box<dyn std::error::Error>> {
    let backend = backend.unwrap_or(Config::load().backend);
    let source = create_source(backend, Vec::new());
    let cameras = source.enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found ({} backend).", backend);
        return Ok(());
    }

    println!("Available cameras ({} backend):", backend);
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Facing: {}", camera.facing);
        if let Some(info) = &camera.device_info {
            println!("      Driver: {} ({})", info.driver, info.real_path);
        } else {
            println!("      Path: {}", camera.path);
        }
    }

    Ok(())
}

/// List the document catalog
pub fn list_documents() -> Result<(), Box<dyn std::error::Error>> {
    println!("Document types:");
    println!();
    for document in DocumentType::ALL {
        let sides: Vec<&str> = document
            .kind()
            .required_sides()
            .iter()
            .map(|s| s.as_str())
            .collect();
        println!(
            "  {:<16} {:<24} {}",
            document.as_str(),
            document.label(),
            sides.join(" + ")
        );
    }
    Ok(())
}

/// Print the effective configuration, optionally saving it
pub fn show_config(save: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        let path = config.save()?;
        println!();
        println!("Saved to {}", path.display());
    } else if let Some(path) = Config::default_path() {
        println!();
        println!("Config file: {}", path.display());
    }
    Ok(())
}

/// Capture a document and print the submission
pub fn capture_document(options: CaptureOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    if let Some(backend) = options.backend {
        config.backend = backend;
    } else if !options.frames.is_empty() {
        config.backend = CameraBackendType::File;
    }
    if let Some(facing) = options.facing {
        config.preferred_facing = facing;
    }
    let output_dir = options.output.clone().or_else(|| config.output_dir.clone());

    let source = create_source(config.backend, options.frames.clone());
    let mut surface = CaptureSurface::from_config(source, "cli", &config, BindingTarget::default());
    let mut form = FormDocument::new()
        .with_file_input(DEFAULT_FILE_INPUT)
        .with_preview(DEFAULT_PREVIEW);

    let runtime = tokio::runtime::Runtime::new()?;
    let session = runtime.block_on(async {
        let mut input = BufReader::new(tokio::io::stdin()).lines();
        run_capture(
            &mut surface,
            &mut form,
            options.document,
            options.auto_accept,
            config.backend,
            &mut input,
        )
        .await?;
        let session = surface.submit(&mut form)?;

        if let Some(dir) = &output_dir {
            save_session(&session, dir).await?;
        }
        Ok::<_, AppError>(session)
    })?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&form.submission_summary())?);
    } else {
        println!();
        println!(
            "Captured {} ({}), session {}",
            session.document().label(),
            session.photo_mode(),
            session.id()
        );
        for (key, value) in form.values() {
            match value.as_file() {
                Some(file) => println!(
                    "  {}: {} ({}, {} bytes)",
                    key,
                    file.name,
                    file.mime_type,
                    file.size()
                ),
                None => println!("  {}: {}", key, value.as_text().unwrap_or_default()),
            }
        }
    }

    Ok(())
}

/// Drive the surface until every side is accepted
async fn run_capture(
    surface: &mut CaptureSurface,
    form: &mut FormDocument,
    document: DocumentType,
    auto_accept: bool,
    backend: CameraBackendType,
    input: &mut StdinLines,
) -> AppResult<()> {
    surface.start_session(document);
    eprintln!(
        "Capturing {} ({} side(s))",
        document.label(),
        document.kind().required_sides().len()
    );

    loop {
        match surface.status().clone() {
            SurfaceStatus::Complete => return Ok(()),
            SurfaceStatus::Idle | SurfaceStatus::Acquiring => {
                // A refused camera moves the surface to FallbackRequired
                match surface.open_camera().await {
                    Err(e) if !e.needs_fallback() => return Err(e.into()),
                    _ => {}
                }
            }
            SurfaceStatus::Live => {
                wait_for_first_frame(surface.acquisition()).await?;
                if backend == CameraBackendType::V4l2 {
                    tokio::time::sleep(timing::CAMERA_WARMUP).await;
                }
                surface.capture().await?;
            }
            SurfaceStatus::Reviewing => review(surface, form, auto_accept, input).await?,
            SurfaceStatus::FallbackRequired { reason } => {
                eprintln!("Camera unavailable: {}", reason);
                if auto_accept {
                    return Err(AppError::Other(
                        "camera unavailable; use --backend file --frame <path>".into(),
                    ));
                }
                let side = surface.current_side().map(|s| s.as_str()).unwrap_or("document");
                eprint!("Path to an image of the {} side (empty to quit): ", side);
                let Some(line) = next_line(input).await? else {
                    return Err(AppError::Other("capture cancelled".into()));
                };
                if line.is_empty() {
                    return Err(AppError::Other("capture cancelled".into()));
                }
                if let Err(e) = surface.select_file(Path::new(&line)).await {
                    eprintln!("Could not use {}: {}", line, e);
                }
            }
        }
    }
}

/// Review the staged still
async fn review(
    surface: &mut CaptureSurface,
    form: &mut FormDocument,
    auto_accept: bool,
    input: &mut StdinLines,
) -> AppResult<()> {
    let side = surface.current_side().map(|s| s.as_str()).unwrap_or("document");
    if let Some(still) = surface.session().and_then(CaptureSession::pending) {
        eprintln!("{} side: {}", side, describe(still));
    }

    if auto_accept {
        surface.accept(form).await?;
        return Ok(());
    }

    eprint!("[a]ccept, [r]etake, [f <path>] use a file, [q]uit: ");
    let Some(line) = next_line(input).await? else {
        return Err(AppError::Other("capture cancelled".into()));
    };

    match line.split_once(' ').map_or((line.as_str(), ""), |(c, rest)| (c, rest.trim())) {
        ("a", _) | ("accept", _) => {
            surface.accept(form).await?;
        }
        ("r", _) | ("retake", _) => surface.retake().await?,
        ("f", path) | ("file", path) if !path.is_empty() => {
            if let Err(e) = surface.select_file(Path::new(path)).await {
                eprintln!("Could not use {}: {}", path, e);
            }
        }
        ("q", _) | ("quit", _) => {
            surface.cancel();
            return Err(AppError::Other("capture cancelled".into()));
        }
        _ => eprintln!("Unrecognised answer: {}", line),
    }
    Ok(())
}

async fn next_line(input: &mut StdinLines) -> AppResult<Option<String>> {
    Ok(input.next_line().await?.map(|l| l.trim().to_string()))
}

/// Poll until the active handle has decoded a usable frame
async fn wait_for_first_frame(acquisition: &MediaAcquisition) -> AppResult<()> {
    let start = Instant::now();
    while start.elapsed() < timing::FIRST_FRAME_TIMEOUT {
        if FrameCapture::current_frame(acquisition).is_ok() {
            return Ok(());
        }
        tokio::time::sleep(timing::FIRST_FRAME_POLL_INTERVAL).await;
    }
    Err(AppError::Other(format!(
        "no frame received from the camera within {:?}",
        timing::FIRST_FRAME_TIMEOUT
    )))
}

fn describe(still: &StillImage) -> String {
    format!(
        "{}x{} {} ({} bytes, from {})",
        still.width,
        still.height,
        still.mime_type(),
        still.len(),
        still.origin
    )
}

async fn save_session(session: &CaptureSession, dir: &Path) -> AppResult<()> {
    for (side, still) in session.captured_images() {
        let stem = format!("{}_{}", session.document(), side);
        let path = storage::save_still(still, dir, &stem).await?;
        eprintln!("Saved {}", path.display());
    }
    Ok(())
}
