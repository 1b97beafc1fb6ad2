// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use doccapture::backends::camera::{CameraBackendType, Facing};
use doccapture::flow::DocumentType;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "doccapture")]
#[command(about = "Photograph identity documents for guide registration")]
#[command(version = doccapture::constants::app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List {
        /// Backend to enumerate (default: from config)
        #[arg(short, long)]
        backend: Option<CameraBackendType>,
    },

    /// List the document types that can be captured
    Documents,

    /// Capture a document and print the resulting form submission
    Capture {
        /// Document type (see 'doccapture documents')
        #[arg(short, long)]
        document: DocumentType,

        /// Camera backend (v4l2, file, test-pattern)
        #[arg(short, long)]
        backend: Option<CameraBackendType>,

        /// Image served by the file backend; repeat for front and back
        #[arg(long = "frame")]
        frames: Vec<PathBuf>,

        /// Camera facing (user or environment)
        #[arg(long)]
        facing: Option<Facing>,

        /// Directory to write the accepted stills to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Accept every still without asking
        #[arg(short, long)]
        yes: bool,

        /// Print the submission as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=doccapture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { backend } => cli::list_cameras(backend),
        Commands::Documents => cli::list_documents(),
        Commands::Capture {
            document,
            backend,
            frames,
            facing,
            output,
            yes,
            json,
        } => cli::capture_document(cli::CaptureOptions {
            document,
            backend,
            frames,
            facing,
            output,
            auto_accept: yes,
            json,
        }),
        Commands::Config { save } => cli::show_config(save),
    }
}
