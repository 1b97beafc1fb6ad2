// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=DOCCAPTURE_VERSION");

    // Packagers may pin the version explicitly
    let version = std::env::var("DOCCAPTURE_VERSION").unwrap_or_else(|_| git_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `0.1.0-abcdef1` at a tag, `0.1.0-dirty-abcdef1` past it, the package
/// version when git is unavailable.
fn git_version() -> String {
    let described = run_git(&["describe", "--tags", "--always", "--match", "v*"]);
    let commit = run_git(&["rev-parse", "--short", "HEAD"]);

    let Some(described) = described else {
        return match commit {
            Some(hash) => format!("{}-{}", env!("CARGO_PKG_VERSION"), hash),
            None => env!("CARGO_PKG_VERSION").to_string(),
        };
    };

    let described = described.strip_prefix('v').unwrap_or(&described);

    // version-commits-ghash
    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() == 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        return format!("{}-dirty-{}", parts[2], hash);
    }

    match commit {
        Some(hash) if hash != described => format!("{}-{}", described, hash),
        _ => described.to_string(),
    }
}

fn run_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
