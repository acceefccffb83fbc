//! External tool discovery and bounded subprocess execution.
//!
//! Lookup order for each binary: explicit config path, the app-local `bin/`
//! directory, then `PATH`. Platform differences (the `.exe` suffix) live
//! here so the converter and aligner stay platform-agnostic.

use crate::config::LipsyncConfig;
use crate::error::{ConverseError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Resolved locations of the external tools, discovered once at startup.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    /// Media transcoder.
    pub ffmpeg: PathBuf,
    /// Forced-alignment binary.
    pub rhubarb: PathBuf,
}

impl ToolPaths {
    /// Locate both tools, honoring config overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConverseError::Config`] naming the missing binary.
    pub fn discover(config: &LipsyncConfig) -> Result<Self> {
        Ok(Self {
            ffmpeg: locate("ffmpeg", config.ffmpeg_path.as_deref())?,
            rhubarb: locate("rhubarb", config.rhubarb_path.as_deref())?,
        })
    }
}

#[cfg(windows)]
fn binary_name(name: &str) -> String {
    format!("{name}.exe")
}

#[cfg(not(windows))]
fn binary_name(name: &str) -> String {
    name.to_owned()
}

fn locate(name: &str, override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path.to_owned());
        }
        return Err(ConverseError::Config(format!(
            "configured {name} path does not exist: {}",
            path.display()
        )));
    }

    let local = PathBuf::from("bin").join(binary_name(name));
    if local.is_file() {
        return Ok(local);
    }

    which::which(name).map_err(|_| {
        ConverseError::Config(format!(
            "{name} not found: install it on PATH or set lipsync.{name}_path"
        ))
    })
}

/// Run an external tool to completion with a deadline.
///
/// The child is spawned with `kill_on_drop`, so a timeout or a cancelled
/// request terminates the process instead of leaking it. Failures return a
/// plain message (including the stderr tail on non-zero exit) for the caller
/// to wrap in its own error variant.
pub(crate) async fn run_tool(
    program: &Path,
    args: &[&OsStr],
    deadline: Duration,
) -> std::result::Result<(), String> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("failed to spawn {}: {e}", program.display()))?;

    let output = timeout(deadline, child.wait_with_output())
        .await
        .map_err(|_| format!("{} timed out after {}s", program.display(), deadline.as_secs()))?
        .map_err(|e| format!("{} did not complete: {e}", program.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            tail(&stderr, 800)
        ));
    }

    Ok(())
}

/// Last `max` characters of a diagnostic stream.
fn tail(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s.trim();
    }
    let skip = count - max;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => s[idx..].trim(),
        None => s.trim(),
    }
}
