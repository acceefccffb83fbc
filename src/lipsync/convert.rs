//! MP3 → WAV re-encoding via ffmpeg.

use super::tool::{ToolPaths, run_tool};
use crate::config::LipsyncConfig;
use crate::error::{ConverseError, Result};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Seam between the orchestrator and the audio converter.
#[async_trait]
pub trait ConvertAudio: Send + Sync {
    /// Re-encode the synthesized audio at `src` into a WAV at `dest`.
    async fn convert(&self, src: &Path, dest: &Path) -> Result<()>;
}

/// Audio converter backed by an ffmpeg subprocess.
pub struct FfmpegConverter {
    ffmpeg: std::path::PathBuf,
    deadline: Duration,
}

impl FfmpegConverter {
    /// Create a converter from the discovered tool paths.
    #[must_use]
    pub fn new(tools: &ToolPaths, config: &LipsyncConfig) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            deadline: Duration::from_secs(config.convert_timeout_secs),
        }
    }
}

#[async_trait]
impl ConvertAudio for FfmpegConverter {
    async fn convert(&self, src: &Path, dest: &Path) -> Result<()> {
        // The aligner is format-sensitive: 16-bit mono PCM at 44.1 kHz.
        let args: &[&OsStr] = &[
            OsStr::new("-y"),
            OsStr::new("-loglevel"),
            OsStr::new("error"),
            OsStr::new("-i"),
            src.as_os_str(),
            OsStr::new("-ar"),
            OsStr::new("44100"),
            OsStr::new("-ac"),
            OsStr::new("1"),
            OsStr::new("-acodec"),
            OsStr::new("pcm_s16le"),
            dest.as_os_str(),
        ];

        run_tool(&self.ffmpeg, args, self.deadline)
            .await
            .map_err(|e| {
                ConverseError::ConversionFailed(format!("{}: {e}", src.display()))
            })?;
        debug!(src = %src.display(), dest = %dest.display(), "audio converted");
        Ok(())
    }
}
