//! Forced alignment via the Rhubarb lip-sync binary.
//!
//! Rhubarb's phonetic mode writes a JSON cue file mapping time spans to
//! mouth shapes. The cue sequence is validated before it reaches playback:
//! cue starts must be non-decreasing and every cue must have `end >= start`.
//! Gaps between cues are legal and mean "mouth closed".

use super::tool::{ToolPaths, run_tool};
use crate::config::LipsyncConfig;
use crate::error::{ConverseError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Rhubarb mouth shapes (Preston Blair set plus extensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouthShape {
    /// Closed mouth for /p/, /b/, /m/.
    A,
    /// Slightly open, teeth visible.
    B,
    /// Open mouth, /eh/-like vowels.
    C,
    /// Wide open mouth, /a/-like vowels.
    D,
    /// Rounded mouth, /o/-like vowels.
    E,
    /// Puckered lips, /u/ and /w/.
    F,
    /// Upper teeth on lower lip, /f/ and /v/.
    G,
    /// Tongue raised behind upper teeth, long /l/.
    H,
    /// Idle/rest position between words.
    X,
}

/// One timestamped mouth-shape cue within a segment's audio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisemeCue {
    /// Offset of the cue start within the audio, in seconds.
    pub start: f64,
    /// Offset of the cue end, in seconds.
    pub end: f64,
    /// Mouth shape to display over the span.
    pub value: MouthShape,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CueFile {
    mouth_cues: Vec<VisemeCue>,
}

/// Check the ordering invariants of a cue sequence.
///
/// An empty sequence is valid (silent audio).
pub(crate) fn validate_cues(cues: &[VisemeCue]) -> std::result::Result<(), String> {
    let mut previous_start = 0.0_f64;
    for (index, cue) in cues.iter().enumerate() {
        if !cue.start.is_finite() || !cue.end.is_finite() {
            return Err(format!("cue {index} has a non-finite timestamp"));
        }
        if cue.start < 0.0 {
            return Err(format!("cue {index} starts before zero: {}", cue.start));
        }
        if cue.end < cue.start {
            return Err(format!(
                "cue {index} ends before it starts: {} < {}",
                cue.end, cue.start
            ));
        }
        if cue.start < previous_start {
            return Err(format!(
                "cue {index} starts before its predecessor: {} < {previous_start}",
                cue.start
            ));
        }
        previous_start = cue.start;
    }
    Ok(())
}

/// Seam between the orchestrator and the phoneme aligner.
#[async_trait]
pub trait AlignPhonemes: Send + Sync {
    /// Align the WAV at `wav`, writing the tool's cue file to `cue_path`,
    /// and return the validated cue sequence.
    async fn align(&self, wav: &Path, cue_path: &Path) -> Result<Vec<VisemeCue>>;
}

/// Phoneme aligner backed by a Rhubarb subprocess.
pub struct RhubarbAligner {
    rhubarb: std::path::PathBuf,
    deadline: Duration,
}

impl RhubarbAligner {
    /// Create an aligner from the discovered tool paths.
    #[must_use]
    pub fn new(tools: &ToolPaths, config: &LipsyncConfig) -> Self {
        Self {
            rhubarb: tools.rhubarb.clone(),
            deadline: Duration::from_secs(config.align_timeout_secs),
        }
    }
}

#[async_trait]
impl AlignPhonemes for RhubarbAligner {
    async fn align(&self, wav: &Path, cue_path: &Path) -> Result<Vec<VisemeCue>> {
        let args: &[&OsStr] = &[
            OsStr::new("-f"),
            OsStr::new("json"),
            OsStr::new("-o"),
            cue_path.as_os_str(),
            wav.as_os_str(),
            OsStr::new("-r"),
            OsStr::new("phonetic"),
        ];

        run_tool(&self.rhubarb, args, self.deadline)
            .await
            .map_err(|e| ConverseError::AlignmentFailed(format!("{}: {e}", wav.display())))?;

        let raw = tokio::fs::read_to_string(cue_path).await.map_err(|e| {
            ConverseError::AlignmentFailed(format!(
                "cue file {} unreadable: {e}",
                cue_path.display()
            ))
        })?;
        parse_cue_file(&raw)
    }
}

/// Parse and validate a Rhubarb JSON cue file.
pub(crate) fn parse_cue_file(raw: &str) -> Result<Vec<VisemeCue>> {
    let file: CueFile = serde_json::from_str(raw)
        .map_err(|e| ConverseError::AlignmentFailed(format!("cue file parse failed: {e}")))?;
    validate_cues(&file.mouth_cues)
        .map_err(|e| ConverseError::AlignmentFailed(format!("cue sequence invalid: {e}")))?;
    debug!(cues = file.mouth_cues.len(), "alignment parsed");
    Ok(file.mouth_cues)
}
