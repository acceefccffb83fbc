//! Mock pipeline stages shared by the integration tests.
//!
//! Each mock implements one stage seam with scripted behavior, so the
//! orchestrator's failure policy can be exercised without network access
//! or external binaries.

#![allow(dead_code)]

use async_trait::async_trait;
use solace::error::{ConverseError, Result};
use solace::lipsync::{AlignPhonemes, ConvertAudio, MouthShape, VisemeCue};
use solace::reply::{Animation, FacialExpression, GenerateReplies, ReplySegment};
use solace::tts::SynthesizeSpeech;
use std::path::Path;

/// Build a segment with the given text and default tags.
pub fn segment(text: &str) -> ReplySegment {
    ReplySegment {
        text: text.to_owned(),
        facial_expression: FacialExpression::Default,
        animation: Animation::Idle,
    }
}

/// Scripted generator outcome.
pub enum GeneratorScript {
    Segments(Vec<ReplySegment>),
    SchemaViolation,
    Upstream,
}

pub struct MockGenerator(pub GeneratorScript);

#[async_trait]
impl GenerateReplies for MockGenerator {
    async fn generate(&self, _question: &str) -> Result<Vec<ReplySegment>> {
        match &self.0 {
            GeneratorScript::Segments(segments) => Ok(segments.clone()),
            GeneratorScript::SchemaViolation => Err(ConverseError::SchemaViolation(
                "4 segments exceeds the maximum of 3".to_owned(),
            )),
            GeneratorScript::Upstream => Err(ConverseError::UpstreamUnavailable(
                "chat provider returned 503".to_owned(),
            )),
        }
    }
}

/// Synthesizer that writes the segment text as fake MP3 bytes, failing for
/// any text listed in `fail_texts`.
#[derive(Default)]
pub struct MockSynthesizer {
    pub fail_texts: Vec<String>,
}

#[async_trait]
impl SynthesizeSpeech for MockSynthesizer {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<()> {
        if self.fail_texts.iter().any(|t| t == text) {
            return Err(ConverseError::SynthesisFailed(format!(
                "scripted failure for {text:?}"
            )));
        }
        tokio::fs::write(dest, text.as_bytes()).await?;
        Ok(())
    }
}

/// Converter that copies the source file, optionally failing every call.
#[derive(Default)]
pub struct MockConverter {
    pub fail: bool,
}

#[async_trait]
impl ConvertAudio for MockConverter {
    async fn convert(&self, src: &Path, dest: &Path) -> Result<()> {
        if self.fail {
            return Err(ConverseError::ConversionFailed(
                "scripted transcode failure".to_owned(),
            ));
        }
        tokio::fs::copy(src, dest).await?;
        Ok(())
    }
}

/// Aligner returning a fixed two-cue timeline, optionally failing every call.
#[derive(Default)]
pub struct MockAligner {
    pub fail: bool,
}

#[async_trait]
impl AlignPhonemes for MockAligner {
    async fn align(&self, _wav: &Path, _cue_path: &Path) -> Result<Vec<VisemeCue>> {
        if self.fail {
            return Err(ConverseError::AlignmentFailed(
                "scripted alignment failure".to_owned(),
            ));
        }
        Ok(vec![
            VisemeCue {
                start: 0.0,
                end: 0.25,
                value: MouthShape::B,
            },
            VisemeCue {
                start: 0.25,
                end: 0.5,
                value: MouthShape::X,
            },
        ])
    }
}
