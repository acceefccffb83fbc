//! Per-turn orchestration: generate → synthesize → convert → align → bundle.
//!
//! One [`PipelineCoordinator::converse`] call handles one user turn. The
//! generator step is whole-request: if the model's reply cannot be trusted,
//! nothing is played. The three per-segment stages are isolated: a failing
//! segment is logged and dropped while its siblings still produce bundles,
//! and only when every segment fails does the turn fail. Intermediate audio
//! artifacts live in a per-request directory and are removed by RAII guards
//! whether a segment succeeds or not.

use crate::error::{ConverseError, Result};
use crate::lipsync::{AlignPhonemes, ConvertAudio};
use crate::pipeline::messages::{ConversationRequest, ConversationResponse, ReplyBundle};
use crate::reply::{GenerateReplies, ReplySegment};
use crate::tts::SynthesizeSpeech;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Scratch directory for one request, removed when the turn ends.
struct RequestWorkspace {
    dir: PathBuf,
}

impl RequestWorkspace {
    /// Create `root/<request_id>/` for this turn's artifacts.
    async fn create(root: &Path, request_id: Uuid) -> Result<Self> {
        let dir = root.join(request_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(dir = %self.dir.display(), error = %e, "request workspace not removed");
        }
    }
}

/// Artifact paths for one segment, removed on drop (success or failure).
struct SegmentArtifacts {
    mp3: PathBuf,
    wav: PathBuf,
    cues: PathBuf,
}

impl SegmentArtifacts {
    fn new(dir: &Path, index: usize) -> Self {
        Self {
            mp3: dir.join(format!("message_{index}.mp3")),
            wav: dir.join(format!("message_{index}.wav")),
            cues: dir.join(format!("message_{index}.json")),
        }
    }
}

impl Drop for SegmentArtifacts {
    fn drop(&mut self) {
        for path in [&self.mp3, &self.wav, &self.cues] {
            if let Err(e) = std::fs::remove_file(path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %path.display(), error = %e, "segment artifact not removed");
            }
        }
    }
}

/// Drives the end-to-end flow for each incoming user turn.
///
/// Stages are injected behind their traits, so tests can exercise the
/// failure policy without network or subprocess access.
pub struct PipelineCoordinator {
    generator: Box<dyn GenerateReplies>,
    synthesizer: Box<dyn SynthesizeSpeech>,
    converter: Box<dyn ConvertAudio>,
    aligner: Box<dyn AlignPhonemes>,
    artifact_root: PathBuf,
}

impl PipelineCoordinator {
    /// Assemble a coordinator from its four stages and the artifact root.
    #[must_use]
    pub fn new(
        generator: Box<dyn GenerateReplies>,
        synthesizer: Box<dyn SynthesizeSpeech>,
        converter: Box<dyn ConvertAudio>,
        aligner: Box<dyn AlignPhonemes>,
        artifact_root: PathBuf,
    ) -> Self {
        Self {
            generator,
            synthesizer,
            converter,
            aligner,
            artifact_root,
        }
    }

    /// Handle one user turn.
    ///
    /// Segments run sequentially in generation order, so response order
    /// equals segment order minus any dropped segments.
    ///
    /// # Errors
    ///
    /// - [`ConverseError::SchemaViolation`] / [`ConverseError::UpstreamUnavailable`]
    ///   from the generator fail the whole turn with no partial reply.
    /// - [`ConverseError::AllSegmentsFailed`] when at least one segment was
    ///   generated and every one failed its sub-pipeline.
    pub async fn converse(&self, request: &ConversationRequest) -> Result<ConversationResponse> {
        let request_id = Uuid::new_v4();
        info!(%request_id, phase = "generating", "turn received");

        let segments = self.generator.generate(&request.question).await?;
        if segments.is_empty() {
            info!(%request_id, phase = "assembled", "model returned no segments");
            return Ok(ConversationResponse::default());
        }

        let workspace = RequestWorkspace::create(&self.artifact_root, request_id).await?;

        let mut bundles = Vec::with_capacity(segments.len());
        let mut failure_kinds = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            match self.run_segment(workspace.dir(), index, segment).await {
                Ok(bundle) => bundles.push(bundle),
                Err(e) => {
                    warn!(
                        %request_id,
                        segment = index,
                        kind = e.kind(),
                        error = %e,
                        "segment dropped"
                    );
                    failure_kinds.push(e.kind());
                }
            }
        }

        if bundles.is_empty() {
            return Err(ConverseError::AllSegmentsFailed(format!(
                "{} segment(s) failed: {}",
                segments.len(),
                failure_kinds.join(", ")
            )));
        }

        info!(
            %request_id,
            phase = "assembled",
            bundles = bundles.len(),
            dropped = failure_kinds.len(),
            "turn complete"
        );
        Ok(ConversationResponse { messages: bundles })
    }

    /// Run the synthesize → convert → align sub-pipeline for one segment.
    async fn run_segment(
        &self,
        dir: &Path,
        index: usize,
        segment: &ReplySegment,
    ) -> Result<ReplyBundle> {
        let artifacts = SegmentArtifacts::new(dir, index);

        debug!(segment = index, stage = "synthesizing");
        self.synthesizer
            .synthesize(&segment.text, &artifacts.mp3)
            .await?;

        debug!(segment = index, stage = "converting");
        self.converter.convert(&artifacts.mp3, &artifacts.wav).await?;

        debug!(segment = index, stage = "aligning");
        let visemes = self.aligner.align(&artifacts.wav, &artifacts.cues).await?;

        // Playback audio is the synthesized MP3; read it before the
        // artifacts guard removes it.
        let audio = tokio::fs::read(&artifacts.mp3).await?;
        debug!(segment = index, stage = "bundled");

        Ok(ReplyBundle {
            text: segment.text.clone(),
            facial_expression: segment.facial_expression,
            animation: segment.animation,
            audio: BASE64.encode(audio),
            visemes,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn request_workspace_removes_its_directory_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let dir = {
            let workspace = RequestWorkspace::create(root.path(), id).await.unwrap();
            std::fs::write(workspace.dir().join("leftover.bin"), b"x").unwrap();
            workspace.dir().to_owned()
        };
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn segment_artifacts_remove_their_files_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let mp3;
        {
            let artifacts = SegmentArtifacts::new(root.path(), 0);
            std::fs::write(&artifacts.mp3, b"audio").unwrap();
            std::fs::write(&artifacts.wav, b"wave").unwrap();
            // No cue file: drop must tolerate files that were never created.
            mp3 = artifacts.mp3.clone();
        }
        assert!(!mp3.exists());
        assert!(!root.path().join("message_0.wav").exists());
    }

    #[test]
    fn artifact_names_are_namespaced_by_segment() {
        let artifacts = SegmentArtifacts::new(Path::new("/scratch/req"), 2);
        assert_eq!(artifacts.mp3, Path::new("/scratch/req/message_2.mp3"));
        assert_eq!(artifacts.wav, Path::new("/scratch/req/message_2.wav"));
        assert_eq!(artifacts.cues, Path::new("/scratch/req/message_2.json"));
    }
}
