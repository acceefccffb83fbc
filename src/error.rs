//! Error types for the conversation pipeline.

/// Top-level error type for the avatar conversation backend.
///
/// Variants split into whole-request errors (a generator failure poisons the
/// entire turn), segment-scoped errors (one spoken message is dropped, its
/// siblings survive), and startup errors.
#[derive(Debug, thiserror::Error)]
pub enum ConverseError {
    /// Model output is not valid JSON or violates the reply schema.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Chat-completion provider unreachable or returned an error status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Speech synthesis failed for one segment.
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Audio transcoding process failed for one segment.
    #[error("conversion failed: {0}")]
    ConversionFailed(String),

    /// Forced alignment failed for one segment.
    #[error("alignment failed: {0}")]
    AlignmentFailed(String),

    /// Every segment of a turn failed its sub-pipeline.
    #[error("all segments failed: {0}")]
    AllSegmentsFailed(String),

    /// Missing credentials, missing external binaries, or invalid config.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverseError {
    /// Short stable name for the error kind, used in per-segment logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SchemaViolation(_) => "schema_violation",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::SynthesisFailed(_) => "synthesis_failed",
            Self::ConversionFailed(_) => "conversion_failed",
            Self::AlignmentFailed(_) => "alignment_failed",
            Self::AllSegmentsFailed(_) => "all_segments_failed",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ConverseError>;
