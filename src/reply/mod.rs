//! Structured reply schema and validation.
//!
//! The chat model must answer with a JSON object holding a `messages` array
//! of at most [`MAX_REPLY_SEGMENTS`] segments, each carrying the spoken text
//! plus a facial-expression tag and an animation tag drawn from closed
//! vocabularies. [`parse_reply`] turns the model's raw text into validated
//! [`ReplySegment`] values or a [`ConverseError::SchemaViolation`] — invalid
//! output is never coerced into something playable.

mod generator;

pub use generator::{GenerateReplies, ReplyGenerator};

use crate::error::{ConverseError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on segments per model turn.
pub const MAX_REPLY_SEGMENTS: usize = 3;

/// Facial expression the avatar holds while a segment plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacialExpression {
    Smile,
    Sad,
    Angry,
    Surprised,
    FunnyFace,
    Default,
}

/// Body animation the avatar plays during a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    Idle,
    TalkingOne,
    TalkingThree,
    SadIdle,
    Defeated,
    Angry,
    Surprised,
    DismissingGesture,
    ThoughtfulHeadShake,
}

/// One spoken reply unit produced by a model turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplySegment {
    /// Words to be spoken.
    pub text: String,
    /// Expression tag from the closed vocabulary.
    pub facial_expression: FacialExpression,
    /// Animation tag from the closed vocabulary.
    pub animation: Animation,
}

#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    messages: Vec<ReplySegment>,
}

/// Strip a surrounding Markdown code fence, which chat models routinely wrap
/// JSON answers in despite instructions.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse and validate a model's textual output against the reply schema.
///
/// Accepts either the instructed `{"messages": [...]}` object or a bare
/// top-level array. Order of the returned segments is playback order.
///
/// # Errors
///
/// Returns [`ConverseError::SchemaViolation`] when the output is not valid
/// JSON, a field is missing, an enum value is unknown, a segment's text is
/// blank, or more than [`MAX_REPLY_SEGMENTS`] segments are present.
pub fn parse_reply(raw: &str) -> Result<Vec<ReplySegment>> {
    let body = strip_code_fence(raw);

    let segments: Vec<ReplySegment> = if body.starts_with('[') {
        serde_json::from_str(body)
            .map_err(|e| ConverseError::SchemaViolation(format!("invalid reply array: {e}")))?
    } else {
        let envelope: ReplyEnvelope = serde_json::from_str(body)
            .map_err(|e| ConverseError::SchemaViolation(format!("invalid reply object: {e}")))?;
        envelope.messages
    };

    if segments.len() > MAX_REPLY_SEGMENTS {
        return Err(ConverseError::SchemaViolation(format!(
            "{} segments exceeds the maximum of {MAX_REPLY_SEGMENTS}",
            segments.len()
        )));
    }
    for (index, segment) in segments.iter().enumerate() {
        if segment.text.trim().is_empty() {
            return Err(ConverseError::SchemaViolation(format!(
                "segment {index} has empty text"
            )));
        }
    }

    Ok(segments)
}
