//! Message types crossing the pipeline boundary.

use crate::lipsync::VisemeCue;
use crate::reply::{Animation, FacialExpression};
use serde::{Deserialize, Serialize};

/// One user turn. Lives only for the duration of a pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRequest {
    /// Raw user utterance.
    pub question: String,
}

/// Playback-ready unit for one reply segment.
///
/// Field names follow the frontend contract (camelCase on the wire).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBundle {
    /// Spoken text, copied from the segment.
    pub text: String,
    /// Expression tag, copied from the segment.
    pub facial_expression: FacialExpression,
    /// Animation tag, copied from the segment.
    pub animation: Animation,
    /// Base64-encoded MP3 payload.
    pub audio: String,
    /// Mouth-shape timeline covering the audio.
    pub visemes: Vec<VisemeCue>,
}

/// Ordered bundles for one turn, in original segment order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationResponse {
    /// At most one bundle per generated segment; failed segments are absent.
    pub messages: Vec<ReplyBundle>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::lipsync::MouthShape;

    #[test]
    fn bundle_serializes_with_frontend_field_names() {
        let bundle = ReplyBundle {
            text: "Hi there!".to_owned(),
            facial_expression: FacialExpression::Smile,
            animation: Animation::TalkingOne,
            audio: "bW9jaw==".to_owned(),
            visemes: vec![VisemeCue {
                start: 0.0,
                end: 0.4,
                value: MouthShape::B,
            }],
        };
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["facialExpression"], "smile");
        assert_eq!(json["animation"], "TalkingOne");
        assert_eq!(json["visemes"][0]["value"], "B");
        assert!(json.get("facial_expression").is_none());
    }
}
