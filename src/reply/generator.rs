//! Chat-completion client producing structured replies.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (the default
//! config points at Gemini's compatibility surface). Each call is stateless:
//! the request carries only the fixed system instruction and the user's
//! question, never prior turns.

use super::{ReplySegment, parse_reply};
use crate::config::ChatConfig;
use crate::error::{ConverseError, Result};
use async_trait::async_trait;
use tracing::debug;

/// Persona and output-format instruction sent as the system message.
///
/// The closed vocabularies here must stay in lockstep with
/// [`FacialExpression`](super::FacialExpression) and
/// [`Animation`](super::Animation).
const SYSTEM_PROMPT: &str = "\
You are Jack, a world traveler.
You will always respond with a single JSON object of the form \
{\"messages\": [...]}, with a maximum of 3 messages. Do not wrap the JSON \
in a code fence and do not add any prose outside it.
Each message has properties for text, facialExpression, and animation.
The different facial expressions are: smile, sad, angry, surprised, \
funnyFace, and default.
The different animations are: Idle, TalkingOne, TalkingThree, SadIdle, \
Defeated, Angry, Surprised, DismissingGesture and ThoughtfulHeadShake.";

/// Seam between the orchestrator and the reply generator.
#[async_trait]
pub trait GenerateReplies: Send + Sync {
    /// Produce at most [`MAX_REPLY_SEGMENTS`](super::MAX_REPLY_SEGMENTS)
    /// validated segments for one user question.
    async fn generate(&self, question: &str) -> Result<Vec<ReplySegment>>;
}

/// Structured reply generator backed by an OpenAI-compatible API.
pub struct ReplyGenerator {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ReplyGenerator {
    /// Create a generator from config plus the resolved API key.
    #[must_use]
    pub fn new(config: &ChatConfig, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key,
            model: config.api_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn completions_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

/// Build the JSON request body for one structured-reply turn.
fn build_chat_body(
    model: &str,
    question: &str,
    temperature: f32,
    max_tokens: u32,
) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": question},
        ],
        "temperature": temperature,
        "max_tokens": max_tokens,
    })
}

/// Pull the assistant text out of a completion response.
fn extract_content(completion: &serde_json::Value) -> Result<&str> {
    completion["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            ConverseError::UpstreamUnavailable(
                "completion response has no message content".to_owned(),
            )
        })
}

#[async_trait]
impl GenerateReplies for ReplyGenerator {
    async fn generate(&self, question: &str) -> Result<Vec<ReplySegment>> {
        let body = build_chat_body(&self.model, question, self.temperature, self.max_tokens);

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConverseError::UpstreamUnavailable(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ConverseError::UpstreamUnavailable(format!(
                "chat provider returned {status}: {}",
                truncate(&detail, 512)
            )));
        }

        let completion: serde_json::Value = response.json().await.map_err(|e| {
            ConverseError::UpstreamUnavailable(format!("invalid completion response: {e}"))
        })?;

        let content = extract_content(&completion)?;
        debug!(len = content.len(), "chat completion received");
        parse_reply(content)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
