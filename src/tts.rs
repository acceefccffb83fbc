//! Speech synthesis via an ElevenLabs-compatible HTTP API.
//!
//! One call synthesizes one reply segment's text into an MP3 file at a
//! caller-chosen path. Failures are segment-scoped: the orchestrator drops
//! the affected segment and siblings keep playing.

use crate::config::TtsConfig;
use crate::error::{ConverseError, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Seam between the orchestrator and the speech synthesizer.
#[async_trait]
pub trait SynthesizeSpeech: Send + Sync {
    /// Synthesize `text` and write the audio to `dest`.
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<()>;
}

/// Speech synthesizer backed by an ElevenLabs-compatible API.
pub struct ElevenLabsSynthesizer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabsSynthesizer {
    /// Create a synthesizer from config plus the resolved API key.
    #[must_use]
    pub fn new(config: &TtsConfig, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key,
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
            stability: config.stability,
            similarity_boost: config.similarity_boost,
        }
    }

    fn synthesis_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        format!("{base}/v1/text-to-speech/{}", self.voice_id)
    }
}

#[async_trait]
impl SynthesizeSpeech for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<()> {
        if text.trim().is_empty() {
            return Err(ConverseError::SynthesisFailed(
                "refusing to synthesize empty text".to_owned(),
            ));
        }

        let body = serde_json::json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": self.stability,
                "similarity_boost": self.similarity_boost,
            },
        });

        let response = self
            .http
            .post(self.synthesis_url())
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConverseError::SynthesisFailed(format!("TTS request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ConverseError::SynthesisFailed(format!(
                "TTS provider returned {status}: {detail}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| ConverseError::SynthesisFailed(format!("TTS body read failed: {e}")))?;
        if audio.is_empty() {
            return Err(ConverseError::SynthesisFailed(
                "TTS provider returned an empty payload".to_owned(),
            ));
        }

        tokio::fs::write(dest, &audio).await?;
        debug!(path = %dest.display(), bytes = audio.len(), "segment audio written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn synthesis_url_embeds_the_voice() {
        let config = TtsConfig {
            api_url: "https://api.elevenlabs.io/".to_owned(),
            voice_id: "voice-123".to_owned(),
            ..Default::default()
        };
        let synth = ElevenLabsSynthesizer::new(&config, "key".to_owned());
        assert_eq!(
            synth.synthesis_url(),
            "https://api.elevenlabs.io/v1/text-to-speech/voice-123"
        );
    }

    #[tokio::test]
    async fn empty_text_fails_without_a_network_call() {
        let synth = ElevenLabsSynthesizer::new(&TtsConfig::default(), "key".to_owned());
        let err = synth
            .synthesize("   ", Path::new("/nonexistent/out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConverseError::SynthesisFailed(_)));
    }
}
