//! Configuration types for the conversation backend.
//!
//! All settings are read once at startup (optionally from a TOML file) and
//! injected into the components that need them. Credentials are NOT stored
//! here — they are resolved from the environment by [`crate::credentials`]
//! so that config files can be committed without leaking secrets.

use crate::error::{ConverseError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for the conversation backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolaceConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Chat-completion provider settings.
    pub chat: ChatConfig,
    /// Text-to-speech provider settings.
    pub tts: TtsConfig,
    /// Transcoder / aligner settings.
    pub lipsync: LipsyncConfig,
    /// Intermediate audio artifact settings.
    pub artifacts: ArtifactConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_owned(),
        }
    }
}

/// Chat-completion provider configuration.
///
/// The default endpoint is Gemini's OpenAI-compatible surface; any server
/// implementing `/chat/completions` works (`api_url` must include the
/// version prefix, e.g. `https://api.openai.com/v1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of the OpenAI-compatible API, including the version prefix.
    pub api_url: String,
    /// Model identifier to request.
    pub api_model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate per reply.
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_owned(),
            api_model: "gemini-2.5-pro".to_owned(),
            // Low temperature keeps the reply format stable.
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

/// Text-to-speech provider configuration (ElevenLabs-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Base URL of the TTS API.
    pub api_url: String,
    /// Voice to synthesize with.
    pub voice_id: String,
    /// TTS model identifier.
    pub model_id: String,
    /// Voice stability (0.0–1.0).
    pub stability: f32,
    /// Voice similarity boost (0.0–1.0).
    pub similarity_boost: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.elevenlabs.io".to_owned(),
            // "Rachel" — the provider's stock conversational voice.
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_owned(),
            model_id: "eleven_monolingual_v1".to_owned(),
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// Transcoder / forced-aligner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LipsyncConfig {
    /// Explicit path to the ffmpeg binary (None = look up on PATH).
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit path to the rhubarb binary (None = look up on PATH).
    pub rhubarb_path: Option<PathBuf>,
    /// Timeout in seconds for a single transcode run.
    pub convert_timeout_secs: u64,
    /// Timeout in seconds for a single alignment run.
    ///
    /// Alignment is CPU-bound and scales with audio length; the default
    /// comfortably covers the longest reply a 3-message turn can produce.
    pub align_timeout_secs: u64,
}

impl Default for LipsyncConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            rhubarb_path: None,
            convert_timeout_secs: 30,
            align_timeout_secs: 120,
        }
    }
}

/// Intermediate audio artifact configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory for per-request scratch files (None = platform cache dir).
    pub root: Option<PathBuf>,
}

impl SolaceConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConverseError::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            ConverseError::Config(format!("invalid config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.chat.api_url.trim().is_empty() {
            return Err(ConverseError::Config("chat.api_url is empty".to_owned()));
        }
        if self.chat.api_model.trim().is_empty() {
            return Err(ConverseError::Config("chat.api_model is empty".to_owned()));
        }
        if self.tts.api_url.trim().is_empty() {
            return Err(ConverseError::Config("tts.api_url is empty".to_owned()));
        }
        if self.tts.voice_id.trim().is_empty() {
            return Err(ConverseError::Config("tts.voice_id is empty".to_owned()));
        }
        if self.lipsync.convert_timeout_secs == 0 || self.lipsync.align_timeout_secs == 0 {
            return Err(ConverseError::Config(
                "lipsync timeouts must be non-zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// Resolve the artifact root directory.
    ///
    /// Uses the configured root when set, otherwise a `solace/audio`
    /// subdirectory of the platform cache dir, falling back to the system
    /// temp dir on platforms without one.
    #[must_use]
    pub fn artifact_root(&self) -> PathBuf {
        if let Some(ref root) = self.artifacts.root {
            return root.clone();
        }
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("solace")
            .join("audio")
    }
}
