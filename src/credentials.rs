//! Provider credential resolution.
//!
//! Each provider's API key is resolved from the first-present of several
//! recognized environment variable names. Resolution happens once at startup;
//! a missing credential is a fatal [`ConverseError::Config`], never a
//! per-request error. The two providers resolve independently — the chat key
//! is never reused for TTS or vice versa.

use crate::error::{ConverseError, Result};
use std::fmt;

/// Recognized names for the chat-completion provider key, in priority order.
const CHAT_KEY_VARS: &[&str] = &[
    "GOOGLE_API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_GENAI_API_KEY",
    "GOOGLEAI_API_KEY",
];

/// Recognized names for the TTS provider key, in priority order.
const TTS_KEY_VARS: &[&str] = &["ELEVENLABS_API_KEY", "ELEVEN_API_KEY", "XI_API_KEY"];

/// Resolved credential values ready for runtime use.
///
/// Implements a custom [`Debug`] that redacts all values to prevent
/// accidental secret leakage in logs.
pub struct LoadedCredentials {
    /// Chat-completion provider API key.
    pub chat_api_key: String,
    /// TTS provider API key.
    pub tts_api_key: String,
}

impl fmt::Debug for LoadedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedCredentials")
            .field("chat_api_key", &redact(&self.chat_api_key))
            .field("tts_api_key", &redact(&self.tts_api_key))
            .finish()
    }
}

fn redact(s: &str) -> &str {
    if s.is_empty() { "" } else { "[REDACTED]" }
}

/// Return the value of the first variable in `names` that is set and
/// non-blank.
fn first_present(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    })
}

/// Resolve both provider keys from the environment.
///
/// # Errors
///
/// Returns [`ConverseError::Config`] naming the recognized variables when
/// either chain resolves to nothing.
pub fn load_credentials() -> Result<LoadedCredentials> {
    let chat_api_key = first_present(CHAT_KEY_VARS).ok_or_else(|| {
        ConverseError::Config(format!(
            "missing chat provider API key; set one of: {}",
            CHAT_KEY_VARS.join(", ")
        ))
    })?;
    let tts_api_key = first_present(TTS_KEY_VARS).ok_or_else(|| {
        ConverseError::Config(format!(
            "missing TTS provider API key; set one of: {}",
            TTS_KEY_VARS.join(", ")
        ))
    })?;

    Ok(LoadedCredentials {
        chat_api_key,
        tts_api_key,
    })
}
