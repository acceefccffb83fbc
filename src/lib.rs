//! Solace: avatar conversation backend.
//!
//! One HTTP call turns a user utterance into playback-ready reply bundles:
//! question → structured chat reply (text + expression + animation per
//! segment) → per-segment speech synthesis → WAV re-encode → forced
//! alignment → `{audio, viseme timeline, expression, animation}` bundle.
//!
//! # Architecture
//!
//! The pipeline is built from independent stages injected behind async
//! traits:
//! - **Reply generation**: OpenAI-compatible chat completion with a strict
//!   JSON reply schema (`reply`)
//! - **Speech synthesis**: ElevenLabs-compatible HTTP TTS (`tts`)
//! - **Audio conversion**: `ffmpeg` subprocess, MP3 → PCM WAV (`lipsync`)
//! - **Forced alignment**: `rhubarb` subprocess, WAV → mouth cues (`lipsync`)
//! - **Orchestration**: per-turn sequencing, per-segment failure isolation,
//!   scoped artifact cleanup (`pipeline`)

pub mod config;
pub mod credentials;
pub mod error;
pub mod lipsync;
pub mod pipeline;
pub mod reply;
pub mod server;
pub mod tts;

pub use config::SolaceConfig;
pub use error::{ConverseError, Result};
pub use pipeline::{ConversationRequest, ConversationResponse, PipelineCoordinator, ReplyBundle};
pub use reply::{Animation, FacialExpression, ReplySegment};
