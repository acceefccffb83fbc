//! Mouth-shape timing from synthesized audio.
//!
//! Two external tools do the heavy lifting: `ffmpeg` re-encodes the
//! synthesized MP3 into the PCM WAV the aligner accepts, and `rhubarb`
//! (phonetic mode) produces the time-stamped mouth cues. Both are wrapped
//! behind narrow async traits so the orchestrator never touches process
//! plumbing, and both are discovered once at startup — a missing binary is
//! a startup failure, not a per-request one.

mod align;
mod convert;
mod tool;

pub use align::{AlignPhonemes, MouthShape, RhubarbAligner, VisemeCue};
pub use convert::{ConvertAudio, FfmpegConverter};
pub use tool::ToolPaths;
