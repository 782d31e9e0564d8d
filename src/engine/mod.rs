//! Speech recognition engine.

pub mod whisper;

pub use whisper::{Segment, Transcription, WhisperEngine, WhisperError};
