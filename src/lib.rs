//! Talskrift library exports for testing and fuzzing.
//!
//! Batch transcription of Swedish audio files through a local whisper.cpp
//! model, with subtitle export in four formats.

pub mod audio;
pub mod config;
pub mod engine;
pub mod export;
pub mod gui;
pub mod models;
pub mod panic_handler;
pub mod queue;

// Re-export commonly used types for convenience
pub use audio::AudioBuffer;
pub use config::Config;
pub use engine::{Segment, Transcription, WhisperEngine};
pub use export::ExportFormat;
