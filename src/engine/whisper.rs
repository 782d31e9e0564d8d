//! Whisper transcription engine using whisper-rs.

use crate::audio::{validate_audio, AudioBuffer};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

#[derive(Error, Debug)]
pub enum WhisperError {
    #[error("Model not found at {0}. Run 'talskrift model download {1}'")]
    ModelNotFound(PathBuf, String),

    #[error("Failed to load model: {0}")]
    LoadFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),
}

/// A transcribed span with real timing from the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start time from audio start (seconds)
    pub start_secs: f32,
    /// End time from audio start (seconds)
    pub end_secs: f32,
    /// Transcribed text
    pub text: String,
}

/// Result of transcribing one audio file.
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Full transcribed text
    pub text: String,
    /// Per-segment timing as reported by whisper.cpp
    pub segments: Vec<Segment>,
    /// Language used or detected
    pub language: String,
    /// Processing time in milliseconds
    pub duration_ms: u64,
}

impl Transcription {
    /// Duration of the transcribed speech in seconds (end of last segment).
    pub fn audio_duration_secs(&self) -> f32 {
        self.segments.last().map(|s| s.end_secs).unwrap_or(0.0)
    }

    /// Build a transcription from bare text with no timing information.
    pub fn from_text(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            segments: Vec::new(),
            language: language.into(),
            duration_ms: 0,
        }
    }
}

/// Whisper transcription engine.
///
/// Holds the loaded model context. Dropping the engine frees the model.
pub struct WhisperEngine {
    ctx: WhisperContext,
    language: String,
    translate: bool,
    threads: u32,
}

impl WhisperEngine {
    /// Create a new Whisper engine, loading the model from disk
    pub fn new(
        model_path: &Path,
        language: &str,
        translate: bool,
        threads: u32,
    ) -> Result<Self, WhisperError> {
        info!("Loading Whisper model from: {}", model_path.display());

        if !model_path.exists() {
            let model_name = model_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown");

            return Err(WhisperError::ModelNotFound(
                model_path.to_path_buf(),
                model_name.to_string(),
            ));
        }

        let params = WhisperContextParameters::default();

        let ctx =
            WhisperContext::new_with_params(model_path.to_str().unwrap_or_default(), params)
                .map_err(|e| WhisperError::LoadFailed(format!("{:?}", e)))?;

        info!("Whisper model loaded successfully");

        Ok(Self {
            ctx,
            language: language.to_string(),
            translate,
            threads,
        })
    }

    /// Transcribe an audio buffer.
    pub fn transcribe(&self, audio: &AudioBuffer) -> Result<Transcription, WhisperError> {
        validate_audio(&audio.samples, audio.sample_rate)
            .map_err(|e| WhisperError::InvalidAudio(e.to_string()))?;

        let start_time = std::time::Instant::now();

        debug!(
            "Transcribing {:.2}s of audio ({} samples)",
            audio.duration_secs(),
            audio.samples.len()
        );

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| WhisperError::TranscriptionFailed(format!("{:?}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        if self.language != "auto" {
            params.set_language(Some(&self.language));
        }
        params.set_translate(self.translate);
        if self.threads > 0 {
            params.set_n_threads(self.threads as i32);
        }

        // Disable printing to avoid cluttering output
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio.samples)
            .map_err(|e| WhisperError::TranscriptionFailed(format!("{:?}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| WhisperError::TranscriptionFailed(format!("{:?}", e)))?;

        // Segment times are reported in centiseconds
        let mut segments = Vec::with_capacity(num_segments as usize);
        let mut text = String::new();
        for i in 0..num_segments {
            let segment_text = state
                .full_get_segment_text(i)
                .map_err(|e| WhisperError::TranscriptionFailed(format!("{:?}", e)))?;
            let t0 = state
                .full_get_segment_t0(i)
                .map_err(|e| WhisperError::TranscriptionFailed(format!("{:?}", e)))?;
            let t1 = state
                .full_get_segment_t1(i)
                .map_err(|e| WhisperError::TranscriptionFailed(format!("{:?}", e)))?;

            text.push_str(&segment_text);
            segments.push(Segment {
                start_secs: t0 as f32 / 100.0,
                end_secs: t1 as f32 / 100.0,
                text: segment_text.trim().to_string(),
            });
        }

        let text = text.trim().to_string();
        let duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Transcription complete ({} segments, {} chars, {}ms)",
            segments.len(),
            text.len(),
            duration_ms
        );

        Ok(Transcription {
            text,
            segments,
            language: self.language.clone(),
            duration_ms,
        })
    }
}
