//! Audio file loading and validation.
//!
//! Everything downstream of this module works on f32 mono samples at 16 kHz,
//! the only input whisper.cpp accepts.

pub mod wav;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Target sample rate for Whisper (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Maximum audio duration in seconds (4 hours)
pub const MAX_AUDIO_DURATION_SECS: f32 = 4.0 * 3600.0;

/// Minimum audio duration in seconds (100ms)
pub const MIN_AUDIO_DURATION_SECS: f32 = 0.1;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported audio format '.{0}' (only WAV is decoded natively)")]
    UnsupportedFormat(String),

    #[error("Failed to parse WAV file: {0}")]
    WavParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] AudioValidationError),
}

#[derive(Error, Debug)]
pub enum AudioValidationError {
    #[error("Audio is empty (no samples)")]
    Empty,

    #[error("Audio too short: {0:.3}s below minimum {1:.3}s")]
    TooShort(f32, f32),

    #[error("Audio too long: {0:.1}s exceeds maximum {1:.1}s")]
    TooLong(f32, f32),

    #[error("Audio contains {0} NaN values")]
    ContainsNaN(usize),

    #[error("Audio contains {0} infinite values")]
    ContainsInfinite(usize),

    #[error("Unexpected sample rate: {0}Hz (expected {1}Hz)")]
    InvalidSampleRate(u32, u32),
}

/// Audio samples ready for transcription (f32, mono, 16kHz).
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Get duration in seconds
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Load an audio file into a 16 kHz mono buffer.
///
/// The file list accepts any extension the original UI advertised
/// (mp3, m4a, flac, wav), but only WAV is decoded; other formats
/// surface as a per-file failure at transcription time.
pub fn load_audio(path: &Path) -> Result<AudioBuffer, AudioError> {
    if !path.exists() {
        return Err(AudioError::FileNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "wav" => wav::load(path),
        other => Err(AudioError::UnsupportedFormat(other.to_string())),
    }
}

/// Validate audio before it crosses the FFI boundary into whisper.cpp.
///
/// Malformed input (NaN, infinite values, absurd durations) can crash the
/// native library, so it is rejected here with a typed error instead.
pub fn validate_audio(samples: &[f32], sample_rate: u32) -> Result<(), AudioValidationError> {
    if samples.is_empty() {
        return Err(AudioValidationError::Empty);
    }

    if sample_rate != SAMPLE_RATE {
        return Err(AudioValidationError::InvalidSampleRate(
            sample_rate,
            SAMPLE_RATE,
        ));
    }

    let duration_secs = samples.len() as f32 / sample_rate as f32;

    if duration_secs < MIN_AUDIO_DURATION_SECS {
        return Err(AudioValidationError::TooShort(
            duration_secs,
            MIN_AUDIO_DURATION_SECS,
        ));
    }
    if duration_secs > MAX_AUDIO_DURATION_SECS {
        return Err(AudioValidationError::TooLong(
            duration_secs,
            MAX_AUDIO_DURATION_SECS,
        ));
    }

    let nan_count = samples.iter().filter(|s| s.is_nan()).count();
    if nan_count > 0 {
        return Err(AudioValidationError::ContainsNaN(nan_count));
    }

    let inf_count = samples.iter().filter(|s| s.is_infinite()).count();
    if inf_count > 0 {
        return Err(AudioValidationError::ContainsInfinite(inf_count));
    }

    Ok(())
}

/// File extensions shown as accepted in the UI drop zone.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac"];

/// Whether a path looks like an audio file the app should list.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_audio() {
        // 1 second of silence at 16kHz
        let samples = vec![0.0f32; 16000];
        assert!(validate_audio(&samples, 16000).is_ok());
    }

    #[test]
    fn test_empty_audio() {
        let samples: Vec<f32> = vec![];
        assert!(matches!(
            validate_audio(&samples, 16000),
            Err(AudioValidationError::Empty)
        ));
    }

    #[test]
    fn test_too_short() {
        // 50ms (below 100ms minimum)
        let samples = vec![0.0f32; 800];
        assert!(matches!(
            validate_audio(&samples, 16000),
            Err(AudioValidationError::TooShort(_, _))
        ));
    }

    #[test]
    fn test_contains_nan() {
        let mut samples = vec![0.0f32; 16000];
        samples[500] = f32::NAN;
        samples[1000] = f32::NAN;
        assert!(matches!(
            validate_audio(&samples, 16000),
            Err(AudioValidationError::ContainsNaN(2))
        ));
    }

    #[test]
    fn test_contains_infinite() {
        let mut samples = vec![0.0f32; 16000];
        samples[500] = f32::INFINITY;
        assert!(matches!(
            validate_audio(&samples, 16000),
            Err(AudioValidationError::ContainsInfinite(1))
        ));
    }

    #[test]
    fn test_wrong_sample_rate() {
        let samples = vec![0.0f32; 44100];
        assert!(matches!(
            validate_audio(&samples, 44100),
            Err(AudioValidationError::InvalidSampleRate(44100, 16000))
        ));
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(&PathBuf::from("tal.wav")));
        assert!(is_audio_file(&PathBuf::from("Möte.MP3")));
        assert!(is_audio_file(&PathBuf::from("intervju.flac")));
        assert!(!is_audio_file(&PathBuf::from("anteckningar.txt")));
        assert!(!is_audio_file(&PathBuf::from("ingen_ändelse")));
    }

    #[test]
    fn test_unsupported_format() {
        // A real file with a non-WAV extension fails with a format error
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tal.mp3");
        std::fs::write(&path, b"not audio").unwrap();
        assert!(matches!(
            load_audio(&path),
            Err(AudioError::UnsupportedFormat(ext)) if ext == "mp3"
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_audio(&PathBuf::from("/nonexistent/tal.wav")),
            Err(AudioError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_buffer_duration() {
        let buffer = AudioBuffer {
            samples: vec![0.0; 32000],
            sample_rate: 16000,
        };
        assert!((buffer.duration_secs() - 2.0).abs() < f32::EPSILON);
    }
}
