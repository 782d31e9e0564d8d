//! WAV file decoding.
//!
//! Accepts arbitrary sample rates, channel counts and sample formats,
//! producing the f32 mono 16 kHz buffer the engine expects.

use super::{validate_audio, AudioBuffer, AudioError, SAMPLE_RATE};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Load a WAV file from disk.
pub fn load(path: &Path) -> Result<AudioBuffer, AudioError> {
    let file = File::open(path)?;
    load_from_reader(BufReader::new(file))
}

/// Decode WAV data from any reader.
pub fn load_from_reader<R: std::io::Read>(reader: R) -> Result<AudioBuffer, AudioError> {
    let mut wav_reader =
        hound::WavReader::new(reader).map_err(|e| AudioError::WavParse(e.to_string()))?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let channels = spec.channels as usize;

    if channels == 0 {
        return Err(AudioError::WavParse("WAV file has zero channels".into()));
    }

    // Normalize every sample format to f32 in [-1, 1]
    let raw_samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AudioError::WavParse(e.to_string()))?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            wav_reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AudioError::WavParse(e.to_string()))?
        }
    };

    let mono = downmix(&raw_samples, channels);
    let samples = if source_rate != SAMPLE_RATE {
        debug!("Resampling {}Hz -> {}Hz", source_rate, SAMPLE_RATE);
        resample(&mono, source_rate, SAMPLE_RATE)
    } else {
        mono
    };

    validate_audio(&samples, SAMPLE_RATE)?;

    Ok(AudioBuffer {
        samples,
        sample_rate: SAMPLE_RATE,
    })
}

/// Mix interleaved channels down to mono by averaging.
fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Simple linear interpolation resampling.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[samples.len() - 1]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as f32
            }
        })
        .collect()
}
