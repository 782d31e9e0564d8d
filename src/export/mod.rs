//! Transcription export: txt, srt, vtt and json renderers.
//!
//! Subtitle cues use the real segment timing reported by whisper.cpp.
//! Transcriptions without timing (plain text) fall back to fixed windows
//! of `fallback_window_secs` per non-empty line, which matches the output
//! shape of older exports.

use crate::engine::{Segment, Transcription};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create output directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Srt,
    Vtt,
    Json,
}

impl ExportFormat {
    /// All formats, in canonical output order.
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Txt,
        ExportFormat::Srt,
        ExportFormat::Vtt,
        ExportFormat::Json,
    ];

    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Srt => "srt",
            ExportFormat::Vtt => "vtt",
            ExportFormat::Json => "json",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "Plain Text",
            ExportFormat::Srt => "SubRip (SRT)",
            ExportFormat::Vtt => "WebVTT",
            ExportFormat::Json => "JSON",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "srt" | "subrip" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format '{}'. Use: txt, srt, vtt, json", s)),
        }
    }
}

/// Whisper-shaped JSON document, matching the original export format.
#[derive(Debug, Serialize)]
struct JsonTranscript<'a> {
    task: &'static str,
    language: &'a str,
    duration: f32,
    text: &'a str,
    segments: Vec<JsonSegment>,
}

#[derive(Debug, Serialize)]
struct JsonSegment {
    id: usize,
    seek: i64,
    start: f32,
    end: f32,
    text: String,
    temperature: f32,
    avg_logprob: f32,
    compression_ratio: f32,
    no_speech_prob: f32,
}

/// Cues used for rendering: real segments, or fixed windows per text line.
fn cues(transcription: &Transcription, fallback_window_secs: f32) -> Vec<Segment> {
    if !transcription.segments.is_empty() {
        return transcription.segments.clone();
    }
    fallback_segments(&transcription.text, fallback_window_secs)
}

/// Fabricate fixed-length cues from bare text, one per non-empty line.
pub fn fallback_segments(text: &str, window_secs: f32) -> Vec<Segment> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| Segment {
            start_secs: index as f32 * window_secs,
            end_secs: (index + 1) as f32 * window_secs,
            text: line.trim().to_string(),
        })
        .collect()
}

/// Render a transcription in the given format.
pub fn render(
    transcription: &Transcription,
    format: ExportFormat,
    fallback_window_secs: f32,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Txt => Ok(render_txt(transcription)),
        ExportFormat::Srt => Ok(render_srt(&cues(transcription, fallback_window_secs))),
        ExportFormat::Vtt => Ok(render_vtt(&cues(transcription, fallback_window_secs))),
        ExportFormat::Json => render_json(transcription, fallback_window_secs),
    }
}

fn render_txt(transcription: &Transcription) -> String {
    let mut text = transcription.text.clone();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

fn render_srt(segments: &[Segment]) -> String {
    let mut srt = String::new();
    for (index, segment) in segments.iter().enumerate() {
        let start = format_srt_timestamp(segment.start_secs);
        let end = format_srt_timestamp(segment.end_secs);
        srt.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            start,
            end,
            segment.text
        ));
    }
    srt
}

fn render_vtt(segments: &[Segment]) -> String {
    let mut vtt = String::from("WEBVTT\n\n");
    for segment in segments {
        let start = format_vtt_timestamp(segment.start_secs);
        let end = format_vtt_timestamp(segment.end_secs);
        vtt.push_str(&format!("{} --> {}\n{}\n\n", start, end, segment.text));
    }
    vtt
}

fn render_json(
    transcription: &Transcription,
    fallback_window_secs: f32,
) -> Result<String, ExportError> {
    let segments = cues(transcription, fallback_window_secs);
    let duration = segments.last().map(|s| s.end_secs).unwrap_or(0.0);

    let doc = JsonTranscript {
        task: "transcribe",
        language: &transcription.language,
        duration,
        text: &transcription.text,
        segments: segments
            .iter()
            .enumerate()
            .map(|(id, segment)| JsonSegment {
                id,
                seek: segment.start_secs.floor() as i64,
                start: segment.start_secs,
                end: segment.end_secs,
                text: segment.text.clone(),
                // whisper-rs does not expose these per segment; keep the
                // constants consumers of this format already expect
                temperature: 0.0,
                avg_logprob: -0.5,
                compression_ratio: 1.0,
                no_speech_prob: 0.1,
            })
            .collect(),
    };

    let mut json = serde_json::to_string_pretty(&doc)?;
    json.push('\n');
    Ok(json)
}

/// Format timestamp for SRT (HH:MM:SS,mmm)
fn format_srt_timestamp(secs: f32) -> String {
    let total_ms = (secs * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

/// Format timestamp for VTT (HH:MM:SS.mmm)
fn format_vtt_timestamp(secs: f32) -> String {
    let total_ms = (secs * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
}

/// Write one export file. Returns the path written.
pub fn export_file(
    transcription: &Transcription,
    file_stem: &str,
    format: ExportFormat,
    output_dir: &Path,
    fallback_window_secs: f32,
) -> Result<PathBuf, ExportError> {
    let content = render(transcription, format, fallback_window_secs)?;
    let path = output_dir.join(format!("{}.{}", file_stem, format.extension()));

    fs::write(&path, content).map_err(|e| ExportError::Write(path.clone(), e))?;
    info!("Exported {}: {}", format.display_name(), path.display());
    Ok(path)
}

/// Write all requested formats for one transcription.
///
/// Creating the output directory is fatal; a single failed format is
/// logged and skipped so the remaining formats still get written.
pub fn export_all(
    transcription: &Transcription,
    file_stem: &str,
    formats: &[ExportFormat],
    output_dir: &Path,
    fallback_window_secs: f32,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(output_dir)
        .map_err(|e| ExportError::CreateDir(output_dir.to_path_buf(), e))?;

    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        match export_file(transcription, file_stem, format, output_dir, fallback_window_secs) {
            Ok(path) => written.push(path),
            Err(e) => warn!("Failed to export {}: {}", format.display_name(), e),
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed_transcription() -> Transcription {
        Transcription {
            text: "Hej och välkommen. Det här är ett test.".into(),
            segments: vec![
                Segment {
                    start_secs: 0.0,
                    end_secs: 2.34,
                    text: "Hej och välkommen.".into(),
                },
                Segment {
                    start_secs: 2.34,
                    end_secs: 4.8,
                    text: "Det här är ett test.".into(),
                },
            ],
            language: "sv".into(),
            duration_ms: 1200,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("srt".parse::<ExportFormat>().unwrap(), ExportFormat::Srt);
        assert_eq!("WEBVTT".parse::<ExportFormat>().unwrap(), ExportFormat::Vtt);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_srt_timestamp_format() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(5.0), "00:00:05,000");
        assert_eq!(format_srt_timestamp(61.5), "00:01:01,500");
        assert_eq!(format_srt_timestamp(3661.042), "01:01:01,042");
    }

    #[test]
    fn test_vtt_timestamp_format() {
        assert_eq!(format_vtt_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_vtt_timestamp(3725.25), "01:02:05.250");
    }

    #[test]
    fn test_srt_uses_real_segment_timing() {
        let srt = render(&timed_transcription(), ExportFormat::Srt, 5.0).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,340\nHej och välkommen.\n"));
        assert!(srt.contains("2\n00:00:02,340 --> 00:00:04,800\nDet här är ett test.\n"));
    }

    #[test]
    fn test_vtt_has_header_and_cues() {
        let vtt = render(&timed_transcription(), ExportFormat::Vtt, 5.0).unwrap();
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:02.340\nHej och välkommen.\n"));
    }

    #[test]
    fn test_txt_is_text_with_trailing_newline() {
        let txt = render(&timed_transcription(), ExportFormat::Txt, 5.0).unwrap();
        assert_eq!(txt, "Hej och välkommen. Det här är ett test.\n");
    }

    #[test]
    fn test_fallback_windows_for_plain_text() {
        let t = Transcription::from_text("Första raden.\n\nAndra raden.", "sv");
        let srt = render(&t, ExportFormat::Srt, 5.0).unwrap();
        // Two non-empty lines become two fixed 5-second cues
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:05,000\nFörsta raden.\n"));
        assert!(srt.contains("2\n00:00:05,000 --> 00:00:10,000\nAndra raden.\n"));
    }

    #[test]
    fn test_fallback_respects_window_length() {
        let segments = fallback_segments("en\ntvå\ntre", 2.5);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].start_secs, 5.0);
        assert_eq!(segments[2].end_secs, 7.5);
    }

    #[test]
    fn test_json_shape() {
        let json = render(&timed_transcription(), ExportFormat::Json, 5.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["task"], "transcribe");
        assert_eq!(value["language"], "sv");
        assert!((value["duration"].as_f64().unwrap() - 4.8).abs() < 0.001);
        assert_eq!(value["segments"].as_array().unwrap().len(), 2);

        let seg = &value["segments"][1];
        assert_eq!(seg["id"], 1);
        assert_eq!(seg["seek"], 2);
        assert_eq!(seg["text"], "Det här är ett test.");
        assert_eq!(seg["temperature"], 0.0);
        assert!((seg["avg_logprob"].as_f64().unwrap() + 0.5).abs() < 0.001);
        assert_eq!(seg["compression_ratio"], 1.0);
        assert!((seg["no_speech_prob"].as_f64().unwrap() - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_json_duration_from_fallback() {
        let t = Transcription::from_text("en\ntvå\ntre", "sv");
        let json = render(&t, ExportFormat::Json, 5.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["duration"], 15.0);
    }

    #[test]
    fn test_export_all_writes_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_all(
            &timed_transcription(),
            "intervju",
            &ExportFormat::ALL,
            dir.path(),
            5.0,
        )
        .unwrap();

        assert_eq!(written.len(), 4);
        for ext in ["txt", "srt", "vtt", "json"] {
            assert!(dir.path().join(format!("intervju.{}", ext)).exists());
        }
    }

    #[test]
    fn test_export_all_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Transkriberingar");
        let written = export_all(
            &timed_transcription(),
            "tal",
            &[ExportFormat::Txt],
            &nested,
            5.0,
        )
        .unwrap();
        assert_eq!(written.len(), 1);
        assert!(nested.join("tal.txt").exists());
    }
}
