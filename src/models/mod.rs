//! Whisper model catalog and installation management.
//!
//! The default models are KBLab's kb-whisper family, Whisper fine-tuned on
//! Swedish speech, in their GGML conversions. The stock multilingual
//! ggml models are listed as alternatives.

pub mod download;

use crate::config::{Config, ConfigError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown model '{0}'. Run 'talskrift model list' for available models")]
    Unknown(String),

    #[error("Model '{0}' is not installed. Run 'talskrift model download {0}'")]
    NotInstalled(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Metadata for a downloadable model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Catalog name used on the CLI and in config
    pub name: &'static str,
    /// Filename under the models directory
    pub filename: &'static str,
    /// Approximate download size in megabytes
    pub size_mb: u32,
    /// Download URL from Hugging Face
    pub url: &'static str,
    /// Short description shown by `model list`
    pub description: &'static str,
}

/// Catalog of available models.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "kb-whisper-tiny",
        filename: "kb-whisper-tiny-q5_0.bin",
        size_mb: 32,
        url: "https://huggingface.co/KBLab/kb-whisper-tiny/resolve/main/ggml-model-q5_0.bin",
        description: "Swedish (KBLab), fastest, lowest accuracy",
    },
    ModelInfo {
        name: "kb-whisper-base",
        filename: "kb-whisper-base-q5_0.bin",
        size_mb: 60,
        url: "https://huggingface.co/KBLab/kb-whisper-base/resolve/main/ggml-model-q5_0.bin",
        description: "Swedish (KBLab), fast",
    },
    ModelInfo {
        name: "kb-whisper-small",
        filename: "kb-whisper-small-q5_0.bin",
        size_mb: 190,
        url: "https://huggingface.co/KBLab/kb-whisper-small/resolve/main/ggml-model-q5_0.bin",
        description: "Swedish (KBLab), balanced (default)",
    },
    ModelInfo {
        name: "tiny",
        filename: "ggml-tiny.bin",
        size_mb: 75,
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
        description: "Multilingual, fastest",
    },
    ModelInfo {
        name: "base",
        filename: "ggml-base.bin",
        size_mb: 142,
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
        description: "Multilingual, fast",
    },
    ModelInfo {
        name: "small",
        filename: "ggml-small.bin",
        size_mb: 466,
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
        description: "Multilingual, balanced",
    },
    ModelInfo {
        name: "medium",
        filename: "ggml-medium.bin",
        size_mb: 1533,
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.bin",
        description: "Multilingual, good accuracy",
    },
    ModelInfo {
        name: "large-v3",
        filename: "ggml-large-v3.bin",
        size_mb: 3094,
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
        description: "Multilingual, best accuracy",
    },
];

/// Look up a model by name (case-insensitive).
pub fn find(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Path where a model is (or would be) installed.
pub fn model_path(info: &ModelInfo) -> Result<PathBuf, ModelError> {
    Ok(Config::models_dir()?.join(info.filename))
}

/// Check if a model is installed.
pub fn is_installed(info: &ModelInfo) -> bool {
    model_path(info).map(|p| p.exists()).unwrap_or(false)
}

/// Resolve a configured model name to an installed file path.
pub fn resolve(name: &str) -> Result<PathBuf, ModelError> {
    let info = find(name).ok_or_else(|| ModelError::Unknown(name.to_string()))?;
    let path = model_path(info)?;
    if !path.exists() {
        return Err(ModelError::NotInstalled(info.name.to_string()));
    }
    Ok(path)
}

/// Remove an installed model.
pub fn remove(name: &str) -> Result<(), ModelError> {
    let info = find(name).ok_or_else(|| ModelError::Unknown(name.to_string()))?;
    let path = model_path(info)?;
    if !path.exists() {
        return Err(ModelError::NotInstalled(info.name.to_string()));
    }
    std::fs::remove_file(&path)?;
    println!("Removed {}", path.display());
    Ok(())
}

/// Print the catalog with install status (CLI `model list`).
pub fn list() -> Result<(), ModelError> {
    println!("Available models:");
    for info in MODELS {
        let status = if is_installed(info) {
            "[installed]"
        } else {
            ""
        };
        println!(
            "  {:<18} {:>5} MB  {} {}",
            info.name, info.size_mb, info.description, status
        );
    }
    println!("\nModels are stored in: {}", Config::models_dir()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        assert!(find("kb-whisper-small").is_some());
        assert!(find("KB-Whisper-Small").is_some());
        assert!(find("nonexistent").is_none());
    }

    #[test]
    fn test_default_model_is_in_catalog() {
        let config = crate::config::Config::default();
        assert!(find(&config.model.name).is_some());
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<_> = MODELS.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MODELS.len());
    }

    #[test]
    fn test_catalog_filenames_are_unique() {
        let mut files: Vec<_> = MODELS.iter().map(|m| m.filename).collect();
        files.sort_unstable();
        files.dedup();
        assert_eq!(files.len(), MODELS.len());
    }

    #[test]
    fn test_unknown_model_resolve() {
        assert!(matches!(resolve("gpt-5"), Err(ModelError::Unknown(_))));
    }
}
