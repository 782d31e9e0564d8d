//! Application configuration.
//!
//! Stored as TOML in the per-user config directory. All sections default
//! independently so a partial config file keeps working across upgrades.

use crate::export::ExportFormat;
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config directory")]
    NoConfigDir,

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub appearance: AppearanceConfig,
}

/// Speech model settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    /// Model name from the catalog (see `talskrift model list`)
    #[serde(default = "default_model_name")]
    pub name: String,

    /// ISO 639-1 language code passed to Whisper ("auto" for detection)
    #[serde(default = "default_language")]
    pub language: String,

    /// Translate output to English instead of transcribing
    #[serde(default)]
    pub translate: bool,

    /// Inference threads (0 = let whisper.cpp decide)
    #[serde(default)]
    pub threads: u32,
}

fn default_model_name() -> String {
    "kb-whisper-small".to_string()
}

fn default_language() -> String {
    "sv".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            language: default_language(),
            translate: false,
            threads: 0,
        }
    }
}

/// Export settings: output location and which formats to write.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Output directory (default: ~/Documents/Transkriberingar)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub txt: bool,

    #[serde(default = "default_true")]
    pub srt: bool,

    #[serde(default = "default_true")]
    pub vtt: bool,

    #[serde(default = "default_true")]
    pub json: bool,

    /// Cue length used when a transcription carries no segment timing
    #[serde(default = "default_fallback_window")]
    pub fallback_window_secs: f32,
}

fn default_true() -> bool {
    true
}

fn default_fallback_window() -> f32 {
    5.0
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            txt: true,
            srt: true,
            vtt: true,
            json: true,
            fallback_window_secs: default_fallback_window(),
        }
    }
}

impl ExportConfig {
    /// Formats enabled in this configuration, in canonical order.
    pub fn enabled_formats(&self) -> Vec<ExportFormat> {
        let mut formats = Vec::new();
        if self.txt {
            formats.push(ExportFormat::Txt);
        }
        if self.srt {
            formats.push(ExportFormat::Srt);
        }
        if self.vtt {
            formats.push(ExportFormat::Vtt);
        }
        if self.json {
            formats.push(ExportFormat::Json);
        }
        formats
    }
}

/// UI theme selection.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    Light,
    /// Dark theme
    Dark,
    /// Follow system preference (using dark-light crate)
    #[default]
    Auto,
}

impl Theme {
    /// Detect the effective theme based on system preference.
    /// Returns true if dark mode should be used.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        match self {
            Theme::Light => false,
            Theme::Dark => true,
            Theme::Auto => match dark_light::detect() {
                dark_light::Mode::Dark => true,
                dark_light::Mode::Light | dark_light::Mode::Default => false,
            },
        }
    }

    /// Get display name for the theme
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::Auto => "System",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppearanceConfig {
    /// Theme: light, dark, or auto (follow system)
    #[serde(default)]
    pub theme: Theme,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("se", "talskrift", "talskrift")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Get the data directory path (for models and crash reports)
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("se", "talskrift", "talskrift")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Get the directory where downloaded models are stored
    pub fn models_dir() -> Result<PathBuf, ConfigError> {
        Ok(Self::data_dir()?.join("models"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file, or create default if not exists
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;

        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Model name doubles as a filename component
        if self.model.name.contains("..")
            || self.model.name.contains('/')
            || self.model.name.contains('\\')
        {
            return Err(ConfigError::ValidationError(
                "model name contains invalid characters".into(),
            ));
        }

        if self.export.fallback_window_secs <= 0.0 {
            return Err(ConfigError::ValidationError(
                "fallback_window_secs must be positive".into(),
            ));
        }
        if self.export.fallback_window_secs > 60.0 {
            return Err(ConfigError::ValidationError(
                "fallback_window_secs cannot exceed 60 seconds".into(),
            ));
        }

        if self.export.enabled_formats().is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one export format must be enabled".into(),
            ));
        }

        Ok(())
    }

    /// Resolve the effective output directory.
    ///
    /// Unconfigured installs write to `~/Documents/Transkriberingar`, falling
    /// back to the current directory when no documents folder exists.
    pub fn output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.export.output_dir {
            return dir.clone();
        }

        UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(|d| d.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Transkriberingar")
    }
}

/// Print the current configuration (CLI `config --show`).
pub fn show() -> Result<(), ConfigError> {
    let config = Config::load()?;
    let contents = toml::to_string_pretty(&config)?;

    if let Ok(path) = Config::config_path() {
        println!("# {}", path.display());
    }
    println!("{}", contents);
    Ok(())
}

/// Update configuration fields from the CLI and save.
pub fn update(
    model: Option<String>,
    language: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<(), ConfigError> {
    let mut config = Config::load()?;

    if let Some(model) = model {
        config.model.name = model;
    }
    if let Some(language) = language {
        config.model.language = language;
    }
    if let Some(dir) = output_dir {
        config.export.output_dir = Some(dir);
    }

    config.validate()?;
    config.save()?;
    println!("Configuration updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model.name, "kb-whisper-small");
        assert_eq!(config.model.language, "sv");
    }

    #[test]
    fn test_all_formats_enabled_by_default() {
        let config = Config::default();
        assert_eq!(config.export.enabled_formats().len(), 4);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[model]\nname = \"base\"").unwrap();
        assert_eq!(config.model.name, "base");
        assert_eq!(config.model.language, "sv");
        assert!(config.export.txt);
        assert_eq!(config.export.fallback_window_secs, 5.0);
    }

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.model.name = "kb-whisper-tiny".to_string();
        config.export.vtt = false;
        config.appearance.theme = Theme::Dark;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.name, "kb-whisper-tiny");
        assert!(!parsed.export.vtt);
        assert_eq!(parsed.appearance.theme, Theme::Dark);
    }

    #[test]
    fn test_rejects_path_traversal_in_model_name() {
        let mut config = Config::default();
        config.model.name = "../etc/passwd".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_no_formats() {
        let mut config = Config::default();
        config.export.txt = false;
        config.export.srt = false;
        config.export.vtt = false;
        config.export.json = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_window() {
        let mut config = Config::default();
        config.export.fallback_window_secs = 0.0;
        assert!(config.validate().is_err());
        config.export.fallback_window_secs = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_theme_display_names() {
        assert_eq!(Theme::Auto.display_name(), "System");
        assert_eq!(Theme::Light.display_name(), "Light");
        assert_eq!(Theme::Dark.display_name(), "Dark");
    }
}
