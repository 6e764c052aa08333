use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::CliArgs;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// On-disk configuration. Every field is optional so a partial file works.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend: Option<String>,
    pub device: Option<PathBuf>,
    pub still_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub min_confidence: Option<f32>,
    pub interval_secs: Option<f64>,
    pub closing_radius: Option<u8>,
    pub settle_delay_secs: Option<f64>,
    pub language: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the default config file when it exists. A missing file is not
    /// an error; any other read or parse failure is.
    pub fn load_default() -> Result<Self, ConfigError> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "namespot").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Settings after merging the config file and command-line flags.
/// Flags win over the file; the file wins over built-in defaults.
#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub backend: Option<String>,
    pub device: Option<PathBuf>,
    pub still_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub min_confidence: f32,
    pub interval: Duration,
    pub closing_radius: u8,
    pub settle_delay: Duration,
    pub language: String,
}

pub const DEFAULT_OUTPUT_DIR: &str = "detected_names";
pub const DEFAULT_MIN_CONFIDENCE: f32 = 60.0;
pub const DEFAULT_INTERVAL_SECS: f64 = 30.0;
pub const DEFAULT_CLOSING_RADIUS: u8 = 1;
pub const DEFAULT_SETTLE_DELAY_SECS: f64 = 2.0;
pub const DEFAULT_LANGUAGE: &str = "eng";

impl EffectiveSettings {
    pub fn merge(file: FileConfig, args: &CliArgs) -> Result<Self, ConfigError> {
        let min_confidence = args
            .min_confidence
            .or(file.min_confidence)
            .unwrap_or(DEFAULT_MIN_CONFIDENCE);
        if !(0.0..=100.0).contains(&min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must be between 0 and 100, got {min_confidence}"
            )));
        }

        let interval_secs = file.interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS);
        if !(interval_secs > 0.0 && interval_secs.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "interval_secs must be positive, got {interval_secs}"
            )));
        }

        let settle_secs = file.settle_delay_secs.unwrap_or(DEFAULT_SETTLE_DELAY_SECS);
        if !(settle_secs >= 0.0 && settle_secs.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "settle_delay_secs must not be negative, got {settle_secs}"
            )));
        }

        Ok(Self {
            backend: args.backend.clone().or(file.backend),
            device: args.device.clone().or(file.device),
            still_dir: args.still_dir.clone().or(file.still_dir),
            output_dir: args
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            min_confidence,
            interval: Duration::from_secs_f64(interval_secs),
            closing_radius: file.closing_radius.unwrap_or(DEFAULT_CLOSING_RADIUS),
            settle_delay: Duration::from_secs_f64(settle_secs),
            language: args
                .language
                .clone()
                .or(file.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }
}
