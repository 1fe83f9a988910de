//! Optional YAML configuration.
//!
//! The file lives at `~/.config/emojivur/config.yaml`. A missing file means
//! defaults; nothing is written back. Command-line flags override every value
//! read here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest window the interactive viewer opens, in logical pixels.
pub const MIN_WINDOW_WIDTH: u32 = 320;
pub const MIN_WINDOW_HEIGHT: u32 = 240;

/// Glyph pixel size used when neither the CLI nor the config file sets one.
/// Matches the native strike size of common color emoji fonts.
pub const DEFAULT_PXSIZE: u32 = 109;

/// Raster pixels per PDF point for the page image.
pub const DEFAULT_PRINT_SCALE: u32 = 4;
pub const MAX_PRINT_SCALE: u32 = 16;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("I/O error reading config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid YAML.
    #[error("YAML parse error in config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A field value failed semantic validation.
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Log verbosity.
///
/// `--log-level` takes precedence over the config value, which takes
/// precedence over `RUST_LOG`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glyph pixel size when `--pxsize` is not given
    pub default_pxsize: u32,

    /// Lower bound for the interactive window width
    pub min_window_width: u32,

    /// Lower bound for the interactive window height
    pub min_window_height: u32,

    /// Window background, RGB
    pub background_color: [u8; 3],

    /// Color for outline glyphs, RGBA. Color emoji keep their own colors.
    pub paint_color: [u8; 4],

    /// Raster pixels per point for PDF output
    pub print_scale: u32,

    /// Log verbosity; unset defers to `RUST_LOG`
    pub log_level: Option<LogLevel>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_pxsize: DEFAULT_PXSIZE,
            min_window_width: MIN_WINDOW_WIDTH,
            min_window_height: MIN_WINDOW_HEIGHT,
            background_color: [255, 255, 255],
            paint_color: [0, 0, 0, 255],
            print_scale: DEFAULT_PRINT_SCALE,
            log_level: None,
        }
    }
}

impl Config {
    /// Load from the default location, or defaults when there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config =
            serde_yaml_ng::from_str(contents).map_err(|source| ConfigError::Parse {
                path: String::from("<inline>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_pxsize == 0 {
            return Err(ConfigError::Validation(
                "default_pxsize must be at least 1".to_string(),
            ));
        }
        if self.min_window_width == 0 || self.min_window_height == 0 {
            return Err(ConfigError::Validation(
                "min_window_width and min_window_height must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_PRINT_SCALE).contains(&self.print_scale) {
            return Err(ConfigError::Validation(format!(
                "print_scale must be between 1 and {MAX_PRINT_SCALE}, got {}",
                self.print_scale
            )));
        }
        Ok(())
    }

    /// Directory holding the config file.
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("emojivur")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // XDG convention on all other platforms: ~/.config/emojivur
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("emojivur")
            } else {
                PathBuf::from(".")
            }
        }
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }
}
