//! Configuration management for workout playback
//!
//! Values are resolved from, in increasing precedence: defaults, `WORKOUT_*`
//! environment variables and a `workout.yaml` file.

use crate::common::env_loader::EnvLoader;
use crate::services::{DEFAULT_BELL_CLIP, DEFAULT_CLICK_CLIP};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "workout.yaml";

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the configuration file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content from a configuration file
    #[error("Invalid YAML syntax in {path}:\n{source}\n\nHint: Check for proper indentation and YAML formatting")]
    YamlParse {
        /// Path to the configuration file with invalid YAML content
        path: PathBuf,
        /// Underlying YAML parsing error
        #[source]
        source: serde_yaml::Error,
    },

    /// Invalid configuration value for a specific field
    #[error("Invalid configuration value for '{field}': {value}\n{hint}")]
    InvalidValue {
        /// Name of the field
        field: String,
        /// The rejected value
        value: String,
        /// How to fix it
        hint: String,
    },
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Clip played for a metronome click (default: `Audio/MetronomeClick.mp3`)
    pub metronome_click_clip: String,
    /// Clip played for a metronome bell (default: `Audio/MetronomeBell.mp3`)
    pub metronome_bell_clip: String,
    /// Speak each exercise name before it starts (default: true)
    pub announce_exercises: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metronome_click_clip: DEFAULT_CLICK_CLIP.to_string(),
            metronome_bell_clip: DEFAULT_BELL_CLIP.to_string(),
            announce_exercises: true,
        }
    }
}

impl Config {
    /// Create a configuration with values loaded from:
    /// 1. YAML file (highest precedence)
    /// 2. Environment variables
    /// 3. Defaults (lowest precedence)
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env_vars();

        match YamlConfig::load_or_default() {
            Ok(yaml_config) => {
                yaml_config.apply_to_config(&mut config);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load YAML configuration, falling back to env vars and defaults: {}",
                    e
                );
            }
        }

        config
    }

    /// Defaults and environment variables overridden by an explicit YAML file
    ///
    /// Unlike [`Config::new`], a missing or malformed file is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_vars();
        YamlConfig::load_from_file(path)?.apply_to_config(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        let loader = EnvLoader::new("WORKOUT");

        self.metronome_click_clip =
            loader.load_string("METRONOME_CLICK_CLIP", &self.metronome_click_clip);
        self.metronome_bell_clip =
            loader.load_string("METRONOME_BELL_CLIP", &self.metronome_bell_clip);
        self.announce_exercises =
            loader.load_parsed("ANNOUNCE_EXERCISES", self.announce_exercises);
    }

    /// Find `workout.yaml`, searching in order:
    /// 1. Current working directory
    /// 2. `~/.config/workout/workout.yaml`
    /// 3. `~/workout.yaml`
    pub fn find_yaml_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(CONFIG_FILE_NAME)];

        if let Some(home_dir) = dirs::home_dir() {
            search_paths.push(
                home_dir
                    .join(".config")
                    .join("workout")
                    .join(CONFIG_FILE_NAME),
            );
            search_paths.push(home_dir.join(CONFIG_FILE_NAME));
        }

        let found = search_paths
            .iter()
            .find_map(|path| Self::check_config_file(path));
        match &found {
            Some(path) => tracing::debug!("Found configuration file: {:?}", path),
            None => tracing::debug!("No {} found in any search location", CONFIG_FILE_NAME),
        }
        found
    }

    /// Check if a configuration file exists and is readable
    pub fn check_config_file(config_path: &Path) -> Option<PathBuf> {
        match config_path.try_exists() {
            Ok(true) if config_path.is_file() => match std::fs::File::open(config_path) {
                Ok(_) => Some(config_path.to_path_buf()),
                Err(e) => {
                    tracing::warn!(
                        "Configuration file {:?} exists but cannot be read: {}",
                        config_path,
                        e
                    );
                    None
                }
            },
            Ok(false) => None,
            Ok(true) => {
                tracing::debug!("Found {:?} but it is not a file", config_path);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Error checking for configuration file {:?}: {}",
                    config_path,
                    e
                );
                None
            }
        }
    }

    /// Validate the current configuration settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_clip("metronome_click_clip", &self.metronome_click_clip)?;
        validate_clip("metronome_bell_clip", &self.metronome_bell_clip)
    }
}

fn validate_clip(field: &str, clip: &str) -> Result<(), ConfigError> {
    if clip.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: clip.to_string(),
            hint: format!("{} must name an audio clip", field),
        });
    }
    Ok(())
}

/// Configuration loaded from `workout.yaml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct YamlConfig {
    /// Clip played for a metronome click
    pub metronome_click_clip: Option<String>,
    /// Clip played for a metronome bell
    pub metronome_bell_clip: Option<String>,
    /// Speak each exercise name before it starts
    pub announce_exercises: Option<bool>,
}

impl YamlConfig {
    /// Apply values present in the file; YAML takes precedence
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(ref clip) = self.metronome_click_clip {
            config.metronome_click_clip = clip.clone();
        }
        if let Some(ref clip) = self.metronome_bell_clip {
            config.metronome_bell_clip = clip.clone();
        }
        if let Some(announce) = self.announce_exercises {
            config.announce_exercises = announce;
        }
    }

    /// Load and validate YAML configuration from a file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!("Loading YAML configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        // An empty file deserializes as YAML null
        let config: YamlConfig = if content.trim().is_empty() {
            YamlConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the first file found by [`Config::find_yaml_config_file`], or defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Config::find_yaml_config_file() {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject empty clip identifiers
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref clip) = self.metronome_click_clip {
            validate_clip("metronome_click_clip", clip)?;
        }
        if let Some(ref clip) = self.metronome_bell_clip {
            validate_clip("metronome_bell_clip", clip)?;
        }
        Ok(())
    }
}
