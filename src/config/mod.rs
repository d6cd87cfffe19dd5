//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::pairing::Ruleset;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Unsupported format {format} for {players} players on {courts} court(s)")]
    UnsupportedFormat {
        format: Format,
        players: usize,
        courts: u32,
    },
}

/// Pairing rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Intro rounds, partner switch, then constrained random draws
    #[default]
    Generic,
    /// Winners stay (split), benched players rotate in; one court
    #[serde(rename = "winner_stay_6p1c")]
    WinnerStay6p1c,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Generic => write!(f, "generic"),
            Format::WinnerStay6p1c => write!(f, "winner_stay_6p1c"),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" | "mexicano" => Ok(Format::Generic),
            "winner_stay_6p1c" | "6p1c" => Ok(Format::WinnerStay6p1c),
            other => Err(format!("unknown format: {}", other)),
        }
    }
}

/// Per-tournament settings, fixed for the tournament's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Roster size
    #[serde(default = "default_player_count")]
    pub player_count: usize,

    /// Courts available (one active court is scheduled per round)
    #[serde(default = "default_court_count")]
    pub court_count: u32,

    #[serde(default)]
    pub format: Format,

    /// Maximum back-to-back rounds before a forced rest
    #[serde(default = "default_consecutive_cap")]
    pub consecutive_cap: u32,

    /// Random draws attempted before the deterministic fallback
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Points needed to win a game
    #[serde(default = "default_point_limit")]
    pub point_limit: u32,
}

fn default_player_count() -> usize {
    6
}

fn default_court_count() -> u32 {
    1
}

fn default_consecutive_cap() -> u32 {
    2
}

fn default_max_retries() -> u32 {
    20
}

fn default_point_limit() -> u32 {
    21
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            player_count: default_player_count(),
            court_count: default_court_count(),
            format: Format::default(),
            consecutive_cap: default_consecutive_cap(),
            max_retries: default_max_retries(),
            point_limit: default_point_limit(),
        }
    }
}

impl TournamentConfig {
    pub fn new(player_count: usize, format: Format) -> Self {
        Self {
            player_count,
            format,
            ..Default::default()
        }
    }

    /// Validate the configuration and resolve its rule table entry.
    pub fn validate(&self) -> Result<Ruleset, ConfigError> {
        if self.consecutive_cap == 0 {
            return Err(ConfigError::ValidationError(
                "Consecutive cap must be greater than 0".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "Max retries must be greater than 0".to_string(),
            ));
        }

        if self.point_limit == 0 {
            return Err(ConfigError::ValidationError(
                "Point limit must be greater than 0".to_string(),
            ));
        }

        Ruleset::resolve(self.format, self.player_count, self.court_count).ok_or(
            ConfigError::UnsupportedFormat {
                format: self.format,
                players: self.player_count,
                courts: self.court_count,
            },
        )
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Defaults for newly created tournaments
    #[serde(default)]
    pub tournament: TournamentConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            tournament: TournamentConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Log level must not be empty".to_string(),
            ));
        }

        self.tournament.validate()?;
        Ok(())
    }
}
