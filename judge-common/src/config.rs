//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The first two tiers are merged by the binary's argument parser and arrive
//! here as [`ConfigOverrides`]. A missing TOML file is not fatal: a warning is
//! logged and the compiled defaults apply.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5760;
pub const DEFAULT_DATABASE: &str = "judge.db";
pub const DEFAULT_CRITERIA_SET: &str = "Constitutions/Kindness.txt";
pub const DEFAULT_DATASET: &str = "Datasets/evaluations.json";
pub const DEFAULT_MAX_SCENARIOS: usize = 20;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 168;
/// Ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366 * 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ========================================
// TOML File
// ========================================

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent fields fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub session_ttl_hours: Option<i64>,

    #[serde(default)]
    pub study: StudySection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[study]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudySection {
    pub data_root: Option<PathBuf>,
    pub criteria_set: Option<String>,
    pub dataset: Option<String>,
    pub max_scenarios: Option<usize>,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

/// Default configuration file path for the platform
///
/// `<config_dir>/judge-study/config.toml`, e.g. `~/.config/judge-study/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("judge-study").join("config.toml"))
}

/// Load the TOML configuration
///
/// An explicitly requested file must exist. When no path is given the
/// platform default is tried, and its absence yields an empty config.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!(
                    "No config file at {}; using built-in defaults",
                    path.display()
                );
                return Ok(TomlConfig::default());
            }
            None => {
                warn!("Could not determine config directory; using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config = parse_toml_config(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    Ok(toml::from_str(content)?)
}

// ========================================
// Resolved Configuration
// ========================================

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub data_root: Option<PathBuf>,
    pub criteria_set: Option<String>,
    pub dataset: Option<String>,
    pub max_scenarios: Option<usize>,
    pub session_ttl_hours: Option<i64>,
    pub log_level: Option<String>,
}

/// Study resources; read by every request, never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyConfig {
    /// Directory the resource keys are resolved against
    pub data_root: PathBuf,
    /// Criteria-set resource key
    pub criteria_set: String,
    /// Dataset resource key
    pub dataset: String,
    /// Catalog truncation limit
    pub max_scenarios: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            criteria_set: DEFAULT_CRITERIA_SET.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            max_scenarios: DEFAULT_MAX_SCENARIOS,
        }
    }
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub session_ttl_hours: i64,
    pub log_level: String,
    pub study: StudyConfig,
}

impl ServerConfig {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let session_ttl_hours = overrides
            .session_ttl_hours
            .or(file.session_ttl_hours)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS);
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            return Err(Error::Config(format!(
                "session_ttl_hours must be between 1 and {}, got {}",
                MAX_SESSION_TTL_HOURS, session_ttl_hours
            )));
        }

        let criteria_set = overrides
            .criteria_set
            .or(file.study.criteria_set)
            .unwrap_or_else(|| DEFAULT_CRITERIA_SET.to_string());
        let dataset = overrides
            .dataset
            .or(file.study.dataset)
            .unwrap_or_else(|| DEFAULT_DATASET.to_string());
        if criteria_set.trim().is_empty() || dataset.trim().is_empty() {
            return Err(Error::Config(
                "criteria_set and dataset must not be empty".to_string(),
            ));
        }

        Ok(Self {
            bind: overrides
                .bind
                .or(file.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            session_ttl_hours,
            log_level: overrides
                .log_level
                .or(file.logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            study: StudyConfig {
                data_root: overrides
                    .data_root
                    .or(file.study.data_root)
                    .unwrap_or_else(|| PathBuf::from(".")),
                criteria_set,
                dataset,
                max_scenarios: overrides
                    .max_scenarios
                    .or(file.study.max_scenarios)
                    .unwrap_or(DEFAULT_MAX_SCENARIOS),
            },
        })
    }
}
