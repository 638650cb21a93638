//! Command-line interface
//!
//! Every setting may come from a flag or its environment variable. Unset
//! values fall through to the TOML file and then to compiled defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use judge_common::config::ConfigOverrides;

/// Command-line arguments for judge-server
#[derive(Parser, Debug)]
#[command(name = "judge-server")]
#[command(about = "Human-judgement study server")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "JUDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, global = true, env = "JUDGE_BIND")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true, env = "JUDGE_PORT")]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long, global = true, env = "JUDGE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Directory the criteria-set and dataset keys are resolved against
    #[arg(long, global = true, env = "JUDGE_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// Criteria-set resource key
    #[arg(long, global = true, env = "CONSTITUTION_PATH")]
    pub criteria_set: Option<String>,

    /// Dataset resource key
    #[arg(long, global = true, env = "DATASET_PATH")]
    pub dataset: Option<String>,

    /// Maximum number of scenarios served from the dataset
    #[arg(long, global = true, env = "MAX_SCENARIOS")]
    pub max_scenarios: Option<usize>,

    /// Lifetime of issued access tokens, in hours
    #[arg(long, global = true, env = "JUDGE_SESSION_TTL_HOURS")]
    pub session_ttl_hours: Option<i64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "JUDGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create a rater account
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long, env = "JUDGE_NEW_PASSWORD")]
        password: String,
    },
}

impl Cli {
    /// Settings supplied on the command line or through the environment
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            port: self.port,
            database_path: self.database.clone(),
            data_root: self.data_root.clone(),
            criteria_set: self.criteria_set.clone(),
            dataset: self.dataset.clone(),
            max_scenarios: self.max_scenarios,
            session_ttl_hours: self.session_ttl_hours,
            log_level: self.log_level.clone(),
        }
    }
}
