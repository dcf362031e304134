use std::collections::HashMap;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::engine::MatchConfig;

/// Runtime configuration for the CLI, read from the environment. Every key
/// has a default; the engine itself takes no ambient configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Days of slack before a past expiration is treated as missing from
    /// the log and synthesized.
    pub grace_days: i64,
    /// Fixed "now" for mark synthesis. None means wall clock at startup;
    /// set it to make repeated runs byte-identical.
    pub now_override: Option<NaiveDateTime>,
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let grace_days = env_map
            .get("TRADECHAINS_GRACE_DAYS")
            .map(|s| s.as_str())
            .unwrap_or("2")
            .parse::<i64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "TRADECHAINS_GRACE_DAYS".to_string(),
                    "must be a whole number of days".to_string(),
                )
            })?;

        let now_override = match env_map.get("TRADECHAINS_NOW") {
            Some(value) => Some(
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map_err(|_| {
                    ConfigError::InvalidValue(
                        "TRADECHAINS_NOW".to_string(),
                        "must be an ISO timestamp like 2021-06-01T09:30:00".to_string(),
                    )
                })?,
            ),
            None => None,
        };

        let output_format = match env_map
            .get("TRADECHAINS_OUTPUT_FORMAT")
            .map(|s| s.as_str())
            .unwrap_or("csv")
        {
            "csv" => OutputFormat::Csv,
            "json" => OutputFormat::Json,
            other => {
                return Err(ConfigError::InvalidValue(
                    "TRADECHAINS_OUTPUT_FORMAT".to_string(),
                    format!("must be csv or json, got {}", other),
                ))
            }
        };

        Ok(Config {
            grace_days,
            now_override,
            output_format,
        })
    }

    /// Engine configuration for a run starting at `fallback_now`.
    pub fn match_config(&self, fallback_now: NaiveDateTime) -> MatchConfig {
        MatchConfig {
            now: self.now_override.unwrap_or(fallback_now),
            grace_days: self.grace_days,
        }
    }
}
