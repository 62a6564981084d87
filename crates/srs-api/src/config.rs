//! Environment-variable configuration (`spec.md` §6 "CLI accepts
//! environment configuration only"), following the teacher pack's
//! `AppConfig::from_env` + `dotenvy` pattern (`iqrah-backend-config`).

use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Base URL of the external content-generation service (`spec.md`
    /// §4.7). That service's internals are out of scope; this workspace
    /// only calls it through the `ContentGenerator` boundary.
    pub content_generator_url: String,
    /// Base URL of the external semantic-grading service (`spec.md` §4.8).
    pub semantic_grader_url: String,
    pub max_tasks_per_day: u32,
    pub task_scheduler_tick: Duration,
}

impl AppConfig {
    /// Loads configuration from the process environment, falling back to
    /// a `.env` file in the working directory if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is absent or a
    /// numeric variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let max_tasks_per_day = env_var_or("MAX_TASKS_PER_DAY", "10")
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue("MAX_TASKS_PER_DAY".into(), "must be a positive integer".into()))?;
        let tick_secs = env_var_or("TASK_SCHEDULER_TICK_SECS", "60")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("TASK_SCHEDULER_TICK_SECS".into(), "must be a positive integer".into())
            })?;

        Ok(Self {
            database_url: env_var_or("DATABASE_URL", "sqlite://srs.db"),
            bind_address: env_var_or("BIND_ADDRESS", "0.0.0.0:8080"),
            content_generator_url: env_var("CONTENT_GENERATOR_URL")?,
            semantic_grader_url: env_var("SEMANTIC_GRADER_URL")?,
            max_tasks_per_day,
            task_scheduler_tick: Duration::from_secs(tick_secs),
        })
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_or_falls_back_to_default() {
        assert_eq!(env_var_or("SRS_API_NON_EXISTENT_VAR", "fallback"), "fallback");
    }

    #[test]
    fn env_var_reports_missing_name() {
        let err = env_var("SRS_API_NON_EXISTENT_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(name) if name == "SRS_API_NON_EXISTENT_VAR"));
    }
}
