use std::{path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_LEADERBOARD_PATH: &str = "leaderboard.csv";
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the remote question generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Upper bound for a single generation attempt.
    pub timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server-wide key used when a candidate skips entering their own.
    pub default_api_key: Option<String>,
    pub leaderboard_path: PathBuf,
    pub generator: GeneratorSettings,
}

impl Config {
    /// Reads the configuration from the process environment (after `.env` was loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_api_key = lookup("CHATGPT_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let leaderboard_path = lookup("LEADERBOARD_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADERBOARD_PATH));

        let timeout = match lookup("QUIZ_GENERATION_TIMEOUT_SECS") {
            None => DEFAULT_GENERATION_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "QUIZ_GENERATION_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            default_api_key,
            leaderboard_path,
            generator: GeneratorSettings { timeout },
        })
    }
}
