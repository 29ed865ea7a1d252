//! Configuration: defaults, then an optional YAML file, then environment.
//!
//! | key            | env                         | default |
//! |----------------|-----------------------------|---------|
//! | api_key        | GEMINI_API_KEY / API_KEY    | required |
//! | model          | PETTY_COURT_MODEL           | gemini-2.5-flash |
//! | base_url       | PETTY_COURT_BASE_URL        | Gemini public endpoint |
//! | timeout_secs   | PETTY_COURT_TIMEOUT_SECS    | 30 (0 disables) |
//! | daily_limit    | -                           | 3 |
//! | storage_path   | PETTY_COURT_STORAGE         | data dir |
//! | share_url      | PETTY_COURT_SHARE_URL       | https://petty-court.app |
//! | personas_path  | PETTY_COURT_PERSONAS        | built-in personas |
//!
//! The YAML file is read from `$PETTY_COURT_CONFIG` when set.

use court_core::DAILY_LIMIT;
use court_session::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CourtError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SHARE_URL: &str = "https://petty-court.app";

#[derive(Debug, Clone)]
pub struct CourtConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// `None` waits for the service indefinitely
    pub timeout: Option<Duration>,
    pub daily_limit: u32,
    /// `None` uses the platform data directory
    pub storage_path: Option<PathBuf>,
    pub share_url: String,
    /// `None` uses the built-in persona book
    pub personas_path: Option<String>,
}

/// On-disk shape; every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    daily_limit: Option<u32>,
    storage_path: Option<PathBuf>,
    share_url: Option<String>,
    personas_path: Option<String>,
}

impl CourtConfig {
    /// Load from `$PETTY_COURT_CONFIG` and the process environment
    pub fn load() -> Result<Self, CourtError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load with an injected environment lookup
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, CourtError> {
        let file = match env("PETTY_COURT_CONFIG") {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    CourtError::Config(format!("failed to read {}: {}", path, e))
                })?;
                Self::parse_file(&content)?
            }
            None => ConfigFile::default(),
        };

        let api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CourtError::Config("set GEMINI_API_KEY to your Gemini API key".to_string())
            })?;

        let timeout_secs = match env("PETTY_COURT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CourtError::Config(format!("PETTY_COURT_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let daily_limit = file.daily_limit.unwrap_or(DAILY_LIMIT);
        if daily_limit == 0 {
            return Err(CourtError::Config(
                "daily_limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            model: env("PETTY_COURT_MODEL")
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env("PETTY_COURT_BASE_URL")
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            daily_limit,
            storage_path: env("PETTY_COURT_STORAGE")
                .map(PathBuf::from)
                .or(file.storage_path),
            share_url: env("PETTY_COURT_SHARE_URL")
                .or(file.share_url)
                .unwrap_or_else(|| DEFAULT_SHARE_URL.to_string()),
            personas_path: env("PETTY_COURT_PERSONAS").or(file.personas_path),
        })
    }

    fn parse_file(content: &str) -> Result<ConfigFile, CourtError> {
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| CourtError::Config(format!("invalid config file: {}", e)))
    }
}
