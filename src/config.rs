//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Runtime configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// JSON question file. `SURVEY_QUESTIONS_PATH`, default `questions.json`.
    pub questions_path: PathBuf,
    /// Completion report endpoint. `SURVEY_BIN_URL`; reporting is disabled when unset.
    pub report_url: Option<String>,
    /// Upper bound on one report request. `SURVEY_REPORT_TIMEOUT_SECS`, default 10.
    pub report_timeout: Duration,
    /// libSQL database file. `SURVEY_DB_PATH`, default `./data/survey-bot.db`.
    pub db_path: PathBuf,
    /// Port for the web chat and status API. `SURVEY_WS_PORT`, default 3978.
    pub ws_port: u16,
    /// Whether to read turns from stdin. `SURVEY_CLI`, default on.
    pub cli_enabled: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            questions_path: PathBuf::from("questions.json"),
            report_url: None,
            report_timeout: Duration::from_secs(10),
            db_path: PathBuf::from("./data/survey-bot.db"),
            ws_port: 3978,
            cli_enabled: true,
        }
    }
}

impl BotConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Unparseable numbers fall back to defaults;
    /// a report URL that is not http(s) is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let report_url = match get("SURVEY_BIN_URL") {
            Some(url) => Some(validate_url(url)?),
            None => None,
        };

        let report_timeout = get("SURVEY_REPORT_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.report_timeout);

        let ws_port = get("SURVEY_WS_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.ws_port);

        let cli_enabled = get("SURVEY_CLI")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(defaults.cli_enabled);

        Ok(Self {
            questions_path: get("SURVEY_QUESTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_path),
            report_url,
            report_timeout,
            db_path: get("SURVEY_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            ws_port,
            cli_enabled,
        })
    }
}

fn validate_url(url: String) -> Result<String, ConfigError> {
    let parsed = reqwest::Url::parse(&url).map_err(|e| ConfigError::InvalidValue {
        key: "SURVEY_BIN_URL".to_string(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue {
            key: "SURVEY_BIN_URL".to_string(),
            message: format!("unsupported scheme {other:?}"),
        }),
    }
}
