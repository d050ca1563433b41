//! Configuration loader and validator for the console.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::PostStatus;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub app: App,
    pub api: Api,
    pub publishing: Publishing,
}

/// Local settings: where the batch journal lives and how batches are polled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    pub poll_interval_ms: u64,
    pub watch_timeout_seconds: u64,
    #[serde(default = "default_pending_grace")]
    pub pending_grace_seconds: u64,
}

fn default_pending_grace() -> u64 {
    30
}

/// Backend connection.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Defaults applied to publish commands when flags are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Publishing {
    #[serde(default)]
    pub default_site_id: Option<i64>,
    pub status: String,
    pub max_retries: u32,
    pub retry_delay_seconds: f64,
    pub articles_per_day: u32,
    pub min_score: u8,
}

impl Publishing {
    /// Post status validated by [`load`]; falls back to draft otherwise.
    pub fn post_status(&self) -> PostStatus {
        PostStatus::parse_status(&self.status).unwrap_or_default()
    }
}

impl App {
    /// Data dir with a leading `~/` expanded.
    pub fn resolved_data_dir(&self) -> String {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => match std::env::var("HOME") {
                Ok(home) => format!("{}/{}", home.trim_end_matches('/'), rest),
                Err(_) => self.data_dir.clone(),
            },
            None => self.data_dir.clone(),
        }
    }
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.app.resolved_data_dir())
    }

    /// `DATABASE_URL` if set, else the journal inside the data dir.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{}/console.db", self.app.resolved_data_dir()))
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.app.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid("app.poll_interval_ms must be > 0"));
    }
    if cfg.app.watch_timeout_seconds == 0 {
        return Err(ConfigError::Invalid("app.watch_timeout_seconds must be > 0"));
    }

    match Url::parse(cfg.api.base_url.trim()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => {
            return Err(ConfigError::Invalid(
                "api.base_url must be an http(s) URL",
            ))
        }
    }
    if cfg.api.timeout_seconds == 0 {
        return Err(ConfigError::Invalid("api.timeout_seconds must be > 0"));
    }

    let p = &cfg.publishing;
    if PostStatus::parse_status(&p.status).is_none() {
        return Err(ConfigError::Invalid(
            "publishing.status must be one of draft, publish, private",
        ));
    }
    if !(1..=10).contains(&p.max_retries) {
        return Err(ConfigError::Invalid("publishing.max_retries must be in 1..=10"));
    }
    if !p.retry_delay_seconds.is_finite() || p.retry_delay_seconds < 0.0 {
        return Err(ConfigError::Invalid(
            "publishing.retry_delay_seconds must be >= 0",
        ));
    }
    if p.articles_per_day == 0 {
        return Err(ConfigError::Invalid("publishing.articles_per_day must be > 0"));
    }
    if p.min_score > 100 {
        return Err(ConfigError::Invalid("publishing.min_score must be <= 100"));
    }

    Ok(())
}

/// Returns the example YAML document written by `init-config`.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  poll_interval_ms: 2000
  watch_timeout_seconds: 900
  pending_grace_seconds: 30

api:
  base_url: "http://localhost:8000"
  token: ""
  timeout_seconds: 60

publishing:
  default_site_id: 1
  status: "draft"
  max_retries: 3
  retry_delay_seconds: 2.0
  articles_per_day: 5
  min_score: 70
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.publishing.post_status(), PostStatus::Draft);
        assert_eq!(cfg.publishing.default_site_id, Some(1));
    }

    #[test]
    fn invalid_base_url() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.api.base_url = "ftp://backend".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("api.base_url")),
            _ => panic!("wrong error"),
        }

        cfg.api.base_url = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_publishing_defaults() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.publishing.status = "scheduled".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("publishing.status")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.publishing.max_retries = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.publishing.retry_delay_seconds = -1.0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.publishing.articles_per_day = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.publishing.min_score = 101;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_app_settings() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.poll_interval_ms = 0;
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("poll_interval_ms")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.data_dir = "  ".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn pending_grace_defaults_when_missing() {
        let yaml = example().replace("  pending_grace_seconds: 30\n", "");
        let cfg: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(cfg.app.pending_grace_seconds, 30);
    }

    #[test]
    fn ensure_dirs_creates_data_dir() {
        let td = tempdir().unwrap();
        let data_path = td.path().join("data");
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.app.data_dir = data_path.to_string_lossy().to_string();
        cfg.ensure_dirs().unwrap();
        assert!(data_path.exists());
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.publishing.max_retries, 3);
    }

    #[test]
    fn debug_redacts_token() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.api.token = Some("very-secret".into());
        assert!(!format!("{cfg:?}").contains("very-secret"));
    }
}
