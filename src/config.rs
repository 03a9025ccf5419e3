//! Configuration management

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::services::MockConfig;

/// Which backend the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process mock with hard-coded data
    Mock,
    /// HTTP backend at `api_url`
    Http,
}

impl BackendKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "mock" => Some(BackendKind::Mock),
            "http" => Some(BackendKind::Http),
            _ => None,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend selection (default: mock)
    pub backend: BackendKind,

    /// Base URL for the HTTP backend
    pub api_url: String,

    /// Client-local storage file holding the session token
    pub storage_path: PathBuf,

    /// Artificial delay for mock reads
    pub mock_read_delay: Duration,

    /// Artificial delay for mock uploads
    pub mock_upload_delay: Duration,

    /// How long notifications stay visible
    pub notification_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mock,
            api_url: "http://127.0.0.1:8080".to_string(),
            storage_path: default_storage_path(),
            mock_read_delay: Duration::from_millis(300),
            mock_upload_delay: Duration::from_millis(5000),
            notification_ttl: Duration::from_millis(6000),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("DECANAT_BACKEND") {
            config.backend = match BackendKind::parse(&value) {
                Some(kind) => kind,
                None => bail!("DECANAT_BACKEND must be 'mock' or 'http', got '{}'", value),
            };
        }

        if let Ok(url) = std::env::var("DECANAT_API_URL") {
            config.api_url = url;
        }

        if let Ok(path) = std::env::var("DECANAT_STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }

        if let Some(ms) = env_millis("DECANAT_MOCK_DELAY_MS") {
            config.mock_read_delay = ms;
        }

        if let Some(ms) = env_millis("DECANAT_UPLOAD_DELAY_MS") {
            config.mock_upload_delay = ms;
        }

        if let Some(ms) = env_millis("DECANAT_NOTIFICATION_MS") {
            config.notification_ttl = ms;
        }

        Ok(config)
    }

    pub fn mock_config(&self) -> MockConfig {
        MockConfig {
            read_delay: self.mock_read_delay,
            upload_delay: self.mock_upload_delay,
        }
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("decanat")
        .join("storage.json")
}
