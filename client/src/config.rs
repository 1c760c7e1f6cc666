//! Endpoint and logging configuration for the two backend services.
//!
//! Values come from the environment with hard-coded fallbacks. `from_lookup`
//! takes the lookup function so tests never touch the process environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_POST_API_URL: &str = "http://localhost:8081";
pub const DEFAULT_USER_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const POST_API_URL_VAR: &str = "AVENTURA_API_BASE_URL";
pub const USER_API_URL_VAR: &str = "AVENTURA_USER_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "AVENTURA_HTTP_TIMEOUT_SECS";
pub const POST_CLIENT_ERROR_LEVEL_VAR: &str = "AVENTURA_API_CLIENT_ERROR_LEVEL";
pub const USER_CLIENT_ERROR_LEVEL_VAR: &str = "AVENTURA_USER_CLIENT_ERROR_LEVEL";
pub const DATA_DIR_VAR: &str = "AVENTURA_DATA_DIR";

/// Severity used when logging a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(ClientError::Config(format!("unknown log level {other:?}"))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Settings for one backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Level for 4xx responses. 5xx and transport failures are always `error`.
    pub client_error_level: LogLevel,
}

impl ServiceConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client_error_level: LogLevel::Error,
        }
    }

    pub fn with_client_error_level(mut self, level: LogLevel) -> Self {
        self.client_error_level = level;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Post and comment service.
    pub posts: ServiceConfig,
    pub users: ServiceConfig,
    /// Directory for the persisted session; `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            posts: ServiceConfig::new(DEFAULT_POST_API_URL),
            // The user service answers rejected logins and registrations with
            // 400; those are expected and logged quietly.
            users: ServiceConfig::new(DEFAULT_USER_API_URL).with_client_error_level(LogLevel::Warn),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = var(POST_API_URL_VAR) {
            config.posts.base_url = url;
        }
        if let Some(url) = var(USER_API_URL_VAR) {
            config.users.base_url = url;
        }
        if let Some(raw) = var(TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("{TIMEOUT_VAR}={raw:?}: {e}")))?;
            config.posts.timeout = Duration::from_secs(secs);
            config.users.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = var(POST_CLIENT_ERROR_LEVEL_VAR) {
            config.posts.client_error_level = raw.parse()?;
        }
        if let Some(raw) = var(USER_CLIENT_ERROR_LEVEL_VAR) {
            config.users.client_error_level = raw.parse()?;
        }
        config.data_dir = var(DATA_DIR_VAR).map(PathBuf::from);
        Ok(config)
    }

    /// Point both services at explicit base URLs, keeping other defaults.
    pub fn with_base_urls(posts: &str, users: &str) -> Self {
        let mut config = Self::default();
        config.posts.base_url = posts.to_string();
        config.users.base_url = users.to_string();
        config
    }
}
