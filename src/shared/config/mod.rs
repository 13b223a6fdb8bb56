use anyhow::{anyhow, Result};
use std::sync::OnceLock;

/// Current classification endpoint.
pub const DEFAULT_API_URL: &str = "https://api.recast.ai/v1/request";
/// Unversioned endpoint served by older API deployments.
pub const LEGACY_API_URL: &str = "https://api.recast.ai/request";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl ClientConfig {
    /// Create a ClientConfig populated from environment variables.
    ///
    /// Reads (and defaults) the following environment variables:
    /// - RECAST_API_URL (default `https://api.recast.ai/v1/request`)
    /// - RECAST_TOKEN (optional; blank values are treated as unset)
    ///
    /// # Examples
    ///
    /// ```
    /// use recast_bot::config::ClientConfig;
    ///
    /// let cfg = ClientConfig::from_env();
    /// assert!(!cfg.api_url.is_empty());
    /// ```
    pub fn from_env() -> Self {
        Self {
            api_url: env_non_empty("RECAST_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: env_non_empty("RECAST_TOKEN"),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("RECAST_TOKEN must be set"))
    }
}

static CLIENT_CONFIG: OnceLock<ClientConfig> = OnceLock::new();

pub fn client_config() -> &'static ClientConfig {
    CLIENT_CONFIG.get_or_init(ClientConfig::from_env)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogMode {
    Stdout,
    File,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub mode: LogMode,
    pub format: LogFormat,
    pub dir: Option<String>,
    pub file_name: String,
}

impl LoggingConfig {
    fn from_env() -> Self {
        Self::from_values(
            std::env::var("LOG_MODE").ok().as_deref(),
            std::env::var("LOG_FORMAT").ok().as_deref(),
            std::env::var("LOG_DIR").ok(),
            std::env::var("LOG_FILE_NAME").ok(),
        )
    }

    fn from_values(
        mode: Option<&str>,
        format: Option<&str>,
        dir: Option<String>,
        file_name: Option<String>,
    ) -> Self {
        let format = match format {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let mode = match mode {
            Some("file") => LogMode::File,
            Some("stdout") => LogMode::Stdout,
            _ => {
                if dir.is_some() {
                    LogMode::File
                } else {
                    LogMode::Stdout
                }
            }
        };

        let dir = match mode {
            LogMode::File => Some(dir.unwrap_or_else(|| "logs".to_string())),
            LogMode::Stdout => None,
        };

        Self {
            mode,
            format,
            dir,
            file_name: file_name.unwrap_or_else(|| "recast-bot.log".to_string()),
        }
    }
}

static LOGGING: OnceLock<LoggingConfig> = OnceLock::new();

pub fn logging_config() -> &'static LoggingConfig {
    LOGGING.get_or_init(LoggingConfig::from_env)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
