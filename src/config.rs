//! Server configuration

use serde::{Deserialize, Serialize};

/// Environment variable overriding the bind host
pub const HOST_ENV: &str = "TRANSCRIPT_HOST";

/// Environment variable overriding the bind port
pub const PORT_ENV: &str = "TRANSCRIPT_PORT";

/// Caption source (yt-dlp) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Program to run, looked up on PATH unless absolute
    pub binary: String,

    /// Value for `--sub-format`
    pub sub_format: String,

    /// Value for `--convert-subs`; `None` keeps whatever format was downloaded
    pub convert_subs: Option<String>,

    /// Kill the extraction after this many seconds; `None` waits indefinitely
    pub timeout_secs: Option<u64>,

    /// Extra arguments placed before the generated ones (cookies, proxies, ...)
    pub extra_args: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            sub_format: "srt/best".to_string(),
            convert_subs: Some("srt".to_string()),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,

    /// Caption language used when a request has no `lang`
    pub default_language: String,

    /// Caption source configuration
    pub source: SourceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            default_language: "en".to_string(),
            source: SourceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply host/port overrides from the environment.
    pub fn apply_env(&mut self) -> Result<(), crate::error::ServerError> {
        self.apply_overrides(
            std::env::var(HOST_ENV).ok(),
            std::env::var(PORT_ENV).ok(),
        )
    }

    fn apply_overrides(
        &mut self,
        host: Option<String>,
        port: Option<String>,
    ) -> Result<(), crate::error::ServerError> {
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = port.filter(|p| !p.is_empty()) {
            self.port = port.parse().map_err(|_| {
                crate::error::ServerError::Config(format!("invalid {}: {}", PORT_ENV, port))
            })?;
        }
        Ok(())
    }
}
