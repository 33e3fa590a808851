//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{ServerConfig, SourceConfig};

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Caption source settings
    pub source: Option<SourceSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
    /// Caption language used when a request has none
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// yt-dlp program
    pub binary: Option<String>,
    /// `--sub-format` value
    pub sub_format: Option<String>,
    /// `--convert-subs` value; an empty string disables conversion
    pub convert_subs: Option<String>,
    /// Extraction timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Extra yt-dlp arguments
    pub extra_args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 5001,
                cors_enabled: Some(true),
                default_language: Some("en".to_string()),
            },
            source: Some(SourceSettings {
                binary: Some("yt-dlp".to_string()),
                sub_format: Some("srt/best".to_string()),
                convert_subs: Some("srt".to_string()),
                timeout_secs: None,
                extra_args: Some(Vec::new()),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let source_defaults = SourceConfig::default();

        let source = match self.source {
            Some(s) => SourceConfig {
                binary: s.binary.unwrap_or(source_defaults.binary),
                sub_format: s.sub_format.unwrap_or(source_defaults.sub_format),
                convert_subs: match s.convert_subs {
                    Some(c) if c.is_empty() => None,
                    Some(c) => Some(c),
                    None => source_defaults.convert_subs,
                },
                timeout_secs: s.timeout_secs,
                extra_args: s.extra_args.unwrap_or_default(),
            },
            None => source_defaults,
        };

        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or(defaults.log_format)),
            None => (defaults.log_level, defaults.log_format),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            cors_enabled: self.server.cors_enabled.unwrap_or(defaults.cors_enabled),
            log_level,
            log_format,
            default_language: self
                .server
                .default_language
                .unwrap_or(defaults.default_language),
            source,
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default_config();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.server.default_language.as_deref(), Some("en"));
    }

    #[test]
    fn test_minimal_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nhost = \"127.0.0.1\"\nport = 8000\n")
            .unwrap();

        let config = ConfigFile::from_file(temp_file.path())
            .unwrap()
            .into_server_config();
        assert_eq!(config.socket_addr(), "127.0.0.1:8000");
        assert!(config.cors_enabled);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.source.binary, "yt-dlp");
        assert_eq!(config.source.convert_subs.as_deref(), Some("srt"));
    }

    #[test]
    fn test_source_settings() {
        let content = r#"
[server]
host = "0.0.0.0"
port = 5001

[source]
binary = "/usr/local/bin/yt-dlp"
convert_subs = ""
timeout_secs = 90
extra_args = ["--cookies", "/etc/cookies.txt"]

[logging]
level = "debug"
format = "json"
"#;
        let config: ConfigFile = toml::from_str(content).unwrap();
        let config = config.into_server_config();
        assert_eq!(config.source.binary, "/usr/local/bin/yt-dlp");
        assert_eq!(config.source.convert_subs, None);
        assert_eq!(config.source.timeout_secs, Some(90));
        assert_eq!(config.source.extra_args, vec!["--cookies", "/etc/cookies.txt"]);
        assert_eq!(config.source.sub_format, "srt/best");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn test_invalid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[server]\nport = \"nope\"\n").unwrap();
        assert!(ConfigFile::from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_generate_default_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        generate_default_config(&path).unwrap();

        let loaded = ConfigFile::from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 5001);
        let config = loaded.into_server_config();
        assert_eq!(config.source.sub_format, "srt/best");
        assert_eq!(config.log_format, "pretty");
    }
}
