//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - The transcript service (with its caption source)
//! - Server configuration
//!
//! Nothing in it is mutated after startup.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::source::YtDlpSource;
use crate::transcript::TranscriptService;

/// Application state shared across all handlers
pub struct AppState {
    /// Transcript service used by the transcript endpoints
    pub transcripts: TranscriptService,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create a new AppState around an existing service
    pub fn new(config: ServerConfig, transcripts: TranscriptService) -> Self {
        Self {
            transcripts,
            config,
        }
    }

    /// Create AppState backed by yt-dlp as configured
    pub fn with_ytdlp(config: ServerConfig) -> Self {
        let source = Arc::new(YtDlpSource::new(config.source.clone()));
        Self::new(config, TranscriptService::new(source))
    }

    /// Language used when a request does not name one
    pub fn default_language(&self) -> &str {
        &self.config.default_language
    }
}
