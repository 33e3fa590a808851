//! Caption source module
//!
//! A caption source resolves a video URL, reports its metadata and the
//! caption languages it offers, and returns the raw SRT text for one
//! language. The production source drives `yt-dlp`; tests use a fake.

pub mod ytdlp;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SourceError;

pub use ytdlp::YtDlpSource;

/// Descriptive metadata passed through to clients
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub uploader: String,
    pub upload_date: String,
    pub view_count: u64,
    pub like_count: u64,
    pub description: String,
}

/// Video information reported by a caption source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    /// Duration in whole seconds
    pub duration: u64,
    /// Languages with human-authored captions, in source order
    pub manual_languages: Vec<String>,
    /// Languages with auto-generated captions, in source order
    pub automatic_languages: Vec<String>,
    pub metadata: VideoMetadata,
}

impl VideoDetails {
    /// Manual languages followed by automatic ones, duplicates kept.
    pub fn available_languages(&self) -> Vec<String> {
        self.manual_languages
            .iter()
            .chain(self.automatic_languages.iter())
            .cloned()
            .collect()
    }
}

/// Result of a successful source lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFetch {
    /// Raw SRT text, `None` if the video has no track in the requested language
    pub raw_text: Option<String>,
    pub video: VideoDetails,
}

/// Something that can fetch captions for a video URL
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch video details and the caption text for `language`.
    async fn fetch_captions(&self, url: &str, language: &str)
        -> Result<CaptionFetch, SourceError>;
}
