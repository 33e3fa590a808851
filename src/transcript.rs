//! Transcript service
//!
//! Combines a caption source with the SRT parser: fetch the captions for a
//! video in one language, parse them, and bundle the result with the video
//! metadata.

use std::sync::Arc;

use crate::error::TranscriptError;
use crate::source::{CaptionSource, VideoMetadata};
use crate::subtitle::{parse_captions, CaptionDocument};

/// A fetched and parsed transcript
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    pub video_title: String,
    pub video_id: String,
    /// Duration in seconds
    pub video_duration: u64,
    pub language: String,
    /// Manual caption languages followed by auto-generated ones
    pub available_languages: Vec<String>,
    /// Caption text exactly as the source returned it
    pub raw: String,
    pub parsed: CaptionDocument,
    pub metadata: VideoMetadata,
    /// Blocks the parser could not read
    pub skipped_blocks: usize,
}

/// Fetches transcripts through an injected caption source
#[derive(Clone)]
pub struct TranscriptService {
    source: Arc<dyn CaptionSource>,
}

impl TranscriptService {
    pub fn new(source: Arc<dyn CaptionSource>) -> Self {
        Self { source }
    }

    /// Fetch and parse the transcript of `url` in `language`.
    pub async fn fetch(&self, url: &str, language: &str) -> Result<TranscriptResult, TranscriptError> {
        tracing::info!("Fetching {} transcript for {}", language, url);

        let fetch = self.source.fetch_captions(url, language).await?;
        let available_languages = fetch.video.available_languages();

        let Some(raw) = fetch.raw_text else {
            tracing::warn!(
                "No {} captions for {} (available: {:?})",
                language,
                url,
                available_languages
            );
            return Err(TranscriptError::LanguageUnavailable {
                language: language.to_string(),
                available_languages,
            });
        };

        let parsed = parse_captions(&raw);
        tracing::debug!(
            "Transcript for {}: {} record(s), {} skipped block(s)",
            fetch.video.id,
            parsed.records.len(),
            parsed.skipped.len()
        );

        let video = fetch.video;
        Ok(TranscriptResult {
            video_title: video.title,
            video_id: video.id,
            video_duration: video.duration,
            language: language.to_string(),
            available_languages,
            raw,
            parsed: parsed.records,
            metadata: video.metadata,
            skipped_blocks: parsed.skipped.len(),
        })
    }
}
