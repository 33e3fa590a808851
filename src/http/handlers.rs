//! HTTP request handlers
//!
//! Implements handlers for the health, version and transcript endpoints.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::TranscriptError;
use crate::source::VideoMetadata;
use crate::state::AppState;
use crate::subtitle::CaptionDocument;

/// Message returned when the `url` query parameter is absent
pub const MISSING_URL: &str = "Missing video URL parameter";

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    MissingParameter(&'static str),
    InvalidQuery(String),
    Transcript(TranscriptError),
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_languages: Option<Vec<String>>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = match self {
            HttpError::MissingParameter(msg) => ErrorBody {
                error: msg.to_string(),
                available_languages: None,
            },
            HttpError::InvalidQuery(msg) => ErrorBody {
                error: msg,
                available_languages: None,
            },
            HttpError::Transcript(err) => ErrorBody {
                error: err.to_string(),
                available_languages: err.available_languages().map(<[String]>::to_vec),
            },
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        HttpError::InvalidQuery(rejection.body_text())
    }
}

impl From<TranscriptError> for HttpError {
    fn from(err: TranscriptError) -> Self {
        HttpError::Transcript(err)
    }
}

/// Query parameters shared by the transcript endpoints
#[derive(Debug, Default)]
pub struct TranscriptQuery {
    pub url: Option<String>,
    pub lang: Option<String>,
    pub include_metadata: Option<String>,
}

impl TranscriptQuery {
    /// Build from raw query pairs. A repeated key keeps its first value;
    /// unknown keys are ignored.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "url" => &mut query.url,
                "lang" => &mut query.lang,
                "include_metadata" => &mut query.include_metadata,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    fn extract(
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Self, HttpError> {
        let Query(pairs) = query?;
        Ok(Self::from_pairs(pairs))
    }

    /// The video URL, treating an empty value as missing.
    fn video_url(&self) -> Result<&str, HttpError> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(HttpError::MissingParameter(MISSING_URL))
    }

    /// The requested language, or `default` when none was given.
    fn language<'a>(&'a self, default: &'a str) -> &'a str {
        self.lang.as_deref().filter(|l| !l.is_empty()).unwrap_or(default)
    }

    /// `include_metadata=true`, case-insensitive; anything else is false.
    fn wants_metadata(&self) -> bool {
        self.include_metadata
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Response of `GET /transcript/raw`
#[derive(Debug, Serialize)]
pub struct RawTranscriptResponse {
    pub success: bool,
    pub video_title: String,
    pub video_id: String,
    pub language: String,
    pub available_languages: Vec<String>,
    pub transcript: String,
}

/// Response of `GET /transcript/parsed`
#[derive(Debug, Serialize)]
pub struct ParsedTranscriptResponse {
    pub success: bool,
    pub video_title: String,
    pub video_id: String,
    pub video_duration: u64,
    pub language: String,
    pub available_languages: Vec<String>,
    pub transcript: CaptionDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Version information endpoint
pub async fn version_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Raw SRT transcript endpoint
/// GET /transcript/raw?url=..&lang=..
pub async fn raw_transcript(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<RawTranscriptResponse>, HttpError> {
    let query = TranscriptQuery::extract(query)?;
    let url = query.video_url()?;
    let language = query.language(state.default_language());

    let result = state.transcripts.fetch(url, language).await?;

    Ok(Json(RawTranscriptResponse {
        success: true,
        video_title: result.video_title,
        video_id: result.video_id,
        language: result.language,
        available_languages: result.available_languages,
        transcript: result.raw,
    }))
}

/// Parsed transcript endpoint
/// GET /transcript/parsed?url=..&lang=..&include_metadata=..
pub async fn parsed_transcript(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ParsedTranscriptResponse>, HttpError> {
    let query = TranscriptQuery::extract(query)?;
    let url = query.video_url()?;
    let language = query.language(state.default_language());

    let result = state.transcripts.fetch(url, language).await?;

    Ok(Json(ParsedTranscriptResponse {
        success: true,
        video_title: result.video_title,
        video_id: result.video_id,
        video_duration: result.video_duration,
        language: result.language,
        available_languages: result.available_languages,
        transcript: result.parsed,
        metadata: query.wants_metadata().then_some(result.metadata),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(url: Option<&str>, lang: Option<&str>, meta: Option<&str>) -> TranscriptQuery {
        TranscriptQuery {
            url: url.map(str::to_string),
            lang: lang.map(str::to_string),
            include_metadata: meta.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_or_empty_url() {
        assert!(query(None, None, None).video_url().is_err());
        assert!(query(Some(""), None, None).video_url().is_err());
        assert_eq!(query(Some("u"), None, None).video_url().unwrap(), "u");
    }

    #[test]
    fn test_language_default() {
        assert_eq!(query(None, None, None).language("en"), "en");
        assert_eq!(query(None, Some(""), None).language("en"), "en");
        assert_eq!(query(None, Some("de"), None).language("en"), "de");
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_keys_keep_first_value() {
        let q = TranscriptQuery::from_pairs(pairs(&[
            ("url", "first"),
            ("lang", "de"),
            ("url", "second"),
            ("lang", "fr"),
            ("other", "x"),
        ]));
        assert_eq!(q.url.as_deref(), Some("first"));
        assert_eq!(q.lang.as_deref(), Some("de"));
        assert_eq!(q.include_metadata, None);
    }

    #[tokio::test]
    async fn test_invalid_query_renders_json() {
        let response = HttpError::InvalidQuery("bad query".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "bad query" }));
    }

    #[test]
    fn test_wants_metadata() {
        assert!(query(None, None, Some("true")).wants_metadata());
        assert!(query(None, None, Some("TRUE")).wants_metadata());
        assert!(query(None, None, Some("True")).wants_metadata());
        assert!(!query(None, None, Some("1")).wants_metadata());
        assert!(!query(None, None, Some("yes")).wants_metadata());
        assert!(!query(None, None, None).wants_metadata());
    }
}
