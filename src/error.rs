use thiserror::Error;

/// Failures reported by a caption source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The extraction tool could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The extraction tool ran and reported an error; carries its message verbatim
    #[error("{0}")]
    Extraction(String),

    /// The extraction tool did not finish in time
    #[error("Caption extraction timed out after {0} seconds")]
    Timeout(u64),

    /// Video metadata was missing or unreadable
    #[error("Invalid video metadata: {0}")]
    Metadata(String),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a transcript request
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// The caption source could not resolve or fetch the video
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The video has no caption track in the requested language
    #[error("No transcript available in language: {language}")]
    LanguageUnavailable {
        language: String,
        available_languages: Vec<String>,
    },
}

impl TranscriptError {
    /// Languages a client can retry with; only known when the language was missing.
    pub fn available_languages(&self) -> Option<&[String]> {
        match self {
            TranscriptError::LanguageUnavailable {
                available_languages,
                ..
            } => Some(available_languages),
            TranscriptError::Source(_) => None,
        }
    }
}

/// Process-level errors (startup, binding)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ServerError>;
