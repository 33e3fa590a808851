//! SubRip caption parser
//!
//! Turns the blank-line separated SRT block format into timed caption
//! records. Parsing is best effort: a block that cannot be read is skipped
//! and reported, and the rest of the document still parses.

use serde::Serialize;
use thiserror::Error;

use super::timestamp::{parse_timestamp, static_regex};

/// Separator between the start and end time on a timing line.
const TIMING_ARROW: &str = " --> ";

/// A single parsed caption block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionRecord {
    /// Sequence number as written in the source (not required to be contiguous)
    pub index: u32,
    /// Start time in seconds, millisecond precision
    pub start_seconds: f64,
    /// End time in seconds, millisecond precision
    pub end_seconds: f64,
    /// Start time exactly as written in the source
    pub start_text: String,
    /// End time exactly as written in the source
    pub end_text: String,
    /// Caption text, multiple lines joined with a single space
    pub text: String,
}

/// Caption records in the order their blocks appear in the source text.
pub type CaptionDocument = Vec<CaptionRecord>;

/// Why a block was dropped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockError {
    #[error("block has {0} line(s), expected at least 3")]
    TooFewLines(usize),

    #[error("invalid block index: {0:?}")]
    InvalidIndex(String),

    #[error("malformed timing line: {0:?}")]
    MalformedTiming(String),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Diagnostic for a block that did not produce a record
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBlock {
    /// Zero-based position of the block in the source text
    pub position: usize,
    pub reason: BlockError,
}

/// Parser output: the records plus diagnostics for dropped blocks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCaptions {
    pub records: CaptionDocument,
    pub skipped: Vec<SkippedBlock>,
}

/// Parse SRT text into caption records.
///
/// Blocks are separated by one or more whitespace-only lines. Each block
/// must have an integer index line, a `<start> --> <end>` timing line and
/// at least one text line. Blocks that fail any of these checks are logged
/// and listed in [`ParsedCaptions::skipped`]; they never fail the document.
pub fn parse_captions(text: &str) -> ParsedCaptions {
    let mut parsed = ParsedCaptions::default();

    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return parsed;
    }

    for (position, block) in split_blocks(text).enumerate() {
        match parse_block(block) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                tracing::warn!("Skipping caption block {}: {}", position, reason);
                parsed.skipped.push(SkippedBlock { position, reason });
            }
        }
    }

    tracing::debug!(
        "Parsed {} caption record(s), skipped {} block(s)",
        parsed.records.len(),
        parsed.skipped.len()
    );
    parsed
}

/// Split on runs of blank (whitespace-only) lines.
fn split_blocks(text: &str) -> impl Iterator<Item = &str> {
    static_regex!(r"\r?\n(?:[ \t\r\x0B\x0C]*\r?\n)+").split(text)
}

/// Parse one block into a record.
fn parse_block(block: &str) -> Result<CaptionRecord, BlockError> {
    let lines: Vec<&str> = block.trim().lines().collect();
    if lines.len() < 3 {
        return Err(BlockError::TooFewLines(lines.len()));
    }

    let index = lines[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| BlockError::InvalidIndex(lines[0].to_string()))?;

    let (start_text, end_text) = split_timing(lines[1])?;
    let start_seconds = parse_timestamp(start_text)
        .ok_or_else(|| BlockError::InvalidTimestamp(start_text.to_string()))?;
    let end_seconds = parse_timestamp(end_text)
        .ok_or_else(|| BlockError::InvalidTimestamp(end_text.to_string()))?;

    Ok(CaptionRecord {
        index,
        start_seconds,
        end_seconds,
        start_text: start_text.to_string(),
        end_text: end_text.to_string(),
        text: lines[2..].join(" "),
    })
}

/// Split a timing line on the arrow; exactly one arrow is allowed.
fn split_timing(line: &str) -> Result<(&str, &str), BlockError> {
    let mut parts = line.split(TIMING_ARROW);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(end), None) => Ok((start, end)),
        _ => Err(BlockError::MalformedTiming(line.to_string())),
    }
}
