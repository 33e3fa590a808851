//! Subtitle parsing module
//!
//! This module turns caption text into structured records:
//! - Timestamp parsing (`HH:MM:SS.mmm` and the `HH:MM:SS,mmm` variant)
//! - SRT block splitting and per-block parsing
//! - Diagnostics for blocks that were skipped

pub mod srt;
pub mod timestamp;

pub use srt::{parse_captions, CaptionDocument};
