//! Tubeset - a CLI tool for building labeled question-answer datasets from YouTube videos
//!
//! For each URL in an input CSV this library downloads the video, extracts its
//! audio track, retrieves (or reuses) a transcript, generates question/answer
//! pairs from the transcript, and appends one record to an output dataset CSV.
//! Already-produced artifacts on disk are detected and reused, so re-running
//! the pipeline over the same input is cheap.

pub mod audio;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod fetch;
pub mod pipeline;
pub mod qa;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use dataset::{DatasetRecord, InputRow};
pub use pipeline::{OutputLayout, Pipeline};
pub use qa::QaPair;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the dataset pipeline
#[derive(thiserror::Error, Debug)]
pub enum TubesetError {
    #[error("video download failed: {0}")]
    DownloadFailed(String),

    #[error("external tool timed out after {0}s")]
    ToolTimeout(u64),

    #[error("audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("no transcript available for video {0}")]
    TranscriptUnavailable(String),
}
