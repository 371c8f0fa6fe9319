use async_trait::async_trait;

pub mod youtube;

use crate::Result;

/// Trait for retrieving the transcript of a video by its id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript text, preferring languages in the configured order
    async fn fetch(&self, video_id: &str) -> Result<String>;
}

/// Collapse every run of whitespace (including newlines) into a single
/// ASCII space and trim the ends. Total over any input, idempotent.
pub fn sanitize_transcript(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
