use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::TranscriptSource;
use crate::config::TranscriptConfig;
use crate::TubesetError;

const TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

/// Transcript retrieval from YouTube's timedtext endpoint.
///
/// Captions are requested in the `json3` format, one language at a time in
/// preference order. A video without a published track for a language answers
/// with an empty body, which is treated as "no track", not as an error.
pub struct CaptionClient {
    http: reqwest::Client,
    languages: Vec<String>,
}

impl CaptionClient {
    pub fn new(config: &TranscriptConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build transcript HTTP client")?;

        Ok(Self {
            http,
            languages: config.languages.clone(),
        })
    }

    async fn fetch_track(&self, video_id: &str, language: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(TIMEDTEXT_URL)
            .query(&[("v", video_id), ("lang", language), ("fmt", "json3")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(
                "timedtext answered HTTP {} for {video_id} ({language})",
                response.status()
            );
            return Ok(None);
        }

        let body = response.text().await?;
        if body.is_empty() {
            return Ok(None);
        }

        let track: CaptionTrack =
            serde_json::from_str(&body).context("Failed to parse timedtext response")?;

        let text = track.joined_text();
        Ok((!text.is_empty()).then_some(text))
    }
}

#[async_trait]
impl TranscriptSource for CaptionClient {
    async fn fetch(&self, video_id: &str) -> Result<String> {
        for language in &self.languages {
            match self.fetch_track(video_id, language).await {
                Ok(Some(text)) => return Ok(text),
                Ok(None) => {
                    tracing::debug!("No {language} transcript for {video_id}");
                }
                Err(e) => {
                    tracing::debug!("Transcript lookup failed for {video_id} ({language}): {e:#}");
                }
            }
        }

        Err(TubesetError::TranscriptUnavailable(video_id.to_string()).into())
    }
}

/// Caption document in YouTube's json3 format
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
struct CaptionEvent {
    #[serde(default)]
    segs: Vec<CaptionSegment>,
}

#[derive(Debug, Deserialize)]
struct CaptionSegment {
    #[serde(default)]
    utf8: String,
}

impl CaptionTrack {
    /// Concatenate all caption segments, one space between events
    fn joined_text(&self) -> String {
        self.events
            .iter()
            .map(|event| {
                event
                    .segs
                    .iter()
                    .map(|seg| seg.utf8.as_str())
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_text_concatenates_segments() {
        let body = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 1000, "segs": [{"utf8": "hello "}, {"utf8": "there"}]},
                {"tStartMs": 1000},
                {"tStartMs": 2000, "segs": [{"utf8": "world"}]}
            ]
        }"#;

        let track: CaptionTrack = serde_json::from_str(body).unwrap();
        assert_eq!(track.joined_text(), "hello there world");
    }

    #[test]
    fn joined_text_skips_whitespace_only_events() {
        let body = r#"{"events": [{"segs": [{"utf8": "\n"}]}, {"segs": [{"utf8": "text"}]}]}"#;
        let track: CaptionTrack = serde_json::from_str(body).unwrap();
        assert_eq!(track.joined_text(), "text");
    }

    #[test]
    fn empty_document_joins_to_empty() {
        let track: CaptionTrack = serde_json::from_str("{}").unwrap();
        assert_eq!(track.joined_text(), "");
    }
}
