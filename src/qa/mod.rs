use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::QaConfig;

/// One comprehension question and its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Trait for generating question/answer pairs from a transcript.
///
/// Generation is best-effort by contract: an unreachable backend, a missing
/// API key, or an unparseable response all yield an empty list, never an
/// error. The pipeline keeps running with absent labels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QaSynthesizer: Send + Sync {
    /// Generate `count` pairs from a transcript
    async fn generate(&self, transcript: &str, count: usize) -> Vec<QaPair>;
}

/// Question/answer generation against an OpenAI-compatible chat API
pub struct QaGenerator {
    config: QaConfig,
    http: reqwest::Client,
}

impl QaGenerator {
    pub fn new(config: QaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build QA HTTP client")?;

        Ok(Self { config, http })
    }

    async fn request_completion(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You are a helpful assistant that creates quiz questions.".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: 1024,
            temperature: 0.7,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("chat API answered HTTP {status}");
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Failed to decode chat API response")?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl QaSynthesizer for QaGenerator {
    async fn generate(&self, transcript: &str, count: usize) -> Vec<QaPair> {
        if self.config.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY not set, skipping question/answer generation");
            return Vec::new();
        }

        let prompt = format!(
            "Given the following transcript, generate {count} question-answer pairs that test \
comprehension. Return them as a JSON list of objects with 'question' and 'answer' fields.\n\
Transcript:\n{transcript}"
        );

        let content = match self.request_completion(prompt).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Question/answer generation failed: {e:#}");
                return Vec::new();
            }
        };

        match parse_qa_pairs(&content) {
            Some(pairs) => pairs,
            None => {
                tracing::warn!("Failed to parse question/answer pairs from model response");
                Vec::new()
            }
        }
    }
}

/// Parse a model response into validated pairs.
///
/// The whole response is tried as a JSON list first; failing that, the span
/// from the first `[` to the last `]` is tried. A list where any element is
/// missing `question` or `answer` is rejected as a whole, not filtered.
pub(crate) fn parse_qa_pairs(content: &str) -> Option<Vec<QaPair>> {
    if let Some(pairs) = decode_pair_list(content) {
        return Some(pairs);
    }

    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end <= start {
        return None;
    }

    decode_pair_list(&content[start..=end])
}

fn decode_pair_list(text: &str) -> Option<Vec<QaPair>> {
    serde_json::from_str(text).ok()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
