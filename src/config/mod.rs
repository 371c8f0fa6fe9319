use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Question/answer generation backend
    pub qa: QaConfig,

    /// Transcript retrieval settings
    pub transcript: TranscriptConfig,

    /// External tool settings
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// Chat completions endpoint of an OpenAI-compatible API
    pub api_url: String,

    /// API key; when empty, question/answer generation is skipped
    pub api_key: String,

    /// Model name sent with every request
    pub model: String,

    /// Pairs requested per transcript
    pub pair_count: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Language preference, tried in order
    pub languages: Vec<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path or name of the yt-dlp binary
    pub yt_dlp_path: String,

    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,

    /// Upper bound on a single yt-dlp or ffmpeg invocation, in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qa: QaConfig::default(),
            transcript: TranscriptConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            api_url: "http://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            pair_count: 5,
            timeout_secs: 60,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            languages: vec!["fr".to_string(), "en".to_string()],
            timeout_secs: 30,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            timeout_secs: 600,
        }
    }
}

impl Config {
    /// Load configuration from file or create default, then apply environment overrides
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            serde_yaml::from_str(&content)
                .context("Failed to parse config file")?
        } else {
            let config = Self::default();
            if let Err(e) = config.save().await {
                tracing::debug!("Could not write default config file: {e:#}");
            }
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("tubeset").join("config.yaml"))
    }

    /// Environment variables win over the config file
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("OPENAI_API_URL") {
            if !url.is_empty() {
                self.qa.api_url = url;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.qa.api_key = key;
            }
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            if !model.is_empty() {
                self.qa.model = model;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.qa.pair_count == 0 {
            anyhow::bail!("qa.pair_count must be at least 1");
        }

        if self.transcript.languages.is_empty() {
            anyhow::bail!("transcript.languages must list at least one language");
        }

        if self.qa.timeout_secs == 0 || self.transcript.timeout_secs == 0 || self.tools.timeout_secs == 0 {
            anyhow::bail!("timeouts must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  QA API URL: {}", self.qa.api_url);
        println!(
            "  QA API Key: {}",
            if self.qa.api_key.is_empty() { "(unset - generation disabled)" } else { "(set)" }
        );
        println!("  QA Model: {}", self.qa.model);
        println!("  QA Pairs per Video: {}", self.qa.pair_count);
        println!("  Transcript Languages: {}", self.transcript.languages.join(", "));
        println!("  yt-dlp: {}", self.tools.yt_dlp_path);
        println!("  ffmpeg: {}", self.tools.ffmpeg_path);
    }
}
