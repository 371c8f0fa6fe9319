use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::ToolsConfig;
use crate::{Result, TubesetError};

/// Trait for extracting the audio track of a media file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract the audio of `source` into `dest`; fails when the media has no audio track
    async fn extract(&self, source: &Path, dest: &Path) -> Result<()>;
}

/// MP3 extraction using ffmpeg
pub struct FfmpegExtractor {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegExtractor {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            ffmpeg_path: tools.ffmpeg_path.clone(),
            timeout: Duration::from_secs(tools.timeout_secs),
        }
    }

    /// Check if ffmpeg is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract(&self, source: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs_err::create_dir_all(parent)?;
        }

        tracing::debug!("Extracting audio: {} -> {}", source.display(), dest.display());

        let run = Command::new(&self.ffmpeg_path)
            .args([
                "-i", &source.to_string_lossy(),
                "-vn",
                "-acodec", "mp3",
                "-ab", "128k",
                "-ar", "44100",
                "-y",
                &dest.to_string_lossy(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| TubesetError::ToolTimeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(TubesetError::AudioExtractionFailed(error.trim().to_string()).into());
        }

        Ok(())
    }
}
