use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::VideoFetcher;
use crate::config::ToolsConfig;
use crate::{Result, TubesetError};

/// YouTube video downloader using yt-dlp
pub struct YtDlpFetcher {
    yt_dlp_path: String,
    timeout: Duration,
}

impl YtDlpFetcher {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            yt_dlp_path: tools.yt_dlp_path.clone(),
            timeout: Duration::from_secs(tools.timeout_secs),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl VideoFetcher for YtDlpFetcher {
    async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf> {
        fs_err::create_dir_all(output_dir)?;

        // Filenames carry the video id so later runs can find and reuse the
        // download without hitting the network again.
        let template = output_dir.join("%(title)s [%(id)s].%(ext)s");

        tracing::debug!("Downloading video: {}", url);

        let run = Command::new(&self.yt_dlp_path)
            .args([
                "--format", "best[ext=mp4]/best",
                "--no-playlist",
                "--output", &template.to_string_lossy(),
                // Print the final media path so we do not have to guess it
                "--print", "after_move:filepath",
                "--no-simulate",
                url,
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
            return Err(TubesetError::DownloadFailed(error.trim().to_string()).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| {
                TubesetError::DownloadFailed(format!("yt-dlp reported no file path for {url}"))
            })?;

        Ok(PathBuf::from(path))
    }
}
