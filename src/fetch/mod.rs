use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod youtube;

use crate::Result;

/// Trait for downloading a video behind a URL into a local directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    /// Download the video and return the path of the media file
    async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// Extract the YouTube video id from a URL.
///
/// Recognizes the long form (`.../watch?v=<id>`, id runs until the next `&`)
/// and the short form (`youtu.be/<id>`, id runs until the next `?`). Any
/// other shape yields `None`.
pub fn video_id(url: &str) -> Option<String> {
    if url.contains("youtube.com/watch?v=") {
        let id = url.rsplit("v=").next().unwrap_or_default();
        let id = id.split('&').next().unwrap_or_default();
        return (!id.is_empty()).then(|| id.to_string());
    }

    if url.contains("youtu.be/") {
        let id = url.rsplit("youtu.be/").next().unwrap_or_default();
        let id = id.split('?').next().unwrap_or_default();
        return (!id.is_empty()).then(|| id.to_string());
    }

    None
}

/// Find an already-downloaded video for `id` in the video directory.
///
/// A file counts as a match when it has an `.mp4` extension and its name
/// contains the video id. Returns the first match in directory order.
pub fn find_downloaded_video(video_dir: &Path, id: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(video_dir).ok()?;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_mp4 = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("mp4"))
            .unwrap_or(false);

        if !is_mp4 {
            continue;
        }

        let name_matches = path
            .file_name()
            .map(|name| name.to_string_lossy().contains(id))
            .unwrap_or(false);

        if name_matches {
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_long_form() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(video_id(url), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn video_id_long_form_truncates_at_ampersand() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s";
        assert_eq!(video_id(url), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn video_id_short_form() {
        let url = "https://youtu.be/dQw4w9WgXcQ";
        assert_eq!(video_id(url), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn video_id_short_form_truncates_at_query() {
        let url = "https://youtu.be/dQw4w9WgXcQ?si=share";
        assert_eq!(video_id(url), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn video_id_unrecognized_shape() {
        assert_eq!(video_id("https://example.com/"), None);
        assert_eq!(video_id("https://vimeo.com/12345"), None);
    }

    #[test]
    fn video_id_empty_token_is_none() {
        assert_eq!(video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(video_id("https://youtu.be/"), None);
    }

    #[test]
    fn find_downloaded_video_matches_on_id_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Some Talk [abc123].mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("Some Talk [abc123].webm"), b"x").unwrap();
        std::fs::write(dir.path().join("Unrelated [zzz999].mp4"), b"x").unwrap();

        let found = find_downloaded_video(dir.path(), "abc123").unwrap();
        assert_eq!(
            found.file_name().unwrap().to_string_lossy(),
            "Some Talk [abc123].mp4"
        );
        assert!(find_downloaded_video(dir.path(), "notthere").is_none());
    }

    #[test]
    fn find_downloaded_video_missing_dir() {
        assert!(find_downloaded_video(Path::new("does/not/exist"), "abc").is_none());
    }
}
