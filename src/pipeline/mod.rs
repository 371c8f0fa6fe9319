use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::audio::{AudioExtractor, FfmpegExtractor};
use crate::config::Config;
use crate::dataset::{self, DatasetRecord};
use crate::fetch::{self, VideoFetcher, youtube::YtDlpFetcher};
use crate::qa::{QaGenerator, QaSynthesizer};
use crate::transcript::{sanitize_transcript, TranscriptSource, youtube::CaptionClient};

/// Where artifacts and the final dataset land
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub video_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub transcript_dir: PathBuf,
    pub dataset_path: PathBuf,
}

/// The per-row pipeline orchestrator.
///
/// Each input URL passes through up to five stages: download, audio
/// extraction, transcript retrieval, sanitization, and question/answer
/// generation. Every stage first checks whether its output already exists
/// (on disk, or in the input row for QA pairs) and skips the work if so.
/// Stage failures degrade the record and never abort the run; only the
/// final dataset write may.
pub struct Pipeline {
    config: Config,
    fetcher: Box<dyn VideoFetcher>,
    audio: Box<dyn AudioExtractor>,
    transcripts: Box<dyn TranscriptSource>,
    qa: Box<dyn QaSynthesizer>,
}

impl Pipeline {
    /// Create a pipeline with the real collaborators
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = YtDlpFetcher::new(&config.tools);
        let audio = FfmpegExtractor::new(&config.tools);
        let transcripts = CaptionClient::new(&config.transcript)?;
        let qa = QaGenerator::new(config.qa.clone())?;

        Ok(Self {
            config,
            fetcher: Box::new(fetcher),
            audio: Box::new(audio),
            transcripts: Box::new(transcripts),
            qa: Box::new(qa),
        })
    }

    /// Process every row of the input table and write the dataset CSV.
    ///
    /// Rows are handled one at a time in input order; a row with an empty
    /// URL produces no record. Returns the path of the written dataset.
    pub async fn run(&self, input: &Path, layout: &OutputLayout, quiet: bool) -> Result<PathBuf> {
        fs_err::create_dir_all(&layout.video_dir)?;
        fs_err::create_dir_all(&layout.audio_dir)?;
        fs_err::create_dir_all(&layout.transcript_dir)?;

        let rows = dataset::read_input_rows(input)?;

        let progress = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(rows.len() as u64)
        };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );

        let mut records = Vec::new();
        for row in &rows {
            let url = row.url.trim();
            if url.is_empty() {
                progress.inc(1);
                continue;
            }

            progress.set_message(url.to_string());
            records.push(self.process_row(url, &row.qa_pairs, layout).await);
            progress.inc(1);
        }
        progress.finish_with_message("done");

        dataset::write_dataset(&records, &layout.dataset_path)
    }

    /// Run all stages for one URL and assemble its record
    async fn process_row(&self, url: &str, existing_qa: &str, layout: &OutputLayout) -> DatasetRecord {
        let video_id = fetch::video_id(url);

        // Download, unless a file for this id is already on disk.
        let mp4_path = match video_id.as_deref() {
            Some(id) => match fetch::find_downloaded_video(&layout.video_dir, id) {
                Some(path) => {
                    tracing::debug!("Reusing downloaded video {}", path.display());
                    Some(path)
                }
                None => self.download(url, &layout.video_dir).await,
            },
            None => self.download(url, &layout.video_dir).await,
        };

        // The media filename (sans extension) names every derived artifact.
        let title = mp4_path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mp3_path = derived_path(&layout.audio_dir, &title, "mp3");
        let transcript_path = derived_path(&layout.transcript_dir, &title, "txt");

        self.extract_audio(mp4_path.as_deref(), mp3_path.as_deref()).await;

        let (transcript, transcript_exists) = self
            .obtain_transcript(video_id.as_deref(), transcript_path.as_deref())
            .await;

        let qa_pairs = self
            .resolve_qa_pairs(existing_qa, &transcript, transcript_exists)
            .await;

        DatasetRecord {
            url: url.to_string(),
            video_id: video_id.unwrap_or_default(),
            title,
            mp4_path: mp4_path.map(path_string).unwrap_or_default(),
            // Recorded as derived even when extraction failed; presence of
            // the path is not a success claim.
            mp3_path: mp3_path.map(path_string).unwrap_or_default(),
            transcript_path: if transcript_exists {
                transcript_path.map(path_string).unwrap_or_default()
            } else {
                String::new()
            },
            transcript_exists,
            transcript,
            qa_pairs,
        }
    }

    async fn download(&self, url: &str, video_dir: &Path) -> Option<PathBuf> {
        match self.fetcher.download(url, video_dir).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Error downloading video from {url}: {e:#}");
                None
            }
        }
    }

    /// Convert to mp3 unless the source is missing or the mp3 already exists
    async fn extract_audio(&self, mp4_path: Option<&Path>, mp3_path: Option<&Path>) {
        let (Some(mp4), Some(mp3)) = (mp4_path, mp3_path) else {
            return;
        };

        if !mp4.exists() || mp3.exists() {
            return;
        }

        if let Err(e) = self.audio.extract(mp4, mp3).await {
            tracing::warn!("Error converting {} to MP3: {e:#}", mp4.display());
        }
    }

    /// Read the transcript from disk, or fetch and persist it.
    ///
    /// The disk copy keeps the raw fetched text; the returned value is the
    /// whitespace-normalized form, which is what the dataset stores and what
    /// question/answer generation consumes. `transcript_exists` is true only
    /// when transcript content was both obtained and durably on disk.
    async fn obtain_transcript(
        &self,
        video_id: Option<&str>,
        transcript_path: Option<&Path>,
    ) -> (String, bool) {
        let Some(path) = transcript_path else {
            return (String::new(), false);
        };

        if path.exists() {
            match fs_err::read_to_string(path) {
                Ok(text) => return (sanitize_transcript(&text), true),
                Err(e) => {
                    tracing::warn!("Error reading transcript {}: {e}", path.display());
                    return (String::new(), false);
                }
            }
        }

        let Some(id) = video_id else {
            return (String::new(), false);
        };

        match self.transcripts.fetch(id).await {
            Ok(text) if !text.is_empty() => match fs_err::write(path, &text) {
                Ok(()) => (sanitize_transcript(&text), true),
                Err(e) => {
                    tracing::warn!("Error saving transcript for {id}: {e}");
                    (String::new(), false)
                }
            },
            Ok(_) => {
                tracing::warn!("Empty transcript for {id}");
                (String::new(), false)
            }
            Err(e) => {
                tracing::warn!("Error fetching transcript for {id}: {e:#}");
                (String::new(), false)
            }
        }
    }

    /// Carry valid pre-existing pairs through; otherwise generate from the
    /// transcript when one was obtained; otherwise record an empty list.
    async fn resolve_qa_pairs(
        &self,
        existing: &str,
        transcript: &str,
        transcript_exists: bool,
    ) -> String {
        if let Some(value) = parse_existing_qa(existing) {
            return encode_qa(&value);
        }

        if transcript_exists && !transcript.is_empty() {
            let pairs = self
                .qa
                .generate(transcript, self.config.qa.pair_count)
                .await;
            return encode_qa(&pairs);
        }

        "[]".to_string()
    }
}

/// `{dir}/{title}.{ext}`, or nothing when the title is unknown
fn derived_path(dir: &Path, title: &str, extension: &str) -> Option<PathBuf> {
    (!title.is_empty()).then(|| dir.join(format!("{title}.{extension}")))
}

/// Pre-existing pairs are valid iff they parse to a non-empty JSON list in
/// which every element is an object carrying both `question` and `answer`.
/// Valid pairs pass through with their content (extra keys included) intact.
fn parse_existing_qa(raw: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let list = value.as_array()?;

    if list.is_empty() {
        return None;
    }

    let well_formed = list.iter().all(|element| {
        element
            .as_object()
            .map(|object| object.contains_key("question") && object.contains_key("answer"))
            .unwrap_or(false)
    });

    well_formed.then_some(value)
}

fn encode_qa<T: serde::Serialize>(pairs: &T) -> String {
    serde_json::to_string(pairs).unwrap_or_else(|_| "[]".to_string())
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
