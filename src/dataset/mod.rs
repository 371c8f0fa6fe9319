use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One line of the input table
#[derive(Debug, Clone, Deserialize)]
pub struct InputRow {
    /// Video URL; rows with an empty URL are skipped entirely
    #[serde(default)]
    pub url: String,

    /// JSON-encoded list of question/answer pairs from a prior run
    #[serde(default)]
    pub qa_pairs: String,
}

/// One row of the output dataset.
///
/// `title` is the downloaded media filename without extension and doubles as
/// the naming key for every derived artifact: the mp3 is `{title}.mp3`, the
/// transcript `{title}.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub mp4_path: String,
    pub mp3_path: String,
    pub transcript_path: String,
    pub transcript_exists: bool,
    pub transcript: String,
    pub qa_pairs: String,
}

/// Read the input table; the `url` column is required, `qa_pairs` optional
pub fn read_input_rows(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open input table {}", path.display()))?;

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<InputRow>, _>>()
        .with_context(|| format!("Failed to parse input table {}", path.display()))
}

/// Write all records to `path`, header first, creating parent directories.
///
/// This is the one stage whose errors abort the run: a pipeline whose final
/// artifact cannot be written has accomplished nothing.
pub fn write_dataset(records: &[DatasetRecord], path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create dataset file {}", path.display()))?;

    for record in records {
        writer
            .serialize(record)
            .context("Failed to serialize dataset record")?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write dataset file {}", path.display()))?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(url: &str) -> DatasetRecord {
        DatasetRecord {
            url: url.to_string(),
            video_id: "abc123".to_string(),
            title: "Test Video [abc123]".to_string(),
            mp4_path: "dataset/output_mp4/Test Video [abc123].mp4".to_string(),
            mp3_path: "dataset/output_mp3/Test Video [abc123].mp3".to_string(),
            transcript_path: "dataset/output_transcripts/Test Video [abc123].txt".to_string(),
            transcript_exists: true,
            transcript: "hello world".to_string(),
            qa_pairs: r#"[{"question":"Q?","answer":"A"}]"#.to_string(),
        }
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");

        let mut quoted = sample_record("https://youtu.be/abc123");
        quoted.transcript = "a \"quoted\" phrase, with commas\nand a newline".to_string();
        let records = vec![sample_record("https://youtu.be/abc123"), quoted.clone()];

        let written = write_dataset(&records, &path).unwrap();
        assert_eq!(written, path);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(vec![
                "url",
                "video_id",
                "title",
                "mp4_path",
                "mp3_path",
                "transcript_path",
                "transcript_exists",
                "transcript",
                "qa_pairs",
            ])
        );

        let rows: Vec<DatasetRecord> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].transcript, quoted.transcript);
        assert_eq!(rows[0].qa_pairs, records[0].qa_pairs);
        assert!(rows[0].transcript_exists);
    }

    #[test]
    fn writer_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/dataset.csv");

        write_dataset(&[sample_record("https://youtu.be/abc123")], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn input_rows_without_qa_column_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        std::fs::write(&path, "url\nhttps://youtu.be/a\n\nhttps://youtu.be/b\n").unwrap();

        let rows = read_input_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].url, "https://youtu.be/a");
        assert!(rows[0].qa_pairs.is_empty());
    }

    #[test]
    fn input_rows_keep_existing_qa_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("videos.csv");
        std::fs::write(
            &path,
            "url,qa_pairs\nhttps://youtu.be/a,\"[{\"\"question\"\":\"\"Q\"\",\"\"answer\"\":\"\"A\"\"}]\"\n",
        )
        .unwrap();

        let rows = read_input_rows(&path).unwrap();
        assert_eq!(rows[0].qa_pairs, r#"[{"question":"Q","answer":"A"}]"#);
    }

    #[test]
    fn missing_input_table_is_an_error() {
        assert!(read_input_rows(Path::new("no-such-file.csv")).is_err());
    }
}
