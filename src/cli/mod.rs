use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tubeset",
    about = "Tubeset - Build labeled question-answer datasets from YouTube videos",
    version,
    long_about = "A CLI tool that downloads YouTube videos listed in a CSV, extracts their audio, \
fetches transcripts, generates question/answer pairs with an OpenAI-compatible chat API, and \
writes everything to a dataset CSV. Artifacts already on disk are reused, so interrupted runs \
can simply be restarted."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process every video URL in the input CSV and write the dataset CSV
    Build {
        /// Input CSV with a `url` column (and optionally `qa_pairs` from a prior run)
        #[arg(short, long, value_name = "FILE", default_value = "videos.csv")]
        input: PathBuf,

        /// Output dataset CSV path
        #[arg(short, long, value_name = "FILE", default_value = "dataset/dataset.csv")]
        output: PathBuf,

        /// Directory for downloaded videos
        #[arg(long, value_name = "DIR", default_value = "dataset/output_mp4")]
        video_dir: PathBuf,

        /// Directory for extracted MP3 audio
        #[arg(long, value_name = "DIR", default_value = "dataset/output_mp3")]
        audio_dir: PathBuf,

        /// Directory for saved transcripts
        #[arg(long, value_name = "DIR", default_value = "dataset/output_transcripts")]
        transcript_dir: PathBuf,

        /// Question/answer pairs to request per transcript (overrides config)
        #[arg(short, long, value_name = "COUNT")]
        pairs: Option<usize>,

        /// Preferred transcript language, repeatable in priority order (overrides config)
        #[arg(short, long, value_name = "LANG")]
        language: Vec<String>,
    },

    /// Inspect or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
