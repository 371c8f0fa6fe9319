use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubeset::cli::{Cli, Commands};
use tubeset::config::Config;
use tubeset::pipeline::{OutputLayout, Pipeline};
use tubeset::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "tubeset=debug" } else { "tubeset=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Build {
            input,
            output,
            video_dir,
            audio_dir,
            transcript_dir,
            pairs,
            language,
        } => {
            // Missing tools are warnings, not errors: cached artifacts may
            // make the corresponding stages unnecessary.
            let missing_deps = utils::check_dependencies().await;
            if !missing_deps.is_empty() {
                eprintln!("Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   - {}", dep);
                }
                eprintln!("   (Continuing anyway - cached artifacts may cover these stages)");
            }

            let mut config = Config::load().await?;
            if let Some(pairs) = pairs {
                config.qa.pair_count = pairs;
            }
            if !language.is_empty() {
                config.transcript.languages = language;
            }
            config.validate()?;

            let layout = OutputLayout {
                video_dir,
                audio_dir,
                transcript_dir,
                dataset_path: output,
            };

            let pipeline = Pipeline::new(config)?;

            tracing::info!("Processing videos from {}", input.display());
            let written = pipeline.run(&input, &layout, cli.quiet).await?;

            println!("Dataset written to: {}", written.display());
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Configuration file initialized.");
                println!("Edit it to set the QA backend, transcript languages, and tool paths.");
            }
        }
    }

    Ok(())
}
