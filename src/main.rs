//! MystiView CLI
//!
//! Command-line front end for the palm reading pipeline:
//! - Get a reading for a palm photo
//! - Optimize a photo the way it would be uploaded
//! - Parse a saved reading into sections
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use mystiview::reading::SHARE_TITLE;
use mystiview::{
    is_share_section, parse_sections, section_anchor, share_text, AnalysisClient, Config,
    FortuneSection, LoggingConfig, ReadingSession,
};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DISCLAIMER: &str = "This is for entertainment purposes only. No scientific basis.";

#[derive(Parser)]
#[command(name = "mystiview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AI palm reading from the command line")]
#[command(long_about = "MystiView sends a photo of your palm to the palm reading API.\nDiscover what your palm says about your personality, career, and hidden talents.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/mystiview/config.toml or ./mystiview.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Palm reading API URL (overrides config and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get a palm reading for a photo
    Read {
        /// Palm photo (JPG or PNG, max 10MB)
        image: PathBuf,
        /// Link to include in the share text
        #[arg(long)]
        share_url: Option<String>,
        /// Hide the progress indicator
        #[arg(short, long)]
        quiet: bool,
    },

    /// Optimize a photo the way it is prepared for upload
    Compress {
        /// Photo to optimize
        image: PathBuf,
        /// Output file (default: <name>-optimized.jpg next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split a saved reading into sections
    Parse {
        /// Reading text file (default: stdin)
        input: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!("MystiView v{}", env!("CARGO_PKG_VERSION"));

    let json = cli.format == "json";

    match cli.command {
        Commands::Read {
            image,
            share_url,
            quiet,
        } => {
            let client = AnalysisClient::new(config.api.client_config())?;
            tracing::info!("Palm reading API: {}", client.endpoint());

            let mut session = ReadingSession::with_parts(
                client,
                config.image.validator(),
                config.image.compressor(),
                config.progress.clone(),
            );

            let photo = match config.image.validator().load(&image).await {
                Ok(photo) => photo,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = session.select_image(photo).await {
                eprintln!("{}", e);
                std::process::exit(1);
            }

            let progress = (!quiet).then(|| show_progress(session.progress()));
            let outcome = session.analyze().await.map(|_| ());
            if let Some(handle) = progress {
                handle.abort();
                let _ = handle.await;
                // The channel is already back at 0 here
                eprintln!("{}", progress_line(100));
            }

            if let Err(e) = outcome {
                eprintln!("{}", e);
                std::process::exit(1);
            }

            let Some(reading) = session.reading() else {
                anyhow::bail!("analysis finished without a reading");
            };
            let audio_url = session.analyzer().resolve_audio_url(&reading.result.audio_url);

            if json {
                let output = serde_json::json!({
                    "text": reading.result.text,
                    "audio_url": audio_url,
                    "sections": reading.sections,
                    "received_at": reading.received_at,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Your Mystical Palm Reading");
                println!();

                if reading.sections.is_empty() {
                    println!("{}", reading.result.text.trim());
                    println!();
                } else {
                    print_sections(&reading.sections, share_url.as_deref());
                }

                if let Some(url) = audio_url {
                    println!("🎧 Listen to your reading: {}", url);
                    println!();
                }

                println!("{}", DISCLAIMER);
            }
        }

        Commands::Compress { image, output } => {
            let photo = match config.image.validator().load(&image).await {
                Ok(photo) => photo,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };

            let compressor = config.image.compressor();
            let optimized = match compressor.compress(&photo) {
                Ok(Cow::Owned(optimized)) => optimized,
                Ok(Cow::Borrowed(_)) => {
                    println!(
                        "{} is {:.2}MB, at or below the {:.2}MB threshold; it would be uploaded as-is",
                        photo.name,
                        photo.size_mib(),
                        compressor.config().threshold_bytes as f64 / mystiview::upload::MIB as f64
                    );
                    return Ok(());
                }
                Err(e) => {
                    eprintln!("Could not optimize {}: {}", photo.name, e);
                    eprintln!("The original file would be uploaded instead.");
                    std::process::exit(1);
                }
            };

            let path = output.unwrap_or_else(|| optimized_path(&image));
            tokio::fs::write(&path, &optimized.bytes)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;

            if json {
                let report = serde_json::json!({
                    "input": image,
                    "output": path,
                    "original_bytes": photo.size(),
                    "optimized_bytes": optimized.size(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Image optimized: {:.2}MB -> {:.2}MB",
                    photo.size_mib(),
                    optimized.size_mib()
                );
                println!("Written to {:?}", path);
            }
        }

        Commands::Parse { input } => {
            let text = match input {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {:?}", path))?,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin().read_to_string(&mut buf).await?;
                    buf
                }
            };

            let sections = parse_sections(&text);

            if json {
                println!("{}", serde_json::to_string_pretty(&sections)?);
            } else if sections.is_empty() {
                println!("No sections found.");
            } else {
                print_sections(&sections, None);
            }
        }

        Commands::Config { output } => {
            let config = mystiview::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("mystiview={}", config.level)));

    let json = config.is_json();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

/// Progress text, prefixed with `\r` so each redraw overwrites the last
fn progress_line(percent: u8) -> String {
    format!("\rPlease wait... AI is analyzing your palm lines {:>3}%", percent)
}

/// Redraw a single progress line on stderr until aborted
fn show_progress(mut rx: watch::Receiver<u8>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let percent = *rx.borrow_and_update();
            eprint!("{}", progress_line(percent));
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}

fn print_sections(sections: &[FortuneSection], share_url: Option<&str>) {
    for (index, section) in sections.iter().enumerate() {
        if is_share_section(section) {
            println!("✨ Share Your Mystical Reading");
            match share_url {
                Some(url) => {
                    println!("{}", SHARE_TITLE);
                    println!("{}", share_text(url));
                }
                None => println!("{}", section.content),
            }
        } else {
            println!(
                "{} {}  [#{}]",
                section.icon,
                section.title,
                section_anchor(&section.title, index)
            );
            println!("{}", section.content);
        }
        println!();
    }
}

/// Default output path for `compress`: `<stem>-optimized.jpg`
fn optimized_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}-optimized.jpg", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line(100),
            "\rPlease wait... AI is analyzing your palm lines 100%"
        );
        assert!(progress_line(0).ends_with("   0%"));
    }

    #[test]
    fn test_optimized_path() {
        assert_eq!(
            optimized_path(Path::new("/tmp/palm.jpg")),
            PathBuf::from("/tmp/palm-optimized.jpg")
        );
    }
}
