//! orca-audiobook - Convert EPUB, HTML and text files to MP3 audiobooks using Picovoice Orca

mod artifact;
mod audio;
mod config;
mod document;
mod error;
mod synthesis;
mod text;
mod tts;
mod voice;

use anyhow::{Context, Result};
use artifact::{ArtifactStore, LocalArtifactStore};
use audio::{AudiobookAssembler, Mp3Encoder};
use clap::{Parser, Subcommand};
use config::AudiobookConfig;
use error::AudiobookError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use synthesis::{SynthesisOrchestrator, SynthesisReport};
use text::ChunkKind;
use tts::SpeechEngine;
use voice::{Gender, Language};

#[derive(Parser, Debug)]
#[command(name = "orca-audiobook")]
#[command(about = "Convert EPUB, HTML and text files to MP3 audiobooks using Picovoice Orca", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the source document (.epub, .html, .xhtml, .htm, .txt)
    source: Option<PathBuf>,

    /// Narration language
    #[arg(value_enum)]
    language: Option<Language>,

    /// Narrator voice; chapter markers use the other one
    #[arg(value_enum)]
    gender: Option<Gender>,

    /// Directory for intermediate files and the finished audiobook
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory containing the orca_params_*.pv model files
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Maximum characters per synthesis request
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default model directory
    SetModelDir {
        /// Directory containing the Orca model files
        path: PathBuf,
    },
    /// Set default output directory
    SetOutputDir {
        /// Directory for the finished audiobooks
        path: PathBuf,
    },
    /// Set default chunk size
    SetChunkSize {
        /// Maximum characters per synthesis request
        value: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let (Some(source), Some(language), Some(gender)) =
        (args.source.clone(), args.language, args.gender)
    else {
        anyhow::bail!(
            "SOURCE, LANGUAGE and GENDER are required. Run 'orca-audiobook --help' for usage."
        );
    };

    if !source.exists() {
        return Err(AudiobookError::SourceNotFound(source).into());
    }

    // Config file, then environment, then flags
    let mut config = AudiobookConfig::load().context("Failed to load configuration")?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    if let Some(dir) = &args.model_dir {
        config.model_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(size) = args.chunk_size {
        config.chunk_size = size;
    }
    let config = config.validate(language, gender)?;

    let encoder = Mp3Encoder::new(&config.ffmpeg);
    if !encoder.is_available() {
        anyhow::bail!(
            "FFmpeg not found at '{}'. Install it or set 'ffmpeg' in {}",
            config.ffmpeg.display(),
            AudiobookConfig::config_path().display()
        );
    }

    if args.debug {
        eprintln!("Source: {}", source.display());
        eprintln!("Voice: {} / {}", language, gender);
        eprintln!("Models: {}", config.model_dir.display());
        eprintln!("Output dir: {}", config.output_dir.display());
        eprintln!("Chunk size: {}", config.chunk_size);
    }

    eprintln!("Parsing document: {}", source.display());
    let document = document::parse_document(&source).context("Failed to parse document")?;
    eprintln!(
        "Document: \"{}\", Chapters: {}, Words: ~{}",
        document.title,
        document.chapters.len(),
        document.total_words()
    );

    if document.chapters.is_empty() {
        anyhow::bail!("No chapters with text found in {}", source.display());
    }

    let base_name = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audiobook".to_string());

    let engine =
        tts::create_engine(&config.access_key).context("Failed to initialize speech engine")?;
    let store = LocalArtifactStore::new(&config.output_dir, &base_name);
    let orchestrator = SynthesisOrchestrator::new(
        engine.as_ref(),
        &store,
        &config.model_dir,
        language,
        gender,
    )
    .with_chunk_size(config.chunk_size);

    let report = synthesize_with_progress(&orchestrator, &document.chapters).await?;
    print_summary(&report);

    eprintln!("\nAssembling audiobook...");
    let assembler = AudiobookAssembler::new(&store, &encoder, &config.output_dir, &base_name);
    let output_path = assembler
        .assemble(report.max_index, &report.marker_indices)
        .context("Failed to assemble audiobook")?;

    let metadata = std::fs::metadata(&output_path)?;
    let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
    eprintln!("Output: {} ({:.1} MB)", output_path.display(), size_mb);

    Ok(())
}

/// `info` by default, `debug` with `--debug`; `RUST_LOG` wins over both.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

/// Run synthesis behind a progress bar.
async fn synthesize_with_progress<E, S>(
    orchestrator: &SynthesisOrchestrator<'_, E, S>,
    chapters: &[document::Chapter],
) -> Result<SynthesisReport>
where
    E: SpeechEngine + ?Sized,
    S: ArtifactStore + ?Sized,
{
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let report = orchestrator
        .run_with_progress(chapters, |progress| {
            pb.set_length(progress.total as u64);
            pb.set_position(progress.completed as u64);
            pb.set_message(format!("chapter {}", progress.outcome.chapter_index));
        })
        .await;

    pb.finish_and_clear();
    Ok(report)
}

fn print_summary(report: &SynthesisReport) {
    let failed: Vec<_> = report.failures().collect();
    eprintln!(
        "Units: {} synthesized, {} reused, {} failed",
        report.synthesized_count(),
        report.skipped_count(),
        failed.len()
    );

    for outcome in failed {
        let kind = match outcome.kind {
            ChunkKind::Body => "text",
            ChunkKind::ChapterMarker => "chapter marker",
        };
        if let Err(e) = &outcome.result {
            eprintln!("  #{} ({}): {}", outcome.global_index, kind, e);
        }
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AudiobookConfig::load()?;
            println!("Configuration file: {}", AudiobookConfig::config_path().display());
            println!();
            match &config.access_key {
                Some(_) => println!("access_key = (set)"),
                None => println!("access_key = (none, uses ${})", config::ENV_ACCESS_KEY),
            }
            match &config.model_dir {
                Some(dir) => println!("model_dir = \"{}\"", dir.display()),
                None => println!("model_dir = (none, uses ${})", config::ENV_MODEL_PATH),
            }
            match &config.output_dir {
                Some(dir) => println!("output_dir = \"{}\"", dir.display()),
                None => println!("output_dir = (none, uses ${})", config::ENV_OUTPUT_PATH),
            }
            println!("chunk_size = {}", config.chunk_size);
            println!("ffmpeg = \"{}\"", config.ffmpeg.display());
        }
        ConfigAction::SetModelDir { path } => {
            let mut config = AudiobookConfig::load()?;
            config.model_dir = Some(path.clone());
            config.save()?;
            println!("Default model directory set to: {}", path.display());
        }
        ConfigAction::SetOutputDir { path } => {
            let mut config = AudiobookConfig::load()?;
            config.output_dir = Some(path.clone());
            config.save()?;
            println!("Default output directory set to: {}", path.display());
        }
        ConfigAction::SetChunkSize { value } => {
            if *value == 0 {
                anyhow::bail!("Chunk size must be greater than zero");
            }
            let mut config = AudiobookConfig::load()?;
            config.chunk_size = *value;
            config.save()?;
            println!("Default chunk size set to: {}", value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conversion_args() {
        let args = Args::try_parse_from([
            "orca-audiobook",
            "book.epub",
            "de",
            "female",
            "--chunk-size",
            "300",
        ])
        .unwrap();

        assert_eq!(args.source, Some(PathBuf::from("book.epub")));
        assert_eq!(args.language, Some(Language::De));
        assert_eq!(args.gender, Some(Gender::Female));
        assert_eq!(args.chunk_size, Some(300));
        assert!(args.command.is_none());
    }

    #[test]
    fn test_rejects_unknown_language() {
        assert!(Args::try_parse_from(["orca-audiobook", "book.epub", "fr", "male"]).is_err());
    }

    #[test]
    fn test_parse_config_subcommand() {
        let args =
            Args::try_parse_from(["orca-audiobook", "config", "set-chunk-size", "250"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Config {
                action: ConfigAction::SetChunkSize { value: 250 }
            })
        ));
    }
}
