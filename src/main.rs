use anyhow::bail;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use talskrift::config::{self, Config};
use talskrift::export::ExportFormat;
use talskrift::models;
use talskrift::queue::worker::{self, WorkerSettings};
use talskrift::queue::{JobUpdate, TranscriptionJob};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "talskrift")]
#[command(author, version, about = "Batch transcription of Swedish audio with subtitle export", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the GUI (default)
    Gui {
        /// Audio files to pre-populate the list with
        files: Vec<PathBuf>,
    },

    /// Headless batch transcription
    Transcribe {
        /// Audio files to transcribe
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format (txt, srt, vtt, json, all)
        #[arg(short, long, default_value = "all")]
        format: String,

        /// Output directory (default: from config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Model name (default: from config)
        #[arg(short, long)]
        model: Option<String>,

        /// Language code, or "auto" (default: from config)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Manage Whisper models
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Configure settings
    Config {
        /// Set the model (see 'talskrift model list')
        #[arg(long)]
        model: Option<String>,

        /// Set the language (sv, en, auto, ...)
        #[arg(long)]
        language: Option<String>,

        /// Set the export output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download a model
    Download {
        /// Model name (see 'talskrift model list')
        name: String,
    },

    /// List available models
    List,

    /// Remove a downloaded model
    Remove {
        /// Model name
        name: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("talskrift=debug,whisper_rs=info")
    } else {
        EnvFilter::new("talskrift=info,whisper_rs=warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    talskrift::panic_handler::install();

    match cli.command.unwrap_or(Commands::Gui { files: Vec::new() }) {
        Commands::Gui { files } => {
            info!("Starting Talskrift GUI");
            talskrift::gui::run(files)?;
        }

        Commands::Transcribe {
            files,
            format,
            output_dir,
            model,
            language,
        } => {
            transcribe_batch(files, &format, output_dir, model, language).await?;
        }

        Commands::Model { action } => match action {
            ModelAction::Download { name } => {
                models::download::download(&name).await?;
            }
            ModelAction::List => {
                models::list()?;
            }
            ModelAction::Remove { name } => {
                models::remove(&name)?;
            }
        },

        Commands::Config {
            model,
            language,
            output_dir,
            show,
        } => {
            if show {
                config::show()?;
            } else {
                config::update(model, language, output_dir)?;
            }
        }
    }

    Ok(())
}

/// Run a headless batch over the same worker the GUI uses.
async fn transcribe_batch(
    files: Vec<PathBuf>,
    format: &str,
    output_dir: Option<PathBuf>,
    model: Option<String>,
    language: Option<String>,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(model) = model {
        config.model.name = model;
    }
    if let Some(language) = language {
        config.model.language = language;
    }
    if let Some(dir) = output_dir {
        config.export.output_dir = Some(dir);
    }
    config.validate()?;

    let formats: Vec<ExportFormat> = if format.eq_ignore_ascii_case("all") {
        ExportFormat::ALL.to_vec()
    } else {
        vec![format.parse().map_err(|e: String| anyhow::anyhow!(e))?]
    };

    let mut settings = WorkerSettings::from_config(&config)?;
    settings.formats = formats;

    let jobs: Vec<TranscriptionJob> = files
        .iter()
        .enumerate()
        .map(|(i, path)| TranscriptionJob {
            id: i as u64,
            path: path.clone(),
        })
        .collect();

    let names: HashMap<u64, String> = jobs
        .iter()
        .map(|job| (job.id, job.path.display().to_string()))
        .collect();
    let total = jobs.len();

    println!(
        "Transcribing {} file(s) to {}",
        total,
        settings.output_dir.display()
    );

    let mut rx = worker::spawn_batch(jobs, settings);
    let mut failed = 0usize;

    while let Some(update) = rx.recv().await {
        match update {
            JobUpdate::Started { id } => {
                println!("Transcribing {}...", names[&id]);
            }
            JobUpdate::Completed { exports, .. } => {
                println!("  done ({} exports)", exports.len());
                for path in exports {
                    println!("    {}", path.display());
                }
            }
            JobUpdate::Failed { id, error } => {
                eprintln!("  failed: {} ({})", error, names[&id]);
                failed += 1;
            }
            JobUpdate::BatchFinished => break,
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) failed", failed, total);
    }
    Ok(())
}
