// ABOUTME: Entry point for the esm binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and dispatches capture, list, export, and reminder commands.

mod config;
mod reminder;

use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use esm_core::{Collection, vlog_file_name};
use esm_store::{Backend, ExportLayout, RecordStore, StorageManager, build_export};

use crate::config::EsmConfig;
use crate::reminder::run_reminders;

#[derive(Debug, Parser)]
#[command(
    name = "esm",
    version,
    about = "Experience sampling: record mood, location and vlog check-ins locally and export them"
)]
struct Cli {
    /// Data directory (overrides ESM_HOME).
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Storage backend: sqlite or document (overrides ESM_BACKEND).
    #[arg(long, global = true)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record a new check-in.
    Record {
        #[command(subcommand)]
        capture: Capture,
    },
    /// List a collection, newest first.
    List {
        /// sentiments, locations, or vlogs
        collection: Collection,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show how many records each collection holds.
    Stats,
    /// Write every collection to the data/ export directory.
    Export {
        /// Write one file per collection plus summary.json instead of a single bundle.
        #[arg(long)]
        split: bool,
    },
    /// Delete every record in every collection.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Print the next reminder times.
    Schedule {
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
    /// Announce reminders at the scheduled times until interrupted.
    Remind,
}

#[derive(Debug, Subcommand)]
enum Capture {
    /// Mood, energy and stress, each 1 to 5.
    Sentiment {
        #[arg(long, allow_negative_numbers = true)]
        mood: i64,
        #[arg(long, allow_negative_numbers = true)]
        energy: i64,
        #[arg(long, allow_negative_numbers = true)]
        stress: i64,
    },
    /// A GPS fix in decimal degrees.
    Location {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// A reference to a recorded clip. Defaults to a fresh vlog_<millis>.mp4 under <home>/vlogs.
    Vlog { path: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("esm=info,esm_store=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = EsmConfig::from_env().context("failed to load configuration")?;
    if let Some(home) = cli.home {
        config.home = home;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    tracing::debug!(home = %config.home.display(), backend = %config.backend, "configuration loaded");

    match cli.command {
        Command::Schedule { count } => {
            for at in config.reminders.upcoming(Local::now().naive_local(), count) {
                println!("{}", at.format("%Y-%m-%d %H:%M"));
            }
            Ok(())
        }
        Command::Remind => run_reminders(&config.reminders).await,
        command => run_store_command(command, &config),
    }
}

fn run_store_command(command: Command, config: &EsmConfig) -> anyhow::Result<()> {
    let manager = StorageManager::new(config.home.clone())
        .with_context(|| format!("failed to prepare {}", config.home.display()))?;
    let store = manager
        .open_store(config.backend)
        .with_context(|| format!("failed to open {} store", config.backend))?;

    match command {
        Command::Record { capture } => record(store.as_ref(), &manager, capture),
        Command::List { collection, json } => list(store.as_ref(), collection, json),
        Command::Stats => {
            let counts = store.counts()?;
            println!("sentiments {}", counts.sentiments);
            println!("locations  {}", counts.locations);
            println!("vlogs      {}", counts.vlogs);
            Ok(())
        }
        Command::Export { split } => {
            let bundle = build_export(store.as_ref()).context("export failed")?;
            let layout = if split {
                ExportLayout::Split
            } else {
                ExportLayout::Bundle
            };
            let path = manager
                .write_export(&bundle, layout)
                .context("failed to write export")?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to clear all records without --yes");
            }
            store.clear_all()?;
            println!("cleared");
            Ok(())
        }
        Command::Schedule { .. } | Command::Remind => Ok(()),
    }
}

fn record(
    store: &dyn RecordStore,
    manager: &StorageManager,
    capture: Capture,
) -> anyhow::Result<()> {
    let json = match capture {
        Capture::Sentiment {
            mood,
            energy,
            stress,
        } => serde_json::to_string(&store.insert_sentiment(mood, energy, stress)?)?,
        Capture::Location { lat, lon } => {
            serde_json::to_string(&store.insert_location(lat, lon)?)?
        }
        Capture::Vlog { path } => {
            let path = path.unwrap_or_else(|| {
                manager
                    .vlogs_dir()
                    .join(vlog_file_name(Utc::now()))
                    .to_string_lossy()
                    .into_owned()
            });
            serde_json::to_string(&store.insert_vlog(&path)?)?
        }
    };
    println!("{json}");
    Ok(())
}

fn list(store: &dyn RecordStore, collection: Collection, json: bool) -> anyhow::Result<()> {
    match collection {
        Collection::Sentiments => {
            let records = store.list_sentiments()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            for r in &records {
                println!(
                    "{:>5}  {}  mood {}  energy {}  stress {}",
                    r.id,
                    local_time(&r.created_at),
                    r.mood,
                    r.energy,
                    r.stress
                );
            }
        }
        Collection::Locations => {
            let records = store.list_locations()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            for r in &records {
                println!(
                    "{:>5}  {}  {:.6}, {:.6}",
                    r.id,
                    local_time(&r.created_at),
                    r.latitude,
                    r.longitude
                );
            }
        }
        Collection::Vlogs => {
            let records = store.list_vlogs()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            for r in &records {
                println!(
                    "{:>5}  {}  {}  ({})",
                    r.id,
                    local_time(&r.created_at),
                    r.file_name().unwrap_or("?"),
                    r.file_path
                );
            }
        }
    }
    Ok(())
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}
