mod detect;
mod export;
mod extract;
mod heuristics;
mod orchestrator;
mod page;
mod record;
mod service;
mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::warn;

use page::Page;
use record::RecordKind;
use service::StoreHandle;

#[derive(Parser)]
#[command(
    name = "crm_extractor",
    about = "Extract CRM records from saved Salesforce pages into a local store"
)]
struct Cli {
    /// Store database path
    #[arg(long, global = true, default_value = store::DEFAULT_DB_PATH)]
    db: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from saved page snapshots and merge them into the store
    Extract {
        /// Saved HTML page files
        files: Vec<PathBuf>,
        /// Page URL, used for object-type detection (falls back to the
        /// page title when omitted)
        #[arg(long)]
        url: Option<String>,
    },
    /// Compact table of one collection
    List {
        kind: RecordKind,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Per-kind record counts and last-sync times
    Stats,
    /// Export the store as JSON or CSV
    Export {
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete one record from a collection
    Delete { kind: RecordKind, id: String },
    /// Clear every collection and the sync state
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let conn = store::connect(&cli.db)?;
    let handle = service::spawn(conn);

    match cli.command {
        Commands::Extract { files, url } => extract_files(&handle, &files, url.as_deref()).await,
        Commands::List { kind, limit } => {
            let root = handle.get_data().await?;
            let records = root.collection(kind);
            if records.is_empty() {
                println!("No {kind} stored.");
                return Ok(());
            }
            println!("{:>3} | {:<20} | {:<30} | {:>6}", "#", "Id", "Name", "Fields");
            println!("{}", "-".repeat(70));
            for (i, rec) in records.iter().take(limit).enumerate() {
                println!(
                    "{:>3} | {:<20} | {:<30} | {:>6}",
                    i + 1,
                    truncate(rec.id(), 20),
                    truncate(rec.display_name(), 30),
                    rec.data_field_count(),
                );
            }
            println!("\n{} of {} {}", records.len().min(limit), records.len(), kind);
            Ok(())
        }
        Commands::Stats => {
            let root = handle.get_data().await?;
            for kind in RecordKind::ALL {
                let last = root
                    .last_sync
                    .get(&kind)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "never".into());
                println!(
                    "{:<15} {:>6}   last sync: {}",
                    kind,
                    root.collection(kind).len(),
                    last
                );
            }
            Ok(())
        }
        Commands::Export { format, output } => {
            let root = handle.get_data().await?;
            let rendered = match format {
                ExportFormat::Json => export::to_json(&root)?,
                ExportFormat::Csv => export::to_csv(&root),
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{rendered}"),
            }
            Ok(())
        }
        Commands::Delete { kind, id } => {
            let ack = handle.delete_record(kind, id.clone()).await?;
            if ack.success {
                println!("Deleted {id} from {kind} (no-op if it was absent).");
                Ok(())
            } else {
                anyhow::bail!("delete failed");
            }
        }
        Commands::Clear => {
            let ack = handle.clear_all().await?;
            if ack.success {
                println!("Store cleared.");
                Ok(())
            } else {
                anyhow::bail!("clear failed");
            }
        }
    }
}

async fn extract_files(handle: &StoreHandle, files: &[PathBuf], url: Option<&str>) -> Result<()> {
    if files.is_empty() {
        println!("No input files.");
        return Ok(());
    }

    if let [file] = files {
        let page = Page::from_file(file, url)?;
        let outcome = orchestrator::run(&page, handle).await?;
        println!("Extracted {} {}", outcome.count, outcome.object_type);
        return Ok(());
    }

    // Batch mode: classify + extract in parallel, then merge each
    // batch through the channel in order.
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let extracted = Page::from_file(path, url)
                .and_then(|p| orchestrator::extract_page(&p).map_err(anyhow::Error::new));
            pb.inc(1);
            (path.clone(), extracted)
        })
        .collect();
    pb.finish_and_clear();

    let mut stored = 0usize;
    let mut failed = 0usize;
    for (path, extracted) in results {
        match extracted {
            Ok((kind, records)) => match orchestrator::deliver(kind, records, handle).await {
                Ok(outcome) => stored += outcome.count,
                Err(e) => {
                    failed += 1;
                    warn!("{}: {e}", path.display());
                }
            },
            Err(e) => {
                failed += 1;
                warn!("{}: {e:#}", path.display());
            }
        }
    }

    println!(
        "Stored {} records from {} pages ({} failed).",
        stored,
        files.len(),
        failed
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
