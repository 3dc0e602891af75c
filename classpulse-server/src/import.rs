//! classpulse-import - load a JSON seed file into the classpulse database
//!
//! Import is skipped when the database already has activities, unless
//! `--replace` is given.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use classpulse_core::import::{import_records, load_seed_file, teacher_counts, ImportOutcome};
use classpulse_core::{Config, Database};

#[derive(Parser)]
#[command(name = "classpulse-import")]
#[command(about = "Import activity records from a JSON seed file")]
#[command(version)]
struct Args {
    /// JSON array of activity records
    #[arg(short, long)]
    file: PathBuf,

    /// Clear existing activities before importing
    #[arg(long)]
    replace: bool,

    /// Database file, overriding config
    #[arg(long)]
    database: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load().context("failed to load configuration")?;

    // Progress goes to stdout; keep log lines in the log file only
    config.logging.stderr = false;
    let _log_guard =
        classpulse_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(file = %args.file.display(), replace = args.replace, "classpulse-import starting");

    let db_path = args
        .database
        .unwrap_or_else(|| config.resolved_database_path());
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    println!("Database: {}", db_path.display());

    let records = load_seed_file(&args.file, &Local)
        .with_context(|| format!("failed to read seed file {}", args.file.display()))?;
    println!("Read {} activities from {}", records.len(), args.file.display());

    match import_records(&db, &records, args.replace).context("import failed")? {
        ImportOutcome::Skipped { existing } => {
            println!("\nWarning: database already has {} activities.", existing);
            println!("Skipping import. Re-run with --replace to clear and reseed.");
            return Ok(());
        }
        ImportOutcome::Imported { inserted, replaced } => {
            if replaced > 0 {
                println!("Removed {} existing activities", replaced);
            }
            println!("Imported {} activities", inserted);
        }
    }

    println!(
        "\nTotal activities in database: {}",
        db.count_activities().context("failed to count activities")?
    );

    let counts = teacher_counts(&db).context("failed to summarize teachers")?;
    println!("Teachers found: {}", counts.len());
    for teacher in &counts {
        println!(
            "  - {} ({}): {} activities",
            teacher.teacher_name, teacher.teacher_id, teacher.activity_count
        );
    }

    tracing::info!(teachers = counts.len(), "classpulse-import finished");
    Ok(())
}
