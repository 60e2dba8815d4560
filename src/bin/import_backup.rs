//! Restore a backup file into the live database from the command line
//!
//! import-backup <FILE> [merge|replace]

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zerofinanx_server::backup::TableCounts;
use zerofinanx_server::constants::DEFAULT_BACKUP_FILE_PREFIX;
use zerofinanx_server::{open_database, BackupService, BackupSettings, ImportStrategy};

#[derive(Parser)]
#[command(name = "import-backup")]
#[command(about = "Import a ZeroFinanx database backup into the live database")]
#[command(version)]
struct Cli {
    /// Backup file to import
    file: PathBuf,

    /// Import strategy: "merge" keeps existing rows, "replace" clears them first
    #[arg(default_value = "merge")]
    strategy: ImportStrategy,

    /// Live database file
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/zerofinanx.db")]
    database: PathBuf,

    /// Directory receiving the safety backup taken before the import
    #[arg(long, env = "BACKUP_DIR", default_value = "./data/backups")]
    backup_dir: PathBuf,

    /// File name prefix of backup artifacts
    #[arg(long, env = "BACKUP_FILE_PREFIX", default_value = DEFAULT_BACKUP_FILE_PREFIX)]
    prefix: String,
}

fn print_counts(title: &str, counts: &TableCounts) {
    println!("{title}");
    println!("- Users: {}", counts.users);
    println!("- Calculators: {}", counts.calculators);
    println!("- Lessons: {}", counts.lessons);
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zerofinanx_server=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if !cli.file.exists() {
        eprintln!("Error: Backup file not found: {}", cli.file.display());
        return Ok(ExitCode::FAILURE);
    }

    println!("Importing backup from: {}", cli.file.display());
    println!("Strategy: {}", cli.strategy);
    println!();

    let db = open_database(&cli.database).await?;
    let service = BackupService::new(
        db.clone(),
        BackupSettings {
            backup_dir: cli.backup_dir,
            file_prefix: cli.prefix,
        },
    );

    print_counts("Current database status:", &service.database_stats().await);
    println!();

    println!("Starting import...");
    let code = match service.import_database(&cli.file, cli.strategy).await {
        Ok(report) => {
            println!("Import completed successfully!");
            println!("Message: {}", report.message());
            println!();
            print_counts("Imported data:", &report.counts);
            println!();
            println!(
                "Backup of original data saved to: {}",
                report.backup_file_path.display()
            );
            println!();
            print_counts("Final database status:", &service.database_stats().await);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Import failed!");
            eprintln!("Error: {e}");
            if let Some(path) = e.backup_path() {
                println!("Your original data has been backed up to: {}", path.display());
            }
            ExitCode::FAILURE
        }
    };

    db.close().await;

    Ok(code)
}
