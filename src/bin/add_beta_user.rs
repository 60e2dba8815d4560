//! Grant beta access to an email address from the command line
//!
//! add-beta-user <EMAIL>

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zerofinanx_server::models::{BetaSignup, Customer};
use zerofinanx_server::open_database;

#[derive(Parser)]
#[command(name = "add-beta-user")]
#[command(about = "Add a beta user to the ZeroFinanx database")]
#[command(version)]
struct Cli {
    /// Email address to grant beta access
    email: String,

    /// Live database file
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/zerofinanx.db")]
    database: PathBuf,
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

    let email = Customer::normalize_email(&cli.email);
    if !Customer::validate_email(&email) {
        eprintln!("Invalid email format: {}", cli.email);
        return Ok(ExitCode::FAILURE);
    }

    let db = open_database(&cli.database).await?;

    let code = match Customer::grant_beta_access(&db, &email).await {
        Ok(BetaSignup::AlreadyExists) => {
            println!("User already exists: {email}");
            println!("They already have beta access!");
            ExitCode::SUCCESS
        }
        Ok(BetaSignup::Added { total_users }) => {
            println!("Successfully added beta user: {email}");
            println!("Total beta users: {total_users}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Database error: {e}");
            ExitCode::FAILURE
        }
    };

    db.close().await;

    Ok(code)
}
