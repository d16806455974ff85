//! newskoop-server - newsroom and radio content distribution server

mod config;
mod database;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::AppConfig;
use newsroom::NewsroomModule;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "newskoop-server", version, about = "Newskoop newsroom server")]
struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, global = true, env = "NEWSKOOP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create the first super-admin account
    CreateSuperadmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, env = "NEWSKOOP_SUPERADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    telemetry::init(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Newskoop server"
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run(config).await,
        Command::Migrate => {
            let db = database::connect(&config.database).await?;
            NewsroomModule::migrate(&db).await
        }
        Command::CreateSuperadmin {
            email,
            first_name,
            last_name,
            password,
        } => {
            let module = server::bootstrap(&config).await?;
            let user = module
                .service()
                .bootstrap_superadmin(&email, &first_name, &last_name, &password)
                .await
                .context("failed to create super-admin")?;
            tracing::info!(user_id = %user.id, email = %user.email, "super-admin created");
            Ok(())
        }
    }
}
