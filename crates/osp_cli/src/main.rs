use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use osp_cli::commands;
use osp_service::bootstrap::build_service;
use osp_service::config::Config;

#[derive(Parser)]
#[command(name = "osp_forge")]
#[command(about = "Operator toolchain for the online service portal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the database schema from embedded assets
    Rebuild(commands::rebuild::RebuildArgs),

    /// Install the default service catalog
    Seed(commands::seed::SeedArgs),

    /// Mint a staff bearer token
    IssueToken(commands::issue_token::IssueTokenArgs),

    /// Print the service catalog
    Services(commands::services::ServicesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    // 1. Load Config (Fails fast if invalid)
    let config = Config::from_env()?;

    // 2. Parse arguments and route to the correct command
    let cli = Cli::parse();

    match cli.command {
        Commands::Rebuild(args) => {
            commands::require_postgres(&config, "rebuild")?;
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            commands::rebuild::execute(pool, args).await?;
        }
        Commands::Seed(args) => {
            commands::require_postgres(&config, "seed")?;
            let service = build_service(&config).await?;
            commands::seed::execute(&service, args).await?;
        }
        Commands::IssueToken(args) => {
            // Printed bare so it can be piped
            let token = commands::issue_token::execute(&config.jwt_secret, args)?;
            println!("{}", token);
        }
        Commands::Services(args) => {
            commands::require_postgres(&config, "services")?;
            let service = build_service(&config).await?;
            commands::services::execute(&service, args).await?;
        }
    }

    Ok(())
}
