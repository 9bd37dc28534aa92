use anyhow::Result;
use clap::Parser;
use tracker_cli::{Cli, Commands, run_migrate, run_serve};

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env file is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Migrate { database_url } => run_migrate(&database_url).await,
    }
}
