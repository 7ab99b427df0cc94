use clap::{Parser, Subcommand};

mod commands;

use commands::{
    BackfillArgs, LiveUpdateArgs, ReportArgs, SeedArgs, SetContractsArgs,
};

#[derive(Parser)]
#[command(name = "wheelhouse")]
#[command(about = "Options position ledger and portfolio analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backfill broker trades into the position ledger
    Backfill(BackfillArgs),
    /// Refresh live marks/IV/delta and rerun analytics
    LiveUpdate(LiveUpdateArgs),
    /// Print the analytics table and portfolio summary
    Report(ReportArgs),
    /// Seed a position that predates the backfill window
    Seed(SeedArgs),
    /// Correct the contract count of an existing position
    SetContracts(SetContractsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Backfill(args) => commands::run_backfill(args).await?,
        Commands::LiveUpdate(args) => commands::run_live_update(args).await?,
        Commands::Report(args) => commands::run_report(args).await?,
        Commands::Seed(args) => commands::run_seed(args).await?,
        Commands::SetContracts(args) => commands::run_set_contracts(args).await?,
    }

    Ok(())
}
