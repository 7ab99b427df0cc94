//! Correct the contract count for an existing position.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use tracing::{info, warn};

use wheelhouse_core::ConfigLoader;
use wheelhouse_data::{DatabaseClient, Repositories};

/// Arguments for the set-contracts command.
#[derive(Args, Debug, Clone)]
pub struct SetContractsArgs {
    /// Underlying symbol
    #[arg(long)]
    pub symbol: String,

    /// Expiration date (YYYY-MM-DD)
    #[arg(long)]
    pub expiration: String,

    /// New signed contract count
    #[arg(long, allow_hyphen_values = true)]
    pub contracts: i32,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
}

/// Runs the set-contracts command.
///
/// # Errors
/// Returns an error if arguments fail to parse or the update fails.
pub async fn run_set_contracts(args: SetContractsArgs) -> Result<()> {
    let expiration: NaiveDate = args
        .expiration
        .parse()
        .map_err(|_| anyhow!("Invalid --expiration. Use YYYY-MM-DD"))?;

    let config = ConfigLoader::load_from(&args.config)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let repos = Repositories::new(db.pool());

    let symbol = args.symbol.to_uppercase();
    let rows = repos
        .positions
        .set_contracts(&symbol, expiration, args.contracts, Utc::now())
        .await?;

    if rows == 0 {
        warn!(symbol, %expiration, "No position matched; nothing updated");
    } else {
        info!(
            symbol,
            %expiration,
            contracts = args.contracts,
            rows,
            "Updated contract count"
        );
    }
    Ok(())
}
