//! Seed an initial position that predates the backfill window.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use rust_decimal::Decimal;
use tracing::info;

use wheelhouse_core::ConfigLoader;
use wheelhouse_data::models::Strategy;
use wheelhouse_data::{DatabaseClient, Repositories};

/// Arguments for the seed command.
#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// Underlying symbol
    #[arg(long)]
    pub symbol: String,

    /// Strategy: ShortPut, ShortCall, LongPut, LongCall
    #[arg(long, default_value = "ShortPut")]
    pub strategy: String,

    /// Signed contract count (negative for shorts)
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    pub contracts: i32,

    /// Strike price
    #[arg(long)]
    pub strike: Decimal,

    /// Expiration date (YYYY-MM-DD)
    #[arg(long)]
    pub expiration: String,

    /// Entry fill price per contract
    #[arg(long)]
    pub entry_price: Decimal,

    /// Current mark (defaults to the entry price)
    #[arg(long)]
    pub mark: Option<Decimal>,

    /// Implied volatility at entry, as a fraction (1.29 = 129%)
    #[arg(long, default_value = "0")]
    pub entry_iv: f64,

    /// Delta at entry
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub delta: f64,

    /// Account size for exposure percentages
    #[arg(long, default_value = "0")]
    pub account_size: Decimal,

    /// Trade inception date (YYYY-MM-DD)
    #[arg(long)]
    pub entry_date: String,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
}

/// Runs the seed command.
///
/// # Errors
/// Returns an error if arguments fail to parse or the insert fails.
pub async fn run_seed(args: SeedArgs) -> Result<()> {
    let strategy = Strategy::parse(&args.strategy).ok_or_else(|| {
        anyhow!("Unknown strategy '{}'. Use ShortPut, ShortCall, LongPut, or LongCall", args.strategy)
    })?;

    let expiration: NaiveDate = args
        .expiration
        .parse()
        .map_err(|_| anyhow!("Invalid --expiration. Use YYYY-MM-DD"))?;
    let entry_date: NaiveDate = args
        .entry_date
        .parse()
        .map_err(|_| anyhow!("Invalid --entry-date. Use YYYY-MM-DD"))?;
    let entry_at = Utc.from_utc_datetime(&entry_date.and_time(NaiveTime::MIN));

    if args.strike <= Decimal::ZERO {
        return Err(anyhow!("--strike must be positive"));
    }

    let config = ConfigLoader::load_from(&args.config)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let repos = Repositories::new(db.pool());

    let id = repos
        .positions
        .seed(
            &args.symbol.to_uppercase(),
            strategy.as_str(),
            args.contracts,
            args.strike,
            expiration,
            args.entry_price,
            args.mark.unwrap_or(args.entry_price),
            args.entry_iv,
            args.delta,
            args.account_size,
            entry_at,
        )
        .await?;

    info!(
        position_id = id,
        symbol = args.symbol,
        strategy = %strategy,
        contracts = args.contracts,
        "Seeded position"
    );
    Ok(())
}
