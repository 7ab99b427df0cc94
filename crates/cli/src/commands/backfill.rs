//! Backfill CLI command.
//!
//! Fetches filled orders from Schwab for each account, normalizes them into
//! trade events, and folds them into the position ledger. Safe to re-run
//! over an overlapping window: the natural-key dedup turns replays into
//! no-ops.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Args;
use tracing::{debug, info, warn};

use wheelhouse_core::traits::OrderSource;
use wheelhouse_core::ConfigLoader;
use wheelhouse_data::{DatabaseClient, PgLedgerStore};
use wheelhouse_ledger::sync::{apply_batch, SyncReport};
use wheelhouse_schwab::normalize::DropReason;
use wheelhouse_schwab::{normalize_orders, SchwabClient};

/// Arguments for the backfill command.
#[derive(Args, Debug, Clone)]
pub struct BackfillArgs {
    /// Start date (YYYY-MM-DD) for fetching orders
    #[arg(long)]
    pub since: String,

    /// Specific account number to sync (default: all accounts)
    #[arg(long)]
    pub account: Option<String>,

    /// Report what would be written without touching the database
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
}

/// Runs the backfill command.
///
/// # Errors
/// Returns an error if configuration, database, or broker access fails. A
/// store failure aborts the run; normalization problems never do.
pub async fn run_backfill(args: BackfillArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;

    let since_date: NaiveDate = args
        .since
        .parse()
        .map_err(|_| anyhow!("Invalid --since date. Use YYYY-MM-DD (e.g., 2025-09-30)"))?;
    let since = Utc.from_utc_datetime(&since_date.and_time(NaiveTime::MIN));

    let client = SchwabClient::new(&config.schwab)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let store = PgLedgerStore::new(db.pool());

    let accounts = match args.account {
        Some(account) => vec![account],
        None => client.account_numbers().await?,
    };

    info!(
        since = %since,
        accounts = accounts.len(),
        dry_run = args.dry_run,
        policy = %config.sync.unknown_qualifier_policy,
        "Backfill starting"
    );

    let mut total = SyncReport::default();

    for account in &accounts {
        info!(account, "Fetching orders");
        let raw = client.fetch_orders(account, since).await?;
        let batch = normalize_orders(account, &raw);

        for dropped in &batch.dropped {
            // Equity legs are routine; everything else deserves a warning.
            if dropped.reason == DropReason::NotAnOption {
                debug!(
                    account,
                    order_id = dropped.order_id.as_deref().unwrap_or("-"),
                    "Dropped non-option leg"
                );
            } else {
                warn!(
                    account,
                    order_id = dropped.order_id.as_deref().unwrap_or("-"),
                    leg_id = dropped.leg_id.as_deref().unwrap_or("-"),
                    reason = %dropped.reason,
                    "Dropped order/leg during normalization"
                );
            }
        }

        info!(account, events = batch.events.len(), "Normalized trade events");

        let report = apply_batch(
            &store,
            &batch.events,
            config.sync.unknown_qualifier_policy,
            args.dry_run,
        )
        .await?;
        total.absorb(report);
    }

    info!("Backfill complete: {}", total.format_summary());
    Ok(())
}
