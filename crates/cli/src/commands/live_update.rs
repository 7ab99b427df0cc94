//! Live market refresh.
//!
//! For every position that is still mutable: fetch the current mark, IV,
//! and delta from the option chain, run the values through the quality
//! filters, and write the snapshot under the same status guard the ledger
//! uses. Finishes by rerunning the analytics report in-process.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use tracing::{info, warn};

use wheelhouse_core::quality::{clean_delta, clean_iv, clean_mark};
use wheelhouse_core::traits::QuoteSource;
use wheelhouse_core::ConfigLoader;
use wheelhouse_data::{DatabaseClient, Repositories};
use wheelhouse_schwab::SchwabClient;

use crate::commands::report;

/// Arguments for the live-update command.
#[derive(Args, Debug, Clone)]
pub struct LiveUpdateArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Skip the analytics report after updating
    #[arg(long, default_value = "false")]
    pub no_report: bool,
}

/// Runs the live-update command.
///
/// # Errors
/// Returns an error if configuration or database access fails. Per-position
/// quote failures are warned and skipped.
pub async fn run_live_update(args: LiveUpdateArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;

    let client = SchwabClient::new(&config.schwab)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let repos = Repositories::new(db.pool());

    let positions = repos.positions.list_updatable().await?;
    if positions.is_empty() {
        info!("No updatable positions in the ledger");
        return Ok(());
    }

    info!(count = positions.len(), "Refreshing live market data");
    let pause = Duration::from_millis(config.sync.quote_pause_ms);

    for position in &positions {
        let quote = match client
            .fetch_quote(&position.symbol, position.expiration, position.strike)
            .await
        {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                warn!(
                    symbol = position.symbol,
                    strike = %position.strike,
                    expiration = %position.expiration,
                    "Contract not found in chain; skipping"
                );
                continue;
            }
            Err(e) => {
                warn!(
                    symbol = position.symbol,
                    strike = %position.strike,
                    expiration = %position.expiration,
                    error = %e,
                    "Quote fetch failed; skipping"
                );
                continue;
            }
        };

        // Bad feed values keep the last good snapshot instead of zeroing it.
        let mark = clean_mark(quote.mark).unwrap_or(position.mark);
        let iv = clean_iv(quote.implied_volatility).unwrap_or(position.current_iv);
        let delta = match clean_delta(quote.delta) {
            Some(delta) => delta,
            None => {
                warn!(
                    symbol = position.symbol,
                    strike = %position.strike,
                    "Missing delta; keeping previous value"
                );
                position.delta
            }
        };

        let rows = repos
            .positions
            .update_market_snapshot(position.id, mark, iv, delta, Utc::now())
            .await?;

        if rows == 0 {
            warn!(
                position_id = position.id,
                symbol = position.symbol,
                "Position closed since listing; snapshot not written"
            );
        } else {
            info!(
                symbol = position.symbol,
                strike = %position.strike,
                mark = %mark,
                iv,
                delta,
                "Updated position snapshot"
            );
        }

        // Polite pacing against the quote endpoint.
        tokio::time::sleep(pause).await;
    }

    info!("All positions updated");

    if !args.no_report {
        // Analytics is an in-process call, not a spawned process.
        report::print_report(&repos, &config).await?;
    }

    Ok(())
}
