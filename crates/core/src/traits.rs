//! Collaborator traits consumed by the reconciliation core.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

/// A source of raw broker order records.
///
/// `fetch_orders` must tolerate overlapping `since` cursors: the ledger
/// applier deduplicates on the trade natural key, so re-fetching a window is
/// safe and expected after a crash mid-batch.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Account identifiers visible to this source.
    async fn account_numbers(&self) -> Result<Vec<String>>;

    /// Raw order records for one account, entered at or after `since`.
    async fn fetch_orders(&self, account: &str, since: DateTime<Utc>) -> Result<Vec<JsonValue>>;
}

/// A live option quote for one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    /// Most recent fair value per contract.
    pub mark: Decimal,
    /// Implied volatility as a fraction (1.0 = 100%).
    pub implied_volatility: f64,
    /// Option delta.
    pub delta: f64,
}

/// A source of live option marks and greeks.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetches the current quote for a contract, or `None` when the chain or
    /// strike is no longer listed (expired/delisted). Callers warn and move
    /// on; absence is not an error.
    async fn fetch_quote(
        &self,
        symbol: &str,
        expiration: NaiveDate,
        strike: Decimal,
    ) -> Result<Option<QuoteSnapshot>>;
}
