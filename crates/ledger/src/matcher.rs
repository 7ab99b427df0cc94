//! Position matching.
//!
//! Every fill belongs to exactly one open lineage. The match key is
//! (symbol, strategy, strike, expiration) with status OPEN or EXPIRED; ties
//! break toward the oldest row so near-simultaneous duplicates never
//! fragment a lineage. CLOSED/ROLLED rows are invisible here; a recurring
//! key after full closure opens a brand-new lineage.

use anyhow::Result;
use tracing::info;

use wheelhouse_core::events::TradeEvent;
use wheelhouse_data::models::{NewPosition, PositionKey, PositionRecord, Strategy};
use wheelhouse_data::store::LedgerStore;

/// Derives the identity key a fill reconciles against.
///
/// Strategy classification uses the triggering fill's own direction. A
/// closing fill that arrives with no prior open lineage therefore records
/// the inverse of the logical strategy it closes.
#[must_use]
pub fn position_key(event: &TradeEvent) -> PositionKey {
    PositionKey {
        symbol: event.symbol.clone(),
        strategy: Strategy::classify(event.direction, event.kind),
        strike: event.strike,
        expiration: event.expiration,
    }
}

/// Finds the open lineage this fill belongs to, if one exists.
///
/// # Errors
/// Returns an error if the store lookup fails.
pub async fn find_position<S>(store: &S, event: &TradeEvent) -> Result<Option<PositionRecord>>
where
    S: LedgerStore + ?Sized,
{
    store.find_open_position(&position_key(event)).await
}

/// Finds the open lineage for this fill, creating one when none exists.
/// Returns the position id.
///
/// New lineages start at zero contracts; the applier moves the count
/// immediately afterwards.
///
/// # Errors
/// Returns an error if the store lookup or insert fails.
pub async fn find_or_create_position<S>(store: &S, event: &TradeEvent) -> Result<i64>
where
    S: LedgerStore + ?Sized,
{
    let key = position_key(event);

    if let Some(existing) = store.find_open_position(&key).await? {
        return Ok(existing.id);
    }

    let id = store
        .create_position(&NewPosition {
            key: key.clone(),
            entry_price: event.price,
            opened_at: event.executed_at,
        })
        .await?;

    info!(position_id = id, key = %key, "Opened new position lineage");
    Ok(id)
}
