//! Idempotent ledger application.
//!
//! One fill in, at most one ledger row out. Duplicates are detected on the
//! trade natural key, never on broker order ids, so a re-run backfill over
//! an overlapping window is always safe.

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{info, warn};

use wheelhouse_core::events::TradeEvent;
use wheelhouse_core::policy::UnknownQualifierPolicy;
use wheelhouse_data::models::{NewTrade, TradeAction, TradeKey};
use wheelhouse_data::store::{FillUpdate, LedgerStore};

use crate::matcher;
use crate::resolver;

/// Why a fill was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The (direction, qualifier) pair could not be resolved to an action.
    Indeterminate,
    /// The event violates its own invariants (zero quantity, bad strike).
    InvalidEvent,
    /// The owning position became CLOSED/ROLLED before the update landed.
    StaleTarget { position_id: i64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indeterminate => write!(f, "indeterminate action"),
            Self::InvalidEvent => write!(f, "invalid event"),
            Self::StaleTarget { position_id } => {
                write!(f, "stale target position {position_id}")
            }
        }
    }
}

/// Outcome of applying one fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Ledger row written and position aggregates updated.
    Applied { position_id: i64 },
    /// Dry run: the fill would have been applied. `position_id` is `None`
    /// when the fill would also have opened a new lineage.
    WouldApply { position_id: Option<i64> },
    /// The natural key already exists; nothing was written.
    Duplicate { position_id: i64 },
    /// The fill was not applied; see the reason.
    Skipped(SkipReason),
}

/// Gross notional of a fill: |quantity × price × 100|.
///
/// The ×100 is the standard US equity option contract multiplier.
#[must_use]
pub fn gross_notional(quantity: u32, price: Decimal) -> Decimal {
    (Decimal::from(quantity) * price * Decimal::from(100)).abs()
}

/// Splits gross notional into (credit, debit) by fill side.
#[must_use]
pub fn split_gross(action: TradeAction, gross: Decimal) -> (Decimal, Decimal) {
    if action.is_sell() {
        (gross, Decimal::ZERO)
    } else {
        (Decimal::ZERO, gross)
    }
}

/// Applies one normalized fill to the ledger.
///
/// Sequence: resolve the action, locate (or open) the owning lineage, check
/// the natural key, then (unless `dry_run`) insert the ledger row and
/// update the position aggregates in one transaction, guarded by the
/// position still being mutable.
///
/// Classification problems are reported in the outcome, never as errors;
/// `Err` is reserved for store failures, which the caller should treat as
/// fatal for the run since downstream events depend on committed state.
///
/// # Errors
/// Returns an error if a store operation fails.
pub async fn apply<S>(
    store: &S,
    event: &TradeEvent,
    policy: UnknownQualifierPolicy,
    dry_run: bool,
) -> Result<ApplyOutcome>
where
    S: LedgerStore + ?Sized,
{
    if !event.is_valid() {
        warn!(key = %event.audit_key(), "Skipping event that violates invariants");
        return Ok(ApplyOutcome::Skipped(SkipReason::InvalidEvent));
    }

    let Some(resolution) = resolver::resolve(event.direction, event.qualifier, event.quantity, policy)
    else {
        warn!(
            key = %event.audit_key(),
            direction = %event.direction,
            qualifier = %event.qualifier,
            policy = %policy,
            "Skipping event with indeterminate action"
        );
        return Ok(ApplyOutcome::Skipped(SkipReason::Indeterminate));
    };

    let position_id = if dry_run {
        match matcher::find_position(store, event).await? {
            Some(position) => position.id,
            None => {
                info!(
                    key = %event.audit_key(),
                    action = %resolution.action,
                    contracts = resolution.contracts_delta,
                    "Dry run: would open a new lineage and record fill"
                );
                return Ok(ApplyOutcome::WouldApply { position_id: None });
            }
        }
    } else {
        matcher::find_or_create_position(store, event).await?
    };

    let key = TradeKey::new(
        position_id,
        event.executed_at,
        resolution.action,
        resolution.contracts_delta,
        event.price,
    );

    if store.trade_exists(&key).await? {
        return Ok(ApplyOutcome::Duplicate { position_id });
    }

    if dry_run {
        info!(
            position_id,
            action = %resolution.action,
            contracts = resolution.contracts_delta,
            price = %event.price,
            "Dry run: would record fill"
        );
        return Ok(ApplyOutcome::WouldApply {
            position_id: Some(position_id),
        });
    }

    let gross = gross_notional(event.quantity, event.price);
    let (credit, debit) = split_gross(resolution.action, gross);

    let trade = NewTrade {
        key,
        commissions: event.commissions,
        fees: event.fees,
        underlying_price: event.underlying_price,
        notes: event.order_id.as_ref().map(|id| format!("order {id}")),
    };
    let update = FillUpdate {
        contracts_delta: resolution.contracts_delta,
        credit,
        debit,
        commissions: event.commissions,
        fees: event.fees,
        last_updated: trade.key.trade_datetime,
    };

    if !store.record_fill(&trade, &update).await? {
        warn!(
            position_id,
            key = %event.audit_key(),
            "Position closed since matching; fill not applied"
        );
        return Ok(ApplyOutcome::Skipped(SkipReason::StaleTarget { position_id }));
    }

    info!(
        position_id,
        action = %resolution.action,
        contracts = resolution.contracts_delta,
        price = %event.price,
        "Recorded fill"
    );
    Ok(ApplyOutcome::Applied { position_id })
}
