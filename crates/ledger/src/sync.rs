//! Batch application of normalized fills.
//!
//! Events are applied strictly sequentially: later fills may depend on
//! position state committed by earlier ones, so there is no parallelism and
//! no cross-event transaction. A crash mid-batch leaves applied events
//! durable and the rest replayable: the natural-key dedup makes re-running
//! the same window a no-op for everything already in the ledger.

use anyhow::Result;
use tracing::{info, warn};

use wheelhouse_core::events::TradeEvent;
use wheelhouse_core::policy::UnknownQualifierPolicy;
use wheelhouse_data::store::LedgerStore;

use crate::applier::{self, ApplyOutcome};

/// Tally of one batch application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub events: usize,
    pub applied: usize,
    pub would_apply: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

impl SyncReport {
    /// Folds another report into this one.
    pub fn absorb(&mut self, other: SyncReport) {
        self.events += other.events;
        self.applied += other.applied;
        self.would_apply += other.would_apply;
        self.duplicates += other.duplicates;
        self.skipped += other.skipped;
    }

    /// Formats a one-line summary for logging.
    #[must_use]
    pub fn format_summary(&self) -> String {
        format!(
            "{} event(s): {} applied, {} would-apply, {} duplicate, {} skipped",
            self.events, self.applied, self.would_apply, self.duplicates, self.skipped
        )
    }
}

/// Applies a batch of events in order, tallying outcomes.
///
/// Classification skips and duplicates never abort the batch; a store error
/// does, because every later event may depend on the failed write.
///
/// # Errors
/// Returns an error if a store operation fails mid-batch.
pub async fn apply_batch<S>(
    store: &S,
    events: &[TradeEvent],
    policy: UnknownQualifierPolicy,
    dry_run: bool,
) -> Result<SyncReport>
where
    S: LedgerStore + ?Sized,
{
    let mut report = SyncReport {
        events: events.len(),
        ..SyncReport::default()
    };

    for event in events {
        match applier::apply(store, event, policy, dry_run).await? {
            ApplyOutcome::Applied { .. } => report.applied += 1,
            ApplyOutcome::WouldApply { .. } => report.would_apply += 1,
            ApplyOutcome::Duplicate { .. } => report.duplicates += 1,
            ApplyOutcome::Skipped(reason) => {
                report.skipped += 1;
                warn!(key = %event.audit_key(), %reason, "Event skipped");
            }
        }
    }

    info!("Batch complete: {}", report.format_summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_event, MemoryLedger};
    use rust_decimal_macros::dec;
    use wheelhouse_core::events::{OpenCloseQualifier, OptionKind, RawDirection};

    const POLICY: UnknownQualifierPolicy = UnknownQualifierPolicy::ShortPremium;

    #[tokio::test]
    async fn test_open_then_close_in_one_batch() {
        let store = MemoryLedger::new();

        let open = sample_event(RawDirection::Sell, OptionKind::Put);
        let mut close = sample_event(RawDirection::Buy, OptionKind::Put);
        close.qualifier = OpenCloseQualifier::Closing;
        close.price = dec!(0.50);
        close.executed_at += chrono::Duration::days(3);

        // The close can only find its lineage because the open before it in
        // the batch was committed first.
        let report = apply_batch(&store, &[open, close], POLICY, false)
            .await
            .unwrap();

        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(store.position_count(), 1);
        assert_eq!(store.position(1).contracts, 0);
    }

    #[tokio::test]
    async fn test_replayed_batch_counts_duplicates() {
        let store = MemoryLedger::new();
        let events = vec![sample_event(RawDirection::Sell, OptionKind::Put)];

        let first = apply_batch(&store, &events, POLICY, false).await.unwrap();
        assert_eq!(first.applied, 1);

        let replay = apply_batch(&store, &events, POLICY, false).await.unwrap();
        assert_eq!(replay.applied, 0);
        assert_eq!(replay.duplicates, 1);
        assert_eq!(store.trade_count(), 1);
    }

    #[tokio::test]
    async fn test_skip_does_not_abort_batch() {
        let store = MemoryLedger::new();

        let mut bad = sample_event(RawDirection::Sell, OptionKind::Put);
        bad.quantity = 0;
        let good = sample_event(RawDirection::Sell, OptionKind::Call);

        let report = apply_batch(&store, &[bad, good], POLICY, false)
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(store.position_count(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_batch_reports_without_writing() {
        let store = MemoryLedger::new();
        let events = vec![
            sample_event(RawDirection::Sell, OptionKind::Put),
            sample_event(RawDirection::Sell, OptionKind::Call),
        ];

        let report = apply_batch(&store, &events, POLICY, true).await.unwrap();
        assert_eq!(report.would_apply, 2);
        assert_eq!(store.position_count(), 0);
        assert_eq!(store.trade_count(), 0);
    }

    #[test]
    fn test_report_absorb_and_summary() {
        let mut total = SyncReport::default();
        total.absorb(SyncReport {
            events: 3,
            applied: 2,
            would_apply: 0,
            duplicates: 1,
            skipped: 0,
        });
        total.absorb(SyncReport {
            events: 2,
            applied: 1,
            would_apply: 0,
            duplicates: 0,
            skipped: 1,
        });

        assert_eq!(total.events, 5);
        assert_eq!(total.applied, 3);
        let summary = total.format_summary();
        assert!(summary.contains("5 event(s)"));
        assert!(summary.contains("3 applied"));
        assert!(summary.contains("1 duplicate"));
        assert!(summary.contains("1 skipped"));
    }
}
