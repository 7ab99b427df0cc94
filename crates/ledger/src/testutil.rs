//! In-memory `LedgerStore` used by the reconciliation tests.
//!
//! Mirrors the transactional semantics of the real store: `record_fill`
//! writes nothing at all when the position is no longer mutable.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use wheelhouse_core::events::{OpenCloseQualifier, OptionKind, RawDirection, TradeEvent};
use wheelhouse_data::models::{
    NewPosition, NewTrade, PositionKey, PositionRecord, PositionStatus, TradeKey, TradeRecord,
};
use wheelhouse_data::store::{FillUpdate, LedgerStore};

#[derive(Default)]
struct Inner {
    positions: Vec<PositionRecord>,
    trades: Vec<TradeRecord>,
}

/// A `Vec`-backed ledger store for tests.
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Returns a snapshot of a position. Panics when the id is unknown.
    pub fn position(&self, id: i64) -> PositionRecord {
        self.inner
            .lock()
            .unwrap()
            .positions
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .expect("position exists")
    }

    pub fn position_count(&self) -> usize {
        self.inner.lock().unwrap().positions.len()
    }

    pub fn trade_count(&self) -> usize {
        self.inner.lock().unwrap().trades.len()
    }

    pub fn trades_for(&self, position_id: i64) -> Vec<TradeRecord> {
        self.inner
            .lock()
            .unwrap()
            .trades
            .iter()
            .filter(|t| t.position_id == position_id)
            .cloned()
            .collect()
    }

    pub fn set_status(&self, id: i64, status: PositionStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(position) = inner.positions.iter_mut().find(|p| p.id == id) {
            position.status = status.as_str().to_string();
        }
    }

    /// Inserts a copy of an existing row under a fresh id, simulating a
    /// fragmented lineage. Returns the new id.
    pub fn insert_duplicate_of(&self, id: i64) -> i64 {
        let mut copy = self.position(id);
        let mut inner = self.inner.lock().unwrap();
        copy.id = next_position_id(&inner);
        inner.positions.push(copy.clone());
        copy.id
    }
}

fn next_position_id(inner: &Inner) -> i64 {
    inner.positions.iter().map(|p| p.id).max().unwrap_or(0) + 1
}

fn next_trade_id(inner: &Inner) -> i64 {
    inner.trades.iter().map(|t| t.id).max().unwrap_or(0) + 1
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_open_position(&self, key: &PositionKey) -> Result<Option<PositionRecord>> {
        let inner = self.inner.lock().unwrap();
        let found = inner
            .positions
            .iter()
            .filter(|p| {
                p.symbol == key.symbol
                    && p.strategy == key.strategy.as_str()
                    && p.strike == key.strike
                    && p.expiration == key.expiration
                    && p.is_mutable()
            })
            .min_by_key(|p| p.id)
            .cloned();
        Ok(found)
    }

    async fn create_position(&self, new: &NewPosition) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        let id = next_position_id(&inner);
        inner.positions.push(PositionRecord {
            id,
            symbol: new.key.symbol.clone(),
            strategy: new.key.strategy.as_str().to_string(),
            contracts: 0,
            status: PositionStatus::Open.as_str().to_string(),
            strike: new.key.strike,
            expiration: new.key.expiration,
            entry_price: new.entry_price,
            mark: new.entry_price,
            total_credit: Decimal::ZERO,
            total_debit: Decimal::ZERO,
            commissions: Decimal::ZERO,
            fees: Decimal::ZERO,
            entry_iv: 0.0,
            current_iv: 0.0,
            delta: 0.0,
            account_size: Decimal::ZERO,
            entry_date: new.opened_at,
            last_updated: new.opened_at,
        });
        Ok(id)
    }

    async fn trade_exists(&self, key: &TradeKey) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.trades.iter().any(|t| t.key().as_ref() == Some(key)))
    }

    async fn record_fill(&self, trade: &NewTrade, update: &FillUpdate) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let trade_id = next_trade_id(&inner);

        let Some(position) = inner
            .positions
            .iter_mut()
            .find(|p| p.id == trade.key.position_id)
        else {
            bail!("position {} not found", trade.key.position_id);
        };

        if !position.is_mutable() {
            return Ok(false);
        }

        position.contracts += update.contracts_delta;
        position.total_credit += update.credit;
        position.total_debit += update.debit;
        position.commissions += update.commissions;
        position.fees += update.fees;
        position.last_updated = update.last_updated;

        inner.trades.push(TradeRecord {
            id: trade_id,
            position_id: trade.key.position_id,
            trade_datetime: trade.key.trade_datetime,
            action: trade.key.action.as_str().to_string(),
            contracts: trade.key.contracts,
            price: trade.key.price,
            commissions: trade.commissions,
            fees: trade.fees,
            underlying_price: trade.underlying_price,
            notes: trade.notes.clone(),
        });
        Ok(true)
    }
}

/// An XYZ 50-strike option fill: qty 2 @ 1.50, OPENING, 2025-12-19 expiry.
pub fn sample_event(direction: RawDirection, kind: OptionKind) -> TradeEvent {
    TradeEvent {
        account: "XXXX9514".to_string(),
        symbol: "XYZ".to_string(),
        kind,
        strike: dec!(50),
        expiration: chrono::NaiveDate::from_ymd_opt(2025, 12, 19).unwrap(),
        direction,
        qualifier: OpenCloseQualifier::Opening,
        quantity: 2,
        price: dec!(1.50),
        commissions: dec!(0),
        fees: dec!(0),
        executed_at: Utc.with_ymd_and_hms(2025, 10, 27, 14, 30, 15).unwrap(),
        underlying_price: None,
        order_id: Some("1004055538123".to_string()),
        leg_id: None,
    }
}
