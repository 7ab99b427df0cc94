//! The narrow storage seam used by the reconciliation engine.
//!
//! The engine only ever needs four operations; keeping them behind a trait
//! keeps the core testable against an in-memory store and keeps SQL in one
//! place. `PgLedgerStore` is the production implementation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{NewPosition, NewTrade, PositionKey, PositionRecord, TradeKey};

/// Aggregate deltas applied to a position when a fill is recorded.
#[derive(Debug, Clone)]
pub struct FillUpdate {
    /// Signed contract delta.
    pub contracts_delta: i32,
    /// Gross notional attributed to credit (sell side), else zero.
    pub credit: Decimal,
    /// Gross notional attributed to debit (buy side), else zero.
    pub debit: Decimal,
    pub commissions: Decimal,
    pub fees: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// Storage operations the ledger applier depends on.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Finds the oldest position matching `key` that is still mutable
    /// (status OPEN or EXPIRED). Ties break toward the earliest-created row
    /// so fills flow into the longest-lived lineage.
    async fn find_open_position(&self, key: &PositionKey) -> Result<Option<PositionRecord>>;

    /// Creates a fresh position lineage and returns its id.
    async fn create_position(&self, new: &NewPosition) -> Result<i64>;

    /// True when a trade row with this natural key already exists.
    async fn trade_exists(&self, key: &TradeKey) -> Result<bool>;

    /// Atomically inserts the trade row and applies the aggregate update,
    /// guarded by the position still being mutable.
    ///
    /// Returns `false`, with nothing written, when the position has since
    /// become CLOSED/ROLLED. Partial application is never observable.
    async fn record_fill(&self, trade: &NewTrade, update: &FillUpdate) -> Result<bool>;
}

/// PostgreSQL-backed ledger store.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Creates a new store over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn find_open_position(&self, key: &PositionKey) -> Result<Option<PositionRecord>> {
        let record = sqlx::query_as::<_, PositionRecord>(
            r"
            SELECT id, symbol, strategy, contracts, status, strike, expiration,
                   entry_price, mark, total_credit, total_debit, commissions, fees,
                   entry_iv, current_iv, delta, account_size, entry_date, last_updated
            FROM positions
            WHERE symbol = $1
              AND strategy = $2
              AND strike = $3
              AND expiration = $4
              AND status IN ('OPEN', 'EXPIRED')
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(&key.symbol)
        .bind(key.strategy.as_str())
        .bind(key.strike)
        .bind(key.expiration)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn create_position(&self, new: &NewPosition) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO positions
                (symbol, strategy, contracts, status, strike, expiration,
                 entry_price, mark, total_credit, total_debit, commissions, fees,
                 entry_date, last_updated)
            VALUES ($1, $2, 0, 'OPEN', $3, $4, $5, $5, 0, 0, 0, 0, $6, $6)
            RETURNING id
            ",
        )
        .bind(&new.key.symbol)
        .bind(new.key.strategy.as_str())
        .bind(new.key.strike)
        .bind(new.key.expiration)
        .bind(new.entry_price)
        .bind(new.opened_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn trade_exists(&self, key: &TradeKey) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            r"
            SELECT id FROM trades
            WHERE position_id = $1
              AND trade_datetime = $2
              AND action = $3
              AND contracts = $4
              AND price = $5
            ",
        )
        .bind(key.position_id)
        .bind(key.trade_datetime)
        .bind(key.action.as_str())
        .bind(key.contracts)
        .bind(key.price)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn record_fill(&self, trade: &NewTrade, update: &FillUpdate) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO trades
                (position_id, trade_datetime, action, contracts,
                 price, commissions, fees, underlying_price, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(trade.key.position_id)
        .bind(trade.key.trade_datetime)
        .bind(trade.key.action.as_str())
        .bind(trade.key.contracts)
        .bind(trade.key.price)
        .bind(trade.commissions)
        .bind(trade.fees)
        .bind(trade.underlying_price)
        .bind(&trade.notes)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r"
            UPDATE positions
            SET contracts = contracts + $2,
                total_credit = total_credit + $3,
                total_debit = total_debit + $4,
                commissions = commissions + $5,
                fees = fees + $6,
                last_updated = $7
            WHERE id = $1
              AND status IN ('OPEN', 'EXPIRED')
            ",
        )
        .bind(trade.key.position_id)
        .bind(update.contracts_delta)
        .bind(update.credit)
        .bind(update.debit)
        .bind(update.commissions)
        .bind(update.fees)
        .bind(update.last_updated)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Position closed underneath us; drop the trade insert too.
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
