//! Position repository.
//!
//! Read-side queries plus the guarded maintenance updates used by the live
//! updater and the manual admin commands. The reconciliation write path goes
//! through `PgLedgerStore`, not through here.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{PositionRecord, PositionStatus};

const SELECT_COLUMNS: &str = r"
    SELECT id, symbol, strategy, contracts, status, strike, expiration,
           entry_price, mark, total_credit, total_debit, commissions, fees,
           entry_iv, current_iv, delta, account_size, entry_date, last_updated
    FROM positions
";

/// Repository for position queries and maintenance updates.
#[derive(Debug, Clone)]
pub struct PositionRepository {
    pool: PgPool,
}

impl PositionRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a position by ID.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<PositionRecord>> {
        let record = sqlx::query_as::<_, PositionRecord>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists every position, oldest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<PositionRecord>> {
        let records = sqlx::query_as::<_, PositionRecord>(&format!(
            "{SELECT_COLUMNS} ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Lists positions the live updater may still touch (not CLOSED/ROLLED).
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_updatable(&self) -> Result<Vec<PositionRecord>> {
        let records = sqlx::query_as::<_, PositionRecord>(&format!(
            "{SELECT_COLUMNS} WHERE status NOT IN ('CLOSED', 'ROLLED') ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Writes a live market snapshot onto a position, guarded by the row
    /// still being mutable. Returns the number of rows updated (0 or 1).
    ///
    /// Entry IV is backfilled from the current IV the first time a snapshot
    /// lands on a row that has none.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn update_market_snapshot(
        &self,
        id: i64,
        mark: Decimal,
        implied_volatility: f64,
        delta: f64,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE positions
            SET mark = $2,
                current_iv = $3,
                entry_iv = CASE WHEN entry_iv = 0 THEN $3 ELSE entry_iv END,
                delta = $4,
                last_updated = $5
            WHERE id = $1
              AND status NOT IN ('CLOSED', 'ROLLED')
            ",
        )
        .bind(id)
        .bind(mark)
        .bind(implied_volatility)
        .bind(delta)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Corrects the contract count for a position identified by symbol and
    /// expiration. Returns the number of rows updated.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn set_contracts(
        &self,
        symbol: &str,
        expiration: NaiveDate,
        contracts: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE positions
            SET contracts = $3, last_updated = $4
            WHERE symbol = $1 AND expiration = $2
            ",
        )
        .bind(symbol)
        .bind(expiration)
        .bind(contracts)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Moves a position to a new lifecycle status. Returns rows updated.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn set_status(&self, id: i64, status: PositionStatus) -> Result<u64> {
        let result = sqlx::query("UPDATE positions SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Seeds a position row for history that predates the backfill window.
    /// Returns the generated id.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn seed(
        &self,
        symbol: &str,
        strategy: &str,
        contracts: i32,
        strike: Decimal,
        expiration: NaiveDate,
        entry_price: Decimal,
        mark: Decimal,
        entry_iv: f64,
        delta: f64,
        account_size: Decimal,
        entry_date: DateTime<Utc>,
    ) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO positions
                (symbol, strategy, contracts, status, strike, expiration,
                 entry_price, mark, total_credit, total_debit, commissions, fees,
                 entry_iv, current_iv, delta, account_size, entry_date, last_updated)
            VALUES ($1, $2, $3, 'OPEN', $4, $5, $6, $7, 0, 0, 0, 0, $8, $8, $9, $10, $11, $11)
            RETURNING id
            ",
        )
        .bind(symbol)
        .bind(strategy)
        .bind(contracts)
        .bind(strike)
        .bind(expiration)
        .bind(entry_price)
        .bind(mark)
        .bind(entry_iv)
        .bind(delta)
        .bind(account_size)
        .bind(entry_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
