//! Trade ledger repository.
//!
//! Read-side queries over the append-only trades table. Inserts happen only
//! through `PgLedgerStore::record_fill`.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::TradeRecord;

/// Repository for trade ledger queries.
#[derive(Debug, Clone)]
pub struct TradeRepository {
    pool: PgPool,
}

impl TradeRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists all fills for a position in application order.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_for_position(&self, position_id: i64) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(
            r"
            SELECT id, position_id, trade_datetime, action, contracts,
                   price, commissions, fees, underlying_price, notes
            FROM trades
            WHERE position_id = $1
            ORDER BY trade_datetime ASC, id ASC
            ",
        )
        .bind(position_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Gets the most recent fills across all positions.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_recent(&self, limit: i64) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(
            r"
            SELECT id, position_id, trade_datetime, action, contracts,
                   price, commissions, fees, underlying_price, notes
            FROM trades
            ORDER BY trade_datetime DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Counts the fills recorded against a position.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count_for_position(&self, position_id: i64) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM trades WHERE position_id = $1")
                .bind(position_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0)
    }
}
