//! Database repositories for the position ledger.

pub mod position_repo;
pub mod trade_repo;

pub use position_repo::PositionRepository;
pub use trade_repo::TradeRepository;

use sqlx::PgPool;

/// Creates all repositories from a single database pool.
pub struct Repositories {
    pub positions: PositionRepository,
    pub trades: TradeRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            positions: PositionRepository::new(pool.clone()),
            trades: TradeRepository::new(pool),
        }
    }
}
