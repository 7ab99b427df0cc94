//! PostgreSQL storage for the options position ledger.
//!
//! This crate provides:
//! - Database client and migrations
//! - `PositionRecord`/`TradeRecord` models with their enum tags
//! - Typed repositories for read-side and maintenance queries
//! - The `LedgerStore` seam the reconciliation engine writes through

pub mod database;
pub mod models;
pub mod repositories;
pub mod store;

pub use database::DatabaseClient;

// Re-export models
pub use models::{
    NewPosition, NewTrade, PositionKey, PositionRecord, PositionStatus, Strategy, TradeAction,
    TradeKey, TradeRecord,
};

// Re-export repositories and the store seam
pub use repositories::{PositionRepository, Repositories, TradeRepository};
pub use store::{FillUpdate, LedgerStore, PgLedgerStore};
