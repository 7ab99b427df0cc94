//! Data models for the position ledger.
//!
//! All monetary fields use `rust_decimal::Decimal`; vol and greeks are `f64`.
//! Records derive `sqlx::FromRow` for database compatibility.

pub mod position;
pub mod trade;

pub use position::{NewPosition, PositionKey, PositionRecord, PositionStatus, Strategy};
pub use trade::{NewTrade, TradeAction, TradeKey, TradeRecord};
