//! Schwab brokerage integration.
//!
//! Provides the read-only order/quote client and the Event Normalizer that
//! converts Schwab's order JSON into canonical `TradeEvent`s. Token minting
//! and refresh happen in an external auth flow; this crate only consumes a
//! bearer token.

pub mod client;
pub mod error;
pub mod normalize;
pub mod quotes;

pub use client::SchwabClient;
pub use error::{Result, SchwabError};
pub use normalize::{normalize_orders, DropReason, DroppedLeg, NormalizedBatch};
