//! Core types, policies, and configuration for the options position ledger.
//!
//! This crate holds everything the rest of the workspace agrees on:
//! - Canonical trade event types produced by broker normalizers
//! - The unknown-qualifier resolution policy
//! - Quote quality filters for live market data
//! - Configuration structs and the figment-based loader
//! - Collaborator traits (`OrderSource`, `QuoteSource`)

pub mod config;
pub mod config_loader;
pub mod events;
pub mod policy;
pub mod quality;
pub mod traits;

pub use config::{AnalyticsConfig, AppConfig, DatabaseConfig, SchwabConfig, SyncConfig};
pub use config_loader::ConfigLoader;
pub use events::{OpenCloseQualifier, OptionKind, RawDirection, TradeEvent};
pub use policy::UnknownQualifierPolicy;
pub use traits::{OrderSource, QuoteSnapshot, QuoteSource};
