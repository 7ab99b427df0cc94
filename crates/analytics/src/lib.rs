//! Read-side analytics over position snapshots.
//!
//! Pure functions only: nothing here mutates the store. The ledger produces
//! the position table; this crate turns it into per-position return rows, a
//! portfolio roll-up with a benchmark comparison, and entry-discipline rule
//! checks.

pub mod portfolio;
pub mod position;
pub mod returns;
pub mod rules;

pub use portfolio::{summarize, PortfolioSummary};
pub use position::{analyze_position, PositionMetrics};
pub use returns::annualize;
pub use rules::{check_discipline, DisciplineCheck};
