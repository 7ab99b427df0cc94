//! CLI commands for the options position ledger.

pub mod backfill;
pub mod live_update;
pub mod report;
pub mod seed;
pub mod set_contracts;

pub use backfill::{run_backfill, BackfillArgs};
pub use live_update::{run_live_update, LiveUpdateArgs};
pub use report::{run_report, ReportArgs};
pub use seed::{run_seed, SeedArgs};
pub use set_contracts::{run_set_contracts, SetContractsArgs};
