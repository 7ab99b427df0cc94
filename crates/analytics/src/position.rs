//! Per-position return and risk metrics.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use wheelhouse_data::models::{PositionRecord, Strategy};

use crate::returns::annualize;

/// Analytics row for one position.
#[derive(Debug, Clone, Serialize)]
pub struct PositionMetrics {
    pub position_id: i64,
    pub symbol: String,
    pub strategy: Strategy,
    pub contracts: i32,
    pub entry_date: NaiveDate,
    /// Calendar days since entry.
    pub age_days: i64,
    /// Calendar days to expiration (negative once expired).
    pub dte: i64,
    pub entry_iv_pct: f64,
    pub current_iv_pct: f64,
    pub iv_change_pct: f64,
    pub delta: f64,
    /// Unrealized P/L in dollars. Positive is profit for both short and
    /// long strategies; see the sign convention on `analyze_position`.
    pub pl: f64,
    pub return_pct: f64,
    pub annualized_return_pct: f64,
    /// Premium notional, signed by the contract count.
    pub credit: f64,
    /// Absolute premium notional at risk.
    pub exposure: f64,
    pub roc_pct: f64,
    pub annualized_roc_pct: f64,
    pub exposure_pct_of_account: f64,
}

fn dec_to_f64(value: Decimal) -> f64 {
    value.try_into().unwrap_or(0.0)
}

/// Computes the analytics row for one position snapshot.
///
/// Sign convention: a short position profits as the mark falls below entry
/// (`pl = (entry − mark) × |contracts| × 100`); a long position profits as
/// it rises (`pl = (mark − entry) × |contracts| × 100`). Credit and exposure
/// use the signed contract count as stored, so a short lineage carries
/// negative credit and `exposure − credit` is its full two-sided notional.
///
/// Returns `None` when the strategy tag does not parse; the row cannot be
/// interpreted and the caller should surface it.
#[must_use]
pub fn analyze_position(record: &PositionRecord, today: NaiveDate) -> Option<PositionMetrics> {
    let Some(strategy) = record.parsed_strategy() else {
        warn!(
            position_id = record.id,
            symbol = record.symbol,
            strategy = record.strategy,
            "Unknown strategy tag; skipping analytics row"
        );
        return None;
    };

    let entry_price = dec_to_f64(record.entry_price);
    let mark = dec_to_f64(record.mark);
    let account_size = dec_to_f64(record.account_size);
    let contracts_signed = f64::from(record.contracts);
    let contracts_abs = contracts_signed.abs();

    let entry_date = record.entry_date.date_naive();
    let age_days = (today - entry_date).num_days();
    let dte = (record.expiration - today).num_days();

    let pl = if strategy.is_short() {
        (entry_price - mark) * contracts_abs * 100.0
    } else {
        (mark - entry_price) * contracts_abs * 100.0
    };

    let exposure = (entry_price * 100.0 * contracts_signed).abs();
    let credit = entry_price * 100.0 * contracts_signed;

    let return_pct = if entry_price == 0.0 || exposure == 0.0 {
        0.0
    } else {
        pl / exposure * 100.0
    };
    let annualized_return_pct = annualize(return_pct, age_days as f64);

    let iv_change_pct = if record.entry_iv > 0.0 {
        (record.current_iv / record.entry_iv - 1.0) * 100.0
    } else {
        0.0
    };

    let net_capital = exposure - credit;
    let roc_pct = if net_capital == 0.0 {
        0.0
    } else {
        pl / net_capital * 100.0
    };
    let annualized_roc_pct = annualize(roc_pct, age_days as f64);

    let exposure_pct_of_account = if account_size > 0.0 {
        exposure / account_size * 100.0
    } else {
        0.0
    };

    Some(PositionMetrics {
        position_id: record.id,
        symbol: record.symbol.clone(),
        strategy,
        contracts: record.contracts,
        entry_date,
        age_days,
        dte,
        entry_iv_pct: record.entry_iv * 100.0,
        current_iv_pct: record.current_iv * 100.0,
        iv_change_pct,
        delta: record.delta,
        pl,
        return_pct,
        annualized_return_pct,
        credit,
        exposure,
        roc_pct,
        annualized_roc_pct,
        exposure_pct_of_account,
    })
}
