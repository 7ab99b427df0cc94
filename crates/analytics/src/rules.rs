//! Entry-discipline rule checks.
//!
//! Six mechanical checks run against every open position, mirroring the
//! portfolio's written entry rules for short premium: small margin
//! footprint, modest delta, enough runway to expiration, compressing vol,
//! meaningful captured profit, and strike above breakeven.

use chrono::NaiveDate;
use serde::Serialize;

use wheelhouse_data::models::PositionRecord;

use crate::position::analyze_position;

/// Outcome of the rule checks for one position.
#[derive(Debug, Clone, Serialize)]
pub struct DisciplineCheck {
    pub position_id: i64,
    pub symbol: String,
    /// Per-contract margin usage as a percent of account size.
    pub margin_pct: f64,
    /// Rule 1: margin usage at most 5% of the account.
    pub margin_ok: bool,
    /// Rule 2: delta at or below 0.35.
    pub delta_ok: bool,
    /// Rule 3: more than 45 days to expiration.
    pub dte_ok: bool,
    /// Rule 4: implied volatility compressing since entry.
    pub iv_ok: bool,
    /// Rule 5: captured at least 25% of the entry premium.
    pub profit_ok: bool,
    /// Rule 6: strike at or above breakeven (strike − entry premium).
    pub breakeven_ok: bool,
}

impl DisciplineCheck {
    /// Number of rules currently satisfied (out of six).
    #[must_use]
    pub fn passed(&self) -> usize {
        [
            self.margin_ok,
            self.delta_ok,
            self.dte_ok,
            self.iv_ok,
            self.profit_ok,
            self.breakeven_ok,
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    }
}

/// Evaluates the six discipline rules against a position snapshot.
///
/// Returns `None` when the row's strategy tag does not parse.
#[must_use]
pub fn check_discipline(record: &PositionRecord, today: NaiveDate) -> Option<DisciplineCheck> {
    let metrics = analyze_position(record, today)?;

    let strike: f64 = record.strike.try_into().unwrap_or(0.0);
    let entry_price: f64 = record.entry_price.try_into().unwrap_or(0.0);
    let mark: f64 = record.mark.try_into().unwrap_or(0.0);
    let account_size: f64 = record.account_size.try_into().unwrap_or(0.0);

    // Margin and profit rules are quoted per contract.
    let margin_pct = if account_size > 0.0 {
        strike * 100.0 / account_size * 100.0
    } else {
        0.0
    };
    let pl_per_contract = if metrics.strategy.is_short() {
        (entry_price - mark) * 100.0
    } else {
        (mark - entry_price) * 100.0
    };
    let breakeven = strike - entry_price;

    Some(DisciplineCheck {
        position_id: record.id,
        symbol: record.symbol.clone(),
        margin_pct,
        margin_ok: margin_pct <= 5.0,
        delta_ok: record.delta <= 0.35,
        dte_ok: metrics.dte > 45,
        iv_ok: metrics.iv_change_pct < 0.0,
        profit_ok: pl_per_contract >= 0.25 * entry_price * 100.0,
        breakeven_ok: strike >= breakeven,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn record() -> PositionRecord {
        let entry = Utc.with_ymd_and_hms(2025, 10, 27, 14, 30, 0).unwrap();
        PositionRecord {
            id: 1,
            symbol: "APLD".to_string(),
            strategy: "ShortPut".to_string(),
            contracts: -4,
            status: "OPEN".to_string(),
            strike: dec!(31),
            expiration: NaiveDate::from_ymd_opt(2025, 11, 7).unwrap(),
            entry_price: dec!(1.64),
            mark: dec!(1.49),
            total_credit: dec!(656),
            total_debit: dec!(0),
            commissions: dec!(0),
            fees: dec!(0),
            entry_iv: 1.2906,
            current_iv: 1.2906,
            delta: 0.28,
            account_size: dec!(700000),
            entry_date: entry,
            last_updated: entry,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    #[test]
    fn test_margin_rule() {
        let check = check_discipline(&record(), today()).unwrap();
        // 31 × 100 / 700000 × 100 ≈ 0.44% of the account.
        assert!((check.margin_pct - 31.0 * 100.0 / 700_000.0 * 100.0).abs() < 1e-9);
        assert!(check.margin_ok);

        let mut small_account = record();
        small_account.account_size = dec!(50000);
        let check = check_discipline(&small_account, today()).unwrap();
        assert!(!check.margin_ok); // 6.2% > 5%
    }

    #[test]
    fn test_delta_rule() {
        assert!(check_discipline(&record(), today()).unwrap().delta_ok);

        let mut heavy = record();
        heavy.delta = 0.42;
        assert!(!check_discipline(&heavy, today()).unwrap().delta_ok);
    }

    #[test]
    fn test_dte_rule() {
        // 4 days out fails the 45-day runway rule.
        assert!(!check_discipline(&record(), today()).unwrap().dte_ok);

        let mut far = record();
        far.expiration = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        assert!(check_discipline(&far, today()).unwrap().dte_ok);
    }

    #[test]
    fn test_iv_rule() {
        // Flat IV is not compression.
        assert!(!check_discipline(&record(), today()).unwrap().iv_ok);

        let mut compressed = record();
        compressed.current_iv = 1.10;
        assert!(check_discipline(&compressed, today()).unwrap().iv_ok);
    }

    #[test]
    fn test_profit_rule() {
        // Captured 15 of 164 per contract: under the 25% bar.
        assert!(!check_discipline(&record(), today()).unwrap().profit_ok);

        let mut winner = record();
        winner.mark = dec!(1.10); // captured 54 of 164 ≈ 33%
        assert!(check_discipline(&winner, today()).unwrap().profit_ok);
    }

    #[test]
    fn test_breakeven_rule_holds_for_positive_premium() {
        // strike ≥ strike − entry whenever entry ≥ 0.
        assert!(check_discipline(&record(), today()).unwrap().breakeven_ok);
    }

    #[test]
    fn test_passed_count() {
        let check = check_discipline(&record(), today()).unwrap();
        // margin, delta, breakeven pass; dte, iv, profit fail.
        assert_eq!(check.passed(), 3);
    }

    #[test]
    fn test_unknown_strategy_yields_none() {
        let mut bad = record();
        bad.strategy = "Butterfly".to_string();
        assert!(check_discipline(&bad, today()).is_none());
    }
}
