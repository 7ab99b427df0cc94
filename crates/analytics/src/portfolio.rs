//! Portfolio roll-up and benchmark comparison.

use serde::Serialize;

use crate::position::PositionMetrics;
use crate::returns::{annualize, ANNUALIZED_CAP};

/// Portfolio-level aggregates over the current position snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub positions: usize,
    pub total_credit: f64,
    pub total_pl: f64,
    pub total_exposure: f64,
    /// exposure − credit.
    pub net_capital: f64,
    pub portfolio_return_pct: f64,
    pub portfolio_roc_pct: f64,
    pub average_age_days: f64,
    pub annualized_return_pct: f64,
    pub annualized_roc_pct: f64,
    /// Benchmark annual rate (percent) the excess figure compares against.
    pub benchmark_rate: f64,
    pub excess_return_pct: f64,
}

/// Rolls per-position rows up into a portfolio summary.
///
/// Annualization uses the average position age with the same clamped
/// formula the per-position rows use.
#[must_use]
pub fn summarize(rows: &[PositionMetrics], benchmark_rate: f64) -> PortfolioSummary {
    let total_credit: f64 = rows.iter().map(|r| r.credit).sum();
    let total_pl: f64 = rows.iter().map(|r| r.pl).sum();
    let total_exposure: f64 = rows.iter().map(|r| r.exposure).sum();
    let net_capital = total_exposure - total_credit;

    let portfolio_return_pct = if total_exposure == 0.0 {
        0.0
    } else {
        total_pl / total_exposure * 100.0
    };
    let portfolio_roc_pct = if net_capital == 0.0 {
        0.0
    } else {
        total_pl / net_capital * 100.0
    };

    let average_age_days = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.age_days as f64).sum::<f64>() / rows.len() as f64
    };

    let annualized_return_pct = annualize(portfolio_return_pct, average_age_days);
    let annualized_roc_pct = annualize(portfolio_roc_pct, average_age_days);
    let excess_return_pct = annualized_return_pct - benchmark_rate;

    PortfolioSummary {
        positions: rows.len(),
        total_credit,
        total_pl,
        total_exposure,
        net_capital,
        portfolio_return_pct,
        portfolio_roc_pct,
        average_age_days,
        annualized_return_pct,
        annualized_roc_pct,
        benchmark_rate,
        excess_return_pct,
    }
}

impl PortfolioSummary {
    /// Formats a multi-line summary for logging.
    #[must_use]
    pub fn format_summary(&self) -> String {
        format!(
            "Portfolio Summary ({} positions):\n\
             - Total Credit ($)      : {:.2}\n\
             - Total P/L ($)         : {:.2}\n\
             - Total Exposure ($)    : {:.2}\n\
             - Net Capital ($)       : {:.2}\n\
             - Portfolio Return (%)  : {:.2}\n\
             - Return on Capital (%) : {:.2}\n\
             - Average Age (days)    : {:.2}\n\
             - Annualized Return (%) : {:.2}\n\
             - Annualized ROC (%)    : {:.2}\n\
             - Benchmark (%)         : {:.2}\n\
             - Excess Return (%)     : {:.2}",
            self.positions,
            self.total_credit,
            self.total_pl,
            self.total_exposure,
            self.net_capital,
            self.portfolio_return_pct,
            self.portfolio_roc_pct,
            self.average_age_days,
            self.annualized_return_pct.clamp(-ANNUALIZED_CAP, ANNUALIZED_CAP),
            self.annualized_roc_pct.clamp(-ANNUALIZED_CAP, ANNUALIZED_CAP),
            self.benchmark_rate,
            self.excess_return_pct
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wheelhouse_data::models::Strategy;

    const EPS: f64 = 1e-9;

    fn row(
        strategy: Strategy,
        pl: f64,
        credit: f64,
        exposure: f64,
        age_days: i64,
    ) -> PositionMetrics {
        PositionMetrics {
            position_id: 0,
            symbol: "TEST".to_string(),
            strategy,
            contracts: if strategy.is_short() { -1 } else { 1 },
            entry_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            age_days,
            dte: 30,
            entry_iv_pct: 0.0,
            current_iv_pct: 0.0,
            iv_change_pct: 0.0,
            delta: 0.0,
            pl,
            return_pct: 0.0,
            annualized_return_pct: 0.0,
            credit,
            exposure,
            roc_pct: 0.0,
            annualized_roc_pct: 0.0,
            exposure_pct_of_account: 0.0,
        }
    }

    #[test]
    fn test_rollup_sums() {
        let rows = vec![
            row(Strategy::ShortPut, 60.0, -656.0, 656.0, 7),
            row(Strategy::LongCall, 150.0, 600.0, 600.0, 21),
        ];
        let summary = summarize(&rows, 3.76);

        assert_eq!(summary.positions, 2);
        assert!((summary.total_pl - 210.0).abs() < EPS);
        assert!((summary.total_credit - (-56.0)).abs() < EPS);
        assert!((summary.total_exposure - 1256.0).abs() < EPS);
        assert!((summary.net_capital - 1312.0).abs() < EPS);
        assert!((summary.average_age_days - 14.0).abs() < EPS);
        assert!((summary.portfolio_return_pct - 210.0 / 1256.0 * 100.0).abs() < EPS);
        assert!((summary.portfolio_roc_pct - 210.0 / 1312.0 * 100.0).abs() < EPS);
    }

    #[test]
    fn test_excess_return_subtracts_benchmark() {
        let rows = vec![row(Strategy::ShortPut, 10.0, -500.0, 500.0, 365)];
        let summary = summarize(&rows, 3.76);
        assert!(
            (summary.excess_return_pct - (summary.annualized_return_pct - 3.76)).abs() < EPS
        );
    }

    #[test]
    fn test_annualized_figures_are_clamped() {
        // A day-old winner would extrapolate absurdly; the clamp holds.
        let rows = vec![row(Strategy::ShortPut, 100.0, -500.0, 500.0, 1)];
        let summary = summarize(&rows, 3.76);
        assert!(summary.annualized_return_pct <= 500.0);
        assert!(summary.annualized_roc_pct <= 500.0);
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = summarize(&[], 3.76);
        assert_eq!(summary.positions, 0);
        assert!((summary.total_pl - 0.0).abs() < EPS);
        assert!((summary.portfolio_return_pct - 0.0).abs() < EPS);
        assert!((summary.average_age_days - 0.0).abs() < EPS);
        assert!((summary.annualized_return_pct - 0.0).abs() < EPS);
    }

    #[test]
    fn test_format_summary_mentions_key_figures() {
        let rows = vec![row(Strategy::ShortPut, 60.0, -656.0, 656.0, 7)];
        let text = summarize(&rows, 3.76).format_summary();
        assert!(text.contains("1 positions"));
        assert!(text.contains("Total P/L"));
        assert!(text.contains("Benchmark"));
        assert!(text.contains("3.76"));
    }
}
