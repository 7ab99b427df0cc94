//! Position aggregate model.
//!
//! One row per open lineage of (symbol, strategy, strike, expiration). The
//! ledger applier is the only writer of the running aggregates; the live
//! updater owns the market snapshot fields.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wheelhouse_core::events::{OptionKind, RawDirection};

/// Lifecycle status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    /// Accepting fills.
    Open,
    /// Contract expired but the row may still receive late fills/assignment.
    Expired,
    /// Fully closed. Immutable.
    Closed,
    /// Rolled into a new lineage. Immutable.
    Rolled,
}

impl PositionStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Expired => "EXPIRED",
            Self::Closed => "CLOSED",
            Self::Rolled => "ROLLED",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPEN" => Some(Self::Open),
            "EXPIRED" => Some(Self::Expired),
            "CLOSED" => Some(Self::Closed),
            "ROLLED" => Some(Self::Rolled),
            _ => None,
        }
    }

    /// True while the position may still receive fills.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Open | Self::Expired)
    }
}

impl std::fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four strategies a lineage can carry, fixed at open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    ShortPut,
    ShortCall,
    LongPut,
    LongCall,
}

impl Strategy {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortPut => "ShortPut",
            Self::ShortCall => "ShortCall",
            Self::LongPut => "LongPut",
            Self::LongCall => "LongCall",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ShortPut" => Some(Self::ShortPut),
            "ShortCall" => Some(Self::ShortCall),
            "LongPut" => Some(Self::LongPut),
            "LongCall" => Some(Self::LongCall),
            _ => None,
        }
    }

    /// Classifies a strategy from the triggering fill's direction and kind.
    ///
    /// Sell+Put → ShortPut, Sell+Call → ShortCall, Buy+Put → LongPut, and
    /// every remaining Buy case → LongCall. Classification always follows
    /// the triggering fill, so a close-only fill with no prior open lineage
    /// records the inverse of the strategy it logically closes.
    #[must_use]
    pub fn classify(direction: RawDirection, kind: OptionKind) -> Self {
        match (direction, kind) {
            (RawDirection::Sell, OptionKind::Put) => Self::ShortPut,
            (RawDirection::Sell, OptionKind::Call) => Self::ShortCall,
            (RawDirection::Buy, OptionKind::Put) => Self::LongPut,
            (RawDirection::Buy, OptionKind::Call) => Self::LongCall,
        }
    }

    /// True for premium-selling strategies.
    #[must_use]
    pub fn is_short(&self) -> bool {
        matches!(self, Self::ShortPut | Self::ShortCall)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity key of a position lineage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub symbol: String,
    pub strategy: Strategy,
    pub strike: Decimal,
    pub expiration: NaiveDate,
}

impl std::fmt::Display for PositionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} exp {}",
            self.symbol, self.strategy, self.strike, self.expiration
        )
    }
}

/// A position row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PositionRecord {
    pub id: i64,
    pub symbol: String,
    /// Strategy tag: "ShortPut", "ShortCall", "LongPut", "LongCall".
    pub strategy: String,
    /// Running signed contract count. Short lineages run negative.
    pub contracts: i32,
    /// Status tag: "OPEN", "EXPIRED", "CLOSED", "ROLLED".
    pub status: String,
    pub strike: Decimal,
    pub expiration: NaiveDate,
    /// Price of the first fill.
    pub entry_price: Decimal,
    /// Most recent fill or live price.
    pub mark: Decimal,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub commissions: Decimal,
    pub fees: Decimal,
    /// Implied vol at entry (fraction). Written by the live updater.
    pub entry_iv: f64,
    pub current_iv: f64,
    pub delta: f64,
    pub account_size: Decimal,
    pub entry_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl PositionRecord {
    /// Returns the parsed status.
    #[must_use]
    pub fn parsed_status(&self) -> Option<PositionStatus> {
        PositionStatus::parse(&self.status)
    }

    /// Returns the parsed strategy.
    #[must_use]
    pub fn parsed_strategy(&self) -> Option<Strategy> {
        Strategy::parse(&self.strategy)
    }

    /// The identity key of this row, when its tags parse.
    #[must_use]
    pub fn key(&self) -> Option<PositionKey> {
        Some(PositionKey {
            symbol: self.symbol.clone(),
            strategy: self.parsed_strategy()?,
            strike: self.strike,
            expiration: self.expiration,
        })
    }

    /// True while the row may still receive fills.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.parsed_status().is_some_and(|s| s.is_mutable())
    }
}

/// Fields for a freshly opened position.
#[derive(Debug, Clone)]
pub struct NewPosition {
    pub key: PositionKey,
    pub entry_price: Decimal,
    pub opened_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_record() -> PositionRecord {
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

    // =========================================================================
    // PositionStatus Tests
    // =========================================================================

    #[test]
    fn test_status_roundtrip() {
        for status in [
            PositionStatus::Open,
            PositionStatus::Expired,
            PositionStatus::Closed,
            PositionStatus::Rolled,
        ] {
            assert_eq!(PositionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PositionStatus::parse("void"), None);
    }

    #[test]
    fn test_status_mutability() {
        assert!(PositionStatus::Open.is_mutable());
        assert!(PositionStatus::Expired.is_mutable());
        assert!(!PositionStatus::Closed.is_mutable());
        assert!(!PositionStatus::Rolled.is_mutable());
    }

    // =========================================================================
    // Strategy Tests
    // =========================================================================

    #[test]
    fn test_strategy_classification() {
        assert_eq!(
            Strategy::classify(RawDirection::Sell, OptionKind::Put),
            Strategy::ShortPut
        );
        assert_eq!(
            Strategy::classify(RawDirection::Sell, OptionKind::Call),
            Strategy::ShortCall
        );
        assert_eq!(
            Strategy::classify(RawDirection::Buy, OptionKind::Put),
            Strategy::LongPut
        );
        assert_eq!(
            Strategy::classify(RawDirection::Buy, OptionKind::Call),
            Strategy::LongCall
        );
    }

    #[test]
    fn test_strategy_is_short() {
        assert!(Strategy::ShortPut.is_short());
        assert!(Strategy::ShortCall.is_short());
        assert!(!Strategy::LongPut.is_short());
        assert!(!Strategy::LongCall.is_short());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(Strategy::parse("ShortPut"), Some(Strategy::ShortPut));
        assert_eq!(Strategy::parse("shortput"), None);
        assert_eq!(Strategy::parse("IronCondor"), None);
    }

    // =========================================================================
    // PositionRecord Tests
    // =========================================================================

    #[test]
    fn test_record_parsed_fields() {
        let record = sample_record();
        assert_eq!(record.parsed_status(), Some(PositionStatus::Open));
        assert_eq!(record.parsed_strategy(), Some(Strategy::ShortPut));
        assert!(record.is_mutable());
    }

    #[test]
    fn test_record_key() {
        let key = sample_record().key().unwrap();
        assert_eq!(key.symbol, "APLD");
        assert_eq!(key.strategy, Strategy::ShortPut);
        assert_eq!(key.strike, dec!(31));
    }

    #[test]
    fn test_closed_record_is_immutable() {
        let mut record = sample_record();
        record.status = "CLOSED".to_string();
        assert!(!record.is_mutable());
        record.status = "ROLLED".to_string();
        assert!(!record.is_mutable());
    }

    #[test]
    fn test_unknown_tags_do_not_panic() {
        let mut record = sample_record();
        record.strategy = "Straddle".to_string();
        record.status = "archived".to_string();
        assert_eq!(record.parsed_strategy(), None);
        assert_eq!(record.key(), None);
        assert!(!record.is_mutable());
    }
}
