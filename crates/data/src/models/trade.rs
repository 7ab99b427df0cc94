//! Trade ledger model.
//!
//! A trade is one fill's effect on a position. Rows are append-only and
//! deduplicated on the natural key, never on broker-assigned ids.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical action of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    BuyOpen,
    SellOpen,
    BuyClose,
    SellClose,
}

impl TradeAction {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyOpen => "BUY_OPEN",
            Self::SellOpen => "SELL_OPEN",
            Self::BuyClose => "BUY_CLOSE",
            Self::SellClose => "SELL_CLOSE",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BUY_OPEN" => Some(Self::BuyOpen),
            "SELL_OPEN" => Some(Self::SellOpen),
            "BUY_CLOSE" => Some(Self::BuyClose),
            "SELL_CLOSE" => Some(Self::SellClose),
            _ => None,
        }
    }

    /// True for the sell side. Sells accrue credit, buys accrue debit.
    #[must_use]
    pub fn is_sell(&self) -> bool {
        matches!(self, Self::SellOpen | Self::SellClose)
    }

    /// True for fills that open exposure.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        matches!(self, Self::BuyOpen | Self::SellOpen)
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Natural key of a trade row. Re-ingesting the same broker event maps to
/// the same key and must be a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeKey {
    pub position_id: i64,
    /// Second precision; sub-second components are truncated on build.
    pub trade_datetime: DateTime<Utc>,
    pub action: TradeAction,
    /// Signed contract delta.
    pub contracts: i32,
    pub price: Decimal,
}

impl TradeKey {
    /// Builds a key, truncating the timestamp to whole seconds.
    #[must_use]
    pub fn new(
        position_id: i64,
        trade_datetime: DateTime<Utc>,
        action: TradeAction,
        contracts: i32,
        price: Decimal,
    ) -> Self {
        Self {
            position_id,
            trade_datetime: trade_datetime.trunc_subsecs(0),
            action,
            contracts,
            price,
        }
    }
}

/// A ledger row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradeRecord {
    pub id: i64,
    pub position_id: i64,
    pub trade_datetime: DateTime<Utc>,
    /// Action tag: "BUY_OPEN", "SELL_OPEN", "BUY_CLOSE", "SELL_CLOSE".
    pub action: String,
    /// Signed contract delta.
    pub contracts: i32,
    pub price: Decimal,
    pub commissions: Decimal,
    pub fees: Decimal,
    pub underlying_price: Option<Decimal>,
    pub notes: Option<String>,
}

impl TradeRecord {
    /// Returns the parsed action.
    #[must_use]
    pub fn parsed_action(&self) -> Option<TradeAction> {
        TradeAction::parse(&self.action)
    }

    /// The natural key of this row, when the action tag parses.
    #[must_use]
    pub fn key(&self) -> Option<TradeKey> {
        Some(TradeKey::new(
            self.position_id,
            self.trade_datetime,
            self.parsed_action()?,
            self.contracts,
            self.price,
        ))
    }
}

/// Fields for a new ledger row.
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub key: TradeKey,
    pub commissions: Decimal,
    pub fees: Decimal,
    pub underlying_price: Option<Decimal>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    // =========================================================================
    // TradeAction Tests
    // =========================================================================

    #[test]
    fn test_action_roundtrip() {
        for action in [
            TradeAction::BuyOpen,
            TradeAction::SellOpen,
            TradeAction::BuyClose,
            TradeAction::SellClose,
        ] {
            assert_eq!(TradeAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(TradeAction::parse("ASSIGNMENT"), None);
    }

    #[test]
    fn test_action_sides() {
        assert!(TradeAction::SellOpen.is_sell());
        assert!(TradeAction::SellClose.is_sell());
        assert!(!TradeAction::BuyOpen.is_sell());
        assert!(!TradeAction::BuyClose.is_sell());
    }

    #[test]
    fn test_action_opening() {
        assert!(TradeAction::BuyOpen.is_opening());
        assert!(TradeAction::SellOpen.is_opening());
        assert!(!TradeAction::BuyClose.is_opening());
        assert!(!TradeAction::SellClose.is_opening());
    }

    // =========================================================================
    // TradeKey Tests
    // =========================================================================

    #[test]
    fn test_key_truncates_to_seconds() {
        let ts = Utc
            .with_ymd_and_hms(2025, 10, 27, 14, 30, 15)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(734))
            .unwrap();
        let key = TradeKey::new(1, ts, TradeAction::SellOpen, -2, dec!(1.50));
        assert_eq!(
            key.trade_datetime,
            Utc.with_ymd_and_hms(2025, 10, 27, 14, 30, 15).unwrap()
        );
    }

    #[test]
    fn test_same_event_maps_to_same_key() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 27, 14, 30, 15).unwrap();
        let a = TradeKey::new(7, ts, TradeAction::BuyClose, 2, dec!(0.50));
        let b = TradeKey::new(7, ts, TradeAction::BuyClose, 2, dec!(0.50));
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_key_requires_known_action() {
        let record = TradeRecord {
            id: 1,
            position_id: 7,
            trade_datetime: Utc.with_ymd_and_hms(2025, 10, 27, 14, 30, 15).unwrap(),
            action: "EXERCISE".to_string(),
            contracts: 1,
            price: dec!(0),
            commissions: dec!(0),
            fees: dec!(0),
            underlying_price: None,
            notes: None,
        };
        assert_eq!(record.key(), None);
    }
}
