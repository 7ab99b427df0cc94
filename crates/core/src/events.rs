//! Canonical trade event types.
//!
//! A `TradeEvent` is the normalized form of one option leg of one filled
//! broker order. It is produced by a broker normalizer, consumed once by the
//! ledger applier, and never persisted as-is.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option contract kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Put => "PUT",
        }
    }

    /// Parses a broker put/call field ("CALL", "C", "PUT", "P", ...).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        if s.starts_with('C') {
            Some(Self::Call)
        } else if s.starts_with('P') {
            Some(Self::Put)
        } else {
            None
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directional side of a fill as reported by the broker.
///
/// Broker instruction strings that name neither side ("EXCHANGE", "HOLD")
/// fail to parse; such legs are indeterminate and never become events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawDirection {
    Buy,
    Sell,
}

impl RawDirection {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    /// Parses a broker instruction ("BUY_TO_OPEN", "SELL_SHORT", ...).
    ///
    /// BUY is checked before SELL; instructions naming both sides buy.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_uppercase();
        if s.contains("BUY") {
            Some(Self::Buy)
        } else if s.contains("SELL") {
            Some(Self::Sell)
        } else {
            None
        }
    }
}

impl std::fmt::Display for RawDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a fill opens or closes exposure, as reported by the broker.
///
/// Brokers routinely omit or garble the position effect, so `Unknown` is a
/// first-class value resolved later by `UnknownQualifierPolicy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenCloseQualifier {
    Opening,
    Closing,
    Unknown,
}

impl OpenCloseQualifier {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "OPENING",
            Self::Closing => "CLOSING",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a broker position-effect field. Anything that names neither
    /// open nor close maps to `Unknown` rather than failing.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let s = s.to_uppercase();
        if s.contains("OPEN") {
            Self::Opening
        } else if s.contains("CLOS") {
            Self::Closing
        } else {
            Self::Unknown
        }
    }
}

impl std::fmt::Display for OpenCloseQualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One normalized option fill, ready for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Owning brokerage account.
    pub account: String,
    /// Underlying symbol, e.g. "MSTR".
    pub symbol: String,
    /// Call or put.
    pub kind: OptionKind,
    /// Strike price. Always positive.
    pub strike: Decimal,
    /// Contract expiration date.
    pub expiration: NaiveDate,
    /// Buy or sell.
    pub direction: RawDirection,
    /// Opening, closing, or unknown.
    pub qualifier: OpenCloseQualifier,
    /// Contract count. Always positive; sign is assigned by the resolver.
    pub quantity: u32,
    /// Fill price per contract.
    pub price: Decimal,
    /// Commissions charged on this fill.
    pub commissions: Decimal,
    /// Exchange/regulatory fees on this fill.
    pub fees: Decimal,
    /// Execution time (UTC).
    pub executed_at: DateTime<Utc>,
    /// Underlying price at execution, when the broker reports it.
    pub underlying_price: Option<Decimal>,
    /// Broker order id. Diagnostics only, never part of the dedup key.
    pub order_id: Option<String>,
    /// Broker leg id. Diagnostics only.
    pub leg_id: Option<String>,
}

impl TradeEvent {
    /// Checks the event invariants: positive quantity and strike.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.quantity > 0 && self.strike > Decimal::ZERO
    }

    /// Natural-key description used in skip/warning logs for auditability.
    #[must_use]
    pub fn audit_key(&self) -> String {
        format!(
            "{} {} {} exp {} @ {}",
            self.symbol, self.strike, self.kind, self.expiration, self.executed_at
        )
    }
}
