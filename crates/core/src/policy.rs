//! Resolution policy for fills with an unknown open/close qualifier.

use serde::{Deserialize, Serialize};

/// How to resolve a fill whose broker payload did not say whether it opens
/// or closes exposure.
///
/// The default assumes a premium-selling book: a sell with no qualifier is
/// opening a short, a buy is closing one. The policy is configuration, not a
/// silent constant, so a long-biased book can override it without a code
/// change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownQualifierPolicy {
    /// SELL → SELL_OPEN, BUY → BUY_CLOSE.
    #[default]
    ShortPremium,
    /// SELL → SELL_OPEN, BUY → BUY_OPEN.
    Opening,
    /// Unknown qualifiers are indeterminate; the event is skipped.
    Reject,
}

impl UnknownQualifierPolicy {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortPremium => "short_premium",
            Self::Opening => "opening",
            Self::Reject => "reject",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "short_premium" => Some(Self::ShortPremium),
            "opening" => Some(Self::Opening),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl std::fmt::Display for UnknownQualifierPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
