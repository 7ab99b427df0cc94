//! Action/direction resolution.
//!
//! Maps a fill's (direction, open/close qualifier) onto one of the four
//! canonical ledger actions and a signed contract delta. Sign convention:
//! sells are negative, buys are positive, regardless of open/close.

use wheelhouse_core::events::{OpenCloseQualifier, RawDirection};
use wheelhouse_core::policy::UnknownQualifierPolicy;
use wheelhouse_data::models::TradeAction;

/// A resolved fill: what it is and how it moves the contract count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub action: TradeAction,
    /// Signed contract delta (negative for sells).
    pub contracts_delta: i32,
}

/// Resolves a fill to a canonical action and signed delta.
///
/// Returns `None` (indeterminate) only when the qualifier is unknown and
/// the policy is `Reject`, or when the quantity does not fit a signed count.
/// Direction strings that named neither side were already rejected when the
/// event was parsed, so the mapping here is total over its inputs.
#[must_use]
pub fn resolve(
    direction: RawDirection,
    qualifier: OpenCloseQualifier,
    quantity: u32,
    policy: UnknownQualifierPolicy,
) -> Option<Resolution> {
    let quantity = i32::try_from(quantity).ok()?;

    let action = match (direction, qualifier) {
        (RawDirection::Sell, OpenCloseQualifier::Opening) => TradeAction::SellOpen,
        (RawDirection::Buy, OpenCloseQualifier::Opening) => TradeAction::BuyOpen,
        (RawDirection::Buy, OpenCloseQualifier::Closing) => TradeAction::BuyClose,
        (RawDirection::Sell, OpenCloseQualifier::Closing) => TradeAction::SellClose,
        (direction, OpenCloseQualifier::Unknown) => match policy {
            UnknownQualifierPolicy::ShortPremium => match direction {
                // Premium-selling book: a bare sell opens a short, a bare
                // buy closes one.
                RawDirection::Sell => TradeAction::SellOpen,
                RawDirection::Buy => TradeAction::BuyClose,
            },
            UnknownQualifierPolicy::Opening => match direction {
                RawDirection::Sell => TradeAction::SellOpen,
                RawDirection::Buy => TradeAction::BuyOpen,
            },
            UnknownQualifierPolicy::Reject => return None,
        },
    };

    let contracts_delta = match direction {
        RawDirection::Sell => -quantity,
        RawDirection::Buy => quantity,
    };

    Some(Resolution {
        action,
        contracts_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_default(
        direction: RawDirection,
        qualifier: OpenCloseQualifier,
    ) -> Option<Resolution> {
        resolve(direction, qualifier, 2, UnknownQualifierPolicy::ShortPremium)
    }

    // =========================================================================
    // Explicit Qualifier Tests (the deterministic table)
    // =========================================================================

    #[test]
    fn test_sell_opening() {
        let r = resolve_default(RawDirection::Sell, OpenCloseQualifier::Opening).unwrap();
        assert_eq!(r.action, TradeAction::SellOpen);
        assert_eq!(r.contracts_delta, -2);
    }

    #[test]
    fn test_buy_opening() {
        let r = resolve_default(RawDirection::Buy, OpenCloseQualifier::Opening).unwrap();
        assert_eq!(r.action, TradeAction::BuyOpen);
        assert_eq!(r.contracts_delta, 2);
    }

    #[test]
    fn test_buy_closing() {
        let r = resolve_default(RawDirection::Buy, OpenCloseQualifier::Closing).unwrap();
        assert_eq!(r.action, TradeAction::BuyClose);
        assert_eq!(r.contracts_delta, 2);
    }

    #[test]
    fn test_sell_closing() {
        let r = resolve_default(RawDirection::Sell, OpenCloseQualifier::Closing).unwrap();
        assert_eq!(r.action, TradeAction::SellClose);
        assert_eq!(r.contracts_delta, -2);
    }

    // =========================================================================
    // Unknown Qualifier Policy Tests
    // =========================================================================

    #[test]
    fn test_unknown_short_premium_policy() {
        let sell = resolve_default(RawDirection::Sell, OpenCloseQualifier::Unknown).unwrap();
        assert_eq!(sell.action, TradeAction::SellOpen);
        assert_eq!(sell.contracts_delta, -2);

        let buy = resolve_default(RawDirection::Buy, OpenCloseQualifier::Unknown).unwrap();
        assert_eq!(buy.action, TradeAction::BuyClose);
        assert_eq!(buy.contracts_delta, 2);
    }

    #[test]
    fn test_unknown_opening_policy() {
        let policy = UnknownQualifierPolicy::Opening;
        let sell = resolve(RawDirection::Sell, OpenCloseQualifier::Unknown, 1, policy).unwrap();
        assert_eq!(sell.action, TradeAction::SellOpen);

        let buy = resolve(RawDirection::Buy, OpenCloseQualifier::Unknown, 1, policy).unwrap();
        assert_eq!(buy.action, TradeAction::BuyOpen);
    }

    #[test]
    fn test_unknown_reject_policy() {
        let policy = UnknownQualifierPolicy::Reject;
        assert!(resolve(RawDirection::Sell, OpenCloseQualifier::Unknown, 1, policy).is_none());
        assert!(resolve(RawDirection::Buy, OpenCloseQualifier::Unknown, 1, policy).is_none());

        // Explicit qualifiers are unaffected by the policy.
        let r = resolve(RawDirection::Sell, OpenCloseQualifier::Opening, 1, policy).unwrap();
        assert_eq!(r.action, TradeAction::SellOpen);
    }

    // =========================================================================
    // Totality and Determinism
    // =========================================================================

    #[test]
    fn test_mapping_is_total_and_deterministic() {
        for direction in [RawDirection::Buy, RawDirection::Sell] {
            for qualifier in [
                OpenCloseQualifier::Opening,
                OpenCloseQualifier::Closing,
                OpenCloseQualifier::Unknown,
            ] {
                for policy in [
                    UnknownQualifierPolicy::ShortPremium,
                    UnknownQualifierPolicy::Opening,
                ] {
                    let first = resolve(direction, qualifier, 3, policy);
                    let second = resolve(direction, qualifier, 3, policy);
                    assert!(first.is_some());
                    assert_eq!(first, second);
                }
            }
        }
    }

    #[test]
    fn test_sign_follows_direction() {
        for qualifier in [
            OpenCloseQualifier::Opening,
            OpenCloseQualifier::Closing,
            OpenCloseQualifier::Unknown,
        ] {
            let sell = resolve_default(RawDirection::Sell, qualifier).unwrap();
            assert!(sell.contracts_delta < 0);
            let buy = resolve_default(RawDirection::Buy, qualifier).unwrap();
            assert!(buy.contracts_delta > 0);
        }
    }

    #[test]
    fn test_oversized_quantity_is_indeterminate() {
        let r = resolve(
            RawDirection::Buy,
            OpenCloseQualifier::Opening,
            u32::MAX,
            UnknownQualifierPolicy::ShortPremium,
        );
        assert!(r.is_none());
    }
}
