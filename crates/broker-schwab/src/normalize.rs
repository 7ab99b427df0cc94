//! Event Normalizer: Schwab order JSON to canonical `TradeEvent`s.
//!
//! All payload parsing happens here, once, into typed structs. Anything the
//! payload cannot support degrades to a structured drop, never an error:
//! the backfill keeps going and the caller decides what to log.
//!
//! One order may carry several option legs and therefore yield several
//! events. Non-option legs are dropped; an unparsable timestamp drops the
//! whole order (every leg depends on it).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use wheelhouse_core::events::{OpenCloseQualifier, OptionKind, RawDirection, TradeEvent};

/// Why an order or leg produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The payload did not deserialize into an order shape at all.
    MalformedOrder,
    /// Order status is not a terminal filled state.
    NotFilled,
    /// Neither enteredTime nor closeTime parsed as a timestamp.
    UnparsableTimestamp,
    /// The leg's instrument is not an option.
    NotAnOption,
    /// The instruction named neither buy nor sell.
    UnknownInstruction,
    /// Strike, expiration, or put/call could not be recovered, even from
    /// the option symbol encoding.
    MissingContractFields,
    /// Leg quantity was zero or negative.
    ZeroQuantity,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MalformedOrder => "malformed order payload",
            Self::NotFilled => "order not filled",
            Self::UnparsableTimestamp => "unparsable timestamp",
            Self::NotAnOption => "not an option leg",
            Self::UnknownInstruction => "unknown instruction",
            Self::MissingContractFields => "missing strike/expiration/put-call",
            Self::ZeroQuantity => "zero quantity",
        };
        write!(f, "{s}")
    }
}

/// One dropped order or leg, for audit logging.
#[derive(Debug, Clone)]
pub struct DroppedLeg {
    pub order_id: Option<String>,
    pub leg_id: Option<String>,
    pub reason: DropReason,
}

/// Result of normalizing one batch of raw orders.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub events: Vec<TradeEvent>,
    pub dropped: Vec<DroppedLeg>,
}

// --- Raw payload shapes ------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawOrder {
    order_id: Option<JsonValue>,
    status: Option<String>,
    entered_time: Option<String>,
    close_time: Option<String>,
    price: Option<Decimal>,
    average_price: Option<Decimal>,
    order_commission: Option<Decimal>,
    order_fee: Option<Decimal>,
    order_leg_collection: Vec<RawLeg>,
    order_activity_collection: Vec<RawActivity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawLeg {
    leg_id: Option<JsonValue>,
    instruction: Option<String>,
    position_effect: Option<String>,
    quantity: Option<Decimal>,
    instrument: Option<RawInstrument>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawInstrument {
    asset_type: Option<String>,
    #[serde(alias = "optionType")]
    put_call: Option<String>,
    symbol: Option<String>,
    underlying_symbol: Option<String>,
    strike_price: Option<Decimal>,
    #[serde(alias = "expirationDate")]
    maturity_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawActivity {
    execution_legs: Vec<RawExecutionLeg>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawExecutionLeg {
    price: Option<Decimal>,
}

// --- Field parsers -----------------------------------------------------------

/// Parses an ISO timestamp, accepting both `Z` and explicit offsets,
/// including the colon-free `+0000` form Schwab emits.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses an expiration date, tolerating a trailing time component.
fn parse_expiration(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.get(0..10)?, "%Y-%m-%d").ok()
}

/// Decodes the 21-char OSI option symbol: 6-char padded root, YYMMDD
/// expiration, C/P flag, strike ×1000 in 8 digits.
///
/// `"XYZ   251219P00050000"` → (XYZ, 2025-12-19, Put, 50).
fn parse_option_symbol(symbol: &str) -> Option<(String, NaiveDate, OptionKind, Decimal)> {
    if !symbol.is_ascii() || symbol.len() < 21 {
        return None;
    }

    let root = symbol.get(0..6)?.trim();
    if root.is_empty() {
        return None;
    }

    let date_digits = symbol.get(6..12)?;
    let year: i32 = date_digits.get(0..2)?.parse().ok()?;
    let month: u32 = date_digits.get(2..4)?.parse().ok()?;
    let day: u32 = date_digits.get(4..6)?.parse().ok()?;
    let expiration = NaiveDate::from_ymd_opt(2000 + year, month, day)?;

    let kind = OptionKind::parse(symbol.get(12..13)?)?;

    let strike_millis: u64 = symbol.get(13..21)?.parse().ok()?;
    let strike = Decimal::from(strike_millis) / Decimal::from(1000);

    Some((root.to_string(), expiration, kind, strike))
}

fn id_string(value: &Option<JsonValue>) -> Option<String> {
    match value {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn is_option_asset(asset_type: Option<&str>) -> bool {
    matches!(asset_type, Some("OPTION" | "OPTION_CONTRACT"))
}

/// Fill price: first execution record, else order price, else average.
fn fill_price(order: &RawOrder) -> Decimal {
    order
        .order_activity_collection
        .iter()
        .flat_map(|a| a.execution_legs.iter())
        .find_map(|leg| leg.price)
        .or(order.price)
        .or(order.average_price)
        .unwrap_or(Decimal::ZERO)
}

// --- Normalizer --------------------------------------------------------------

/// Converts raw Schwab order records into `TradeEvent`s.
///
/// Never fails: every shape problem is reported in `dropped` and the rest
/// of the batch is still produced.
#[must_use]
pub fn normalize_orders(account: &str, raw: &[JsonValue]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for value in raw {
        let fallback_id = value
            .get("orderId")
            .map(std::string::ToString::to_string);

        let Ok(order) = serde_json::from_value::<RawOrder>(value.clone()) else {
            batch.dropped.push(DroppedLeg {
                order_id: fallback_id,
                leg_id: None,
                reason: DropReason::MalformedOrder,
            });
            continue;
        };

        normalize_order(account, &order, &mut batch);
    }

    batch
}

fn drop_entry(
    batch: &mut NormalizedBatch,
    order_id: &Option<String>,
    leg_id: Option<String>,
    reason: DropReason,
) {
    batch.dropped.push(DroppedLeg {
        order_id: order_id.clone(),
        leg_id,
        reason,
    });
}

fn normalize_order(account: &str, order: &RawOrder, batch: &mut NormalizedBatch) {
    let order_id = id_string(&order.order_id);

    let filled = order
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("FILLED"));
    if !filled {
        drop_entry(batch, &order_id, None, DropReason::NotFilled);
        return;
    }

    let Some(executed_at) = order
        .entered_time
        .as_deref()
        .or(order.close_time.as_deref())
        .and_then(parse_timestamp)
    else {
        // Every leg shares the order timestamp; none can be reconciled.
        drop_entry(batch, &order_id, None, DropReason::UnparsableTimestamp);
        return;
    };

    let price = fill_price(order);
    let commissions = order.order_commission.unwrap_or(Decimal::ZERO);
    let fees = order.order_fee.unwrap_or(Decimal::ZERO);

    for leg in &order.order_leg_collection {
        let leg_id = id_string(&leg.leg_id);

        let Some(instrument) = leg.instrument.as_ref() else {
            drop_entry(batch, &order_id, leg_id, DropReason::NotAnOption);
            continue;
        };
        if !is_option_asset(instrument.asset_type.as_deref()) {
            drop_entry(batch, &order_id, leg_id, DropReason::NotAnOption);
            continue;
        }

        // Structured fields first; the OSI symbol encoding is the fallback
        // for anything the payload left out.
        let decoded = instrument
            .symbol
            .as_deref()
            .and_then(parse_option_symbol);

        let kind = instrument
            .put_call
            .as_deref()
            .and_then(OptionKind::parse)
            .or(decoded.as_ref().map(|d| d.2));
        let strike = instrument
            .strike_price
            .filter(|s| *s > Decimal::ZERO)
            .or(decoded.as_ref().map(|d| d.3));
        let expiration = instrument
            .maturity_date
            .as_deref()
            .and_then(parse_expiration)
            .or(decoded.as_ref().map(|d| d.1));
        let symbol = instrument
            .underlying_symbol
            .clone()
            .or_else(|| decoded.as_ref().map(|d| d.0.clone()))
            .or_else(|| instrument.symbol.as_deref().map(|s| s.trim().to_string()));

        let (Some(kind), Some(strike), Some(expiration), Some(symbol)) =
            (kind, strike, expiration, symbol)
        else {
            drop_entry(batch, &order_id, leg_id, DropReason::MissingContractFields);
            continue;
        };

        let quantity = leg
            .quantity
            .map(|q| q.abs())
            .and_then(|q| q.to_u32())
            .unwrap_or(0);
        if quantity == 0 {
            drop_entry(batch, &order_id, leg_id, DropReason::ZeroQuantity);
            continue;
        }

        let Some(direction) = leg
            .instruction
            .as_deref()
            .and_then(RawDirection::parse)
        else {
            drop_entry(batch, &order_id, leg_id, DropReason::UnknownInstruction);
            continue;
        };

        let qualifier = leg
            .position_effect
            .as_deref()
            .map_or(OpenCloseQualifier::Unknown, OpenCloseQualifier::parse);

        batch.events.push(TradeEvent {
            account: account.to_string(),
            symbol,
            kind,
            strike,
            expiration,
            direction,
            qualifier,
            quantity,
            price,
            commissions,
            fees,
            executed_at,
            underlying_price: None,
            order_id: order_id.clone(),
            leg_id,
        });
    }
}
