//! Option quotes via the Schwab market-data chain endpoint.
//!
//! The chain payload keys expirations as `"YYYY-MM-DD:dte"` and strikes as
//! decimal strings (`"31.0"`), each holding an array of contracts with
//! `mark`, `volatility` (percent), and `delta`.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use tracing::debug;

use wheelhouse_core::traits::{QuoteSnapshot, QuoteSource};

use crate::client::SchwabClient;
use crate::error::Result;

impl SchwabClient {
    /// Fetches the full option chain for an underlying.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn option_chain(&self, symbol: &str) -> Result<JsonValue> {
        let path = format!("/marketdata/v1/chains?symbol={}", symbol.to_uppercase());
        self.get_json(&path).await
    }
}

/// Locates one contract in a chain payload and reads its snapshot.
///
/// Both the put and call maps are searched; a short-premium book is mostly
/// puts, so those come first.
#[must_use]
pub fn find_contract(
    chain: &JsonValue,
    expiration: NaiveDate,
    strike: Decimal,
) -> Option<QuoteSnapshot> {
    for map_name in ["putExpDateMap", "callExpDateMap"] {
        let Some(exp_map) = chain.get(map_name).and_then(JsonValue::as_object) else {
            continue;
        };

        let prefix = expiration.format("%Y-%m-%d").to_string();
        for (exp_key, strikes) in exp_map {
            if !exp_key.starts_with(&prefix) {
                continue;
            }
            let Some(strikes) = strikes.as_object() else {
                continue;
            };

            for (strike_key, contracts) in strikes {
                let Ok(key_strike) = strike_key.parse::<Decimal>() else {
                    continue;
                };
                if key_strike != strike {
                    continue;
                }

                let contract = contracts.as_array()?.first()?;
                let mark: Decimal =
                    serde_json::from_value(contract.get("mark")?.clone()).ok()?;
                let volatility = contract.get("volatility")?.as_f64()?;
                let delta = contract
                    .get("delta")
                    .and_then(JsonValue::as_f64)
                    .unwrap_or(0.0);

                return Some(QuoteSnapshot {
                    mark,
                    // Chain volatility is quoted in percent.
                    implied_volatility: volatility / 100.0,
                    delta,
                });
            }
        }
    }

    None
}

#[async_trait]
impl QuoteSource for SchwabClient {
    async fn fetch_quote(
        &self,
        symbol: &str,
        expiration: NaiveDate,
        strike: Decimal,
    ) -> anyhow::Result<Option<QuoteSnapshot>> {
        let chain = self.option_chain(symbol).await?;
        let snapshot = find_contract(&chain, expiration, strike);
        if snapshot.is_none() {
            debug!(symbol, %strike, %expiration, "Contract not present in chain");
        }
        Ok(snapshot)
    }
}
