//! Schwab HTTP client for read-only order and account queries.
//!
//! Authentication (OAuth dance, token refresh) lives in an external flow;
//! this client only attaches the bearer token it is given.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use tracing::debug;

use wheelhouse_core::config::SchwabConfig;
use wheelhouse_core::traits::OrderSource;

use crate::error::{Result, SchwabError};

/// Read-only client for the Schwab trader API.
pub struct SchwabClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl SchwabClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    /// Returns a configuration error when the access token is missing or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &SchwabConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(SchwabError::Configuration(
                "schwab.access_token is not set".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SchwabError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    pub(crate) async fn get_json(&self, path_and_query: &str) -> Result<JsonValue> {
        let url = format!("{}{}", self.api_url, path_and_query);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SchwabError::api(status.as_u16(), message));
        }

        Ok(response.json().await?)
    }

    /// Raw accounts JSON.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn get_accounts(&self) -> Result<JsonValue> {
        self.get_json("/trader/v1/accounts").await
    }

    /// Account numbers extracted from the accounts payload.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn get_account_numbers(&self) -> Result<Vec<String>> {
        let accounts = self.get_accounts().await?;
        Ok(extract_account_numbers(&accounts))
    }

    /// Raw order records for one account entered at or after `since`.
    ///
    /// Safe to call with an overlapping window; downstream dedup handles the
    /// replays.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn get_orders(
        &self,
        account: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<JsonValue>> {
        let from = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let to = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let path = format!(
            "/trader/v1/accounts/{account}/orders?fromEnteredTime={from}&toEnteredTime={to}"
        );

        let value = self.get_json(&path).await?;
        match value {
            JsonValue::Array(orders) => Ok(orders),
            other => Err(SchwabError::Serialization(format!(
                "expected an order array, got {other}"
            ))),
        }
    }
}

/// Pulls `securitiesAccount.accountNumber` out of each account entry.
#[must_use]
pub fn extract_account_numbers(accounts: &JsonValue) -> Vec<String> {
    let Some(entries) = accounts.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            entry
                .get("securitiesAccount")?
                .get("accountNumber")?
                .as_str()
                .map(std::string::ToString::to_string)
        })
        .collect()
}

#[async_trait]
impl OrderSource for SchwabClient {
    async fn account_numbers(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.get_account_numbers().await?)
    }

    async fn fetch_orders(
        &self,
        account: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<JsonValue>> {
        Ok(self.get_orders(account, since).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_account_numbers() {
        let accounts = json!([
            {"securitiesAccount": {"accountNumber": "XXXX9514", "type": "MARGIN"}},
            {"securitiesAccount": {"accountNumber": "XXXX0021"}},
            {"unexpected": true}
        ]);
        assert_eq!(
            extract_account_numbers(&accounts),
            vec!["XXXX9514".to_string(), "XXXX0021".to_string()]
        );
    }

    #[test]
    fn test_extract_account_numbers_tolerates_non_array() {
        assert!(extract_account_numbers(&json!({"error": "denied"})).is_empty());
        assert!(extract_account_numbers(&json!(null)).is_empty());
    }

    #[test]
    fn test_client_requires_token() {
        let config = SchwabConfig {
            api_url: "https://api.schwabapi.com".to_string(),
            access_token: String::new(),
            timeout_secs: 30,
        };
        assert!(matches!(
            SchwabClient::new(&config),
            Err(SchwabError::Configuration(_))
        ));
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = SchwabConfig {
            api_url: "https://api.schwabapi.com/".to_string(),
            access_token: "token".to_string(),
            timeout_secs: 30,
        };
        let client = SchwabClient::new(&config).unwrap();
        assert_eq!(client.api_url, "https://api.schwabapi.com");
    }
}
