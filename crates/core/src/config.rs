use serde::{Deserialize, Serialize};

use crate::policy::UnknownQualifierPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub schwab: SchwabConfig,
    pub sync: SyncConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchwabConfig {
    pub api_url: String,
    /// Bearer token minted by the external auth flow.
    pub access_token: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fallback rule for fills with no open/close qualifier.
    pub unknown_qualifier_policy: UnknownQualifierPolicy,
    /// Pause between per-position quote fetches during live update.
    pub quote_pause_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Benchmark annual rate (percent) for excess-return comparison.
    pub benchmark_rate: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/wheelhouse".to_string(),
                max_connections: 10,
            },
            schwab: SchwabConfig {
                api_url: "https://api.schwabapi.com".to_string(),
                access_token: String::new(),
                timeout_secs: 30,
            },
            sync: SyncConfig {
                unknown_qualifier_policy: UnknownQualifierPolicy::default(),
                quote_pause_ms: 1200,
            },
            analytics: AnalyticsConfig {
                benchmark_rate: 3.76,
            },
        }
    }
}
