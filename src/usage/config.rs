//! Usage-check configuration
//!
//! Loaded from a JSON file with camelCase keys; every field is optional:
//! ```json
//! {
//!   "addressBatchSize": 5,
//!   "batchDelayMs": 1500,
//!   "addressEndpoints": ["https://mempool.space/api", "https://blockstream.info/api"],
//!   "xpubEndpoint": "https://blockchain.info"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::{BrainWalletError, BrainWalletResult};
use crate::utils::DEFAULT_USER_AGENT;

/// Rate-limit, timeout and endpoint settings for a usage check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageConfig {
    /// Addresses queried concurrently per batch
    pub address_batch_size: usize,
    /// Pause after each address batch except the last
    pub batch_delay_ms: u64,
    /// Pause between address source A and source B for the same unit
    pub inter_api_delay_ms: u64,
    /// Pause between consecutive xpub requests
    pub xpub_delay_ms: u64,
    pub request_timeout_ms: u64,
    /// Receive addresses derived per account
    pub address_count: u32,
    /// Esplora-style bases, queried in this order
    pub address_endpoints: Vec<String>,
    /// blockchain.info-style base for xpub lookups
    pub xpub_endpoint: String,
    pub user_agent: String,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            address_batch_size: 5,
            batch_delay_ms: 1500,
            inter_api_delay_ms: 500,
            xpub_delay_ms: 1000,
            request_timeout_ms: 10_000,
            address_count: 5,
            address_endpoints: vec![
                "https://mempool.space/api".to_string(),
                "https://blockstream.info/api".to_string(),
            ],
            xpub_endpoint: "https://blockchain.info".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UsageConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> BrainWalletResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BrainWalletError::invalid_config(format!("Cannot read config {}", path.display()))
                .with_details(e.to_string())
        })?;
        let config: UsageConfig = serde_json::from_str(&content).map_err(|e| {
            BrainWalletError::invalid_config("Malformed config file").with_details(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BrainWalletResult<()> {
        if self.address_batch_size == 0 {
            return Err(BrainWalletError::invalid_config("addressBatchSize must be at least 1"));
        }
        if self.request_timeout_ms == 0 {
            return Err(BrainWalletError::invalid_config("requestTimeoutMs must be at least 1"));
        }
        if self.address_count == 0 {
            return Err(BrainWalletError::invalid_config("addressCount must be at least 1"));
        }
        if self.address_endpoints.is_empty() {
            return Err(BrainWalletError::invalid_config("addressEndpoints must not be empty"));
        }

        for endpoint in self.address_endpoints.iter().chain(std::iter::once(&self.xpub_endpoint)) {
            validate_endpoint(endpoint)?;
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn inter_api_delay(&self) -> Duration {
        Duration::from_millis(self.inter_api_delay_ms)
    }

    pub fn xpub_delay(&self) -> Duration {
        Duration::from_millis(self.xpub_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Endpoints must be https; plain http only for a local indexer
fn validate_endpoint(endpoint: &str) -> BrainWalletResult<()> {
    let url = Url::parse(endpoint).map_err(|e| {
        BrainWalletError::invalid_config(format!("Invalid endpoint URL: {}", endpoint))
            .with_details(e.to_string())
    })?;

    match url.scheme() {
        "https" => Ok(()),
        "http" if matches!(url.host_str(), Some("localhost") | Some("127.0.0.1")) => Ok(()),
        scheme => Err(BrainWalletError::invalid_config(format!(
            "Endpoint {} uses {}; only https is allowed",
            endpoint, scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_defaults_are_valid() {
        let config = UsageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.address_batch_size, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.address_endpoints[0], "https://mempool.space/api");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: UsageConfig = serde_json::from_str(r#"{"addressBatchSize": 3, "xpubDelayMs": 0}"#).unwrap();
        assert_eq!(config.address_batch_size, 3);
        assert_eq!(config.xpub_delay_ms, 0);
        assert_eq!(config.batch_delay_ms, 1500);
        assert_eq!(config.xpub_endpoint, "https://blockchain.info");
    }

    #[test]
    fn test_rejects_plain_http() {
        let config = UsageConfig {
            address_endpoints: vec!["http://mempool.space/api".to_string()],
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().code, ErrorCode::InvalidConfig);

        let local = UsageConfig {
            address_endpoints: vec!["http://localhost:3002/api".to_string()],
            ..Default::default()
        };
        assert!(local.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let zero_batch = UsageConfig {
            address_batch_size: 0,
            ..Default::default()
        };
        assert!(zero_batch.validate().is_err());

        let no_endpoints = UsageConfig {
            address_endpoints: Vec::new(),
            ..Default::default()
        };
        assert!(no_endpoints.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("brain-wallet-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"requestTimeoutMs": 2500}"#).unwrap();
        let config = UsageConfig::load(&path).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        std::fs::remove_file(&path).ok();

        assert!(UsageConfig::load(Path::new("/nonexistent/brain-wallet.json")).is_err());
    }
}
