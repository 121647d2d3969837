//! Ledger client configuration.
//!
//! Base URL, credentials, and the executor wallet used to sign and pay for
//! orders. Built from environment variables in deployments; tests construct
//! explicit values.

use url::Url;

use credo_core::WalletAddress;

/// Configuration for connecting to the ledger order service.
///
/// Custom `Debug` implementation redacts the `api_token` field to prevent
/// credential leakage in log output.
#[derive(Clone)]
pub struct LedgerConfig {
    /// Base URL of the order service.
    pub api_url: Url,
    /// Bearer token for API authentication.
    pub api_token: String,
    /// The asset ledger new assets are created on.
    pub ledger_id: String,
    /// The executing wallet: signer and payer of every order.
    pub executor_address: WalletAddress,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"[REDACTED]")
            .field("ledger_id", &self.ledger_id)
            .field("executor_address", &self.executor_address)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LEDGER_API_URL` (required)
    /// - `LEDGER_API_TOKEN` (required)
    /// - `LEDGER_ID` (required)
    /// - `LEDGER_EXECUTOR_ADDRESS` (required)
    /// - `LEDGER_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = require_env("LEDGER_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidUrl("LEDGER_API_URL".to_string(), e.to_string()))?;
        let executor = require_env("LEDGER_EXECUTOR_ADDRESS")?;
        let executor_address = WalletAddress::new(executor)
            .map_err(|e| ConfigError::InvalidExecutor(e.to_string()))?;

        Ok(Self {
            api_url,
            api_token: require_env("LEDGER_API_TOKEN")?,
            ledger_id: require_env("LEDGER_ID")?,
            executor_address,
            timeout_secs: std::env::var("LEDGER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be
    /// parsed (should not occur for valid port numbers, but avoids
    /// `expect()`).
    pub fn local_mock(port: u16, token: &str) -> Result<Self, ConfigError> {
        let api_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        let executor_address = WalletAddress::new("0x0000000000000000000000000000000000000001")
            .map_err(|e| ConfigError::InvalidExecutor(e.to_string()))?;
        Ok(Self {
            api_url,
            api_token: token.to_string(),
            ledger_id: "test-ledger".to_string(),
            executor_address,
            timeout_secs: 5,
        })
    }
}

fn require_env(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    /// A URL variable failed to parse.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// The executor address failed wallet validation.
    #[error("invalid executor address: {0}")]
    InvalidExecutor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = LedgerConfig::local_mock(9000, "test-token").unwrap();
        assert_eq!(cfg.api_token, "test-token");
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.api_url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = LedgerConfig::local_mock(9000, "super-secret").unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
