//! Bridge client configuration
//!
//! Loaded from environment variables (with `.env` support) or from any key
//! lookup, so tests can inject values without touching the process env.

use alloy::primitives::Address;
use eyre::{eyre, Result, WrapErr};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::abi::DEFAULT_ABI_BASE_URL;
use crate::redact::Redacted;

pub const DEFAULT_NETWORK: &str = "testnet";
pub const DEFAULT_VERSION: &str = "amoy";
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1000;

/// Validate an RPC or artifact URL: http(s) scheme and a host.
///
/// Plain `http://` is accepted with a warning.
pub fn validate_rpc_url(url_str: &str, name: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url_str).map_err(|e| eyre!("{} must be a valid URL: {}", name, e))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(eyre!(
            "{} must use http:// or https:// scheme, got {}",
            name,
            scheme
        ));
    }

    if parsed.host_str().is_none() {
        return Err(eyre!("{} must have a host component", name));
    }

    if scheme == "http" {
        tracing::warn!("{} uses unencrypted http://, use https:// in production", name);
    }

    Ok(())
}

/// Endpoint and signing settings of one chain role
#[derive(Debug, Clone)]
pub struct RoleEndpointConfig {
    pub rpc_url: String,
    /// Signing key; without one the role client is read-only
    pub private_key: Option<Redacted<String>>,
    /// Default sender; falls back to the signer address
    pub default_from: Option<Address>,
}

/// Configuration of a two-chain bridge client
#[derive(Debug, Clone)]
pub struct BridgeClientConfig {
    /// ABI artifact network (e.g. "testnet", "mainnet")
    pub network: String,
    /// ABI artifact version (e.g. "amoy", "v1")
    pub version: String,
    pub parent: RoleEndpointConfig,
    pub child: RoleEndpointConfig,
    pub abi_base_url: String,
    /// Required by `PosClient::connect`
    pub root_chain_manager: Option<Address>,
    pub receipt_poll_interval: Duration,
}

impl BridgeClientConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let role = |prefix: &str| -> Result<RoleEndpointConfig> {
            let rpc_key = format!("{}_RPC_URL", prefix);
            let rpc_url = get(&rpc_key).ok_or_else(|| eyre!("{} required", rpc_key))?;

            let from_key = format!("{}_DEFAULT_FROM", prefix);
            let default_from = get(&from_key)
                .map(|v| parse_address(&v, &from_key))
                .transpose()?;

            Ok(RoleEndpointConfig {
                rpc_url,
                private_key: get(&format!("{}_PRIVATE_KEY", prefix)).map(Redacted),
                default_from,
            })
        };

        let receipt_poll_interval_ms = match get("RECEIPT_POLL_INTERVAL_MS") {
            Some(v) => v
                .parse::<u64>()
                .wrap_err("Invalid RECEIPT_POLL_INTERVAL_MS")?,
            None => DEFAULT_RECEIPT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            network: get("BRIDGE_NETWORK").unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
            version: get("BRIDGE_VERSION").unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            parent: role("PARENT")?,
            child: role("CHILD")?,
            abi_base_url: get("ABI_BASE_URL").unwrap_or_else(|| DEFAULT_ABI_BASE_URL.to_string()),
            root_chain_manager: get("ROOT_CHAIN_MANAGER_ADDRESS")
                .map(|v| parse_address(&v, "ROOT_CHAIN_MANAGER_ADDRESS"))
                .transpose()?,
            receipt_poll_interval: Duration::from_millis(receipt_poll_interval_ms),
        })
    }

    /// Validate URLs before any client is built
    pub fn validate(&self) -> Result<()> {
        validate_rpc_url(&self.parent.rpc_url, "PARENT_RPC_URL")?;
        validate_rpc_url(&self.child.rpc_url, "CHILD_RPC_URL")?;
        validate_rpc_url(&self.abi_base_url, "ABI_BASE_URL")?;

        if self.receipt_poll_interval.is_zero() {
            return Err(eyre!("RECEIPT_POLL_INTERVAL_MS must be positive"));
        }

        Ok(())
    }
}

fn parse_address(value: &str, name: &str) -> Result<Address> {
    Address::from_str(value).map_err(|e| eyre!("Invalid {}: {}", name, e))
}
