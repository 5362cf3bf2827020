//! Shared two-chain client
//!
//! [`SideChainClient`] owns one role client per chain, the per-role default
//! transaction options and the ABI source. Wrappers hold it behind an `Arc`;
//! nothing in it changes once it is shared.

use alloy::json_abi::JsonAbi;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::abi::{AbiSource, HttpAbiSource};
use crate::config::{BridgeClientConfig, RoleEndpointConfig};
use crate::error::{ErrorLogger, Result};
use crate::evm::client::{ChainRoleClient, EvmRoleClient};
use crate::types::{BridgeType, ChainRole, TransactionOption};

/// Per-role defaults and client-wide settings
#[derive(Debug, Clone)]
pub struct SideChainConfig {
    /// Defaults overlaid by every parent-chain call
    pub parent_default: TransactionOption,
    /// Defaults overlaid by every child-chain call
    pub child_default: TransactionOption,
    /// Delay between receipt lookups while awaiting a write
    pub receipt_poll_interval: Duration,
}

impl Default for SideChainConfig {
    fn default() -> Self {
        Self {
            parent_default: TransactionOption::default(),
            child_default: TransactionOption::default(),
            receipt_poll_interval: Duration::from_secs(1),
        }
    }
}

/// Client for the parent and child chains of one bridge deployment
pub struct SideChainClient {
    parent: Arc<dyn ChainRoleClient>,
    child: Arc<dyn ChainRoleClient>,
    abi_source: Arc<dyn AbiSource>,
    config: SideChainConfig,
    logger: ErrorLogger,
}

impl SideChainClient {
    pub fn new(
        parent: Arc<dyn ChainRoleClient>,
        child: Arc<dyn ChainRoleClient>,
        abi_source: Arc<dyn AbiSource>,
    ) -> Self {
        Self {
            parent,
            child,
            abi_source,
            config: SideChainConfig::default(),
            logger: ErrorLogger,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: SideChainConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default options of one role
    pub fn with_default_config(mut self, role: ChainRole, option: TransactionOption) -> Self {
        match role {
            ChainRole::Parent => self.config.parent_default = option,
            ChainRole::Child => self.config.child_default = option,
        }
        self
    }

    /// Build alloy role clients and an HTTP ABI source from configuration
    pub fn connect(config: &BridgeClientConfig) -> eyre::Result<Self> {
        config.validate()?;

        let (parent, parent_signer) = role_client(&config.parent)?;
        let (child, child_signer) = role_client(&config.child)?;

        let abi_source = HttpAbiSource::new(&config.abi_base_url, &config.network, &config.version);

        let side_chain_config = SideChainConfig {
            parent_default: TransactionOption {
                from: config.parent.default_from.or(parent_signer),
                ..Default::default()
            },
            child_default: TransactionOption {
                from: config.child.default_from.or(child_signer),
                ..Default::default()
            },
            receipt_poll_interval: config.receipt_poll_interval,
        };

        info!(
            network = %config.network,
            version = %config.version,
            "Side chain client connected"
        );

        Ok(Self::new(Arc::new(parent), Arc::new(child), Arc::new(abi_source))
            .with_config(side_chain_config))
    }

    /// Look up the ABI of a logical contract
    pub async fn get_abi(&self, name: &str, bridge_type: BridgeType) -> Result<Arc<JsonAbi>> {
        self.abi_source.get_abi(name, bridge_type).await
    }

    pub fn parent(&self) -> &Arc<dyn ChainRoleClient> {
        &self.parent
    }

    pub fn child(&self) -> &Arc<dyn ChainRoleClient> {
        &self.child
    }

    /// Role client selected by `role`
    pub fn role_client(&self, role: ChainRole) -> &Arc<dyn ChainRoleClient> {
        match role {
            ChainRole::Parent => &self.parent,
            ChainRole::Child => &self.child,
        }
    }

    /// Default options of `role` (read-only; resolution copies them)
    pub fn default_config(&self, role: ChainRole) -> &TransactionOption {
        match role {
            ChainRole::Parent => &self.config.parent_default,
            ChainRole::Child => &self.config.child_default,
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        self.config.receipt_poll_interval
    }

    /// Error-reporting facility
    pub fn logger(&self) -> &ErrorLogger {
        &self.logger
    }
}

fn role_client(
    endpoint: &RoleEndpointConfig,
) -> eyre::Result<(EvmRoleClient, Option<alloy::primitives::Address>)> {
    let client = match &endpoint.private_key {
        Some(key) => EvmRoleClient::new_with_signer(&endpoint.rpc_url, key.expose())?,
        None => EvmRoleClient::new_readonly(&endpoint.rpc_url)?,
    };
    let signer = client.signer_address();
    Ok((client, signer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::testing::{abis::pos_abi_registry, MockRoleClient, USER};

    fn client() -> SideChainClient {
        SideChainClient::new(
            Arc::new(MockRoleClient::new(1)),
            Arc::new(MockRoleClient::new(137)),
            Arc::new(pos_abi_registry()),
        )
    }

    #[tokio::test]
    async fn test_get_abi() {
        let client = client();
        let abi = client.get_abi("RootChainManager", BridgeType::Pos).await.unwrap();
        assert!(abi.function("exit").is_some());

        let err = client
            .get_abi("ERC20Predicate", BridgeType::Plasma)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::AbiNotFound { .. }));
    }

    #[tokio::test]
    async fn test_role_clients_are_distinct() {
        let client = client();
        assert_eq!(client.role_client(ChainRole::Parent).get_chain_id().await.unwrap(), 1);
        assert_eq!(client.role_client(ChainRole::Child).get_chain_id().await.unwrap(), 137);
        assert_eq!(client.parent().get_chain_id().await.unwrap(), 1);
        assert_eq!(client.child().get_chain_id().await.unwrap(), 137);
    }

    #[test]
    fn test_default_config_per_role() {
        let client = client()
            .with_default_config(ChainRole::Parent, TransactionOption::from_address(USER));
        assert_eq!(client.default_config(ChainRole::Parent).from, Some(USER));
        assert_eq!(client.default_config(ChainRole::Child).from, None);
        assert_eq!(client.receipt_poll_interval(), Duration::from_secs(1));
    }
}
