//! POS bridge entry point

use alloy::primitives::Address;
use eyre::eyre;
use std::sync::Arc;
use tracing::info;

use crate::config::BridgeClientConfig;
use crate::pos::erc20::Erc20;
use crate::pos::erc721::Erc721;
use crate::pos::exit_manager::ExitManager;
use crate::pos::root_chain_manager::RootChainManager;
use crate::side_chain::SideChainClient;
use crate::types::ChainRole;

/// Factory for bridge token wrappers sharing one client, RootChainManager and
/// exit manager
pub struct PosClient {
    client: Arc<SideChainClient>,
    root_chain_manager: Arc<RootChainManager>,
    exit_manager: Arc<dyn ExitManager>,
}

impl PosClient {
    pub fn new(
        client: Arc<SideChainClient>,
        root_chain_manager: Address,
        exit_manager: Arc<dyn ExitManager>,
    ) -> Self {
        Self {
            root_chain_manager: Arc::new(RootChainManager::new(client.clone(), root_chain_manager)),
            client,
            exit_manager,
        }
    }

    /// Connect both chains from configuration
    pub fn connect(
        config: &BridgeClientConfig,
        exit_manager: Arc<dyn ExitManager>,
    ) -> eyre::Result<Self> {
        let root_chain_manager = config
            .root_chain_manager
            .ok_or_else(|| eyre!("ROOT_CHAIN_MANAGER_ADDRESS required"))?;
        let client = SideChainClient::connect(config)?;

        info!(root_chain_manager = %root_chain_manager, "POS client ready");
        Ok(Self::new(Arc::new(client), root_chain_manager, exit_manager))
    }

    pub fn client(&self) -> &Arc<SideChainClient> {
        &self.client
    }

    pub fn root_chain_manager(&self) -> &Arc<RootChainManager> {
        &self.root_chain_manager
    }

    /// Fungible token wrapper on `role`'s chain
    pub fn erc20(&self, token_address: Address, role: ChainRole) -> Erc20 {
        Erc20::new(
            token_address,
            role,
            self.client.clone(),
            self.root_chain_manager.clone(),
            self.exit_manager.clone(),
        )
    }

    /// Non-fungible token wrapper on `role`'s chain
    pub fn erc721(&self, token_address: Address, role: ChainRole) -> Erc721 {
        Erc721::new(
            token_address,
            role,
            self.client.clone(),
            self.root_chain_manager.clone(),
            self.exit_manager.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExitManager, TestBridge, ROOT_CHAIN_MANAGER, TOKEN};

    #[tokio::test]
    async fn test_wrappers_share_root_chain_manager() {
        let bridge = TestBridge::new().with_predicate();
        let pos = bridge.pos_client();

        let erc20 = pos.erc20(TOKEN, ChainRole::Parent);
        let erc721 = pos.erc721(TOKEN, ChainRole::Parent);
        assert_eq!(erc20.role(), ChainRole::Parent);
        assert_eq!(erc721.address(), TOKEN);
        assert_eq!(pos.root_chain_manager().address(), ROOT_CHAIN_MANAGER);

        assert_eq!(
            erc20.get_predicate_address().await.unwrap(),
            erc721.get_predicate_address().await.unwrap()
        );
    }

    #[test]
    fn test_connect_requires_root_chain_manager() {
        let config = BridgeClientConfig::from_lookup(|key| match key {
            "PARENT_RPC_URL" => Some("https://rpc.sepolia.example".to_string()),
            "CHILD_RPC_URL" => Some("https://rpc.amoy.example".to_string()),
            _ => None,
        })
        .unwrap();

        let err = PosClient::connect(&config, Arc::new(MockExitManager::new()))
            .err()
            .unwrap();
        assert!(err.to_string().contains("ROOT_CHAIN_MANAGER_ADDRESS"));
    }
}
