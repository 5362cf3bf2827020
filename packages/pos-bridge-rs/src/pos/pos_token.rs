//! Shared base of POS bridge tokens
//!
//! Holds the token's [`ContractToken`] together with the RootChainManager and
//! exit manager every bridge flow needs, and caches the predicate address.

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::base_token::ContractToken;
use crate::error::{BridgeError, Result};
use crate::pos::exit_manager::ExitManager;
use crate::pos::root_chain_manager::RootChainManager;
use crate::side_chain::SideChainClient;
use crate::types::{parse_tx_hash, ContractParam, LogEventSignature, TransactionOption};
use crate::write_result::WriteOutcome;

pub struct PosToken {
    token: ContractToken,
    root_chain_manager: Arc<RootChainManager>,
    exit_manager: Arc<dyn ExitManager>,
    predicate: OnceCell<Address>,
}

impl PosToken {
    pub fn new(
        param: ContractParam,
        client: Arc<SideChainClient>,
        root_chain_manager: Arc<RootChainManager>,
        exit_manager: Arc<dyn ExitManager>,
    ) -> Self {
        Self {
            token: ContractToken::new(param, client),
            root_chain_manager,
            exit_manager,
            predicate: OnceCell::new(),
        }
    }

    pub fn token(&self) -> &ContractToken {
        &self.token
    }

    pub fn address(&self) -> Address {
        self.token.param().address
    }

    pub fn root_chain_manager(&self) -> &Arc<RootChainManager> {
        &self.root_chain_manager
    }

    /// Predicate holding this token in escrow: `typeToPredicate(tokenToType(token))`
    pub async fn get_predicate_address(&self) -> Result<Address> {
        self.predicate
            .get_or_try_init(|| async {
                let token_type = self.root_chain_manager.token_to_type(self.address()).await?;
                let predicate = self.root_chain_manager.type_to_predicate(token_type).await?;
                debug!(token = %self.address(), predicate = %predicate, "Predicate resolved");
                Ok::<_, BridgeError>(predicate)
            })
            .await
            .copied()
    }

    /// Build the exit payload for `burn_tx_hash` and submit it to the RootChainManager
    pub(crate) async fn exit_with(
        &self,
        operation: &str,
        burn_tx_hash: &str,
        event_signature: LogEventSignature,
        is_fast: bool,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.token.check_for_parent(operation)?;
        let burn_tx_hash = parse_tx_hash(burn_tx_hash)?;

        let payload = self
            .exit_manager
            .build_payload_for_exit(burn_tx_hash, event_signature, is_fast)
            .await?;
        info!(
            operation = operation,
            burn_tx_hash = %burn_tx_hash,
            is_fast = is_fast,
            "Submitting exit"
        );
        self.root_chain_manager.exit(payload, option).await
    }

    /// Whether the exit for `burn_tx_hash` has settled.
    ///
    /// Advisory only: a `false` here does not reserve the exit.
    pub(crate) async fn is_exited_with(
        &self,
        burn_tx_hash: &str,
        event_signature: LogEventSignature,
    ) -> Result<bool> {
        let burn_tx_hash = parse_tx_hash(burn_tx_hash)?;
        let exit_hash = self
            .exit_manager
            .get_exit_hash(burn_tx_hash, event_signature)
            .await?;
        self.root_chain_manager.is_exit_processed(exit_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestBridge, PREDICATE, TOKEN};
    use crate::types::{BridgeType, ChainRole};

    fn pos_token(bridge: &TestBridge) -> PosToken {
        PosToken::new(
            ContractParam::new(TOKEN, "ChildERC721", ChainRole::Parent, BridgeType::Pos),
            bridge.client.clone(),
            Arc::new(bridge.root_chain_manager()),
            bridge.exit_manager.clone(),
        )
    }

    #[tokio::test]
    async fn test_predicate_looked_up_once() {
        let bridge = TestBridge::new().with_predicate();
        let token = pos_token(&bridge);

        let (a, b) = tokio::join!(token.get_predicate_address(), token.get_predicate_address());
        assert_eq!(a.unwrap(), PREDICATE);
        assert_eq!(b.unwrap(), PREDICATE);
        assert_eq!(token.get_predicate_address().await.unwrap(), PREDICATE);

        // tokenToType + typeToPredicate, once
        assert_eq!(bridge.parent.reads().len(), 2);
    }

    #[tokio::test]
    async fn test_predicate_failure_not_cached() {
        let bridge = TestBridge::new();
        let token = pos_token(&bridge);

        assert!(token.get_predicate_address().await.is_err());
        bridge.set_predicate();
        assert_eq!(token.get_predicate_address().await.unwrap(), PREDICATE);
    }
}
