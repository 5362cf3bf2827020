//! RootChainManager wrapper
//!
//! Parent-chain settlement contract: deposits are locked through it, exits
//! are settled by it and it maps every root token to its predicate.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes, B256, U256},
};
use std::sync::Arc;
use tracing::debug;

use crate::base_token::ContractToken;
use crate::error::Result;
use crate::side_chain::SideChainClient;
use crate::types::{BridgeType, ChainRole, ContractParam, TransactionOption};
use crate::write_result::WriteOutcome;

pub const ROOT_CHAIN_MANAGER_NAME: &str = "RootChainManager";

/// RootChainManager on the parent chain
pub struct RootChainManager {
    token: ContractToken,
}

impl RootChainManager {
    pub fn new(client: Arc<SideChainClient>, address: Address) -> Self {
        Self {
            token: ContractToken::new(
                ContractParam::new(
                    address,
                    ROOT_CHAIN_MANAGER_NAME,
                    ChainRole::Parent,
                    BridgeType::Pos,
                ),
                client,
            ),
        }
    }

    pub fn address(&self) -> Address {
        self.token.param().address
    }

    /// `depositFor(user, rootToken, depositData)`
    pub async fn deposit(
        &self,
        user: Address,
        root_token: Address,
        deposit_data: Bytes,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        debug!(user = %user, root_token = %root_token, "depositFor");
        let method = self
            .token
            .method(
                "depositFor",
                vec![
                    DynSolValue::Address(user),
                    DynSolValue::Address(root_token),
                    DynSolValue::Bytes(deposit_data.to_vec()),
                ],
            )
            .await?;
        self.token.process_write(&method, option).await
    }

    /// `depositEtherFor(user)` carrying `amount` as value
    pub async fn deposit_ether(
        &self,
        user: Address,
        amount: U256,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        let method = self
            .token
            .method("depositEtherFor", vec![DynSolValue::Address(user)])
            .await?;
        let option = TransactionOption {
            value: Some(amount),
            ..option.clone()
        };
        self.token.process_write(&method, &option).await
    }

    /// `exit(payload)`
    pub async fn exit(&self, payload: Bytes, option: &TransactionOption) -> Result<WriteOutcome> {
        let method = self
            .token
            .method("exit", vec![DynSolValue::Bytes(payload.to_vec())])
            .await?;
        self.token.process_write(&method, option).await
    }

    /// Whether `exit_hash` has already been settled
    pub async fn is_exit_processed(&self, exit_hash: B256) -> Result<bool> {
        let method = self
            .token
            .method("processedExits", vec![DynSolValue::FixedBytes(exit_hash, 32)])
            .await?;
        self.token
            .process_read(&method, &TransactionOption::default())
            .await
    }

    pub async fn token_to_type(&self, root_token: Address) -> Result<B256> {
        let method = self
            .token
            .method("tokenToType", vec![DynSolValue::Address(root_token)])
            .await?;
        self.token
            .process_read(&method, &TransactionOption::default())
            .await
    }

    pub async fn type_to_predicate(&self, token_type: B256) -> Result<Address> {
        let method = self
            .token
            .method("typeToPredicate", vec![DynSolValue::FixedBytes(token_type, 32)])
            .await?;
        self.token
            .process_read(&method, &TransactionOption::default())
            .await
    }
}
