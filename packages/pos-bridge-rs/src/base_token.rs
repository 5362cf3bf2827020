//! Base contract wrapper
//!
//! A [`ContractToken`] binds one logical contract to one chain role. The
//! contract handle is resolved lazily and at most once: the first caller
//! fetches the ABI while concurrent callers wait on the same initialisation.

use alloy::{dyn_abi::DynSolValue, primitives::Bytes};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::evm::client::ChainRoleClient;
use crate::evm::contract::{ContractHandle, ContractMethod, FromCallOutput};
use crate::side_chain::SideChainClient;
use crate::tx_config::TransactionConfigResolver;
use crate::types::{ChainRole, ContractParam, TransactionOption};
use crate::write_result::{ContractWriteResult, WriteOutcome};

/// One contract on one chain, with guarded read/write primitives
pub struct ContractToken {
    param: ContractParam,
    client: Arc<SideChainClient>,
    contract: OnceCell<ContractHandle>,
}

impl ContractToken {
    pub fn new(param: ContractParam, client: Arc<SideChainClient>) -> Self {
        Self {
            param,
            client,
            contract: OnceCell::new(),
        }
    }

    pub fn param(&self) -> &ContractParam {
        &self.param
    }

    pub fn role(&self) -> ChainRole {
        self.param.role
    }

    pub fn client(&self) -> &Arc<SideChainClient> {
        &self.client
    }

    fn role_client(&self) -> &Arc<dyn ChainRoleClient> {
        self.client.role_client(self.param.role)
    }

    fn resolver(&self) -> TransactionConfigResolver<'_> {
        TransactionConfigResolver::new(
            self.role_client().as_ref(),
            self.client.default_config(self.param.role),
            self.param.role,
        )
    }

    /// Memoised contract handle; a failed fetch is retried by the next caller
    pub async fn get_contract(&self) -> Result<&ContractHandle> {
        self.contract
            .get_or_try_init(|| async {
                let abi = self
                    .client
                    .get_abi(&self.param.name, self.param.bridge_type)
                    .await?;
                debug!(
                    name = %self.param.name,
                    address = %self.param.address,
                    role = %self.param.role,
                    "Contract handle resolved"
                );
                Ok::<_, BridgeError>(ContractHandle::new(
                    self.param.address,
                    abi,
                    self.param.role,
                    &self.param.name,
                ))
            })
            .await
    }

    /// Bind `name(args...)` on this contract
    pub async fn method(&self, name: &str, args: Vec<DynSolValue>) -> Result<ContractMethod> {
        self.get_contract().await?.method(name, args)
    }

    /// Execute a view call and decode its outputs
    pub async fn process_read<T: FromCallOutput>(
        &self,
        method: &ContractMethod,
        option: &TransactionOption,
    ) -> Result<T> {
        debug!(method = %method.name(), role = %self.param.role, "process read");
        let mut config = self.resolver().resolve_read(option);
        config.to = Some(method.address());
        config.data = Some(method.encode_abi());

        let output = self.role_client().read(config.to_call_request()).await?;
        T::from_output(method.decode_output(&output)?)
    }

    /// Resolve and submit a method call, or return it prepared
    pub async fn process_write(
        &self,
        method: &ContractMethod,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        debug!(method = %method.name(), role = %self.param.role, "process write");
        let config = self.resolver().resolve_write(option, Some(method)).await?;
        self.submit(config, option.return_transaction).await
    }

    /// Plain transfer or raw call on this wrapper's chain, not bound to a method
    pub async fn send_transaction(&self, option: &TransactionOption) -> Result<WriteOutcome> {
        debug!(role = %self.param.role, "process send");
        let config = self.resolver().resolve_write(option, None).await?;
        self.submit(config, option.return_transaction).await
    }

    /// Raw `eth_call` on this wrapper's chain
    pub async fn read_transaction(&self, option: &TransactionOption) -> Result<Bytes> {
        debug!(role = %self.param.role, "process raw read");
        let config = self.resolver().resolve_read(option);
        Ok(self.role_client().read(config.to_call_request()).await?)
    }

    async fn submit(
        &self,
        config: crate::types::ResolvedTransactionConfig,
        return_transaction: bool,
    ) -> Result<WriteOutcome> {
        if return_transaction {
            return Ok(WriteOutcome::Prepared(config));
        }

        let tx_hash = self.role_client().write(config.to_request()).await?;
        info!(
            tx_hash = %tx_hash,
            contract = %self.param.name,
            role = %self.param.role,
            nonce = config.nonce,
            "Write submitted"
        );

        Ok(WriteOutcome::Submitted(ContractWriteResult::new(
            tx_hash,
            self.role_client().clone(),
            self.client.receipt_poll_interval(),
        )))
    }

    /// Fail unless this wrapper targets the parent chain
    pub fn check_for_parent(&self, operation: &str) -> Result<()> {
        self.check_role(ChainRole::Parent, operation)
    }

    /// Fail unless this wrapper targets the child chain
    pub fn check_for_child(&self, operation: &str) -> Result<()> {
        self.check_role(ChainRole::Child, operation)
    }

    fn check_role(&self, required: ChainRole, operation: &str) -> Result<()> {
        if self.param.role == required {
            return Ok(());
        }
        self.client
            .logger()
            .error(BridgeError::RoleMismatch {
                operation: operation.to_string(),
                required,
            })
            .throw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{input_of, RecordedCall, TestBridge, TOKEN, USER};
    use crate::types::{BridgeType, EXTRA_GAS_FOR_PROXY_CALL};
    use alloy::primitives::{address, Address, TxKind, U256};
    use alloy::sol_types::SolValue;

    fn erc721_token(bridge: &TestBridge, role: ChainRole) -> ContractToken {
        ContractToken::new(
            ContractParam::new(TOKEN, "ChildERC721", role, BridgeType::Pos),
            bridge.client.clone(),
        )
    }

    #[tokio::test]
    async fn test_concurrent_get_contract_fetches_once() {
        let bridge = TestBridge::new();
        let token = erc721_token(&bridge, ChainRole::Parent);

        let (a, b) = tokio::join!(token.get_contract(), token.get_contract());
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(std::ptr::eq(a, b));
        assert!(Arc::ptr_eq(&a.abi, &b.abi));
        assert_eq!(bridge.abis.fetch_count(), 1);

        token.get_contract().await.unwrap();
        assert_eq!(bridge.abis.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_get_contract_abi_not_found_is_retried() {
        let bridge = TestBridge::new();
        let token = ContractToken::new(
            ContractParam::new(TOKEN, "ERC20Predicate", ChainRole::Parent, BridgeType::Plasma),
            bridge.client.clone(),
        );

        assert!(matches!(
            token.get_contract().await,
            Err(BridgeError::AbiNotFound { .. })
        ));
        assert!(token.get_contract().await.is_err());
        assert_eq!(bridge.abis.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_process_read_decodes() {
        let bridge = TestBridge::new();
        let owner = address!("00000000000000000000000000000000000000e5");
        bridge
            .parent
            .set_read_response("getApproved(uint256)", owner.abi_encode());
        let token = erc721_token(&bridge, ChainRole::Parent);

        let method = token
            .method("getApproved", vec![DynSolValue::Uint(U256::from(3), 256)])
            .await
            .unwrap();
        let approved: Address = token
            .process_read(&method, &TransactionOption::default())
            .await
            .unwrap();

        assert_eq!(approved, owner);
        let reads = bridge.parent.reads();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].to, Some(TxKind::Call(TOKEN)));
        assert_eq!(reads[0].from, Some(USER));
        assert_eq!(bridge.parent.count(|c| matches!(c, RecordedCall::GasPrice)), 0);
        assert_eq!(bridge.child.call_count(), 0);
    }

    #[tokio::test]
    async fn test_process_write_submits_on_role_chain() {
        let bridge = TestBridge::new();
        let token = erc721_token(&bridge, ChainRole::Child);

        let method = token
            .method("withdraw", vec![DynSolValue::Uint(U256::from(9), 256)])
            .await
            .unwrap();
        let outcome = token
            .process_write(&method, &TransactionOption::default())
            .await
            .unwrap();

        let result = outcome.submitted().unwrap();
        let writes = bridge.child.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].to, Some(TxKind::Call(TOKEN)));
        assert_eq!(input_of(&writes[0]), method.encode_abi());
        assert_eq!(writes[0].gas, Some(bridge.child.gas_estimate));
        assert_eq!(bridge.parent.call_count(), 0);

        let receipt = result.get_receipt().await.unwrap();
        assert_eq!(receipt.transaction_hash, result.transaction_hash());
    }

    #[tokio::test]
    async fn test_return_transaction_does_not_submit() {
        let bridge = TestBridge::new();
        let token = erc721_token(&bridge, ChainRole::Parent);

        let method = token
            .method("withdraw", vec![DynSolValue::Uint(U256::from(9), 256)])
            .await
            .unwrap();
        let option = TransactionOption {
            return_transaction: true,
            ..Default::default()
        };
        let prepared = token
            .process_write(&method, &option)
            .await
            .unwrap()
            .prepared()
            .unwrap();

        assert_eq!(prepared.to, Some(TOKEN));
        assert_eq!(prepared.data, Some(method.encode_abi()));
        assert_eq!(
            prepared.gas_limit,
            bridge.parent.gas_estimate + EXTRA_GAS_FOR_PROXY_CALL
        );
        assert!(bridge.parent.writes().is_empty());
    }

    #[tokio::test]
    async fn test_return_transaction_default_is_ignored() {
        let bridge = TestBridge::new();
        let client = SideChainClient::new(
            bridge.parent.clone(),
            bridge.child.clone(),
            bridge.abis.clone(),
        )
        .with_default_config(
            ChainRole::Child,
            TransactionOption {
                from: Some(USER),
                return_transaction: true,
                ..Default::default()
            },
        );
        let token = ContractToken::new(
            ContractParam::new(TOKEN, "ChildERC721", ChainRole::Child, BridgeType::Pos),
            Arc::new(client),
        );

        let method = token
            .method("withdraw", vec![DynSolValue::Uint(U256::from(1), 256)])
            .await
            .unwrap();
        let outcome = token
            .process_write(&method, &TransactionOption::default())
            .await
            .unwrap();

        assert!(outcome.is_submitted());
        assert_eq!(bridge.child.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_send_transaction_value_transfer() {
        let bridge = TestBridge::new();
        let token = erc721_token(&bridge, ChainRole::Child);
        let to = address!("00000000000000000000000000000000000000f6");

        let option = TransactionOption {
            to: Some(to),
            value: Some(U256::from(5)),
            ..Default::default()
        };
        let outcome = token.send_transaction(&option).await.unwrap();

        assert!(outcome.is_submitted());
        let writes = bridge.child.writes();
        assert_eq!(writes[0].to, Some(TxKind::Call(to)));
        assert_eq!(writes[0].value, Some(U256::from(5)));
    }

    #[tokio::test]
    async fn test_read_transaction_raw_call() {
        let bridge = TestBridge::new();
        bridge
            .child
            .set_read_response("balanceOf(address)", U256::from(4).abi_encode());
        let token = erc721_token(&bridge, ChainRole::Child);

        let option = TransactionOption {
            to: Some(TOKEN),
            data: Some(
                token
                    .method("balanceOf", vec![DynSolValue::Address(USER)])
                    .await
                    .unwrap()
                    .encode_abi(),
            ),
            ..Default::default()
        };
        let output = token.read_transaction(&option).await.unwrap();
        assert_eq!(U256::abi_decode(&output, true).unwrap(), U256::from(4));
    }

    #[test]
    fn test_role_guards() {
        let bridge = TestBridge::new();
        let parent = erc721_token(&bridge, ChainRole::Parent);
        let child = erc721_token(&bridge, ChainRole::Child);

        assert!(parent.check_for_parent("deposit").is_ok());
        assert!(child.check_for_child("withdrawStart").is_ok());

        let err = child.check_for_parent("deposit").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::RoleMismatch {
                required: ChainRole::Parent,
                ..
            }
        ));
        assert!(matches!(
            parent.check_for_child("withdrawStart"),
            Err(BridgeError::RoleMismatch {
                required: ChainRole::Child,
                ..
            })
        ));
    }
}
