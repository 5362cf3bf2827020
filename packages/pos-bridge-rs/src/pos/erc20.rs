//! Fungible bridge token

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes, U256},
    sol_types::SolValue,
};
use std::sync::Arc;

use crate::error::Result;
use crate::pos::exit_manager::ExitManager;
use crate::pos::pos_token::PosToken;
use crate::pos::root_chain_manager::RootChainManager;
use crate::side_chain::SideChainClient;
use crate::types::{BridgeType, ChainRole, ContractParam, LogEventSignature, TransactionOption};
use crate::write_result::WriteOutcome;

pub const CHILD_ERC20_NAME: &str = "ChildERC20";

pub struct Erc20 {
    pos: PosToken,
}

impl Erc20 {
    pub fn new(
        token_address: Address,
        role: ChainRole,
        client: Arc<SideChainClient>,
        root_chain_manager: Arc<RootChainManager>,
        exit_manager: Arc<dyn ExitManager>,
    ) -> Self {
        Self {
            pos: PosToken::new(
                ContractParam::new(token_address, CHILD_ERC20_NAME, role, BridgeType::Pos),
                client,
                root_chain_manager,
                exit_manager,
            ),
        }
    }

    pub fn address(&self) -> Address {
        self.pos.address()
    }

    pub fn role(&self) -> ChainRole {
        self.pos.token().role()
    }

    pub async fn get_predicate_address(&self) -> Result<Address> {
        self.pos.get_predicate_address().await
    }

    /// Explicit spender, or the predicate after a parent-role check
    async fn spender_or_predicate(
        &self,
        spender: Option<Address>,
        operation: &str,
    ) -> Result<Address> {
        match spender {
            Some(spender) => Ok(spender),
            None => {
                self.pos.token().check_for_parent(operation)?;
                self.pos.get_predicate_address().await
            }
        }
    }

    pub async fn get_balance(&self, owner: Address, option: &TransactionOption) -> Result<U256> {
        let token = self.pos.token();
        let method = token
            .method("balanceOf", vec![DynSolValue::Address(owner)])
            .await?;
        token.process_read(&method, option).await
    }

    /// Allowance of `spender` (the predicate when `None`)
    pub async fn get_allowance(
        &self,
        owner: Address,
        spender: Option<Address>,
        option: &TransactionOption,
    ) -> Result<U256> {
        let spender = self.spender_or_predicate(spender, "getAllowance").await?;
        let token = self.pos.token();
        let method = token
            .method(
                "allowance",
                vec![DynSolValue::Address(owner), DynSolValue::Address(spender)],
            )
            .await?;
        token.process_read(&method, option).await
    }

    /// Approve `amount` for `spender` (the predicate when `None`)
    pub async fn approve(
        &self,
        amount: U256,
        spender: Option<Address>,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        let spender = self.spender_or_predicate(spender, "approve").await?;
        let token = self.pos.token();
        let method = token
            .method(
                "approve",
                vec![DynSolValue::Address(spender), DynSolValue::Uint(amount, 256)],
            )
            .await?;
        token.process_write(&method, option).await
    }

    pub async fn approve_max(
        &self,
        spender: Option<Address>,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.approve(U256::MAX, spender, option).await
    }

    /// Lock `amount` on the parent chain for `owner`
    pub async fn deposit(
        &self,
        amount: U256,
        owner: Address,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos.token().check_for_parent("deposit")?;

        let deposit_data = Bytes::from(amount.abi_encode());
        self.pos
            .root_chain_manager()
            .deposit(owner, self.address(), deposit_data, option)
            .await
    }

    /// Bridge native ether; the RootChainManager wraps it on the child chain
    pub async fn deposit_ether(
        &self,
        amount: U256,
        owner: Address,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos.token().check_for_parent("depositEther")?;
        self.pos
            .root_chain_manager()
            .deposit_ether(owner, amount, option)
            .await
    }

    /// Burn `amount` on the child chain
    pub async fn withdraw_start(
        &self,
        amount: U256,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        let token = self.pos.token();
        token.check_for_child("withdrawStart")?;

        let method = token
            .method("withdraw", vec![DynSolValue::Uint(amount, 256)])
            .await?;
        token.process_write(&method, option).await
    }

    pub async fn withdraw_exit(
        &self,
        burn_tx_hash: &str,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos
            .exit_with(
                "withdrawExit",
                burn_tx_hash,
                LogEventSignature::Erc20Transfer,
                false,
                option,
            )
            .await
    }

    pub async fn withdraw_exit_faster(
        &self,
        burn_tx_hash: &str,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos
            .exit_with(
                "withdrawExitFaster",
                burn_tx_hash,
                LogEventSignature::Erc20Transfer,
                true,
                option,
            )
            .await
    }

    pub async fn is_withdraw_exited(&self, burn_tx_hash: &str) -> Result<bool> {
        self.pos
            .is_exited_with(burn_tx_hash, LogEventSignature::Erc20Transfer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::hash::function_selector;
    use crate::testing::{input_of, TestBridge, PREDICATE, ROOT_CHAIN_MANAGER, TOKEN, USER};
    use alloy::primitives::{address, TxKind, B256};

    #[tokio::test]
    async fn test_approve_max_defaults_to_predicate() {
        let bridge = TestBridge::new().with_predicate();
        let erc20 = bridge.erc20(ChainRole::Parent);

        erc20
            .approve_max(None, &TransactionOption::default())
            .await
            .unwrap();

        let writes = bridge.parent.writes();
        assert_eq!(writes[0].to, Some(TxKind::Call(TOKEN)));
        let input = input_of(&writes[0]);
        assert_eq!(&input[..4], &function_selector("approve(address,uint256)"));
        assert_eq!(&input[4..], &(PREDICATE, U256::MAX).abi_encode_params()[..]);
    }

    #[tokio::test]
    async fn test_approve_explicit_spender_on_child() {
        let bridge = TestBridge::new();
        let erc20 = bridge.erc20(ChainRole::Child);
        let spender = address!("00000000000000000000000000000000000000d7");

        erc20
            .approve(U256::from(3), Some(spender), &TransactionOption::default())
            .await
            .unwrap();
        assert_eq!(bridge.child.writes().len(), 1);

        // the predicate only exists on the parent chain
        assert!(matches!(
            erc20.approve(U256::from(3), None, &TransactionOption::default()).await,
            Err(BridgeError::RoleMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_balance_and_allowance() {
        let bridge = TestBridge::new().with_predicate();
        bridge
            .parent
            .set_read_response("balanceOf(address)", U256::from(100).abi_encode());
        bridge
            .parent
            .set_read_response("allowance(address,address)", U256::from(40).abi_encode());
        let erc20 = bridge.erc20(ChainRole::Parent);
        let option = TransactionOption::default();

        assert_eq!(erc20.get_balance(USER, &option).await.unwrap(), U256::from(100));
        assert_eq!(
            erc20.get_allowance(USER, None, &option).await.unwrap(),
            U256::from(40)
        );

        let allowance_read = bridge
            .parent
            .reads()
            .into_iter()
            .find(|tx| input_of(tx)[..4] == function_selector("allowance(address,address)"))
            .unwrap();
        assert_eq!(
            &input_of(&allowance_read)[4..],
            &(USER, PREDICATE).abi_encode_params()[..]
        );
    }

    #[tokio::test]
    async fn test_deposit_and_deposit_ether() {
        let bridge = TestBridge::new();
        let erc20 = bridge.erc20(ChainRole::Parent);
        let option = TransactionOption::default();

        erc20.deposit(U256::from(1_000), USER, &option).await.unwrap();
        erc20.deposit_ether(U256::from(2), USER, &option).await.unwrap();

        let writes = bridge.parent.writes();
        assert_eq!(writes.len(), 2);
        assert!(writes
            .iter()
            .all(|tx| tx.to == Some(TxKind::Call(ROOT_CHAIN_MANAGER))));
        let data = Bytes::from(U256::from(1_000).abi_encode());
        assert_eq!(
            &input_of(&writes[0])[4..],
            &(USER, TOKEN, data).abi_encode_params()[..]
        );
        assert_eq!(writes[1].value, Some(U256::from(2)));
    }

    #[tokio::test]
    async fn test_withdraw_flow() {
        let bridge = TestBridge::new();
        bridge
            .parent
            .set_read_response("processedExits(bytes32)", false.abi_encode());
        let child = bridge.erc20(ChainRole::Child);
        let parent = bridge.erc20(ChainRole::Parent);
        let option = TransactionOption::default();
        let burn = format!("0x{}", "22".repeat(32));

        let burn_result = child
            .withdraw_start(U256::from(50), &option)
            .await
            .unwrap()
            .submitted()
            .unwrap();
        assert_eq!(bridge.child.writes().len(), 1);
        assert!(burn_result.get_receipt().await.unwrap().status);

        assert!(!parent.is_withdraw_exited(&burn).await.unwrap());
        parent.withdraw_exit_faster(&burn, &option).await.unwrap();

        assert_eq!(
            bridge.exit_manager.payload_requests(),
            vec![(B256::repeat_byte(0x22), LogEventSignature::Erc20Transfer, true)]
        );
        assert_eq!(bridge.parent.writes().len(), 1);
    }
}
