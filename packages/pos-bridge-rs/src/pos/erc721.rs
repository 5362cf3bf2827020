//! Non-fungible bridge token
//!
//! One wrapper type serves both chains; the role in its [`ContractParam`]
//! decides which operations are allowed.
//!
//! Bridging one token id:
//!
//! 1. parent: `approve` (or `approve_all`) the predicate
//! 2. parent: `deposit`; the child token is minted once the state sync lands
//! 3. child: `withdraw_start` burns it
//! 4. parent: `withdraw_exit` once the burn is checkpointed

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes, U256},
    sol_types::SolValue,
};
use std::sync::Arc;

use crate::error::{BridgeError, Result};
use crate::pos::exit_manager::ExitManager;
use crate::pos::pos_token::PosToken;
use crate::pos::root_chain_manager::RootChainManager;
use crate::side_chain::SideChainClient;
use crate::types::{
    BridgeType, ChainRole, ContractParam, LogEventSignature, TransactionOption, MAX_BATCH_SIZE,
};
use crate::write_result::WriteOutcome;

pub const CHILD_ERC721_NAME: &str = "ChildERC721";

pub struct Erc721 {
    pos: PosToken,
}

impl Erc721 {
    pub fn new(
        token_address: Address,
        role: ChainRole,
        client: Arc<SideChainClient>,
        root_chain_manager: Arc<RootChainManager>,
        exit_manager: Arc<dyn ExitManager>,
    ) -> Self {
        Self {
            pos: PosToken::new(
                ContractParam::new(token_address, CHILD_ERC721_NAME, role, BridgeType::Pos),
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

    fn validate_many(&self, token_ids: &[U256]) -> Result<Vec<U256>> {
        if token_ids.len() > MAX_BATCH_SIZE {
            return self
                .pos
                .token()
                .client()
                .logger()
                .error(BridgeError::BatchSizeExceeded {
                    count: token_ids.len(),
                    max: MAX_BATCH_SIZE,
                })
                .throw();
        }
        Ok(token_ids.to_vec())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Number of tokens held by `owner`
    pub async fn get_tokens_count(
        &self,
        owner: Address,
        option: &TransactionOption,
    ) -> Result<U256> {
        let token = self.pos.token();
        let method = token
            .method("balanceOf", vec![DynSolValue::Address(owner)])
            .await?;
        token.process_read(&method, option).await
    }

    /// Token id at `index` in `owner`'s enumeration
    pub async fn get_token_id_at_index_for_user(
        &self,
        index: U256,
        owner: Address,
        option: &TransactionOption,
    ) -> Result<U256> {
        let token = self.pos.token();
        let method = token
            .method(
                "tokenOfOwnerByIndex",
                vec![DynSolValue::Address(owner), DynSolValue::Uint(index, 256)],
            )
            .await?;
        token.process_read(&method, option).await
    }

    /// Up to `limit` token ids held by `owner`
    pub async fn get_all_tokens(
        &self,
        owner: Address,
        limit: Option<usize>,
        option: &TransactionOption,
    ) -> Result<Vec<U256>> {
        let count = self.get_tokens_count(owner, option).await?;
        let count = limit.map_or(count, |limit| count.min(U256::from(limit)));
        let count = usize::try_from(count).map_err(|_| {
            BridgeError::AbiDecode(format!("balanceOf {} out of range: {}", owner, count))
        })?;

        // count is chain-supplied; grow as reads succeed
        let mut token_ids = Vec::new();
        for index in 0..count {
            token_ids.push(
                self.get_token_id_at_index_for_user(U256::from(index), owner, option)
                    .await?,
            );
        }
        Ok(token_ids)
    }

    /// Whether the predicate is approved for `token_id`
    pub async fn is_approved(&self, token_id: U256, option: &TransactionOption) -> Result<bool> {
        let token = self.pos.token();
        token.check_for_parent("isApproved")?;

        let method = token
            .method("getApproved", vec![DynSolValue::Uint(token_id, 256)])
            .await?;
        let (approved, predicate) = tokio::try_join!(
            token.process_read::<Address>(&method, option),
            self.pos.get_predicate_address(),
        )?;
        Ok(approved == predicate)
    }

    /// Whether the predicate is an operator for all of `owner`'s tokens
    pub async fn is_approved_all(
        &self,
        owner: Address,
        option: &TransactionOption,
    ) -> Result<bool> {
        let token = self.pos.token();
        token.check_for_parent("isApprovedAll")?;

        let predicate = self.pos.get_predicate_address().await?;
        let method = token
            .method(
                "isApprovedForAll",
                vec![DynSolValue::Address(owner), DynSolValue::Address(predicate)],
            )
            .await?;
        token.process_read(&method, option).await
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Approve the predicate for `token_id`
    pub async fn approve(
        &self,
        token_id: U256,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        let token = self.pos.token();
        token.check_for_parent("approve")?;

        let predicate = self.pos.get_predicate_address().await?;
        let method = token
            .method(
                "approve",
                vec![DynSolValue::Address(predicate), DynSolValue::Uint(token_id, 256)],
            )
            .await?;
        token.process_write(&method, option).await
    }

    /// Approve the predicate for every token of the sender
    pub async fn approve_all(&self, option: &TransactionOption) -> Result<WriteOutcome> {
        let token = self.pos.token();
        token.check_for_parent("approveAll")?;

        let predicate = self.pos.get_predicate_address().await?;
        let method = token
            .method(
                "setApprovalForAll",
                vec![DynSolValue::Address(predicate), DynSolValue::Bool(true)],
            )
            .await?;
        token.process_write(&method, option).await
    }

    /// Lock `token_id` on the parent chain for `owner`
    pub async fn deposit(
        &self,
        token_id: U256,
        owner: Address,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos.token().check_for_parent("deposit")?;

        let deposit_data = Bytes::from(token_id.abi_encode());
        self.pos
            .root_chain_manager()
            .deposit(owner, self.address(), deposit_data, option)
            .await
    }

    /// Lock up to 20 token ids in one deposit
    pub async fn deposit_many(
        &self,
        token_ids: &[U256],
        owner: Address,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos.token().check_for_parent("depositMany")?;
        let token_ids = self.validate_many(token_ids)?;

        let deposit_data = Bytes::from(token_ids.abi_encode());
        self.pos
            .root_chain_manager()
            .deposit(owner, self.address(), deposit_data, option)
            .await
    }

    /// Burn `token_id` on the child chain
    pub async fn withdraw_start(
        &self,
        token_id: U256,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        let token = self.pos.token();
        token.check_for_child("withdrawStart")?;

        let method = token
            .method("withdraw", vec![DynSolValue::Uint(token_id, 256)])
            .await?;
        token.process_write(&method, option).await
    }

    /// Burn up to 20 token ids on the child chain
    pub async fn withdraw_start_many(
        &self,
        token_ids: &[U256],
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        let token = self.pos.token();
        token.check_for_child("withdrawStartMany")?;
        let token_ids = self.validate_many(token_ids)?;

        let ids = token_ids
            .into_iter()
            .map(|id| DynSolValue::Uint(id, 256))
            .collect();
        let method = token
            .method("withdrawBatch", vec![DynSolValue::Array(ids)])
            .await?;
        token.process_write(&method, option).await
    }

    /// Transfer `token_id` between two accounts on this wrapper's chain
    pub async fn transfer(
        &self,
        token_id: U256,
        from: Address,
        to: Address,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        let token = self.pos.token();
        let method = token
            .method(
                "transferFrom",
                vec![
                    DynSolValue::Address(from),
                    DynSolValue::Address(to),
                    DynSolValue::Uint(token_id, 256),
                ],
            )
            .await?;
        token.process_write(&method, option).await
    }

    // ------------------------------------------------------------------------
    // Exits
    // ------------------------------------------------------------------------

    /// Settle a single-token burn on the parent chain
    pub async fn withdraw_exit(
        &self,
        burn_tx_hash: &str,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos
            .exit_with(
                "withdrawExit",
                burn_tx_hash,
                LogEventSignature::Erc721Transfer,
                false,
                option,
            )
            .await
    }

    /// Settle a batch burn on the parent chain
    pub async fn withdraw_exit_many(
        &self,
        burn_tx_hash: &str,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos
            .exit_with(
                "withdrawExitMany",
                burn_tx_hash,
                LogEventSignature::Erc721BatchTransfer,
                false,
                option,
            )
            .await
    }

    /// [`Self::withdraw_exit`] with the proof served by the proof API
    pub async fn withdraw_exit_faster(
        &self,
        burn_tx_hash: &str,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos
            .exit_with(
                "withdrawExitFaster",
                burn_tx_hash,
                LogEventSignature::Erc721Transfer,
                true,
                option,
            )
            .await
    }

    pub async fn withdraw_exit_faster_many(
        &self,
        burn_tx_hash: &str,
        option: &TransactionOption,
    ) -> Result<WriteOutcome> {
        self.pos
            .exit_with(
                "withdrawExitFasterMany",
                burn_tx_hash,
                LogEventSignature::Erc721BatchTransfer,
                true,
                option,
            )
            .await
    }

    /// Whether the single-token exit of `burn_tx_hash` has settled
    pub async fn is_exited(&self, burn_tx_hash: &str) -> Result<bool> {
        self.pos
            .is_exited_with(burn_tx_hash, LogEventSignature::Erc721Transfer)
            .await
    }

    /// Whether the batch exit of `burn_tx_hash` has settled
    pub async fn is_exited_many(&self, burn_tx_hash: &str) -> Result<bool> {
        self.pos
            .is_exited_with(burn_tx_hash, LogEventSignature::Erc721BatchTransfer)
            .await
    }
}
