//! Outcome of a write
//!
//! A write either went to the chain ([`ContractWriteResult`], awaitable for its
//! receipt) or, under `return_transaction`, was only prepared and handed back
//! as a resolved configuration.

use alloy::primitives::B256;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::Result;
use crate::evm::client::{ChainRoleClient, WriteReceipt};
use crate::types::ResolvedTransactionConfig;

/// Handle over a submitted transaction
pub struct ContractWriteResult {
    tx_hash: B256,
    client: Arc<dyn ChainRoleClient>,
    poll_interval: Duration,
}

impl ContractWriteResult {
    pub fn new(tx_hash: B256, client: Arc<dyn ChainRoleClient>, poll_interval: Duration) -> Self {
        Self {
            tx_hash,
            client,
            poll_interval,
        }
    }

    pub fn transaction_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Wait until the transaction is mined.
    ///
    /// Polls with no deadline; lookup errors end the wait.
    pub async fn get_receipt(&self) -> Result<WriteReceipt> {
        loop {
            if let Some(receipt) = self.client.get_transaction_receipt(self.tx_hash).await? {
                debug!(
                    tx_hash = %self.tx_hash,
                    status = receipt.status,
                    "Receipt available"
                );
                return Ok(receipt);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl std::fmt::Debug for ContractWriteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractWriteResult")
            .field("tx_hash", &self.tx_hash)
            .finish()
    }
}

/// Result of a write-capable operation
#[derive(Debug)]
pub enum WriteOutcome {
    /// Sent to the chain
    Submitted(ContractWriteResult),
    /// Not sent; the fully resolved transaction with `to` and `data` filled in
    Prepared(ResolvedTransactionConfig),
}

impl WriteOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, WriteOutcome::Submitted(_))
    }

    pub fn submitted(self) -> Option<ContractWriteResult> {
        match self {
            WriteOutcome::Submitted(result) => Some(result),
            WriteOutcome::Prepared(_) => None,
        }
    }

    pub fn prepared(self) -> Option<ResolvedTransactionConfig> {
        match self {
            WriteOutcome::Submitted(_) => None,
            WriteOutcome::Prepared(config) => Some(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRoleClient, RecordedCall};

    #[tokio::test]
    async fn test_get_receipt_polls_until_mined() {
        let client = Arc::new(MockRoleClient::new(1));
        client.delay_receipts(2);

        let hash = B256::repeat_byte(0x11);
        let result = ContractWriteResult::new(hash, client.clone(), Duration::from_millis(1));

        let receipt = result.get_receipt().await.unwrap();
        assert_eq!(receipt.transaction_hash, hash);
        assert!(receipt.status);
        assert_eq!(client.count(|c| matches!(c, RecordedCall::Receipt(_))), 3);
    }

    #[tokio::test]
    async fn test_get_receipt_propagates_errors() {
        let client = Arc::new(MockRoleClient::failing(1));
        let result =
            ContractWriteResult::new(B256::ZERO, client, Duration::from_millis(1));
        assert!(result.get_receipt().await.is_err());
    }
}
