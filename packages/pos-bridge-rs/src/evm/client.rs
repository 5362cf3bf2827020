//! Per-chain RPC facade
//!
//! [`ChainRoleClient`] is everything the bridge layer needs from one chain:
//! calls, submissions, gas/nonce/chain-id queries and receipt lookup.
//! [`EvmRoleClient`] implements it over an alloy HTTP provider, either
//! read-only (node-managed accounts sign `eth_sendTransaction`) or with a
//! local private-key wallet.

use alloy::{
    eips::BlockId,
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, B256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use tracing::{debug, info};

/// Receipt of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// `true` when execution succeeded
    pub status: bool,
}

/// RPC operations on one of the two bridged chains
#[async_trait]
pub trait ChainRoleClient: Send + Sync {
    /// Execute `eth_call` and return the raw output
    async fn read(&self, tx: TransactionRequest) -> Result<Bytes>;

    /// Submit a transaction and return its hash
    async fn write(&self, tx: TransactionRequest) -> Result<B256>;

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64>;

    async fn get_gas_price(&self) -> Result<u128>;

    /// Transaction count of `address` including pending transactions
    async fn get_pending_transaction_count(&self, address: Address) -> Result<u64>;

    async fn get_chain_id(&self) -> Result<u64>;

    /// `None` while the transaction is not yet mined
    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<WriteReceipt>>;
}

/// Provider with a local wallet attached
pub type SignerProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::WalletFiller<EthereumWallet>,
    >,
    RootProvider<Http<Client>>,
    Http<Client>,
    Ethereum,
>;

/// alloy-backed role client, either read-only or with a signer
pub enum EvmRoleClient {
    ReadOnly(RootProvider<Http<Client>>),
    WithSigner {
        provider: SignerProvider,
        signer_address: Address,
    },
}

impl EvmRoleClient {
    /// Create a client whose writes are signed by the node
    pub fn new_readonly(rpc_url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );

        info!(rpc_url = %rpc_url, "Created read-only role client");

        Ok(EvmRoleClient::ReadOnly(provider))
    }

    /// Create a client that signs writes with `private_key`
    pub fn new_with_signer(rpc_url: &str, private_key: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| eyre!("Invalid private key: {}", e))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new().wallet(wallet).on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );

        info!(
            rpc_url = %rpc_url,
            address = %address,
            "Created role client with signer"
        );

        Ok(EvmRoleClient::WithSigner {
            provider,
            signer_address: address,
        })
    }

    /// Check if the client has a signer
    pub fn has_signer(&self) -> bool {
        matches!(self, EvmRoleClient::WithSigner { .. })
    }

    /// Get the signer address (None if read-only)
    pub fn signer_address(&self) -> Option<Address> {
        match self {
            EvmRoleClient::ReadOnly(_) => None,
            EvmRoleClient::WithSigner { signer_address, .. } => Some(*signer_address),
        }
    }
}

#[async_trait]
impl ChainRoleClient for EvmRoleClient {
    async fn read(&self, tx: TransactionRequest) -> Result<Bytes> {
        let output = match self {
            EvmRoleClient::ReadOnly(p) => p.call(&tx).await,
            EvmRoleClient::WithSigner { provider, .. } => provider.call(&tx).await,
        }
        .wrap_err("eth_call failed")?;
        Ok(output)
    }

    async fn write(&self, tx: TransactionRequest) -> Result<B256> {
        let pending = match self {
            EvmRoleClient::ReadOnly(p) => p.send_transaction(tx).await,
            EvmRoleClient::WithSigner { provider, .. } => provider.send_transaction(tx).await,
        }
        .map_err(|e| eyre!("Failed to send transaction: {}", e))?;

        let tx_hash = *pending.tx_hash();
        info!(tx_hash = %tx_hash, "Transaction sent");
        Ok(tx_hash)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64> {
        let gas = match self {
            EvmRoleClient::ReadOnly(p) => p.estimate_gas(&tx).await,
            EvmRoleClient::WithSigner { provider, .. } => provider.estimate_gas(&tx).await,
        }
        .wrap_err("Failed to estimate gas")?;
        debug!(gas = gas, "Estimated gas");
        Ok(gas)
    }

    async fn get_gas_price(&self) -> Result<u128> {
        let price = match self {
            EvmRoleClient::ReadOnly(p) => p.get_gas_price().await,
            EvmRoleClient::WithSigner { provider, .. } => provider.get_gas_price().await,
        }
        .wrap_err("Failed to get gas price")?;
        Ok(price)
    }

    async fn get_pending_transaction_count(&self, address: Address) -> Result<u64> {
        let nonce = match self {
            EvmRoleClient::ReadOnly(p) => {
                p.get_transaction_count(address)
                    .block_id(BlockId::pending())
                    .await
            }
            EvmRoleClient::WithSigner { provider, .. } => {
                provider
                    .get_transaction_count(address)
                    .block_id(BlockId::pending())
                    .await
            }
        }
        .wrap_err("Failed to get transaction count")?;
        Ok(nonce)
    }

    async fn get_chain_id(&self) -> Result<u64> {
        let chain_id = match self {
            EvmRoleClient::ReadOnly(p) => p.get_chain_id().await,
            EvmRoleClient::WithSigner { provider, .. } => provider.get_chain_id().await,
        }
        .wrap_err("Failed to get chain id")?;
        Ok(chain_id)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<WriteReceipt>> {
        let receipt = match self {
            EvmRoleClient::ReadOnly(p) => p.get_transaction_receipt(hash).await,
            EvmRoleClient::WithSigner { provider, .. } => {
                provider.get_transaction_receipt(hash).await
            }
        }
        .wrap_err("Failed to get receipt")?;

        Ok(receipt.map(|r| WriteReceipt {
            transaction_hash: r.transaction_hash,
            block_number: r.block_number,
            status: r.status(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardhat/Anvil account #0
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_readonly_client_has_no_signer() {
        let client = EvmRoleClient::new_readonly("http://localhost:8545").unwrap();
        assert!(!client.has_signer());
        assert!(client.signer_address().is_none());
    }

    #[test]
    fn test_signer_client_address() {
        let client = EvmRoleClient::new_with_signer("http://localhost:8545", TEST_KEY).unwrap();
        assert!(client.has_signer());
        assert_eq!(
            client.signer_address().unwrap().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(EvmRoleClient::new_readonly("not a url").is_err());
        assert!(EvmRoleClient::new_with_signer("http://localhost:8545", "0x1234").is_err());
    }
}
