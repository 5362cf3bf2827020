//! Transaction configuration resolution
//!
//! Reads only need the role defaults overlaid by the caller's options. Writes
//! additionally need gas limit, gas price, nonce and chain id; whichever of
//! those the caller did not supply is fetched from the role client, all four
//! lookups concurrently.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    rpc::types::TransactionRequest,
};
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::evm::client::ChainRoleClient;
use crate::evm::contract::ContractMethod;
use crate::types::{
    ChainRole, ResolvedTransactionConfig, TransactionOption, EXTRA_GAS_FOR_PROXY_CALL,
};

/// Resolves transaction options for one role
pub struct TransactionConfigResolver<'a> {
    client: &'a dyn ChainRoleClient,
    defaults: &'a TransactionOption,
    role: ChainRole,
}

impl<'a> TransactionConfigResolver<'a> {
    pub fn new(
        client: &'a dyn ChainRoleClient,
        defaults: &'a TransactionOption,
        role: ChainRole,
    ) -> Self {
        Self {
            client,
            defaults,
            role,
        }
    }

    /// Read configuration: defaults overlaid by `option`, nothing fetched
    pub fn resolve_read(&self, option: &TransactionOption) -> TransactionOption {
        option.merged_over(self.defaults)
    }

    /// Write configuration with every required field populated.
    ///
    /// With a `method`, gas is estimated for that call; without one, for the
    /// raw `to`/`data`/`value` in the merged options.
    pub async fn resolve_write(
        &self,
        option: &TransactionOption,
        method: Option<&ContractMethod>,
    ) -> Result<ResolvedTransactionConfig> {
        let merged = option.merged_over(self.defaults);

        let from = merged
            .from
            .ok_or(BridgeError::MissingSender { role: self.role })?;

        let (to, data) = match method {
            Some(m) => (Some(m.address()), Some(m.encode_abi())),
            None => (merged.to, merged.data.clone()),
        };

        let estimate_request = estimate_request(from, to, data.clone(), &merged);

        let (gas_limit, gas_price, nonce, chain_id) = tokio::try_join!(
            async {
                match merged.gas_limit {
                    Some(gas) => Ok::<u64, eyre::Report>(gas),
                    None => {
                        let estimated = self.client.estimate_gas(estimate_request).await?;
                        Ok(self.with_proxy_buffer(estimated))
                    }
                }
            },
            async {
                match merged.gas_price {
                    Some(price) => Ok(price),
                    None => self.client.get_gas_price().await,
                }
            },
            async {
                match merged.nonce {
                    Some(nonce) => Ok(nonce),
                    None => self.client.get_pending_transaction_count(from).await,
                }
            },
            async {
                match merged.chain_id {
                    Some(chain_id) => Ok(chain_id),
                    None => self.client.get_chain_id().await,
                }
            },
        )?;

        debug!(
            role = %self.role,
            from = %from,
            gas_limit = gas_limit,
            gas_price = gas_price,
            nonce = nonce,
            chain_id = chain_id,
            "Resolved write config"
        );

        Ok(ResolvedTransactionConfig {
            from,
            to,
            data,
            value: merged.value,
            gas_limit,
            gas_price,
            nonce,
            chain_id,
        })
    }

    fn with_proxy_buffer(&self, estimated: u64) -> u64 {
        match self.role {
            ChainRole::Parent => estimated.saturating_add(EXTRA_GAS_FOR_PROXY_CALL),
            ChainRole::Child => estimated,
        }
    }
}

fn estimate_request(
    from: Address,
    to: Option<Address>,
    data: Option<Bytes>,
    merged: &TransactionOption,
) -> TransactionRequest {
    let mut tx = TransactionRequest::default().with_from(from);
    if let Some(to) = to {
        tx = tx.with_to(to);
    }
    if let Some(data) = data {
        tx = tx.with_input(data);
    }
    if let Some(value) = merged.value {
        tx = tx.with_value(value);
    }
    tx
}
