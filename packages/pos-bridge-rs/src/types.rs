//! Common types for dual-chain bridge operations
//!
//! Chain roles, contract parameters, transaction options and the event
//! selectors used to build exit payloads.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, B256, U256},
    rpc::types::TransactionRequest,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, Result};

/// Maximum number of token ids accepted by one batch call
pub const MAX_BATCH_SIZE: usize = 20;

/// Gas added to parent-chain estimates; calls there go through delegate proxies
/// and `eth_estimateGas` underestimates them.
pub const EXTRA_GAS_FOR_PROXY_CALL: u64 = 1_000_000;

// ============================================================================
// Chain Role
// ============================================================================

/// Which of the two bridged chains an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainRole {
    /// Origin chain, where deposits are escrowed and exits settle
    Parent,
    /// Linked chain, where the bridged representation lives
    Child,
}

impl ChainRole {
    pub fn is_parent(&self) -> bool {
        matches!(self, ChainRole::Parent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainRole::Parent => "parent",
            ChainRole::Child => "child",
        }
    }
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Bridge Type
// ============================================================================

/// Bridge family a contract ABI belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeType {
    Pos,
    Plasma,
}

impl BridgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeType::Pos => "pos",
            BridgeType::Plasma => "plasma",
        }
    }
}

impl fmt::Display for BridgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Contract Parameters
// ============================================================================

/// Identity of the contract a wrapper instance is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractParam {
    /// Deployed contract address on `role`'s chain
    pub address: Address,
    /// Logical ABI name (e.g. "ChildERC721")
    pub name: String,
    /// Chain every operation of the instance targets
    pub role: ChainRole,
    pub bridge_type: BridgeType,
}

impl ContractParam {
    pub fn new(address: Address, name: &str, role: ChainRole, bridge_type: BridgeType) -> Self {
        Self {
            address,
            name: name.to_string(),
            role,
            bridge_type,
        }
    }
}

// ============================================================================
// Transaction Options
// ============================================================================

/// Per-call transaction overrides.
///
/// Any field set here survives resolution unchanged. `to` and `data` are only
/// read by the raw role-level primitives; contract methods supply their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOption {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub nonce: Option<u64>,
    pub chain_id: Option<u64>,
    pub value: Option<U256>,
    pub data: Option<Bytes>,
    /// Return the unsubmitted transaction instead of sending it
    #[serde(default)]
    pub return_transaction: bool,
}

impl TransactionOption {
    /// Option with only a sender set
    pub fn from_address(from: Address) -> Self {
        Self {
            from: Some(from),
            ..Default::default()
        }
    }

    /// Overlay `self` on `defaults`, producing a fresh value.
    ///
    /// Fields present in `self` win; `defaults` is left untouched.
    /// `return_transaction` is per call and never taken from `defaults`.
    pub fn merged_over(&self, defaults: &TransactionOption) -> TransactionOption {
        TransactionOption {
            from: self.from.or(defaults.from),
            to: self.to.or(defaults.to),
            gas_limit: self.gas_limit.or(defaults.gas_limit),
            gas_price: self.gas_price.or(defaults.gas_price),
            nonce: self.nonce.or(defaults.nonce),
            chain_id: self.chain_id.or(defaults.chain_id),
            value: self.value.or(defaults.value),
            data: self.data.clone().or_else(|| defaults.data.clone()),
            return_transaction: self.return_transaction,
        }
    }

    /// Request shape for `eth_call`
    pub fn to_call_request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::default();
        if let Some(from) = self.from {
            tx = tx.with_from(from);
        }
        if let Some(to) = self.to {
            tx = tx.with_to(to);
        }
        if let Some(value) = self.value {
            tx = tx.with_value(value);
        }
        if let Some(data) = &self.data {
            tx = tx.with_input(data.clone());
        }
        if let Some(gas) = self.gas_limit {
            tx = tx.with_gas_limit(gas);
        }
        if let Some(gas_price) = self.gas_price {
            tx = tx.with_gas_price(gas_price);
        }
        tx
    }
}

/// Write configuration with every required field populated.
///
/// When a caller asks for `return_transaction`, this value (with `to` and
/// `data` filled in) is the unexecuted call descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTransactionConfig {
    pub from: Address,
    pub to: Option<Address>,
    pub data: Option<Bytes>,
    pub value: Option<U256>,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub nonce: u64,
    pub chain_id: u64,
}

impl ResolvedTransactionConfig {
    /// Build the alloy request submitted by the role client
    pub fn to_request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_from(self.from)
            .with_gas_limit(self.gas_limit)
            .with_gas_price(self.gas_price)
            .with_nonce(self.nonce)
            .with_chain_id(self.chain_id);
        if let Some(to) = self.to {
            tx = tx.with_to(to);
        }
        if let Some(data) = &self.data {
            tx = tx.with_input(data.clone());
        }
        if let Some(value) = self.value {
            tx = tx.with_value(value);
        }
        tx
    }
}

// ============================================================================
// Event Signatures
// ============================================================================

/// Event whose log proves a burn on the child chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogEventSignature {
    Erc20Transfer,
    Erc721Transfer,
    Erc721BatchTransfer,
    Erc721TransferWithMetadata,
    Erc1155Transfer,
    Erc1155BatchTransfer,
}

impl LogEventSignature {
    /// Canonical Solidity event signature
    pub fn signature(&self) -> &'static str {
        match self {
            LogEventSignature::Erc20Transfer | LogEventSignature::Erc721Transfer => {
                "Transfer(address,address,uint256)"
            }
            LogEventSignature::Erc721BatchTransfer => "WithdrawnBatch(address,uint256[])",
            LogEventSignature::Erc721TransferWithMetadata => {
                "TransferWithMetadata(address,address,uint256,bytes)"
            }
            LogEventSignature::Erc1155Transfer => {
                "TransferSingle(address,address,address,uint256,uint256)"
            }
            LogEventSignature::Erc1155BatchTransfer => {
                "TransferBatch(address,address,address,uint256[],uint256[])"
            }
        }
    }

    /// Log topic0 (keccak256 of the signature)
    pub fn topic(&self) -> B256 {
        B256::from(crate::hash::keccak256(self.signature().as_bytes()))
    }
}

impl fmt::Display for LogEventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::hash::bytes32_to_hex(&self.topic().0))
    }
}

/// Parse a burn transaction hash, rejecting empty input
pub fn parse_tx_hash(tx_hash: &str) -> Result<B256> {
    let trimmed = tx_hash.trim();
    if trimmed.is_empty() {
        return Err(BridgeError::MissingArgument("txHash"));
    }
    B256::from_str(trimmed)
        .map_err(|e| BridgeError::InvalidArgument(format!("txHash {}: {}", trimmed, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, TxKind};

    #[test]
    fn test_chain_role() {
        assert!(ChainRole::Parent.is_parent());
        assert!(!ChainRole::Child.is_parent());
        assert_eq!(format!("{}", ChainRole::Child), "child");
    }

    #[test]
    fn test_bridge_type_display() {
        assert_eq!(format!("{}", BridgeType::Pos), "pos");
        assert_eq!(format!("{}", BridgeType::Plasma), "plasma");
    }

    #[test]
    fn test_merge_user_fields_win() {
        let defaults = TransactionOption {
            from: Some(address!("1111111111111111111111111111111111111111")),
            gas_price: Some(5),
            nonce: Some(9),
            ..Default::default()
        };
        let user = TransactionOption {
            gas_price: Some(7),
            nonce: Some(0),
            ..Default::default()
        };

        let merged = user.merged_over(&defaults);
        assert_eq!(merged.from, defaults.from);
        assert_eq!(merged.gas_price, Some(7));
        assert_eq!(merged.nonce, Some(0));
        assert_eq!(merged.gas_limit, None);

        // defaults untouched
        assert_eq!(defaults.gas_price, Some(5));
        assert_eq!(defaults.nonce, Some(9));
    }

    #[test]
    fn test_merge_return_transaction_is_per_call() {
        let defaults = TransactionOption {
            return_transaction: true,
            ..Default::default()
        };
        assert!(!TransactionOption::default().merged_over(&defaults).return_transaction);

        let user = TransactionOption {
            return_transaction: true,
            ..Default::default()
        };
        assert!(user.merged_over(&TransactionOption::default()).return_transaction);
    }

    #[test]
    fn test_resolved_config_to_request() {
        let to = address!("2222222222222222222222222222222222222222");
        let config = ResolvedTransactionConfig {
            from: address!("1111111111111111111111111111111111111111"),
            to: Some(to),
            data: Some(Bytes::from_static(&[0xde, 0xad])),
            value: None,
            gas_limit: 21_000,
            gas_price: 30,
            nonce: 4,
            chain_id: 80002,
        };

        let tx = config.to_request();
        assert_eq!(tx.to, Some(TxKind::Call(to)));
        assert_eq!(tx.gas, Some(21_000));
        assert_eq!(tx.gas_price, Some(30));
        assert_eq!(tx.nonce, Some(4));
        assert_eq!(tx.chain_id, Some(80002));
        assert_eq!(tx.input.input(), Some(&Bytes::from_static(&[0xde, 0xad])));
    }

    #[test]
    fn test_transfer_topic() {
        assert_eq!(
            LogEventSignature::Erc721Transfer.to_string(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(
            LogEventSignature::Erc20Transfer.topic(),
            LogEventSignature::Erc721Transfer.topic()
        );
        assert_ne!(
            LogEventSignature::Erc721Transfer.topic(),
            LogEventSignature::Erc721BatchTransfer.topic()
        );
    }

    #[test]
    fn test_parse_tx_hash() {
        assert!(matches!(
            parse_tx_hash(""),
            Err(BridgeError::MissingArgument("txHash"))
        ));
        assert!(matches!(
            parse_tx_hash("0x1234"),
            Err(BridgeError::InvalidArgument(_))
        ));
        let hash = parse_tx_hash(&format!("0x{}", "ab".repeat(32))).unwrap();
        assert_eq!(hash, B256::repeat_byte(0xab));
    }

}
