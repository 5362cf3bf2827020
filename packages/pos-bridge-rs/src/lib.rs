//! POS-Bridge-RS: Dual-Chain Bridge Client
//!
//! This crate moves tokens between a parent chain and a child chain linked by
//! a lock/mint POS bridge:
//!
//! - **Transaction Resolution** - Complete write configs (gas, price, nonce, chain id) from partial overrides
//! - **Side Chain Client** - One role client per chain, per-role defaults, ABI source
//! - **Contract Wrappers** - Lazily resolved contract handles with role-guarded read/write primitives
//! - **POS Module** - RootChainManager, ERC20 and ERC721 bridge flows (approve, deposit, withdraw, exit)
//! - **Testing Module** - Recording mocks and fixture ABIs for unit tests
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! pos-bridge-rs = { path = "../pos-bridge-rs" }
//! ```
//!
//! ```ignore
//! let config = BridgeClientConfig::load()?;
//! let pos = PosClient::connect(&config, exit_manager)?;
//!
//! let nft = pos.erc721(root_token, ChainRole::Parent);
//! nft.approve(token_id, &TransactionOption::default()).await?;
//! nft.deposit(token_id, user, &TransactionOption::default()).await?;
//! ```
//!
//! ## Feature Flags
//!
//! - `testing` - Enable the mock role client, exit manager and ABI fixtures

// Core modules
pub mod abi;
pub mod base_token;
pub mod config;
pub mod error;
pub mod hash;
pub mod redact;
pub mod side_chain;
pub mod tx_config;
pub mod types;
pub mod write_result;

// Chain access and bridge wrappers
pub mod evm;
pub mod pos;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used items at the crate root
pub use abi::{AbiSource, HttpAbiSource, StaticAbiRegistry};
pub use base_token::ContractToken;
pub use config::{BridgeClientConfig, RoleEndpointConfig};
pub use error::{BridgeError, ErrorLogger, ErrorReport, Result};
pub use evm::{ChainRoleClient, ContractHandle, ContractMethod, EvmRoleClient, WriteReceipt};
pub use pos::{Erc20, Erc721, ExitManager, PosClient, RootChainManager};
pub use side_chain::{SideChainClient, SideChainConfig};
pub use tx_config::TransactionConfigResolver;
pub use types::{
    BridgeType, ChainRole, ContractParam, LogEventSignature, ResolvedTransactionConfig,
    TransactionOption, EXTRA_GAS_FOR_PROXY_CALL, MAX_BATCH_SIZE,
};
pub use write_result::{ContractWriteResult, WriteOutcome};
