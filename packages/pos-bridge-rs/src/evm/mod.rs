//! EVM Chain Support Module
//!
//! ## Submodules
//!
//! - `client` - per-role RPC facade and its alloy implementation
//! - `contract` - runtime-ABI contract handles and call encoding

pub mod client;
pub mod contract;

// Re-export commonly used items
pub use client::{ChainRoleClient, EvmRoleClient, WriteReceipt};
pub use contract::{ContractHandle, ContractMethod, FromCallOutput};
