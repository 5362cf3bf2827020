//! POS bridge wrappers
//!
//! - `root_chain_manager` - Parent-chain deposit/exit contract
//! - `pos_token` - Shared predicate lookup and exit plumbing
//! - `erc20` / `erc721` - Token wrappers
//! - `exit_manager` - Exit payload builder seam
//! - `client` - Entry point wiring the above

pub mod client;
pub mod erc20;
pub mod erc721;
pub mod exit_manager;
pub mod pos_token;
pub mod root_chain_manager;

pub use client::PosClient;
pub use erc20::Erc20;
pub use erc721::Erc721;
pub use exit_manager::ExitManager;
pub use pos_token::PosToken;
pub use root_chain_manager::RootChainManager;
