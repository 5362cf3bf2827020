//! Fixture ABIs for the POS bridge contracts
//!
//! Trimmed to the functions the wrappers call.

use alloy::json_abi::JsonAbi;

use crate::abi::StaticAbiRegistry;
use crate::types::BridgeType;

pub const CHILD_ERC721_ABI: &str = r#"[
  {"type":"function","name":"getApproved","stateMutability":"view",
   "inputs":[{"name":"tokenId","type":"uint256"}],
   "outputs":[{"name":"","type":"address"}]},
  {"type":"function","name":"isApprovedForAll","stateMutability":"view",
   "inputs":[{"name":"owner","type":"address"},{"name":"operator","type":"address"}],
   "outputs":[{"name":"","type":"bool"}]},
  {"type":"function","name":"approve","stateMutability":"nonpayable",
   "inputs":[{"name":"to","type":"address"},{"name":"tokenId","type":"uint256"}],
   "outputs":[]},
  {"type":"function","name":"setApprovalForAll","stateMutability":"nonpayable",
   "inputs":[{"name":"operator","type":"address"},{"name":"approved","type":"bool"}],
   "outputs":[]},
  {"type":"function","name":"withdraw","stateMutability":"nonpayable",
   "inputs":[{"name":"tokenId","type":"uint256"}],
   "outputs":[]},
  {"type":"function","name":"withdrawBatch","stateMutability":"nonpayable",
   "inputs":[{"name":"tokenIds","type":"uint256[]"}],
   "outputs":[]},
  {"type":"function","name":"balanceOf","stateMutability":"view",
   "inputs":[{"name":"owner","type":"address"}],
   "outputs":[{"name":"","type":"uint256"}]},
  {"type":"function","name":"tokenOfOwnerByIndex","stateMutability":"view",
   "inputs":[{"name":"owner","type":"address"},{"name":"index","type":"uint256"}],
   "outputs":[{"name":"","type":"uint256"}]},
  {"type":"function","name":"transferFrom","stateMutability":"nonpayable",
   "inputs":[{"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"tokenId","type":"uint256"}],
   "outputs":[]}
]"#;

pub const CHILD_ERC20_ABI: &str = r#"[
  {"type":"function","name":"balanceOf","stateMutability":"view",
   "inputs":[{"name":"account","type":"address"}],
   "outputs":[{"name":"","type":"uint256"}]},
  {"type":"function","name":"allowance","stateMutability":"view",
   "inputs":[{"name":"owner","type":"address"},{"name":"spender","type":"address"}],
   "outputs":[{"name":"","type":"uint256"}]},
  {"type":"function","name":"approve","stateMutability":"nonpayable",
   "inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],
   "outputs":[{"name":"","type":"bool"}]},
  {"type":"function","name":"withdraw","stateMutability":"nonpayable",
   "inputs":[{"name":"amount","type":"uint256"}],
   "outputs":[]}
]"#;

pub const ROOT_CHAIN_MANAGER_ABI: &str = r#"[
  {"type":"function","name":"depositFor","stateMutability":"nonpayable",
   "inputs":[{"name":"user","type":"address"},{"name":"rootToken","type":"address"},{"name":"depositData","type":"bytes"}],
   "outputs":[]},
  {"type":"function","name":"depositEtherFor","stateMutability":"payable",
   "inputs":[{"name":"user","type":"address"}],
   "outputs":[]},
  {"type":"function","name":"exit","stateMutability":"nonpayable",
   "inputs":[{"name":"inputData","type":"bytes"}],
   "outputs":[]},
  {"type":"function","name":"processedExits","stateMutability":"view",
   "inputs":[{"name":"","type":"bytes32"}],
   "outputs":[{"name":"","type":"bool"}]},
  {"type":"function","name":"tokenToType","stateMutability":"view",
   "inputs":[{"name":"","type":"address"}],
   "outputs":[{"name":"","type":"bytes32"}]},
  {"type":"function","name":"typeToPredicate","stateMutability":"view",
   "inputs":[{"name":"","type":"bytes32"}],
   "outputs":[{"name":"","type":"address"}]}
]"#;

fn parse(json: &str) -> JsonAbi {
    serde_json::from_str(json).expect("fixture ABI is valid")
}

pub fn child_erc721_abi() -> JsonAbi {
    parse(CHILD_ERC721_ABI)
}

pub fn child_erc20_abi() -> JsonAbi {
    parse(CHILD_ERC20_ABI)
}

pub fn root_chain_manager_abi() -> JsonAbi {
    parse(ROOT_CHAIN_MANAGER_ABI)
}

/// Registry with every POS fixture ABI
pub fn pos_abi_registry() -> StaticAbiRegistry {
    StaticAbiRegistry::new()
        .with_abi(BridgeType::Pos, "ChildERC721", child_erc721_abi())
        .with_abi(BridgeType::Pos, "ChildERC20", child_erc20_abi())
        .with_abi(BridgeType::Pos, "RootChainManager", root_chain_manager_abi())
}
