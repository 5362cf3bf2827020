//! Testing utilities
//!
//! Recording mocks for every external collaborator plus a [`TestBridge`]
//! fixture wiring them into a [`SideChainClient`].
//!
//! ## Submodules
//!
//! - `abis` - Fixture ABIs for the POS contracts
//! - `mock_client` - Role client, ABI source and exit manager mocks

pub mod abis;
pub mod mock_client;

pub use mock_client::{input_of, CountingAbiSource, MockExitManager, MockRoleClient, RecordedCall};

use alloy::primitives::{address, Address, B256};
use alloy::sol_types::SolValue;
use std::sync::Arc;
use std::time::Duration;

use crate::pos::erc20::Erc20;
use crate::pos::erc721::Erc721;
use crate::pos::root_chain_manager::RootChainManager;
use crate::pos::PosClient;
use crate::side_chain::{SideChainClient, SideChainConfig};
use crate::types::{ChainRole, TransactionOption};

pub const PARENT_CHAIN_ID: u64 = 11155111;
pub const CHILD_CHAIN_ID: u64 = 80002;

pub const USER: Address = address!("00000000000000000000000000000000000000a1");
pub const TOKEN: Address = address!("00000000000000000000000000000000000000b2");
pub const ROOT_CHAIN_MANAGER: Address = address!("00000000000000000000000000000000000000c3");
pub const PREDICATE: Address = address!("00000000000000000000000000000000000000d4");

/// RootChainManager type id mapped to [`PREDICATE`]
pub const TOKEN_TYPE: B256 = B256::repeat_byte(0x72);

/// Mock-backed two-chain client with [`USER`] as default sender on both roles
pub struct TestBridge {
    pub parent: Arc<MockRoleClient>,
    pub child: Arc<MockRoleClient>,
    pub abis: Arc<CountingAbiSource>,
    pub exit_manager: Arc<MockExitManager>,
    pub client: Arc<SideChainClient>,
}

impl TestBridge {
    pub fn new() -> Self {
        let parent = Arc::new(MockRoleClient::new(PARENT_CHAIN_ID));
        let child = Arc::new(MockRoleClient::new(CHILD_CHAIN_ID));
        let abis = Arc::new(CountingAbiSource::new(
            abis::pos_abi_registry(),
            Duration::from_millis(10),
        ));

        let client = SideChainClient::new(parent.clone(), child.clone(), abis.clone()).with_config(
            SideChainConfig {
                parent_default: TransactionOption::from_address(USER),
                child_default: TransactionOption::from_address(USER),
                receipt_poll_interval: Duration::from_millis(1),
            },
        );

        Self {
            parent,
            child,
            abis,
            exit_manager: Arc::new(MockExitManager::new()),
            client: Arc::new(client),
        }
    }

    /// Answer the RootChainManager predicate lookup with [`PREDICATE`]
    pub fn with_predicate(self) -> Self {
        self.set_predicate();
        self
    }

    pub fn set_predicate(&self) {
        self.parent
            .set_read_response("tokenToType(address)", TOKEN_TYPE.abi_encode());
        self.parent
            .set_read_response("typeToPredicate(bytes32)", PREDICATE.abi_encode());
    }

    pub fn root_chain_manager(&self) -> RootChainManager {
        RootChainManager::new(self.client.clone(), ROOT_CHAIN_MANAGER)
    }

    pub fn pos_client(&self) -> PosClient {
        PosClient::new(
            self.client.clone(),
            ROOT_CHAIN_MANAGER,
            self.exit_manager.clone(),
        )
    }

    /// [`TOKEN`] as a non-fungible wrapper on `role`
    pub fn erc721(&self, role: ChainRole) -> Erc721 {
        self.pos_client().erc721(TOKEN, role)
    }

    /// [`TOKEN`] as a fungible wrapper on `role`
    pub fn erc20(&self, role: ChainRole) -> Erc20 {
        self.pos_client().erc20(TOKEN, role)
    }
}

impl Default for TestBridge {
    fn default() -> Self {
        Self::new()
    }
}
