//! Recording mocks for the external collaborators
//!
//! Every trait call is recorded so tests can assert both what was sent and
//! that nothing was sent at all.

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, Bytes, B256},
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::abi::{AbiSource, StaticAbiRegistry};
use crate::evm::client::{ChainRoleClient, WriteReceipt};
use crate::hash::{bytes4_to_hex, function_selector, keccak256};
use crate::pos::exit_manager::ExitManager;
use crate::types::{BridgeType, LogEventSignature};

// ============================================================================
// Role Client
// ============================================================================

/// One recorded role-client call
#[derive(Debug, Clone)]
pub enum RecordedCall {
    Read(TransactionRequest),
    Write(TransactionRequest),
    EstimateGas(TransactionRequest),
    GasPrice,
    TransactionCount(Address),
    ChainId,
    Receipt(B256),
}

/// Role client answering from canned values
pub struct MockRoleClient {
    pub gas_estimate: u64,
    pub gas_price: u128,
    pub nonce: u64,
    pub chain_id: u64,
    /// Every call fails with a connection error
    pub fail: bool,
    read_responses: Mutex<HashMap<[u8; 4], Bytes>>,
    pending_receipt_polls: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRoleClient {
    pub fn new(chain_id: u64) -> Self {
        Self {
            gas_estimate: 100_000,
            gas_price: 30_000_000_000,
            nonce: 7,
            chain_id,
            fail: false,
            read_responses: Mutex::new(HashMap::new()),
            pending_receipt_polls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Client whose every call fails
    pub fn failing(chain_id: u64) -> Self {
        Self {
            fail: true,
            ..Self::new(chain_id)
        }
    }

    /// Answer `eth_call`s of `signature` with `output`
    pub fn set_read_response(&self, signature: &str, output: Vec<u8>) {
        self.read_responses
            .lock()
            .unwrap()
            .insert(function_selector(signature), Bytes::from(output));
    }

    /// Return `None` for the next `polls` receipt lookups
    pub fn delay_receipts(&self, polls: usize) {
        self.pending_receipt_polls.store(polls, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn writes(&self) -> Vec<TransactionRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordedCall::Write(tx) => Some(tx),
                _ => None,
            })
            .collect()
    }

    pub fn reads(&self) -> Vec<TransactionRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordedCall::Read(tx) => Some(tx),
                _ => None,
            })
            .collect()
    }

    pub fn estimates(&self) -> Vec<TransactionRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordedCall::EstimateGas(tx) => Some(tx),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls matching `pred`
    pub fn count(&self, pred: impl Fn(&RecordedCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: RecordedCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(eyre!("connection refused"));
        }
        Ok(())
    }
}

/// Calldata of a recorded request
pub fn input_of(tx: &TransactionRequest) -> Bytes {
    tx.input.input().cloned().unwrap_or_default()
}

#[async_trait]
impl ChainRoleClient for MockRoleClient {
    async fn read(&self, tx: TransactionRequest) -> Result<Bytes> {
        let input = input_of(&tx);
        self.record(RecordedCall::Read(tx))?;
        if input.len() < 4 {
            return Err(eyre!("eth_call without selector"));
        }
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&input[..4]);
        self.read_responses
            .lock()
            .unwrap()
            .get(&selector)
            .cloned()
            .ok_or_else(|| eyre!("no mock response for selector {}", bytes4_to_hex(&selector)))
    }

    async fn write(&self, tx: TransactionRequest) -> Result<B256> {
        self.record(RecordedCall::Write(tx))?;
        let index = self.writes().len() as u8;
        Ok(B256::with_last_byte(index))
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64> {
        self.record(RecordedCall::EstimateGas(tx))?;
        Ok(self.gas_estimate)
    }

    async fn get_gas_price(&self) -> Result<u128> {
        self.record(RecordedCall::GasPrice)?;
        Ok(self.gas_price)
    }

    async fn get_pending_transaction_count(&self, address: Address) -> Result<u64> {
        self.record(RecordedCall::TransactionCount(address))?;
        Ok(self.nonce)
    }

    async fn get_chain_id(&self) -> Result<u64> {
        self.record(RecordedCall::ChainId)?;
        Ok(self.chain_id)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<WriteReceipt>> {
        self.record(RecordedCall::Receipt(hash))?;
        let pending = self.pending_receipt_polls.load(Ordering::SeqCst);
        if pending > 0 {
            self.pending_receipt_polls.store(pending - 1, Ordering::SeqCst);
            return Ok(None);
        }
        Ok(Some(WriteReceipt {
            transaction_hash: hash,
            block_number: Some(1),
            status: true,
        }))
    }
}

// ============================================================================
// ABI Source
// ============================================================================

/// Static registry that counts fetches and answers after a delay
pub struct CountingAbiSource {
    inner: StaticAbiRegistry,
    delay: Duration,
    fetches: AtomicUsize,
}

impl CountingAbiSource {
    pub fn new(inner: StaticAbiRegistry, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AbiSource for CountingAbiSource {
    async fn get_abi(&self, name: &str, bridge_type: BridgeType) -> crate::Result<Arc<JsonAbi>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.get_abi(name, bridge_type).await
    }
}

// ============================================================================
// Exit Manager
// ============================================================================

/// Exit manager deriving payloads and exit hashes deterministically
#[derive(Default)]
pub struct MockExitManager {
    payload_requests: Mutex<Vec<(B256, LogEventSignature, bool)>>,
    exit_hash_requests: Mutex<Vec<(B256, LogEventSignature)>>,
}

impl MockExitManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payload_requests(&self) -> Vec<(B256, LogEventSignature, bool)> {
        self.payload_requests.lock().unwrap().clone()
    }

    pub fn exit_hash_requests(&self) -> Vec<(B256, LogEventSignature)> {
        self.exit_hash_requests.lock().unwrap().clone()
    }

    /// Payload this mock builds for the given inputs
    pub fn expected_payload(
        burn_tx_hash: B256,
        event_signature: LogEventSignature,
        is_fast: bool,
    ) -> Bytes {
        let mut payload = b"exit".to_vec();
        payload.extend_from_slice(burn_tx_hash.as_slice());
        payload.extend_from_slice(event_signature.topic().as_slice());
        payload.push(is_fast as u8);
        Bytes::from(payload)
    }

    /// Exit hash this mock derives for the given inputs
    pub fn expected_exit_hash(burn_tx_hash: B256, event_signature: LogEventSignature) -> B256 {
        let mut data = burn_tx_hash.to_vec();
        data.extend_from_slice(event_signature.topic().as_slice());
        B256::from(keccak256(&data))
    }
}

#[async_trait]
impl ExitManager for MockExitManager {
    async fn build_payload_for_exit(
        &self,
        burn_tx_hash: B256,
        event_signature: LogEventSignature,
        is_fast: bool,
    ) -> Result<Bytes> {
        self.payload_requests
            .lock()
            .unwrap()
            .push((burn_tx_hash, event_signature, is_fast));
        Ok(Self::expected_payload(burn_tx_hash, event_signature, is_fast))
    }

    async fn get_exit_hash(
        &self,
        burn_tx_hash: B256,
        event_signature: LogEventSignature,
    ) -> Result<B256> {
        self.exit_hash_requests
            .lock()
            .unwrap()
            .push((burn_tx_hash, event_signature));
        Ok(Self::expected_exit_hash(burn_tx_hash, event_signature))
    }
}
