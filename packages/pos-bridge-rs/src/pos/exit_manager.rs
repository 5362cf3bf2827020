//! Exit proof construction seam
//!
//! Building an exit payload needs the burn receipt, its block, a checkpoint
//! containing that block and Merkle proofs against it. That work belongs to a
//! proof service; the bridge layer only threads the burn hash, the event
//! selector and the fast-path flag through this trait.

use alloy::primitives::{Bytes, B256};
use async_trait::async_trait;
use eyre::Result;

use crate::types::LogEventSignature;

/// Builder of exit payloads and exit hashes
#[async_trait]
pub trait ExitManager: Send + Sync {
    /// Build the payload for `RootChainManager.exit` from a child-chain burn.
    ///
    /// `is_fast` requests the accelerated path (proof served by a proof API
    /// instead of being assembled from raw chain data).
    async fn build_payload_for_exit(
        &self,
        burn_tx_hash: B256,
        event_signature: LogEventSignature,
        is_fast: bool,
    ) -> Result<Bytes>;

    /// Deterministic hash the root chain manager records once an exit settles
    async fn get_exit_hash(
        &self,
        burn_tx_hash: B256,
        event_signature: LogEventSignature,
    ) -> Result<B256>;
}
