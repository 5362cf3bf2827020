//! Contract ABI lookup
//!
//! Bridge contracts are addressed by logical name and bridge type. ABIs come
//! either from a static in-memory registry or from the published artifact
//! tree:
//!
//! ```text
//! {base_url}/{network}/{version}/artifacts/{bridge_type}/{name}.json
//! ```
//!
//! where each artifact is a JSON object whose `abi` field holds the ABI.

use alloy::json_abi::JsonAbi;
use async_trait::async_trait;
use eyre::{eyre, WrapErr};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::types::BridgeType;

/// Default artifact host
pub const DEFAULT_ABI_BASE_URL: &str = "https://static.polygon.technology/network";

/// Source of contract ABIs keyed by logical name and bridge type
#[async_trait]
pub trait AbiSource: Send + Sync {
    /// Fails with [`BridgeError::AbiNotFound`] when nothing is registered
    async fn get_abi(&self, name: &str, bridge_type: BridgeType) -> Result<Arc<JsonAbi>>;
}

/// Extract the ABI from an artifact document (or accept a bare ABI array)
pub fn parse_artifact(artifact: &serde_json::Value) -> eyre::Result<JsonAbi> {
    let abi = artifact.get("abi").unwrap_or(artifact);
    serde_json::from_value(abi.clone()).wrap_err("Invalid ABI artifact")
}

// ============================================================================
// Static Registry
// ============================================================================

/// In-memory ABI registry
#[derive(Debug, Clone, Default)]
pub struct StaticAbiRegistry {
    entries: HashMap<(BridgeType, String), Arc<JsonAbi>>,
}

impl StaticAbiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an ABI
    pub fn register(&mut self, bridge_type: BridgeType, name: &str, abi: JsonAbi) {
        self.entries
            .insert((bridge_type, name.to_string()), Arc::new(abi));
    }

    /// Builder form of [`StaticAbiRegistry::register`]
    pub fn with_abi(mut self, bridge_type: BridgeType, name: &str, abi: JsonAbi) -> Self {
        self.register(bridge_type, name, abi);
        self
    }

    /// Register an ABI from artifact JSON text
    pub fn register_json(&mut self, bridge_type: BridgeType, name: &str, json: &str) -> Result<()> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| eyre!("Invalid ABI JSON for {}: {}", name, e))?;
        let abi = parse_artifact(&value)?;
        self.register(bridge_type, name, abi);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl AbiSource for StaticAbiRegistry {
    async fn get_abi(&self, name: &str, bridge_type: BridgeType) -> Result<Arc<JsonAbi>> {
        self.entries
            .get(&(bridge_type, name.to_string()))
            .cloned()
            .ok_or_else(|| BridgeError::AbiNotFound {
                name: name.to_string(),
                bridge_type,
            })
    }
}

// ============================================================================
// HTTP Artifact Source
// ============================================================================

/// Fetches ABIs from the published artifact tree and caches them
pub struct HttpAbiSource {
    http: reqwest::Client,
    base_url: String,
    network: String,
    version: String,
    cache: RwLock<HashMap<(BridgeType, String), Arc<JsonAbi>>>,
}

impl HttpAbiSource {
    pub fn new(base_url: &str, network: &str, version: &str) -> Self {
        info!(
            base_url = %base_url,
            network = %network,
            version = %version,
            "Created HTTP ABI source"
        );

        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            network: network.to_string(),
            version: version.to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Artifact URL for a contract
    pub fn artifact_url(&self, name: &str, bridge_type: BridgeType) -> String {
        format!(
            "{}/{}/{}/artifacts/{}/{}.json",
            self.base_url, self.network, self.version, bridge_type, name
        )
    }
}

#[async_trait]
impl AbiSource for HttpAbiSource {
    async fn get_abi(&self, name: &str, bridge_type: BridgeType) -> Result<Arc<JsonAbi>> {
        let key = (bridge_type, name.to_string());
        if let Some(abi) = self.cache.read().await.get(&key) {
            return Ok(abi.clone());
        }

        let url = self.artifact_url(name, bridge_type);
        debug!(url = %url, "Fetching ABI artifact");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to fetch ABI from {}", url))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BridgeError::AbiNotFound {
                name: name.to_string(),
                bridge_type,
            });
        }

        let artifact: serde_json::Value = response
            .error_for_status()
            .wrap_err_with(|| format!("ABI request to {} failed", url))?
            .json()
            .await
            .wrap_err("Failed to parse ABI response")?;

        let abi = Arc::new(parse_artifact(&artifact)?);
        self.cache.write().await.insert(key, abi.clone());
        Ok(abi)
    }
}
