//! Merkle tree contract queries
//!
//! The tree registry is a CosmWasm contract. Smart queries go through the
//! Cosmos LCD REST gateway:
//!
//! ```text
//! GET {lcd}/cosmwasm/wasm/v1/contract/{address}/smart/{base64(query)}
//! -> {"data": <query result>}
//! ```

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use lightnode_core::effects::TreeSourceEffects;
use lightnode_core::{ChainConfig, QueryError, TreeId, TreeSnapshot};

use crate::http::{decode, execute, join_url, HttpFailure};

#[derive(Debug, Deserialize)]
struct SmartQueryResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MerkleTreeData {
    root: String,
    #[serde(default)]
    leaves: Vec<String>,
    #[serde(default)]
    metadata: Option<String>,
}

/// Data source backed by the Merkle tree contract
#[derive(Debug, Clone)]
pub struct CosmWasmTreeSource {
    client: reqwest::Client,
    lcd_url: String,
    contract_address: String,
}

impl CosmWasmTreeSource {
    /// Create a source for the contract named in `chain`
    pub fn new(client: reqwest::Client, chain: &ChainConfig) -> Self {
        Self {
            client,
            lcd_url: chain.lcd_url.clone(),
            contract_address: chain.contract_address.clone(),
        }
    }

    /// URL of the smart query `query`
    pub fn smart_query_url(&self, query: &Value) -> String {
        let encoded =
            base64::engine::general_purpose::URL_SAFE.encode(query.to_string().as_bytes());
        join_url(
            &self.lcd_url,
            &format!(
                "cosmwasm/wasm/v1/contract/{}/smart/{}",
                self.contract_address, encoded
            ),
        )
    }

    async fn smart_query(&self, query: Value) -> Result<String, HttpFailure> {
        let url = self.smart_query_url(&query);
        debug!(url = %url, "smart query");
        execute(self.client.get(&url)).await
    }
}

/// Query listing every tree identifier
pub fn list_query() -> Value {
    json!({ "list_merkle_tree_ids": {} })
}

/// Query fetching one tree
pub fn tree_query(tree_id: &TreeId) -> Value {
    json!({ "get_merkle_tree": { "id": tree_id.as_str() } })
}

/// Decode a listing response
pub fn parse_tree_ids(body: &str) -> Result<Vec<TreeId>, QueryError> {
    let response: SmartQueryResponse<Vec<String>> = decode(body)?;
    Ok(response.data.into_iter().map(TreeId::from).collect())
}

/// Decode a tree response; a `null` result means the tree does not exist
pub fn parse_tree(tree_id: &TreeId, body: &str) -> Result<TreeSnapshot, QueryError> {
    let response: SmartQueryResponse<Option<MerkleTreeData>> = decode(body)?;
    let tree = response.data.ok_or_else(|| QueryError::UnknownTree {
        tree_id: tree_id.to_string(),
    })?;
    Ok(TreeSnapshot {
        root: tree.root,
        leaves: tree.leaves,
        metadata: tree.metadata.filter(|m| !m.is_empty()),
    })
}

#[async_trait]
impl TreeSourceEffects for CosmWasmTreeSource {
    async fn list_tree_ids(&self) -> Result<Vec<TreeId>, QueryError> {
        let body = self.smart_query(list_query()).await?;
        parse_tree_ids(&body)
    }

    async fn get_tree(&self, tree_id: &TreeId) -> Result<TreeSnapshot, QueryError> {
        match self.smart_query(tree_query(tree_id)).await {
            Ok(body) => parse_tree(tree_id, &body),
            Err(HttpFailure::Status { status: 404, .. }) => Err(QueryError::UnknownTree {
                tree_id: tree_id.to_string(),
            }),
            Err(failure) => Err(failure.into()),
        }
    }
}
