//! Merkle tree data source effects

use async_trait::async_trait;

use crate::errors::QueryError;
use crate::types::{TreeId, TreeSnapshot};

/// Read access to the ledger that hosts the Merkle trees
#[async_trait]
pub trait TreeSourceEffects: Send + Sync {
    /// List every known tree identifier, in the source's own order
    async fn list_tree_ids(&self) -> Result<Vec<TreeId>, QueryError>;

    /// Fetch the current root and leaves of one tree
    ///
    /// An unknown identifier is reported as a [`QueryError`], not as a
    /// separate "not found" outcome.
    async fn get_tree(&self, tree_id: &TreeId) -> Result<TreeSnapshot, QueryError>;
}
