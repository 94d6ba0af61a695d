//! Scripted tree data source

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use lightnode_core::effects::TreeSourceEffects;
use lightnode_core::{QueryError, TreeId, TreeSnapshot};

#[derive(Debug, Default)]
struct SourceState {
    order: Vec<TreeId>,
    trees: HashMap<TreeId, TreeSnapshot>,
    fetch_failures: HashMap<TreeId, QueryError>,
    listing_failure: Option<QueryError>,
    list_calls: usize,
    fetch_calls: Vec<TreeId>,
    fetch_delay: Option<Duration>,
}

/// In-memory data source listing trees in insertion order
#[derive(Debug, Default)]
pub struct MockTreeSource {
    state: Mutex<SourceState>,
}

impl MockTreeSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish or replace a tree; new trees are listed after existing ones
    pub fn insert(&self, tree_id: impl Into<TreeId>, snapshot: TreeSnapshot) {
        let tree_id = tree_id.into();
        let mut state = self.state.lock();
        if !state.trees.contains_key(&tree_id) && !state.order.contains(&tree_id) {
            state.order.push(tree_id.clone());
        }
        state.trees.insert(tree_id, snapshot);
    }

    /// List a tree without publishing its contents, so fetching it fails
    pub fn list_only(&self, tree_id: impl Into<TreeId>) {
        let tree_id = tree_id.into();
        let mut state = self.state.lock();
        if !state.order.contains(&tree_id) {
            state.order.push(tree_id);
        }
    }

    /// Change the root of a published tree, keeping its leaves
    pub fn set_root(&self, tree_id: impl Into<TreeId>, root: impl Into<String>) {
        let tree_id = tree_id.into();
        if let Some(snapshot) = self.state.lock().trees.get_mut(&tree_id) {
            snapshot.root = root.into();
        }
    }

    /// Make fetching `tree_id` fail with `error`
    pub fn fail_fetch(&self, tree_id: impl Into<TreeId>, error: QueryError) {
        self.state
            .lock()
            .fetch_failures
            .insert(tree_id.into(), error);
    }

    /// Make listing fail with `error`
    pub fn fail_listing(&self, error: QueryError) {
        self.state.lock().listing_failure = Some(error);
    }

    /// Delay every fetch by `delay` before it is answered
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state.lock().fetch_delay = Some(delay);
    }

    /// Drop every scripted failure
    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.fetch_failures.clear();
        state.listing_failure = None;
    }

    /// Number of listing calls received
    pub fn list_calls(&self) -> usize {
        self.state.lock().list_calls
    }

    /// Trees fetched so far, in call order
    pub fn fetch_calls(&self) -> Vec<TreeId> {
        self.state.lock().fetch_calls.clone()
    }
}

#[async_trait]
impl TreeSourceEffects for MockTreeSource {
    async fn list_tree_ids(&self) -> Result<Vec<TreeId>, QueryError> {
        let mut state = self.state.lock();
        state.list_calls += 1;
        match &state.listing_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.order.clone()),
        }
    }

    async fn get_tree(&self, tree_id: &TreeId) -> Result<TreeSnapshot, QueryError> {
        let delay = self.state.lock().fetch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        state.fetch_calls.push(tree_id.clone());
        if let Some(error) = state.fetch_failures.get(tree_id) {
            return Err(error.clone());
        }
        state
            .trees
            .get(tree_id)
            .cloned()
            .ok_or_else(|| QueryError::UnknownTree {
                tree_id: tree_id.to_string(),
            })
    }
}
