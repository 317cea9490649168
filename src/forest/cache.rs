//! Memoized forest digests
//!
//! [`MemoizedForest`] owns a call forest and caches, for every node, its
//! update digest, the digest of its children and the resulting node digest.
//! Every top-level node gets an id when it enters the forest. An entry is
//! keyed by the id of its top-level ancestor plus the child indices below it,
//! so keys survive insertions at either end of the top level. Entries live in
//! a sharded concurrent cache (quick-cache, S3-FIFO eviction). An evicted
//! entry is simply recomputed, so the capacity only affects speed.
//!
//! Edits go through the wrapper, which invalidates exactly the entries whose
//! digests can change:
//!
//! - replacing an update invalidates the node and its ancestors
//! - replacing children additionally invalidates every descendant
//! - appending or prepending a top-level node invalidates nothing

use quick_cache::sync::Cache;
use tracing::debug;

use super::config::{ForestConfig, ForestV0Config, DEFAULT_CONFIG};
use super::hasher::Domains;
use super::{CallForest, CallForestNode};
use crate::errors::{Error, ForestError};
use crate::update::AccountUpdate;
use crate::zkp::{Digest, Native};
use crate::Result;

/// Path of a node: child indices from the top level of the forest
pub type NodePath = Vec<u32>;

/// Id of the top-level ancestor, then child indices below it
type EntryKey = (u64, NodePath);

/// Cached digests of a single node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeDigests {
    /// Digest of the node's account update
    pub update_digest: Digest,
    /// Forest digest of the node's children
    pub children_digest: Digest,
    /// Digest of the node itself
    pub node_digest: Digest,
}

/// A call forest with memoized node digests
pub struct MemoizedForest<F = ForestV0Config> {
    forest: CallForest,
    config: F,
    domains: Domains,
    top_ids: Vec<u64>,
    next_id: u64,
    cache: Cache<EntryKey, NodeDigests>,
}

impl MemoizedForest {
    /// Wraps a forest using the default configuration
    ///
    /// The cache is sized to hold every node the configuration admits.
    pub fn new(forest: CallForest) -> Self {
        Self::with_capacity(forest, DEFAULT_CONFIG, DEFAULT_CONFIG.max_nodes())
    }
}

impl<F: ForestConfig> MemoizedForest<F> {
    /// Wraps a forest with custom config and cache capacity
    ///
    /// # Arguments
    /// * `forest` - The forest to wrap
    /// * `config` - The forest configuration
    /// * `capacity` - Maximum number of cached nodes (approximately)
    pub fn with_capacity(forest: CallForest, config: F, capacity: usize) -> Self {
        let domains = Domains::new(&config);
        let next_id = forest.len() as u64;
        let top_ids = (0..next_id).collect();
        Self { forest, config, domains, top_ids, next_id, cache: Cache::new(capacity.max(1)) }
    }

    /// The wrapped forest
    pub fn forest(&self) -> &CallForest { &self.forest }

    /// The configuration digests are computed with
    pub fn config(&self) -> &F { &self.config }

    /// Unwraps the forest, discarding the cache
    pub fn into_forest(self) -> CallForest { self.forest }

    /// Number of nodes with cached digests
    pub fn cached_len(&self) -> usize { self.cache.len() }

    /// Cached digests of the node at `path`, if present
    pub fn cached(&self, path: &[u32]) -> Option<NodeDigests> {
        self.cache.get(&self.entry_key(path)?)
    }

    /// Computes the forest digest, reusing cached node digests
    ///
    /// Equals [`forest_digest_with`](super::forest_digest_with) on the
    /// reference path for the wrapped forest.
    ///
    /// # Errors
    /// * `ForestError::ForestTooLarge` - If the forest is deeper than `max_depth`
    pub fn digest(&self) -> Result<Digest> {
        let nodes = self.forest.nodes();
        let mut digest = Digest::ZERO;
        if nodes.is_empty() {
            return Ok(digest);
        }
        self.domains.check_level(0)?;
        for (node, id) in nodes.iter().zip(&self.top_ids).rev() {
            let node_digests = self.node_digests_at(node, &mut (*id, NodePath::new()))?;
            digest = self.domains.hash_cons(&mut Native, &node_digests.node_digest, &digest);
        }
        Ok(digest)
    }

    /// Computes (or fetches) the digests of the node at `path`
    ///
    /// # Errors
    /// * `ForestError::InvalidPath` - If no node exists at `path`
    /// * `ForestError::ForestTooLarge` - If the subtree is deeper than `max_depth`
    pub fn node_digests(&self, path: &[u32]) -> Result<NodeDigests> {
        let node = self.node_at(path)?;
        let mut key = self.entry_key(path).ok_or_else(|| invalid_path(path))?;
        self.check_path_level(path)?;
        self.node_digests_at(node, &mut key)
    }

    /// Replaces the update at `path`, keeping its children
    ///
    /// Invalidates the node and all of its ancestors.
    ///
    /// # Errors
    /// * `ForestError::InvalidPath` - If no node exists at `path`
    pub fn replace_update(&mut self, path: &[u32], update: AccountUpdate) -> Result<()> {
        let node = self.node_at_mut(path)?;
        node.update = update;
        let (id, below) = self.entry_key(path).ok_or_else(|| invalid_path(path))?;
        let before = self.cache.len();
        self.cache.retain(|(key_id, key), _| !(*key_id == id && below.starts_with(key)));
        debug!(?path, invalidated = before.saturating_sub(self.cache.len()), "replaced update");
        Ok(())
    }

    /// Replaces the children of the node at `path`
    ///
    /// Invalidates the node, its ancestors and all of its former descendants.
    ///
    /// # Errors
    /// * `ForestError::InvalidPath` - If no node exists at `path`
    pub fn replace_children(&mut self, path: &[u32], children: CallForest) -> Result<()> {
        let node = self.node_at_mut(path)?;
        node.children = children;
        let (id, below) = self.entry_key(path).ok_or_else(|| invalid_path(path))?;
        let before = self.cache.len();
        self.cache.retain(|(key_id, key), _| {
            !(*key_id == id && (below.starts_with(key) || key.starts_with(&below)))
        });
        debug!(?path, invalidated = before.saturating_sub(self.cache.len()), "replaced children");
        Ok(())
    }

    /// Appends a top-level node
    ///
    /// No cached entry is invalidated.
    pub fn push(&mut self, node: CallForestNode) {
        self.forest.push(node);
        let id = self.fresh_id();
        self.top_ids.push(id);
    }

    /// Inserts a top-level node before all others
    ///
    /// Existing nodes keep their ids, so no cached entry is invalidated; the
    /// next [`digest`](Self::digest) hashes the new subtree and redoes the
    /// top-level fold.
    pub fn prepend(&mut self, node: CallForestNode) {
        self.forest.prepend(node);
        let id = self.fresh_id();
        self.top_ids.insert(0, id);
        debug!(id, top_level = self.top_ids.len(), "prepended node");
    }

    /// Clears the cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        debug!("cleared forest digest cache");
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Cache key of the node at `path`, if its top-level index exists
    fn entry_key(&self, path: &[u32]) -> Option<EntryKey> {
        let (top, below) = path.split_first()?;
        let id = self.top_ids.get(*top as usize)?;
        Some((*id, below.to_vec()))
    }

    fn node_at(&self, path: &[u32]) -> Result<&CallForestNode> {
        self.forest.get(path).ok_or_else(|| invalid_path(path))
    }

    fn node_at_mut(&mut self, path: &[u32]) -> Result<&mut CallForestNode> {
        self.forest.get_mut(path).ok_or_else(|| invalid_path(path))
    }

    /// Rejects a node whose level is beyond the depth bound
    fn check_path_level(&self, path: &[u32]) -> Result<()> {
        self.domains.check_level(path.len().saturating_sub(1))
    }

    /// Digest of the children of the node keyed by `parent`
    fn children_digest_at(
        &self,
        nodes: &[CallForestNode],
        parent: &mut EntryKey,
    ) -> Result<Digest> {
        let mut digest = Digest::ZERO;
        if nodes.is_empty() {
            return Ok(digest);
        }
        self.domains.check_level(parent.1.len() + 1)?;
        for (index, node) in nodes.iter().enumerate().rev() {
            parent.1.push(index as u32);
            let node_digests = self.node_digests_at(node, parent);
            parent.1.pop();
            digest = self.domains.hash_cons(&mut Native, &node_digests?.node_digest, &digest);
        }
        Ok(digest)
    }

    fn node_digests_at(&self, node: &CallForestNode, key: &mut EntryKey) -> Result<NodeDigests> {
        if let Some(cached) = self.cache.get(&*key) {
            return Ok(cached);
        }

        let update_digest = self.domains.hash_update(&mut Native, &node.update);
        let children_digest = self.children_digest_at(node.children.nodes(), key)?;
        let node_digest = self.domains.hash_node(&mut Native, &update_digest, &children_digest);
        let digests = NodeDigests { update_digest, children_digest, node_digest };

        self.cache.insert(key.clone(), digests);
        Ok(digests)
    }
}

fn invalid_path(path: &[u32]) -> Error { ForestError::InvalidPath { path: path.to_vec() }.into() }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::hasher::{forest_digest, node_digest, update_digest};
    use crate::forest::test_utils::{leaf, node, sample_forest, update};

    fn assert_matches_plain(memo: &MemoizedForest) {
        let plain = forest_digest(memo.forest()).expect("forest hashes");
        assert_eq!(memo.digest().expect("forest hashes"), plain);
    }

    #[test]
    fn test_new() {
        let memo = MemoizedForest::new(sample_forest());

        assert_eq!(memo.cached_len(), 0);
        assert_eq!(memo.forest(), &sample_forest());
    }

    #[test]
    fn test_digest_fills_cache() {
        let memo = MemoizedForest::new(sample_forest());

        assert_matches_plain(&memo);

        assert_eq!(memo.cached_len(), 6);
        let cached = memo.cached(&[1, 1]).expect("node was hashed");
        assert_eq!(cached.update_digest, update_digest(&update(4)));
        assert_eq!(cached.node_digest, node_digest(&node(4, vec![leaf(5)])).expect("hashes"));
    }

    #[test]
    fn test_digest_empty() {
        let memo = MemoizedForest::new(CallForest::empty());

        assert_eq!(memo.digest().expect("empty forest hashes"), Digest::ZERO);
        assert_eq!(memo.cached_len(), 0);
    }

    #[test]
    fn test_replace_update_invalidates_ancestors() {
        let mut memo = MemoizedForest::new(sample_forest());
        memo.digest().expect("forest hashes");

        memo.replace_update(&[1, 1, 0], update(9)).expect("path exists");

        assert!(memo.cached(&[1, 1, 0]).is_none());
        assert!(memo.cached(&[1, 1]).is_none());
        assert!(memo.cached(&[1]).is_none());
        assert!(memo.cached(&[1, 0]).is_some());
        assert!(memo.cached(&[0]).is_some());
        assert!(memo.cached(&[2]).is_some());
        assert_matches_plain(&memo);
    }

    #[test]
    fn test_replace_children_invalidates_descendants() {
        let mut memo = MemoizedForest::new(sample_forest());
        memo.digest().expect("forest hashes");

        memo.replace_children(&[1], CallForest::new(vec![leaf(7)])).expect("path exists");

        assert!(memo.cached(&[1]).is_none());
        assert!(memo.cached(&[1, 0]).is_none());
        assert!(memo.cached(&[1, 1, 0]).is_none());
        assert!(memo.cached(&[0]).is_some());
        assert_matches_plain(&memo);
    }

    #[test]
    fn test_push_keeps_cache() {
        let mut memo = MemoizedForest::new(sample_forest());
        memo.digest().expect("forest hashes");

        memo.push(node(7, vec![leaf(8)]));

        assert_eq!(memo.cached_len(), 6);
        assert_matches_plain(&memo);
    }

    #[test]
    fn test_prepend_keeps_cached_subtrees() {
        let mut memo = MemoizedForest::new(sample_forest());
        memo.digest().expect("forest hashes");
        let inner = memo.cached(&[1, 1]).expect("node was hashed");

        memo.prepend(leaf(7));

        assert_eq!(memo.cached_len(), 6);
        assert_eq!(memo.cached(&[2, 1]), Some(inner));
        assert!(memo.cached(&[0]).is_none());
        assert_matches_plain(&memo);
        assert_eq!(memo.cached_len(), 7);
    }

    #[test]
    fn test_edits_after_prepend_use_shifted_paths() {
        let mut memo = MemoizedForest::new(sample_forest());
        memo.digest().expect("forest hashes");
        memo.prepend(node(7, vec![leaf(8)]));
        memo.digest().expect("forest hashes");

        memo.replace_update(&[2, 1, 0], update(9)).expect("path exists");

        assert!(memo.cached(&[2, 1]).is_none());
        assert!(memo.cached(&[2]).is_none());
        assert!(memo.cached(&[2, 0]).is_some());
        assert!(memo.cached(&[0, 0]).is_some());
        assert!(memo.cached(&[1]).is_some());
        assert_matches_plain(&memo);
    }

    #[test]
    fn test_invalid_path() {
        let mut memo = MemoizedForest::new(sample_forest());

        let result = memo.replace_update(&[5], update(1));
        let missing = memo.node_digests(&[0, 0]);

        assert_eq!(result, Err(Error::Forest(ForestError::InvalidPath { path: vec![5] })));
        assert_eq!(missing, Err(Error::Forest(ForestError::InvalidPath { path: vec![0, 0] })));
    }

    #[test]
    fn test_node_digests() {
        let memo = MemoizedForest::new(sample_forest());

        let digests = memo.node_digests(&[1]).expect("path exists");

        assert_eq!(
            digests.node_digest,
            node_digest(&node(2, vec![leaf(3), node(4, vec![leaf(5)])])).expect("hashes")
        );
        assert_eq!(memo.cached_len(), 4);
    }

    #[test]
    fn test_small_capacity_is_still_correct() {
        let mut memo = MemoizedForest::with_capacity(sample_forest(), DEFAULT_CONFIG, 1);

        assert_matches_plain(&memo);
        memo.replace_update(&[2], update(8)).expect("path exists");
        assert_matches_plain(&memo);
    }
}
