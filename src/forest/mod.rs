//! Call forests
//!
//! A call forest is an ordered sequence of trees whose nodes are account
//! updates; the children of a node are the updates it calls. This module
//! provides the tree type itself together with:
//!
//! - [`builder`]: conversion between forests and depth-annotated flat sequences
//! - [`hasher`]: the forest commitment, generic over a [`Compiler`](crate::zkp::Compiler)
//! - [`cache`]: a wrapper that memoizes node digests across edits
//! - [`iterator`]: pre-order revelation of a committed forest

pub mod builder;
pub mod cache;
pub mod config;
pub mod hasher;
pub mod iterator;

pub use builder::{build_forest, build_forest_from_updates, build_forest_with, flatten};
pub use cache::{MemoizedForest, NodeDigests, NodePath};
pub use config::{ForestConfig, ForestV0Config, DEFAULT_CONFIG};
pub use hasher::{
    cons, cons_with, empty_forest_digest, empty_forest_digest_with, forest_digest,
    forest_digest_with, hash_node, hash_node_with, node_digest, node_digest_with,
    par_forest_digest, par_forest_digest_with, update_digest, update_digest_with,
};
pub use iterator::ForestIterator;

use crate::update::AccountUpdate;

/// A node of a call forest: an account update and the updates it calls
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallForestNode {
    /// The account update at this node
    pub update: AccountUpdate,
    /// The updates called by this one, in call order
    pub children: CallForest,
}

impl CallForestNode {
    /// Creates a node with the given children
    pub fn new(update: AccountUpdate, children: CallForest) -> Self { Self { update, children } }

    /// Creates a node without children
    pub fn leaf(update: AccountUpdate) -> Self { Self::new(update, CallForest::empty()) }
}

/// An ordered sequence of call trees
///
/// Order is significant: it is the execution order of the transaction and
/// is committed to by the forest digest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallForest {
    nodes: Vec<CallForestNode>,
}

impl CallForest {
    /// Creates a forest from its top-level nodes
    pub fn new(nodes: Vec<CallForestNode>) -> Self { Self { nodes } }

    /// Creates the empty forest
    pub fn empty() -> Self { Self::default() }

    /// Top-level nodes in order
    pub fn nodes(&self) -> &[CallForestNode] { &self.nodes }

    /// Number of top-level nodes
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Whether the forest has no nodes
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Iterates over the top-level nodes
    pub fn iter(&self) -> core::slice::Iter<'_, CallForestNode> { self.nodes.iter() }

    /// Appends a top-level node
    pub fn push(&mut self, node: CallForestNode) { self.nodes.push(node); }

    /// Inserts a top-level node before all others
    pub fn prepend(&mut self, node: CallForestNode) { self.nodes.insert(0, node); }

    /// Total number of nodes at every level
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&CallForest> = vec![self];
        while let Some(forest) = pending.pop() {
            count += forest.len();
            pending.extend(forest.iter().map(|node| &node.children));
        }
        count
    }

    /// Number of levels (0 for the empty forest, 1 when there are no calls)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&CallForest, usize)> = vec![(self, 1)];
        while let Some((forest, level)) = pending.pop() {
            if forest.is_empty() {
                continue;
            }
            deepest = deepest.max(level);
            pending.extend(forest.iter().map(|node| (&node.children, level + 1)));
        }
        deepest
    }

    /// Returns the node addressed by `path` (child indices from the top level)
    ///
    /// # Returns
    /// `None` if the path is empty or does not resolve
    pub fn get(&self, path: &[u32]) -> Option<&CallForestNode> {
        let (last, parents) = path.split_last()?;
        let mut forest = self;
        for index in parents {
            forest = &forest.nodes.get(*index as usize)?.children;
        }
        forest.nodes.get(*last as usize)
    }

    pub(crate) fn get_mut(&mut self, path: &[u32]) -> Option<&mut CallForestNode> {
        let (last, parents) = path.split_last()?;
        let mut forest = self;
        for index in parents {
            forest = &mut forest.nodes.get_mut(*index as usize)?.children;
        }
        forest.nodes.get_mut(*last as usize)
    }

    /// Consumes the forest, returning its top-level nodes
    pub fn into_nodes(self) -> Vec<CallForestNode> { self.nodes }
}

impl From<Vec<CallForestNode>> for CallForest {
    fn from(nodes: Vec<CallForestNode>) -> Self { Self::new(nodes) }
}

impl IntoIterator for CallForest {
    type Item = CallForestNode;
    type IntoIter = std::vec::IntoIter<CallForestNode>;

    fn into_iter(self) -> Self::IntoIter { self.nodes.into_iter() }
}

impl<'a> IntoIterator for &'a CallForest {
    type Item = &'a CallForestNode;
    type IntoIter = core::slice::Iter<'a, CallForestNode>;

    fn into_iter(self) -> Self::IntoIter { self.nodes.iter() }
}
