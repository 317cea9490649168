//! Conversion between call forests and depth-annotated flat sequences
//!
//! Transactions carry their account updates as a flat list in which each
//! update declares its call depth. A flat sequence is valid when the first
//! depth is 0 and each depth is at most one more than the previous one;
//! depths may fall by any amount, closing every deeper open call.

use tracing::{debug, warn};

use super::config::{ForestConfig, DEFAULT_CONFIG};
use super::{CallForest, CallForestNode};
use crate::errors::ForestError;
use crate::types::CallDepth;
use crate::update::AccountUpdate;
use crate::Result;

/// An update whose children are still being collected
struct OpenNode {
    update: AccountUpdate,
    children: Vec<CallForestNode>,
}

impl OpenNode {
    fn close(self) -> CallForestNode {
        CallForestNode::new(self.update, CallForest::new(self.children))
    }
}

/// Attaches the deepest open node to its parent (or to the top level)
fn close_deepest(open: &mut Vec<OpenNode>, roots: &mut Vec<CallForestNode>) {
    if let Some(node) = open.pop() {
        let node = node.close();
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Builds a call forest from a flat sequence with custom config
///
/// Keeps one open node per open depth: an update at depth `d` first closes
/// every open node at depth `d` or deeper, then becomes the open node at `d`.
///
/// # Arguments
/// * `flat` - Account updates paired with their call depth, in call order
/// * `config` - The forest configuration supplying resource bounds
///
/// # Returns
/// The call forest described by the sequence
///
/// # Errors
/// * `ForestError::InvalidDepthJump` - If the first depth is not 0 or a depth
///   exceeds the previous depth by more than one
/// * `ForestError::ForestTooLarge` - If a depth reaches `max_depth` or the
///   sequence holds more than `max_nodes` updates
pub fn build_forest_with<I, F>(flat: I, config: &F) -> Result<CallForest>
where
    I: IntoIterator<Item = (AccountUpdate, CallDepth)>,
    F: ForestConfig,
{
    let max_depth = config.max_depth();
    let max_nodes = config.max_nodes();
    let mut open: Vec<OpenNode> = Vec::new();
    let mut roots: Vec<CallForestNode> = Vec::new();
    let mut previous: Option<CallDepth> = None;
    let mut count = 0usize;

    for (index, (update, depth)) in flat.into_iter().enumerate() {
        let level = depth as usize;
        if level > open.len() {
            warn!(index, ?previous, depth, "rejected depth jump");
            return Err(ForestError::InvalidDepthJump { index, previous, depth }.into());
        }
        if level >= max_depth {
            return Err(ForestError::depth_exceeded(level, max_depth.saturating_sub(1)).into());
        }
        count += 1;
        if count > max_nodes {
            return Err(ForestError::too_many_nodes(count, max_nodes).into());
        }

        while open.len() > level {
            close_deepest(&mut open, &mut roots);
        }
        open.push(OpenNode { update, children: Vec::new() });
        previous = Some(depth);
    }

    while !open.is_empty() {
        close_deepest(&mut open, &mut roots);
    }

    let forest = CallForest::new(roots);
    debug!(nodes = count, top_level = forest.len(), "built call forest");
    Ok(forest)
}

/// Builds a call forest from a flat sequence using the default configuration
///
/// See [`build_forest_with`].
pub fn build_forest<I>(flat: I) -> Result<CallForest>
where
    I: IntoIterator<Item = (AccountUpdate, CallDepth)>,
{
    build_forest_with(flat, &DEFAULT_CONFIG)
}

/// Builds a call forest from updates using each update's declared call depth
pub fn build_forest_from_updates<I>(updates: I) -> Result<CallForest>
where
    I: IntoIterator<Item = AccountUpdate>,
{
    build_forest(updates.into_iter().map(|update| {
        let depth = update.call_depth();
        (update, depth)
    }))
}

/// Flattens a call forest into pre-order with depth annotations
///
/// Inverse of [`build_forest`]: `build_forest(flatten(&f)) == Ok(f)`.
pub fn flatten(forest: &CallForest) -> Vec<(AccountUpdate, CallDepth)> {
    let mut flat = Vec::with_capacity(forest.node_count());
    let mut pending: Vec<(&CallForestNode, CallDepth)> =
        forest.iter().rev().map(|node| (node, 0)).collect();
    while let Some((node, depth)) = pending.pop() {
        flat.push((node.update.clone(), depth));
        pending.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    flat
}

impl CallForest {
    /// Flattens the forest, stamping each update with its actual call depth
    pub fn to_updates(&self) -> Vec<AccountUpdate> {
        flatten(self).into_iter().map(|(update, depth)| update.with_call_depth(depth)).collect()
    }
}
