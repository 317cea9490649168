//! Incremental revelation of a committed forest
//!
//! A [`ForestIterator`] walks a call forest in pre-order while checking it
//! against a commitment, one node per step. Each level of the walk holds the
//! digest it has to match. Revealing the head of a level witnesses the digest
//! of the head's children and the digest of its remaining siblings, then
//! asserts that
//!
//! ```text
//! H_cons(H_node(update_digest(head), children), tail) == commitment
//! ```
//!
//! The head's children become a new level committed to by `children`, and
//! the current level continues with `tail`. An exhausted level must be
//! committed to by `E`. Because each step is one preimage check in the
//! compiler, the same walk runs on literal values and inside a circuit.

use super::config::ForestConfig;
use super::hasher::{empty_forest_digest_with, Domains};
use super::{CallForest, CallForestNode};
use crate::types::CallDepth;
use crate::update::AccountUpdate;
use crate::zkp::{Compiler, Digest, Native};
use crate::Result;

/// Digests a single step needs as private inputs
#[derive(Clone, Copy, Debug)]
struct Hint {
    children_digest: Digest,
    tail_digest: Digest,
}

/// A partially revealed sibling sequence
struct Level<'f, E> {
    nodes: &'f [CallForestNode],
    commitment: Digest<E>,
}

/// Pre-order walk of a forest that checks every node against a commitment
pub struct ForestIterator<'f, E> {
    levels: Vec<Level<'f, E>>,
    hints: Vec<Hint>,
    position: usize,
    domains: Domains,
}

impl<'f, E: Clone> ForestIterator<'f, E> {
    /// Starts a walk of `forest` against `commitment`
    ///
    /// The digests revealed along the way are precomputed from the forest on
    /// the reference path.
    ///
    /// # Arguments
    /// * `forest` - The forest to reveal
    /// * `commitment` - The claimed forest digest, in the compiler's representation
    /// * `config` - The forest configuration
    ///
    /// # Errors
    /// * `ForestError::ForestTooLarge` - If the forest is deeper than `max_depth`
    pub fn new<F: ForestConfig>(
        forest: &'f CallForest,
        commitment: Digest<E>,
        config: &F,
    ) -> Result<Self> {
        let domains = Domains::new(config);
        let mut hints = Vec::with_capacity(forest.node_count());
        collect_hints(&domains, forest.nodes(), 0, &mut hints)?;
        Ok(Self {
            levels: vec![Level { nodes: forest.nodes(), commitment }],
            hints,
            position: 0,
            domains,
        })
    }

    /// Whether every node has been revealed and every level closed
    pub fn is_finished(&self) -> bool { self.levels.is_empty() }

    /// Reveals the next update in pre-order together with its call depth
    ///
    /// # Returns
    /// `None` once the forest is exhausted
    ///
    /// # Errors
    /// * `ZkpError::CommitmentMismatch` - If the revealed data does not hash to
    ///   the commitment of its level
    pub fn next<C: Compiler<Elem = E>>(
        &mut self,
        compiler: &mut C,
    ) -> Result<Option<(&'f AccountUpdate, CallDepth)>> {
        loop {
            let depth = self.levels.len().saturating_sub(1);
            let Some(level) = self.levels.last_mut() else {
                return Ok(None);
            };
            let nodes: &'f [CallForestNode] = level.nodes;

            let Some((head, rest)) = nodes.split_first() else {
                let empty = empty_forest_digest_with(compiler);
                compiler.assert_digest_eq(&level.commitment, &empty)?;
                self.levels.pop();
                continue;
            };

            let hint = self.hints[self.position];
            let update_digest = self.domains.hash_update(compiler, &head.update);
            let children = compiler.witness_digest(&hint.children_digest);
            let tail = compiler.witness_digest(&hint.tail_digest);
            let node_digest = self.domains.hash_node(compiler, &update_digest, &children);
            let recomputed = self.domains.hash_cons(compiler, &node_digest, &tail);
            compiler.assert_digest_eq(&level.commitment, &recomputed)?;

            level.nodes = rest;
            level.commitment = tail;
            self.levels.push(Level { nodes: head.children.nodes(), commitment: children });
            self.position += 1;
            return Ok(Some((&head.update, depth as CallDepth)));
        }
    }

    /// Reveals every remaining update
    ///
    /// # Errors
    /// * `ZkpError::CommitmentMismatch` - If any step fails its check
    pub fn reveal_all<C: Compiler<Elem = E>>(
        &mut self,
        compiler: &mut C,
    ) -> Result<Vec<(&'f AccountUpdate, CallDepth)>> {
        let mut revealed = Vec::with_capacity(self.hints.len() - self.position);
        while let Some(item) = self.next(compiler)? {
            revealed.push(item);
        }
        Ok(revealed)
    }
}

/// Records the hint of every node of `nodes` (and below) in pre-order
///
/// Returns the forest digest of `nodes`.
fn collect_hints(
    domains: &Domains,
    nodes: &[CallForestNode],
    level: usize,
    hints: &mut Vec<Hint>,
) -> Result<Digest> {
    if nodes.is_empty() {
        return Ok(Digest::ZERO);
    }
    domains.check_level(level)?;

    let mut slots = Vec::with_capacity(nodes.len());
    for node in nodes {
        let slot = hints.len();
        hints.push(Hint { children_digest: Digest::ZERO, tail_digest: Digest::ZERO });
        let children_digest = collect_hints(domains, node.children.nodes(), level + 1, hints)?;
        hints[slot].children_digest = children_digest;
        let update_digest = domains.hash_update(&mut Native, &node.update);
        slots.push((slot, domains.hash_node(&mut Native, &update_digest, &children_digest)));
    }

    let mut tail = Digest::ZERO;
    for (slot, node_digest) in slots.into_iter().rev() {
        hints[slot].tail_digest = tail;
        tail = domains.hash_cons(&mut Native, &node_digest, &tail);
    }
    Ok(tail)
}
