//! Forest commitment hashing
//!
//! The digest of a call forest commits to every account update, the nesting
//! structure and the order of siblings:
//!
//! ```text
//! update_digest(u)       = H_upd(fields(u))
//! node_digest(n)         = H_node(update_digest(n.update), forest_digest(n.children))
//! forest_digest([])      = E
//! forest_digest(n :: fs) = H_cons(node_digest(n), forest_digest(fs))
//! ```
//!
//! `E` is the all-zero digest. Every function is generic over a
//! [`Compiler`], so the same code computes literal digests ([`Native`]) and
//! records the constraints of the computation
//! ([`CircuitBuilder`](crate::zkp::CircuitBuilder)). The functions without a
//! `_with` suffix run the reference path with the default configuration.

use rayon::prelude::*;
use tracing::debug;

use super::config::{ForestConfig, DEFAULT_CONFIG};
use super::{CallForest, CallForestNode};
use crate::errors::ForestError;
use crate::update::AccountUpdate;
use crate::zkp::types::pack_bytes;
use crate::zkp::{Compiler, Digest, Native, Val};
use crate::Result;

/// Domain tags of a configuration, packed into field elements once
pub(crate) struct Domains {
    update: Vec<Val>,
    node: Vec<Val>,
    cons: Vec<Val>,
    max_depth: usize,
}

impl Domains {
    pub(crate) fn new<F: ForestConfig>(config: &F) -> Self {
        Self {
            update: pack_bytes(config.update_domain_tag()),
            node: pack_bytes(config.node_domain_tag()),
            cons: pack_bytes(config.cons_domain_tag()),
            max_depth: config.max_depth(),
        }
    }

    /// Rejects levels at or beyond the configured depth bound
    pub(crate) fn check_level(&self, level: usize) -> Result<()> {
        if level >= self.max_depth {
            return Err(ForestError::depth_exceeded(level, self.max_depth.saturating_sub(1)).into());
        }
        Ok(())
    }

    pub(crate) fn hash_update<C: Compiler>(
        &self,
        compiler: &mut C,
        update: &AccountUpdate,
    ) -> Digest<C::Elem> {
        let fields: Vec<C::Elem> =
            update.to_fields().into_iter().map(|field| compiler.witness(field)).collect();
        compiler.hash(&self.update, &fields)
    }

    pub(crate) fn hash_node<C: Compiler>(
        &self,
        compiler: &mut C,
        update_digest: &Digest<C::Elem>,
        children_digest: &Digest<C::Elem>,
    ) -> Digest<C::Elem> {
        let inputs: Vec<C::Elem> =
            update_digest.iter().chain(children_digest.iter()).cloned().collect();
        compiler.hash(&self.node, &inputs)
    }

    pub(crate) fn hash_cons<C: Compiler>(
        &self,
        compiler: &mut C,
        node_digest: &Digest<C::Elem>,
        tail_digest: &Digest<C::Elem>,
    ) -> Digest<C::Elem> {
        let inputs: Vec<C::Elem> = node_digest.iter().chain(tail_digest.iter()).cloned().collect();
        compiler.hash(&self.cons, &inputs)
    }

    /// Digest of `node` whose children sit at `level + 1`
    fn node_digest_at<C: Compiler>(
        &self,
        compiler: &mut C,
        node: &CallForestNode,
        level: usize,
    ) -> Result<Digest<C::Elem>> {
        let update_digest = self.hash_update(compiler, &node.update);
        let children_digest = self.forest_digest_at(compiler, node.children.nodes(), level + 1)?;
        Ok(self.hash_node(compiler, &update_digest, &children_digest))
    }

    /// Digest of the sibling sequence `nodes` at `level`
    fn forest_digest_at<C: Compiler>(
        &self,
        compiler: &mut C,
        nodes: &[CallForestNode],
        level: usize,
    ) -> Result<Digest<C::Elem>> {
        let mut digest = empty_forest_digest_with(compiler);
        if nodes.is_empty() {
            return Ok(digest);
        }
        self.check_level(level)?;
        for node in nodes.iter().rev() {
            let node_digest = self.node_digest_at(compiler, node, level)?;
            digest = self.hash_cons(compiler, &node_digest, &digest);
        }
        Ok(digest)
    }
}

/// Computes the digest of an account update with custom compiler and config
///
/// On a circuit compiler the update fields are private inputs and the hash is
/// computed in-circuit.
pub fn update_digest_with<C: Compiler, F: ForestConfig>(
    update: &AccountUpdate,
    compiler: &mut C,
    config: &F,
) -> Digest<C::Elem> {
    Domains::new(config).hash_update(compiler, update)
}

/// Computes the digest of a node (its update and its whole subtree)
///
/// # Errors
/// * `ForestError::ForestTooLarge` - If the subtree is deeper than `max_depth`
pub fn node_digest_with<C: Compiler, F: ForestConfig>(
    node: &CallForestNode,
    compiler: &mut C,
    config: &F,
) -> Result<Digest<C::Elem>> {
    Domains::new(config).node_digest_at(compiler, node, 0)
}

/// Computes the digest of a call forest with custom compiler and config
///
/// # Arguments
/// * `forest` - The forest to commit to
/// * `compiler` - Reference or provable representation
/// * `config` - The forest configuration
///
/// # Returns
/// The forest digest, `E` for the empty forest
///
/// # Errors
/// * `ForestError::ForestTooLarge` - If the forest is deeper than `max_depth`
pub fn forest_digest_with<C: Compiler, F: ForestConfig>(
    forest: &CallForest,
    compiler: &mut C,
    config: &F,
) -> Result<Digest<C::Elem>> {
    Domains::new(config).forest_digest_at(compiler, forest.nodes(), 0)
}

/// Combines an update digest with the forest digest of its children
pub fn hash_node_with<C: Compiler, F: ForestConfig>(
    update_digest: &Digest<C::Elem>,
    children_digest: &Digest<C::Elem>,
    compiler: &mut C,
    config: &F,
) -> Digest<C::Elem> {
    Domains::new(config).hash_node(compiler, update_digest, children_digest)
}

/// Computes the digest of a forest whose first node has `node_digest` and
/// whose remaining nodes have `tail_digest`
pub fn cons_with<C: Compiler, F: ForestConfig>(
    node_digest: &Digest<C::Elem>,
    tail_digest: &Digest<C::Elem>,
    compiler: &mut C,
    config: &F,
) -> Digest<C::Elem> {
    Domains::new(config).hash_cons(compiler, node_digest, tail_digest)
}

/// Allocates the empty forest digest `E` as a constant
pub fn empty_forest_digest_with<C: Compiler>(compiler: &mut C) -> Digest<C::Elem> {
    compiler.constant_digest(&Digest::ZERO)
}

/// Computes the digest of an account update on the reference path
pub fn update_digest(update: &AccountUpdate) -> Digest {
    update_digest_with(update, &mut Native, &DEFAULT_CONFIG)
}

/// Computes the digest of a node on the reference path
///
/// # Errors
/// * `ForestError::ForestTooLarge` - If the subtree is deeper than the default bound
pub fn node_digest(node: &CallForestNode) -> Result<Digest> {
    node_digest_with(node, &mut Native, &DEFAULT_CONFIG)
}

/// Computes the digest of a call forest on the reference path
///
/// # Errors
/// * `ForestError::ForestTooLarge` - If the forest is deeper than the default bound
pub fn forest_digest(forest: &CallForest) -> Result<Digest> {
    forest_digest_with(forest, &mut Native, &DEFAULT_CONFIG)
}

/// The empty forest digest `E`
pub fn empty_forest_digest() -> Digest { Digest::ZERO }

/// Combines an update digest with the digest of its children on the reference path
pub fn hash_node(update_digest: &Digest, children_digest: &Digest) -> Digest {
    hash_node_with(update_digest, children_digest, &mut Native, &DEFAULT_CONFIG)
}

/// Prepends a node to a committed forest in constant time
///
/// `forest_digest(prepend(n, f)) == cons(node_digest(n), forest_digest(f))`
pub fn cons(node_digest: &Digest, tail_digest: &Digest) -> Digest {
    cons_with(node_digest, tail_digest, &mut Native, &DEFAULT_CONFIG)
}

/// Computes the forest digest with the top-level subtrees hashed in parallel
///
/// The cons chain over the top-level node digests is folded sequentially, so
/// the result equals [`forest_digest_with`] on the reference path.
///
/// # Errors
/// * `ForestError::ForestTooLarge` - If the forest is deeper than `max_depth`
pub fn par_forest_digest_with<F: ForestConfig>(
    forest: &CallForest,
    config: &F,
) -> Result<Digest> {
    let domains = Domains::new(config);
    if forest.is_empty() {
        return Ok(empty_forest_digest());
    }
    domains.check_level(0)?;

    let node_digests = forest
        .nodes()
        .par_iter()
        .map(|node| domains.node_digest_at(&mut Native, node, 0))
        .collect::<Result<Vec<Digest>>>()?;

    let digest = node_digests.iter().rev().fold(empty_forest_digest(), |tail, node_digest| {
        domains.hash_cons(&mut Native, node_digest, &tail)
    });
    debug!(top_level = forest.len(), %digest, "computed forest digest in parallel");
    Ok(digest)
}

/// [`par_forest_digest_with`] using the default configuration
pub fn par_forest_digest(forest: &CallForest) -> Result<Digest> {
    par_forest_digest_with(forest, &DEFAULT_CONFIG)
}
