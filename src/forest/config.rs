//! Configuration for call forest construction and hashing

use crate::types::{
    CONS_DOMAIN_TAG, MAX_FOREST_DEPTH, MAX_FOREST_NODES, NODE_DOMAIN_TAG, UPDATE_DOMAIN_TAG,
};

/// Configuration trait for call forest operations
///
/// Implementations fix the domain tags of the three hash instantiations and
/// the resource bounds forests are checked against, which allows protocol
/// versioning without touching the algorithms.
///
/// # Example
///
/// ```rust
/// use call_forest::forest::ForestConfig;
///
/// struct TestConfig;
///
/// impl ForestConfig for TestConfig {
///     fn update_domain_tag(&self) -> &[u8] { b"TEST_UPD" }
///     fn node_domain_tag(&self) -> &[u8] { b"TEST_NODE" }
///     fn cons_domain_tag(&self) -> &[u8] { b"TEST_CONS" }
///     fn max_depth(&self) -> usize { 4 }
///     fn max_nodes(&self) -> usize { 64 }
/// }
/// ```
pub trait ForestConfig {
    /// Returns the domain tag for account update digests
    fn update_domain_tag(&self) -> &[u8];

    /// Returns the domain tag for node digests
    ///
    /// A node digest binds an update digest to the digest of its children.
    fn node_domain_tag(&self) -> &[u8];

    /// Returns the domain tag for the cons step of the forest digest
    ///
    /// Must differ from the node tag so a node digest can never be mistaken
    /// for a forest digest.
    fn cons_domain_tag(&self) -> &[u8];

    /// Returns the number of admissible nesting levels
    ///
    /// # Returns
    /// The level count; call depths range over `0..max_depth`
    fn max_depth(&self) -> usize;

    /// Returns the maximum number of account updates in one forest
    fn max_nodes(&self) -> usize;
}

/// Call forest v0 configuration
///
/// This struct implements the [`ForestConfig`] trait with the domain tags and
/// bounds of the v0 protocol.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForestV0Config;

impl ForestConfig for ForestV0Config {
    fn update_domain_tag(&self) -> &[u8] { UPDATE_DOMAIN_TAG }

    fn node_domain_tag(&self) -> &[u8] { NODE_DOMAIN_TAG }

    fn cons_domain_tag(&self) -> &[u8] { CONS_DOMAIN_TAG }

    fn max_depth(&self) -> usize { MAX_FOREST_DEPTH }

    fn max_nodes(&self) -> usize { MAX_FOREST_NODES }
}

/// Default config instance (call forest v0)
pub const DEFAULT_CONFIG: ForestV0Config = ForestV0Config;
