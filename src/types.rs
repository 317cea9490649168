//! Core type definitions for the call forest library
//!
//! This module defines fundamental types and protocol constants used across
//! multiple modules, providing a common location for shared definitions.

// ============================================================================
// Fundamental Types
// ============================================================================

/// Type alias for 32-byte arrays used across cryptographic operations
pub type Bytes32 = [u8; 32];

/// Type alias for account public keys
pub type PublicKey = Bytes32;

/// Type alias for token identifiers
pub type TokenId = Bytes32;

/// Call depth of an account update (0 = top level)
pub type CallDepth = u32;

// ============================================================================
// Account Update Domain
// ============================================================================

/// Token identifier of the native token
///
/// Account updates that do not name a token operate on the native token.
pub const DEFAULT_TOKEN_ID: TokenId = {
    let mut id = [0u8; 32];
    id[0] = 1;
    id
};

/// Domain separation tag for account update digests
pub const UPDATE_DOMAIN_TAG: &[u8] = b"ZKF_UPD_v0";

// ============================================================================
// Call Forest Domain
// ============================================================================

/// Domain separation tag for node digests (update digest + children digest)
pub const NODE_DOMAIN_TAG: &[u8] = b"ZKF_NODE_v0";

/// Domain separation tag for the cons step of the forest digest
pub const CONS_DOMAIN_TAG: &[u8] = b"ZKF_CONS_v0";

/// Maximum number of nesting levels in a call forest
///
/// Call depths range over `0..MAX_FOREST_DEPTH`.
pub const MAX_FOREST_DEPTH: usize = 32;

/// Maximum number of account updates in a single call forest
pub const MAX_FOREST_NODES: usize = 4096;
