//! Reference and provable hashing paths
//!
//! This module provides the Poseidon2 hash over BabyBear, the digest type,
//! and the [`Compiler`] abstraction the forest hasher is written against,
//! with two implementations: [`Native`] evaluates hashes directly, while
//! [`CircuitBuilder`] records them as gates of a checkable [`Circuit`].

pub mod circuit;
pub mod compiler;
pub mod equivalence;
mod poseidon2_hash;
pub mod types;

pub use circuit::{Circuit, CircuitBuilder, Gate, Wire, Witness};
pub use compiler::{Compiler, Native};
pub use equivalence::{check_dual_path, synthesize_forest_digest};
pub use poseidon2_hash::poseidon2_hash_fields;
pub use types::{Digest, Val, DIGEST_WIDTH};
