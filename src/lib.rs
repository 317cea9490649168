#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Call Forest
//!
//! A Rust library for committing to the tree of account updates of a
//! zero-knowledge application transaction, with a reference path over field
//! values and a provable path that records the same hashing as a circuit.

// Error types
pub mod errors;

// Call forests: construction, flattening, hashing, memoization, revelation
pub mod forest;

// Tracing subscriber setup
pub mod logging;

// Core types and protocol constants
pub mod types;

// Account updates and their field encoding
pub mod update;

// Poseidon2 hashing, compilers and circuits
pub mod zkp;

// Re-export commonly used types and functions
pub use errors::{Error, Result};
pub use forest::{build_forest, flatten, forest_digest, CallForest, CallForestNode};
pub use types::Bytes32;
pub use update::{AccountUpdate, AuthorizationKind};
pub use zkp::{check_dual_path, Digest};
