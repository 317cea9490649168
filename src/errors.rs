//! Error types for the call forest library
//!
//! This module defines all error types used throughout the library,
//! providing detailed error information for debugging and handling.

use thiserror::Error;

use crate::types::Bytes32;

/// The main error type for the call forest library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Account update errors
    #[error(transparent)]
    Update(#[from] UpdateError),

    /// Forest construction and hashing errors
    #[error(transparent)]
    Forest(#[from] ForestError),

    /// Zero-knowledge circuit errors
    #[error(transparent)]
    Zkp(#[from] ZkpError),

    /// Tracing subscriber setup errors
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Errors that can occur while constructing account updates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpdateError {
    /// A payload field is absent or outside its declared domain
    #[error("Malformed account update payload: field `{field}` {reason}")]
    MalformedPayload {
        /// Name of the offending field
        field: &'static str,
        /// Why the field was rejected
        reason: String,
    },
}

/// Errors that can occur while building, flattening or hashing a call forest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ForestError {
    /// The depth annotations of a flat sequence do not describe a valid nesting
    #[error(
        "Invalid depth jump at index {index}: depth {depth} cannot follow {}",
        describe_previous(.previous)
    )]
    InvalidDepthJump {
        /// Position of the offending element in the flat sequence
        index: usize,
        /// Depth of the preceding element, `None` for the first element
        previous: Option<u32>,
        /// Depth of the offending element
        depth: u32,
    },

    /// The forest exceeds a configured resource bound
    #[error("Forest too large: {bound} {value} exceeds limit {limit}")]
    ForestTooLarge {
        /// Which bound was exceeded ("depth" or "node count")
        bound: &'static str,
        /// The observed value
        value: usize,
        /// The configured limit
        limit: usize,
    },

    /// A node path does not address a node of the forest
    #[error("No node at path {path:?}")]
    InvalidPath {
        /// The child indices from the root that failed to resolve
        path: Vec<u32>,
    },
}

fn describe_previous(previous: &Option<u32>) -> String {
    match previous {
        Some(depth) => format!("depth {depth}"),
        None => "the start of the sequence".to_string(),
    }
}

impl ForestError {
    pub(crate) fn depth_exceeded(depth: usize, limit: usize) -> Self {
        ForestError::ForestTooLarge { bound: "depth", value: depth, limit }
    }

    pub(crate) fn too_many_nodes(count: usize, limit: usize) -> Self {
        ForestError::ForestTooLarge { bound: "node count", value: count, limit }
    }
}

/// Errors that can occur on the reference or provable hashing path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ZkpError {
    /// Reference path and provable path disagree on the same forest
    #[error(
        "Digest mismatch: reference {} != provable {}",
        hex::encode(.reference),
        hex::encode(.provable)
    )]
    DigestMismatch {
        /// Digest computed from literal values
        reference: Bytes32,
        /// Digest read back from the circuit witness
        provable: Bytes32,
    },

    /// An equality assertion between two digests failed
    #[error(
        "Commitment mismatch: expected {}, got {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    CommitmentMismatch {
        /// The committed digest
        expected: Bytes32,
        /// The digest recomputed from the revealed data
        actual: Bytes32,
    },

    /// A circuit gate is not satisfied by the witness
    #[error("Unsatisfied constraint at gate {gate}")]
    UnsatisfiedConstraint {
        /// Index of the first failing gate
        gate: usize,
    },

    /// The witness does not assign every wire of the circuit
    #[error("Witness length mismatch: circuit has {expected} wires, witness has {actual}")]
    WitnessLengthMismatch {
        /// Number of wires in the circuit
        expected: usize,
        /// Number of values in the witness
        actual: usize,
    },
}

/// Errors that can occur while installing the tracing subscriber
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoggingError {
    /// The filter directives do not parse
    #[error("Invalid log filter `{directives}`: {reason}")]
    InvalidFilter {
        /// The rejected directives
        directives: String,
        /// Parser message
        reason: String,
    },

    /// Another component failed to install the subscriber
    #[error("Failed to install tracing subscriber: {reason}")]
    InstallFailed {
        /// Installer message
        reason: String,
    },
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_depth_jump_display() {
        let first = ForestError::InvalidDepthJump { index: 0, previous: None, depth: 1 };
        let later = ForestError::InvalidDepthJump { index: 3, previous: Some(0), depth: 2 };

        assert_eq!(
            first.to_string(),
            "Invalid depth jump at index 0: depth 1 cannot follow the start of the sequence"
        );
        assert_eq!(
            later.to_string(),
            "Invalid depth jump at index 3: depth 2 cannot follow depth 0"
        );
    }

    #[test]
    fn test_forest_too_large_helpers() {
        assert_eq!(
            ForestError::depth_exceeded(40, 32),
            ForestError::ForestTooLarge { bound: "depth", value: 40, limit: 32 }
        );
        assert!(ForestError::too_many_nodes(5000, 4096).to_string().contains("node count 5000"));
    }

    #[test]
    fn test_error_from_conversions() {
        let err: Error = UpdateError::MalformedPayload {
            field: "public_key",
            reason: "is missing".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Update(_)));
        assert_eq!(
            err.to_string(),
            "Malformed account update payload: field `public_key` is missing"
        );

        let err: Error = ZkpError::UnsatisfiedConstraint { gate: 7 }.into();
        assert!(matches!(err, Error::Zkp(ZkpError::UnsatisfiedConstraint { gate: 7 })));
    }

    #[test]
    fn test_digest_mismatch_display_is_hex() {
        let mut reference = [0u8; 32];
        reference[0] = 0xab;
        let provable = [0x0f; 32];

        let message = ZkpError::DigestMismatch { reference, provable }.to_string();

        let reference = format!("ab{}", "00".repeat(31));
        let provable = "0f".repeat(32);
        assert_eq!(
            message,
            format!("Digest mismatch: reference {reference} != provable {provable}")
        );
        assert!(!message.contains('['));
    }

    #[test]
    fn test_commitment_mismatch_display_is_hex() {
        let message = ZkpError::CommitmentMismatch { expected: [0xff; 32], actual: [0x01; 32] }
            .to_string();

        assert_eq!(
            message,
            format!("Commitment mismatch: expected {}, got {}", "ff".repeat(32), "01".repeat(32))
        );
    }
}
