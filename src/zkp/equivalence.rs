//! Agreement of the reference and provable hashing paths
//!
//! The forest hasher is written once against [`Compiler`]. Running it on
//! [`Native`] yields the reference digest; running it on a [`CircuitBuilder`]
//! yields a circuit and witness whose public output must carry the same
//! value. [`check_dual_path`] computes both and fails loudly when they differ.

use tracing::{debug, instrument};

use crate::errors::ZkpError;
use crate::forest::{forest_digest_with, CallForest, ForestConfig};
use crate::zkp::circuit::{Circuit, CircuitBuilder, Wire, Witness};
use crate::zkp::compiler::Native;
use crate::zkp::types::Digest;
use crate::Result;

/// Synthesizes the circuit computing the digest of `forest`
///
/// The forest digest is registered as the only public output.
///
/// # Arguments
/// * `forest` - The forest to commit to
/// * `config` - The forest configuration
///
/// # Returns
/// The circuit, its witness and the wires holding the digest
///
/// # Errors
/// * `ForestError::ForestTooLarge` - If the forest is deeper than `max_depth`
pub fn synthesize_forest_digest<F: ForestConfig>(
    forest: &CallForest,
    config: &F,
) -> Result<(Circuit, Witness, Digest<Wire>)> {
    let mut builder = CircuitBuilder::new();
    let digest = forest_digest_with(forest, &mut builder, config)?;
    builder.register_public(digest);
    let (circuit, witness) = builder.build();
    Ok((circuit, witness, digest))
}

/// Computes the forest digest on both paths and checks that they agree
///
/// The circuit witness is checked gate by gate before its output is read.
///
/// # Returns
/// The digest both paths agree on
///
/// # Errors
/// * `ZkpError::DigestMismatch` - If the paths produce different digests
/// * `ZkpError::UnsatisfiedConstraint` - If the witness violates the circuit
/// * `ForestError::ForestTooLarge` - If the forest is deeper than `max_depth`
#[instrument(level = "debug", skip_all, fields(nodes = forest.node_count()))]
pub fn check_dual_path<F: ForestConfig>(forest: &CallForest, config: &F) -> Result<Digest> {
    let reference = forest_digest_with(forest, &mut Native, config)?;
    let (circuit, witness, wires) = synthesize_forest_digest(forest, config)?;
    circuit.check(&witness)?;
    let provable = witness.read_digest(&wires)?;

    if reference != provable {
        return Err(ZkpError::DigestMismatch {
            reference: reference.to_bytes(),
            provable: provable.to_bytes(),
        }
        .into());
    }
    debug!(gates = circuit.gates().len(), %reference, "reference and provable digests agree");
    Ok(reference)
}
