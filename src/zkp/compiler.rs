//! Hashing compilers
//!
//! A [`Compiler`] is the capability the forest hasher is written against: it
//! allocates elements, hashes them under a domain tag, and asserts equality of
//! digests. The forest algorithms are implemented once, generically over a
//! compiler, and run unchanged on two representations:
//!
//! - [`Native`]: elements are literal field values (the reference path).
//! - [`CircuitBuilder`](crate::zkp::CircuitBuilder): elements are circuit wires
//!   and every operation is recorded as a gate (the provable path).

use core::fmt::Debug;

use crate::errors::ZkpError;
use crate::zkp::poseidon2_hash::poseidon2_hash_fields;
use crate::zkp::types::{Digest, Val};
use crate::Result;

/// Capability interface over a digest representation
pub trait Compiler {
    /// Element representation (a field value or a circuit variable)
    type Elem: Clone + Debug;

    /// Allocates a public constant
    fn constant(&mut self, value: Val) -> Self::Elem;

    /// Allocates a private input with the given assignment
    fn witness(&mut self, value: Val) -> Self::Elem;

    /// Hashes `inputs` under `domain` with Poseidon2
    fn hash(&mut self, domain: &[Val], inputs: &[Self::Elem]) -> Digest<Self::Elem>;

    /// Asserts that `actual` equals the committed digest `expected`
    ///
    /// # Errors
    /// * `ZkpError::CommitmentMismatch` - If the assigned values differ
    fn assert_digest_eq(
        &mut self,
        expected: &Digest<Self::Elem>,
        actual: &Digest<Self::Elem>,
    ) -> Result<()>;

    /// Allocates a digest of public constants
    fn constant_digest(&mut self, value: &Digest) -> Digest<Self::Elem> {
        value.map(|v| self.constant(*v))
    }

    /// Allocates a digest of private inputs
    fn witness_digest(&mut self, value: &Digest) -> Digest<Self::Elem> {
        value.map(|v| self.witness(*v))
    }
}

/// Compiler over literal field values
///
/// Hashing evaluates Poseidon2 directly and assertions compare values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Native;

impl Compiler for Native {
    type Elem = Val;

    fn constant(&mut self, value: Val) -> Val { value }

    fn witness(&mut self, value: Val) -> Val { value }

    fn hash(&mut self, domain: &[Val], inputs: &[Val]) -> Digest {
        Digest(poseidon2_hash_fields(domain, inputs))
    }

    fn assert_digest_eq(&mut self, expected: &Digest, actual: &Digest) -> Result<()> {
        if expected != actual {
            return Err(ZkpError::CommitmentMismatch {
                expected: expected.to_bytes(),
                actual: actual.to_bytes(),
            }
            .into());
        }
        Ok(())
    }
}
