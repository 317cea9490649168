//! Poseidon2 hash functions for forest commitments
//!
//! This module provides the Poseidon2 sponge that every digest in the crate is
//! computed with. The reference path calls it directly; the provable path calls
//! it to fill in the witness of each hash gate and again when a circuit is
//! checked, so both paths share one set of constants.

use std::sync::OnceLock;

use p3_baby_bear::Poseidon2BabyBear;
use p3_poseidon2::ExternalLayerConstants;
use p3_symmetric::{CryptographicHasher, PaddingFreeSponge};
use rand::distr::StandardUniform;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::zkp::types::{Val, DIGEST_WIDTH};

/// Poseidon2 parameters for BabyBear
pub(crate) const POSEIDON2_WIDTH: usize = 16;
/// Poseidon2 sponge rate (number of field elements absorbed per permutation)
/// For width 16, rate 8 means capacity 8 (rate + capacity = width)
pub(crate) const POSEIDON2_RATE: usize = 8;
pub(crate) const POSEIDON2_HALF_FULL_ROUNDS: usize = 4;
pub(crate) const POSEIDON2_PARTIAL_ROUNDS: usize = 13;
/// Seed of the RNG the round constants are drawn from
const POSEIDON2_CONSTANTS_SEED: u64 = 1;

/// Poseidon2 permutation type for BabyBear (width: 16)
type Perm = Poseidon2BabyBear<POSEIDON2_WIDTH>;
/// Poseidon2 hash sponge (rate: 8, output: 8 field elements = 32 bytes)
type Poseidon2Sponge = PaddingFreeSponge<Perm, POSEIDON2_WIDTH, POSEIDON2_RATE, DIGEST_WIDTH>;

/// Creates a deterministic Poseidon2 sponge
///
/// Constants are drawn in order (initial full rounds, partial rounds,
/// terminal full rounds) from a fixed-seed RNG, so every process derives the
/// same permutation.
fn create_poseidon2_sponge() -> Poseidon2Sponge {
    let mut rng = SmallRng::seed_from_u64(POSEIDON2_CONSTANTS_SEED);

    let initial_full_rounds: Vec<[Val; POSEIDON2_WIDTH]> = (0..POSEIDON2_HALF_FULL_ROUNDS)
        .map(|_| [(); POSEIDON2_WIDTH].map(|_| rng.sample(StandardUniform)))
        .collect();
    let partial_rounds: Vec<Val> =
        (0..POSEIDON2_PARTIAL_ROUNDS).map(|_| rng.sample(StandardUniform)).collect();
    let terminal_full_rounds: Vec<[Val; POSEIDON2_WIDTH]> = (0..POSEIDON2_HALF_FULL_ROUNDS)
        .map(|_| [(); POSEIDON2_WIDTH].map(|_| rng.sample(StandardUniform)))
        .collect();

    let external_constants = ExternalLayerConstants::new(initial_full_rounds, terminal_full_rounds);
    let perm = Perm::new(external_constants, partial_rounds);
    Poseidon2Sponge::new(perm)
}

fn sponge() -> &'static Poseidon2Sponge {
    static SPONGE: OnceLock<Poseidon2Sponge> = OnceLock::new();
    SPONGE.get_or_init(create_poseidon2_sponge)
}

/// Hash field elements under a domain tag using Poseidon2
///
/// The domain elements are absorbed first, then the inputs. Callers keep the
/// input length fixed per domain, so the padding-free sponge is unambiguous.
pub fn poseidon2_hash_fields(domain: &[Val], inputs: &[Val]) -> [Val; DIGEST_WIDTH] {
    sponge().hash_iter(domain.iter().chain(inputs.iter()).copied())
}

#[cfg(test)]
mod tests {
    use p3_field::PrimeCharacteristicRing;

    use super::*;

    #[test]
    fn test_poseidon2_hash_fields_deterministic() {
        let domain = [Val::new(7)];
        let inputs = [Val::ONE, Val::new(2), Val::new(3)];

        let first = poseidon2_hash_fields(&domain, &inputs);
        let second = poseidon2_hash_fields(&domain, &inputs);
        let fresh =
            create_poseidon2_sponge().hash_iter([Val::new(7), Val::ONE, Val::new(2), Val::new(3)]);

        assert_eq!(first, second);
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_poseidon2_hash_fields_domain_separation() {
        let inputs = [Val::new(42); 16];

        let a = poseidon2_hash_fields(&[Val::ONE], &inputs);
        let b = poseidon2_hash_fields(&[Val::new(2)], &inputs);
        let untagged = poseidon2_hash_fields(&[], &inputs);

        assert_ne!(a, b);
        assert_ne!(a, untagged);
        assert_ne!(untagged, [Val::ZERO; DIGEST_WIDTH]);
    }

    #[test]
    fn test_poseidon2_hash_fields_input_sensitivity() {
        let mut inputs = [Val::ZERO; 16];
        let before = poseidon2_hash_fields(&[], &inputs);
        inputs[15] = Val::ONE;

        let after = poseidon2_hash_fields(&[], &inputs);

        assert_ne!(before, after);
    }
}
