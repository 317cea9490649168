//! Type definitions for ZKP module
//!
//! This module provides the field type and the digest representation shared by
//! the reference path (literal field elements) and the provable path (circuit
//! wires), together with the byte and integer packing used to turn protocol
//! data into field elements.

use core::fmt;

use p3_baby_bear::BabyBear;
use p3_field::{PrimeCharacteristicRing, PrimeField32};

use crate::Bytes32;

/// Field type: BabyBear (31-bit)
pub type Val = BabyBear;

/// Number of field elements in a digest (8 elements = 32 bytes)
pub const DIGEST_WIDTH: usize = 8;

/// Bytes packed into one field element
///
/// Three bytes stay below the BabyBear modulus, so packing is injective.
const BYTES_PER_FIELD: usize = 3;

/// A digest over an arbitrary element representation
///
/// `Digest<Val>` (the default) holds literal field elements and is what the
/// reference path produces. `Digest<Wire>` holds circuit variables and is what
/// the provable path produces. Both are shaped identically so the forest hasher
/// can be written once, generically over the representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digest<E = Val>(pub [E; DIGEST_WIDTH]);

impl<E> Digest<E> {
    /// Iterates over the digest elements
    pub fn iter(&self) -> core::slice::Iter<'_, E> { self.0.iter() }

    /// Returns the digest elements as a slice
    pub fn as_slice(&self) -> &[E] { &self.0 }

    /// Applies `f` to every element, producing a digest in another representation
    pub fn map<T, F: FnMut(&E) -> T>(&self, mut f: F) -> Digest<T> {
        Digest(core::array::from_fn(|i| f(&self.0[i])))
    }
}

impl Digest<Val> {
    /// The all-zero digest, used as the empty forest commitment
    pub const ZERO: Self = Digest([Val::ZERO; DIGEST_WIDTH]);

    /// Converts the digest to 32 bytes (canonical u32 per element, little-endian)
    pub fn to_bytes(&self) -> Bytes32 {
        let mut bytes = [0u8; 32];
        for (i, field) in self.0.iter().enumerate() {
            let val = PrimeField32::as_canonical_u32(field);
            bytes[i * 4..(i + 1) * 4].copy_from_slice(&val.to_le_bytes());
        }
        bytes
    }
}

impl fmt::Display for Digest<Val> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

/// Packs bytes into field elements, 3 bytes per element (little-endian)
pub(crate) fn pack_bytes(bytes: &[u8]) -> Vec<Val> {
    bytes
        .chunks(BYTES_PER_FIELD)
        .map(|chunk| {
            let mut arr = [0u8; 4];
            arr[..chunk.len()].copy_from_slice(chunk);
            Val::new(u32::from_le_bytes(arr))
        })
        .collect()
}

/// Splits a u64 into four 16-bit limbs, least significant first
pub(crate) fn u64_to_limbs(value: u64) -> [Val; 4] {
    core::array::from_fn(|i| Val::new(((value >> (16 * i)) & 0xffff) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bytes() {
        assert_eq!(pack_bytes(&[0u8; 32]).len(), 11);
        assert!(pack_bytes(&[]).is_empty());

        let packed = pack_bytes(&[1, 2, 3, 4]);

        assert_eq!(packed, vec![Val::new(0x030201), Val::new(4)]);
    }

    #[test]
    fn test_pack_bytes_is_injective_on_high_bytes() {
        // 4-byte packing would wrap 0xffffffff around the modulus
        let a = pack_bytes(&[0xff; 6]);
        let b = pack_bytes(&[0xfe; 6]);

        assert_ne!(a, b);
        assert_eq!(a[0].as_canonical_u32(), 0x00ff_ffff);
    }

    #[test]
    fn test_u64_to_limbs() {
        let limbs = u64_to_limbs(0x0004_0003_0002_0001);

        assert_eq!(limbs, [Val::new(1), Val::new(2), Val::new(3), Val::new(4)]);
        assert_eq!(u64_to_limbs(u64::MAX), [Val::new(0xffff); 4]);
    }

    #[test]
    fn test_digest_to_bytes_and_display() {
        let mut elements = [Val::ZERO; DIGEST_WIDTH];
        elements[0] = Val::new(1);
        elements[7] = Val::new(0x0100);
        let digest = Digest(elements);

        let bytes = digest.to_bytes();

        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[28..32], &[0x00, 0x01, 0x00, 0x00]);
        assert_eq!(Digest::ZERO.to_bytes(), [0u8; 32]);
        let shown = digest.to_string();
        assert_eq!(shown.len(), 64);
        assert!(shown.starts_with("01000000"));
        assert!(shown.ends_with("00010000"));
        assert_eq!(Digest::ZERO.to_string(), "0".repeat(64));
    }

    #[test]
    fn test_digest_map() {
        let digest = Digest([Val::ONE; DIGEST_WIDTH]);

        let mapped = digest.map(|v| v.as_canonical_u32() + 1);

        assert_eq!(mapped, Digest([2u32; DIGEST_WIDTH]));
    }
}
