//! Hashing primitives. All digests are Keccak with the original (pre-SHA-3) padding.

use sha3::{Digest, Keccak256, Keccak512};

use super::{curve::Curve, keys::Hash, keys::Key};

/// Length of an address or payment checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Keccak-256 over the concatenation of `parts`.
pub fn hash256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0_u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Hash(out)
}

/// Keccak-512 over the concatenation of `parts`.
pub fn hash512(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Keccak512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0_u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// First four bytes of `hash256(parts)`.
pub fn checksum(parts: &[&[u8]]) -> [u8; CHECKSUM_LEN] {
    let hash = hash256(parts);
    let mut out = [0_u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash.0[..CHECKSUM_LEN]);
    out
}

/// `Hs`: hash reduced to a scalar.
pub fn hash_to_scalar<C: Curve>(curve: &C, parts: &[&[u8]]) -> C::Scalar {
    curve.scalar_reduce32(&hash256(parts).0)
}

/// `Hp`: hash of a public key mapped to the prime-order subgroup.
pub fn hash_to_point<C: Curve>(curve: &C, key: &Key) -> C::Point {
    let hash = hash256(&[&key.0[..]]);
    curve.mul_by_cofactor(&curve.point_from_hash(&hash.0))
}
