//! Group arithmetic consumed by the signature schemes.
//!
//! The ring signature, range proof and MLSAG code never touch curve internals directly.
//! Instead they are generic over a [`Curve`] passed in by the caller, which keeps the
//! protocol logic testable against any prime-order group. [`Ed25519`] is the
//! implementation used on the network.
//!
//! [`Ed25519`]: ::crypto::Ed25519

use rand::{CryptoRng, RngCore};

use std::fmt;

use super::keys::Key;

/// Scalar and point arithmetic of a prime-order group with a fixed base point `G`.
///
/// `Scalar` and `Point` are deliberately distinct types so that a point cannot be passed
/// where a scalar is expected. Both are obtained from wire-level [`Key`]s only through
/// the validating conversions of this trait.
pub trait Curve {
    type Scalar: Clone + PartialEq + fmt::Debug;
    type Point: Clone + PartialEq + fmt::Debug;

    /// Reduces a 512-bit little-endian integer modulo the group order.
    fn scalar_reduce(&self, wide: &[u8; 64]) -> Self::Scalar;
    /// Reduces a 256-bit little-endian integer modulo the group order.
    fn scalar_reduce32(&self, bytes: &[u8; 32]) -> Self::Scalar;
    /// Accepts `key` only if it encodes a scalar already reduced modulo the group order.
    fn scalar_from_canonical(&self, key: &Key) -> Option<Self::Scalar>;
    fn scalar_from_u64(&self, value: u64) -> Self::Scalar;
    fn scalar_to_key(&self, scalar: &Self::Scalar) -> Key;
    fn scalar_add(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;
    fn scalar_sub(&self, a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;
    /// Computes `c - a * b`.
    fn scalar_mul_sub(&self, a: &Self::Scalar, b: &Self::Scalar, c: &Self::Scalar)
        -> Self::Scalar;
    fn scalar_is_zero(&self, scalar: &Self::Scalar) -> bool;

    fn scalar_is_canonical(&self, key: &Key) -> bool {
        self.scalar_from_canonical(key).is_some()
    }

    /// Decodes a compressed point. Fails if `key` is not on the curve.
    fn point_from_key(&self, key: &Key) -> Option<Self::Point>;
    fn point_to_key(&self, point: &Self::Point) -> Key;
    /// Maps 32 bytes of hash output onto the curve. The result is not multiplied
    /// by the cofactor.
    fn point_from_hash(&self, hash: &[u8; 32]) -> Self::Point;
    fn identity(&self) -> Self::Point;
    /// Second generator `H` used for amounts in Pedersen commitments. Its discrete
    /// logarithm with respect to `G` must be unknown.
    fn amount_generator(&self) -> Self::Point;
    fn scalar_mult_base(&self, scalar: &Self::Scalar) -> Self::Point;
    fn scalar_mult(&self, scalar: &Self::Scalar, point: &Self::Point) -> Self::Point;
    /// Computes `a * big_a + b * G`.
    fn double_scalar_mult_base(
        &self,
        a: &Self::Scalar,
        big_a: &Self::Point,
        b: &Self::Scalar,
    ) -> Self::Point;
    /// Computes `a * big_a + b * big_b`.
    fn double_scalar_mult(
        &self,
        a: &Self::Scalar,
        big_a: &Self::Point,
        b: &Self::Scalar,
        big_b: &Self::Point,
    ) -> Self::Point;
    fn point_add(&self, a: &Self::Point, b: &Self::Point) -> Self::Point;
    fn point_sub(&self, a: &Self::Point, b: &Self::Point) -> Self::Point;
    fn mul_by_cofactor(&self, point: &Self::Point) -> Self::Point;
}

/// Draws a uniformly distributed scalar from 64 bytes of `rng` output.
pub fn random_scalar<C, R>(curve: &C, rng: &mut R) -> C::Scalar
where
    C: Curve,
    R: RngCore + CryptoRng,
{
    let mut wide = [0_u8; 64];
    rng.fill_bytes(&mut wide);
    curve.scalar_reduce(&wide)
}

/// Public key `secret * G` in its wire form.
pub fn public_key<C: Curve>(curve: &C, secret: &C::Scalar) -> Key {
    curve.point_to_key(&curve.scalar_mult_base(secret))
}

/// Generates a random secret scalar together with its public key.
pub fn generate_keys<C, R>(curve: &C, rng: &mut R) -> (C::Scalar, Key)
where
    C: Curve,
    R: RngCore + CryptoRng,
{
    let secret = random_scalar(curve, rng);
    let public = public_key(curve, &secret);
    (secret, public)
}
