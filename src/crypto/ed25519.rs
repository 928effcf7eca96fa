//! `Curve` backend on Ed25519, as used by the network.

use curve25519_dalek::{
    constants::ED25519_BASEPOINT_TABLE,
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar,
    traits::Identity,
};

use super::{curve::Curve, hash_to_ec, keys::Key};

/// Compressed `H = 8 * decompress(Keccak(G))`.
pub const H_BYTES: [u8; 32] = [
    0x8b, 0x65, 0x59, 0x70, 0x15, 0x37, 0x99, 0xaf, 0x2a, 0xea, 0xdc, 0x9f, 0xf1, 0xad, 0xd0, 0xea,
    0x6c, 0x72, 0x51, 0xd5, 0x41, 0x54, 0xcf, 0xa9, 0x2c, 0x17, 0x3a, 0x0d, 0xd3, 0x9c, 0x1f, 0x94,
];

lazy_static! {
    static ref H: EdwardsPoint = CompressedEdwardsY(H_BYTES)
        .decompress()
        .expect("`H` is a valid compressed point");
}

/// Ed25519 group arithmetic backed by `curve25519-dalek`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519;

impl Curve for Ed25519 {
    type Scalar = Scalar;
    type Point = EdwardsPoint;

    fn scalar_reduce(&self, wide: &[u8; 64]) -> Scalar {
        Scalar::from_bytes_mod_order_wide(wide)
    }

    fn scalar_reduce32(&self, bytes: &[u8; 32]) -> Scalar {
        Scalar::from_bytes_mod_order(*bytes)
    }

    fn scalar_from_canonical(&self, key: &Key) -> Option<Scalar> {
        Scalar::from_canonical_bytes(key.to_bytes())
    }

    fn scalar_from_u64(&self, value: u64) -> Scalar {
        Scalar::from(value)
    }

    fn scalar_to_key(&self, scalar: &Scalar) -> Key {
        Key(scalar.to_bytes())
    }

    fn scalar_add(&self, a: &Scalar, b: &Scalar) -> Scalar {
        a + b
    }

    fn scalar_sub(&self, a: &Scalar, b: &Scalar) -> Scalar {
        a - b
    }

    fn scalar_mul_sub(&self, a: &Scalar, b: &Scalar, c: &Scalar) -> Scalar {
        c - a * b
    }

    fn scalar_is_zero(&self, scalar: &Scalar) -> bool {
        *scalar == Scalar::zero()
    }

    fn point_from_key(&self, key: &Key) -> Option<EdwardsPoint> {
        CompressedEdwardsY(key.to_bytes()).decompress()
    }

    fn point_to_key(&self, point: &EdwardsPoint) -> Key {
        Key(point.compress().to_bytes())
    }

    fn point_from_hash(&self, hash: &[u8; 32]) -> EdwardsPoint {
        CompressedEdwardsY(hash_to_ec::map_to_compressed(hash))
            .decompress()
            .expect("field map output is always on the curve")
    }

    fn identity(&self) -> EdwardsPoint {
        EdwardsPoint::identity()
    }

    fn amount_generator(&self) -> EdwardsPoint {
        *H
    }

    fn scalar_mult_base(&self, scalar: &Scalar) -> EdwardsPoint {
        &ED25519_BASEPOINT_TABLE * scalar
    }

    fn scalar_mult(&self, scalar: &Scalar, point: &EdwardsPoint) -> EdwardsPoint {
        scalar * point
    }

    fn double_scalar_mult_base(
        &self,
        a: &Scalar,
        big_a: &EdwardsPoint,
        b: &Scalar,
    ) -> EdwardsPoint {
        EdwardsPoint::vartime_double_scalar_mul_basepoint(a, big_a, b)
    }

    fn double_scalar_mult(
        &self,
        a: &Scalar,
        big_a: &EdwardsPoint,
        b: &Scalar,
        big_b: &EdwardsPoint,
    ) -> EdwardsPoint {
        a * big_a + b * big_b
    }

    fn point_add(&self, a: &EdwardsPoint, b: &EdwardsPoint) -> EdwardsPoint {
        a + b
    }

    fn point_sub(&self, a: &EdwardsPoint, b: &EdwardsPoint) -> EdwardsPoint {
        a - b
    }

    fn mul_by_cofactor(&self, point: &EdwardsPoint) -> EdwardsPoint {
        point.mul_by_cofactor()
    }
}
