//! Deterministic map from 32 bytes onto the Ed25519 curve.
//!
//! Key images are computed against `8 * map(Keccak(P))`, so the map has to match the
//! network bit for bit. It goes through the Montgomery form of the curve (`A = 486662`):
//! the input is read as a field element `u`, a candidate Montgomery `x` is derived
//! from `2u^2`, and the result is converted to the Edwards form in projective
//! coordinates before being compressed. The resulting point is *not* multiplied by the
//! cofactor.
//!
//! `curve25519-dalek` does not expose field arithmetic, so the arithmetic here is done
//! with `num-bigint`. Speed is secondary, since the map runs once per ring member.

use num_bigint::BigUint;

lazy_static! {
    /// Field modulus `2^255 - 19`.
    static ref P: BigUint = (BigUint::from(1_u32) << 255_usize) - BigUint::from(19_u32);
    static ref SQRT_M1: BigUint = {
        let exp = (&*P - BigUint::from(1_u32)) >> 2_usize;
        BigUint::from(2_u32).modpow(&exp, &P)
    };
    static ref MONTGOMERY_A: BigUint = BigUint::from(486_662_u32);
    /// `-A`
    static ref MA: BigUint = neg(&MONTGOMERY_A);
    /// `-A^2`
    static ref MA2: BigUint = neg(&mul(&MONTGOMERY_A, &MONTGOMERY_A));
    /// `A * (A + 2)`
    static ref A_A2: BigUint = mul(&MONTGOMERY_A, &(&*MONTGOMERY_A + BigUint::from(2_u32)));
    /// `sqrt(-2A(A + 2))`
    static ref FFFB1: BigUint = sqrt(&neg(&mul(&BigUint::from(2_u32), &A_A2)));
    /// `sqrt(2A(A + 2))`
    static ref FFFB2: BigUint = sqrt(&mul(&BigUint::from(2_u32), &A_A2));
    /// `sqrt(-sqrt(-1) * A(A + 2))`
    static ref FFFB3: BigUint = sqrt(&neg(&mul(&SQRT_M1, &A_A2)));
    /// `sqrt(sqrt(-1) * A(A + 2))`
    static ref FFFB4: BigUint = sqrt(&mul(&SQRT_M1, &A_A2));
}

fn add(a: &BigUint, b: &BigUint) -> BigUint {
    (a + b) % &*P
}

fn sub(a: &BigUint, b: &BigUint) -> BigUint {
    (a + &*P - b) % &*P
}

fn mul(a: &BigUint, b: &BigUint) -> BigUint {
    (a * b) % &*P
}

fn neg(a: &BigUint) -> BigUint {
    sub(&BigUint::from(0_u32), a)
}

fn invert(a: &BigUint) -> BigUint {
    a.modpow(&(&*P - BigUint::from(2_u32)), &P)
}

fn pow_p38(a: &BigUint) -> BigUint {
    let exp = (&*P + BigUint::from(3_u32)) >> 3_usize;
    a.modpow(&exp, &P)
}

fn is_zero(a: &BigUint) -> bool {
    *a == BigUint::from(0_u32)
}

fn is_negative(a: &BigUint) -> bool {
    a.bit(0)
}

/// Square root of a quadratic residue. Only used for the constants above.
fn sqrt(a: &BigUint) -> BigUint {
    let root = pow_p38(a);
    if mul(&root, &root) == *a {
        root
    } else {
        mul(&root, &SQRT_M1)
    }
}

/// Maps `bytes` onto the curve, returning the compressed Edwards encoding of the result.
pub fn map_to_compressed(bytes: &[u8; 32]) -> [u8; 32] {
    // All 256 bits take part in the reduction; the top bit is not masked.
    let u = BigUint::from_bytes_le(bytes) % &*P;

    let v = mul(&BigUint::from(2_u32), &mul(&u, &u));
    let w = add(&v, &BigUint::from(1_u32));
    let x = add(&mul(&w, &w), &mul(&MA2, &v));

    // r = (w / x)^((p + 3) / 8)
    let mut r = pow_p38(&mul(&w, &invert(&x)));
    let check = mul(&mul(&r, &r), &x);

    let mut z = MA.clone();
    let sign;
    if is_zero(&sub(&w, &check)) {
        r = mul(&mul(&r, &FFFB2), &u);
        z = mul(&z, &v);
        sign = false;
    } else if is_zero(&add(&w, &check)) {
        r = mul(&mul(&r, &FFFB1), &u);
        z = mul(&z, &v);
        sign = false;
    } else {
        let rotated = mul(&check, &SQRT_M1);
        r = if is_zero(&sub(&w, &rotated)) {
            mul(&r, &FFFB4)
        } else {
            mul(&r, &FFFB3)
        };
        sign = true;
    }

    if is_negative(&r) != sign {
        r = neg(&r);
    }

    // Projective Edwards coordinates (X : Y : Z).
    let big_z = add(&z, &w);
    let big_y = sub(&z, &w);
    let big_x = mul(&r, &big_z);

    let z_inv = invert(&big_z);
    let affine_x = mul(&big_x, &z_inv);
    let affine_y = mul(&big_y, &z_inv);

    let mut out = [0_u8; 32];
    let y_bytes = affine_y.to_bytes_le();
    out[..y_bytes.len()].copy_from_slice(&y_bytes);
    if is_negative(&affine_x) {
        out[31] |= 0x80;
    }
    out
}
