//! Pedersen commitments and Borromean range proofs.
//!
//! A commitment to `amount` with blinding `mask` is `mask * G + amount * H`. The range
//! proof splits the commitment into 64 bit commitments `C_i`, each of which commits
//! either to `0` or to `2^i`, and proves with a Borromean ring signature that every
//! `C_i` or `C_i - 2^i * H` has a known discrete logarithm with respect to `G`.

use rand::{CryptoRng, RngCore};

use crypto::{hash_to_scalar, random_scalar, Curve, Key};
use error::{Error, Result};

/// Number of bits covered by a range proof.
pub const BITS: usize = 64;

/// One key per amount bit.
pub type Key64 = [Key; BITS];

/// Borromean signature over 64 rings of two members each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoroSig {
    pub s0: Key64,
    pub s1: Key64,
    pub ee: Key,
}

/// Proof that a commitment hides a value in `[0, 2^64)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSig {
    pub asig: BoroSig,
    /// Bit commitments; they sum up to the proved commitment.
    pub ci: Key64,
}

impl RangeSig {
    /// Size of the serialized proof.
    pub const BYTE_LEN: usize = (3 * BITS + 1) * 32;

    pub fn serialize_into(&self, buffer: &mut Vec<u8>) {
        for key in self.asig.s0.iter().chain(self.asig.s1.iter()) {
            buffer.extend_from_slice(key.as_ref());
        }
        buffer.extend_from_slice(self.asig.ee.as_ref());
        for key in self.ci.iter() {
            buffer.extend_from_slice(key.as_ref());
        }
    }
}

/// `2^i * H` for `i` in `0..64`.
pub fn h_powers<C: Curve>(curve: &C) -> Vec<C::Point> {
    let mut powers = Vec::with_capacity(BITS);
    let mut current = curve.amount_generator();
    for _ in 0..BITS {
        let next = curve.point_add(&current, &current);
        powers.push(current);
        current = next;
    }
    powers
}

/// Pedersen commitment `mask * G + amount * H`.
pub fn commit<C: Curve>(curve: &C, amount: u64, mask: &C::Scalar) -> C::Point {
    let amount = curve.scalar_from_u64(amount);
    curve.double_scalar_mult_base(&amount, &curve.amount_generator(), mask)
}

/// `amount * H`, a commitment with zero blinding. Used for fees.
pub fn commit_to_fee<C: Curve>(curve: &C, fee: u64) -> C::Point {
    curve.scalar_mult(&curve.scalar_from_u64(fee), &curve.amount_generator())
}

fn hash_point<C: Curve>(curve: &C, point: &C::Point) -> C::Scalar {
    hash_to_scalar(curve, &[&curve.point_to_key(point).0[..]])
}

fn hash_keys<C: Curve>(curve: &C, keys: &[Key]) -> C::Scalar {
    let mut bytes = Vec::with_capacity(keys.len() * 32);
    for key in keys {
        bytes.extend_from_slice(key.as_ref());
    }
    hash_to_scalar(curve, &[&bytes[..]])
}

/// Creates a Borromean signature for 64 rings `{p1[i], p2[i]}`.
///
/// `x[i]` must be the discrete logarithm of `p2[i]` if `indices[i]` is set, and of
/// `p1[i]` otherwise.
pub fn generate_borromean<C, R>(
    curve: &C,
    rng: &mut R,
    x: &[C::Scalar],
    p1: &[C::Point],
    p2: &[C::Point],
    indices: &[bool],
) -> Result<BoroSig>
where
    C: Curve,
    R: RngCore + CryptoRng,
{
    let lengths = [
        ("borromean secrets", x.len()),
        ("borromean first ring", p1.len()),
        ("borromean second ring", p2.len()),
        ("borromean indices", indices.len()),
    ];
    for &(field, len) in &lengths {
        if len != BITS {
            return Err(Error::shape(field, BITS, len));
        }
    }

    let mut alpha = Vec::with_capacity(BITS);
    let mut last_layer = [Key::zero(); BITS];
    let mut s0 = [Key::zero(); BITS];
    let mut s1 = [Key::zero(); BITS];

    for i in 0..BITS {
        let a = random_scalar(curve, rng);
        let l = curve.scalar_mult_base(&a);
        if indices[i] {
            last_layer[i] = curve.point_to_key(&l);
        } else {
            let s = random_scalar(curve, rng);
            let c = hash_point(curve, &l);
            last_layer[i] = curve.point_to_key(&curve.double_scalar_mult_base(&c, &p2[i], &s));
            s1[i] = curve.scalar_to_key(&s);
        }
        alpha.push(a);
    }

    let ee = hash_keys(curve, &last_layer);
    for j in 0..BITS {
        if indices[j] {
            let s = random_scalar(curve, rng);
            let l = curve.double_scalar_mult_base(&ee, &p1[j], &s);
            let c = hash_point(curve, &l);
            s0[j] = curve.scalar_to_key(&s);
            s1[j] = curve.scalar_to_key(&curve.scalar_mul_sub(&x[j], &c, &alpha[j]));
        } else {
            s0[j] = curve.scalar_to_key(&curve.scalar_mul_sub(&x[j], &ee, &alpha[j]));
        }
    }

    Ok(BoroSig {
        s0,
        s1,
        ee: curve.scalar_to_key(&ee),
    })
}

/// Verifies a Borromean signature for the rings `{p1[i], p2[i]}`.
pub fn verify_borromean<C: Curve>(
    curve: &C,
    sig: &BoroSig,
    p1: &[C::Point],
    p2: &[C::Point],
) -> bool {
    if p1.len() != BITS || p2.len() != BITS {
        return false;
    }
    let ee = match curve.scalar_from_canonical(&sig.ee) {
        Some(ee) => ee,
        None => return false,
    };

    let mut last_layer = [Key::zero(); BITS];
    for i in 0..BITS {
        let (s0, s1) = match (
            curve.scalar_from_canonical(&sig.s0[i]),
            curve.scalar_from_canonical(&sig.s1[i]),
        ) {
            (Some(s0), Some(s1)) => (s0, s1),
            _ => return false,
        };
        let l = curve.double_scalar_mult_base(&ee, &p1[i], &s0);
        let c = hash_point(curve, &l);
        last_layer[i] = curve.point_to_key(&curve.double_scalar_mult_base(&c, &p2[i], &s1));
    }
    curve.scalar_to_key(&hash_keys(curve, &last_layer)) == sig.ee
}

/// Commits to `amount` with a fresh mask and proves the commitment is in range.
///
/// Returns the commitment, its mask and the proof.
pub fn prove_range<C, R>(curve: &C, rng: &mut R, amount: u64) -> Result<(Key, C::Scalar, RangeSig)>
where
    C: Curve,
    R: RngCore + CryptoRng,
{
    let powers = h_powers(curve);
    let mut mask = curve.scalar_from_u64(0);
    let mut commitment = curve.identity();
    let mut secrets = Vec::with_capacity(BITS);
    let mut bit_commitments = Vec::with_capacity(BITS);
    let mut shifted = Vec::with_capacity(BITS);
    let mut indices = Vec::with_capacity(BITS);
    let mut ci = [Key::zero(); BITS];

    for i in 0..BITS {
        let bit = (amount >> i) & 1 == 1;
        let a = random_scalar(curve, rng);
        mask = curve.scalar_add(&mask, &a);

        let blinded = curve.scalar_mult_base(&a);
        let c = if bit {
            curve.point_add(&blinded, &powers[i])
        } else {
            blinded
        };
        commitment = curve.point_add(&commitment, &c);
        ci[i] = curve.point_to_key(&c);
        shifted.push(curve.point_sub(&c, &powers[i]));
        bit_commitments.push(c);
        secrets.push(a);
        indices.push(bit);
    }

    let asig = generate_borromean(curve, rng, &secrets, &bit_commitments, &shifted, &indices)?;
    Ok((curve.point_to_key(&commitment), mask, RangeSig { asig, ci }))
}

/// Verifies that `commitment` hides a 64-bit value.
pub fn verify_range<C: Curve>(curve: &C, commitment: &Key, sig: &RangeSig) -> bool {
    let commitment = match curve.point_from_key(commitment) {
        Some(point) => point,
        None => return false,
    };
    let powers = h_powers(curve);

    let mut sum = curve.identity();
    let mut bit_commitments = Vec::with_capacity(BITS);
    let mut shifted = Vec::with_capacity(BITS);
    for (ci, power) in sig.ci.iter().zip(&powers) {
        let point = match curve.point_from_key(ci) {
            Some(point) => point,
            None => return false,
        };
        sum = curve.point_add(&sum, &point);
        shifted.push(curve.point_sub(&point, power));
        bit_commitments.push(point);
    }

    if curve.point_to_key(&sum) != curve.point_to_key(&commitment) {
        debug!("bit commitments do not sum up to the output commitment");
        return false;
    }
    verify_borromean(curve, &sig.asig, &bit_commitments, &shifted)
}

#[cfg(test)]
use rand::{rngs::StdRng, SeedableRng};
#[cfg(test)]
use crypto::Ed25519;

#[test]
fn commitments_are_homomorphic() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([1; 32]);
    let mask1 = random_scalar(&curve, &mut rng);
    let mask2 = random_scalar(&curve, &mut rng);

    let sum = curve.point_add(&commit(&curve, 100, &mask1), &commit(&curve, 200, &mask2));
    assert_eq!(sum, commit(&curve, 300, &curve.scalar_add(&mask1, &mask2)));

    let fee = commit_to_fee(&curve, 300);
    let zero = curve.scalar_from_u64(0);
    assert_eq!(fee, commit(&curve, 300, &zero));
}

#[test]
fn range_proof_roundtrip() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([2; 32]);
    for &amount in &[0, 1, 1_234_567, u64::max_value()] {
        let (commitment, mask, proof) = prove_range(&curve, &mut rng, amount).unwrap();
        assert_eq!(
            commitment,
            curve.point_to_key(&commit(&curve, amount, &mask))
        );
        assert!(verify_range(&curve, &commitment, &proof));
    }
}

#[test]
fn range_proof_is_bound_to_its_commitment() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([3; 32]);
    let (commitment, _, proof) = prove_range(&curve, &mut rng, 500).unwrap();
    let (other_commitment, _, other_proof) = prove_range(&curve, &mut rng, 500).unwrap();

    assert!(!verify_range(&curve, &other_commitment, &proof));
    assert!(!verify_range(&curve, &commitment, &other_proof));

    let mut tampered = proof.clone();
    tampered.asig.s1[17].0[0] ^= 1;
    assert!(!verify_range(&curve, &commitment, &tampered));

    let mut tampered = proof.clone();
    tampered.asig.ee.0[3] ^= 1;
    assert!(!verify_range(&curve, &commitment, &tampered));

    // Swapping two bit commitments keeps the sum but breaks the rings.
    let mut tampered = proof;
    tampered.ci.swap(0, 1);
    assert!(!verify_range(&curve, &commitment, &tampered));
}

#[test]
fn borromean_requires_full_rings() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([4; 32]);
    let err = generate_borromean(&curve, &mut rng, &[], &[], &[], &[]).unwrap_err();
    assert_eq!(err, Error::shape("borromean secrets", 64, 0));
}
