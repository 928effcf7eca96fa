//! Signature schemes instantiated with a toy group instead of Ed25519.
//!
//! The group is `Z_q` under addition with `q = 2^61 - 1` and generator `1`. Discrete
//! logarithms are trivial in it, but the protocols only rely on the group laws for
//! their correctness.

extern crate rand;
extern crate ringct;

use rand::{rngs::StdRng, SeedableRng};
use ringct::{
    crypto::{generate_keys, hash256, random_scalar, Curve, Key},
    create_signature, key_image,
    ringct::{
        mlsag,
        range_proof::{prove_range, verify_range},
        CtKey, InputSecret, OutputSpec,
    },
    verify_signature, RctSig,
};

const Q: u64 = (1 << 61) - 1;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ToyScalar(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct ToyPoint(u64);

#[derive(Debug, Clone, Copy, Default)]
struct ToyGroup;

fn add(a: u64, b: u64) -> u64 {
    (a + b) % Q
}

fn sub(a: u64, b: u64) -> u64 {
    (a + Q - b) % Q
}

fn mul(a: u64, b: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(Q)) as u64
}

fn reduce(bytes: &[u8]) -> u64 {
    bytes.iter().rev().fold(0, |acc, &byte| {
        ((u128::from(acc) * 256 + u128::from(byte)) % u128::from(Q)) as u64
    })
}

fn to_key(value: u64) -> Key {
    let mut key = Key::zero();
    key.0[..8].copy_from_slice(&value.to_le_bytes());
    key
}

fn from_key(key: &Key) -> Option<u64> {
    if key.0[8..].iter().any(|&byte| byte != 0) {
        return None;
    }
    let mut low = [0_u8; 8];
    low.copy_from_slice(&key.0[..8]);
    let value = u64::from_le_bytes(low);
    if value < Q {
        Some(value)
    } else {
        None
    }
}

impl Curve for ToyGroup {
    type Scalar = ToyScalar;
    type Point = ToyPoint;

    fn scalar_reduce(&self, wide: &[u8; 64]) -> ToyScalar {
        ToyScalar(reduce(wide))
    }

    fn scalar_reduce32(&self, bytes: &[u8; 32]) -> ToyScalar {
        ToyScalar(reduce(bytes))
    }

    fn scalar_from_canonical(&self, key: &Key) -> Option<ToyScalar> {
        from_key(key).map(ToyScalar)
    }

    fn scalar_from_u64(&self, value: u64) -> ToyScalar {
        ToyScalar(value % Q)
    }

    fn scalar_to_key(&self, scalar: &ToyScalar) -> Key {
        to_key(scalar.0)
    }

    fn scalar_add(&self, a: &ToyScalar, b: &ToyScalar) -> ToyScalar {
        ToyScalar(add(a.0, b.0))
    }

    fn scalar_sub(&self, a: &ToyScalar, b: &ToyScalar) -> ToyScalar {
        ToyScalar(sub(a.0, b.0))
    }

    fn scalar_mul_sub(&self, a: &ToyScalar, b: &ToyScalar, c: &ToyScalar) -> ToyScalar {
        ToyScalar(sub(c.0, mul(a.0, b.0)))
    }

    fn scalar_is_zero(&self, scalar: &ToyScalar) -> bool {
        scalar.0 == 0
    }

    fn point_from_key(&self, key: &Key) -> Option<ToyPoint> {
        from_key(key).map(ToyPoint)
    }

    fn point_to_key(&self, point: &ToyPoint) -> Key {
        to_key(point.0)
    }

    fn point_from_hash(&self, hash: &[u8; 32]) -> ToyPoint {
        ToyPoint(reduce(hash))
    }

    fn identity(&self) -> ToyPoint {
        ToyPoint(0)
    }

    fn amount_generator(&self) -> ToyPoint {
        ToyPoint(0x1234_5678_9abc_def0 % Q)
    }

    fn scalar_mult_base(&self, scalar: &ToyScalar) -> ToyPoint {
        ToyPoint(scalar.0)
    }

    fn scalar_mult(&self, scalar: &ToyScalar, point: &ToyPoint) -> ToyPoint {
        ToyPoint(mul(scalar.0, point.0))
    }

    fn double_scalar_mult_base(&self, a: &ToyScalar, big_a: &ToyPoint, b: &ToyScalar) -> ToyPoint {
        ToyPoint(add(mul(a.0, big_a.0), b.0))
    }

    fn double_scalar_mult(
        &self,
        a: &ToyScalar,
        big_a: &ToyPoint,
        b: &ToyScalar,
        big_b: &ToyPoint,
    ) -> ToyPoint {
        ToyPoint(add(mul(a.0, big_a.0), mul(b.0, big_b.0)))
    }

    fn point_add(&self, a: &ToyPoint, b: &ToyPoint) -> ToyPoint {
        ToyPoint(add(a.0, b.0))
    }

    fn point_sub(&self, a: &ToyPoint, b: &ToyPoint) -> ToyPoint {
        ToyPoint(sub(a.0, b.0))
    }

    fn mul_by_cofactor(&self, point: &ToyPoint) -> ToyPoint {
        *point
    }
}

#[test]
fn ring_signatures_over_toy_group() {
    let curve = ToyGroup;
    let mut rng = StdRng::from_seed([41; 32]);
    let prefix_hash = hash256(&[&b"toy prefix"[..]]);
    let (secret, _) = generate_keys(&curve, &mut rng);
    let mixins: Vec<_> = (0..4).map(|_| generate_keys(&curve, &mut rng).1).collect();

    let signed = create_signature(&curve, &mut rng, &prefix_hash, &mixins, &secret).unwrap();
    assert_eq!(signed.key_image, key_image(&curve, &secret));
    assert_eq!(signed.public_keys.len(), 5);
    assert!(verify_signature(
        &curve,
        &prefix_hash,
        &signed.key_image,
        &signed.public_keys,
        &signed.signature,
    ));

    let other_hash = hash256(&[&b"other prefix"[..]]);
    assert!(!verify_signature(
        &curve,
        &other_hash,
        &signed.key_image,
        &signed.public_keys,
        &signed.signature,
    ));

    let mut forged = signed.signature.clone();
    forged.elements[2].r = to_key(add(from_key(&forged.elements[2].r).unwrap(), 1));
    assert!(!verify_signature(
        &curve,
        &prefix_hash,
        &signed.key_image,
        &signed.public_keys,
        &forged,
    ));
}

#[test]
fn non_canonical_encodings_are_rejected() {
    let curve = ToyGroup;
    let mut rng = StdRng::from_seed([42; 32]);
    let prefix_hash = hash256(&[&b"toy prefix"[..]]);
    let (secret, _) = generate_keys(&curve, &mut rng);
    let signed = create_signature(&curve, &mut rng, &prefix_hash, &[], &secret).unwrap();

    let mut forged = signed.signature.clone();
    forged.elements[0].c = to_key(Q);
    assert!(!verify_signature(
        &curve,
        &prefix_hash,
        &signed.key_image,
        &signed.public_keys,
        &forged,
    ));
}

#[test]
fn range_proofs_over_toy_group() {
    let curve = ToyGroup;
    let mut rng = StdRng::from_seed([43; 32]);
    for &amount in &[0, 77, 1 << 40] {
        let (commitment, _, proof) = prove_range(&curve, &mut rng, amount).unwrap();
        assert!(verify_range(&curve, &commitment, &proof));
        let shifted = to_key(add(from_key(&commitment).unwrap(), 1));
        assert!(!verify_range(&curve, &shifted, &proof));
    }
}

#[test]
fn mlsag_over_toy_group() {
    let curve = ToyGroup;
    let mut rng = StdRng::from_seed([44; 32]);
    let message = Key([3; 32]);
    let mut matrix = Vec::new();
    let mut secrets = Vec::new();
    for _ in 0..3 {
        let (column_secrets, column): (Vec<_>, Vec<_>) =
            (0..2).map(|_| generate_keys(&curve, &mut rng)).unzip();
        matrix.push(column);
        secrets.push(column_secrets);
    }

    let sig = mlsag::generate(&curve, &mut rng, &message, &matrix, &secrets[1], 1, 1).unwrap();
    assert!(mlsag::verify(&curve, &message, &matrix, &sig, 1));
    assert!(!mlsag::verify(&curve, &Key([4; 32]), &matrix, &sig, 1));
}

#[test]
fn simple_rct_over_toy_group() {
    let curve = ToyGroup;
    let mut rng = StdRng::from_seed([45; 32]);
    let mut rings = Vec::new();
    let mut inputs = Vec::new();
    for &amount in &[30, 12] {
        let (secret_key, dest) = generate_keys(&curve, &mut rng);
        let mask = random_scalar(&curve, &mut rng);
        let commitment = curve.point_to_key(&ringct::ringct::range_proof::commit(&curve, amount, &mask));
        let mut ring: Vec<_> = (0..2)
            .map(|_| CtKey {
                dest: generate_keys(&curve, &mut rng).1,
                mask: generate_keys(&curve, &mut rng).1,
            }).collect();
        ring.push(CtKey {
            dest,
            mask: commitment,
        });
        rings.push(ring);
        inputs.push(InputSecret {
            secret_key,
            mask,
            amount,
        });
    }
    let outputs = [
        OutputSpec {
            destination: to_key(5),
            amount: 40,
            shared_secret: Key([1; 32]),
        },
    ];

    let sig = RctSig::generate_simple(
        &curve,
        &mut rng,
        &Key([2; 32]),
        rings,
        &[2, 2],
        &inputs,
        &outputs,
        2,
    ).unwrap();
    assert_eq!(sig.verify(&curve), Ok(true));
    assert_eq!(sig.decode_output(&curve, 0, &Key([1; 32])).map(|(amount, _)| amount), Ok(40));

    let mut unbalanced = sig.clone();
    unbalanced.base.txn_fee = 3;
    assert_eq!(unbalanced.verify(&curve), Ok(false));
}
