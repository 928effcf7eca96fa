//! Linkable ring signatures used by version 1 transactions.
//!
//! A signature over a ring of `n` public keys consists of `n` pairs `(c_i, r_i)`. For
//! every ring member the verifier recomputes
//!
//! ```text
//! L_i = r_i * G + c_i * P_i
//! R_i = r_i * Hp(P_i) + c_i * I
//! ```
//!
//! and accepts if `Hs(prefix_hash ‖ L_0 ‖ R_0 ‖ ... ‖ L_n ‖ R_n) = Σ c_i`. Here `I` is the
//! key image `x * Hp(x * G)` of the signer's secret `x`. Two signatures made with the
//! same secret share a key image, which is how double spends are detected.

use rand::{CryptoRng, Rng, RngCore};

use crypto::{hash_to_point, hash_to_scalar, public_key, random_scalar, Curve, Hash, Key, KeyImage};
use encoding::Reader;
use error::{Error, Result};

/// Challenge and response for a single ring member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingSignatureElement {
    pub c: Key,
    pub r: Key,
}

impl RingSignatureElement {
    pub const BYTE_LEN: usize = 64;
}

/// Signature of one input; one element per ring member, in ring order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RingSignature {
    pub elements: Vec<RingSignatureElement>,
}

impl RingSignature {
    pub fn new(elements: Vec<RingSignatureElement>) -> Self {
        RingSignature { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn serialize_into(&self, buffer: &mut Vec<u8>) {
        for element in &self.elements {
            buffer.extend_from_slice(element.c.as_ref());
            buffer.extend_from_slice(element.r.as_ref());
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.len() * RingSignatureElement::BYTE_LEN);
        self.serialize_into(&mut buffer);
        buffer
    }

    /// Reads a signature for a ring of `ring_size` members.
    pub fn parse(reader: &mut Reader, ring_size: usize) -> Result<Self> {
        if ring_size.saturating_mul(RingSignatureElement::BYTE_LEN) > reader.remaining() {
            return Err(Error::Truncated {
                field: "ring signature",
            });
        }
        let mut elements = Vec::with_capacity(ring_size);
        for _ in 0..ring_size {
            let c = reader.read_key("ring signature c")?;
            let r = reader.read_key("ring signature r")?;
            elements.push(RingSignatureElement { c, r });
        }
        Ok(RingSignature { elements })
    }
}

/// Output of [`create_signature`].
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRing {
    pub key_image: KeyImage,
    /// Mixins with the signer's public key inserted at a random position.
    pub public_keys: Vec<Key>,
    pub signature: RingSignature,
}

/// Computes the key image `secret * Hp(secret * G)`.
pub fn key_image<C: Curve>(curve: &C, secret: &C::Scalar) -> KeyImage {
    let public = public_key(curve, secret);
    curve.point_to_key(&curve.scalar_mult(secret, &hash_to_point(curve, &public)))
}

/// Signs `prefix_hash` with `secret`, hiding the signer among `mixins`.
///
/// The signer's public key is inserted into the ring at a uniformly random position.
/// Fails if a mixin is not a valid point.
pub fn create_signature<C, R>(
    curve: &C,
    rng: &mut R,
    prefix_hash: &Hash,
    mixins: &[Key],
    secret: &C::Scalar,
) -> Result<SignedRing>
where
    C: Curve,
    R: RngCore + CryptoRng,
{
    let signer_public = public_key(curve, secret);
    let key_image = key_image(curve, secret);
    let image_point = curve
        .point_from_key(&key_image)
        .ok_or(Error::InvalidPoint { field: "key image" })?;

    let ring_size = mixins.len() + 1;
    let signer_index = rng.gen_range(0, ring_size);
    let mut public_keys = Vec::with_capacity(ring_size);
    public_keys.extend_from_slice(&mixins[..signer_index]);
    public_keys.push(signer_public);
    public_keys.extend_from_slice(&mixins[signer_index..]);

    let nonce = random_scalar(curve, rng);
    let mut to_hash = Vec::with_capacity(32 + 64 * ring_size);
    to_hash.extend_from_slice(prefix_hash.as_ref());
    let mut sum = curve.scalar_from_u64(0);
    let mut decoy_scalars = Vec::with_capacity(ring_size);

    for (i, public) in public_keys.iter().enumerate() {
        let hp = hash_to_point(curve, public);
        let (l, r) = if i == signer_index {
            decoy_scalars.push(None);
            (
                curve.scalar_mult_base(&nonce),
                curve.scalar_mult(&nonce, &hp),
            )
        } else {
            let point = curve
                .point_from_key(public)
                .ok_or(Error::InvalidPoint {
                    field: "mixin public key",
                })?;
            let c = random_scalar(curve, rng);
            let r = random_scalar(curve, rng);
            let l = curve.double_scalar_mult_base(&c, &point, &r);
            let r_point = curve.double_scalar_mult(&r, &hp, &c, &image_point);
            sum = curve.scalar_add(&sum, &c);
            decoy_scalars.push(Some((c, r)));
            (l, r_point)
        };
        to_hash.extend_from_slice(curve.point_to_key(&l).as_ref());
        to_hash.extend_from_slice(curve.point_to_key(&r).as_ref());
    }

    let h = hash_to_scalar(curve, &[&to_hash[..]]);
    let signer_c = curve.scalar_sub(&h, &sum);
    let signer_r = curve.scalar_mul_sub(&signer_c, secret, &nonce);

    let elements = decoy_scalars
        .into_iter()
        .map(|scalars| {
            let (c, r) = scalars.unwrap_or_else(|| (signer_c.clone(), signer_r.clone()));
            RingSignatureElement {
                c: curve.scalar_to_key(&c),
                r: curve.scalar_to_key(&r),
            }
        })
        .collect();

    Ok(SignedRing {
        key_image,
        public_keys,
        signature: RingSignature { elements },
    })
}

/// Checks `signature` over `prefix_hash` for the ring `public_keys`.
///
/// Returns `false` for any malformed component: a key image or public key that is not
/// a point, a non-canonical scalar, or a ring whose size differs from the signature.
pub fn verify_signature<C: Curve>(
    curve: &C,
    prefix_hash: &Hash,
    key_image: &KeyImage,
    public_keys: &[Key],
    signature: &RingSignature,
) -> bool {
    if public_keys.len() != signature.len() || public_keys.is_empty() {
        debug!(
            "ring of {} keys does not match signature of {} elements",
            public_keys.len(),
            signature.len()
        );
        return false;
    }
    let image_point = match curve.point_from_key(key_image) {
        Some(point) => point,
        None => {
            debug!("key image {} is not a valid point", key_image);
            return false;
        }
    };

    let mut to_hash = Vec::with_capacity(32 + 64 * public_keys.len());
    to_hash.extend_from_slice(prefix_hash.as_ref());
    let mut sum = curve.scalar_from_u64(0);

    for (i, (public, element)) in public_keys.iter().zip(&signature.elements).enumerate() {
        let (c, r) = match (
            curve.scalar_from_canonical(&element.c),
            curve.scalar_from_canonical(&element.r),
        ) {
            (Some(c), Some(r)) => (c, r),
            _ => {
                debug!("ring member {} has a non-canonical scalar", i);
                return false;
            }
        };
        let point = match curve.point_from_key(public) {
            Some(point) => point,
            None => {
                debug!("ring member {} is not a valid point", i);
                return false;
            }
        };

        let l = curve.double_scalar_mult_base(&c, &point, &r);
        let r_point = curve.double_scalar_mult(&r, &hash_to_point(curve, public), &c, &image_point);
        to_hash.extend_from_slice(curve.point_to_key(&l).as_ref());
        to_hash.extend_from_slice(curve.point_to_key(&r_point).as_ref());
        sum = curve.scalar_add(&sum, &c);
    }

    let h = hash_to_scalar(curve, &[&to_hash[..]]);
    let valid = curve.scalar_is_zero(&curve.scalar_sub(&h, &sum));
    if !valid {
        debug!("ring signature challenge does not close");
    }
    valid
}
