//! Masking of output amounts and blinding factors for the recipient.
//!
//! Both values are offset by scalars derived from a 32-byte secret shared between the
//! sender and the recipient: `mask + Hs(s)` and `amount + Hs(Hs(s))`. How the secret is
//! agreed upon is up to the caller.

use byteorder::{ByteOrder, LittleEndian};

use crypto::{hash_to_scalar, Curve, Key};
use error::{Error, Result};

/// Masked amount and blinding factor of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EcdhTuple {
    pub mask: Key,
    pub amount: Key,
    /// Not part of the wire format.
    pub sender_pk: Key,
}

fn offsets<C: Curve>(curve: &C, shared_secret: &Key) -> (C::Scalar, C::Scalar) {
    let mask_offset = hash_to_scalar(curve, &[&shared_secret.0[..]]);
    let amount_offset = hash_to_scalar(curve, &[&curve.scalar_to_key(&mask_offset).0[..]]);
    (mask_offset, amount_offset)
}

impl EcdhTuple {
    pub fn encode<C: Curve>(curve: &C, mask: &C::Scalar, amount: u64, shared_secret: &Key) -> Self {
        let (mask_offset, amount_offset) = offsets(curve, shared_secret);
        let amount = curve.scalar_from_u64(amount);
        EcdhTuple {
            mask: curve.scalar_to_key(&curve.scalar_add(mask, &mask_offset)),
            amount: curve.scalar_to_key(&curve.scalar_add(&amount, &amount_offset)),
            sender_pk: Key::zero(),
        }
    }

    /// Recovers `(amount, mask)`.
    ///
    /// Fails if the unmasked amount does not fit into 64 bits, which is what a wrong
    /// shared secret almost always produces. A correct-looking result still has to be
    /// checked against the output commitment.
    pub fn decode<C: Curve>(&self, curve: &C, shared_secret: &Key) -> Result<(u64, C::Scalar)> {
        let (mask_offset, amount_offset) = offsets(curve, shared_secret);
        let mask = curve
            .scalar_from_canonical(&self.mask)
            .ok_or(Error::InvalidScalar { field: "ecdh mask" })?;
        let amount = curve
            .scalar_from_canonical(&self.amount)
            .ok_or(Error::InvalidScalar {
                field: "ecdh amount",
            })?;

        let amount = curve.scalar_to_key(&curve.scalar_sub(&amount, &amount_offset));
        if amount.0[8..].iter().any(|&byte| byte != 0) {
            return Err(Error::Overflow {
                field: "ecdh amount",
            });
        }
        Ok((
            LittleEndian::read_u64(&amount.0[..8]),
            curve.scalar_sub(&mask, &mask_offset),
        ))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crypto::{random_scalar, Ed25519};

    #[test]
    fn masked_values_are_recovered() {
        let curve = Ed25519;
        let mut rng = StdRng::from_seed([21; 32]);
        let mask = random_scalar(&curve, &mut rng);
        let secret = Key([0x5a; 32]);

        let tuple = EcdhTuple::encode(&curve, &mask, 1_000_000_000_000, &secret);
        assert_ne!(tuple.mask, curve.scalar_to_key(&mask));
        assert_eq!(
            tuple.decode(&curve, &secret),
            Ok((1_000_000_000_000, mask))
        );
    }

    #[test]
    fn wrong_secret_overflows_the_amount() {
        let curve = Ed25519;
        let mask = curve.scalar_from_u64(9);
        let tuple = EcdhTuple::encode(&curve, &mask, 42, &Key([1; 32]));
        assert_eq!(
            tuple.decode(&curve, &Key([2; 32])),
            Err(Error::Overflow {
                field: "ecdh amount",
            })
        );
    }

    #[test]
    fn non_canonical_fields_are_rejected() {
        let curve = Ed25519;
        let mut tuple = EcdhTuple::encode(&curve, &curve.scalar_from_u64(1), 1, &Key::zero());
        tuple.mask = Key([0xff; 32]);
        assert_eq!(
            tuple.decode(&curve, &Key::zero()),
            Err(Error::InvalidScalar { field: "ecdh mask" })
        );
    }
}
