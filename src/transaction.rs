//! Transactions, their wire format and hashes.
//!
//! # Versions
//!
//! - Version 1 transactions carry plain amounts and one [ring signature] per input.
//!   Their hash is the hash of the whole serialization.
//! - Version 2 transactions carry a [RingCT signature]. Their hash is
//!   `H(H(prefix) ‖ H(RingCT base) ‖ H(RingCT prunable))`, so the prunable part can
//!   be dropped from storage once its hash is recorded.
//!
//! # Expansion
//!
//! The wire format of a RingCT signature omits everything that can be restored from
//! the blockchain: the ring members, output keys, key images and the signed message.
//! A parsed version 2 transaction must be [expanded](Transaction::expand) with the ring
//! members looked up by the caller before it can be verified.
//!
//! [ring signature]: ::ring_signature
//! [RingCT signature]: ::ringct

use crypto::{hash256, Curve, Hash, Key, KeyImage, KEY_LEN};
use encoding::{varint, ParseLimits, Reader};
use error::{Error, Result};
use ring_signature::{verify_signature, RingSignature};
use ringct::{CtKey, RctSig, RctType};

const GEN_TAG: u8 = 0xff;
const TO_SCRIPT_TAG: u8 = 0;
const TO_SCRIPT_HASH_TAG: u8 = 1;
const TO_KEY_TAG: u8 = 2;

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxIn {
    /// Coinbase input creating the block reward.
    Gen { height: u64 },
    /// Spend of one output hidden in a ring of outputs with the same amount.
    ToKey {
        amount: u64,
        /// Global output indices of the ring members; each offset is relative to
        /// the previous one.
        key_offsets: Vec<u64>,
        key_image: KeyImage,
    },
}

impl TxIn {
    /// Number of ring members.
    pub fn ring_size(&self) -> usize {
        match *self {
            TxIn::Gen { .. } => 0,
            TxIn::ToKey {
                ref key_offsets, ..
            } => key_offsets.len(),
        }
    }

    pub fn key_image(&self) -> Option<&KeyImage> {
        match *self {
            TxIn::Gen { .. } => None,
            TxIn::ToKey { ref key_image, .. } => Some(key_image),
        }
    }

    fn serialize_into(&self, buffer: &mut Vec<u8>) {
        match *self {
            TxIn::Gen { height } => {
                buffer.push(GEN_TAG);
                varint::write_varint(buffer, height);
            }
            TxIn::ToKey {
                amount,
                ref key_offsets,
                ref key_image,
            } => {
                buffer.push(TO_KEY_TAG);
                varint::write_varint(buffer, amount);
                varint::write_varint(buffer, key_offsets.len() as u64);
                for &offset in key_offsets {
                    varint::write_varint(buffer, offset);
                }
                buffer.extend_from_slice(key_image.as_ref());
            }
        }
    }

    fn parse(reader: &mut Reader, limits: &ParseLimits) -> Result<Self> {
        match reader.read_byte("input tag")? {
            GEN_TAG => Ok(TxIn::Gen {
                height: reader.read_varint("coinbase height")?,
            }),
            TO_SCRIPT_TAG => Err(Error::Unimplemented("script inputs")),
            TO_SCRIPT_HASH_TAG => Err(Error::Unimplemented("script hash inputs")),
            TO_KEY_TAG => {
                let amount = reader.read_varint("input amount")?;
                let count = reader.read_count("key offsets", limits.max_ring_size, 1)?;
                let mut key_offsets = Vec::with_capacity(count);
                for _ in 0..count {
                    key_offsets.push(reader.read_varint("key offset")?);
                }
                Ok(TxIn::ToKey {
                    amount,
                    key_offsets,
                    key_image: reader.read_key("key image")?,
                })
            }
            tag => Err(Error::UnknownTag {
                field: "input",
                tag,
            }),
        }
    }
}

/// Transaction output paying `amount` to a one-time key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOut {
    /// Zero for RingCT outputs, whose amounts are hidden in commitments.
    pub amount: u64,
    pub key: Key,
}

impl TxOut {
    fn serialize_into(&self, buffer: &mut Vec<u8>) {
        varint::write_varint(buffer, self.amount);
        buffer.push(TO_KEY_TAG);
        buffer.extend_from_slice(self.key.as_ref());
    }

    fn parse(reader: &mut Reader) -> Result<Self> {
        let amount = reader.read_varint("output amount")?;
        match reader.read_byte("output tag")? {
            TO_KEY_TAG => Ok(TxOut {
                amount,
                key: reader.read_key("output key")?,
            }),
            TO_SCRIPT_TAG => Err(Error::Unimplemented("script outputs")),
            TO_SCRIPT_HASH_TAG => Err(Error::Unimplemented("script hash outputs")),
            tag => Err(Error::UnknownTag {
                field: "output",
                tag,
            }),
        }
    }
}

/// Part of a transaction that is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPrefix {
    pub version: u64,
    /// Block height or timestamp before which the outputs cannot be spent.
    pub unlock_time: u64,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    /// Free-form data, such as the transaction public key.
    pub extra: Vec<u8>,
}

impl TransactionPrefix {
    pub fn serialize_into(&self, buffer: &mut Vec<u8>) {
        varint::write_varint(buffer, self.version);
        varint::write_varint(buffer, self.unlock_time);
        varint::write_varint(buffer, self.inputs.len() as u64);
        for input in &self.inputs {
            input.serialize_into(buffer);
        }
        varint::write_varint(buffer, self.outputs.len() as u64);
        for output in &self.outputs {
            output.serialize_into(buffer);
        }
        varint::write_varint(buffer, self.extra.len() as u64);
        buffer.extend_from_slice(&self.extra);
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.serialize_into(&mut buffer);
        buffer
    }

    /// Hash signed by ring signatures and used as the RingCT message.
    pub fn hash(&self) -> Hash {
        hash256(&[&self.serialize()[..]])
    }

    /// Sum of the plain output amounts, or `None` on overflow.
    pub fn output_sum(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0_u64, |sum, output| sum.checked_add(output.amount))
    }

    fn parse(reader: &mut Reader, limits: &ParseLimits) -> Result<Self> {
        let version = reader.read_varint("version")?;
        let unlock_time = reader.read_varint("unlock time")?;

        // Smallest input is a tag and a one-byte varint.
        let input_count = reader.read_count("inputs", limits.max_inputs, 2)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TxIn::parse(reader, limits)?);
        }

        let output_count = reader.read_count("outputs", limits.max_outputs, 2 + KEY_LEN)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TxOut::parse(reader)?);
        }

        let extra_len = reader.read_count("extra", limits.max_extra_len, 1)?;
        let extra = reader.read_bytes(extra_len, "extra")?.to_vec();
        trace!(
            "parsed prefix: version {}, {} inputs, {} outputs, {} bytes of extra",
            version,
            inputs.len(),
            outputs.len(),
            extra.len()
        );

        Ok(TransactionPrefix {
            version,
            unlock_time,
            inputs,
            outputs,
            extra,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Signatures {
    Ring(Vec<RingSignature>),
    RingCt(RctSig),
}

/// Whether the data omitted from the wire format has been restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Parsed,
    Expanded,
}

/// Complete transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    prefix: TransactionPrefix,
    signatures: Signatures,
    state: TransactionState,
}

impl Transaction {
    /// Creates a version 1 transaction. `signatures` must hold one signature per input,
    /// sized to the input ring.
    pub fn new_v1(prefix: TransactionPrefix, signatures: Vec<RingSignature>) -> Result<Self> {
        if prefix.version != 1 {
            return Err(Error::InvalidArgument("ring signatures need a version 1 prefix"));
        }
        if signatures.len() != prefix.inputs.len() {
            return Err(Error::shape(
                "ring signatures",
                prefix.inputs.len(),
                signatures.len(),
            ));
        }
        for (input, signature) in prefix.inputs.iter().zip(&signatures) {
            if input.ring_size() != signature.len() {
                return Err(Error::shape("ring signature", input.ring_size(), signature.len()));
            }
        }
        Ok(Transaction {
            prefix,
            signatures: Signatures::Ring(signatures),
            state: TransactionState::Parsed,
        })
    }

    /// Creates a RingCT transaction. It has to be [expanded](Transaction::expand)
    /// before verification, like a parsed one.
    pub fn new_rct(prefix: TransactionPrefix, signature: RctSig) -> Result<Self> {
        if prefix.version < 2 {
            return Err(Error::InvalidArgument("RingCT needs a version 2 prefix"));
        }
        if signature.rct_type() != RctType::Null
            && signature.base.out_pk.len() != prefix.outputs.len()
        {
            return Err(Error::shape(
                "output commitments",
                prefix.outputs.len(),
                signature.base.out_pk.len(),
            ));
        }
        if signature.rct_type() != RctType::Null {
            uniform_mixin(&prefix.inputs)?;
        }
        Ok(Transaction {
            prefix,
            signatures: Signatures::RingCt(signature),
            state: TransactionState::Parsed,
        })
    }

    pub fn prefix(&self) -> &TransactionPrefix {
        &self.prefix
    }

    pub fn version(&self) -> u64 {
        self.prefix.version
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Ring signatures of a version 1 transaction.
    pub fn ring_signatures(&self) -> Option<&[RingSignature]> {
        match self.signatures {
            Signatures::Ring(ref signatures) => Some(signatures),
            Signatures::RingCt(_) => None,
        }
    }

    /// RingCT signature of a version 2 transaction.
    pub fn rct_signature(&self) -> Option<&RctSig> {
        match self.signatures {
            Signatures::Ring(_) => None,
            Signatures::RingCt(ref signature) => Some(signature),
        }
    }

    pub fn serialize_into(&self, buffer: &mut Vec<u8>) {
        self.prefix.serialize_into(buffer);
        match self.signatures {
            Signatures::Ring(ref signatures) => {
                for signature in signatures {
                    signature.serialize_into(buffer);
                }
            }
            Signatures::RingCt(ref signature) => {
                signature.serialize_base_into(buffer);
                signature.serialize_prunable_into(buffer);
            }
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.serialize_into(&mut buffer);
        buffer
    }

    /// Transaction hash (identifier).
    pub fn hash(&self) -> Hash {
        match self.signatures {
            Signatures::Ring(_) => hash256(&[&self.serialize()[..]]),
            Signatures::RingCt(ref signature) => {
                let prefix_hash = self.prefix.hash();
                let base_hash = signature.base_hash();
                let prunable_hash = signature.prunable_hash();
                hash256(&[&prefix_hash.0[..], &base_hash.0[..], &prunable_hash.0[..]])
            }
        }
    }

    /// Parses a transaction with the default [`ParseLimits`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_with_limits(bytes, &ParseLimits::default())
    }

    /// Parses a transaction. The input must be consumed exactly.
    pub fn parse_with_limits(bytes: &[u8], limits: &ParseLimits) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let prefix = TransactionPrefix::parse(&mut reader, limits)?;

        let signatures = match prefix.version {
            0 => return Err(Error::Unimplemented("transaction version 0")),
            1 => {
                let mut signatures = Vec::with_capacity(prefix.inputs.len());
                for input in &prefix.inputs {
                    signatures.push(RingSignature::parse(&mut reader, input.ring_size())?);
                }
                Signatures::Ring(signatures)
            }
            _ => {
                let mixin = uniform_mixin(&prefix.inputs)?;
                let signature = RctSig::parse(
                    &mut reader,
                    prefix.inputs.len(),
                    prefix.outputs.len(),
                    mixin,
                )?;
                Signatures::RingCt(signature)
            }
        };
        reader.finish()?;

        Ok(Transaction {
            prefix,
            signatures,
            state: TransactionState::Parsed,
        })
    }

    /// Restores the RingCT data omitted from the wire format.
    ///
    /// `output_keys[i]` holds the ring members of input `i`, in the order given by its
    /// key offsets: the destination key and commitment of each referenced output.
    /// Does nothing besides changing the state for version 1 transactions and `Null`
    /// signatures.
    pub fn expand(&mut self, output_keys: &[Vec<CtKey>]) -> Result<()> {
        let message = Key::from(self.prefix.hash());
        let prefix = &self.prefix;
        let signature = match self.signatures {
            Signatures::RingCt(ref mut signature) => signature,
            Signatures::Ring(_) => {
                self.state = TransactionState::Expanded;
                return Ok(());
            }
        };
        if signature.rct_type() == RctType::Null {
            self.state = TransactionState::Expanded;
            return Ok(());
        }

        let mut key_images = Vec::with_capacity(prefix.inputs.len());
        for input in &prefix.inputs {
            match input.key_image() {
                Some(key_image) => key_images.push(*key_image),
                None => {
                    return Err(Error::InvalidArgument(
                        "RingCT signature over a coinbase input",
                    ))
                }
            }
        }
        uniform_mixin(&prefix.inputs)?;
        if output_keys.len() != prefix.inputs.len() {
            return Err(Error::shape("output keys", prefix.inputs.len(), output_keys.len()));
        }
        for (input, ring) in prefix.inputs.iter().zip(output_keys) {
            if ring.len() != input.ring_size() {
                return Err(Error::shape("ring of output keys", input.ring_size(), ring.len()));
            }
        }
        if signature.base.out_pk.len() != prefix.outputs.len() {
            return Err(Error::shape(
                "output commitments",
                prefix.outputs.len(),
                signature.base.out_pk.len(),
            ));
        }

        let mgs = &mut signature.prunable.mgs;
        match signature.base.rct_type {
            RctType::Full => {
                if mgs.len() != 1 {
                    return Err(Error::shape("MLSAG signatures", 1, mgs.len()));
                }
                let ring_size = output_keys.first().map(Vec::len).unwrap_or(0);
                signature.base.mix_ring = (0..ring_size)
                    .map(|member| output_keys.iter().map(|ring| ring[member]).collect())
                    .collect();
                mgs[0].ii = key_images;
            }
            _ => {
                if mgs.len() != key_images.len() {
                    return Err(Error::shape("MLSAG signatures", key_images.len(), mgs.len()));
                }
                signature.base.mix_ring = output_keys.to_vec();
                for (mg, key_image) in mgs.iter_mut().zip(key_images) {
                    mg.ii = vec![key_image];
                }
            }
        }

        for (out_pk, output) in signature.base.out_pk.iter_mut().zip(&prefix.outputs) {
            out_pk.dest = output.key;
        }
        signature.base.message = message;
        self.state = TransactionState::Expanded;
        Ok(())
    }

    /// Verifies the ring signatures of a version 1 transaction.
    ///
    /// `ring_public_keys[i]` are the public keys of the outputs referenced by input `i`;
    /// entries for coinbase inputs are ignored.
    pub fn verify_ring_signatures<C: Curve>(
        &self,
        curve: &C,
        ring_public_keys: &[Vec<Key>],
    ) -> Result<bool> {
        let signatures = self
            .ring_signatures()
            .ok_or(Error::InvalidArgument("not a version 1 transaction"))?;
        if ring_public_keys.len() != self.prefix.inputs.len() {
            return Err(Error::shape(
                "ring public keys",
                self.prefix.inputs.len(),
                ring_public_keys.len(),
            ));
        }

        let prefix_hash = self.prefix.hash();
        for (i, input) in self.prefix.inputs.iter().enumerate() {
            let key_image = match input.key_image() {
                Some(key_image) => key_image,
                None => continue,
            };
            if !verify_signature(
                curve,
                &prefix_hash,
                key_image,
                &ring_public_keys[i],
                &signatures[i],
            ) {
                debug!("ring signature of input {} is invalid", i);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Verifies the RingCT signature of an expanded version 2 transaction.
    pub fn verify_rct<C: Curve>(&self, curve: &C) -> Result<bool> {
        let signature = self
            .rct_signature()
            .ok_or(Error::InvalidArgument("not a RingCT transaction"))?;
        if signature.rct_type() == RctType::Null {
            return Ok(true);
        }
        if self.state != TransactionState::Expanded {
            return Err(Error::NotExpanded);
        }
        signature.verify(curve)
    }
}

/// Mixin count shared by all inputs of a RingCT transaction.
fn uniform_mixin(inputs: &[TxIn]) -> Result<usize> {
    let mut ring_sizes = inputs
        .iter()
        .filter(|input| input.key_image().is_some())
        .map(TxIn::ring_size);
    let ring_size = match ring_sizes.next() {
        Some(ring_size) => ring_size,
        None => return Ok(0),
    };
    for other in ring_sizes {
        if other != ring_size {
            return Err(Error::InconsistentRingSize {
                expected: ring_size,
                actual: other,
            });
        }
    }
    Ok(ring_size.saturating_sub(1))
}
