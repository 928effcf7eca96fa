//! Ring confidential transactions.
//!
//! # Commitments
//!
//! Every output carries a Pedersen commitment `mask * G + amount * H` instead of
//! a plain amount, together with a [range proof](range_proof) that the amount
//! fits into 64 bits. The recipient learns the amount and the mask from
//! the [masked tuple](ecdh::EcdhTuple) of the output.
//!
//! # Balance
//!
//! - In a *full* signature, a single [MLSAG](mlsag) proves that for some ring member
//!   the sum of the spent commitments minus the output commitments and the fee
//!   is a commitment to zero.
//! - In a *simple* signature, each input is given a *pseudo output* commitment
//!   to the same amount. The verifier checks that pseudo outputs balance the outputs
//!   plus fee, and each input has its own MLSAG proving that the pseudo output
//!   commits to the amount of some ring member.
//!
//! # Wire format
//!
//! A signature is split into a *base*, which is always kept, and a *prunable* part
//! (range proofs and MLSAGs). The two are hashed separately, so that a transaction hash
//! can be reproduced from the base and the hash of the prunable part. Ring members,
//! output destinations, key images and the signed message are not serialized; they are
//! restored from the enclosing transaction (see
//! [`Transaction::expand`](::transaction::Transaction::expand)).

use rand::{CryptoRng, RngCore};

use crypto::{hash256, random_scalar, Curve, Hash, Key};
use encoding::{varint, Reader};
use error::{Error, Result};

pub mod ecdh;
pub mod mlsag;
pub mod range_proof;

pub use self::ecdh::EcdhTuple;
pub use self::mlsag::MgSig;
pub use self::range_proof::{BoroSig, Key64, RangeSig};

use self::range_proof::{commit, commit_to_fee, prove_range, verify_range};

/// RingCT signature type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RctType {
    /// No confidential data; used by coinbase transactions.
    Null = 0,
    Full = 1,
    Simple = 2,
}

impl RctType {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(RctType::Null),
            1 => Ok(RctType::Full),
            2 => Ok(RctType::Simple),
            tag => Err(Error::UnknownTag {
                field: "RingCT type",
                tag,
            }),
        }
    }
}

/// Destination key paired with the commitment securing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CtKey {
    pub dest: Key,
    pub mask: Key,
}

/// Part of a signature that is never pruned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RctSigBase {
    pub rct_type: RctType,
    /// Prefix hash of the enclosing transaction.
    pub message: Key,
    /// Ring members. Indexed `[member][input]` for full signatures and `[input][member]`
    /// for simple ones.
    pub mix_ring: Vec<Vec<CtKey>>,
    pub pseudo_outs: Vec<Key>,
    pub ecdh_info: Vec<EcdhTuple>,
    pub out_pk: Vec<CtKey>,
    pub txn_fee: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RctSigPrunable {
    pub range_sigs: Vec<RangeSig>,
    pub mgs: Vec<MgSig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RctSig {
    pub base: RctSigBase,
    pub prunable: RctSigPrunable,
}

/// Secret data of a spent output.
#[derive(Debug, Clone)]
pub struct InputSecret<S> {
    /// Discrete logarithm of the output destination.
    pub secret_key: S,
    /// Blinding factor of the output commitment.
    pub mask: S,
    pub amount: u64,
}

/// Output to be created by [`RctSig::generate_full`] or [`RctSig::generate_simple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    pub destination: Key,
    pub amount: u64,
    /// Secret shared with the recipient, used to mask the amount.
    pub shared_secret: Key,
}

fn check_balance<S>(inputs: &[InputSecret<S>], outputs: &[OutputSpec], fee: u64) -> Result<()> {
    let unbalanced = Error::InvalidArgument("input and output amounts do not balance");
    let inputs_sum = inputs
        .iter()
        .try_fold(0_u64, |sum, input| sum.checked_add(input.amount))
        .ok_or_else(|| unbalanced.clone())?;
    let outputs_sum = outputs
        .iter()
        .try_fold(fee, |sum, output| sum.checked_add(output.amount))
        .ok_or_else(|| unbalanced.clone())?;
    if inputs_sum != outputs_sum {
        return Err(unbalanced);
    }
    Ok(())
}

impl RctSig {
    /// Signature of a transaction without confidential data.
    pub fn null() -> Self {
        RctSig {
            base: RctSigBase {
                rct_type: RctType::Null,
                message: Key::zero(),
                mix_ring: Vec::new(),
                pseudo_outs: Vec::new(),
                ecdh_info: Vec::new(),
                out_pk: Vec::new(),
                txn_fee: 0,
            },
            prunable: RctSigPrunable::default(),
        }
    }

    pub fn rct_type(&self) -> RctType {
        self.base.rct_type
    }

    pub fn serialize_base_into(&self, buffer: &mut Vec<u8>) {
        let base = &self.base;
        buffer.push(base.rct_type as u8);
        if base.rct_type == RctType::Null {
            return;
        }
        varint::write_varint(buffer, base.txn_fee);
        if base.rct_type == RctType::Simple {
            for pseudo_out in &base.pseudo_outs {
                buffer.extend_from_slice(pseudo_out.as_ref());
            }
        }
        for ecdh in &base.ecdh_info {
            buffer.extend_from_slice(ecdh.mask.as_ref());
            buffer.extend_from_slice(ecdh.amount.as_ref());
        }
        for out_pk in &base.out_pk {
            buffer.extend_from_slice(out_pk.mask.as_ref());
        }
    }

    pub fn serialize_base(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.serialize_base_into(&mut buffer);
        buffer
    }

    pub fn serialize_prunable_into(&self, buffer: &mut Vec<u8>) {
        if self.base.rct_type == RctType::Null {
            return;
        }
        for range_sig in &self.prunable.range_sigs {
            range_sig.serialize_into(buffer);
        }
        for mg in &self.prunable.mgs {
            for key in mg.ss.iter().flat_map(|column| column.iter()) {
                buffer.extend_from_slice(key.as_ref());
            }
            buffer.extend_from_slice(mg.cc.as_ref());
        }
    }

    pub fn serialize_prunable(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.serialize_prunable_into(&mut buffer);
        buffer
    }

    pub fn base_hash(&self) -> Hash {
        hash256(&[&self.serialize_base()[..]])
    }

    /// Hash of the prunable part; all zeros for `Null` signatures.
    pub fn prunable_hash(&self) -> Hash {
        if self.base.rct_type == RctType::Null {
            return Hash::zero();
        }
        hash256(&[&self.serialize_prunable()[..]])
    }

    /// Message signed by the MLSAGs: `H(message ‖ H(base) ‖ H(range proofs))`.
    pub fn pre_mlsag_hash(&self) -> Hash {
        let mut range_bytes = Vec::with_capacity(self.prunable.range_sigs.len() * RangeSig::BYTE_LEN);
        for range_sig in &self.prunable.range_sigs {
            range_sig.serialize_into(&mut range_bytes);
        }
        let base_hash = self.base_hash();
        let range_hash = hash256(&[&range_bytes[..]]);
        hash256(&[&self.base.message.0[..], &base_hash.0[..], &range_hash.0[..]])
    }

    /// Reads a signature for a transaction with the given numbers of inputs, outputs
    /// and mixins per input. Key images, ring members and the message stay empty.
    pub fn parse(reader: &mut Reader, n_inputs: usize, n_outputs: usize, mixin: usize) -> Result<Self> {
        let rct_type = RctType::from_byte(reader.read_byte("RingCT type")?)?;
        trace!("parsing {:?} RingCT signature", rct_type);
        let mut sig = RctSig::null();
        sig.base.rct_type = rct_type;
        if rct_type == RctType::Null {
            return Ok(sig);
        }

        let ring_size = mixin.saturating_add(1);
        let mg_len = match rct_type {
            RctType::Simple => n_inputs.saturating_mul(ring_size.saturating_mul(2).saturating_add(1)),
            _ => ring_size
                .saturating_mul(n_inputs.saturating_add(1))
                .saturating_add(1),
        };
        let pseudo_len = if rct_type == RctType::Simple { n_inputs } else { 0 };
        let keys = pseudo_len
            .saturating_add(n_outputs.saturating_mul(3 + 3 * range_proof::BITS + 1))
            .saturating_add(mg_len);
        // One more byte for the fee varint.
        if keys.saturating_mul(32).saturating_add(1) > reader.remaining() {
            return Err(Error::Truncated {
                field: "RingCT signature",
            });
        }

        let base = &mut sig.base;
        base.txn_fee = reader.read_varint("transaction fee")?;
        for _ in 0..pseudo_len {
            base.pseudo_outs.push(reader.read_key("pseudo output")?);
        }
        for _ in 0..n_outputs {
            let mask = reader.read_key("ecdh mask")?;
            let amount = reader.read_key("ecdh amount")?;
            base.ecdh_info.push(EcdhTuple {
                mask,
                amount,
                sender_pk: Key::zero(),
            });
        }
        for _ in 0..n_outputs {
            let mask = reader.read_key("output commitment")?;
            base.out_pk.push(CtKey {
                dest: Key::zero(),
                mask,
            });
        }

        let prunable = &mut sig.prunable;
        for _ in 0..n_outputs {
            prunable.range_sigs.push(parse_range_sig(reader)?);
        }
        let (mg_count, rows) = match rct_type {
            RctType::Simple => (n_inputs, 2),
            _ => (1, n_inputs + 1),
        };
        for _ in 0..mg_count {
            let mut ss = Vec::with_capacity(ring_size);
            for _ in 0..ring_size {
                let mut column = Vec::with_capacity(rows);
                for _ in 0..rows {
                    column.push(reader.read_key("MLSAG response")?);
                }
                ss.push(column);
            }
            let cc = reader.read_key("MLSAG challenge")?;
            prunable.mgs.push(MgSig {
                ss,
                cc,
                ii: Vec::new(),
            });
        }
        Ok(sig)
    }

    /// Balance and range proof checks of a simple signature.
    pub fn verify_simple<C: Curve>(&self, curve: &C) -> bool {
        if self.base.rct_type != RctType::Simple {
            debug!("expected a simple RingCT signature, got {:?}", self.base.rct_type);
            return false;
        }
        let mut pseudo_sum = curve.identity();
        for pseudo_out in &self.base.pseudo_outs {
            match curve.point_from_key(pseudo_out) {
                Some(point) => pseudo_sum = curve.point_add(&pseudo_sum, &point),
                None => {
                    debug!("pseudo output is not a valid point");
                    return false;
                }
            }
        }
        let outputs_sum = match self.outputs_sum(curve) {
            Some(sum) => sum,
            None => return false,
        };
        if curve.point_to_key(&pseudo_sum) != curve.point_to_key(&outputs_sum) {
            debug!("pseudo outputs do not balance outputs and fee");
            return false;
        }
        self.verify_ranges(curve)
    }

    /// Range proof checks of a full signature. Balance is proved by its MLSAG.
    pub fn verify_full<C: Curve>(&self, curve: &C) -> bool {
        if self.base.rct_type != RctType::Full {
            debug!("expected a full RingCT signature, got {:?}", self.base.rct_type);
            return false;
        }
        self.verify_ranges(curve)
    }

    fn outputs_sum<C: Curve>(&self, curve: &C) -> Option<C::Point> {
        let mut sum = commit_to_fee(curve, self.base.txn_fee);
        for (i, out_pk) in self.base.out_pk.iter().enumerate() {
            match curve.point_from_key(&out_pk.mask) {
                Some(point) => sum = curve.point_add(&sum, &point),
                None => {
                    debug!("commitment of output {} is not a valid point", i);
                    return None;
                }
            }
        }
        Some(sum)
    }

    fn verify_ranges<C: Curve>(&self, curve: &C) -> bool {
        let out_pk = &self.base.out_pk;
        let range_sigs = &self.prunable.range_sigs;
        if out_pk.len() != range_sigs.len() {
            debug!(
                "{} outputs but {} range proofs",
                out_pk.len(),
                range_sigs.len()
            );
            return false;
        }
        for (i, (output, range_sig)) in out_pk.iter().zip(range_sigs).enumerate() {
            if !verify_range(curve, &output.mask, range_sig) {
                debug!("range proof of output {} is invalid", i);
                return false;
            }
        }
        true
    }

    /// Verifies the MLSAGs against the ring members and key images restored
    /// by expansion.
    ///
    /// Fails with an error if the ring has not been restored or does not match
    /// the shape of the signature.
    pub fn verify_mlsags<C: Curve>(&self, curve: &C) -> Result<bool> {
        let base = &self.base;
        let mgs = &self.prunable.mgs;
        if base.rct_type == RctType::Null {
            return Ok(true);
        }
        if base.mix_ring.is_empty() || mgs.iter().any(|mg| mg.ii.is_empty()) {
            return Err(Error::NotExpanded);
        }
        let message = Key::from(self.pre_mlsag_hash());

        match base.rct_type {
            RctType::Full => {
                if mgs.len() != 1 {
                    return Err(Error::shape("MLSAG signatures", 1, mgs.len()));
                }
                let matrix = match mlsag::full_matrix(curve, &base.mix_ring, &base.out_pk, base.txn_fee) {
                    Ok(matrix) => matrix,
                    Err(Error::InvalidPoint { field }) => {
                        debug!("{} is not a valid point", field);
                        return Ok(false);
                    }
                    Err(e) => return Err(e),
                };
                let ds_rows = matrix[0].len() - 1;
                if mgs[0].ii.len() != ds_rows {
                    return Err(Error::shape("key images", ds_rows, mgs[0].ii.len()));
                }
                Ok(mlsag::verify(curve, &message, &matrix, &mgs[0], ds_rows))
            }
            _ => {
                let n_inputs = base.pseudo_outs.len();
                if base.mix_ring.len() != n_inputs {
                    return Err(Error::shape("mix ring", n_inputs, base.mix_ring.len()));
                }
                if mgs.len() != n_inputs {
                    return Err(Error::shape("MLSAG signatures", n_inputs, mgs.len()));
                }
                for (i, ((ring, pseudo_out), mg)) in base
                    .mix_ring
                    .iter()
                    .zip(&base.pseudo_outs)
                    .zip(mgs)
                    .enumerate()
                {
                    let matrix = match mlsag::simple_matrix(curve, ring, pseudo_out) {
                        Ok(matrix) => matrix,
                        Err(Error::InvalidPoint { field }) => {
                            debug!("{} of input {} is not a valid point", field, i);
                            return Ok(false);
                        }
                        Err(e) => return Err(e),
                    };
                    if !mlsag::verify(curve, &message, &matrix, mg, 1) {
                        debug!("MLSAG of input {} is invalid", i);
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Complete verification: range proofs, balance (for simple signatures)
    /// and MLSAGs.
    pub fn verify<C: Curve>(&self, curve: &C) -> Result<bool> {
        let valid = match self.base.rct_type {
            RctType::Null => return Ok(true),
            RctType::Full => self.verify_full(curve),
            RctType::Simple => self.verify_simple(curve),
        };
        if !valid {
            return Ok(false);
        }
        self.verify_mlsags(curve)
    }

    /// Builds a full signature spending one output per input from ring member `index`.
    ///
    /// `mix_ring` is indexed `[member][input]`; `inputs` hold the secrets of the
    /// outputs in column `index`.
    pub fn generate_full<C, R>(
        curve: &C,
        rng: &mut R,
        message: &Key,
        mix_ring: Vec<Vec<CtKey>>,
        index: usize,
        inputs: &[InputSecret<C::Scalar>],
        outputs: &[OutputSpec],
        fee: u64,
    ) -> Result<Self>
    where
        C: Curve,
        R: RngCore + CryptoRng,
    {
        if inputs.is_empty() {
            return Err(Error::InvalidArgument("no inputs"));
        }
        if index >= mix_ring.len() {
            return Err(Error::InvalidArgument("signer index outside of the ring"));
        }
        for column in &mix_ring {
            if column.len() != inputs.len() {
                return Err(Error::shape("mix ring column", inputs.len(), column.len()));
            }
        }
        check_balance(inputs, outputs, fee)?;

        let mut sig = RctSig::null();
        sig.base.rct_type = RctType::Full;
        sig.base.message = *message;
        sig.base.mix_ring = mix_ring;
        sig.base.txn_fee = fee;
        let output_masks = sig.add_outputs(curve, rng, outputs)?;

        let mut secrets: Vec<_> = inputs.iter().map(|input| input.secret_key.clone()).collect();
        let mut commitment_secret = curve.scalar_from_u64(0);
        for input in inputs {
            commitment_secret = curve.scalar_add(&commitment_secret, &input.mask);
        }
        for mask in &output_masks {
            commitment_secret = curve.scalar_sub(&commitment_secret, mask);
        }
        secrets.push(commitment_secret);

        let matrix = mlsag::full_matrix(curve, &sig.base.mix_ring, &sig.base.out_pk, fee)?;
        let pre_mlsag_hash = Key::from(sig.pre_mlsag_hash());
        let mg = mlsag::generate(curve, rng, &pre_mlsag_hash, &matrix, &secrets, index, inputs.len())?;
        sig.prunable.mgs.push(mg);
        Ok(sig)
    }

    /// Builds a simple signature.
    ///
    /// `mix_rings[i]` is the ring of input `i`, in which the spent output sits
    /// at `indices[i]`.
    pub fn generate_simple<C, R>(
        curve: &C,
        rng: &mut R,
        message: &Key,
        mix_rings: Vec<Vec<CtKey>>,
        indices: &[usize],
        inputs: &[InputSecret<C::Scalar>],
        outputs: &[OutputSpec],
        fee: u64,
    ) -> Result<Self>
    where
        C: Curve,
        R: RngCore + CryptoRng,
    {
        if inputs.is_empty() {
            return Err(Error::InvalidArgument("no inputs"));
        }
        if mix_rings.len() != inputs.len() {
            return Err(Error::shape("mix rings", inputs.len(), mix_rings.len()));
        }
        if indices.len() != inputs.len() {
            return Err(Error::shape("signer indices", inputs.len(), indices.len()));
        }
        if mix_rings.iter().zip(indices).any(|(ring, &index)| index >= ring.len()) {
            return Err(Error::InvalidArgument("signer index outside of the ring"));
        }
        check_balance(inputs, outputs, fee)?;

        let mut sig = RctSig::null();
        sig.base.rct_type = RctType::Simple;
        sig.base.message = *message;
        sig.base.mix_ring = mix_rings;
        sig.base.txn_fee = fee;
        let output_masks = sig.add_outputs(curve, rng, outputs)?;

        // The last pseudo mask makes pseudo outputs and outputs commit to equal masks.
        let mut pseudo_masks = Vec::with_capacity(inputs.len());
        let mut last_mask = curve.scalar_from_u64(0);
        for mask in &output_masks {
            last_mask = curve.scalar_add(&last_mask, mask);
        }
        for _ in 1..inputs.len() {
            let mask = random_scalar(curve, rng);
            last_mask = curve.scalar_sub(&last_mask, &mask);
            pseudo_masks.push(mask);
        }
        pseudo_masks.push(last_mask);

        sig.base.pseudo_outs = inputs
            .iter()
            .zip(&pseudo_masks)
            .map(|(input, mask)| curve.point_to_key(&commit(curve, input.amount, mask)))
            .collect();

        let pre_mlsag_hash = Key::from(sig.pre_mlsag_hash());
        for (i, input) in inputs.iter().enumerate() {
            let matrix = mlsag::simple_matrix(curve, &sig.base.mix_ring[i], &sig.base.pseudo_outs[i])?;
            let secrets = [
                input.secret_key.clone(),
                curve.scalar_sub(&input.mask, &pseudo_masks[i]),
            ];
            let mg = mlsag::generate(curve, rng, &pre_mlsag_hash, &matrix, &secrets, indices[i], 1)?;
            sig.prunable.mgs.push(mg);
        }
        Ok(sig)
    }

    /// Creates commitments, range proofs and masked amounts for `outputs`.
    /// Returns the commitment masks.
    fn add_outputs<C, R>(&mut self, curve: &C, rng: &mut R, outputs: &[OutputSpec]) -> Result<Vec<C::Scalar>>
    where
        C: Curve,
        R: RngCore + CryptoRng,
    {
        let mut masks = Vec::with_capacity(outputs.len());
        for output in outputs {
            let (commitment, mask, range_sig) = prove_range(curve, rng, output.amount)?;
            self.base.out_pk.push(CtKey {
                dest: output.destination,
                mask: commitment,
            });
            self.base
                .ecdh_info
                .push(EcdhTuple::encode(curve, &mask, output.amount, &output.shared_secret));
            self.prunable.range_sigs.push(range_sig);
            masks.push(mask);
        }
        Ok(masks)
    }

    /// Recovers the amount and mask of output `index` and checks them against
    /// its commitment.
    pub fn decode_output<C: Curve>(
        &self,
        curve: &C,
        index: usize,
        shared_secret: &Key,
    ) -> Result<(u64, C::Scalar)> {
        let (ecdh, out_pk) = match (self.base.ecdh_info.get(index), self.base.out_pk.get(index)) {
            (Some(ecdh), Some(out_pk)) => (ecdh, out_pk),
            _ => return Err(Error::InvalidArgument("output index out of range")),
        };
        let (amount, mask) = ecdh.decode(curve, shared_secret)?;
        if curve.point_to_key(&commit(curve, amount, &mask)) != out_pk.mask {
            return Err(Error::CommitmentMismatch);
        }
        Ok((amount, mask))
    }
}

fn parse_range_sig(reader: &mut Reader) -> Result<RangeSig> {
    let mut s0 = [Key::zero(); range_proof::BITS];
    let mut s1 = [Key::zero(); range_proof::BITS];
    let mut ci = [Key::zero(); range_proof::BITS];
    for key in s0.iter_mut() {
        *key = reader.read_key("borromean s0")?;
    }
    for key in s1.iter_mut() {
        *key = reader.read_key("borromean s1")?;
    }
    let ee = reader.read_key("borromean ee")?;
    for key in ci.iter_mut() {
        *key = reader.read_key("bit commitment")?;
    }
    Ok(RangeSig {
        asig: BoroSig { s0, s1, ee },
        ci,
    })
}
