//! Multilayer linkable ring signatures (MLSAG).
//!
//! The ring is a matrix of public keys: each column is one ring member and each row a
//! layer. The signer knows the secrets of a whole column. The first `ds_rows` layers are
//! linkable and produce key images; the remaining layers only prove knowledge of
//! a discrete logarithm. For each column `i` and layer `j` the challenge chain hashes
//!
//! ```text
//! P[i][j] ‖ ss[i][j] * G + c * P[i][j] ‖ ss[i][j] * Hp(P[i][j]) + c * I[j]
//! ```
//!
//! with the last term omitted for layers without key images.

use rand::{CryptoRng, RngCore};

use crypto::{hash_to_point, hash_to_scalar, random_scalar, Curve, Key};
use error::{Error, Result};

use super::{range_proof::commit_to_fee, CtKey};

/// MLSAG signature. `ii` is not part of the wire format; it is restored from the key
/// images of transaction inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MgSig {
    /// Responses, one vector per ring member (column).
    pub ss: Vec<Vec<Key>>,
    pub cc: Key,
    /// Key images, one per linkable layer.
    pub ii: Vec<Key>,
}

struct Layout {
    rows: usize,
    ds_rows: usize,
}

impl Layout {
    fn hash_len(&self) -> usize {
        1 + 3 * self.ds_rows + 2 * (self.rows - self.ds_rows)
    }

    /// Fills `to_hash` for one column and returns the next challenge.
    fn next_challenge<C: Curve>(
        &self,
        curve: &C,
        to_hash: &mut [Key],
        keys: &[Key],
        points: &[C::Point],
        responses: &[C::Scalar],
        challenge: &C::Scalar,
        images: &[C::Point],
    ) -> C::Scalar {
        for j in 0..self.ds_rows {
            let l = curve.double_scalar_mult_base(challenge, &points[j], &responses[j]);
            let hp = hash_to_point(curve, &keys[j]);
            let r = curve.double_scalar_mult(&responses[j], &hp, challenge, &images[j]);
            to_hash[3 * j + 1] = keys[j];
            to_hash[3 * j + 2] = curve.point_to_key(&l);
            to_hash[3 * j + 3] = curve.point_to_key(&r);
        }
        let offset = 3 * self.ds_rows;
        for j in self.ds_rows..self.rows {
            let l = curve.double_scalar_mult_base(challenge, &points[j], &responses[j]);
            let k = offset + 2 * (j - self.ds_rows);
            to_hash[k + 1] = keys[j];
            to_hash[k + 2] = curve.point_to_key(&l);
        }
        hash_keys(curve, to_hash)
    }
}

fn hash_keys<C: Curve>(curve: &C, keys: &[Key]) -> C::Scalar {
    let mut bytes = Vec::with_capacity(keys.len() * 32);
    for key in keys {
        bytes.extend_from_slice(key.as_ref());
    }
    hash_to_scalar(curve, &[&bytes[..]])
}

fn matrix_rows(matrix: &[Vec<Key>]) -> Result<usize> {
    let rows = matrix.first().map(Vec::len).unwrap_or(0);
    if rows == 0 {
        return Err(Error::InvalidArgument("empty MLSAG ring"));
    }
    for column in matrix {
        if column.len() != rows {
            return Err(Error::shape("MLSAG ring column", rows, column.len()));
        }
    }
    Ok(rows)
}

fn decode_points<C: Curve>(curve: &C, keys: &[Key]) -> Option<Vec<C::Point>> {
    keys.iter().map(|key| curve.point_from_key(key)).collect()
}

/// Signs `message` with the secrets of column `index` of `matrix`.
///
/// `matrix[i][j]` is layer `j` of ring member `i`; `secrets[j]` is the discrete
/// logarithm of `matrix[index][j]`. Key images are produced for the first `ds_rows`
/// layers.
pub fn generate<C, R>(
    curve: &C,
    rng: &mut R,
    message: &Key,
    matrix: &[Vec<Key>],
    secrets: &[C::Scalar],
    index: usize,
    ds_rows: usize,
) -> Result<MgSig>
where
    C: Curve,
    R: RngCore + CryptoRng,
{
    let cols = matrix.len();
    let rows = matrix_rows(matrix)?;
    if secrets.len() != rows {
        return Err(Error::shape("MLSAG secrets", rows, secrets.len()));
    }
    if index >= cols {
        return Err(Error::InvalidArgument("signer index outside of the ring"));
    }
    if ds_rows > rows {
        return Err(Error::InvalidArgument("more linkable layers than layers"));
    }
    let points = matrix
        .iter()
        .map(|column| decode_points(curve, column))
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::InvalidPoint {
            field: "MLSAG ring member",
        })?;

    let layout = Layout { rows, ds_rows };
    let mut to_hash = vec![Key::zero(); layout.hash_len()];
    to_hash[0] = *message;

    let mut alpha = Vec::with_capacity(rows);
    let mut images = Vec::with_capacity(ds_rows);
    for j in 0..ds_rows {
        let a = random_scalar(curve, rng);
        let hp = hash_to_point(curve, &matrix[index][j]);
        to_hash[3 * j + 1] = matrix[index][j];
        to_hash[3 * j + 2] = curve.point_to_key(&curve.scalar_mult_base(&a));
        to_hash[3 * j + 3] = curve.point_to_key(&curve.scalar_mult(&a, &hp));
        images.push(curve.scalar_mult(&secrets[j], &hp));
        alpha.push(a);
    }
    for j in ds_rows..rows {
        let a = random_scalar(curve, rng);
        let k = 3 * ds_rows + 2 * (j - ds_rows);
        to_hash[k + 1] = matrix[index][j];
        to_hash[k + 2] = curve.point_to_key(&curve.scalar_mult_base(&a));
        alpha.push(a);
    }

    let mut challenge = hash_keys(curve, &to_hash);
    let mut cc = challenge.clone();
    let mut ss = vec![Vec::new(); cols];

    let mut i = (index + 1) % cols;
    if i == 0 {
        cc = challenge.clone();
    }
    while i != index {
        let responses: Vec<_> = (0..rows).map(|_| random_scalar(curve, rng)).collect();
        challenge = layout.next_challenge(
            curve,
            &mut to_hash,
            &matrix[i],
            &points[i],
            &responses,
            &challenge,
            &images,
        );
        ss[i] = responses.iter().map(|s| curve.scalar_to_key(s)).collect();
        i = (i + 1) % cols;
        if i == 0 {
            cc = challenge.clone();
        }
    }

    ss[index] = alpha
        .iter()
        .zip(secrets)
        .map(|(a, x)| curve.scalar_to_key(&curve.scalar_mul_sub(&challenge, x, a)))
        .collect();

    Ok(MgSig {
        ss,
        cc: curve.scalar_to_key(&cc),
        ii: images.iter().map(|image| curve.point_to_key(image)).collect(),
    })
}

/// Verifies an MLSAG signature over `matrix`.
///
/// Malformed signatures (wrong dimensions, non-canonical scalars, key images off the
/// curve) are rejected rather than reported as errors.
pub fn verify<C: Curve>(
    curve: &C,
    message: &Key,
    matrix: &[Vec<Key>],
    sig: &MgSig,
    ds_rows: usize,
) -> bool {
    let cols = matrix.len();
    let rows = match matrix_rows(matrix) {
        Ok(rows) => rows,
        Err(e) => {
            debug!("malformed MLSAG ring: {}", e);
            return false;
        }
    };
    if ds_rows > rows || sig.ii.len() != ds_rows {
        debug!("MLSAG has {} key images, expected {}", sig.ii.len(), ds_rows);
        return false;
    }
    if sig.ss.len() != cols || sig.ss.iter().any(|column| column.len() != rows) {
        debug!("MLSAG responses do not match a {}x{} ring", cols, rows);
        return false;
    }

    let images = match decode_points(curve, &sig.ii) {
        Some(images) => images,
        None => {
            debug!("MLSAG key image is not a valid point");
            return false;
        }
    };
    let cc = match curve.scalar_from_canonical(&sig.cc) {
        Some(cc) => cc,
        None => return false,
    };

    let layout = Layout { rows, ds_rows };
    let mut to_hash = vec![Key::zero(); layout.hash_len()];
    to_hash[0] = *message;
    let mut challenge = cc.clone();

    for (keys, ss) in matrix.iter().zip(&sig.ss) {
        let points = match decode_points(curve, keys) {
            Some(points) => points,
            None => {
                debug!("MLSAG ring member is not a valid point");
                return false;
            }
        };
        let responses = match ss
            .iter()
            .map(|s| curve.scalar_from_canonical(s))
            .collect::<Option<Vec<_>>>()
        {
            Some(responses) => responses,
            None => {
                debug!("MLSAG response is not canonical");
                return false;
            }
        };
        challenge = layout.next_challenge(
            curve,
            &mut to_hash,
            keys,
            &points,
            &responses,
            &challenge,
            &images,
        );
    }

    let valid = challenge == cc;
    if !valid {
        debug!("MLSAG challenge does not close");
    }
    valid
}

/// Ring matrix of a full RingCT signature.
///
/// `mix_ring[i][j]` is the output spent by input `j` in ring member `i`. Each column
/// gets the destination keys of its outputs plus a last layer
/// `Σ input commitments - Σ output commitments - fee * H`, which is a commitment to zero
/// for the real column.
pub fn full_matrix<C: Curve>(
    curve: &C,
    mix_ring: &[Vec<CtKey>],
    out_pk: &[CtKey],
    fee: u64,
) -> Result<Vec<Vec<Key>>> {
    let inputs = mix_ring.first().map(Vec::len).unwrap_or(0);
    let mut outputs_sum = commit_to_fee(curve, fee);
    for output in out_pk {
        let mask = curve.point_from_key(&output.mask).ok_or(Error::InvalidPoint {
            field: "output commitment",
        })?;
        outputs_sum = curve.point_add(&outputs_sum, &mask);
    }

    let mut matrix = Vec::with_capacity(mix_ring.len());
    for column in mix_ring {
        if column.len() != inputs {
            return Err(Error::shape("mix ring column", inputs, column.len()));
        }
        let mut keys = Vec::with_capacity(inputs + 1);
        let mut inputs_sum = curve.identity();
        for ct_key in column {
            let mask = curve.point_from_key(&ct_key.mask).ok_or(Error::InvalidPoint {
                field: "ring commitment",
            })?;
            inputs_sum = curve.point_add(&inputs_sum, &mask);
            keys.push(ct_key.dest);
        }
        keys.push(curve.point_to_key(&curve.point_sub(&inputs_sum, &outputs_sum)));
        matrix.push(keys);
    }
    Ok(matrix)
}

/// Ring matrix for one input of a simple RingCT signature: columns
/// `[dest, commitment - pseudo_out]`.
pub fn simple_matrix<C: Curve>(
    curve: &C,
    ring: &[CtKey],
    pseudo_out: &Key,
) -> Result<Vec<Vec<Key>>> {
    let pseudo_out = curve.point_from_key(pseudo_out).ok_or(Error::InvalidPoint {
        field: "pseudo output",
    })?;
    ring.iter()
        .map(|ct_key| {
            let mask = curve.point_from_key(&ct_key.mask).ok_or(Error::InvalidPoint {
                field: "ring commitment",
            })?;
            Ok(vec![
                ct_key.dest,
                curve.point_to_key(&curve.point_sub(&mask, &pseudo_out)),
            ])
        })
        .collect()
}
