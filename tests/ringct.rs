//! Building, transmitting and verifying RingCT transactions.

extern crate rand;
extern crate ringct;

use rand::{rngs::StdRng, SeedableRng};
use ringct::{
    crypto::{generate_keys, hash256, random_scalar, Curve, Ed25519, Key},
    key_image,
    ringct::{range_proof::commit, InputSecret, OutputSpec},
    CtKey, Error, RctSig, RctType, Transaction, TransactionPrefix, TransactionState, TxIn,
    TxOut,
};

type Scalar = <Ed25519 as Curve>::Scalar;

const RING_SIZE: usize = 4;

/// Output spendable by the wallet, with its ring of decoys.
struct Spend {
    ring: Vec<CtKey>,
    index: usize,
    secret: InputSecret<Scalar>,
}

fn spend(rng: &mut StdRng, amount: u64, index: usize) -> Spend {
    let curve = Ed25519;
    let (secret_key, dest) = generate_keys(&curve, rng);
    let mask = random_scalar(&curve, rng);
    let owned = CtKey {
        dest,
        mask: curve.point_to_key(&commit(&curve, amount, &mask)),
    };
    let mut ring: Vec<_> = (1..RING_SIZE)
        .map(|_| {
            let decoy_mask = random_scalar(&curve, rng);
            CtKey {
                dest: generate_keys(&curve, rng).1,
                mask: curve.point_to_key(&commit(&curve, 1_000, &decoy_mask)),
            }
        }).collect();
    ring.insert(index, owned);
    Spend {
        ring,
        index,
        secret: InputSecret {
            secret_key,
            mask,
            amount,
        },
    }
}

fn prefix(spends: &[Spend], outputs: &[OutputSpec]) -> TransactionPrefix {
    TransactionPrefix {
        version: 2,
        unlock_time: 0,
        inputs: spends
            .iter()
            .enumerate()
            .map(|(i, spend)| TxIn::ToKey {
                amount: 0,
                key_offsets: (0..RING_SIZE as u64).map(|j| 10 * i as u64 + j + 1).collect(),
                key_image: key_image(&Ed25519, &spend.secret.secret_key),
            }).collect(),
        outputs: outputs
            .iter()
            .map(|output| TxOut {
                amount: 0,
                key: output.destination,
            }).collect(),
        extra: vec![0x01; 33],
    }
}

fn outputs(rng: &mut StdRng, amounts: &[u64]) -> Vec<OutputSpec> {
    amounts
        .iter()
        .map(|&amount| OutputSpec {
            destination: generate_keys(&Ed25519, rng).1,
            amount,
            shared_secret: generate_keys(&Ed25519, rng).1,
        }).collect()
}

fn simple_transaction(rng: &mut StdRng) -> (Transaction, Vec<Vec<CtKey>>, Vec<OutputSpec>) {
    let curve = Ed25519;
    let spends = vec![spend(rng, 9_000, 0), spend(rng, 1_500, 3)];
    let outputs = outputs(rng, &[10_000, 400]);
    let prefix = prefix(&spends, &outputs);
    let message = Key::from(prefix.hash());

    let rings: Vec<_> = spends.iter().map(|spend| spend.ring.clone()).collect();
    let indices: Vec<_> = spends.iter().map(|spend| spend.index).collect();
    let secrets: Vec<_> = spends.iter().map(|spend| spend.secret.clone()).collect();
    let signature = RctSig::generate_simple(
        &curve,
        rng,
        &message,
        rings.clone(),
        &indices,
        &secrets,
        &outputs,
        100,
    ).unwrap();
    let tx = Transaction::new_rct(prefix, signature).unwrap();
    (tx, rings, outputs)
}

#[test]
fn simple_transaction_roundtrip() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([51; 32]);
    let (tx, rings, outputs) = simple_transaction(&mut rng);

    let bytes = tx.serialize();
    let mut parsed = Transaction::parse(&bytes).unwrap();
    assert_eq!(parsed.serialize(), bytes);
    assert_eq!(parsed.hash(), tx.hash());
    assert_eq!(parsed.rct_signature().map(RctSig::rct_type), Some(RctType::Simple));

    assert_eq!(parsed.verify_rct(&curve), Err(Error::NotExpanded));
    parsed.expand(&rings).unwrap();
    assert_eq!(parsed.state(), TransactionState::Expanded);
    assert_eq!(parsed.rct_signature(), tx.rct_signature());
    assert_eq!(parsed.verify_rct(&curve), Ok(true));

    let signature = parsed.rct_signature().unwrap();
    for (i, output) in outputs.iter().enumerate() {
        let (amount, _) = signature
            .decode_output(&curve, i, &output.shared_secret)
            .unwrap();
        assert_eq!(amount, output.amount);
    }
}

fn full_transaction(rng: &mut StdRng) -> (Transaction, Vec<Vec<CtKey>>) {
    let curve = Ed25519;
    // Full signatures put all inputs into one column of the ring.
    let index = 2;
    let spends = vec![spend(rng, 600, index), spend(rng, 400, index)];
    let outputs = outputs(rng, &[950]);
    let prefix = prefix(&spends, &outputs);

    let rings: Vec<_> = spends.iter().map(|spend| spend.ring.clone()).collect();
    let mix_ring: Vec<Vec<CtKey>> = (0..RING_SIZE)
        .map(|member| rings.iter().map(|ring| ring[member]).collect())
        .collect();
    let secrets: Vec<_> = spends.iter().map(|spend| spend.secret.clone()).collect();
    let signature = RctSig::generate_full(
        &curve,
        rng,
        &Key::from(prefix.hash()),
        mix_ring,
        index,
        &secrets,
        &outputs,
        50,
    ).unwrap();
    (Transaction::new_rct(prefix, signature).unwrap(), rings)
}

#[test]
fn full_transaction_roundtrip() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([52; 32]);
    let (tx, rings) = full_transaction(&mut rng);

    let mut parsed = Transaction::parse(&tx.serialize()).unwrap();
    parsed.expand(&rings).unwrap();
    assert_eq!(parsed.rct_signature(), tx.rct_signature());
    assert_eq!(parsed.verify_rct(&curve), Ok(true));
}

#[test]
fn full_transaction_with_changed_fee_is_rejected() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([57; 32]);
    let (tx, rings) = full_transaction(&mut rng);

    let mut signature = tx.rct_signature().unwrap().clone();
    signature.base.txn_fee -= 1;
    let mut forged = Transaction::new_rct(tx.prefix().clone(), signature).unwrap();
    forged.expand(&rings).unwrap();
    let forged_signature = forged.rct_signature().unwrap();
    assert!(forged_signature.verify_full(&curve));
    assert_eq!(forged_signature.verify_mlsags(&curve), Ok(false));
    assert_eq!(forged.verify_rct(&curve), Ok(false));
}

#[test]
fn full_transaction_with_swapped_key_images_is_rejected() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([58; 32]);
    let (tx, rings) = full_transaction(&mut rng);

    let mut parsed = Transaction::parse(&tx.serialize()).unwrap();
    parsed.expand(&rings).unwrap();
    let mut signature = parsed.rct_signature().unwrap().clone();
    assert_eq!(signature.verify(&curve), Ok(true));
    signature.prunable.mgs[0].ii.swap(0, 1);
    assert_eq!(signature.verify_mlsags(&curve), Ok(false));
    assert_eq!(signature.verify(&curve), Ok(false));
}

#[test]
fn full_transaction_with_bad_range_proof_is_rejected() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([59; 32]);
    let (tx, rings) = full_transaction(&mut rng);

    // The range proof of the only output starts right after the base.
    let signature = tx.rct_signature().unwrap();
    let position = tx.prefix().serialize().len() + signature.serialize_base().len();
    let mut bytes = tx.serialize();
    bytes[position] ^= 0x01;

    let mut parsed = Transaction::parse(&bytes).unwrap();
    parsed.expand(&rings).unwrap();
    assert!(!parsed.rct_signature().unwrap().verify_full(&curve));
    assert_eq!(parsed.verify_rct(&curve), Ok(false));
}

#[test]
fn hash_covers_all_sections() {
    let mut rng = StdRng::from_seed([53; 32]);
    let (tx, _, _) = simple_transaction(&mut rng);
    let signature = tx.rct_signature().unwrap();

    let prefix_bytes = tx.prefix().serialize();
    let base_bytes = signature.serialize_base();
    let prunable_bytes = signature.serialize_prunable();
    assert_eq!(
        tx.serialize(),
        [&prefix_bytes[..], &base_bytes[..], &prunable_bytes[..]].concat()
    );

    let expected = hash256(&[
        &hash256(&[&prefix_bytes[..]]).0[..],
        &hash256(&[&base_bytes[..]]).0[..],
        &hash256(&[&prunable_bytes[..]]).0[..],
    ]);
    assert_eq!(tx.hash(), expected);
}

#[test]
fn tampered_prunable_data_is_detected() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([54; 32]);
    let (tx, rings, _) = simple_transaction(&mut rng);
    let bytes = tx.serialize();

    // Flip a byte of the first MLSAG response of the last input.
    let signature = tx.rct_signature().unwrap();
    let mg_len = (2 * RING_SIZE + 1) * 32;
    let position = bytes.len() - mg_len;
    let mut tampered = bytes.clone();
    tampered[position] ^= 0x01;

    let mut parsed = Transaction::parse(&tampered).unwrap();
    assert_ne!(parsed.hash(), tx.hash());
    assert_eq!(
        parsed.rct_signature().unwrap().base_hash(),
        signature.base_hash()
    );
    parsed.expand(&rings).unwrap();
    assert_eq!(parsed.verify_rct(&curve), Ok(false));
}

#[test]
fn wrong_ring_members_fail_verification() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([55; 32]);
    let (tx, mut rings, _) = simple_transaction(&mut rng);

    rings[1].swap(0, 3);
    let mut parsed = Transaction::parse(&tx.serialize()).unwrap();
    parsed.expand(&rings).unwrap();
    assert_eq!(parsed.verify_rct(&curve), Ok(false));

    let mut parsed = Transaction::parse(&tx.serialize()).unwrap();
    assert_eq!(
        parsed.expand(&rings[..1]),
        Err(Error::ShapeMismatch {
            field: "output keys",
            expected: 2,
            actual: 1,
        })
    );
    assert_eq!(parsed.state(), TransactionState::Parsed);
}

#[test]
fn unbalanced_outputs_are_rejected() {
    let curve = Ed25519;
    let mut rng = StdRng::from_seed([56; 32]);
    let (tx, rings, _) = simple_transaction(&mut rng);

    // Re-encode with a different fee; the signatures still parse.
    let mut signature = tx.rct_signature().unwrap().clone();
    signature.base.txn_fee += 1;
    let mut forged = Transaction::new_rct(tx.prefix().clone(), signature).unwrap();
    forged.expand(&rings).unwrap();
    assert!(!forged.rct_signature().unwrap().verify_simple(&curve));
    assert_eq!(forged.verify_rct(&curve), Ok(false));
}
