// Copyright 2018 The Exonum Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Transaction layer of a CryptoNote currency with ring confidential transactions.
//!
//! The crate covers:
//!
//! - [linkable ring signatures](ring_signature) hiding the spent output among
//!   other outputs, with key images exposing double spends;
//! - [RingCT](ringct): Pedersen commitments to amounts, Borromean range proofs
//!   and MLSAG signatures proving that inputs and outputs balance;
//! - the binary wire format and hashes of [transactions](transaction) and
//!   the base58 form of [addresses](address).
//!
//! All group arithmetic goes through the [`Curve`](crypto::Curve) trait, which is passed
//! explicitly to every signing and verification routine. [`Ed25519`](crypto::Ed25519)
//! is the implementation matching the network.
//!
//! The library does not install a logger; verification failures are reported
//! with `debug!` through the `log` facade.

extern crate byteorder;
extern crate curve25519_dalek;
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate hex;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate num_bigint;
extern crate rand;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate sha3;

#[cfg(test)]
#[macro_use]
extern crate proptest;
#[cfg(test)]
extern crate serde_json;

pub mod address;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod ring_signature;
pub mod ringct;
pub mod transaction;

pub use address::Address;
pub use error::{Error, Result};
pub use ring_signature::{create_signature, key_image, verify_signature, RingSignature};
pub use ringct::{CtKey, RctSig, RctType};
pub use transaction::{Transaction, TransactionPrefix, TransactionState, TxIn, TxOut};
