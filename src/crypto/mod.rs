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

//! Cryptographic primitives shared by the signature schemes.
//!
//! # Keys
//!
//! Scalars and points travel over the wire as 32-byte [`Key`]s. Arithmetic never happens
//! on `Key`s directly: a [`Curve`] converts them into its own scalar and point types,
//! rejecting non-canonical scalars and encodings that are not on the curve.
//!
//! # Curve
//!
//! Signature and RingCT routines take the curve as an explicit argument. [`Ed25519`] is
//! the backend matching the network; tests can supply any other prime-order group.
//!
//! # Hashing
//!
//! Every digest is Keccak with the legacy padding. [`hash_to_scalar`] (`Hs`) and
//! [`hash_to_point`] (`Hp`) derive challenges and key image bases from it.
//!
//! [`Key`]: ::crypto::Key
//! [`Curve`]: ::crypto::Curve
//! [`Ed25519`]: ::crypto::Ed25519
//! [`hash_to_scalar`]: ::crypto::hash_to_scalar
//! [`hash_to_point`]: ::crypto::hash_to_point

mod curve;
mod ed25519;
mod hash;
mod hash_to_ec;
mod keys;
mod serialization;

pub use self::curve::{generate_keys, public_key, random_scalar, Curve};
pub use self::ed25519::Ed25519;
pub use self::hash::{
    checksum, hash256, hash512, hash_to_point, hash_to_scalar, CHECKSUM_LEN,
};
pub use self::keys::{Hash, Key, KeyImage, HASH_LEN, KEY_LEN};
