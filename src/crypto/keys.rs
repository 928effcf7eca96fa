//! Fixed-size byte values stored in transactions.

use hex::{self, FromHex};

use std::{fmt, str::FromStr};

use error::Error;

/// Length of a serialized scalar or compressed point.
pub const KEY_LEN: usize = 32;
/// Length of a `Keccak-256` digest.
pub const HASH_LEN: usize = 32;

/// 32-byte value holding either a scalar or a compressed curve point.
///
/// `Key` is the storage form used on the wire. Which interpretation applies is
/// decided by the context it is read in: arithmetic goes through the
/// [`Curve`](::crypto::Curve) scalar and point types, which are only obtained
/// from a `Key` after validation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub [u8; KEY_LEN]);

/// Key image of a spent output. Always interpreted as a point.
pub type KeyImage = Key;

impl Key {
    pub fn zero() -> Self {
        Key([0; KEY_LEN])
    }

    /// Copies a key from a slice of exactly `KEY_LEN` bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != KEY_LEN {
            return None;
        }
        let mut bytes = [0_u8; KEY_LEN];
        bytes.copy_from_slice(slice);
        Some(Key(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        self.0
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; KEY_LEN]> for Key {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Key(bytes)
    }
}

impl From<Hash> for Key {
    fn from(hash: Hash) -> Self {
        Key(hash.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "Key({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        decode_hex(s).map(Key)
    }
}

/// `Keccak-256` digest.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; HASH_LEN]);

impl Hash {
    /// All-zero hash, used in place of the prunable hash of a transaction
    /// without RingCT signatures.
    pub fn zero() -> Self {
        Hash([0; HASH_LEN])
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "Hash({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Hash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        decode_hex(s).map(Hash)
    }
}

fn decode_hex(s: &str) -> Result<[u8; 32], Error> {
    if s.len() != 64 {
        return Err(Error::BadLength {
            expected: 64,
            actual: s.len(),
        });
    }
    <[u8; 32]>::from_hex(s).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, .. } => Error::InvalidCharacter(c),
        _ => Error::BadLength {
            expected: 64,
            actual: s.len(),
        },
    })
}

#[test]
fn keys_display_as_lowercase_hex() {
    let key: Key = "8b655970153799af2aeadc9ff1add0ea6c7251d54154cfa92c173a0dd39c1f94"
        .parse()
        .expect("parse");
    assert_eq!(key.0[0], 0x8b);
    assert_eq!(
        key.to_string(),
        "8b655970153799af2aeadc9ff1add0ea6c7251d54154cfa92c173a0dd39c1f94"
    );
    assert!("8b65".parse::<Key>().is_err());
    assert_eq!(
        "zz655970153799af2aeadc9ff1add0ea6c7251d54154cfa92c173a0dd39c1f94".parse::<Hash>(),
        Err(Error::InvalidCharacter('z'))
    );
}
