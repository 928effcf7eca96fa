//! Public addresses.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use std::{fmt, str::FromStr};

use crypto::{checksum, Key, CHECKSUM_LEN, KEY_LEN};
use encoding::base58;
use error::{Error, Result};

/// Network tag of main network addresses.
pub const MAINNET: u8 = 18;
/// Network tag of test network addresses.
pub const TESTNET: u8 = 53;

/// Network-tagged pair of public spend and view keys.
///
/// The raw form is `network ‖ spend key ‖ view key ‖ checksum`, where the checksum is
/// the first four bytes of the Keccak hash of everything before it. Addresses are
/// displayed and parsed in block base58.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    network: u8,
    spend_public_key: Key,
    view_public_key: Key,
}

impl Address {
    /// Length of the raw address, checksum included.
    pub const RAW_LEN: usize = 1 + 2 * KEY_LEN + CHECKSUM_LEN;

    pub fn new(network: u8, spend_public_key: Key, view_public_key: Key) -> Self {
        Address {
            network,
            spend_public_key,
            view_public_key,
        }
    }

    pub fn network(&self) -> u8 {
        self.network
    }

    pub fn spend_public_key(&self) -> &Key {
        &self.spend_public_key
    }

    pub fn view_public_key(&self) -> &Key {
        &self.view_public_key
    }

    /// Raw 69-byte form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(Self::RAW_LEN);
        raw.push(self.network);
        raw.extend_from_slice(self.spend_public_key.as_ref());
        raw.extend_from_slice(self.view_public_key.as_ref());
        let checksum = checksum(&[&raw[..]]);
        raw.extend_from_slice(&checksum);
        raw
    }

    /// Parses the raw 69-byte form, validating the checksum.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() != Self::RAW_LEN {
            return Err(Error::BadLength {
                expected: Self::RAW_LEN,
                actual: raw.len(),
            });
        }
        let (payload, expected_checksum) = raw.split_at(Self::RAW_LEN - CHECKSUM_LEN);
        if checksum(&[payload]) != expected_checksum {
            return Err(Error::ChecksumMismatch);
        }

        let spend_end = 1 + KEY_LEN;
        Ok(Address {
            network: payload[0],
            spend_public_key: Key::from_slice(&payload[1..spend_end])
                .ok_or(Error::Truncated { field: "spend key" })?,
            view_public_key: Key::from_slice(&payload[spend_end..])
                .ok_or(Error::Truncated { field: "view key" })?,
        })
    }

    pub fn to_base58(&self) -> String {
        base58::encode(&self.to_bytes())
    }

    pub fn from_base58(encoded: &str) -> Result<Self> {
        Self::from_bytes(&base58::decode(encoded)?)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(&self.to_base58())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_base58(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base58(&encoded).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json;

    const GENERIC: &str = "46w3n5EGhBeZkYmKvQRsd8UK9GhvcbYWQDobJape3NLMMFEjFZnJ3CnRmeKspubQGiP8iMTwFEX2QiBsjUkjKT4SSPd3fKp";

    struct Vector {
        network: u8,
        spend: &'static str,
        view: &'static str,
        address: &'static str,
    }

    const VECTORS: &[Vector] = &[
        Vector {
            network: MAINNET,
            spend: "8c1a9d5ff5aaf1c3cdeb2a1be62f07a34ae6b15fe47a254c8bc240f348271679",
            view: "0a29b163e392eb9416a52907fd7d3b84530f8d02ff70b1f63e72fdcb54cf7fe1",
            address: GENERIC,
        },
        Vector {
            network: MAINNET,
            spend: "5007b84275af9a173c2080683afce90b2157ab640c18ddd5ce3e060a18a9ce99",
            view: "27024b45150037b677418fcf11ba9675494ffdf994f329b9f7a8f8402b7934a0",
            address: "44f1Y84r9Lu4tQdLWRxV122rygfhUeVBrcmBaqcYCwUHScmf1ht8DFLXX9YN4T7nPPLcpqYLUdrFiY77nQYeH9RuK9gg4p6",
        },
        // Leading zero digits inside a full block.
        Vector {
            network: MAINNET,
            spend: "6add197bd82866e8bfbf1dc2fdf49873ec5f679059652da549cd806f2b166756",
            view: "f5cf2897088fda0f7ac1c42491ed7d558a46ee41d0c81d038fd53ff4360afda0",
            address: "45fzHekTd5FfvxWBPYX2TqLPbtWjaofxYUeWCi6BRQXYFYd85sY2qw73bAuKhqY7deFJr6pN3STY81bZ9x2Zf4nGKASksqe",
        },
        // Leading zero digit in the final partial block.
        Vector {
            network: MAINNET,
            spend: "50defe92d88b19aaf6bf66f061dd4380b79866a4122b25a03bceb571767dbe7b",
            view: "f8f6f28283921bf5a17f0bcf4306233fc25ce9b6276154ad0de22aebc5c67702",
            address: "44grjkXtDHJVbZgtU1UKnrNXidcHfZ3HWToU5WjR3KgHMjgwrYLjXC6i5vm3HCp4vnBfYaNEyNiuZVwqtHD2SenS1JBRyco",
        },
        Vector {
            network: TESTNET,
            spend: "8de9cce254e60cd940abf6c77ef344c3a21fad74320e45734fbfcd5870e5c875",
            view: "27024b45150037b677418fcf11ba9675494ffdf994f329b9f7a8f8402b7934a0",
            address: "9xYZvCDf6aFdLd7Qawg5XHZitWLKoeFvcLHfe5GxsGCFLbXSWeQNKciXX9YN4T7nPPLcpqYLUdrFiY77nQYeH9RuK9bogZJ",
        },
    ];

    #[test]
    fn known_addresses() {
        for vector in VECTORS {
            let address: Address = vector.address.parse().unwrap();
            assert_eq!(address.network(), vector.network);
            assert_eq!(address.spend_public_key().to_string(), vector.spend);
            assert_eq!(address.view_public_key().to_string(), vector.view);

            let built = Address::new(
                vector.network,
                vector.spend.parse().unwrap(),
                vector.view.parse().unwrap(),
            );
            assert_eq!(built.to_string(), vector.address);
        }
    }

    #[test]
    fn malformed_addresses() {
        assert_eq!(
            Address::from_base58(""),
            Err(Error::BadLength {
                expected: 69,
                actual: 0,
            })
        );
        let mut corrupted = GENERIC.to_owned();
        corrupted.pop();
        corrupted.push('1');
        assert_eq!(Address::from_base58(&corrupted), Err(Error::ChecksumMismatch));
    }

    #[test]
    fn every_bit_flip_is_rejected() {
        let raw = Address::from_base58(GENERIC).unwrap().to_bytes();
        for byte in 0..raw.len() {
            for bit in 0..8 {
                let mut flipped = raw.clone();
                flipped[byte] ^= 1 << bit;
                assert_eq!(
                    Address::from_bytes(&flipped),
                    Err(Error::ChecksumMismatch),
                    "flip of bit {} in byte {}",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn address_serde() {
        let address = Address::from_base58(GENERIC).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", GENERIC));
        let copy: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(copy, address);
    }

    proptest! {
        #[test]
        fn address_roundtrip(network in any::<u8>(), spend in any::<[u8; 32]>(), view in any::<[u8; 32]>()) {
            let address = Address::new(network, Key(spend), Key(view));
            let encoded = address.to_base58();
            prop_assert_eq!(encoded.len(), 95);
            prop_assert_eq!(Address::from_base58(&encoded), Ok(address));
        }
    }
}
