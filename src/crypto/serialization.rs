//! Supporting routines for serializing crypto types.
//!
//! `Key` and `Hash` are represented in human-readable formats as lower-case hex strings,
//! the same form their `Display` impls produce.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::keys::{Hash, Key};

macro_rules! impl_hex_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let hex_string = String::deserialize(deserializer)?;
                hex_string.parse().map_err(de::Error::custom)
            }
        }
    };
}

impl_hex_serde!(Key);
impl_hex_serde!(Hash);

#[test]
fn key_roundtrip() {
    use serde_json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Value {
        first: u32,
        second: Key,
        third: Hash,
    }

    let value = Value {
        first: 123,
        second: Key([0xab; 32]),
        third: Hash([0x01; 32]),
    };
    let value_json = serde_json::to_string(&value).expect("to_string");
    assert!(value_json.contains(&"ab".repeat(32)));
    let value_copy: Value = serde_json::from_str(&value_json).expect("from_str");
    assert_eq!(value, value_copy);
}

#[test]
fn malformed_hex_is_rejected() {
    use serde_json;

    let short = serde_json::from_str::<Key>("\"abcd\"");
    assert!(short.is_err());
    let not_hex = serde_json::from_str::<Hash>(&format!("\"{}\"", "xy".repeat(32)));
    assert!(not_hex.is_err());
}
