//! Low-level encodings: varints, block base58, and a bounded byte reader.

pub mod base58;
pub mod varint;

use crypto::{Key, KEY_LEN};
use error::{Error, Result};

/// Sanity ceilings applied while parsing transactions.
///
/// Counts in the wire format are attacker-controlled varints. Parsing fails with
/// [`Error::LimitExceeded`](::error::Error::LimitExceeded) as soon as a count goes
/// over its limit, before anything is allocated for it.
///
/// The limits can be embedded in a node configuration; missing fields fall back to
/// the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseLimits {
    pub max_inputs: u64,
    pub max_outputs: u64,
    /// Maximal number of ring members per input, the real output included.
    pub max_ring_size: u64,
    pub max_extra_len: u64,
}

impl Default for ParseLimits {
    fn default() -> Self {
        ParseLimits {
            max_inputs: 1_024,
            max_outputs: 1_024,
            max_ring_size: 1_024,
            max_extra_len: 65_536,
        }
    }
}

impl ParseLimits {
    pub(crate) fn check(field: &'static str, value: u64, limit: u64) -> Result<usize> {
        if value > limit {
            return Err(Error::LimitExceeded {
                field,
                value,
                limit,
            });
        }
        Ok(value as usize)
    }
}

/// Cursor over a byte slice. Every read names the field being read, so that a short
/// input reports where it ended.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, position: 0 }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_byte(&mut self, field: &'static str) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.position)
            .ok_or(Error::Truncated { field })?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Truncated { field });
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    pub fn read_key(&mut self, field: &'static str) -> Result<Key> {
        let mut key = Key::zero();
        key.0.copy_from_slice(self.read_bytes(KEY_LEN, field)?);
        Ok(key)
    }

    pub fn read_varint(&mut self, field: &'static str) -> Result<u64> {
        varint::read_varint(self, field)
    }

    /// Reads a count and checks it against `limit`.
    ///
    /// `item_len` is the minimal encoded size of one counted item; a count that could
    /// not possibly fit into the remaining input is rejected as truncated. The returned
    /// count is therefore safe to pre-allocate for.
    pub fn read_count(
        &mut self,
        field: &'static str,
        limit: u64,
        item_len: usize,
    ) -> Result<usize> {
        let count = ParseLimits::check(field, self.read_varint(field)?, limit)?;
        if count.saturating_mul(item_len) > self.remaining() {
            return Err(Error::Truncated { field });
        }
        Ok(count)
    }

    /// Succeeds only if the whole input has been consumed.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(Error::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn reader_reports_the_truncated_field() {
        let mut reader = Reader::new(&[1, 2, 3]);
        assert_eq!(reader.read_byte("tag"), Ok(1));
        assert_eq!(
            reader.read_key("key image"),
            Err(Error::Truncated { field: "key image" })
        );
        assert_eq!(reader.read_bytes(2, "extra"), Ok(&[2_u8, 3][..]));
        assert_eq!(reader.finish(), Ok(()));
    }

    #[test]
    fn counts_are_bounded() {
        let mut reader = Reader::new(&[0x05, 0, 0, 0, 0, 0]);
        assert_eq!(
            reader.clone().read_count("inputs", 4, 1),
            Err(Error::LimitExceeded {
                field: "inputs",
                value: 5,
                limit: 4,
            })
        );
        assert_eq!(
            reader.clone().read_count("inputs", 10, 2),
            Err(Error::Truncated { field: "inputs" })
        );
        assert_eq!(reader.read_count("inputs", 10, 1), Ok(5));
        assert_eq!(reader.remaining(), 5);
        assert_eq!(reader.finish(), Err(Error::TrailingBytes(5)));
    }

    #[test]
    fn limits_take_defaults_for_missing_fields() {
        let limits: ParseLimits = serde_json::from_str(r#"{ "max_inputs": 16 }"#).unwrap();
        assert_eq!(limits.max_inputs, 16);
        assert_eq!(limits.max_outputs, ParseLimits::default().max_outputs);
        assert_eq!(limits.max_ring_size, ParseLimits::default().max_ring_size);
    }
}
