//! Variable-length integers: 7-bit groups, least significant first, with the high bit
//! of each byte set while more groups follow.
//!
//! Decoding is strict. Values above `u64::MAX` and encodings with redundant trailing
//! zero groups are rejected, so that every accepted byte string re-encodes to itself.

use super::Reader;
use error::{Error, Result};

/// Maximal encoded length of a `u64`.
pub const MAX_LEN: usize = 10;

/// Appends the minimal encoding of `value` to `buffer`.
pub fn write_varint(buffer: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buffer.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buffer.push(value as u8);
}

pub fn encode(value: u64) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(MAX_LEN);
    write_varint(&mut buffer, value);
    buffer
}

pub fn read_varint(reader: &mut Reader, field: &'static str) -> Result<u64> {
    let mut value = 0_u64;
    let mut shift = 0_u32;
    loop {
        let byte = reader.read_byte(field)?;
        let group = u64::from(byte & 0x7f);
        if shift > 63 || (shift == 63 && group > 1) {
            return Err(Error::Overflow { field });
        }
        value |= group << shift;

        if byte & 0x80 == 0 {
            if group == 0 && shift > 0 {
                return Err(Error::NonCanonicalVarInt);
            }
            return Ok(value);
        }
        shift += 7;
    }
}

/// Decodes a varint that must span the whole of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<u64> {
    let mut reader = Reader::new(bytes);
    let value = read_varint(&mut reader, "varint")?;
    reader.finish()?;
    Ok(value)
}
