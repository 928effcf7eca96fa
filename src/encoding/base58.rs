//! Block base58 used for addresses.
//!
//! Unlike Bitcoin's base58, the input is cut into 8-byte blocks and each block is
//! converted independently, so the output length depends only on the input length.
//! A full block takes 11 characters; the final partial block takes the number of
//! characters given by `ENCODED_BLOCK_SIZES`.

use byteorder::{BigEndian, ByteOrder};

use error::{Error, Result};

pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const FULL_BLOCK_LEN: usize = 8;
const FULL_ENCODED_BLOCK_LEN: usize = 11;

/// Number of characters produced for a block of `i` bytes.
const ENCODED_BLOCK_SIZES: [usize; FULL_BLOCK_LEN + 1] = [0, 2, 3, 5, 6, 7, 9, 10, 11];

fn decoded_block_len(encoded_len: usize) -> Option<usize> {
    ENCODED_BLOCK_SIZES.iter().position(|&size| size == encoded_len)
}

fn alphabet_index(c: u8) -> Option<u64> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u64)
}

fn encode_block(block: &[u8], out: &mut String) {
    let mut num = BigEndian::read_uint(block, block.len());
    let len = ENCODED_BLOCK_SIZES[block.len()];
    let mut chars = [ALPHABET[0]; FULL_ENCODED_BLOCK_LEN];
    for slot in chars[..len].iter_mut().rev() {
        *slot = ALPHABET[(num % 58) as usize];
        num /= 58;
    }
    out.extend(chars[..len].iter().map(|&c| char::from(c)));
}

fn decode_block(chars: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let len = decoded_block_len(chars.len()).ok_or(Error::BadLength {
        expected: FULL_ENCODED_BLOCK_LEN,
        actual: chars.len(),
    })?;

    let mut num = 0_u64;
    for &c in chars {
        let digit = alphabet_index(c).ok_or_else(|| Error::InvalidCharacter(char::from(c)))?;
        num = num
            .checked_mul(58)
            .and_then(|num| num.checked_add(digit))
            .ok_or(Error::Overflow {
                field: "base58 block",
            })?;
    }
    if len < FULL_BLOCK_LEN && num >> (8 * len) != 0 {
        return Err(Error::Overflow {
            field: "base58 block",
        });
    }

    let mut buffer = [0_u8; FULL_BLOCK_LEN];
    BigEndian::write_uint(&mut buffer, num, len);
    out.extend_from_slice(&buffer[..len]);
    Ok(())
}

pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(
        data.len() / FULL_BLOCK_LEN * FULL_ENCODED_BLOCK_LEN + FULL_ENCODED_BLOCK_LEN,
    );
    for block in data.chunks(FULL_BLOCK_LEN) {
        encode_block(block, &mut out);
    }
    out
}

pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded.len() / FULL_ENCODED_BLOCK_LEN * FULL_BLOCK_LEN + 8);
    for block in encoded.as_bytes().chunks(FULL_ENCODED_BLOCK_LEN) {
        decode_block(block, &mut out)?;
    }
    Ok(out)
}
