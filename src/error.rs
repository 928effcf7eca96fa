//! Errors produced while decoding, building or expanding transaction data.
//!
//! Signature and range proof verification never produce an `Error`: a forged
//! transaction is an expected input, so verification routines answer with `bool`.
//! `Error` is reserved for malformed encodings and for calls made with data
//! of the wrong shape.

use std::result;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum Error {
    #[fail(display = "input ended while reading {}", field)]
    Truncated { field: &'static str },

    #[fail(display = "bad length: expected {} bytes, got {}", expected, actual)]
    BadLength { expected: usize, actual: usize },

    #[fail(display = "checksum does not validate")]
    ChecksumMismatch,

    #[fail(display = "unknown tag 0x{:02x} for {}", tag, field)]
    UnknownTag { field: &'static str, tag: u8 },

    #[fail(display = "invalid base58 character {:?}", _0)]
    InvalidCharacter(char),

    #[fail(display = "value of {} does not fit its encoding", field)]
    Overflow { field: &'static str },

    #[fail(display = "varint is not minimally encoded")]
    NonCanonicalVarInt,

    #[fail(display = "non-canonical scalar in {}", field)]
    InvalidScalar { field: &'static str },

    #[fail(display = "{} is not a valid curve point", field)]
    InvalidPoint { field: &'static str },

    #[fail(display = "unimplemented: {}", _0)]
    Unimplemented(&'static str),

    #[fail(display = "{} unexpected trailing bytes", _0)]
    TrailingBytes(usize),

    #[fail(display = "{} = {} exceeds the limit of {}", field, value, limit)]
    LimitExceeded {
        field: &'static str,
        value: u64,
        limit: u64,
    },

    #[fail(
        display = "inputs have different ring sizes ({} and {})",
        expected,
        actual
    )]
    InconsistentRingSize { expected: usize, actual: usize },

    #[fail(display = "RingCT fields have not been expanded")]
    NotExpanded,

    #[fail(
        display = "{} has wrong shape: expected {}, got {}",
        field,
        expected,
        actual
    )]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[fail(display = "decoded amount does not open the output commitment")]
    CommitmentMismatch,

    #[fail(display = "invalid argument: {}", _0)]
    InvalidArgument(&'static str),
}

impl Error {
    pub(crate) fn shape(field: &'static str, expected: usize, actual: usize) -> Self {
        Error::ShapeMismatch {
            field,
            expected,
            actual,
        }
    }
}

#[test]
fn errors_name_the_offending_field() {
    let err = Error::Truncated { field: "key image" };
    assert_eq!(err.to_string(), "input ended while reading key image");

    let err = Error::UnknownTag {
        field: "input",
        tag: 0x07,
    };
    assert_eq!(err.to_string(), "unknown tag 0x07 for input");
}
