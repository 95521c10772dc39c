use thiserror::Error;

use crate::condition::ConditionType;

/// Crate-level error covering every stage of the codec.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Decoding(#[from] DecodingError),

    #[error(transparent)]
    UnsupportedEncoding(#[from] UnsupportedEncodingError),

    #[error(transparent)]
    UnknownConditionType(#[from] UnknownConditionTypeError),
}

/// A condition whose fields cannot be canonically written as DER.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("fingerprint must be {expected} bytes, got {actual}")]
    FingerprintLength { expected: usize, actual: usize },

    #[error("cost {cost} exceeds the maximum of {max}")]
    CostOutOfRange { cost: u64, max: u64 },

    #[error("{0} is a simple condition and cannot carry subtypes")]
    UnexpectedSubtypes(ConditionType),

    #[error("threshold {threshold} is out of range for {subconditions} subconditions")]
    ThresholdOutOfRange {
        threshold: usize,
        subconditions: usize,
    },

    #[error("RSA modulus must be between 128 and 512 bytes, got {0}")]
    ModulusLength(usize),
}

/// Failure to produce the text form of a condition field.
///
/// The underlying [`EncodingError`] is kept as the error source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot serialize condition: {source}")]
pub struct SerializationError {
    #[from]
    source: EncodingError,
}

impl SerializationError {
    /// The binary encoding failure that caused this error.
    pub fn encoding_error(&self) -> &EncodingError {
        &self.source
    }
}

/// An encoding name outside the recognized set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported encoding: {0:?}")]
pub struct UnsupportedEncodingError(pub String);

/// A condition type name outside the registered suite.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown condition type name {0:?}")]
pub struct UnknownConditionTypeError(pub String);

/// Errors while turning text back into a condition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodingError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("input ended while reading {field}")]
    UnexpectedEnd { field: &'static str },

    #[error("indefinite length is not allowed in DER ({field})")]
    IndefiniteLength { field: &'static str },

    #[error("non-minimal length encoding for {field}")]
    NonCanonicalLength { field: &'static str },

    #[error("length of {field} does not fit in memory")]
    LengthOverflow { field: &'static str },

    #[error("unexpected tag 0x{found:02x} for {field}, expected 0x{expected:02x}")]
    UnexpectedTag {
        field: &'static str,
        expected: u8,
        found: u8,
    },

    #[error("unknown condition type id {0}")]
    UnknownConditionType(u8),

    #[error("fingerprint must be {expected} bytes, got {actual}")]
    FingerprintLength { expected: usize, actual: usize },

    #[error("empty integer for {field}")]
    InvalidInteger { field: &'static str },

    #[error("non-minimal integer encoding for {field}")]
    NonCanonicalInteger { field: &'static str },

    #[error("integer out of range for {field}")]
    IntegerOutOfRange { field: &'static str },

    #[error("malformed bit string for {field}")]
    InvalidBitString { field: &'static str },

    #[error("non-canonical bit string for {field}")]
    NonCanonicalBitString { field: &'static str },

    #[error("unknown subtype bit {0}")]
    UnknownSubtype(usize),

    #[error("{remaining} trailing bytes after {field} (consumed {consumed})")]
    TrailingBytes {
        field: &'static str,
        consumed: usize,
        remaining: usize,
    },
}
