//! Canonical binary and text encodings of Interledger crypto-conditions.
//!
//! A [`Condition`] is written as DER (see [`der`]) and the DER bytes are
//! rendered as text with one of five [`Encoding`]s. Decoding is strict:
//! only the canonical DER form of a condition is accepted.

/// Condition data model and fingerprint builders
pub mod condition;
/// Canonical DER writer and reader
pub mod der;
/// Hex/base64 multiplexing over DER bytes
pub mod encoding;
pub mod error;

#[cfg(feature = "json")]
pub mod config;
/// Serde hooks for embedding conditions in documents
#[cfg(feature = "json")]
pub mod serde;

pub use condition::{Condition, ConditionType, SubtypeSet, FINGERPRINT_LEN, MAX_COST};
pub use encoding::{ConditionEncoder, Encoding};
pub use error::{
    DecodingError, EncodingError, Error, SerializationError, UnknownConditionTypeError,
    UnsupportedEncodingError,
};
#[cfg(feature = "json")]
pub use crate::serde::{
    condition_serde, Base64Text, Base64UnpaddedText, Base64UrlText, Base64UrlUnpaddedText,
    ConditionFields, EncodedCondition, HexText, TextEncoding,
};

pub type Result<T> = std::result::Result<T, Error>;
