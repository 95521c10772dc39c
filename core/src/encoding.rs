//! Text encodings for canonical condition bytes.

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::condition::Condition;
use crate::error::{DecodingError, SerializationError, UnsupportedEncodingError};

const PADDED: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(true)
    .with_decode_padding_mode(DecodePaddingMode::RequireCanonical);

const UNPADDED: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const BASE64: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDED);
const BASE64_NO_PAD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, UNPADDED);
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDED);
const BASE64_URL_NO_PAD: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, UNPADDED);

/// How condition bytes are rendered as text.
#[cfg_attr(
    feature = "json",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Uppercase base16, two characters per byte.
    Hex,
    /// Standard alphabet, `=` padded.
    #[default]
    Base64,
    /// Standard alphabet, no padding.
    Base64WithoutPadding,
    /// URL and filename safe alphabet (`-`, `_`), `=` padded.
    Base64Url,
    /// URL and filename safe alphabet, no padding.
    Base64UrlWithoutPadding,
}

impl Encoding {
    pub const ALL: [Encoding; 5] = [
        Self::Hex,
        Self::Base64,
        Self::Base64WithoutPadding,
        Self::Base64Url,
        Self::Base64UrlWithoutPadding,
    ];

    /// Configuration name, e.g. `BASE64URL_WITHOUT_PADDING`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hex => "HEX",
            Self::Base64 => "BASE64",
            Self::Base64WithoutPadding => "BASE64_WITHOUT_PADDING",
            Self::Base64Url => "BASE64URL",
            Self::Base64UrlWithoutPadding => "BASE64URL_WITHOUT_PADDING",
        }
    }

    /// Whether encoded output ends in `=` padding.
    pub const fn is_padded(self) -> bool {
        matches!(self, Self::Base64 | Self::Base64Url)
    }

    /// Renders `bytes` as text.
    pub fn encode_bytes(self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode_upper(bytes),
            Self::Base64 => BASE64.encode(bytes),
            Self::Base64WithoutPadding => BASE64_NO_PAD.encode(bytes),
            Self::Base64Url => BASE64_URL.encode(bytes),
            Self::Base64UrlWithoutPadding => BASE64_URL_NO_PAD.encode(bytes),
        }
    }

    /// Reverses [`Encoding::encode_bytes`].
    ///
    /// Hex is accepted in either case. Padded variants require canonical
    /// padding; unpadded variants accept input with or without it. Every
    /// Base64 variant rejects characters outside its own alphabet and
    /// non-zero trailing bits.
    pub fn decode_text(self, text: &str) -> Result<Vec<u8>, DecodingError> {
        let bytes = match self {
            Self::Hex => hex::decode(text)?,
            Self::Base64 => BASE64.decode(text)?,
            Self::Base64WithoutPadding => BASE64_NO_PAD.decode(text)?,
            Self::Base64Url => BASE64_URL.decode(text)?,
            Self::Base64UrlWithoutPadding => BASE64_URL_NO_PAD.decode(text)?,
        };
        Ok(bytes)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = UnsupportedEncodingError;

    /// Parses a configuration name (case-insensitive, `-` accepted for `_`).
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedEncodingError`] for any other name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnsupportedEncodingError(s.to_string()))
    }
}

/// Converts conditions to and from text with one fixed [`Encoding`].
///
/// The encoder holds no per-call state; a single instance may be shared
/// freely between threads.
///
/// # Example
///
/// ```
/// use cryptoconditions_codec::{Condition, ConditionEncoder, ConditionType, Encoding, SubtypeSet};
///
/// let encoder = ConditionEncoder::new(Encoding::Base64UrlWithoutPadding);
/// let condition = Condition::new(ConditionType::PreimageSha256, [0u8; 32], 0, SubtypeSet::empty());
///
/// let text = encoder.encode(&condition).unwrap();
/// assert_eq!(text, "oCWAIAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAgQEA");
/// assert_eq!(encoder.decode(&text).unwrap(), condition);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConditionEncoder {
    encoding: Encoding,
}

impl ConditionEncoder {
    pub const fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Writes `condition` as canonical DER, then as text.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] wrapping the DER failure if the
    /// condition's fields violate the binary format.
    pub fn encode(&self, condition: &Condition) -> Result<String, SerializationError> {
        let der = condition.to_der()?;
        Ok(self.encoding.encode_bytes(&der))
    }

    /// Parses text produced by [`ConditionEncoder::encode`] with the same
    /// encoding.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodingError`] if the text is not valid for the alphabet
    /// or the bytes are not a canonical DER condition.
    pub fn decode(&self, text: &str) -> Result<Condition, DecodingError> {
        self.encoding
            .decode_text(text)
            .and_then(|der| Condition::from_der(&der))
            .inspect_err(|e| {
                tracing::debug!(encoding = %self.encoding, error = %e, "rejected condition text");
            })
    }
}

impl From<Encoding> for ConditionEncoder {
    fn from(encoding: Encoding) -> Self {
        Self::new(encoding)
    }
}
