use std::path::Path;

use cryptoconditions_codec::config::CodecConfig;
use cryptoconditions_codec::{Condition, ConditionEncoder, ConditionFields, ConditionType, Encoding};
use error::{ClientError, Result};

pub mod error;

/// Picks the encoding for a command: an explicit choice wins, then the
/// config file, then the codec default.
pub fn resolve_encoding(explicit: Option<Encoding>, config: Option<&Path>) -> Result<Encoding> {
    if let Some(encoding) = explicit {
        return Ok(encoding);
    }
    let Some(path) = config else {
        return Ok(Encoding::default());
    };
    let config = CodecConfig::load(path).map_err(|e| ClientError::Config(format!("{e:#}")))?;
    Ok(config.encoding)
}

/// Builds a condition from its parts and renders it as text.
pub fn encode(
    condition_type: ConditionType,
    fingerprint_hex: &str,
    cost: u64,
    subtypes: Vec<ConditionType>,
    encoding: Encoding,
) -> Result<String> {
    let fields = ConditionFields {
        condition_type,
        fingerprint: hex::decode(fingerprint_hex)?,
        cost,
        subtypes,
    };
    let condition = Condition::from(fields);
    Ok(ConditionEncoder::new(encoding).encode(&condition)?)
}

/// Decodes text and renders the condition's fields as pretty JSON.
pub fn decode(text: &str, encoding: Encoding) -> Result<String> {
    let condition = ConditionEncoder::new(encoding).decode(text.trim())?;
    Ok(serde_json::to_string_pretty(&ConditionFields::from(&condition))?)
}

/// Re-encodes condition text from one encoding to another.
pub fn convert(text: &str, from: Encoding, to: Encoding) -> Result<String> {
    let condition = ConditionEncoder::new(from).decode(text.trim())?;
    Ok(ConditionEncoder::new(to).encode(&condition)?)
}

/// Text form of the PREIMAGE-SHA-256 condition for a UTF-8 preimage.
pub fn preimage(preimage: &str, encoding: Encoding) -> Result<String> {
    let condition = Condition::preimage_sha256(preimage.as_bytes());
    Ok(ConditionEncoder::new(encoding).encode(&condition)?)
}
