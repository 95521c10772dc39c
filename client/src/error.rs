use cryptoconditions_codec::{DecodingError, SerializationError};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid fingerprint hex: {0}")]
    Fingerprint(#[from] hex::FromHexError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error("Cannot decode condition: {0}")]
    Decoding(#[from] DecodingError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
