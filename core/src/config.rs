//! Codec configuration, stored as a small JSON file.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::encoding::{ConditionEncoder, Encoding};

/// The only tunable of the codec: which text encoding to use.
///
/// Missing fields fall back to the defaults, unknown fields are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub encoding: Encoding,
}

impl CodecConfig {
    /// Reads a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not JSON, names an unsupported
    /// encoding or carries any option other than `encoding`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cryptoconditions_codec::config::CodecConfig;
    ///
    /// let encoder = CodecConfig::load("./codec.json")?.encoder();
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)
            .with_context(|| format!("reading codec config {}", path.display()))?;
        let config: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("invalid codec config {}", path.display()))?;
        tracing::debug!(path = %path.display(), encoding = %config.encoding, "loaded codec config");
        Ok(config)
    }

    /// Writes the config as pretty JSON, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let mut json = serde_json::to_vec_pretty(self)?;
        json.push(b'\n');
        std::fs::write(path, json)
            .with_context(|| format!("writing codec config {}", path.display()))
    }

    /// An encoder bound to this configuration.
    pub fn encoder(&self) -> ConditionEncoder {
        ConditionEncoder::new(self.encoding)
    }
}
