//! Serde integration: conditions as single string tokens.
//!
//! A condition field can be written with the default encoding (BASE64)
//! through the plain [`Serialize`]/[`Deserialize`] impls, with a fixed
//! encoding through one of the [`condition_serde`] modules, or through the
//! `serde_with` adapter [`EncodedCondition`].
//!
//! ```
//! use cryptoconditions_codec::{condition_serde, Condition};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Payment {
//!     #[serde(with = "condition_serde::base64url_unpadded")]
//!     execution_condition: Condition,
//! }
//!
//! let payment = Payment { execution_condition: Condition::preimage_sha256(b"") };
//! let json = serde_json::to_string(&payment).unwrap();
//! assert_eq!(json, r#"{"execution_condition":"oCWAIOOwxEKY_BwUmvv0yJlvuSQnrkHkZJuTTKSVmRt4UrhVgQEA"}"#);
//! ```

use std::marker::PhantomData;

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_with::hex::Hex;
use serde_with::{serde_as, DeserializeAs, SerializeAs};

use crate::condition::{Condition, ConditionType, SubtypeSet};
use crate::encoding::{ConditionEncoder, Encoding};

impl ConditionEncoder {
    /// Writes `condition` as one string token.
    ///
    /// An encoding failure is reported through the serializer's error type;
    /// nothing is written in that case.
    pub fn serialize<S>(&self, condition: &Condition, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = self.encode(condition).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Reads one string token and decodes it.
    pub fn deserialize<'de, D>(&self, deserializer: D) -> Result<Condition, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        self.decode(&text).map_err(de::Error::custom)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ConditionEncoder::default().serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ConditionEncoder::default().deserialize(deserializer)
    }
}

macro_rules! encoding_module {
    ($(#[$doc:meta])* $name:ident => $encoding:expr) => {
        $(#[$doc])*
        pub mod $name {
            use serde::{Deserializer, Serializer};

            use crate::condition::Condition;
            use crate::encoding::{ConditionEncoder, Encoding};

            pub fn serialize<S>(condition: &Condition, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                ConditionEncoder::new($encoding).serialize(condition, serializer)
            }

            pub fn deserialize<'de, D>(deserializer: D) -> Result<Condition, D::Error>
            where
                D: Deserializer<'de>,
            {
                ConditionEncoder::new($encoding).deserialize(deserializer)
            }
        }
    };
}

/// `#[serde(with = "...")]` helpers, one per [`Encoding`].
pub mod condition_serde {
    encoding_module!(
        /// Uppercase hex.
        hex => Encoding::Hex
    );
    encoding_module!(
        /// Standard base64, padded.
        base64 => Encoding::Base64
    );
    encoding_module!(
        /// Standard base64, unpadded.
        base64_unpadded => Encoding::Base64WithoutPadding
    );
    encoding_module!(
        /// URL-safe base64, padded.
        base64url => Encoding::Base64Url
    );
    encoding_module!(
        /// URL-safe base64, unpadded.
        base64url_unpadded => Encoding::Base64UrlWithoutPadding
    );
}

/// Type-level choice of [`Encoding`] for [`EncodedCondition`].
pub trait TextEncoding {
    const ENCODING: Encoding;
}

macro_rules! encoding_marker {
    ($(#[$doc:meta])* $name:ident => $encoding:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl TextEncoding for $name {
            const ENCODING: Encoding = $encoding;
        }
    };
}

encoding_marker!(HexText => Encoding::Hex);
encoding_marker!(Base64Text => Encoding::Base64);
encoding_marker!(Base64UnpaddedText => Encoding::Base64WithoutPadding);
encoding_marker!(Base64UrlText => Encoding::Base64Url);
encoding_marker!(Base64UrlUnpaddedText => Encoding::Base64UrlWithoutPadding);

/// `serde_with` adapter writing a condition with encoding `E`.
///
/// Composes with the usual wrappers, e.g.
/// `#[serde_as(as = "Option<EncodedCondition<HexText>>")]`.
pub struct EncodedCondition<E>(PhantomData<E>);

impl<E: TextEncoding> SerializeAs<Condition> for EncodedCondition<E> {
    fn serialize_as<S>(source: &Condition, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ConditionEncoder::new(E::ENCODING).serialize(source, serializer)
    }
}

impl<'de, E: TextEncoding> DeserializeAs<'de, Condition> for EncodedCondition<E> {
    fn deserialize_as<D>(deserializer: D) -> Result<Condition, D::Error>
    where
        D: Deserializer<'de>,
    {
        ConditionEncoder::new(E::ENCODING).deserialize(deserializer)
    }
}

/// Field-by-field view of a condition, for display and hand-written input.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionFields {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    #[serde_as(as = "Hex")]
    pub fingerprint: Vec<u8>,
    pub cost: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<ConditionType>,
}

impl From<&Condition> for ConditionFields {
    fn from(condition: &Condition) -> Self {
        Self {
            condition_type: condition.condition_type(),
            fingerprint: condition.fingerprint().to_vec(),
            cost: condition.cost(),
            subtypes: condition.subtypes().iter().collect(),
        }
    }
}

impl From<ConditionFields> for Condition {
    fn from(fields: ConditionFields) -> Self {
        Condition::new(
            fields.condition_type,
            fields.fingerprint,
            fields.cost,
            fields.subtypes.into_iter().collect::<SubtypeSet>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::MAX_COST;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Fulfillment {
        #[serde(with = "condition_serde::hex")]
        condition: Condition,
        memo: String,
    }

    #[serde_as]
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Offer {
        #[serde_as(as = "Option<EncodedCondition<Base64UrlUnpaddedText>>")]
        condition: Option<Condition>,
        #[serde_as(as = "Vec<EncodedCondition<HexText>>")]
        alternatives: Vec<Condition>,
    }

    fn zero_preimage() -> Condition {
        Condition::new(ConditionType::PreimageSha256, [0u8; 32], 0, SubtypeSet::empty())
    }

    #[test]
    fn default_is_base64() {
        let cond = Condition::preimage_sha256(b"");
        let json = serde_json::to_string(&cond).unwrap();
        assert_eq!(json, "\"oCWAIOOwxEKY/BwUmvv0yJlvuSQnrkHkZJuTTKSVmRt4UrhVgQEA\"");
        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cond);
    }

    #[test]
    fn with_module_field() {
        let value = Fulfillment {
            condition: zero_preimage(),
            memo: "hi".into(),
        };
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(
            json,
            r#"{"condition":"A02580200000000000000000000000000000000000000000000000000000000000000000810100","memo":"hi"}"#
        );
        let back: Fulfillment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn serde_with_adapters() {
        let value = Offer {
            condition: Some(zero_preimage()),
            alternatives: vec![Condition::preimage_sha256(b"")],
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json["condition"],
            "oCWAIAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAgQEA"
        );
        assert_eq!(
            json["alternatives"][0],
            "A0258020E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855810100"
        );
        let back: Offer = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);

        let none = Offer {
            condition: None,
            alternatives: vec![],
        };
        let json = serde_json::to_string(&none).unwrap();
        assert_eq!(json, r#"{"condition":null,"alternatives":[]}"#);
    }

    #[test]
    fn invalid_condition_is_an_error_not_a_string() {
        let value = Fulfillment {
            condition: Condition::new(
                ConditionType::PreimageSha256,
                [0u8; 32],
                MAX_COST + 1,
                SubtypeSet::empty(),
            ),
            memo: String::new(),
        };
        let err = serde_json::to_string(&value).unwrap_err();
        assert!(err.to_string().contains("cost 4294967296 exceeds"), "{err}");
    }

    #[test]
    fn malformed_text_is_rejected() {
        let json = r#"{"condition":"not hex","memo":""}"#;
        assert!(serde_json::from_str::<Fulfillment>(json).is_err());

        // a valid base64 condition fed to the hex field
        let json = r#"{"condition":"oCWAIAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAgQEA","memo":""}"#;
        assert!(serde_json::from_str::<Fulfillment>(json).is_err());

        assert!(serde_json::from_str::<Condition>("42").is_err());
    }

    #[test]
    fn fields_view() {
        let sub = Condition::preimage_sha256(b"abc");
        let cond = Condition::threshold_sha256(1, &[sub]).unwrap();
        let fields = ConditionFields::from(&cond);
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["type"], "threshold-sha-256");
        assert_eq!(json["cost"], 1027);
        assert_eq!(json["subtypes"], serde_json::json!(["preimage-sha-256"]));
        assert_eq!(json["fingerprint"].as_str().unwrap().len(), 64);

        let back: ConditionFields = serde_json::from_value(json).unwrap();
        assert_eq!(Condition::from(back), cond);

        let simple = ConditionFields::from(&zero_preimage());
        let json = serde_json::to_string(&simple).unwrap();
        assert!(!json.contains("subtypes"));
    }

    #[test]
    fn encoding_names_in_json() {
        let json = serde_json::to_string(&Encoding::Base64UrlWithoutPadding).unwrap();
        assert_eq!(json, "\"BASE64URL_WITHOUT_PADDING\"");
        let err = serde_json::from_str::<Encoding>("\"BASE32\"").unwrap_err();
        assert!(err.to_string().contains("unsupported encoding"), "{err}");
    }
}
