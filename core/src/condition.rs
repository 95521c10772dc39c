//! Crypto-condition values: type, fingerprint, cost and subtypes.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::der;
use crate::error::{DecodingError, EncodingError, UnknownConditionTypeError};

mod ed25519;
mod prefix;
mod preimage;
mod rsa;
mod threshold;

/// Length of every fingerprint defined for the SHA-256 condition suite.
pub const FINGERPRINT_LEN: usize = 32;

/// Largest cost representable in the binary format.
pub const MAX_COST: u64 = u32::MAX as u64;

/// The five registered crypto-condition types.
#[cfg_attr(
    feature = "json",
    derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionType {
    /// SHA-256 hashlock over a secret preimage.
    PreimageSha256,
    /// Prefix over a subcondition.
    PrefixSha256,
    /// M-of-N threshold over subconditions.
    ThresholdSha256,
    /// RSA-PSS signature.
    RsaSha256,
    /// Ed25519 signature.
    Ed25519Sha256,
}

impl ConditionType {
    /// All types in type-id order.
    pub const ALL: [ConditionType; 5] = [
        Self::PreimageSha256,
        Self::PrefixSha256,
        Self::ThresholdSha256,
        Self::RsaSha256,
        Self::Ed25519Sha256,
    ];

    /// Registered numeric type id, also the context tag number in DER.
    pub const fn type_id(self) -> u8 {
        match self {
            Self::PreimageSha256 => 0,
            Self::PrefixSha256 => 1,
            Self::ThresholdSha256 => 2,
            Self::RsaSha256 => 3,
            Self::Ed25519Sha256 => 4,
        }
    }

    /// Looks a type up by its registered id.
    pub fn from_type_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Compound types carry a subtype set in their binary form.
    pub const fn is_compound(self) -> bool {
        matches!(self, Self::PrefixSha256 | Self::ThresholdSha256)
    }

    /// Registered lowercase name, e.g. `preimage-sha-256`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PreimageSha256 => "preimage-sha-256",
            Self::PrefixSha256 => "prefix-sha-256",
            Self::ThresholdSha256 => "threshold-sha-256",
            Self::RsaSha256 => "rsa-sha-256",
            Self::Ed25519Sha256 => "ed25519-sha-256",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConditionType {
    type Err = UnknownConditionTypeError;

    /// Parses a registered type name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownConditionTypeError(s.to_string()))
    }
}

/// Set of condition types, stored as a bitmask indexed by type id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SubtypeSet(u8);

impl SubtypeSet {
    const KNOWN: u8 = (1 << ConditionType::ALL.len()) - 1;

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from raw bits, rejecting bits that name no known type.
    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits & !Self::KNOWN == 0).then_some(Self(bits))
    }

    /// Raw bitmask; bit `i` is the type with id `i`.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn insert(&mut self, kind: ConditionType) {
        self.0 |= 1 << kind.type_id();
    }

    pub fn remove(&mut self, kind: ConditionType) {
        self.0 &= !(1 << kind.type_id());
    }

    pub const fn contains(self, kind: ConditionType) -> bool {
        self.0 & (1 << kind.type_id()) != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in type-id order.
    pub fn iter(self) -> impl Iterator<Item = ConditionType> {
        ConditionType::ALL
            .into_iter()
            .filter(move |t| self.contains(*t))
    }
}

impl FromIterator<ConditionType> for SubtypeSet {
    fn from_iter<I: IntoIterator<Item = ConditionType>>(iter: I) -> Self {
        let mut set = Self::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Display for SubtypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.iter().map(ConditionType::name).collect::<Vec<_>>();
        f.write_str(&names.join(","))
    }
}

/// A crypto-condition: a commitment described by its type, fingerprint and
/// verification cost.
///
/// Values are immutable. Field constraints of the binary format are checked
/// when the condition is encoded, not when it is built, so a structurally
/// invalid condition can exist in memory but never reaches the wire.
///
/// # Example
///
/// ```
/// use cryptoconditions_codec::{Condition, ConditionType};
///
/// let condition = Condition::preimage_sha256(b"");
/// assert_eq!(condition.condition_type(), ConditionType::PreimageSha256);
/// assert_eq!(condition.cost(), 0);
/// assert_eq!(hex::encode_upper(condition.to_der().unwrap()),
///     "A0258020E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855810100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    kind: ConditionType,
    fingerprint: Vec<u8>,
    cost: u64,
    subtypes: SubtypeSet,
}

impl Condition {
    /// Assembles a condition from already-computed parts.
    pub fn new(
        kind: ConditionType,
        fingerprint: impl Into<Vec<u8>>,
        cost: u64,
        subtypes: SubtypeSet,
    ) -> Self {
        Self {
            kind,
            fingerprint: fingerprint.into(),
            cost,
            subtypes,
        }
    }

    pub fn condition_type(&self) -> ConditionType {
        self.kind
    }

    pub fn fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn subtypes(&self) -> SubtypeSet {
        self.subtypes
    }

    /// Canonical DER encoding of this condition.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingError`] if the fingerprint is not
    /// [`FINGERPRINT_LEN`] bytes, the cost exceeds [`MAX_COST`], or a simple
    /// condition carries subtypes.
    pub fn to_der(&self) -> Result<Vec<u8>, EncodingError> {
        der::write_condition(self)
    }

    /// Parses a condition from its canonical DER encoding.
    ///
    /// Any encoding other than the canonical one is rejected.
    pub fn from_der(bytes: &[u8]) -> Result<Self, DecodingError> {
        der::read_condition(bytes)
    }
}

/// SHA-256 over `SEQUENCE { fields }`, the fingerprint of every
/// condition type except preimage.
fn fingerprint_of(fields: &[u8]) -> [u8; FINGERPRINT_LEN] {
    let mut contents = Vec::with_capacity(fields.len() + 4);
    der::write_tlv(&mut contents, der::SEQUENCE, fields);
    Sha256::digest(&contents).into()
}

/// Cost that fits the binary format, or the error naming the overflow.
fn checked_cost(cost: u64) -> Result<u64, EncodingError> {
    (cost <= MAX_COST)
        .then_some(cost)
        .ok_or(EncodingError::CostOutOfRange {
            cost,
            max: MAX_COST,
        })
}

#[cfg(feature = "bincode")]
mod transport {
    use bincode::de::{BorrowDecoder, Decoder};
    use bincode::enc::Encoder;
    use bincode::error::{DecodeError, EncodeError};
    use bincode::{BorrowDecode, Decode, Encode};

    use super::Condition;

    /// Conditions travel through bincode as their DER bytes.
    impl Encode for Condition {
        fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
            let der = self
                .to_der()
                .map_err(|e| EncodeError::OtherString(e.to_string()))?;
            der.encode(encoder)
        }
    }

    impl<Context> Decode<Context> for Condition {
        fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
            let der = Vec::<u8>::decode(decoder)?;
            Condition::from_der(&der).map_err(|e| DecodeError::OtherString(e.to_string()))
        }
    }

    impl<'de, Context> BorrowDecode<'de, Context> for Condition {
        fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
            decoder: &mut D,
        ) -> Result<Self, DecodeError> {
            Self::decode(decoder)
        }
    }
}
