//! Canonical DER encoding of conditions.
//!
//! Only the subset of DER needed by the crypto-conditions ASN.1 module is
//! supported: low-number tags, definite lengths, non-negative INTEGERs,
//! OCTET STRINGs and named-bit BIT STRINGs. The reader accepts exactly the
//! bytes the writer produces and nothing else.

use crate::condition::{Condition, ConditionType, SubtypeSet, FINGERPRINT_LEN, MAX_COST};
use crate::error::{DecodingError, EncodingError};

/// `[n]` context-specific, primitive.
pub(crate) const fn context(n: u8) -> u8 {
    0x80 | n
}

/// `[n]` context-specific, constructed.
pub(crate) const fn context_constructed(n: u8) -> u8 {
    0xA0 | n
}

/// Universal SEQUENCE tag.
pub(crate) const SEQUENCE: u8 = 0x30;

const TAG_NUMBER_MASK: u8 = 0x1F;

/// Appends a definite length in its shortest form.
pub(crate) fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

/// Appends a tag-length-value triple.
pub(crate) fn write_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    write_length(out, content.len());
    out.extend_from_slice(content);
}

/// Minimal two's-complement content octets of a non-negative integer.
pub(crate) fn encode_unsigned(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes
        .iter()
        .take(bytes.len() - 1)
        .take_while(|b| **b == 0)
        .count();
    let mut out = Vec::with_capacity(bytes.len() - skip + 1);
    if bytes[skip] & 0x80 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&bytes[skip..]);
    out
}

/// Content octets of the `ConditionTypes` named-bit BIT STRING.
///
/// Bit `i` (counting from the most significant bit of the first octet)
/// marks the type with id `i`; trailing zero bits are dropped.
pub(crate) fn encode_subtypes(set: SubtypeSet) -> Vec<u8> {
    let Some(highest) = set.iter().map(ConditionType::type_id).max() else {
        return vec![0];
    };
    let octets = highest as usize / 8 + 1;
    let mut out = vec![0u8; octets + 1];
    out[0] = 7 - highest % 8;
    for kind in set.iter() {
        let bit = kind.type_id() as usize;
        out[1 + bit / 8] |= 0x80 >> (bit % 8);
    }
    out
}

/// Writes the canonical DER form of `condition`.
pub fn write_condition(condition: &Condition) -> Result<Vec<u8>, EncodingError> {
    let kind = condition.condition_type();
    let fingerprint = condition.fingerprint();
    if fingerprint.len() != FINGERPRINT_LEN {
        return Err(EncodingError::FingerprintLength {
            expected: FINGERPRINT_LEN,
            actual: fingerprint.len(),
        });
    }
    if condition.cost() > MAX_COST {
        return Err(EncodingError::CostOutOfRange {
            cost: condition.cost(),
            max: MAX_COST,
        });
    }
    if !kind.is_compound() && !condition.subtypes().is_empty() {
        return Err(EncodingError::UnexpectedSubtypes(kind));
    }

    let mut body = Vec::with_capacity(48);
    write_tlv(&mut body, context(0), fingerprint);
    write_tlv(&mut body, context(1), &encode_unsigned(condition.cost()));
    if kind.is_compound() {
        write_tlv(&mut body, context(2), &encode_subtypes(condition.subtypes()));
    }

    let mut out = Vec::with_capacity(body.len() + 2);
    write_tlv(&mut out, context_constructed(kind.type_id()), &body);
    Ok(out)
}

/// Cursor over DER input with strict, canonical-only reads.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DerReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> DerReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn read_exact(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodingError> {
        if len > self.remaining() {
            return Err(DecodingError::UnexpectedEnd { field });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.bytes[start..start + len])
    }

    fn read_byte(&mut self, field: &'static str) -> Result<u8, DecodingError> {
        Ok(self.read_exact(1, field)?[0])
    }

    fn read_length(&mut self, field: &'static str) -> Result<usize, DecodingError> {
        let first = self.read_byte(field)?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            return Err(DecodingError::IndefiniteLength { field });
        }
        let count = (first & 0x7F) as usize;
        if count > std::mem::size_of::<usize>() {
            return Err(DecodingError::LengthOverflow { field });
        }
        let octets = self.read_exact(count, field)?;
        if octets[0] == 0 {
            return Err(DecodingError::NonCanonicalLength { field });
        }
        let len = octets
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize);
        if len < 0x80 {
            return Err(DecodingError::NonCanonicalLength { field });
        }
        Ok(len)
    }

    /// Reads any tag and its content. High-number tags are rejected.
    pub(crate) fn read_any(&mut self, field: &'static str) -> Result<(u8, &'a [u8]), DecodingError> {
        let tag = self.read_byte(field)?;
        if tag & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
            return Err(DecodingError::UnexpectedTag {
                field,
                expected: tag & !TAG_NUMBER_MASK,
                found: tag,
            });
        }
        let len = self.read_length(field)?;
        let content = self.read_exact(len, field)?;
        Ok((tag, content))
    }

    /// Reads a TLV, requiring `expected` as its tag.
    pub(crate) fn read_tlv(
        &mut self,
        expected: u8,
        field: &'static str,
    ) -> Result<&'a [u8], DecodingError> {
        let (found, content) = self.read_any(field)?;
        if found != expected {
            return Err(DecodingError::UnexpectedTag {
                field,
                expected,
                found,
            });
        }
        Ok(content)
    }

    /// Fails if any input is left unread.
    pub(crate) fn ensure_consumed(&self, field: &'static str) -> Result<(), DecodingError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(DecodingError::TrailingBytes {
                field,
                consumed: self.position(),
                remaining,
            }),
        }
    }
}

/// Parses the content octets of a non-negative INTEGER no larger than `max`.
pub(crate) fn decode_unsigned(
    content: &[u8],
    max: u64,
    field: &'static str,
) -> Result<u64, DecodingError> {
    let (first, rest) = content
        .split_first()
        .ok_or(DecodingError::InvalidInteger { field })?;
    if first & 0x80 != 0 {
        // negative
        return Err(DecodingError::IntegerOutOfRange { field });
    }
    if *first == 0 && rest.first().is_some_and(|b| b & 0x80 == 0) {
        return Err(DecodingError::NonCanonicalInteger { field });
    }
    if content.len() > std::mem::size_of::<u64>() + 1 {
        return Err(DecodingError::IntegerOutOfRange { field });
    }
    let value = content
        .iter()
        .fold(0u128, |acc, b| (acc << 8) | *b as u128);
    u64::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or(DecodingError::IntegerOutOfRange { field })
}

/// Parses the content octets of the `ConditionTypes` BIT STRING.
pub(crate) fn decode_subtypes(
    content: &[u8],
    field: &'static str,
) -> Result<SubtypeSet, DecodingError> {
    let (unused, bits) = content
        .split_first()
        .ok_or(DecodingError::InvalidBitString { field })?;
    let unused = *unused;
    if unused > 7 || (bits.is_empty() && unused != 0) {
        return Err(DecodingError::InvalidBitString { field });
    }
    let Some(last) = bits.last() else {
        return Ok(SubtypeSet::empty());
    };
    // padding bits must be zero and the last named bit must be set
    if last & ((1u8 << unused) - 1) != 0 || last & (1u8 << unused) == 0 {
        return Err(DecodingError::NonCanonicalBitString { field });
    }

    let mut set = SubtypeSet::empty();
    for (index, octet) in bits.iter().enumerate() {
        for offset in 0..8 {
            if octet & (0x80 >> offset) == 0 {
                continue;
            }
            let bit = index * 8 + offset;
            let kind = u8::try_from(bit)
                .ok()
                .and_then(ConditionType::from_type_id)
                .ok_or(DecodingError::UnknownSubtype(bit))?;
            set.insert(kind);
        }
    }
    Ok(set)
}

/// Parses a condition, accepting only its canonical DER encoding.
pub fn read_condition(bytes: &[u8]) -> Result<Condition, DecodingError> {
    let mut reader = DerReader::new(bytes);
    let (tag, body) = reader.read_any("condition")?;
    reader.ensure_consumed("condition")?;

    if tag & !TAG_NUMBER_MASK != context_constructed(0) {
        return Err(DecodingError::UnexpectedTag {
            field: "condition",
            expected: context_constructed(0),
            found: tag,
        });
    }
    let id = tag & TAG_NUMBER_MASK;
    let kind = ConditionType::from_type_id(id).ok_or(DecodingError::UnknownConditionType(id))?;

    let mut fields = DerReader::new(body);
    let fingerprint = fields.read_tlv(context(0), "fingerprint")?;
    if fingerprint.len() != FINGERPRINT_LEN {
        return Err(DecodingError::FingerprintLength {
            expected: FINGERPRINT_LEN,
            actual: fingerprint.len(),
        });
    }
    let cost = decode_unsigned(fields.read_tlv(context(1), "cost")?, MAX_COST, "cost")?;
    let subtypes = if kind.is_compound() {
        decode_subtypes(fields.read_tlv(context(2), "subtypes")?, "subtypes")?
    } else {
        SubtypeSet::empty()
    };
    fields.ensure_consumed(kind.name())?;

    Ok(Condition::new(kind, fingerprint, cost, subtypes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_PREIMAGE: &str =
        "A0258020E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855810100";

    fn zero_preimage() -> Vec<u8> {
        let mut der = vec![0xA0, 0x25, 0x80, 0x20];
        der.extend_from_slice(&[0u8; 32]);
        der.extend_from_slice(&[0x81, 0x01, 0x00]);
        der
    }

    #[test]
    fn length_forms() {
        let cases: [(usize, &[u8]); 5] = [
            (0, &[0x00]),
            (0x7F, &[0x7F]),
            (0x80, &[0x81, 0x80]),
            (0xFF, &[0x81, 0xFF]),
            (0x0104, &[0x82, 0x01, 0x04]),
        ];
        for (len, expected) in cases {
            let mut out = Vec::new();
            write_length(&mut out, len);
            assert_eq!(out, expected, "length {len}");
        }
    }

    #[test]
    fn unsigned_integers() {
        assert_eq!(encode_unsigned(0), [0x00]);
        assert_eq!(encode_unsigned(0x7F), [0x7F]);
        assert_eq!(encode_unsigned(0x80), [0x00, 0x80]);
        assert_eq!(encode_unsigned(131_072), [0x02, 0x00, 0x00]);
        assert_eq!(encode_unsigned(MAX_COST), [0x00, 0xFF, 0xFF, 0xFF, 0xFF]);

        assert_eq!(decode_unsigned(&[0x00, 0x80], MAX_COST, "cost"), Ok(0x80));
        assert_eq!(
            decode_unsigned(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF], MAX_COST, "cost"),
            Ok(MAX_COST)
        );
    }

    #[test]
    fn rejects_bad_integers() {
        assert_eq!(
            decode_unsigned(&[], MAX_COST, "cost"),
            Err(DecodingError::InvalidInteger { field: "cost" })
        );
        assert_eq!(
            decode_unsigned(&[0x00, 0x01], MAX_COST, "cost"),
            Err(DecodingError::NonCanonicalInteger { field: "cost" })
        );
        assert_eq!(
            decode_unsigned(&[0xFF], MAX_COST, "cost"),
            Err(DecodingError::IntegerOutOfRange { field: "cost" })
        );
        assert_eq!(
            decode_unsigned(&[0x01, 0x00, 0x00, 0x00, 0x00], MAX_COST, "cost"),
            Err(DecodingError::IntegerOutOfRange { field: "cost" })
        );
        assert_eq!(
            decode_unsigned(&[0x01; 12], u64::MAX, "cost"),
            Err(DecodingError::IntegerOutOfRange { field: "cost" })
        );
    }

    #[test]
    fn subtype_bit_strings() {
        assert_eq!(encode_subtypes(SubtypeSet::empty()), [0x00]);
        let set: SubtypeSet = [ConditionType::PreimageSha256].into_iter().collect();
        assert_eq!(encode_subtypes(set), [0x07, 0x80]);
        let set: SubtypeSet = [ConditionType::PreimageSha256, ConditionType::Ed25519Sha256]
            .into_iter()
            .collect();
        assert_eq!(encode_subtypes(set), [0x03, 0x88]);
        assert_eq!(decode_subtypes(&[0x03, 0x88], "subtypes"), Ok(set));
        assert_eq!(decode_subtypes(&[0x00], "subtypes"), Ok(SubtypeSet::empty()));
    }

    #[test]
    fn rejects_bad_bit_strings() {
        let field = "subtypes";
        assert_eq!(
            decode_subtypes(&[], field),
            Err(DecodingError::InvalidBitString { field })
        );
        assert_eq!(
            decode_subtypes(&[0x08, 0x80], field),
            Err(DecodingError::InvalidBitString { field })
        );
        assert_eq!(
            decode_subtypes(&[0x01], field),
            Err(DecodingError::InvalidBitString { field })
        );
        // a padding bit is set
        assert_eq!(
            decode_subtypes(&[0x07, 0x81], field),
            Err(DecodingError::NonCanonicalBitString { field })
        );
        // trailing zero bits were not trimmed
        assert_eq!(
            decode_subtypes(&[0x00, 0x80], field),
            Err(DecodingError::NonCanonicalBitString { field })
        );
        assert_eq!(
            decode_subtypes(&[0x07, 0x80, 0x00], field),
            Err(DecodingError::NonCanonicalBitString { field })
        );
        // bit 5 names no type
        assert_eq!(
            decode_subtypes(&[0x02, 0x04], field),
            Err(DecodingError::UnknownSubtype(5))
        );
    }

    #[test]
    fn known_vector() {
        let cond = Condition::preimage_sha256(b"");
        let der = write_condition(&cond).unwrap();
        assert_eq!(hex::encode_upper(&der), EMPTY_PREIMAGE);
        assert_eq!(read_condition(&der).unwrap(), cond);
    }

    #[test]
    fn compound_roundtrip() {
        let subtypes: SubtypeSet = [ConditionType::PreimageSha256, ConditionType::RsaSha256]
            .into_iter()
            .collect();
        let cond = Condition::new(ConditionType::ThresholdSha256, [7u8; 32], 1_000_000, subtypes);
        let der = write_condition(&cond).unwrap();
        assert_eq!(der[0], 0xA2);
        assert_eq!(&der[der.len() - 4..], [0x82, 0x02, 0x04, 0x90]);
        assert_eq!(read_condition(&der).unwrap(), cond);
    }

    #[test]
    fn write_rejects_invalid_fields() {
        let short = Condition::new(ConditionType::PreimageSha256, [0u8; 31], 0, SubtypeSet::empty());
        assert_eq!(
            write_condition(&short),
            Err(EncodingError::FingerprintLength {
                expected: 32,
                actual: 31
            })
        );

        let subtypes: SubtypeSet = [ConditionType::PreimageSha256].into_iter().collect();
        let simple = Condition::new(ConditionType::Ed25519Sha256, [0u8; 32], 0, subtypes);
        assert_eq!(
            write_condition(&simple),
            Err(EncodingError::UnexpectedSubtypes(ConditionType::Ed25519Sha256))
        );
    }

    #[test]
    fn rejects_non_minimal_length() {
        let mut der = zero_preimage();
        // outer length 0x25 as 81 25
        der.splice(1..2, [0x81, 0x25]);
        assert_eq!(
            read_condition(&der),
            Err(DecodingError::NonCanonicalLength { field: "condition" })
        );

        let mut der = zero_preimage();
        // fingerprint length 0x20 as 82 00 20
        der.splice(3..4, [0x82, 0x00, 0x20]);
        der[1] += 2;
        assert_eq!(
            read_condition(&der),
            Err(DecodingError::NonCanonicalLength {
                field: "fingerprint"
            })
        );
    }

    #[test]
    fn rejects_indefinite_length() {
        let mut der = zero_preimage();
        der[1] = 0x80;
        der.extend_from_slice(&[0x00, 0x00]);
        assert_eq!(
            read_condition(&der),
            Err(DecodingError::IndefiniteLength { field: "condition" })
        );
    }

    #[test]
    fn rejects_non_minimal_cost() {
        let mut der = zero_preimage();
        let len = der.len();
        der.splice(len - 2.., [0x02, 0x00, 0x00]);
        der[1] += 1;
        assert_eq!(
            read_condition(&der),
            Err(DecodingError::NonCanonicalInteger { field: "cost" })
        );
    }

    #[test]
    fn rejects_structural_mismatch() {
        // trailing garbage after the condition
        let mut der = zero_preimage();
        der.push(0x00);
        assert!(matches!(
            read_condition(&der),
            Err(DecodingError::TrailingBytes {
                field: "condition",
                remaining: 1,
                ..
            })
        ));

        // simple condition carrying a subtypes field
        let mut der = zero_preimage();
        der.extend_from_slice(&[0x82, 0x01, 0x00]);
        der[1] += 3;
        assert!(matches!(
            read_condition(&der),
            Err(DecodingError::TrailingBytes {
                field: "preimage-sha-256",
                ..
            })
        ));

        // compound condition missing subtypes
        let mut der = zero_preimage();
        der[0] = 0xA2;
        assert_eq!(
            read_condition(&der),
            Err(DecodingError::UnexpectedEnd { field: "subtypes" })
        );

        // unknown type id
        let mut der = zero_preimage();
        der[0] = 0xA5;
        assert_eq!(read_condition(&der), Err(DecodingError::UnknownConditionType(5)));

        // universal SEQUENCE instead of a context tag
        let mut der = zero_preimage();
        der[0] = SEQUENCE;
        assert!(matches!(
            read_condition(&der),
            Err(DecodingError::UnexpectedTag { found: 0x30, .. })
        ));

        // truncated
        let der = zero_preimage();
        assert_eq!(
            read_condition(&der[..20]),
            Err(DecodingError::UnexpectedEnd { field: "condition" })
        );
        assert_eq!(
            read_condition(&[]),
            Err(DecodingError::UnexpectedEnd { field: "condition" })
        );
    }

    #[test]
    fn rejects_wrong_fingerprint_length() {
        let mut der = vec![0xA0, 0x24, 0x80, 0x1F];
        der.extend_from_slice(&[0u8; 31]);
        der.extend_from_slice(&[0x81, 0x01, 0x00]);
        assert_eq!(
            read_condition(&der),
            Err(DecodingError::FingerprintLength {
                expected: 32,
                actual: 31
            })
        );
    }
}
