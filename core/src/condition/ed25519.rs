use ed25519_dalek::VerifyingKey;

use super::{fingerprint_of, Condition, ConditionType, SubtypeSet};
use crate::der::{context, write_tlv};

/// Fixed cost of an Ed25519 signature check.
const ED25519_COST: u64 = 131_072;

impl Condition {
    /// An Ed25519 signature condition for `public_key`.
    ///
    /// # Example
    ///
    /// ```
    /// use ed25519_dalek::SigningKey;
    /// use cryptoconditions_codec::Condition;
    ///
    /// let signing_key = SigningKey::from_bytes(&[7u8; 32]);
    /// let condition = Condition::ed25519_sha256(&signing_key.verifying_key());
    /// assert_eq!(condition.cost(), 131_072);
    /// ```
    pub fn ed25519_sha256(public_key: &VerifyingKey) -> Self {
        let mut fields = Vec::with_capacity(34);
        write_tlv(&mut fields, context(0), public_key.as_bytes());
        Self::new(
            ConditionType::Ed25519Sha256,
            fingerprint_of(&fields),
            ED25519_COST,
            SubtypeSet::empty(),
        )
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use sha2::{Digest, Sha256};

    use super::*;

    #[test]
    fn fingerprint_contents() {
        let vk = SigningKey::from_bytes(&[7u8; 32]).verifying_key();
        let cond = Condition::ed25519_sha256(&vk);

        let mut contents = vec![0x30, 0x22, 0x80, 0x20];
        contents.extend_from_slice(vk.as_bytes());
        let expected: [u8; 32] = Sha256::digest(&contents).into();
        assert_eq!(cond.fingerprint(), expected);

        let der = cond.to_der().unwrap();
        assert_eq!(der[0], 0xA4);
        assert_eq!(&der[der.len() - 5..], [0x81, 0x03, 0x02, 0x00, 0x00]);
        assert_eq!(Condition::from_der(&der).unwrap(), cond);
    }

    #[test]
    fn distinct_keys_distinct_fingerprints() {
        let a = SigningKey::from_bytes(&[1u8; 32]).verifying_key();
        let b = SigningKey::from_bytes(&[2u8; 32]).verifying_key();
        assert_ne!(
            Condition::ed25519_sha256(&a).fingerprint(),
            Condition::ed25519_sha256(&b).fingerprint()
        );
    }
}
