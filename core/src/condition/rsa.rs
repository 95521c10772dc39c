use super::{checked_cost, fingerprint_of, Condition, ConditionType, SubtypeSet};
use crate::der::{context, write_tlv};
use crate::error::EncodingError;

const MIN_MODULUS_LEN: usize = 128;
const MAX_MODULUS_LEN: usize = 512;

impl Condition {
    /// An RSA-PSS condition for the public key with the given big-endian
    /// `modulus`.
    ///
    /// The cost is the square of the modulus length in bytes.
    pub fn rsa_sha256(modulus: &[u8]) -> Result<Self, EncodingError> {
        if !(MIN_MODULUS_LEN..=MAX_MODULUS_LEN).contains(&modulus.len()) {
            return Err(EncodingError::ModulusLength(modulus.len()));
        }
        let mut fields = Vec::with_capacity(modulus.len() + 4);
        write_tlv(&mut fields, context(0), modulus);

        let len = modulus.len() as u64;
        Ok(Self::new(
            ConditionType::RsaSha256,
            fingerprint_of(&fields),
            checked_cost(len * len)?,
            SubtypeSet::empty(),
        ))
    }
}
