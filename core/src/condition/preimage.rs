use sha2::{Digest, Sha256};

use super::{Condition, ConditionType, SubtypeSet, FINGERPRINT_LEN};

impl Condition {
    /// A hashlock condition satisfied by `preimage`.
    ///
    /// The fingerprint is `SHA-256(preimage)` and the cost is the preimage
    /// length in bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use cryptoconditions_codec::Condition;
    ///
    /// let condition = Condition::preimage_sha256(b"my-secret-preimage");
    /// assert_eq!(condition.cost(), 18);
    /// ```
    pub fn preimage_sha256(preimage: impl AsRef<[u8]>) -> Self {
        let preimage = preimage.as_ref();
        let fingerprint: [u8; FINGERPRINT_LEN] = Sha256::digest(preimage).into();
        Self::new(
            ConditionType::PreimageSha256,
            fingerprint,
            preimage.len() as u64,
            SubtypeSet::empty(),
        )
    }
}
