use super::{checked_cost, fingerprint_of, Condition, ConditionType};
use crate::der::{context, context_constructed, encode_unsigned, write_tlv};
use crate::error::EncodingError;

/// Fixed overhead added to the cost of every prefix condition.
const PREFIX_COST: u64 = 1024;

impl Condition {
    /// A prefix condition over `subcondition`.
    ///
    /// Fingerprint contents are
    /// `SEQUENCE { prefix [0], maxMessageLength [1], subcondition [2] }`
    /// and the cost is `len(prefix) + max_message_length + sub.cost + 1024`.
    ///
    /// # Errors
    ///
    /// Fails if the subcondition cannot be encoded or the resulting cost
    /// overflows the binary format.
    pub fn prefix_sha256(
        prefix: &[u8],
        max_message_length: u32,
        subcondition: &Condition,
    ) -> Result<Self, EncodingError> {
        let mut fields = Vec::with_capacity(prefix.len() + 64);
        write_tlv(&mut fields, context(0), prefix);
        write_tlv(
            &mut fields,
            context(1),
            &encode_unsigned(max_message_length.into()),
        );
        write_tlv(&mut fields, context_constructed(2), &subcondition.to_der()?);

        let cost = checked_cost(
            (prefix.len() as u64)
                .saturating_add(max_message_length.into())
                .saturating_add(subcondition.cost())
                .saturating_add(PREFIX_COST),
        )?;

        let mut subtypes = subcondition.subtypes();
        subtypes.insert(subcondition.condition_type());
        subtypes.remove(ConditionType::PrefixSha256);

        Ok(Self::new(
            ConditionType::PrefixSha256,
            fingerprint_of(&fields),
            cost,
            subtypes,
        ))
    }
}
