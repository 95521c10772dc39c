use std::cmp::{Ordering, Reverse};

use super::{checked_cost, fingerprint_of, Condition, ConditionType, SubtypeSet};
use crate::der::{context, context_constructed, encode_unsigned, write_tlv};
use crate::error::EncodingError;

/// Cost added per subcondition, whether or not it is needed.
const COST_PER_SUBCONDITION: u64 = 1024;

/// Largest threshold the binary format allows.
const MAX_THRESHOLD: usize = u16::MAX as usize;

impl Condition {
    /// An M-of-N threshold condition over `subconditions`.
    ///
    /// Fingerprint contents are `SEQUENCE { threshold [0], subconditions [1]
    /// SET OF Condition }`, with the set in DER order so the fingerprint does
    /// not depend on the order subconditions are passed in. The cost is the
    /// sum of the `threshold` most expensive subconditions plus 1024 per
    /// subcondition.
    ///
    /// # Errors
    ///
    /// Fails if `threshold` is zero or exceeds the number of subconditions,
    /// if a subcondition cannot be encoded, or if the cost overflows.
    pub fn threshold_sha256(
        threshold: usize,
        subconditions: &[Condition],
    ) -> Result<Self, EncodingError> {
        let count = subconditions.len();
        if threshold == 0 || threshold > count || threshold > MAX_THRESHOLD {
            return Err(EncodingError::ThresholdOutOfRange {
                threshold,
                subconditions: count,
            });
        }

        let mut encoded = subconditions
            .iter()
            .map(Condition::to_der)
            .collect::<Result<Vec<_>, _>>()?;
        encoded.sort_by(|a, b| set_order(a, b));

        let mut fields = Vec::new();
        write_tlv(&mut fields, context(0), &encode_unsigned(threshold as u64));
        write_tlv(&mut fields, context_constructed(1), &encoded.concat());

        let mut costs = subconditions.iter().map(Condition::cost).collect::<Vec<_>>();
        costs.sort_unstable_by_key(|c| Reverse(*c));
        let cost = checked_cost(
            costs
                .into_iter()
                .take(threshold)
                .fold(0u64, u64::saturating_add)
                .saturating_add(COST_PER_SUBCONDITION.saturating_mul(count as u64)),
        )?;

        let mut subtypes = subconditions
            .iter()
            .fold(SubtypeSet::empty(), |acc, sub| {
                let mut own = sub.subtypes();
                own.insert(sub.condition_type());
                acc.union(own)
            });
        subtypes.remove(ConditionType::ThresholdSha256);

        Ok(Self::new(
            ConditionType::ThresholdSha256,
            fingerprint_of(&fields),
            cost,
            subtypes,
        ))
    }
}

/// DER SET OF ordering: octet-wise, the shorter encoding padded with zeros.
fn set_order(a: &[u8], b: &[u8]) -> Ordering {
    let octet = |s: &[u8], i: usize| s.get(i).copied().unwrap_or(0);
    (0..a.len().max(b.len()))
        .map(|i| octet(a, i).cmp(&octet(b, i)))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}
