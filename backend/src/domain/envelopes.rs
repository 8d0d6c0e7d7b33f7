//! Classification of envelopes by allocation kind.

use crate::domain::models::Envelope;

/// Envelopes split by kind, each side in its original order
#[derive(Debug, Default)]
pub struct EnvelopePartition<'a> {
    pub fixed: Vec<&'a Envelope>,
    pub percentage: Vec<&'a Envelope>,
}

pub fn partition_envelopes(envelopes: &[Envelope]) -> EnvelopePartition<'_> {
    let (fixed, percentage) = envelopes.iter().partition(|envelope| envelope.is_fixed());
    EnvelopePartition { fixed, percentage }
}

/// Total claimed by fixed envelopes
pub fn fixed_total(envelopes: &[Envelope]) -> f64 {
    partition_envelopes(envelopes)
        .fixed
        .iter()
        .map(|envelope| envelope.amount())
        .sum()
}
