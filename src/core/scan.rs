//! Subsequence scan: every fixed-length window of every input sequence.
//!
//! Both invocation strategies share this enumeration so that prediction
//! counts and ordering are identical regardless of how the engine is called.
//! Windows are emitted in sequence input order, then requested length order,
//! then ascending offset.

use crate::core::sequence::SequenceRecord;

/// One candidate peptide window over a source sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow<'a> {
    pub record: &'a SequenceRecord,
    pub offset: usize,
    pub length: usize,
}

impl ScanWindow<'_> {
    /// The peptide itself: `sequence[offset..offset + length]`.
    #[must_use]
    pub fn peptide(&self) -> &str {
        &self.record.sequence[self.offset..self.offset + self.length]
    }
}

/// Enumerate all windows of the requested lengths over all records.
///
/// A sequence shorter than a requested length contributes no windows for
/// that length.
#[must_use]
pub fn windows<'a>(records: &'a [SequenceRecord], lengths: &[usize]) -> Vec<ScanWindow<'a>> {
    let mut out = Vec::with_capacity(window_count(records, lengths));

    for record in records {
        for &length in lengths {
            if length == 0 || record.len() < length {
                continue;
            }
            for offset in 0..=(record.len() - length) {
                out.push(ScanWindow {
                    record,
                    offset,
                    length,
                });
            }
        }
    }

    out
}

/// Number of windows a scan will generate: for each sequence of length S and
/// each peptide length k, `max(0, S - k + 1)`.
#[must_use]
pub fn window_count(records: &[SequenceRecord], lengths: &[usize]) -> usize {
    records
        .iter()
        .map(|r| {
            lengths
                .iter()
                .filter(|&&k| k > 0)
                .map(|&k| (r.len() + 1).saturating_sub(k))
                .sum::<usize>()
        })
        .sum()
}
