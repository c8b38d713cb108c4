use serde::{Deserialize, Serialize};

use crate::core::sequence::SequenceRecord;

/// Canonical column order of a [`ResultTable`], identical for both
/// invocation strategies.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "allele",
    "source_sequence_name",
    "offset",
    "length",
    "peptide",
    "affinity_nm",
    "percentile_rank",
];

/// One scored peptide-allele pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingPrediction {
    pub allele: String,
    pub source_sequence_name: String,
    pub offset: usize,
    pub length: usize,
    pub peptide: String,

    /// Predicted binding affinity in nanomolar. Populated by affinity-scoring
    /// invocations (library strategy, or the process strategy with `-BA`);
    /// absent when the engine was asked for elution-likelihood output only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity_nm: Option<f64>,

    /// Percentile rank against the engine's background distribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile_rank: Option<f64>,
}

impl BindingPrediction {
    /// Check the subsequence invariant:
    /// `peptide == source_sequence[offset..offset + length]`.
    #[must_use]
    pub fn matches_source(&self, record: &SequenceRecord) -> bool {
        record.name == self.source_sequence_name
            && record.window(self.offset, self.length) == Some(self.peptide.as_str())
    }
}

impl std::fmt::Display for BindingPrediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({}[{}:{}])",
            self.allele,
            self.peptide,
            self.source_sequence_name,
            self.offset,
            self.offset + self.length
        )?;
        if let Some(affinity) = self.affinity_nm {
            write!(f, " affinity={affinity:.2}nM")?;
        }
        if let Some(rank) = self.percentile_rank {
            write!(f, " rank={rank}")?;
        }
        Ok(())
    }
}

/// Ordered canonical prediction table, terminal output of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub rows: Vec<BindingPrediction>,
}

impl ResultTable {
    #[must_use]
    pub fn new(rows: Vec<BindingPrediction>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BindingPrediction> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a BindingPrediction;
    type IntoIter = std::slice::Iter<'a, BindingPrediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
