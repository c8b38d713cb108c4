//! Engine output profiles.
//!
//! The external binary's tabular output layout is not fixed: the number of
//! metadata rows before the header and the column set both change with the
//! flag set (elution-only vs `-BA`). A profile pins down one observed
//! layout; parsing never guesses.

use serde::{Deserialize, Serialize};

/// What a raw engine column means in the canonical schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Position index into the submitted peptide list
    Pos,
    Peptide,
    /// Source identifier the engine echoes back (`ID`)
    SourceName,
    AffinityNm,
    PercentileRank,
    /// Known column we deliberately do not carry into the canonical table
    Drop,
}

/// One versioned engine-output layout: metadata rows to skip, delimiter, and
/// a total mapping from engine column names to canonical roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputProfile {
    /// Metadata rows before the header row (the `-xls` file carries one
    /// allele banner line)
    pub skip_rows: usize,
    pub delimiter: char,
    columns: Vec<(String, ColumnRole)>,
}

impl OutputProfile {
    /// `netMHCpan -xls` elution-likelihood layout.
    #[must_use]
    pub fn xls() -> Self {
        Self {
            skip_rows: 1,
            delimiter: '\t',
            columns: base_columns(),
        }
    }

    /// `netMHCpan -xls -BA` layout: adds binding-affinity columns.
    #[must_use]
    pub fn xls_ba() -> Self {
        let mut columns = base_columns();
        columns.extend([
            ("BA-score".to_string(), ColumnRole::Drop),
            ("BA_Rank".to_string(), ColumnRole::Drop),
            ("Aff(nM)".to_string(), ColumnRole::AffinityNm),
        ]);
        Self {
            skip_rows: 1,
            delimiter: '\t',
            columns,
        }
    }

    /// Pick the profile matching an invocation's flag set.
    #[must_use]
    pub fn for_flags(binding_affinity: bool) -> Self {
        if binding_affinity {
            Self::xls_ba()
        } else {
            Self::xls()
        }
    }

    /// Override the metadata row count for engine builds with a different
    /// banner layout.
    #[must_use]
    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    /// Look up the role of a raw column name. `None` means the column is
    /// unknown to this profile, which the reducer treats as an error.
    #[must_use]
    pub fn role_of(&self, name: &str) -> Option<ColumnRole> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, role)| *role)
    }
}

fn base_columns() -> Vec<(String, ColumnRole)> {
    [
        ("Pos", ColumnRole::Pos),
        ("Peptide", ColumnRole::Peptide),
        ("ID", ColumnRole::SourceName),
        ("core", ColumnRole::Drop),
        ("icore", ColumnRole::Drop),
        ("EL-score", ColumnRole::Drop),
        ("EL_Rank", ColumnRole::PercentileRank),
        ("Ave", ColumnRole::Drop),
        ("NB", ColumnRole::Drop),
    ]
    .into_iter()
    .map(|(n, r)| (n.to_string(), r))
    .collect()
}
