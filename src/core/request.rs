use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::allele::AlleleSpec;
use crate::core::sequence::SequenceRecord;
use crate::core::types::{Engine, Strategy};

/// Default peptide length scanned when the caller does not ask for others.
pub const DEFAULT_PEPTIDE_LENGTH: usize = 9;

/// Engine selection and tuning for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub engine: Engine,
    pub strategy: Strategy,

    /// Binary name or path (process strategy) / program identity (library
    /// strategy). Defaults to the engine's conventional name.
    pub program: String,

    /// Worker-process cap handed through to the engine; `-1` keeps the
    /// engine's own default. Opaque to this crate.
    pub process_limit: i32,

    /// Request binding-affinity scores in addition to elution likelihood
    /// (`-BA` for the external binary).
    pub binding_affinity: bool,

    /// Extra engine-specific flags appended verbatim.
    pub extra_flags: Vec<String>,

    /// Upper bound on one external invocation. `None` blocks indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Duration>,

    /// Override for the number of metadata rows before the engine output
    /// header, for engine builds whose banner layout differs from the
    /// profile default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_rows: Option<usize>,

    /// Directory for scratch peptide/FASTA/output files created by the
    /// process strategy. Defaults to the system temp directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl EngineConfig {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            strategy: Strategy::default(),
            program: engine.default_program().to_string(),
            process_limit: -1,
            binding_affinity: false,
            extra_flags: Vec::new(),
            deadline: None,
            skip_rows: None,
            scratch_dir: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Engine::NetMhcPan)
    }
}

/// Immutable description of one prediction run: which alleles, which
/// sequences, which peptide lengths, and how to call the engine.
///
/// Built once from parsed input and consumed by the invocation adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub alleles: Vec<AlleleSpec>,
    pub sequences: Vec<SequenceRecord>,
    pub peptide_lengths: Vec<usize>,
    pub engine: EngineConfig,
}

impl PredictionRequest {
    #[must_use]
    pub fn new(
        alleles: Vec<AlleleSpec>,
        sequences: Vec<SequenceRecord>,
        engine: EngineConfig,
    ) -> Self {
        Self {
            alleles,
            sequences,
            peptide_lengths: vec![DEFAULT_PEPTIDE_LENGTH],
            engine,
        }
    }

    /// Replace the default peptide lengths. Empty input keeps the default.
    #[must_use]
    pub fn with_peptide_lengths(mut self, lengths: Vec<usize>) -> Self {
        if !lengths.is_empty() {
            self.peptide_lengths = lengths;
        }
        self
    }

    /// Alleles resolved by the engine's built-in database.
    pub fn standard_alleles(&self) -> impl Iterator<Item = &AlleleSpec> {
        self.alleles.iter().filter(|a| a.is_standard())
    }

    /// Alleles carrying a custom pseudo- or full sequence.
    pub fn custom_alleles(&self) -> impl Iterator<Item = &AlleleSpec> {
        self.alleles.iter().filter(|a| !a.is_standard())
    }

    /// Total predictions this request will produce:
    /// `window_count(sequences, lengths) * alleles`.
    #[must_use]
    pub fn expected_predictions(&self) -> usize {
        crate::core::scan::window_count(&self.sequences, &self.peptide_lengths)
            * self.alleles.len()
    }
}
