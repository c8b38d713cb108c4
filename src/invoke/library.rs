//! Library strategy: in-process scan against a [`BindingScorer`].
//!
//! The predictor owns the subsequence scan and the engine session setup;
//! the scorer is whatever binds the engine's scoring routine into the
//! process (tests use a deterministic stand-in).

use std::sync::Arc;

use tracing::debug;

use crate::core::prediction::BindingPrediction;
use crate::core::request::PredictionRequest;
use crate::core::scan;
use crate::invoke::{InvocationError, Predictor};
use crate::normalize::normalize_allele;

/// One scored peptide-allele pair as returned by the engine binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingScore {
    pub affinity_nm: f64,
    pub percentile_rank: Option<f64>,
}

/// Engine tuning handed to the binding once per scan.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSession {
    /// Program identity (which engine build to bind)
    pub program: String,
    /// Standard alleles by normalized identifier
    pub standard_alleles: Vec<String>,
    /// Custom alleles as `identifier:sequence` directives
    pub custom_alleles: Vec<String>,
    pub peptide_lengths: Vec<usize>,
    /// Engine-internal worker cap, -1 for the engine default
    pub process_limit: i32,
    pub extra_flags: Vec<String>,
}

/// In-process binding to the engine's scoring routine.
pub trait BindingScorer: Send + Sync {
    /// Configure the engine for a scan. Called once per request, before any
    /// scoring.
    fn begin_scan(&self, session: &EngineSession) -> Result<(), String>;

    /// Score one peptide against one allele identifier (normalized for
    /// standard alleles, raw for custom ones).
    fn score(&self, allele: &str, peptide: &str) -> Result<BindingScore, String>;
}

/// Predictor that scans in-process and scores through a [`BindingScorer`].
pub struct LibraryPredictor {
    scorer: Arc<dyn BindingScorer>,
}

impl LibraryPredictor {
    pub fn new(scorer: Arc<dyn BindingScorer>) -> Self {
        Self { scorer }
    }
}

impl Predictor for LibraryPredictor {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<Vec<BindingPrediction>, InvocationError> {
        let session = EngineSession {
            program: request.engine.program.clone(),
            standard_alleles: request
                .standard_alleles()
                .map(|a| normalize_allele(&a.identifier))
                .collect(),
            custom_alleles: request
                .custom_alleles()
                .filter_map(|a| a.custom_directive())
                .collect(),
            peptide_lengths: request.peptide_lengths.clone(),
            process_limit: request.engine.process_limit,
            extra_flags: request.engine.extra_flags.clone(),
        };

        self.scorer.begin_scan(&session).map_err(|message| {
            InvocationError::Scorer {
                allele: String::new(),
                peptide: String::new(),
                message,
            }
        })?;

        // Allele labels in output order: normalized for standard alleles,
        // as-given for custom ones.
        let labels: Vec<String> = request
            .alleles
            .iter()
            .map(|a| {
                if a.is_standard() {
                    normalize_allele(&a.identifier)
                } else {
                    a.identifier.clone()
                }
            })
            .collect();

        let windows = scan::windows(&request.sequences, &request.peptide_lengths);
        debug!(
            "library scan: {} window(s) x {} allele(s)",
            windows.len(),
            labels.len()
        );

        let mut predictions = Vec::with_capacity(windows.len() * labels.len());

        for window in &windows {
            for label in &labels {
                let peptide = window.peptide();
                let score = self.scorer.score(label, peptide).map_err(|message| {
                    InvocationError::Scorer {
                        allele: label.clone(),
                        peptide: peptide.to_string(),
                        message,
                    }
                })?;

                predictions.push(BindingPrediction {
                    allele: label.clone(),
                    source_sequence_name: window.record.name.clone(),
                    offset: window.offset,
                    length: window.length,
                    peptide: peptide.to_string(),
                    affinity_nm: Some(score.affinity_nm),
                    percentile_rank: score.percentile_rank,
                });
            }
        }

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::core::allele::AlleleSpec;
    use crate::core::request::EngineConfig;
    use crate::core::sequence::SequenceRecord;

    /// Deterministic stand-in: affinity = peptide length, rank = 1.0,
    /// records the session it was configured with.
    #[derive(Default)]
    struct RecordingScorer {
        session: Mutex<Option<EngineSession>>,
        fail_scoring: bool,
    }

    impl BindingScorer for RecordingScorer {
        fn begin_scan(&self, session: &EngineSession) -> Result<(), String> {
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        fn score(&self, _allele: &str, peptide: &str) -> Result<BindingScore, String> {
            if self.fail_scoring {
                return Err("engine rejected peptide".to_string());
            }
            Ok(BindingScore {
                affinity_nm: peptide.len() as f64,
                percentile_rank: Some(1.0),
            })
        }
    }

    fn request() -> PredictionRequest {
        PredictionRequest::new(
            vec![
                AlleleSpec::standard("hla-a0201"),
                AlleleSpec::with_pseudo_sequence("USER_DEF", "MSAQRV"),
            ],
            vec![SequenceRecord::new("P1", "NLYIQWLKDGGPSSGRPPPS")],
            EngineConfig::default(),
        )
    }

    #[test]
    fn test_session_partitions_and_normalizes_alleles() {
        let scorer = Arc::new(RecordingScorer::default());
        let predictor = LibraryPredictor::new(Arc::clone(&scorer) as Arc<dyn BindingScorer>);
        predictor.predict(&request()).unwrap();

        let session = scorer.session.lock().unwrap().clone().unwrap();
        assert_eq!(session.standard_alleles, vec!["HLA-A*02:01"]);
        assert_eq!(session.custom_alleles, vec!["USER_DEF:MSAQRV"]);
        assert_eq!(session.peptide_lengths, vec![9]);
        assert_eq!(session.process_limit, -1);
        assert_eq!(session.program, "netMHCpan");
    }

    #[test]
    fn test_prediction_count_and_invariant() {
        let predictor =
            LibraryPredictor::new(Arc::new(RecordingScorer::default()) as Arc<dyn BindingScorer>);
        let request = request();
        let predictions = predictor.predict(&request).unwrap();

        // 12 windows x 2 alleles
        assert_eq!(predictions.len(), request.expected_predictions());
        assert_eq!(predictions.len(), 24);

        for p in &predictions {
            assert!(p.matches_source(&request.sequences[0]));
            assert_eq!(p.affinity_nm, Some(9.0));
        }
    }

    #[test]
    fn test_custom_allele_label_is_raw_identifier() {
        let predictor =
            LibraryPredictor::new(Arc::new(RecordingScorer::default()) as Arc<dyn BindingScorer>);
        let predictions = predictor.predict(&request()).unwrap();

        let alleles: Vec<&str> = predictions[..2].iter().map(|p| p.allele.as_str()).collect();
        assert_eq!(alleles, vec!["HLA-A*02:01", "USER_DEF"]);
    }

    #[test]
    fn test_scorer_failure_is_fatal() {
        let scorer = RecordingScorer {
            fail_scoring: true,
            ..Default::default()
        };
        let predictor = LibraryPredictor::new(Arc::new(scorer) as Arc<dyn BindingScorer>);
        let err = predictor.predict(&request()).unwrap_err();
        assert!(matches!(err, InvocationError::Scorer { .. }));
    }
}
