//! Predictor invocation adapter.
//!
//! One seam, two interchangeable strategies:
//!
//! - [`LibraryPredictor`]: subsequence scan in-process, scores obtained
//!   directly from a [`BindingScorer`] (the engine's library binding).
//! - [`ProcessPredictor`]: one external-binary invocation per allele, with
//!   scratch input files and delimited output parsed by the reducer.
//!
//! Callers pick a strategy through [`EngineConfig`](crate::core::EngineConfig)
//! and [`build_predictor`]; nothing downstream branches on it again.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;

use crate::core::prediction::BindingPrediction;
use crate::core::request::PredictionRequest;
use crate::core::types::Strategy;
use crate::reduce::ReduceError;

pub mod library;
pub mod process;

pub use library::{BindingScorer, BindingScore, EngineSession, LibraryPredictor};
pub use process::ProcessPredictor;

#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("unsupported prediction tool: {0:?} (expected \"NetMHCpan\")")]
    UnsupportedEngine(String),

    #[error("library strategy selected but no in-process engine binding is available")]
    NoScorer,

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{program} exited with {status}\n--- captured stdout ---\n{stdout}\n--- captured stderr ---\n{stderr}"
    )]
    EngineFailed {
        program: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("{program} did not finish within {seconds}s and was killed")]
    DeadlineExceeded { program: String, seconds: u64 },

    #[error("engine reported success but wrote no output file at {path}")]
    OutputMissing { path: PathBuf },

    #[error("engine output row {row} carries peptide {got:?}, expected {expected:?}")]
    PeptideMismatch {
        row: usize,
        got: String,
        expected: String,
    },

    #[error("engine output row {row} reports position {pos}, outside the {count} submitted peptide(s)")]
    RowOutOfRange { row: usize, pos: usize, count: usize },

    #[error("in-process scoring failed for {allele}/{peptide}: {message}")]
    Scorer {
        allele: String,
        peptide: String,
        message: String,
    },

    #[error("scratch file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Reduce(#[from] ReduceError),
}

/// A single entry point into the binding-prediction engine.
///
/// Implementations must be deterministic for a fixed request; failed
/// invocations are never retried automatically.
pub trait Predictor {
    /// Run one scan and return predictions in canonical order.
    ///
    /// # Errors
    ///
    /// Any [`InvocationError`] is fatal to the run; partial results are never
    /// returned.
    fn predict(&self, request: &PredictionRequest)
        -> Result<Vec<BindingPrediction>, InvocationError>;
}

/// Build the predictor selected by the configured strategy.
///
/// The library strategy needs an in-process engine binding; pass it as
/// `scorer`. The process strategy ignores `scorer`.
///
/// # Errors
///
/// Returns `InvocationError::NoScorer` when the library strategy is selected
/// without a binding.
pub fn build_predictor(
    strategy: Strategy,
    scorer: Option<Arc<dyn BindingScorer>>,
) -> Result<Box<dyn Predictor>, InvocationError> {
    match strategy {
        Strategy::Process => Ok(Box::new(ProcessPredictor)),
        Strategy::Library => match scorer {
            Some(scorer) => Ok(Box::new(LibraryPredictor::new(scorer))),
            None => Err(InvocationError::NoScorer),
        },
    }
}
