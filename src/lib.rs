//! # mhc-bind
//!
//! A library for orchestrating MHC-peptide binding predictions.
//!
//! Immunopeptidomics pipelines feed protein sequences and MHC allele sets to
//! binding-prediction engines such as `NetMHCpan`, but those engines expect
//! rigid input conventions and emit tool-specific tables. `mhc-bind` accepts
//! heterogeneous inputs (plain allele identifiers in many spellings,
//! identifier + pseudo-sequence pairs, FASTA records with full MHC sequences),
//! normalizes them, drives the engine over every peptide window, and reduces
//! the output to one canonical table with strong-binder annotations.
//!
//! ## Features
//!
//! - **Allele normalization**: Many HLA spellings collapse to one canonical
//!   form; unrecognized names pass through untouched for custom alleles
//! - **Two invocation strategies**: In-process scoring through a
//!   [`BindingScorer`](invoke::BindingScorer) binding, or subprocess
//!   invocation of the engine binary with scratch-file plumbing
//! - **Canonical results**: Both strategies produce the same ordered table,
//!   written atomically as CSV
//! - **Strong-binder classification**: Configurable affinity or
//!   percentile-rank cutoff
//!
//! ## Example
//!
//! ```rust,no_run
//! use mhc_bind::core::{AlleleSpec, EngineConfig, PredictionRequest, SequenceRecord};
//! use mhc_bind::invoke::{build_predictor, Predictor};
//! use mhc_bind::reduce;
//! use mhc_bind::report::{strong_binders, BinderThreshold};
//!
//! let request = PredictionRequest::new(
//!     vec![AlleleSpec::standard("HLA-A*02:01")],
//!     vec![SequenceRecord::new("P1", "NLYIQWLKDGGPSSGRPPPS")],
//!     EngineConfig::default(),
//! );
//!
//! let predictor = build_predictor(request.engine.strategy, None).unwrap();
//! let table = reduce::from_predictions(predictor.predict(&request).unwrap());
//!
//! for binder in strong_binders(&table, &BinderThreshold::rank(0.5)) {
//!     println!("{binder}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Data model for alleles, sequences, requests, and predictions
//! - [`parsing`]: Allele and protein input parsers (line-oriented and FASTA)
//! - [`normalize`]: HLA allele name normalization
//! - [`invoke`]: Predictor seam with library and process strategies
//! - [`reduce`]: Engine output parsing and canonical-table reduction
//! - [`report`]: Strong-binder classification
//! - [`output`]: Atomic CSV persistence
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod invoke;
pub mod normalize;
pub mod output;
pub mod parsing;
pub mod reduce;
pub mod report;

// Re-export commonly used types for convenience
pub use core::prediction::{BindingPrediction, ResultTable};
pub use core::request::{EngineConfig, PredictionRequest};
pub use core::types::*;
pub use core::{AlleleSpec, SequenceRecord};
pub use invoke::{build_predictor, Predictor};
pub use report::{strong_binders, BinderThreshold, ThresholdMetric};
