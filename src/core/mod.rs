//! Core data types for alleles, sequences, requests, and predictions.

pub mod allele;
pub mod prediction;
pub mod request;
pub mod scan;
pub mod sequence;
pub mod types;

pub use allele::AlleleSpec;
pub use prediction::{BindingPrediction, ResultTable};
pub use request::{EngineConfig, PredictionRequest};
pub use sequence::SequenceRecord;
pub use types::{Engine, Strategy};
