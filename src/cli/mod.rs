//! Command-line interface for mhc-bind.
//!
//! Available commands:
//!
//! - **predict**: parse inputs, invoke the engine, classify strong binders,
//!   and persist the canonical table
//! - **alleles**: parse an allele file and show the normalized allele set
//!
//! ## Usage
//!
//! ```text
//! # Predict 9-mer binders with the netMHCpan binary on PATH
//! mhc-bind predict proteins.txt alleles.txt
//!
//! # Affinity scores too, named output file, JSON report
//! mhc-bind predict proteins.txt alleles.txt --ba --output-name run1 --format json
//!
//! # Inspect how allele names normalize
//! mhc-bind alleles alleles.txt
//! ```

use clap::{Parser, Subcommand};

pub mod alleles;
pub mod predict;

#[derive(Parser)]
#[command(name = "mhc-bind")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Orchestrate MHC-peptide binding predictions")]
#[command(
    long_about = "mhc-bind normalizes heterogeneous allele and protein inputs, invokes the NetMHCpan binding-prediction engine, and reduces its output to one canonical table with strong-binder annotations.\n\nAlleles may be given as plain identifiers, identifier + pseudo-sequence pairs, or FASTA records with full MHC sequences; proteins as NAME SEQUENCE lines."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a binding-prediction scan
    Predict(predict::PredictArgs),

    /// Parse and normalize an allele file
    Alleles(alleles::AllelesArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
