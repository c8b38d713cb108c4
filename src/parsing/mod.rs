//! Parsers for allele and peptide/protein input files.
//!
//! Two input kinds are accepted:
//!
//! - **Allele files** ([`allele`]): either line-oriented
//!   (`IDENTIFIER [PSEUDO_SEQUENCE]` per line) or FASTA, where each record's
//!   header becomes the allele identifier and the body its full MHC sequence.
//!   The dialect is detected from the first content line.
//! - **Peptide/protein files** ([`peptide`]): line-oriented `NAME SEQUENCE`
//!   pairs.
//!
//! Both accept `#` comment lines and blank lines, and transparently
//! decompress `.gz`/`.bgz` files.

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;

pub mod allele;
pub mod peptide;

pub use allele::parse_allele_file;
pub use peptide::{parse_peptide_file, LineHandling};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("FASTA error: {0}")]
    Fasta(String),

    #[error("line {line}: expected NAME SEQUENCE, found {found} field(s)")]
    TokenCount { line: usize, found: usize },

    #[error("line {line}: invalid residue {residue:?} in sequence for {name:?}")]
    InvalidResidue {
        line: usize,
        name: String,
        residue: char,
    },

    #[error("duplicate allele {identifier:?} with conflicting sequences")]
    DuplicateAllele { identifier: String },

    #[error("line {line}: duplicate sequence name {name:?}")]
    DuplicateName { name: String, line: usize },
}

/// Read a text input file, decompressing gzip/bgzip by extension.
pub(crate) fn read_input(path: &Path) -> Result<String, ParseError> {
    let attach = |source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = std::fs::read(path).map_err(attach)?;

    let text = if is_gzipped(path) {
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut out = String::new();
        decoder.read_to_string(&mut out).map_err(attach)?;
        out
    } else {
        String::from_utf8(bytes).map_err(|e| {
            attach(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?
    };

    Ok(text)
}

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}
