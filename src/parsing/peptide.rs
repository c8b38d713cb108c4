//! Peptide/protein input parser: line-oriented `NAME SEQUENCE` pairs.

use std::path::Path;

use tracing::warn;

use crate::core::sequence::SequenceRecord;
use crate::parsing::{read_input, ParseError};

/// What to do with a data line that is not exactly two tokens.
///
/// The historical behavior is to skip such lines silently; that stays the
/// default, but as an explicit named policy rather than an accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineHandling {
    /// Skip malformed lines with a warning.
    #[default]
    Lenient,
    /// Fail the whole parse on the first malformed line.
    Strict,
}

/// Parse a peptide/protein file into ordered `SequenceRecord`s.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read,
/// `ParseError::TokenCount` under [`LineHandling::Strict`] for malformed
/// lines, `ParseError::InvalidResidue` for non-alphabetic sequence
/// characters, or `ParseError::DuplicateName` for repeated names.
pub fn parse_peptide_file(
    path: &Path,
    handling: LineHandling,
) -> Result<Vec<SequenceRecord>, ParseError> {
    let text = read_input(path)?;
    parse_peptide_text(&text, handling)
}

/// Parse peptide/protein input from text.
///
/// # Errors
///
/// See [`parse_peptide_file`].
pub fn parse_peptide_text(
    text: &str,
    handling: LineHandling,
) -> Result<Vec<SequenceRecord>, ParseError> {
    let mut records: Vec<SequenceRecord> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_num = i + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let [name, sequence] = tokens.as_slice() else {
            match handling {
                LineHandling::Lenient => {
                    warn!(
                        "peptide line {line_num}: skipping line with {} field(s), expected 2",
                        tokens.len()
                    );
                    continue;
                }
                LineHandling::Strict => {
                    return Err(ParseError::TokenCount {
                        line: line_num,
                        found: tokens.len(),
                    });
                }
            }
        };

        if let Some(residue) = sequence.chars().find(|c| !c.is_ascii_alphabetic()) {
            return Err(ParseError::InvalidResidue {
                line: line_num,
                name: (*name).to_string(),
                residue,
            });
        }

        if records.iter().any(|r| r.name == *name) {
            return Err(ParseError::DuplicateName {
                name: (*name).to_string(),
                line: line_num,
            });
        }

        records.push(SequenceRecord::new(*name, *sequence));
    }

    Ok(records)
}
