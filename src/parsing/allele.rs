//! Allele input parser: line-oriented or FASTA, detected from content.
//!
//! Line-oriented files carry `IDENTIFIER [PSEUDO_SEQUENCE]` per line; FASTA
//! files carry full MHC protein sequences keyed by header. The FASTA branch
//! goes through noodles so record handling matches the rest of the
//! ecosystem.

use std::collections::HashMap;
use std::path::Path;

use noodles::fasta;
use tracing::warn;

use crate::core::allele::AlleleSpec;
use crate::parsing::{read_input, ParseError};

/// Parse an allele file, auto-detecting the dialect.
///
/// An empty file yields an empty allele set; that is the caller's problem to
/// reject if it cares.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Fasta`
/// for malformed FASTA, or `ParseError::DuplicateAllele` when one identifier
/// appears twice with different sequences.
pub fn parse_allele_file(path: &Path) -> Result<Vec<AlleleSpec>, ParseError> {
    let text = read_input(path)?;
    parse_allele_text(&text)
}

/// Parse allele input from text, auto-detecting the dialect.
///
/// FASTA mode is selected when the first non-blank, non-comment line begins
/// with `>`; otherwise the whole input is treated as line-oriented.
///
/// # Errors
///
/// See [`parse_allele_file`].
pub fn parse_allele_text(text: &str) -> Result<Vec<AlleleSpec>, ParseError> {
    match first_content_line(text) {
        Some((start, line)) if line.starts_with('>') => parse_fasta(&text[start..]),
        _ => parse_line_oriented(text),
    }
}

/// Byte offset and content of the first non-blank, non-`#` line.
fn first_content_line(text: &str) -> Option<(usize, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            return Some((offset, trimmed));
        }
        offset += line.len();
    }
    None
}

fn parse_line_oriented(text: &str) -> Result<Vec<AlleleSpec>, ParseError> {
    let mut alleles: Vec<AlleleSpec> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        // split_whitespace on a non-empty line always yields a first token
        let identifier = tokens.next().unwrap_or_default().to_string();
        let pseudo_sequence = tokens.next();

        if tokens.next().is_some() {
            warn!(
                "allele line {}: ignoring tokens after the pseudo-sequence",
                i + 1
            );
        }

        let spec = match pseudo_sequence {
            Some(seq) => AlleleSpec::with_pseudo_sequence(identifier.clone(), seq),
            None => AlleleSpec::standard(identifier.clone()),
        };

        push_unique(&mut alleles, &mut seen, spec)?;
    }

    Ok(alleles)
}

fn parse_fasta(text: &str) -> Result<Vec<AlleleSpec>, ParseError> {
    let mut reader = fasta::io::Reader::new(text.as_bytes());

    let mut alleles: Vec<AlleleSpec> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for result in reader.records() {
        let record =
            result.map_err(|e| ParseError::Fasta(format!("failed to parse record: {e}")))?;

        // The identifier is the full header text after '>', so headers with
        // spaces stay intact.
        let mut identifier = String::from_utf8_lossy(record.name()).to_string();
        if let Some(description) = record.description() {
            identifier.push(' ');
            identifier.push_str(&String::from_utf8_lossy(description));
        }

        let sequence = String::from_utf8_lossy(record.sequence().as_ref()).to_string();

        push_unique(
            &mut alleles,
            &mut seen,
            AlleleSpec::with_full_sequence(identifier, sequence),
        )?;
    }

    Ok(alleles)
}

/// Append a spec, collapsing exact duplicates and rejecting conflicting ones.
fn push_unique(
    alleles: &mut Vec<AlleleSpec>,
    seen: &mut HashMap<String, usize>,
    spec: AlleleSpec,
) -> Result<(), ParseError> {
    if let Some(&index) = seen.get(&spec.identifier) {
        if alleles[index] == spec {
            warn!("duplicate allele {} collapsed", spec.identifier);
            return Ok(());
        }
        return Err(ParseError::DuplicateAllele {
            identifier: spec.identifier,
        });
    }

    seen.insert(spec.identifier.clone(), alleles.len());
    alleles.push(spec);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_line_oriented_keys_in_input_order() {
        let text = "# comment\n\nHLA-A*02:01\nHLA-B*07:02 MSAQRVGSLADGRTVEALHGAEGLRQSLPDC\n";
        let alleles = parse_allele_text(text).unwrap();

        assert_eq!(alleles.len(), 2);
        assert_eq!(alleles[0], AlleleSpec::standard("HLA-A*02:01"));
        assert_eq!(
            alleles[1],
            AlleleSpec::with_pseudo_sequence(
                "HLA-B*07:02",
                "MSAQRVGSLADGRTVEALHGAEGLRQSLPDC"
            )
        );
    }

    #[test]
    fn test_line_oriented_extra_tokens_ignored() {
        let alleles = parse_allele_text("HLA-A*02:01 MSAQRV trailing junk\n").unwrap();
        assert_eq!(alleles.len(), 1);
        assert_eq!(alleles[0].pseudo_sequence.as_deref(), Some("MSAQRV"));
    }

    #[test]
    fn test_empty_input_is_empty_set() {
        assert!(parse_allele_text("").unwrap().is_empty());
        assert!(parse_allele_text("# only comments\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_fasta_mode_detected_and_concatenated() {
        let text = ">MHC1\nMSAQRVGSLADGRT\nVEALHGAEGLRQSLPDC\n>MHC2\nMSLQRVGSLADGRTVEALHGAEGLRQSLPDC\n";
        let alleles = parse_allele_text(text).unwrap();

        assert_eq!(alleles.len(), 2);
        assert_eq!(alleles[0].identifier, "MHC1");
        // body lines concatenated with no separator
        assert_eq!(
            alleles[0].full_sequence.as_deref(),
            Some("MSAQRVGSLADGRTVEALHGAEGLRQSLPDC")
        );
        assert_eq!(alleles[1].identifier, "MHC2");
        assert!(alleles[1].pseudo_sequence.is_none());
    }

    #[test]
    fn test_fasta_mode_allows_leading_comments() {
        let text = "# exported MHC sequences\n\n>MHC1\nMSAQRV\n";
        let alleles = parse_allele_text(text).unwrap();
        assert_eq!(alleles.len(), 1);
        assert_eq!(alleles[0].full_sequence.as_deref(), Some("MSAQRV"));
    }

    #[test]
    fn test_fasta_header_with_description_kept_whole() {
        let alleles = parse_allele_text(">MHC1 synthetic construct\nMSAQRV\n").unwrap();
        assert_eq!(alleles[0].identifier, "MHC1 synthetic construct");
    }

    #[test]
    fn test_duplicate_allele_conflict_is_error() {
        let err = parse_allele_text("HLA-A*02:01 MSAQRV\nHLA-A*02:01 OTHERSEQ\n").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateAllele { .. }));
    }

    #[test]
    fn test_duplicate_allele_exact_is_collapsed() {
        let alleles = parse_allele_text("HLA-A*02:01\nHLA-A*02:01\n").unwrap();
        assert_eq!(alleles.len(), 1);
    }

    #[test]
    fn test_parse_allele_file_missing_path() {
        let err = parse_allele_file(Path::new("/no/such/file.txt")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_parse_allele_file_round_trip() {
        let mut temp = NamedTempFile::with_suffix(".txt").unwrap();
        temp.write_all(b"HLA-A*02:01\nUSER_DEF MSAQRV\n").unwrap();
        temp.flush().unwrap();

        let alleles = parse_allele_file(temp.path()).unwrap();
        assert_eq!(alleles.len(), 2);
        assert!(alleles[0].is_standard());
        assert_eq!(alleles[1].identifier, "USER_DEF");
    }
}
