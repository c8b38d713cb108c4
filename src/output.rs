//! Persistence: write the canonical table to its destination.
//!
//! The destination is either caller-named or timestamped, under an output
//! directory that is created on demand. Writes go through a scratch file in
//! the destination directory and are persisted atomically, so a failing run
//! never leaves a partial artifact behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::core::prediction::{ResultTable, CANONICAL_COLUMNS};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where one run's table goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub dir: PathBuf,
    /// Caller-chosen stem; `None` falls back to a timestamped name
    pub name: Option<String>,
    pub extension: String,
}

impl OutputSpec {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, name: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            name,
            extension: "csv".to_string(),
        }
    }

    /// Resolve the destination path: `<name>.<ext>` or
    /// `<YYYYMMDD_HHMMSS>_<tool>_predictions.<ext>`.
    #[must_use]
    pub fn resolve(&self, tool: &str) -> PathBuf {
        let stem = match &self.name {
            Some(name) => name.clone(),
            None => format!(
                "{}_{tool}_predictions",
                Local::now().format("%Y%m%d_%H%M%S")
            ),
        };
        self.dir.join(format!("{stem}.{}", self.extension))
    }
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self::new("output", None)
    }
}

/// Write the table as CSV to `path`, atomically.
///
/// # Errors
///
/// Returns `OutputError::CreateDir` if the destination directory cannot be
/// created, or `OutputError::Write` for any write or persist failure.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<(), OutputError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    // Scratch file in the destination directory so persist() is a rename,
    // not a cross-device copy.
    let mut scratch = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    scratch
        .write_all(render_csv(table).as_bytes())
        .map_err(write_err)?;
    scratch.flush().map_err(write_err)?;
    scratch
        .persist(path)
        .map_err(|e| write_err(e.error))?;

    Ok(())
}

fn render_csv(table: &ResultTable) -> String {
    let mut out = String::new();
    out.push_str(&CANONICAL_COLUMNS.join(","));
    out.push('\n');

    for row in table {
        let cells = [
            csv_field(&row.allele),
            csv_field(&row.source_sequence_name),
            row.offset.to_string(),
            row.length.to_string(),
            csv_field(&row.peptide),
            row.affinity_nm.map(|v| v.to_string()).unwrap_or_default(),
            row.percentile_rank
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ];
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    out
}

/// Quote a field when it would break the CSV shape.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::prediction::BindingPrediction;

    fn table() -> ResultTable {
        ResultTable::new(vec![BindingPrediction {
            allele: "HLA-A*02:01".to_string(),
            source_sequence_name: "P1".to_string(),
            offset: 0,
            length: 9,
            peptide: "NLYIQWLKD".to_string(),
            affinity_nm: Some(55.2),
            percentile_rank: None,
        }])
    }

    #[test]
    fn test_resolve_named() {
        let spec = OutputSpec::new("output", Some("run1".to_string()));
        assert_eq!(spec.resolve("NetMHCpan"), PathBuf::from("output/run1.csv"));
    }

    #[test]
    fn test_resolve_timestamped() {
        let spec = OutputSpec::new("output", None);
        let path = spec.resolve("NetMHCpan");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();

        // 20260830_121314_NetMHCpan_predictions.csv
        assert!(name.ends_with("_NetMHCpan_predictions.csv"), "{name}");
        let stamp = &name[..15];
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp[..8].chars().all(|c| c.is_ascii_digit()));
        assert!(stamp[9..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_write_csv_creates_dir_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/run1.csv");

        write_csv(&table(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "allele,source_sequence_name,offset,length,peptide,affinity_nm,percentile_rank"
        );
        // empty trailing cell for the absent percentile rank
        assert_eq!(lines.next().unwrap(), "HLA-A*02:01,P1,0,9,NLYIQWLKD,55.2,");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_no_partial_file_on_missing_parent_of_scratch() {
        // Empty table still writes a header-only file
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&ResultTable::default(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
