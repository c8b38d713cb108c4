//! Result reduction: collapse raw engine output into the canonical table.
//!
//! The library strategy hands over [`BindingPrediction`]s directly; the
//! process strategy hands over the engine's delimited output file, parsed
//! here against an explicit [`OutputProfile`]. Either way the caller ends up
//! with one [`ResultTable`] in the canonical column order.

use thiserror::Error;
use tracing::warn;

use crate::core::prediction::{BindingPrediction, ResultTable};

pub mod profile;

pub use profile::{ColumnRole, OutputProfile};

#[derive(Error, Debug)]
pub enum ReduceError {
    #[error("engine output is truncated: no header row after {skip} metadata row(s)")]
    MissingHeader { skip: usize },

    #[error("unrecognized engine column {name:?}; the output profile must map every column")]
    UnknownColumn { name: String },

    #[error("engine output has no parseable data rows ({failed} row(s) failed)")]
    AllRowsFailed { failed: usize },
}

/// A malformed data row, recorded rather than silently coerced. The run
/// continues as long as at least one row parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based row number within the engine output file
    pub row: usize,
    pub column: String,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}, column {}: {}", self.row, self.column, self.message)
    }
}

/// One data row of engine output after column translation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineRow {
    /// Index into the submitted peptide list, as reported by the engine
    pub pos: Option<usize>,
    /// 0-based ordinal of this row among the file's data rows, counting rows
    /// that failed to parse. Lets callers realign `pos` even when earlier
    /// rows were discarded.
    pub data_index: usize,
    pub peptide: String,
    /// Source identifier the engine echoes back (e.g. `PEPLIST`)
    pub source_name: Option<String>,
    pub affinity_nm: Option<f64>,
    pub percentile_rank: Option<f64>,
}

/// Parsed engine output: usable rows plus the errors of the rows that were
/// not.
#[derive(Debug, Clone, Default)]
pub struct ParsedOutput {
    pub rows: Vec<EngineRow>,
    pub row_errors: Vec<RowError>,
}

/// Reduce library-strategy predictions to the canonical table.
///
/// Trivial today because [`BindingPrediction`] already is the canonical row
/// shape, but it keeps both strategies converging through one function.
#[must_use]
pub fn from_predictions(predictions: Vec<BindingPrediction>) -> ResultTable {
    ResultTable::new(predictions)
}

/// Parse the engine's delimited output text against a profile.
///
/// # Errors
///
/// Returns `ReduceError::MissingHeader` when the text ends before the header
/// row, `ReduceError::UnknownColumn` for a header cell the profile does not
/// map, or `ReduceError::AllRowsFailed` when data rows exist but none parse.
/// Individually malformed rows become [`RowError`]s, not failures.
pub fn parse_engine_table(text: &str, profile: &OutputProfile) -> Result<ParsedOutput, ReduceError> {
    let mut lines = text.lines().enumerate().skip(profile.skip_rows);

    let (_, header) = lines
        .next()
        .ok_or(ReduceError::MissingHeader { skip: profile.skip_rows })?;

    let roles: Vec<(String, ColumnRole)> = header
        .split(profile.delimiter)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            profile
                .role_of(name)
                .map(|role| (name.to_string(), role))
                .ok_or_else(|| ReduceError::UnknownColumn {
                    name: name.to_string(),
                })
        })
        .collect::<Result<_, _>>()?;

    let mut parsed = ParsedOutput::default();
    let mut data_index = 0;

    for (i, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let row_num = i + 1;

        match parse_row(line, row_num, &roles, profile.delimiter) {
            Ok(mut row) => {
                row.data_index = data_index;
                parsed.rows.push(row);
            }
            Err(err) => {
                warn!("discarding malformed engine output {err}");
                parsed.row_errors.push(err);
            }
        }
        data_index += 1;
    }

    if parsed.rows.is_empty() && !parsed.row_errors.is_empty() {
        return Err(ReduceError::AllRowsFailed {
            failed: parsed.row_errors.len(),
        });
    }

    Ok(parsed)
}

fn parse_row(
    line: &str,
    row_num: usize,
    roles: &[(String, ColumnRole)],
    delimiter: char,
) -> Result<EngineRow, RowError> {
    let cells: Vec<&str> = line.split(delimiter).map(str::trim).collect();

    if cells.len() < roles.len() {
        return Err(RowError {
            row: row_num,
            column: roles[cells.len()].0.clone(),
            message: format!("row has {} cell(s), expected {}", cells.len(), roles.len()),
        });
    }

    let mut row = EngineRow::default();

    for ((name, role), cell) in roles.iter().zip(&cells) {
        match role {
            ColumnRole::Pos => row.pos = Some(parse_numeric(cell, row_num, name)?),
            ColumnRole::Peptide => row.peptide = (*cell).to_string(),
            ColumnRole::SourceName => row.source_name = Some((*cell).to_string()),
            ColumnRole::AffinityNm => {
                row.affinity_nm = Some(parse_numeric(cell, row_num, name)?);
            }
            ColumnRole::PercentileRank => {
                row.percentile_rank = Some(parse_numeric(cell, row_num, name)?);
            }
            ColumnRole::Drop => {}
        }
    }

    Ok(row)
}

fn parse_numeric<T: std::str::FromStr>(
    cell: &str,
    row_num: usize,
    column: &str,
) -> Result<T, RowError> {
    cell.parse().map_err(|_| RowError {
        row: row_num,
        column: column.to_string(),
        message: format!("not numeric: {cell:?}"),
    })
}
