//! Process strategy: invoke the external engine binary.
//!
//! One invocation per allele: peptides go to a scratch file (`-p`), standard
//! alleles are named on the command line (`-a`), sequence-carrying alleles
//! are written as a scratch FASTA and signaled with `-inptype 1`. Tabular
//! output is requested with `-xls -xlsfile` and handed to the reducer.
//!
//! Every scratch file lives inside one `TempDir`, so cleanup is guaranteed
//! on success, failure, and panic alike.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::core::allele::AlleleSpec;
use crate::core::prediction::BindingPrediction;
use crate::core::request::{EngineConfig, PredictionRequest};
use crate::core::scan::{self, ScanWindow};
use crate::invoke::{InvocationError, Predictor};
use crate::normalize::{engine_allele_name, normalize_allele};
use crate::reduce::{self, OutputProfile, ParsedOutput};

/// How often a deadline-bounded child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Predictor that shells out to the engine binary.
pub struct ProcessPredictor;

impl Predictor for ProcessPredictor {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<Vec<BindingPrediction>, InvocationError> {
        let config = &request.engine;
        let windows = scan::windows(&request.sequences, &request.peptide_lengths);

        if windows.is_empty() || request.alleles.is_empty() {
            return Ok(Vec::new());
        }

        let scratch = make_scratch(config.scratch_dir.as_deref())?;
        let peptide_path = write_peptide_file(scratch.path(), &windows)?;
        let mut profile = OutputProfile::for_flags(config.binding_affinity);
        if let Some(skip_rows) = config.skip_rows {
            profile = profile.with_skip_rows(skip_rows);
        }

        let mut predictions = Vec::with_capacity(windows.len() * request.alleles.len());

        for (i, allele) in request.alleles.iter().enumerate() {
            let target = AlleleTarget::prepare(allele, scratch.path(), i)?;
            let out_path = scratch.path().join(format!("predictions_{i}.xls"));

            let args = engine_args(config, &peptide_path, &target, &out_path);
            debug!("invoking {} {}", config.program, args.join(" "));
            run_engine(config, &args)?;

            if !out_path.exists() {
                return Err(InvocationError::OutputMissing { path: out_path });
            }

            let text = std::fs::read_to_string(&out_path)?;
            let parsed = reduce::parse_engine_table(&text, &profile)?;
            if !parsed.row_errors.is_empty() {
                warn!(
                    "{}: {} malformed output row(s) discarded",
                    target.label,
                    parsed.row_errors.len()
                );
            }

            collect_predictions(&mut predictions, &windows, parsed, &target.label)?;
        }

        info!("engine produced {} prediction(s)", predictions.len());
        Ok(predictions)
    }
}

/// How one allele reaches the engine command line.
struct AlleleTarget {
    /// Allele label carried into the predictions
    label: String,
    /// Value for `-a`: engine-form allele name, or scratch FASTA path
    allele_arg: String,
    /// True when `-inptype 1` must signal FASTA-keyed MHC input
    fasta_input: bool,
}

impl AlleleTarget {
    fn prepare(
        allele: &AlleleSpec,
        scratch: &Path,
        index: usize,
    ) -> Result<Self, InvocationError> {
        match allele.custom_sequence() {
            None => Ok(Self {
                label: normalize_allele(&allele.identifier),
                allele_arg: engine_allele_name(&allele.identifier),
                fasta_input: false,
            }),
            Some(sequence) => {
                let path = scratch.join(format!("allele_{index}.fsa"));
                std::fs::write(&path, format!(">{}\n{sequence}\n", allele.identifier))?;
                Ok(Self {
                    label: allele.identifier.clone(),
                    allele_arg: path.to_string_lossy().into_owned(),
                    fasta_input: true,
                })
            }
        }
    }
}

fn make_scratch(dir: Option<&Path>) -> Result<TempDir, InvocationError> {
    let builder_result = match dir {
        Some(dir) => tempfile::Builder::new().prefix("mhc-bind-").tempdir_in(dir),
        None => tempfile::Builder::new().prefix("mhc-bind-").tempdir(),
    };
    Ok(builder_result?)
}

fn write_peptide_file(scratch: &Path, windows: &[ScanWindow<'_>]) -> Result<PathBuf, std::io::Error> {
    let path = scratch.join("peptides.txt");
    let mut body = String::new();
    for window in windows {
        body.push_str(window.peptide());
        body.push('\n');
    }
    std::fs::write(&path, body)?;
    Ok(path)
}

/// Deterministic engine argument list for one allele invocation.
fn engine_args(
    config: &EngineConfig,
    peptide_path: &Path,
    target: &AlleleTarget,
    out_path: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-p".to_string(),
        peptide_path.to_string_lossy().into_owned(),
    ];

    if target.fasta_input {
        args.extend(["-inptype".to_string(), "1".to_string()]);
    }
    args.extend(["-a".to_string(), target.allele_arg.clone()]);

    args.extend([
        "-xls".to_string(),
        "-xlsfile".to_string(),
        out_path.to_string_lossy().into_owned(),
    ]);

    if config.binding_affinity {
        args.push("-BA".to_string());
    }

    args.extend(config.extra_flags.iter().cloned());
    args
}

/// Run the engine once, honoring the configured deadline.
fn run_engine(config: &EngineConfig, args: &[String]) -> Result<Output, InvocationError> {
    let mut command = Command::new(&config.program);
    command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

    let spawn_err = |source| InvocationError::Spawn {
        program: config.program.clone(),
        source,
    };

    let output = match config.deadline {
        None => command.output().map_err(spawn_err)?,
        Some(limit) => {
            let mut child = command.spawn().map_err(spawn_err)?;
            let started = Instant::now();
            loop {
                match child.try_wait()? {
                    Some(_) => break child.wait_with_output()?,
                    None if started.elapsed() >= limit => {
                        child.kill().ok();
                        child.wait().ok();
                        return Err(InvocationError::DeadlineExceeded {
                            program: config.program.clone(),
                            seconds: limit.as_secs(),
                        });
                    }
                    None => std::thread::sleep(POLL_INTERVAL),
                }
            }
        }
    };

    if !output.status.success() {
        return Err(InvocationError::EngineFailed {
            program: config.program.clone(),
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output)
}

/// Join engine rows back to their scan windows and emit predictions.
///
/// The engine's `Pos` column indexes the submitted peptide list; its base
/// (0 or 1) differs between builds, so it is inferred from the first
/// surviving row's `pos` and file ordinal. The ordinal counts rows the
/// reducer discarded, so a malformed leading row does not shift the
/// alignment of the rows that parsed.
fn collect_predictions(
    predictions: &mut Vec<BindingPrediction>,
    windows: &[ScanWindow<'_>],
    parsed: ParsedOutput,
    label: &str,
) -> Result<(), InvocationError> {
    let base = parsed
        .rows
        .first()
        .map(|r| r.pos.unwrap_or(r.data_index).saturating_sub(r.data_index))
        .unwrap_or(0);

    for row in parsed.rows {
        let row_num = row.data_index + 1;
        let pos = row.pos.unwrap_or(base + row.data_index);
        let index = pos.saturating_sub(base);

        let window = windows
            .get(index)
            .ok_or(InvocationError::RowOutOfRange {
                row: row_num,
                pos,
                count: windows.len(),
            })?;

        if window.peptide() != row.peptide {
            return Err(InvocationError::PeptideMismatch {
                row: row_num,
                got: row.peptide,
                expected: window.peptide().to_string(),
            });
        }

        predictions.push(BindingPrediction {
            allele: label.to_string(),
            source_sequence_name: window.record.name.clone(),
            offset: window.offset,
            length: window.length,
            peptide: row.peptide,
            affinity_nm: row.affinity_nm,
            percentile_rank: row.percentile_rank,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sequence::SequenceRecord;
    use crate::core::types::Engine;
    use crate::reduce::{EngineRow, RowError};

    fn windows_for(records: &[SequenceRecord]) -> Vec<ScanWindow<'_>> {
        scan::windows(records, &[9])
    }

    #[test]
    fn test_engine_args_standard_allele() {
        let config = EngineConfig::new(Engine::NetMhcPan);
        let target = AlleleTarget {
            label: "HLA-A*02:01".to_string(),
            allele_arg: "HLA-A02:01".to_string(),
            fasta_input: false,
        };
        let args = engine_args(
            &config,
            Path::new("/tmp/pep.txt"),
            &target,
            Path::new("/tmp/out.xls"),
        );
        assert_eq!(
            args,
            vec![
                "-p",
                "/tmp/pep.txt",
                "-a",
                "HLA-A02:01",
                "-xls",
                "-xlsfile",
                "/tmp/out.xls",
            ]
        );
    }

    #[test]
    fn test_engine_args_custom_allele_with_ba_and_extras() {
        let mut config = EngineConfig::new(Engine::NetMhcPan);
        config.binding_affinity = true;
        config.extra_flags = vec!["-v".to_string()];

        let target = AlleleTarget {
            label: "MHC1".to_string(),
            allele_arg: "/tmp/allele_0.fsa".to_string(),
            fasta_input: true,
        };
        let args = engine_args(
            &config,
            Path::new("/tmp/pep.txt"),
            &target,
            Path::new("/tmp/out.xls"),
        );
        assert_eq!(
            args,
            vec![
                "-p",
                "/tmp/pep.txt",
                "-inptype",
                "1",
                "-a",
                "/tmp/allele_0.fsa",
                "-xls",
                "-xlsfile",
                "/tmp/out.xls",
                "-BA",
                "-v",
            ]
        );
    }

    #[test]
    fn test_collect_predictions_with_one_based_pos() {
        let records = vec![SequenceRecord::new("P1", "NLYIQWLKDG")];
        let windows = windows_for(&records);
        assert_eq!(windows.len(), 2);

        let parsed = ParsedOutput {
            rows: vec![
                EngineRow {
                    pos: Some(1),
                    data_index: 0,
                    peptide: "NLYIQWLKD".to_string(),
                    source_name: Some("PEPLIST".to_string()),
                    affinity_nm: None,
                    percentile_rank: Some(0.25),
                },
                EngineRow {
                    pos: Some(2),
                    data_index: 1,
                    peptide: "LYIQWLKDG".to_string(),
                    source_name: Some("PEPLIST".to_string()),
                    affinity_nm: None,
                    percentile_rank: Some(3.5),
                },
            ],
            row_errors: vec![],
        };

        let mut predictions = Vec::new();
        collect_predictions(&mut predictions, &windows, parsed, "HLA-A*02:01").unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].offset, 0);
        assert_eq!(predictions[1].offset, 1);
        assert_eq!(predictions[1].source_sequence_name, "P1");
        assert!(predictions[1].matches_source(&records[0]));
    }

    #[test]
    fn test_collect_predictions_peptide_mismatch_is_fatal() {
        let records = vec![SequenceRecord::new("P1", "NLYIQWLKD")];
        let windows = windows_for(&records);

        let parsed = ParsedOutput {
            rows: vec![EngineRow {
                pos: Some(0),
                peptide: "AAAAAAAAA".to_string(),
                ..Default::default()
            }],
            row_errors: vec![],
        };

        let mut predictions = Vec::new();
        let err =
            collect_predictions(&mut predictions, &windows, parsed, "HLA-A*02:01").unwrap_err();
        assert!(matches!(err, InvocationError::PeptideMismatch { .. }));
    }

    #[test]
    fn test_collect_predictions_out_of_range_pos() {
        let records = vec![SequenceRecord::new("P1", "NLYIQWLKD")];
        let windows = windows_for(&records);

        let parsed = ParsedOutput {
            rows: vec![
                EngineRow {
                    pos: Some(0),
                    data_index: 0,
                    peptide: "NLYIQWLKD".to_string(),
                    ..Default::default()
                },
                EngineRow {
                    pos: Some(5),
                    data_index: 1,
                    peptide: "NLYIQWLKD".to_string(),
                    ..Default::default()
                },
            ],
            row_errors: vec![],
        };

        let mut predictions = Vec::new();
        let err =
            collect_predictions(&mut predictions, &windows, parsed, "HLA-A*02:01").unwrap_err();
        assert!(matches!(
            err,
            InvocationError::RowOutOfRange { pos: 5, count: 1, .. }
        ));
    }

    #[test]
    fn test_collect_predictions_realigns_after_discarded_first_row() {
        // 1-based engine output whose first data row was discarded by the
        // reducer: the surviving row's ordinal still anchors the base, so it
        // joins to window 1, not window 0.
        let records = vec![SequenceRecord::new("P1", "NLYIQWLKDG")];
        let windows = windows_for(&records);
        assert_eq!(windows.len(), 2);

        let parsed = ParsedOutput {
            rows: vec![EngineRow {
                pos: Some(2),
                data_index: 1,
                peptide: "LYIQWLKDG".to_string(),
                percentile_rank: Some(3.5),
                ..Default::default()
            }],
            row_errors: vec![RowError {
                row: 3,
                column: "EL_Rank".to_string(),
                message: "not numeric: \"NA\"".to_string(),
            }],
        };

        let mut predictions = Vec::new();
        collect_predictions(&mut predictions, &windows, parsed, "HLA-A*02:01").unwrap();

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].offset, 1);
        assert!(predictions[0].matches_source(&records[0]));
    }

    #[test]
    fn test_prepare_custom_allele_writes_fasta() {
        let scratch = tempfile::tempdir().unwrap();
        let allele = AlleleSpec::with_pseudo_sequence("USER_DEF", "MSAQRV");
        let target = AlleleTarget::prepare(&allele, scratch.path(), 0).unwrap();

        assert!(target.fasta_input);
        assert_eq!(target.label, "USER_DEF");
        let written = std::fs::read_to_string(&target.allele_arg).unwrap();
        assert_eq!(written, ">USER_DEF\nMSAQRV\n");
    }

    #[test]
    fn test_prepare_standard_allele_uses_engine_name() {
        let scratch = tempfile::tempdir().unwrap();
        let allele = AlleleSpec::standard("hla-a0201");
        let target = AlleleTarget::prepare(&allele, scratch.path(), 0).unwrap();

        assert!(!target.fasta_input);
        assert_eq!(target.label, "HLA-A*02:01");
        assert_eq!(target.allele_arg, "HLA-A02:01");
    }
}
