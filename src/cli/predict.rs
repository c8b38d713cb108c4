use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::{Engine, Strategy};
use crate::core::{EngineConfig, PredictionRequest, ResultTable};
use crate::invoke::{build_predictor, InvocationError};
use crate::output::{write_csv, OutputSpec};
use crate::parsing::{self, LineHandling};
use crate::reduce;
use crate::report::{strong_binders, BinderThreshold, ThresholdMetric};

#[derive(Args)]
pub struct PredictArgs {
    /// Protein file: NAME SEQUENCE lines, '#' comments and blanks ignored
    #[arg(required = true)]
    pub peptides: PathBuf,

    /// Allele file: identifiers, identifier + pseudo-sequence pairs, or FASTA
    #[arg(required = true)]
    pub alleles: PathBuf,

    /// Prediction tool to invoke
    #[arg(long, default_value = "NetMHCpan")]
    pub tool: String,

    /// Peptide lengths to scan
    #[arg(short = 'l', long = "lengths", value_delimiter = ',', default_value = "9")]
    pub lengths: Vec<usize>,

    /// How to invoke the engine
    #[arg(long, value_enum, default_value = "process")]
    pub strategy: StrategyArg,

    /// Binary name or path for the process strategy (searched on PATH)
    #[arg(long)]
    pub program: Option<String>,

    /// Also request binding-affinity scores (passes -BA to the engine)
    #[arg(long)]
    pub ba: bool,

    /// Worker-process cap for the engine; -1 keeps its default
    #[arg(long, default_value = "-1")]
    pub process_limit: i32,

    /// Kill the engine if one invocation exceeds this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Extra flag passed verbatim to the engine (repeatable)
    #[arg(long = "extra-flag")]
    pub extra_flags: Vec<String>,

    /// Override the number of banner rows before the engine output header
    #[arg(long)]
    pub skip_rows: Option<usize>,

    /// Reject malformed protein lines instead of skipping them with a warning
    #[arg(long)]
    pub strict_peptides: bool,

    /// Metric consulted by the strong-binder cutoff
    #[arg(long, value_enum, default_value = "rank")]
    pub metric: MetricArg,

    /// Strong-binder cutoff; defaults to 0.5 (rank) or 100 nM (affinity)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Output directory, created on demand
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Output file stem; defaults to a timestamped name
    #[arg(short = 'o', long)]
    pub output_name: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum StrategyArg {
    /// Score windows through an in-process engine binding
    Library,
    /// Run the engine binary once per allele
    Process,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Library => Strategy::Library,
            StrategyArg::Process => Strategy::Process,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum MetricArg {
    /// Predicted affinity in nanomolar
    Affinity,
    /// Percentile rank against the engine background
    Rank,
}

impl From<MetricArg> for ThresholdMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Affinity => ThresholdMetric::AffinityNm,
            MetricArg::Rank => ThresholdMetric::PercentileRank,
        }
    }
}

/// Execute predict subcommand
///
/// # Errors
///
/// Returns an error if inputs cannot be parsed, the engine invocation fails,
/// or the result table cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PredictArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let engine = Engine::from_name(&args.tool)
        .ok_or_else(|| InvocationError::UnsupportedEngine(args.tool.clone()))?;

    let line_handling = if args.strict_peptides {
        LineHandling::Strict
    } else {
        LineHandling::Lenient
    };
    let sequences = parsing::parse_peptide_file(&args.peptides, line_handling)?;
    let alleles = parsing::parse_allele_file(&args.alleles)?;

    if verbose {
        eprintln!(
            "Parsed {} protein sequence(s) and {} allele(s)",
            sequences.len(),
            alleles.len()
        );
    }

    if sequences.is_empty() {
        eprintln!("Warning: No protein sequences in input, nothing to predict.");
        return Ok(());
    }
    if alleles.is_empty() {
        eprintln!("Warning: No alleles in input, nothing to predict.");
        return Ok(());
    }

    let mut config = EngineConfig::new(engine);
    config.strategy = args.strategy.into();
    if let Some(program) = &args.program {
        config.program.clone_from(program);
    }
    config.process_limit = args.process_limit;
    config.binding_affinity = args.ba;
    config.extra_flags.clone_from(&args.extra_flags);
    config.deadline = args.deadline_secs.map(Duration::from_secs);
    config.skip_rows = args.skip_rows;

    // Pseudo-sequence lookup for the strong-binder report, keyed by raw
    // identifier since custom alleles bypass normalization.
    let pseudo_sequences: HashMap<String, String> = alleles
        .iter()
        .filter_map(|a| {
            a.custom_sequence()
                .map(|seq| (a.identifier.clone(), seq.to_string()))
        })
        .collect();

    let request = PredictionRequest::new(alleles, sequences, config)
        .with_peptide_lengths(args.lengths.clone());

    if verbose {
        eprintln!(
            "Scanning lengths {:?}: {} prediction(s) expected",
            request.peptide_lengths,
            request.expected_predictions()
        );
    }

    let predictor = build_predictor(request.engine.strategy, None)?;
    let table = reduce::from_predictions(predictor.predict(&request)?);

    let threshold = BinderThreshold::new(args.metric.into(), args.threshold);
    let binders = strong_binders(&table, &threshold);

    for binder in &binders {
        match pseudo_sequences.get(&binder.allele) {
            Some(seq) => tracing::info!("strong binder: {binder} [pseudo-sequence {seq}]"),
            None => tracing::info!("strong binder: {binder}"),
        }
    }

    match format {
        OutputFormat::Text => print_text_results(&table, &binders, &threshold, &pseudo_sequences),
        OutputFormat::Json => print_json_results(&table, &binders, &threshold)?,
        OutputFormat::Tsv => print_tsv_results(&table),
    }

    let spec = OutputSpec::new(args.output_dir.clone(), args.output_name.clone());
    let path = spec.resolve(&engine.to_string());
    write_csv(&table, &path)?;
    eprintln!("Wrote {} prediction(s) to {}", table.len(), path.display());

    Ok(())
}

fn print_text_results(
    table: &ResultTable,
    binders: &[&crate::core::BindingPrediction],
    threshold: &BinderThreshold,
    pseudo_sequences: &HashMap<String, String>,
) {
    println!(
        "{} prediction(s), {} strong binder(s) ({} {})",
        table.len(),
        binders.len(),
        threshold.metric,
        threshold.value
    );

    for binder in binders {
        match pseudo_sequences.get(&binder.allele) {
            Some(seq) => println!("  {binder} [pseudo-sequence {seq}]"),
            None => println!("  {binder}"),
        }
    }
}

fn print_json_results(
    table: &ResultTable,
    binders: &[&crate::core::BindingPrediction],
    threshold: &BinderThreshold,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "predictions": table.len(),
        "threshold": threshold,
        "strong_binders": binders,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(table: &ResultTable) {
    println!("allele\tsource_sequence_name\toffset\tlength\tpeptide\taffinity_nm\tpercentile_rank");
    for row in table {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.allele,
            row.source_sequence_name,
            row.offset,
            row.length,
            row.peptide,
            row.affinity_nm.map(|v| v.to_string()).unwrap_or_default(),
            row.percentile_rank
                .map(|v| v.to_string())
                .unwrap_or_default(),
        );
    }
}
