use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::AlleleSpec;
use crate::normalize::{engine_allele_name, normalize_allele};
use crate::parsing;

#[derive(Args)]
pub struct AllelesArgs {
    /// Allele file: identifiers, identifier + pseudo-sequence pairs, or FASTA
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Execute alleles subcommand
///
/// # Errors
///
/// Returns an error if the allele file cannot be parsed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AllelesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let alleles = parsing::parse_allele_file(&args.input)?;

    if verbose {
        eprintln!("Parsed {} allele(s) from {}", alleles.len(), args.input.display());
    }

    match format {
        OutputFormat::Text => print_text_results(&alleles),
        OutputFormat::Json => print_json_results(&alleles)?,
        OutputFormat::Tsv => print_tsv_results(&alleles),
    }

    Ok(())
}

fn print_text_results(alleles: &[AlleleSpec]) {
    for allele in alleles {
        if allele.is_standard() {
            let normalized = normalize_allele(&allele.identifier);
            if normalized == allele.identifier {
                println!("{normalized}");
            } else {
                println!("{} -> {normalized}", allele.identifier);
            }
        } else {
            let kind = if allele.pseudo_sequence.is_some() {
                "pseudo-sequence"
            } else {
                "full sequence"
            };
            let len = allele.custom_sequence().map_or(0, str::len);
            println!("{} [custom, {kind} of {len} aa]", allele.identifier);
        }
    }
}

fn print_json_results(alleles: &[AlleleSpec]) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = alleles
        .iter()
        .map(|a| {
            if a.is_standard() {
                serde_json::json!({
                    "identifier": a.identifier,
                    "normalized": normalize_allele(&a.identifier),
                    "engine_name": engine_allele_name(&a.identifier),
                    "custom": false,
                })
            } else {
                serde_json::json!({
                    "identifier": a.identifier,
                    "custom": true,
                    "sequence_length": a.custom_sequence().map_or(0, str::len),
                    "full_sequence": a.full_sequence.is_some(),
                })
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(alleles: &[AlleleSpec]) {
    println!("identifier\tnormalized\tengine_name\tcustom\tsequence_length");
    for a in alleles {
        if a.is_standard() {
            println!(
                "{}\t{}\t{}\tfalse\t",
                a.identifier,
                normalize_allele(&a.identifier),
                engine_allele_name(&a.identifier),
            );
        } else {
            println!(
                "{}\t\t\ttrue\t{}",
                a.identifier,
                a.custom_sequence().map_or(0, str::len),
            );
        }
    }
}
