use clap::Parser;
use tracing_subscriber::EnvFilter;

use mhc_bind::cli::{self, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("mhc_bind=debug,info")
    } else {
        EnvFilter::new("mhc_bind=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Predict(args) => {
            cli::predict::run(args, cli.format, cli.verbose)?;
        }
        Commands::Alleles(args) => {
            cli::alleles::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
