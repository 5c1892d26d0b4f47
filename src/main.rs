//! Kolosal Compare - Main Entry Point
//!
//! Cross-validated comparison of classification models from the command line.

use clap::Parser;
use kolosal_compare::cli::{cmd_compare, cmd_info, Cli, Commands, CompareArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kolosal_compare=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            config,
            data,
            target,
            folds,
            test_ratio,
            scoring,
            scaler,
            seed,
            plot_dir,
        } => {
            cmd_compare(CompareArgs {
                config,
                data,
                target,
                folds,
                test_ratio,
                scoring,
                scaler,
                seed,
                plot_dir,
            })?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
