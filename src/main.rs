//! aq-features - Main Entry Point
//!
//! Builds model-ready feature tables from raw air-quality exports.

use aq_features::cli::{cmd_build, cmd_build_daily, cmd_info, Cli, Commands};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aq_features=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { data, output, lags } => {
            cmd_build(&data, output.as_deref(), &lags)?;
        }
        Commands::BuildDaily {
            data,
            output,
            group_key,
            lags,
        } => {
            cmd_build_daily(&data, output.as_deref(), &group_key, &lags)?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
