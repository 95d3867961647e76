use std::io::stdout;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use adgap_cli::commands::{analyze, inspect};
use adgap_cli::{Cli, Commands, Config};
use adgap_core::ClassifierParams;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Analyze {
            input,
            output_dir,
            services,
            ad_threshold,
            ad_frequency_threshold,
        }) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            tracing::debug!(?config, "loaded configuration");

            let output_dir = output_dir.as_ref().unwrap_or(&config.output_dir);
            let services = if services.is_empty() {
                &config.services
            } else {
                services
            };
            let params = ClassifierParams {
                ad_threshold: ad_threshold.unwrap_or(config.ad_threshold),
                ad_frequency_threshold: ad_frequency_threshold
                    .unwrap_or(config.ad_frequency_threshold),
            };

            analyze::run(
                &mut stdout(),
                input,
                output_dir,
                services,
                &config.application_column,
                &params,
            )?;
        }
        Some(Commands::Inspect {
            input,
            column,
            find,
        }) => {
            inspect::run(&mut stdout(), input, column.as_deref(), find.as_deref())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
