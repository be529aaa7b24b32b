mod cli;
mod commands;
mod config;
mod error;
mod input;
mod output;

use std::process;

use crate::{
    cli::{Args, Commands},
    commands::{CommandExecutor, DecodeOptions},
    config::AppConfig,
    error::{AppError, Result},
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let json_errors = matches!(
        &args.command,
        Commands::Decode { output, .. } | Commands::Schema { output }
            if *output != cli::OutputFormat::Pretty
    );

    match run(args).await {
        Ok(()) => {}
        // Downstream closed the pipe (e.g. `| head`); nothing left to report.
        Err(AppError::BrokenPipe) => {}
        Err(e) if json_errors => {
            let error_json = serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            });
            eprintln!("{error_json}");
            process::exit(1);
        }
        Err(e) => {
            error!("Application error: {}", e);
            #[cfg(feature = "colored-output")]
            {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            #[cfg(not(feature = "colored-output"))]
            {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet);

    match args.command {
        Commands::Decode {
            inputs,
            base64,
            output,
            stats,
            probe,
            ignore,
        } => {
            let config = AppConfig::load(args.config.as_deref())?;
            let executor = CommandExecutor::new(config);
            executor
                .decode(DecodeOptions {
                    inputs,
                    base64,
                    output,
                    stats,
                    probe,
                    ignore,
                })
                .await?;
        }

        Commands::Config { show, reset } => {
            if reset {
                let path = AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults ({})", path.display());
            } else if show {
                let config = AppConfig::load(args.config.as_deref())?;
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }

        Commands::Schema { output } => {
            let config = AppConfig::load(args.config.as_deref())?;
            CommandExecutor::new(config).list_schemas(output)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only events.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_level(true),
        )
        .init();
}
