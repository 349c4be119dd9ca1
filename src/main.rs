//! phasekit command-line interface

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use phasekit::{check_parameters, init_logging, run, LogFormat, RunConfig};

#[derive(Parser)]
#[command(name = "phasekit", version)]
#[command(about = "Rewrite sliced G-code along a height-based parameter schedule", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a G-code file
    Run {
        /// G-code file to rewrite
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Parameter text file
        #[arg(short, long)]
        parameters: Option<PathBuf>,
        /// Output file (default: modified_<input name> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Run configuration file (.json or .toml); flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Log output format: pretty or json
        #[arg(long)]
        log_format: Option<LogFormat>,
    },
    /// Parse and validate a parameter file
    Check {
        /// Parameter text file
        #[arg(short, long)]
        parameters: PathBuf,
        /// Log output format: pretty or json
        #[arg(long, default_value_t = LogFormat::Pretty)]
        log_format: LogFormat,
    },
}

fn run_config(
    input: Option<PathBuf>,
    parameters: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    log_format: Option<LogFormat>,
) -> Result<RunConfig> {
    let mut run_config = match config {
        Some(path) => RunConfig::load_from_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(input) = input {
        run_config.input = input;
    }
    if let Some(parameters) = parameters {
        run_config.parameters = parameters;
    }
    if output.is_some() {
        run_config.output = output;
    }
    if let Some(log_format) = log_format {
        run_config.log_format = log_format;
    }
    Ok(run_config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            parameters,
            output,
            config,
            log_format,
        } => {
            let config = run_config(input, parameters, output, config, log_format)?;
            init_logging(config.log_format)?;

            let outcome = run(&config).inspect_err(|e| tracing::error!("{:#}", e))?;
            println!("{outcome}");
            Ok(if outcome.is_completed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Check {
            parameters,
            log_format,
        } => {
            init_logging(log_format)?;

            let report = check_parameters(&parameters)?;
            for diagnostic in &report.diagnostics {
                println!("{diagnostic}");
            }
            if report.is_correct() {
                println!("{}: parameters are correct", parameters.display());
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
