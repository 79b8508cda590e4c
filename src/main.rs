//! PR Driver - pull request test driver for CMake/CTest based projects
//!
//! Generates the configure fragment for a pull request build with
//! `gen-config`, then runs CTest with the dashboard settings for the
//! pull request track.
//!
//! ## Usage
//!
//! ```bash
//! # Run the standard pull request test
//! pr-driver run --config pr-driver.yaml
//!
//! # Show what would run without touching anything
//! pr-driver run --dry-run --pullrequest-number 123 --jenkins-job-number 7
//!
//! # Print the CTest command as JSON
//! pr-driver command --format json
//!
//! # Write an example configuration
//! pr-driver config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

mod cli;
mod config;
mod ctest;
mod executor;
mod genconfig;
mod models;
mod output;
mod results;
mod utils;

use cli::{Args, ContextArgs};
use config::{DriverConfig, EnvConfig};
use executor::{StandardExecutor, SystemHost};
use output::{OutputFormat, ResultFormatter};
use results::ResultsStorage;
use utils::LogLevel;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        args.log_level.parse().unwrap_or(LogLevel::Info)
    };
    utils::init_logger(level);

    match args.command {
        cli::Command::Run(run_args) => {
            let status = run_test(run_args).await?;
            if status != 0 {
                std::process::exit(status);
            }
        }
        cli::Command::Command(command_args) => {
            print_command(command_args)?;
        }
        cli::Command::Results(results_args) => {
            show_results(results_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args)?;
        }
    }

    Ok(())
}

/// Layer defaults, config file, environment, and flags
fn build_context(args: &ContextArgs) -> Result<DriverConfig> {
    let env = EnvConfig::load();

    let path = args
        .config
        .clone()
        .or_else(|| env.config_file.as_ref().map(PathBuf::from))
        .or_else(config::find_config);

    let mut config = match path {
        Some(path) => {
            info!("Using configuration file {}", path.display());
            DriverConfig::load(&path)?
        }
        None => DriverConfig::default(),
    };

    config.apply_env(&env);
    args.apply_to(&mut config);
    Ok(config)
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    format.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn storage_for(results_dir: Option<PathBuf>) -> Result<ResultsStorage> {
    match results_dir {
        Some(dir) => Ok(ResultsStorage::new(dir)),
        None => ResultsStorage::default_location(),
    }
}

async fn run_test(mut args: cli::RunArgs) -> Result<i32> {
    args.resolve_paths().context("Failed to resolve report paths")?;
    let config = build_context(&args.context)?;
    config.validate().context("Invalid configuration")?;

    let executor = StandardExecutor::new(&config, SystemHost);
    let report = executor.execute().await?;

    if report.is_dry_run() {
        info!("Dry run complete, nothing was executed");
    } else {
        info!("{}", report);
    }

    if let Some(path) = args.output {
        let json = ResultFormatter::new(OutputFormat::JsonPretty).format_report(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        info!("Wrote execution report to {}", path.display());
    }

    if args.save {
        storage_for(args.results_dir)?.save(&report)?;
    }

    Ok(report.status())
}

fn print_command(args: cli::CommandArgs) -> Result<()> {
    let formatter = ResultFormatter::new(parse_format(&args.format)?);
    let config = build_context(&args.context)?;

    let build_name = config
        .pullrequest_build_name()
        .context("Cannot build the CTest command")?;
    let command = ctest::ctest_command(&config, &build_name);

    println!("{}", formatter.format_command(&command)?);
    Ok(())
}

fn show_results(args: cli::ResultsArgs) -> Result<()> {
    let formatter = ResultFormatter::new(parse_format(&args.format)?);
    let storage = storage_for(args.results_dir)?;

    match args.action {
        cli::ResultsAction::List => {
            info!("Reading results from {}", storage.base_dir().display());
            println!("{}", formatter.format_reports(&storage.list()?)?);
        }
        cli::ResultsAction::Latest => match storage.latest()? {
            Some(report) => println!("{}", formatter.format_report(&report)?),
            None => println!("No stored runs in {}", storage.base_dir().display()),
        },
        cli::ResultsAction::Show { path } => {
            let report = storage.load_from_path(&path)?;
            println!("{}", formatter.format_report(&report)?);
        }
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            DriverConfig::example().save(&path)?;
            println!("✓ Wrote example configuration to {}", path.display());
        }
        cli::ConfigAction::Show { context, format } => {
            let formatter = ResultFormatter::new(parse_format(&format)?);
            let config = build_context(&context)?;
            println!("{}", formatter.format_config(&config)?);
        }
        cli::ConfigAction::Validate { context } => {
            let config = build_context(&context)?;
            match config.validate() {
                Ok(()) => {
                    let build_name = config
                        .pullrequest_build_name()
                        .unwrap_or_else(|_| "<unresolved>".to_string());
                    println!("✓ Configuration is valid (build name: {build_name})");
                }
                Err(e) => {
                    warn!("Configuration rejected: {}", e);
                    anyhow::bail!("✗ Invalid configuration: {e}");
                }
            }
        }
        cli::ConfigAction::Env => {
            config::print_env_help();
            println!();
            let env = EnvConfig::load();
            if env.has_any() {
                env.print_summary();
            } else {
                println!("No PR_DRIVER_* variables are set");
            }
        }
    }

    Ok(())
}
