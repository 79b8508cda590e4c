//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::DriverConfig;

/// Pull request test driver for CMake/CTest based projects
#[derive(Parser, Debug)]
#[command(name = "pr-driver")]
#[command(version)]
#[command(about = "Generate the PR configure fragment and run CTest")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the standard pull request test
    Run(RunArgs),

    /// Print the CTest command without running anything
    Command(CommandArgs),

    /// Inspect stored execution reports
    Results(ResultsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Configuration overrides shared by commands that build a context
#[derive(ClapArgs, Debug, Default)]
pub struct ContextArgs {
    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Workspace directory
    #[arg(long)]
    pub workspace_dir: Option<PathBuf>,

    /// Directory CTest runs from
    #[arg(long)]
    pub ctest_working_dir: Option<PathBuf>,

    /// Explicit CDash build name
    #[arg(long)]
    pub build_name: Option<String>,

    /// Pull request number
    #[arg(long)]
    pub pullrequest_number: Option<String>,

    /// CI job number
    #[arg(long)]
    pub jenkins_job_number: Option<String>,

    /// Build parallel level
    #[arg(long)]
    pub concurrency_build: Option<u32>,

    /// Test parallel level
    #[arg(long)]
    pub concurrency_test: Option<u32>,

    /// CDash track
    #[arg(long)]
    pub cdash_track: Option<String>,

    /// Package enables file
    #[arg(long)]
    pub filename_packageenables: Option<String>,

    /// Subprojects list file
    #[arg(long)]
    pub filename_subprojects: Option<String>,

    /// gen-config configuration name
    #[arg(long)]
    pub genconfig_job_name: Option<String>,

    /// gen-config INI file
    #[arg(long)]
    pub gen_config_file: Option<PathBuf>,

    /// Skip all side effects and only print what would happen
    #[arg(long)]
    pub dry_run: bool,
}

impl ContextArgs {
    /// Apply flag overrides on top of a loaded configuration
    pub fn apply_to(&self, config: &mut DriverConfig) {
        if let Some(ref dir) = self.workspace_dir {
            config.workspace_dir = dir.clone();
        }
        if let Some(ref dir) = self.ctest_working_dir {
            config.ctest_working_dir = Some(dir.clone());
        }
        if let Some(ref name) = self.build_name {
            config.build_name = Some(name.clone());
        }
        if let Some(ref number) = self.pullrequest_number {
            config.pullrequest_number = Some(number.clone());
        }
        if let Some(ref number) = self.jenkins_job_number {
            config.jenkins_job_number = Some(number.clone());
        }
        if let Some(level) = self.concurrency_build {
            config.concurrency_build = level;
        }
        if let Some(level) = self.concurrency_test {
            config.concurrency_test = level;
        }
        if let Some(ref track) = self.cdash_track {
            config.cdash_track = track.clone();
        }
        if let Some(ref file) = self.filename_packageenables {
            config.filename_packageenables = file.clone();
        }
        if let Some(ref file) = self.filename_subprojects {
            config.filename_subprojects = file.clone();
        }
        if let Some(ref job) = self.genconfig_job_name {
            config.genconfig_job_name = job.clone();
        }
        if let Some(ref ini) = self.gen_config_file {
            config.gen_config_file = ini.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Save the execution report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Store the execution report under the results directory
    #[arg(long)]
    pub save: bool,

    /// Results directory (defaults to the local data directory)
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Anchor report paths to the invocation directory
    ///
    /// The executor changes into the CTest directory for good, so relative
    /// paths must be resolved before it runs.
    pub fn resolve_paths(&mut self) -> io::Result<()> {
        let cwd = std::env::current_dir()?;
        if let Some(ref mut path) = self.output {
            *path = anchor(&cwd, path);
        }
        if let Some(ref mut dir) = self.results_dir {
            *dir = anchor(&cwd, dir);
        }
        Ok(())
    }
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Arguments for command printing
#[derive(Parser, Debug)]
pub struct CommandArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Arguments for results inspection
#[derive(Parser, Debug)]
pub struct ResultsArgs {
    #[command(subcommand)]
    pub action: ResultsAction,

    /// Results directory (defaults to the local data directory)
    #[arg(long, global = true)]
    pub results_dir: Option<PathBuf>,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: String,
}

#[derive(Subcommand, Debug)]
pub enum ResultsAction {
    /// List stored runs, newest first
    List,

    /// Show the most recent run
    Latest,

    /// Show a report file
    Show {
        /// Report file
        path: PathBuf,
    },
}

/// Arguments for configuration management
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "pr-driver.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        #[command(flatten)]
        context: ContextArgs,

        /// Output format (text, json, json-pretty)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate the effective configuration
    Validate {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show environment variable help and current values
    Env,
}
