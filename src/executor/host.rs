//! Process host
//!
//! The side effects the driver has on its surroundings: changing the
//! working directory and running external programs.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::models::{CommandSpec, ProcessExit};

/// Process host errors
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to change directory to {}: {source}", .path.display())]
    ChangeDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Side effects available to an executor
#[allow(async_fn_in_trait)]
pub trait ProcessHost {
    /// Change the process working directory
    fn change_dir(&self, dir: &Path) -> Result<(), HostError>;

    /// Run a command to completion
    async fn run(&self, command: &CommandSpec) -> Result<ProcessExit, HostError>;
}

/// Host backed by the real process environment
///
/// Children inherit the current environment, working directory, and
/// stdio. There is no timeout.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl ProcessHost for SystemHost {
    fn change_dir(&self, dir: &Path) -> Result<(), HostError> {
        debug!("Changing directory to {}", dir.display());
        std::env::set_current_dir(dir).map_err(|source| HostError::ChangeDir {
            path: dir.to_path_buf(),
            source,
        })
    }

    async fn run(&self, command: &CommandSpec) -> Result<ProcessExit, HostError> {
        debug!("Executing: {}", command);

        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .await
            .map_err(|source| HostError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        let exit = ProcessExit::from(status);
        debug!("{} finished with {}", command.program, exit);
        Ok(exit)
    }
}
