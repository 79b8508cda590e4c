//! CMake fragment generation
//!
//! Drives the external `gen-config` tool, which turns a named configuration
//! from its INI file into a CMake fragment consumed by the CTest configure
//! step.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::config::DriverConfig;
use crate::executor::ProcessHost;
use crate::models::CommandSpec;

/// gen-config invocation for one configuration context
pub struct FragmentGenerator<'a> {
    config: &'a DriverConfig,
}

impl<'a> FragmentGenerator<'a> {
    pub fn new(config: &'a DriverConfig) -> Self {
        Self { config }
    }

    /// Where the fragment is written
    pub fn fragment_path(&self) -> PathBuf {
        self.config.config_script_path()
    }

    /// Non-interactive, forced fragment generation for the configured job
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.config.genconfig_program)
            .arg("--ini-file")
            .arg(self.config.gen_config_file.display().to_string())
            .arg("-y")
            .arg("--force")
            .arg("--cmake-fragment")
            .arg(self.fragment_path().display().to_string())
            .arg(&self.config.genconfig_job_name)
    }

    /// Run gen-config and require it to succeed
    pub async fn write_cmake_fragment<H: ProcessHost>(&self, host: &H) -> Result<()> {
        let command = self.command();
        info!(
            "Generating CMake fragment for {} at {}",
            self.config.genconfig_job_name,
            self.fragment_path().display()
        );

        let exit = host
            .run(&command)
            .await
            .context("Failed to execute gen-config")?;

        if !exit.success() {
            anyhow::bail!(
                "gen-config failed to write {} ({exit})",
                self.fragment_path().display()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::{RecordingHost, Reply};

    fn config() -> DriverConfig {
        DriverConfig {
            workspace_dir: PathBuf::from("/ws"),
            genconfig_job_name: "rhel8_gcc".to_string(),
            gen_config_file: PathBuf::from("/ws/GenConfigSettings.ini"),
            ..Default::default()
        }
    }

    #[test]
    fn test_command_shape() {
        let config = config();
        let cmd = FragmentGenerator::new(&config).command();
        assert_eq!(
            cmd.argv(),
            vec![
                "gen-config",
                "--ini-file",
                "/ws/GenConfigSettings.ini",
                "-y",
                "--force",
                "--cmake-fragment",
                "/ws/generatedPRFragment.cmake",
                "rhel8_gcc",
            ]
        );
    }

    #[tokio::test]
    async fn test_write_fragment_runs_generator() {
        let config = config();
        let host = RecordingHost::new();
        FragmentGenerator::new(&config)
            .write_cmake_fragment(&host)
            .await
            .unwrap();

        let commands = host.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "gen-config");
    }

    #[tokio::test]
    async fn test_generator_failure_is_error() {
        let config = config();
        let host = RecordingHost::new().reply("gen-config", Reply::Exit(2));
        let err = FragmentGenerator::new(&config)
            .write_cmake_fragment(&host)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exit code 2"));
    }

    #[test]
    fn test_generator_spawn_failure_is_error() {
        let config = config();
        let host = RecordingHost::new().reply("gen-config", Reply::SpawnError);
        let result =
            tokio_test::block_on(FragmentGenerator::new(&config).write_cmake_fragment(&host));
        assert!(result.is_err());
    }
}
