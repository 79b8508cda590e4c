//! Configuration module
//!
//! Holds the driver configuration context and the values derived from it.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::find_config;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Subdirectory of the workspace that CTest runs from by default
pub const DEFAULT_CTEST_SUBDIR: &str = "TFW_testing_single_configure_prototype";

/// Configuration validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Cannot derive build name: {0} is not set")]
    UnresolvedBuildName(&'static str),

    #[error("Invalid {field}: {value} (must be at least 1)")]
    InvalidConcurrency { field: &'static str, value: u32 },
}

/// Driver configuration context
///
/// Built once by the caller (file, then environment, then CLI flags) and
/// only read by the executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// CI workspace root
    pub workspace_dir: PathBuf,

    /// Directory CTest runs from (defaults under the workspace)
    pub ctest_working_dir: Option<PathBuf>,

    /// Explicit CDash build name
    pub build_name: Option<String>,

    /// Pull request number, used to derive the build name
    pub pullrequest_number: Option<String>,

    /// CI job number, used to derive the build name
    pub jenkins_job_number: Option<String>,

    /// Build parallelism (`PARALLEL_LEVEL`)
    pub concurrency_build: u32,

    /// Test parallelism (`TEST_PARALLEL_LEVEL`)
    pub concurrency_test: u32,

    /// CDash track label
    pub cdash_track: String,

    /// Package enables file handed to CTest
    pub filename_packageenables: String,

    /// Subproject list file handed to CTest
    pub filename_subprojects: String,

    /// Configuration name passed to gen-config
    pub genconfig_job_name: String,

    /// gen-config INI file
    pub gen_config_file: PathBuf,

    /// Fragment filename, relative to the workspace
    pub config_script: String,

    /// Fragment generator executable
    pub genconfig_program: String,

    /// Test driver executable
    pub ctest_program: String,

    /// Script passed to `ctest -S`
    pub ctest_script: String,

    /// Skip every side effect and only print what would happen
    pub dry_run: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let cores = default_concurrency();
        Self {
            workspace_dir: PathBuf::from("."),
            ctest_working_dir: None,
            build_name: None,
            pullrequest_number: None,
            jenkins_job_number: None,
            concurrency_build: cores,
            concurrency_test: cores,
            cdash_track: "Pull Request".to_string(),
            filename_packageenables: "../packageEnables.cmake".to_string(),
            filename_subprojects: "../package_subproject_list.cmake".to_string(),
            genconfig_job_name: String::new(),
            gen_config_file: PathBuf::from("GenConfigSettings.ini"),
            config_script: "generatedPRFragment.cmake".to_string(),
            genconfig_program: "gen-config".to_string(),
            ctest_program: "ctest".to_string(),
            ctest_script: "simple_testing.cmake".to_string(),
            dry_run: false,
        }
    }
}

impl DriverConfig {
    /// Build name reported to CDash
    ///
    /// An explicit `build_name` wins; otherwise the name is derived as
    /// `PR-<number>-test-<job name>-<job number>`.
    pub fn pullrequest_build_name(&self) -> Result<String, ConfigError> {
        if let Some(name) = self.build_name.as_deref().filter(|n| !n.is_empty()) {
            return Ok(name.to_string());
        }

        let number = non_empty(self.pullrequest_number.as_deref())
            .ok_or(ConfigError::UnresolvedBuildName("pullrequest_number"))?;
        let job_number = non_empty(self.jenkins_job_number.as_deref())
            .ok_or(ConfigError::UnresolvedBuildName("jenkins_job_number"))?;
        if self.genconfig_job_name.is_empty() {
            return Err(ConfigError::UnresolvedBuildName("genconfig_job_name"));
        }

        Ok(format!(
            "PR-{}-test-{}-{}",
            number, self.genconfig_job_name, job_number
        ))
    }

    /// Directory the executor changes into before running CTest
    pub fn working_directory_ctest(&self) -> PathBuf {
        self.ctest_working_dir
            .clone()
            .unwrap_or_else(|| self.workspace_dir.join(DEFAULT_CTEST_SUBDIR))
    }

    /// Path of the generated CMake fragment
    pub fn config_script_path(&self) -> PathBuf {
        self.workspace_dir.join(&self.config_script)
    }

    /// CTest build directory
    pub fn build_dir(&self) -> String {
        format!("{}/pull_request_test", self.workspace_dir.display())
    }

    /// Validate the context
    ///
    /// Dry runs only print, so they are accepted as-is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dry_run {
            return Ok(());
        }

        let required: [(&'static str, bool); 10] = [
            ("workspace_dir", self.workspace_dir.as_os_str().is_empty()),
            ("cdash_track", self.cdash_track.is_empty()),
            ("filename_packageenables", self.filename_packageenables.is_empty()),
            ("filename_subprojects", self.filename_subprojects.is_empty()),
            ("genconfig_job_name", self.genconfig_job_name.is_empty()),
            ("gen_config_file", self.gen_config_file.as_os_str().is_empty()),
            ("config_script", self.config_script.is_empty()),
            ("genconfig_program", self.genconfig_program.is_empty()),
            ("ctest_program", self.ctest_program.is_empty()),
            ("ctest_script", self.ctest_script.is_empty()),
        ];
        for (field, missing) in required {
            if missing {
                return Err(ConfigError::MissingField(field));
            }
        }

        if self.concurrency_build == 0 {
            return Err(ConfigError::InvalidConcurrency {
                field: "concurrency_build",
                value: self.concurrency_build,
            });
        }
        if self.concurrency_test == 0 {
            return Err(ConfigError::InvalidConcurrency {
                field: "concurrency_test",
                value: self.concurrency_test,
            });
        }

        self.pullrequest_build_name().map(|_| ())
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(ref dir) = env.workspace_dir {
            self.workspace_dir = PathBuf::from(dir);
        }
        if let Some(ref name) = env.build_name {
            self.build_name = Some(name.clone());
        }
        if let Some(ref number) = env.pullrequest_number {
            self.pullrequest_number = Some(number.clone());
        }
        if let Some(ref number) = env.jenkins_job_number {
            self.jenkins_job_number = Some(number.clone());
        }
        if let Some(level) = env.concurrency_build {
            self.concurrency_build = level;
        }
        if let Some(level) = env.concurrency_test {
            self.concurrency_test = level;
        }
        if let Some(ref track) = env.cdash_track {
            self.cdash_track = track.clone();
        }
        if let Some(ref job) = env.genconfig_job_name {
            self.genconfig_job_name = job.clone();
        }
        if let Some(ref ini) = env.gen_config_file {
            self.gen_config_file = PathBuf::from(ini);
        }
        if let Some(dry_run) = env.dry_run {
            self.dry_run = dry_run;
        }
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            workspace_dir: PathBuf::from("/scratch/jenkins/workspace"),
            pullrequest_number: Some("123".to_string()),
            jenkins_job_number: Some("1".to_string()),
            concurrency_build: 20,
            concurrency_test: 4,
            genconfig_job_name: "rhel8_gcc-openmpi_debug_shared_no-kokkos-arch".to_string(),
            ..Default::default()
        }
    }
}

fn default_concurrency() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
