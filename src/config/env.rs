//! Environment variable configuration
//!
//! Provides environment variable overrides for the driver configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "PR_DRIVER";

/// Overrides read from PR_DRIVER_* variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Workspace from PR_DRIVER_WORKSPACE, falling back to WORKSPACE
    pub workspace_dir: Option<String>,
    /// Build name from PR_DRIVER_BUILD_NAME
    pub build_name: Option<String>,
    /// Pull request number from PR_DRIVER_PR_NUMBER
    pub pullrequest_number: Option<String>,
    /// CI job number from PR_DRIVER_JOB_NUMBER
    pub jenkins_job_number: Option<String>,
    /// Build parallelism from PR_DRIVER_CONCURRENCY_BUILD
    pub concurrency_build: Option<u32>,
    /// Test parallelism from PR_DRIVER_CONCURRENCY_TEST
    pub concurrency_test: Option<u32>,
    /// CDash track from PR_DRIVER_CDASH_TRACK
    pub cdash_track: Option<String>,
    /// gen-config job name from PR_DRIVER_JOB_NAME
    pub genconfig_job_name: Option<String>,
    /// gen-config INI file from PR_DRIVER_GENCONFIG_INI
    pub gen_config_file: Option<String>,
    /// Dry run from PR_DRIVER_DRY_RUN
    pub dry_run: Option<bool>,
    /// Config file from PR_DRIVER_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            workspace_dir: get_env("WORKSPACE").or_else(|| env::var("WORKSPACE").ok()),
            build_name: get_env("BUILD_NAME"),
            pullrequest_number: get_env("PR_NUMBER"),
            jenkins_job_number: get_env("JOB_NUMBER"),
            concurrency_build: get_env_parse("CONCURRENCY_BUILD"),
            concurrency_test: get_env_parse("CONCURRENCY_TEST"),
            cdash_track: get_env("CDASH_TRACK"),
            genconfig_job_name: get_env("JOB_NAME"),
            gen_config_file: get_env("GENCONFIG_INI"),
            dry_run: get_env_bool("DRY_RUN"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.workspace_dir.is_some()
            || self.build_name.is_some()
            || self.pullrequest_number.is_some()
            || self.jenkins_job_number.is_some()
            || self.concurrency_build.is_some()
            || self.concurrency_test.is_some()
            || self.cdash_track.is_some()
            || self.genconfig_job_name.is_some()
            || self.gen_config_file.is_some()
            || self.dry_run.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_WORKSPACE:         {:?}", ENV_PREFIX, self.workspace_dir);
        println!("  {}_BUILD_NAME:        {:?}", ENV_PREFIX, self.build_name);
        println!("  {}_PR_NUMBER:         {:?}", ENV_PREFIX, self.pullrequest_number);
        println!("  {}_JOB_NUMBER:        {:?}", ENV_PREFIX, self.jenkins_job_number);
        println!("  {}_CONCURRENCY_BUILD: {:?}", ENV_PREFIX, self.concurrency_build);
        println!("  {}_CONCURRENCY_TEST:  {:?}", ENV_PREFIX, self.concurrency_test);
        println!("  {}_CDASH_TRACK:       {:?}", ENV_PREFIX, self.cdash_track);
        println!("  {}_JOB_NAME:          {:?}", ENV_PREFIX, self.genconfig_job_name);
        println!("  {}_GENCONFIG_INI:     {:?}", ENV_PREFIX, self.gen_config_file);
        println!("  {}_DRY_RUN:           {:?}", ENV_PREFIX, self.dry_run);
        println!("  {}_CONFIG:            {:?}", ENV_PREFIX, self.config_file);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all PR_DRIVER environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_WORKSPACE          Workspace directory (falls back to WORKSPACE)");
    println!("  {ENV_PREFIX}_BUILD_NAME         Explicit CDash build name");
    println!("  {ENV_PREFIX}_PR_NUMBER          Pull request number");
    println!("  {ENV_PREFIX}_JOB_NUMBER         CI job number");
    println!("  {ENV_PREFIX}_CONCURRENCY_BUILD  Build parallel level");
    println!("  {ENV_PREFIX}_CONCURRENCY_TEST   Test parallel level");
    println!("  {ENV_PREFIX}_CDASH_TRACK        CDash track");
    println!("  {ENV_PREFIX}_JOB_NAME           gen-config configuration name");
    println!("  {ENV_PREFIX}_GENCONFIG_INI      gen-config INI file");
    println!("  {ENV_PREFIX}_DRY_RUN            Skip all side effects (true/false)");
    println!("  {ENV_PREFIX}_CONFIG             Path to configuration file");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_PR_NUMBER=123");
    println!("  export {ENV_PREFIX}_JOB_NUMBER=7");
    println!("  pr-driver run --dry-run");
}
