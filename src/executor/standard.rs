//! Standard pull request test executor
//!
//! Changes into the CTest working directory, generates the CMake fragment,
//! then runs CTest once.

use anyhow::Result;
use chrono::Utc;
use std::cell::RefCell;
use std::fmt::Display;
use std::io::{self, Stdout, Write};
use tracing::{info, warn};

use super::host::ProcessHost;
use crate::config::DriverConfig;
use crate::ctest;
use crate::genconfig::FragmentGenerator;
use crate::models::{ExecutionReport, RunOutcome};
use crate::utils::Timer;

/// Placeholder printed when a dry run cannot derive a build name
const UNRESOLVED_BUILD_NAME: &str = "<unresolved>";

/// Banner printed at the start of every run
pub fn banner() -> String {
    let rule = format!("+{}+", "=".repeat(78));
    format!("{rule}\n|   E X E C U T E   S T A N D A R D   P U L L R E Q E S T   T E S T\n{rule}")
}

/// Standard-mode executor over a borrowed configuration context
///
/// Diagnostics go to `out`, which is stdout unless built with
/// [`StandardExecutor::with_output`].
pub struct StandardExecutor<'a, H: ProcessHost, W: Write = Stdout> {
    config: &'a DriverConfig,
    host: H,
    out: RefCell<W>,
}

impl<'a, H: ProcessHost> StandardExecutor<'a, H, Stdout> {
    pub fn new(config: &'a DriverConfig, host: H) -> Self {
        Self::with_output(config, host, io::stdout())
    }
}

impl<'a, H: ProcessHost, W: Write> StandardExecutor<'a, H, W> {
    pub fn with_output(config: &'a DriverConfig, host: H, out: W) -> Self {
        Self {
            config,
            host,
            out: RefCell::new(out),
        }
    }

    /// Run the test and return the integer status (0 ok, 1 CTest failure)
    #[allow(dead_code)]
    pub async fn execute_test(&self) -> Result<i32> {
        Ok(self.execute().await?.status())
    }

    /// Run the test and return a full report
    ///
    /// Directory and fragment-generation failures are returned as errors.
    /// CTest failures of any kind become [`RunOutcome::Failed`].
    pub async fn execute(&self) -> Result<ExecutionReport> {
        let started_at = Utc::now();
        let dry_run = self.config.dry_run;

        self.say(banner())?;

        let workdir = self.config.working_directory_ctest();
        self.say("")?;
        self.say(format_args!("--- Change directory to {}", workdir.display()))?;
        if !dry_run {
            self.host.change_dir(&workdir)?;
        }
        self.say("--- OK")?;
        self.say("")?;

        if !dry_run {
            FragmentGenerator::new(self.config)
                .write_cmake_fragment(&self.host)
                .await?;
        }

        let build_name = self.resolve_build_name()?;
        let command = ctest::ctest_command(self.config, &build_name);

        self.say("--- ctest command:")?;
        self.say(format_args!("--- cmd = {}", command.to_multiline()))?;
        self.say("")?;

        let timer = Timer::start("ctest");
        let (outcome, exit, failure) = if dry_run {
            self.say("--- SKIPPED DUE TO DRYRUN")?;
            (RunOutcome::DryRun, None, None)
        } else {
            info!("Running CTest for {}", build_name);
            match self.host.run(&command).await {
                Ok(exit) if exit.success() => (RunOutcome::Passed, Some(exit), None),
                Ok(exit) => {
                    self.say("--- ctest command failed!")?;
                    warn!("CTest finished with {}", exit);
                    (RunOutcome::Failed, Some(exit), Some(exit.to_string()))
                }
                Err(e) => {
                    self.say("--- ctest command failed!")?;
                    warn!("CTest could not be run: {}", e);
                    (RunOutcome::Failed, None, Some(e.to_string()))
                }
            }
        };
        self.say("")?;

        let duration = timer.stop();

        Ok(ExecutionReport {
            build_name,
            command,
            outcome,
            exit,
            failure,
            started_at,
            completed_at: Utc::now(),
            duration_ms: duration.as_millis() as u64,
        })
    }

    fn say(&self, line: impl Display) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn resolve_build_name(&self) -> Result<String> {
        match self.config.pullrequest_build_name() {
            Ok(name) => Ok(name),
            Err(e) if self.config.dry_run => {
                warn!("{}", e);
                Ok(UNRESOLVED_BUILD_NAME.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::{HostCall, RecordingHost, Reply};
    use std::path::PathBuf;

    fn config() -> DriverConfig {
        DriverConfig {
            workspace_dir: PathBuf::from("/ws"),
            build_name: Some("PR-123-test".to_string()),
            concurrency_build: 8,
            concurrency_test: 4,
            cdash_track: "Experimental".to_string(),
            genconfig_job_name: "rhel8_gcc".to_string(),
            ..Default::default()
        }
    }

    fn transcript<H: ProcessHost>(executor: &StandardExecutor<'_, H, Vec<u8>>) -> String {
        String::from_utf8(executor.out.borrow().clone()).unwrap()
    }

    #[test]
    fn test_banner() {
        let banner = banner();
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 80);
        assert_eq!(lines[0], lines[2]);
        assert!(lines[1].contains("S T A N D A R D"));
    }

    #[tokio::test]
    async fn test_dry_run_has_no_side_effects() {
        let config = DriverConfig {
            dry_run: true,
            ..config()
        };
        let executor = StandardExecutor::with_output(&config, RecordingHost::new(), Vec::new());

        let report = executor.execute().await.unwrap();
        assert_eq!(report.status(), 0);
        assert!(report.is_dry_run());
        assert!(executor.host.calls().is_empty());
        assert_eq!(report.command.token_count(), 14);

        let out = transcript(&executor);
        assert!(out.starts_with(&banner()));
        assert!(out.contains(
            "--- Change directory to /ws/TFW_testing_single_configure_prototype\n--- OK\n"
        ));
        assert!(out.contains("--- ctest command:\n--- cmd = ctest \\\n   -S \\\n   simple_testing.cmake"));
        assert!(out.contains("--- SKIPPED DUE TO DRYRUN\n"));
        assert!(!out.contains("--- ctest command failed!"));
    }

    #[tokio::test]
    async fn test_success_prints_no_skip_or_failure() {
        let config = config();
        let executor = StandardExecutor::with_output(&config, RecordingHost::new(), Vec::new());

        assert_eq!(executor.execute_test().await.unwrap(), 0);
        let out = transcript(&executor);
        assert!(out.contains("--- cmd = ctest"));
        assert!(!out.contains("SKIPPED DUE TO DRYRUN"));
        assert!(!out.contains("--- ctest command failed!"));
    }

    #[tokio::test]
    async fn test_dry_run_with_failing_ctest_still_succeeds() {
        let config = DriverConfig {
            dry_run: true,
            ..config()
        };
        let host = RecordingHost::new()
            .reply("ctest", Reply::Exit(1))
            .failing_change_dir();
        let executor = StandardExecutor::new(&config, host);

        assert_eq!(executor.execute_test().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_without_build_name() {
        let config = DriverConfig {
            dry_run: true,
            build_name: None,
            ..config()
        };
        let executor = StandardExecutor::new(&config, RecordingHost::new());

        let report = executor.execute().await.unwrap();
        assert_eq!(report.status(), 0);
        assert_eq!(report.build_name, UNRESOLVED_BUILD_NAME);
    }

    #[tokio::test]
    async fn test_success_runs_steps_in_order() {
        let config = config();
        let executor = StandardExecutor::new(&config, RecordingHost::new());

        let report = executor.execute().await.unwrap();
        assert_eq!(report.status(), 0);
        assert_eq!(report.outcome, RunOutcome::Passed);

        let calls = executor.host.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[0],
            HostCall::ChangeDir(PathBuf::from("/ws/TFW_testing_single_configure_prototype"))
        );
        match (&calls[1], &calls[2]) {
            (HostCall::Run(gen), HostCall::Run(ctest)) => {
                assert_eq!(gen.program, "gen-config");
                assert_eq!(ctest.program, "ctest");
                assert_eq!(ctest, &report.command);
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ctest_command_values() {
        let config = config();
        let executor = StandardExecutor::new(&config, RecordingHost::new());
        executor.execute_test().await.unwrap();

        let ctest = executor.host.commands().pop().unwrap();
        assert_eq!(ctest.token_count(), 14);
        assert_eq!(ctest.definition("build_name"), Some("PR-123-test"));
        assert_eq!(ctest.definition("PARALLEL_LEVEL"), Some("8"));
        assert_eq!(ctest.definition("TEST_PARALLEL_LEVEL"), Some("4"));
        assert_eq!(ctest.definition("dashboard_track"), Some("Experimental"));
        assert_eq!(ctest.definition("dashboard_model"), Some("Experimental"));
    }

    #[tokio::test]
    async fn test_ctest_nonzero_exit_returns_one() {
        let config = config();
        let host = RecordingHost::new().reply("ctest", Reply::Exit(8));
        let executor = StandardExecutor::with_output(&config, host, Vec::new());

        let report = executor.execute().await.unwrap();
        assert_eq!(report.status(), 1);
        assert_eq!(report.exit.and_then(|e| e.code), Some(8));
        assert_eq!(report.failure.as_deref(), Some("exit code 8"));

        let out = transcript(&executor);
        assert!(out.contains("--- ctest command failed!\n"));
        assert!(!out.contains("SKIPPED DUE TO DRYRUN"));
    }

    #[tokio::test]
    async fn test_ctest_spawn_failure_returns_one() {
        let config = config();
        let host = RecordingHost::new().reply("ctest", Reply::SpawnError);
        let executor = StandardExecutor::with_output(&config, host, Vec::new());

        let report = executor.execute().await.unwrap();
        assert_eq!(report.status(), 1);
        assert!(report.exit.is_none());
        assert!(report.failure.unwrap().contains("Failed to spawn ctest"));
        assert!(transcript(&executor).contains("--- ctest command failed!\n"));
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        let config = config();
        let host = RecordingHost::new().reply("gen-config", Reply::Exit(1));
        let executor = StandardExecutor::new(&config, host);

        assert!(executor.execute_test().await.is_err());
        let programs: Vec<String> = executor
            .host
            .commands()
            .into_iter()
            .map(|c| c.program)
            .collect();
        assert_eq!(programs, vec!["gen-config"]);
    }

    #[tokio::test]
    async fn test_change_dir_failure_propagates() {
        let config = config();
        let executor = StandardExecutor::new(&config, RecordingHost::new().failing_change_dir());

        assert!(executor.execute_test().await.is_err());
        assert!(executor.host.commands().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_build_name_is_error_outside_dry_run() {
        let config = DriverConfig {
            build_name: None,
            ..config()
        };
        let executor = StandardExecutor::new(&config, RecordingHost::new());

        assert!(executor.execute_test().await.is_err());
        let programs: Vec<String> = executor
            .host
            .commands()
            .into_iter()
            .map(|c| c.program)
            .collect();
        assert_eq!(programs, vec!["gen-config"]);
    }

    #[test]
    fn test_execute_test_blocking() {
        let config = config();
        let executor = StandardExecutor::new(&config, RecordingHost::new());
        assert_eq!(tokio_test::block_on(executor.execute_test()).unwrap(), 0);
    }
}
