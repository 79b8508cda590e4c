//! CTest command construction
//!
//! The test driver is always invoked with the same fourteen tokens; only
//! the values substituted into the `-D` definitions vary.

use crate::config::DriverConfig;
use crate::models::CommandSpec;

/// CDash model, independent of the configured track
pub const DASHBOARD_MODEL: &str = "Experimental";

/// Build the CTest command for a resolved build name
pub fn ctest_command(config: &DriverConfig, build_name: &str) -> CommandSpec {
    CommandSpec::new(&config.ctest_program)
        .arg("-S")
        .arg(&config.ctest_script)
        .define("build_name", build_name)
        .define("skip_by_parts_submit", "OFF")
        .define("skip_update_step", "ON")
        .define("dashboard_model", DASHBOARD_MODEL)
        .define("dashboard_track", &config.cdash_track)
        .define("PARALLEL_LEVEL", config.concurrency_build)
        .define("TEST_PARALLEL_LEVEL", config.concurrency_test)
        .define("build_dir", config.build_dir())
        .define("configure_script", config.config_script_path().display())
        .define("package_enables", &config.filename_packageenables)
        .define("subprojects_file", &config.filename_subprojects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> DriverConfig {
        DriverConfig {
            workspace_dir: PathBuf::from("/ws"),
            concurrency_build: 8,
            concurrency_test: 4,
            cdash_track: "Experimental".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_shape() {
        let cmd = ctest_command(&config(), "PR-123-test");
        assert_eq!(
            cmd.argv(),
            vec![
                "ctest",
                "-S",
                "simple_testing.cmake",
                "-Dbuild_name=PR-123-test",
                "-Dskip_by_parts_submit=OFF",
                "-Dskip_update_step=ON",
                "-Ddashboard_model=Experimental",
                "-Ddashboard_track=Experimental",
                "-DPARALLEL_LEVEL=8",
                "-DTEST_PARALLEL_LEVEL=4",
                "-Dbuild_dir=/ws/pull_request_test",
                "-Dconfigure_script=/ws/generatedPRFragment.cmake",
                "-Dpackage_enables=../packageEnables.cmake",
                "-Dsubprojects_file=../package_subproject_list.cmake",
            ]
        );
        assert_eq!(cmd.token_count(), 14);
    }

    #[test]
    fn test_dashboard_model_ignores_track() {
        let config = DriverConfig {
            cdash_track: "Pull Request".to_string(),
            ..config()
        };
        let cmd = ctest_command(&config, "PR-123-test");

        assert_eq!(cmd.definition("dashboard_track"), Some("Pull Request"));
        assert_eq!(cmd.definition("dashboard_model"), Some("Experimental"));
    }

    #[test]
    fn test_values_come_from_config() {
        let config = DriverConfig {
            ctest_program: "/opt/cmake/bin/ctest".to_string(),
            filename_packageenables: "enables.cmake".to_string(),
            filename_subprojects: "subprojects.cmake".to_string(),
            ..config()
        };
        let cmd = ctest_command(&config, "PR-9-test-job-3");

        assert_eq!(cmd.program, "/opt/cmake/bin/ctest");
        assert_eq!(cmd.definition("build_name"), Some("PR-9-test-job-3"));
        assert_eq!(cmd.definition("package_enables"), Some("enables.cmake"));
        assert_eq!(cmd.definition("subprojects_file"), Some("subprojects.cmake"));
        assert_eq!(cmd.token_count(), 14);
    }
}
