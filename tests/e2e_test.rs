/// End-to-end tests for the CLI
///
/// Runs the compiled binary in an isolated working directory. Nothing here
/// reaches a real CI provider: network-facing runs point the API base at a
/// closed local port.
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CLOSED_PORT_API: &str = "http://127.0.0.1:9/api/v1.1/project/github/acme/widgets";

fn cli(workdir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ci-failure-scan");
    cmd.current_dir(workdir.path()).env_remove("CIRCLE_TOKEN");
    cmd
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        let dir = TempDir::new().unwrap();
        cli(&dir)
            .arg("--help")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("--no-cache"))
            .stdout(predicate::str::contains("CIRCLE_TOKEN"));
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        let dir = TempDir::new().unwrap();
        cli(&dir)
            .arg("--version")
            .assert()
            .code(0)
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        let dir = TempDir::new().unwrap();
        cli(&dir).arg("--invalid-option").assert().code(2);
    }

    /// Exit code 2: Worker count below one
    #[test]
    fn test_exit_code_zero_workers() {
        let dir = TempDir::new().unwrap();
        cli(&dir).args(["--workers", "0"]).assert().code(2);
    }

    /// Exit code 2: Non-numeric build count
    #[test]
    fn test_exit_code_invalid_count() {
        let dir = TempDir::new().unwrap();
        cli(&dir).args(["--count", "many"]).assert().code(2);
    }

    /// Exit code 3: Explicit config file does not exist
    #[test]
    fn test_exit_code_missing_config_file() {
        let dir = TempDir::new().unwrap();
        cli(&dir)
            .args(["--config", "does-not-exist.yml"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to read config file"));
    }

    /// Exit code 3: Unreachable CI provider
    #[test]
    fn test_exit_code_unreachable_provider() {
        let dir = TempDir::new().unwrap();
        cli(&dir)
            .args(["--api-base", CLOSED_PORT_API, "--branch", "main", "--count", "1"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains(
                "Build list fetch failed for branch: main",
            ));
    }
}

mod config_file_tests {
    use super::*;

    #[test]
    fn test_discovered_config_is_validated() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ci-failure-scan.config.yml"),
            "workers: 0\n",
        )
        .unwrap();

        cli(&dir)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("workers must be at least 1"));
    }

    #[test]
    fn test_invalid_yaml_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("custom.yml");
        fs::write(&config_path, "branch: [unterminated").unwrap();

        cli(&dir)
            .arg("--config")
            .arg(&config_path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to parse config file"))
            .stderr(predicate::str::contains("Hint"));
    }

    #[test]
    fn test_invalid_pattern_in_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ci-failure-scan.config.yml"),
            r#"
patterns:
  - id: 1
    pattern: "[a-"
    regex: true
"#,
        )
        .unwrap();

        cli(&dir)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("patterns[0] does not compile"));
    }

    #[test]
    fn test_unknown_field_warns_and_config_values_apply() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ci-failure-scan.config.yml"),
            format!(
                "api_base: {}\nbranch: release\ncount: 1\nflaky_retries: 3\n",
                CLOSED_PORT_API
            ),
        )
        .unwrap();

        cli(&dir)
            .assert()
            .code(3)
            .stderr(predicate::str::contains(
                "Unknown config field 'flaky_retries'",
            ))
            .stderr(predicate::str::contains(
                "Build list fetch failed for branch: release",
            ));
    }

    #[test]
    fn test_flag_overrides_config_branch() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ci-failure-scan.config.yml"),
            format!("api_base: {}\nbranch: release\ncount: 1\n", CLOSED_PORT_API),
        )
        .unwrap();

        cli(&dir)
            .args(["--branch", "nightly"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains(
                "Build list fetch failed for branch: nightly",
            ));
    }
}

mod store_tests {
    use super::*;

    #[test]
    fn test_corrupt_store_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("store.json"), "{ not json").unwrap();

        cli(&dir)
            .args(["--store", "store.json", "--api-base", CLOSED_PORT_API])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to parse store"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_store_is_rejected() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("real.json");
        fs::write(&target, "{}").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.json")).unwrap();

        cli(&dir)
            .args(["--store", "link.json", "--api-base", CLOSED_PORT_API])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("symbolic link"));
    }
}
