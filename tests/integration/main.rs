//! Integration tests for prebuilt

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[storage]
path = ".prebuilt/builds"

[[apps]]
name = "svc"
build_command = ["make"]
inputs = ["src/main.go"]

[[apps]]
name = "docs"
build_command = ["mkdocs", "build"]

[[apps]]
name = "scratch"
inputs = ["src/main.go"]
"#;

    fn prebuilt() -> Command {
        let mut cmd = cargo_bin_cmd!("prebuilt");
        cmd.env_remove("PREBUILT_CONFIG")
            .env_remove("PREBUILT_BRANCH")
            .env_remove("PREBUILT_COMPARE_BRANCH");
        cmd
    }

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".prebuilt.toml"), CONFIG).unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.go"), "package main").unwrap();
        dir
    }

    fn in_repo(dir: &Path) -> Command {
        let mut cmd = prebuilt();
        cmd.current_dir(dir);
        cmd
    }

    #[test]
    fn help_displays() {
        prebuilt()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("build cache"));
    }

    #[test]
    fn version_displays() {
        prebuilt()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("prebuilt"));
    }

    #[test]
    fn config_path_found_from_subdirectory() {
        let dir = repo();
        in_repo(&dir.path().join("src"))
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains(".prebuilt.toml"));
    }

    #[test]
    fn config_show() {
        let dir = repo();
        in_repo(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[storage]"));
    }

    #[test]
    fn undefined_statuses() {
        let dir = repo();
        in_repo(dir.path())
            .args(["status", "docs", "scratch", "-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("docs Inputs Undefined"))
            .stdout(predicate::str::contains("scratch Build Command Undefined"));
    }

    #[test]
    fn pending_then_exist_after_record() {
        let dir = repo();

        in_repo(dir.path())
            .args(["status", "svc", "-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("svc Pending"));

        in_repo(dir.path())
            .args(["record", "svc", "--branch", "main", "--output", "image=docker://registry/svc:1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Recorded build"));

        in_repo(dir.path())
            .args(["status", "svc", "-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("svc Exist"));

        in_repo(dir.path())
            .args(["ls", "svc", "-f", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"type\": \"docker\""));
    }

    #[test]
    fn changed_input_is_pending() {
        let dir = repo();
        in_repo(dir.path()).args(["record", "svc"]).assert().success();

        fs::write(dir.path().join("src/main.go"), "package main // edited").unwrap();

        in_repo(dir.path())
            .args(["status", "svc", "-f", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("svc Pending"));
    }

    #[test]
    fn feature_branch_falls_back_to_compare_branch() {
        let dir = repo();
        in_repo(dir.path())
            .args(["record", "svc", "--branch", "main"])
            .assert()
            .success();

        in_repo(dir.path())
            .args(["status", "svc", "-b", "feature", "--compare", "main", "-f", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\": \"exist\""))
            .stdout(predicate::str::contains("\"query_branch\": \"main\""));
    }

    #[test]
    fn missing_input_fails() {
        let dir = repo();
        fs::remove_file(dir.path().join("src/main.go")).unwrap();

        in_repo(dir.path())
            .args(["status", "svc"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("calculating total input digest failed"));
    }

    #[test]
    fn unknown_app_fails() {
        let dir = repo();
        in_repo(dir.path())
            .args(["status", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Application not found"));
    }

    #[test]
    fn explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        prebuilt()
            .args(["--config"])
            .arg(dir.path().join("missing.toml"))
            .args(["status"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Configuration file not found"));
    }
}
