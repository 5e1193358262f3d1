use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn planwright_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_planwright"));
    cmd.env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    planwright_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan-and-execute"))
        .stdout(predicate::str::contains("--model"));
}

#[test]
fn test_cli_version() {
    planwright_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("planwright"));
}

#[test]
fn test_config_where() {
    planwright_cmd().args(["config", "where"]).assert().success();
}

#[test]
fn test_invalid_subcommand() {
    planwright_cmd().arg("invalid-command").assert().failure();
}

#[test]
fn test_tools_listing() {
    planwright_cmd()
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("calculator"))
        .stdout(predicate::str::contains("current_time"));
}

#[test]
fn test_tools_json() {
    let output = planwright_cmd().args(["tools", "--json"]).output().unwrap();
    assert!(output.status.success());

    let tools: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tools[0]["name"], "calculator");
    assert!(tools[0]["input_schema"].is_object());
}

#[test]
fn test_config_set_and_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let path_arg = path.to_str().unwrap();

    planwright_cmd()
        .args(["--config", path_arg, "config", "set", "failure_policy", "continue"])
        .assert()
        .success();

    planwright_cmd()
        .args(["--config", path_arg, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failure_policy = \"continue\""));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    planwright_cmd()
        .args(["--config", path.to_str().unwrap(), "config", "set", "colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_run_without_api_key_fails() {
    let dir = TempDir::new().unwrap();

    planwright_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .args(["--provider", "anthropic", "run", "What is 2+2?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}
