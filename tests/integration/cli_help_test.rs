use assert_cmd::Command;
use predicates::str::{contains, starts_with};

const BIN: &str = "flowport";

fn flowport() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("flowport"))
}

#[test]
fn version_flag_prints_crate_version() {
    let expected = format!("{BIN} {}", flowport::VERSION);

    flowport()
        .arg("--version")
        .assert()
        .success()
        .stdout(starts_with(expected));
}

#[test]
fn help_lists_migration_commands() {
    let output = std::process::Command::new(assert_cmd::cargo::cargo_bin!("flowport"))
        .arg("--help")
        .output()
        .expect("should run successfully");

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.starts_with(&format!("{BIN} {}", flowport::VERSION)));
    assert!(stdout.contains("MIGRATION COMMANDS:"));
    for command in ["translate", "explain", "lint"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
    assert!(stdout.contains("Typical flow"));
}

#[test]
fn translate_help_describes_outputs() {
    flowport()
        .args(["translate", "--help"])
        .assert()
        .success()
        .stdout(contains("<PIPELINE>"))
        .stdout(contains("--source <DIR>"))
        .stdout(contains("--output <DIR>"))
        .stdout(contains("--files-to-delta-sinks <BOOL>"))
        .stdout(contains("flowport translate daily_load --source ./adf --output ./out"));
}

#[test]
fn explain_help_lists_formats() {
    flowport()
        .args(["explain", "--help"])
        .assert()
        .success()
        .stdout(contains("--format <FORMAT>"))
        .stdout(contains("text"))
        .stdout(contains("json"));
}

#[test]
fn lint_help_mentions_exit_status() {
    flowport()
        .args(["lint", "--help"])
        .assert()
        .success()
        .stdout(contains("Exits non-zero on errors"))
        .stdout(contains("--config <FILE>"));
}

#[test]
fn missing_pipeline_argument_is_a_usage_error() {
    flowport()
        .arg("translate")
        .assert()
        .failure()
        .stderr(contains("<PIPELINE>"));
}
