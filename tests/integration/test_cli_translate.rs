use assert_cmd::Command;
use predicates::str::contains;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/factory")
}

fn flowport(workspace: &TempDir) -> Command {
    let mut command = Command::new(assert_cmd::cargo::cargo_bin!("flowport"));
    command
        .current_dir(workspace.path())
        .env_remove("RUST_LOG")
        .env("FLOWPORT_CONSOLE_OUTPUT", "none");
    for name in [
        "FLOWPORT_FILES_TO_DELTA_SINKS",
        "FLOWPORT_SECRET_SCOPE",
        "FLOWPORT_NOTEBOOK_ROOT",
        "FLOWPORT_TIMEZONE_ID",
        "FLOWPORT_DEFAULT_NUM_WORKERS",
        "FLOWPORT_SOURCE_DIR",
        "FLOWPORT_OUTPUT_DIR",
        "FLOWPORT_LOG_LEVEL",
        "FLOWPORT_LOG_DIR",
    ] {
        command.env_remove(name);
    }
    command
}

#[test]
fn translate_writes_job_and_artifacts() {
    let workspace = TempDir::new().unwrap();
    let output = workspace.path().join("out");

    flowport(&workspace)
        .arg("translate")
        .arg("daily_load")
        .arg("--source")
        .arg(fixtures())
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("Translated pipeline 'daily_load' into"))
        .stdout(contains("Tasks: 7"))
        .stdout(contains("Notebooks: 3"))
        .stdout(contains("Declarative pipelines: 0"))
        .stdout(contains("Secrets: 3 (1 need a value)"))
        .stdout(contains("[NotifyTeam] activity: Unsupported activity type 'WebActivity'"));

    let job_dir = output.join("daily_load");
    let job: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(job_dir.join("job.json")).unwrap()).unwrap();
    assert_eq!(job["name"], "daily_load");
    assert_eq!(job["tags"]["CREATED_BY_FLOWPORT"], "");
    assert_eq!(job["tasks"][4]["for_each_task"]["task"]["task_key"], "ForEachRegion_iteration");
    assert!(job_dir
        .join("notebooks/Shared/flowport/unsupported/NotifyTeam.py")
        .is_file());
    assert!(workspace.path().join(".flowport/logs/flowport.log").is_file());
}

#[test]
fn translate_honors_declarative_override() {
    let workspace = TempDir::new().unwrap();

    flowport(&workspace)
        .args(["translate", "daily_load", "--files-to-delta-sinks", "true", "--source"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(contains("Declarative pipelines: 1"))
        .stdout(contains("Notebooks: 3"));

    let pipelines = workspace.path().join("flowport-out/daily_load/pipelines.json");
    let pipelines: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(pipelines).unwrap()).unwrap();
    assert_eq!(pipelines[0]["name"], "CopyOrders_pipeline");
    assert_eq!(
        pipelines[0]["local_identifier"],
        "CopyOrders_pipeline_local_pipeline"
    );
}

#[test]
fn explain_json_is_a_single_document() {
    let workspace = TempDir::new().unwrap();

    let assert = flowport(&workspace)
        .args(["explain", "daily_load", "--format", "json", "--source"])
        .arg(fixtures())
        .assert()
        .success();
    let document: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(document["job_settings"]["schedule"]["quartz_cron_expression"], "0 30 2 * * ?");
    assert_eq!(document["secrets"].as_array().map(Vec::len), Some(3));
    assert!(!workspace.path().join("flowport-out").exists());
}

#[test]
fn explain_text_lists_artifacts() {
    let workspace = TempDir::new().unwrap();

    flowport(&workspace)
        .args(["explain", "daily_load", "--source"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(contains("Notebook: /Shared/flowport/copy_data/CopyOrders"))
        .stdout(contains("Secret: flowport_credentials/lake_storage_account_key (needs a value)"))
        .stdout(contains("Secret: flowport_credentials/sales_sql_password (value provided)"));
}

#[test]
fn lint_reports_findings_without_errors() {
    let workspace = TempDir::new().unwrap();

    flowport(&workspace)
        .args(["lint", "daily_load", "--source"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(contains("Warning FP-LINT-005 [NotifyTeam]"))
        .stdout(contains(
            "Info FP-LINT-006 [flowport_credentials/lake_storage_account_key]",
        ));
}

#[test]
fn config_file_changes_notebook_root() {
    let workspace = TempDir::new().unwrap();
    std::fs::write(
        workspace.path().join("flowport.toml"),
        "[translation]\nnotebook_root = \"/Repos/migration\"\n",
    )
    .unwrap();

    flowport(&workspace)
        .args(["explain", "daily_load", "--source"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(contains("Notebook: /Repos/migration/unsupported/NotifyTeam"));
}

#[test]
fn unknown_pipeline_fails_with_store_code() {
    let workspace = TempDir::new().unwrap();

    flowport(&workspace)
        .args(["translate", "weekly_load", "--source"])
        .arg(fixtures())
        .assert()
        .failure()
        .stderr(contains("FP-STORE-001"))
        .stderr(contains("pipeline 'weekly_load' not found"));
}
