use flowport::core::config::{ConfigLoader, FlowportConfig};
use flowport::core::types::ErrorCategory;
use flowport::core::workflow::prepare_workflow;
use flowport::core::{translate_pipeline_with, WorkflowPreparer};
use insta::assert_debug_snapshot;
use serde_json::json;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_flowport_env() {
    for v in &[
        "FLOWPORT_FILES_TO_DELTA_SINKS",
        "FLOWPORT_SECRET_SCOPE",
        "FLOWPORT_NOTEBOOK_ROOT",
        "FLOWPORT_TIMEZONE_ID",
        "FLOWPORT_DEFAULT_NUM_WORKERS",
        "FLOWPORT_SOURCE_DIR",
        "FLOWPORT_OUTPUT_DIR",
    ] {
        env::remove_var(v);
    }
}

/// Defaults apply when the workspace has no flowport.toml
#[test]
#[serial]
fn test_config_loading_without_file() {
    clear_flowport_env();
    let temp_dir = TempDir::new().unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();

    assert_debug_snapshot!(config, @r#"
    FlowportConfig {
        translation: TranslationConfig {
            files_to_delta_sinks: None,
            secret_scope: "flowport_credentials",
            notebook_root: "/Shared/flowport",
            timezone_id: "UTC",
            default_num_workers: 1,
        },
        source: SourceConfig {
            export_dir: ".",
        },
        output: OutputConfig {
            dir: "flowport-out",
        },
    }
    "#);
}

/// Every section of the file is read
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_flowport_env();
    let temp_dir = TempDir::new().unwrap();
    let config_content = r#"
[translation]
files_to_delta_sinks = true
secret_scope = "adf_migration"
notebook_root = "/Repos/migration"
timezone_id = "Europe/Berlin"
default_num_workers = 3

[source]
export_dir = "adf-export"

[output]
dir = "jobs"
"#;
    fs::write(temp_dir.path().join("flowport.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();

    assert_eq!(config.translation.files_to_delta_sinks, Some(true));
    assert_eq!(config.translation.secret_scope, "adf_migration");
    assert_eq!(config.translation.notebook_root, "/Repos/migration");
    assert_eq!(config.translation.timezone_id, "Europe/Berlin");
    assert_eq!(config.translation.default_num_workers, 3);
    assert_eq!(config.source.export_dir, PathBuf::from("adf-export"));
    assert_eq!(config.output.dir, PathBuf::from("jobs"));
    assert!(ConfigLoader::validate_config(&config).is_ok());
}

/// Environment variables take precedence over the file
#[test]
#[serial]
fn test_env_precedence_integration() {
    clear_flowport_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("flowport.toml"),
        "[translation]\nsecret_scope = \"from_file\"\ndefault_num_workers = 2\n",
    )
    .unwrap();

    env::set_var("FLOWPORT_SECRET_SCOPE", "from_env");
    env::set_var("FLOWPORT_DEFAULT_NUM_WORKERS", "8");
    env::set_var("FLOWPORT_FILES_TO_DELTA_SINKS", "false");
    env::set_var("FLOWPORT_OUTPUT_DIR", "/tmp/flowport-jobs");

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    clear_flowport_env();

    assert_eq!(config.translation.secret_scope, "from_env");
    assert_eq!(config.translation.default_num_workers, 8);
    assert_eq!(config.translation.files_to_delta_sinks, Some(false));
    assert_eq!(config.output.dir, PathBuf::from("/tmp/flowport-jobs"));
}

/// Unparsable environment values leave the configured value in place
#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_flowport_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var("FLOWPORT_DEFAULT_NUM_WORKERS", "several");
    env::set_var("FLOWPORT_FILES_TO_DELTA_SINKS", "maybe");

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    clear_flowport_env();

    assert_eq!(config.translation.default_num_workers, 1);
    assert_eq!(config.translation.files_to_delta_sinks, None);
}

#[test]
#[serial]
fn test_malformed_file_is_a_configuration_error() {
    clear_flowport_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("flowport.toml"),
        "[translation\nsecret_scope = 1",
    )
    .unwrap();

    let error = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(error.category, ErrorCategory::ConfigurationError);
    assert_eq!(error.code, "FP-CONFIG-001");
}

#[test]
#[serial]
fn test_validation_rejects_relative_notebook_root() {
    clear_flowport_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("flowport.toml"),
        "[translation]\nnotebook_root = \"Shared/flowport\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    let error = ConfigLoader::validate_config(&config).unwrap_err();
    assert_eq!(error.code, "FP-CONFIG-001");
    assert!(error.message.contains("notebook_root"));
}

#[test]
fn test_env_documentation_lists_every_variable() {
    let docs = ConfigLoader::env_var_documentation();
    assert_eq!(docs.len(), 7);
    assert!(docs.iter().all(|line| line.starts_with("FLOWPORT_")));
}

/// Configured options reach translation and preparation
#[test]
fn test_config_drives_translation_and_preparation() {
    let config: FlowportConfig = toml::from_str(
        r#"
[translation]
secret_scope = "migration"
notebook_root = "/Repos/flowport"
timezone_id = "Europe/Paris"
"#,
    )
    .unwrap();

    let payload = json!({
        "name": "hourly",
        "properties": {
            "activities": [
                {"name": "Ping", "type": "WebActivity", "typeProperties": {"url": "https://x"}}
            ]
        },
        "trigger": {
            "name": "every_hour",
            "properties": {
                "type": "ScheduleTrigger",
                "typeProperties": {"recurrence": {"frequency": "Hour", "interval": 1}}
            }
        }
    });

    let pipeline = translate_pipeline_with(&payload, &config.translation.translation_options());
    let schedule = pipeline.schedule.clone().unwrap();
    assert_eq!(schedule.timezone_id, "Europe/Paris");
    assert_eq!(schedule.quartz_cron_expression, "0 0 * * * ?");

    let prepared = WorkflowPreparer::new(config.translation.prepare_options()).prepare(pipeline);
    assert_eq!(prepared.notebooks.len(), 1);
    assert_eq!(prepared.notebooks[0].file_path, "/Repos/flowport/unsupported/Ping");

    let defaults = prepare_workflow(translate_pipeline_with(&payload, &Default::default()), None);
    assert_eq!(defaults.notebooks[0].file_path, "/Shared/flowport/unsupported/Ping");
}
