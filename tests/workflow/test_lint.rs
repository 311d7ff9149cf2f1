use flowport::core::lint::{LintRegistry, LintResult, LintSeverity};
use flowport::core::workflow::job::{ForEachTask, NotebookTask};
use flowport::core::workflow::{
    JobSettings, JobTask, PreparedWorkflow, SecretInstruction, TaskDependency, TaskPayload,
};
use indexmap::IndexMap;
use std::collections::BTreeMap;

fn notebook_task(key: &str, path: &str, depends_on: &[&str]) -> JobTask {
    JobTask {
        task_key: key.to_string(),
        description: None,
        depends_on: depends_on
            .iter()
            .map(|upstream| TaskDependency {
                task_key: upstream.to_string(),
                outcome: None,
            })
            .collect(),
        run_if: None,
        payload: TaskPayload::NotebookTask(NotebookTask {
            notebook_path: path.to_string(),
            base_parameters: IndexMap::new(),
        }),
        timeout_seconds: None,
        max_retries: None,
        min_retry_interval_millis: None,
        existing_cluster_id: None,
        new_cluster: None,
        libraries: Vec::new(),
    }
}

fn task(key: &str, depends_on: &[&str]) -> JobTask {
    notebook_task(key, "/Shared/etl/run", depends_on)
}

fn workflow(tasks: Vec<JobTask>, secrets: Vec<SecretInstruction>) -> PreparedWorkflow {
    PreparedWorkflow {
        job_settings: JobSettings {
            name: "daily_load".to_string(),
            description: None,
            parameters: Vec::new(),
            schedule: None,
            tags: BTreeMap::new(),
            max_concurrent_runs: None,
            tasks,
        },
        notebooks: Vec::new(),
        pipelines: Vec::new(),
        secrets,
        unsupported: Vec::new(),
    }
}

fn secret(key: &str, value: Option<&str>) -> SecretInstruction {
    SecretInstruction {
        scope: "flowport_credentials".to_string(),
        key: key.to_string(),
        service_name: "lake".to_string(),
        service_type: "csv".to_string(),
        provided_value: value.map(str::to_string),
        user_input_required: value.is_none(),
    }
}

fn codes(results: &[LintResult]) -> Vec<&str> {
    results.iter().map(|result| result.code.as_str()).collect()
}

#[test]
fn test_clean_workflow_has_no_findings() {
    let results = LintRegistry::new().run(&workflow(
        vec![task("load", &[]), task("publish", &["load"])],
        vec![secret("sql_password", Some("s3cret"))],
    ));
    assert!(results.is_empty());
    assert!(!LintRegistry::has_errors(&results));
}

#[test]
fn test_duplicate_keys_include_loop_iterations() {
    let mut loop_task = task("regions", &[]);
    loop_task.payload = TaskPayload::ForEachTask(ForEachTask {
        inputs: "[\"1\",\"2\"]".to_string(),
        concurrency: 1,
        task: Box::new(task("load", &[])),
    });
    let results = LintRegistry::new().run(&workflow(vec![task("load", &[]), loop_task], Vec::new()));

    assert_eq!(codes(&results), vec!["FP-LINT-001"]);
    assert_eq!(results[0].message, "duplicate task key 'load' found 2 times");
    assert_eq!(results[0].location.as_deref(), Some("load"));
    assert!(LintRegistry::has_errors(&results));
}

#[test]
fn test_unknown_dependency_target() {
    let results = LintRegistry::new().run(&workflow(vec![task("publish", &["ghost"])], Vec::new()));
    assert_eq!(codes(&results), vec!["FP-LINT-002"]);
    assert_eq!(results[0].message, "task 'publish' depends on unknown task 'ghost'");
}

#[test]
fn test_cycle_and_forward_dependency() {
    let results = LintRegistry::new().run(&workflow(
        vec![task("a", &["b"]), task("b", &["a"])],
        Vec::new(),
    ));
    assert_eq!(codes(&results), vec!["FP-LINT-003", "FP-LINT-004"]);
    assert_eq!(results[0].message, "dependency cycle between a, b");
    assert_eq!(results[1].message, "task 'a' depends on 'b', which is listed after it");
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let results = LintRegistry::new().run(&workflow(vec![task("a", &["a"])], Vec::new()));
    assert_eq!(codes(&results), vec!["FP-LINT-003"]);
}

#[test]
fn test_results_sorted_by_severity_then_code() {
    let results = LintRegistry::new().run(&workflow(
        vec![
            notebook_task("notify", "/Shared/flowport/unsupported/notify", &[]),
            task("publish", &["ghost"]),
        ],
        vec![secret("lake_storage_account_key", None)],
    ));

    let summary: Vec<(&str, LintSeverity)> = results
        .iter()
        .map(|result| (result.code.as_str(), result.severity))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("FP-LINT-002", LintSeverity::Error),
            ("FP-LINT-005", LintSeverity::Warning),
            ("FP-LINT-006", LintSeverity::Info),
        ]
    );
    assert_eq!(
        results[2].location.as_deref(),
        Some("flowport_credentials/lake_storage_account_key")
    );
    assert_eq!(LintSeverity::Warning.to_string(), "Warning");
}

#[test]
fn test_placeholder_inside_loop_is_reported() {
    let mut loop_task = task("regions", &[]);
    loop_task.payload = TaskPayload::ForEachTask(ForEachTask {
        inputs: "[]".to_string(),
        concurrency: 1,
        task: Box::new(notebook_task(
            "regions_iteration",
            "/Shared/flowport/unsupported/process",
            &[],
        )),
    });
    let results = LintRegistry::new().run(&workflow(vec![loop_task], Vec::new()));
    assert_eq!(codes(&results), vec!["FP-LINT-005"]);
    assert_eq!(results[0].location.as_deref(), Some("regions_iteration"));
    assert!(!LintRegistry::has_errors(&results));
}
