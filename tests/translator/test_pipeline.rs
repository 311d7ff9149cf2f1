use flowport::core::ir::{ActivityKind, DependencyOutcome, PauseStatus};
use flowport::core::translator::{translate_pipeline, translate_pipeline_with, TranslationOptions};
use serde_json::json;

fn notebook(name: &str, path: &str) -> serde_json::Value {
    json!({
        "name": name,
        "type": "DatabricksNotebook",
        "typeProperties": {"notebookPath": path, "baseParameters": {"region": "@item()"}}
    })
}

#[test]
fn test_for_each_pipeline_produces_three_tasks() {
    let pipeline = translate_pipeline(&json!({
        "name": "regions",
        "properties": {
            "activities": [{
                "name": "ForEachRegion",
                "type": "ForEach",
                "typeProperties": {
                    "items": {"value": "@createArray(1,2,3)", "type": "Expression"},
                    "batchCount": 2,
                    "activities": [
                        notebook("ProcessRegion", "/Shared/process_region"),
                        notebook("Summarize", "/Shared/summarize")
                    ]
                }
            }]
        }
    }));

    assert_eq!(pipeline.tasks.len(), 3);
    let container = pipeline.task("ForEachRegion").expect("container task");
    let ActivityKind::ForEach(for_each) = &container.activity.kind else {
        panic!("expected ForEach");
    };
    assert_eq!(for_each.items, r#"["1","2","3"]"#);
    assert_eq!(for_each.concurrency, 2);

    for key in ["ProcessRegion", "Summarize"] {
        let task = pipeline.task(key).expect("inner task");
        assert_eq!(task.activity.base.depends_on.len(), 1);
        assert_eq!(task.activity.base.depends_on[0].task_key, "ForEachRegion");
        assert_eq!(task.activity.base.depends_on[0].outcome, DependencyOutcome::Succeeded);
        let ActivityKind::Notebook(notebook) = &task.activity.kind else {
            panic!("expected notebook");
        };
        assert_eq!(notebook.base_parameters["region"], "{{input}}");
    }
}

#[test]
fn test_pipeline_metadata_is_carried_over() {
    let pipeline = translate_pipeline(&json!({
        "name": "daily_load",
        "properties": {
            "description": "Nightly load",
            "concurrency": 4,
            "annotations": ["sales", "nightly"],
            "parameters": {
                "mode": {"type": "String", "defaultValue": "full"},
                "days": {"type": "Int", "defaultValue": 7}
            },
            "activities": [notebook("Load", "/Shared/load")]
        },
        "trigger": {
            "name": "nightly",
            "properties": {
                "type": "ScheduleTrigger",
                "runtimeState": "Stopped",
                "typeProperties": {"recurrence": {
                    "frequency": "Day",
                    "interval": 1,
                    "schedule": {"hours": [2], "minutes": [30]}
                }}
            }
        }
    }));

    assert_eq!(pipeline.name, "daily_load");
    assert_eq!(pipeline.description.as_deref(), Some("Nightly load"));
    assert_eq!(pipeline.max_concurrent_runs, Some(4));
    assert_eq!(
        pipeline.tags.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["nightly", "sales"]
    );
    assert!(pipeline.tags.values().all(String::is_empty));
    let parameters: Vec<(&str, &str)> = pipeline
        .parameters
        .iter()
        .map(|parameter| (parameter.name.as_str(), parameter.default.as_str()))
        .collect();
    assert_eq!(parameters, vec![("mode", "full"), ("days", "7")]);

    let schedule = pipeline.schedule.expect("schedule");
    assert_eq!(schedule.quartz_cron_expression, "0 30 2 * * ?");
    assert_eq!(schedule.timezone_id, "UTC");
    assert_eq!(schedule.pause_status, Some(PauseStatus::Paused));
    assert!(pipeline.not_translatable.is_empty());
}

#[test]
fn test_unnamed_pipeline_and_diagnostics() {
    let pipeline = translate_pipeline(&json!({
        "properties": {
            "activities": [
                notebook("Load", "/Shared/load"),
                {"name": "Wait", "type": "Wait", "dependsOn": [{"activity": "Load"}]}
            ]
        }
    }));

    assert_eq!(pipeline.name, "UNNAMED_WORKFLOW");
    assert_eq!(pipeline.tasks.len(), 2);
    let wait = pipeline.task("Wait").expect("placeholder task");
    assert!(wait.activity.placeholder().is_some());
    assert_eq!(wait.activity.base.depends_on[0].task_key, "Load");

    let properties: Vec<&str> = pipeline
        .not_translatable
        .iter()
        .map(|entry| entry.property.as_str())
        .collect();
    assert_eq!(properties, vec!["pipeline.name", "activity"]);
    assert_eq!(pipeline.not_translatable[1].activity_name.as_deref(), Some("Wait"));
}

#[test]
fn test_options_set_schedule_timezone() {
    let options = TranslationOptions {
        timezone_id: "America/New_York".to_string(),
    };
    let pipeline = translate_pipeline_with(
        &json!({
            "name": "hourly",
            "properties": {"activities": []},
            "trigger": {"properties": {
                "type": "ScheduleTrigger",
                "typeProperties": {"recurrence": {"frequency": "Hour", "interval": 1}}
            }}
        }),
        &options,
    );
    let schedule = pipeline.schedule.expect("schedule");
    assert_eq!(schedule.timezone_id, "America/New_York");
    assert_eq!(schedule.quartz_cron_expression, "0 0 * * * ?");
    assert_eq!(schedule.pause_status, None);
    assert!(pipeline.tasks.is_empty());
}
