use flowport::core::store::workflow_output::{job_identifier, JOB_FILE, SECRETS_FILE};
use flowport::core::store::{
    DefinitionStore, FactoryExportStore, StoreBuilder, StoreError, StoreKind, WorkflowOutputStore,
};
use flowport::core::translator::translate_pipeline;
use flowport::core::workflow::prepare_workflow;
use flowport::core::AppError;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/factory")
}

#[test]
fn test_factory_export_lists_pipelines() {
    let store = FactoryExportStore::new(fixtures()).unwrap();
    assert_eq!(store.pipeline_names().unwrap(), vec!["daily_load"]);
    assert_eq!(store.root(), fixtures().as_path());
}

#[test]
fn test_factory_export_inlines_references() {
    let store = FactoryExportStore::new(fixtures()).unwrap();
    let pipeline = store.load("daily_load").unwrap();
    let activities = &pipeline["properties"]["activities"];

    let copy = &activities[0];
    assert_eq!(copy["inputDatasetDefinitions"][0]["name"], "raw_orders");
    assert_eq!(
        copy["inputDatasetDefinitions"][0]["linkedServiceDefinition"]["name"],
        "lake"
    );
    assert_eq!(copy["outputDatasetDefinitions"][0]["name"], "curated_orders");

    let publish = &activities[1];
    assert_eq!(
        publish["outputDatasetDefinitions"][0]["linkedServiceDefinition"]["name"],
        "sales_sql"
    );

    let full_refresh = &activities[2]["typeProperties"]["ifTrueActivities"][0];
    assert_eq!(full_refresh["linkedServiceDefinition"]["name"], "dbx_cluster");
    let process_region = &activities[3]["typeProperties"]["activities"][0];
    assert_eq!(process_region["linkedServiceDefinition"]["name"], "dbx_cluster");

    assert_eq!(pipeline["trigger"]["name"], "nightly");
}

#[test]
fn test_factory_export_unknown_pipeline() {
    let store = FactoryExportStore::new(fixtures()).unwrap();
    let error = store.load("weekly_load").unwrap_err();
    assert!(matches!(error, StoreError::NotFound { kind: "pipeline", .. }));
    assert_eq!(error.code(), "FP-STORE-001");

    let app_error: AppError = error.into();
    assert_eq!(app_error.code, "FP-STORE-001");
    assert_eq!(app_error.message, "pipeline 'weekly_load' not found");
}

#[test]
fn test_malformed_definition_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("pipeline")).unwrap();
    std::fs::write(dir.path().join("pipeline/broken.json"), "{ not json").unwrap();

    let store = FactoryExportStore::new(dir.path()).unwrap();
    let error = store.pipeline_names().unwrap_err();
    assert_eq!(error.code(), "FP-STORE-005");
    assert!(error.to_string().contains("broken.json"));
}

#[test]
fn test_fixture_pipeline_translates_end_to_end() {
    let store = FactoryExportStore::new(fixtures()).unwrap();
    let pipeline = translate_pipeline(&store.load("daily_load").unwrap());
    let keys: Vec<&str> = pipeline
        .tasks
        .iter()
        .map(|task| task.activity.task_key())
        .collect();
    assert_eq!(
        keys,
        vec![
            "CopyOrders",
            "PublishOrders",
            "CheckMode",
            "FullRefresh",
            "ForEachRegion",
            "ProcessRegion",
            "Summarize",
            "NotifyTeam"
        ]
    );

    let prepared = prepare_workflow(pipeline, None);
    assert_eq!(prepared.notebooks.len(), 3);
    assert_eq!(prepared.secrets.len(), 3);
    assert_eq!(prepared.secrets_requiring_input().count(), 1);
    let schedule = prepared.job_settings.schedule.as_ref().expect("schedule");
    assert_eq!(schedule.quartz_cron_expression, "0 30 2 * * ?");
    let full_refresh = prepared.job_settings.task("FullRefresh").expect("task");
    assert_eq!(full_refresh.depends_on[0].outcome.as_deref(), Some("true"));
    assert!(full_refresh.new_cluster.is_some());
    assert!(prepared.job_settings.task("ProcessRegion").is_none());
    assert_eq!(prepared.job_settings.tasks.len(), 7);
}

#[test]
fn test_output_store_dump_and_load() {
    let store = FactoryExportStore::new(fixtures()).unwrap();
    let prepared = prepare_workflow(translate_pipeline(&store.load("daily_load").unwrap()), None);

    let out = TempDir::new().unwrap();
    let mut output = WorkflowOutputStore::new(out.path());
    let identifier = output.dump(&prepared).unwrap();
    assert_eq!(identifier.as_deref(), Some("daily_load"));

    let job_dir = output.job_dir("daily_load");
    for file in [JOB_FILE, "pipelines.json", SECRETS_FILE, "unsupported.json"] {
        assert!(job_dir.join(file).is_file(), "missing {}", file);
    }
    assert!(job_dir
        .join("notebooks/Shared/flowport/copy_data/CopyOrders.py")
        .is_file());
    assert!(job_dir
        .join("notebooks/Shared/flowport/unsupported/NotifyTeam.py")
        .is_file());

    let job = output.load("daily_load").unwrap();
    assert_eq!(job["name"], "daily_load");
    assert_eq!(job["tasks"].as_array().map(Vec::len), Some(7));
    assert_eq!(job["schedule"]["pause_status"], "UNPAUSED");

    let secrets: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(job_dir.join(SECRETS_FILE)).unwrap()).unwrap();
    assert_eq!(secrets[0]["key"], "lake_storage_account_key");
    assert_eq!(secrets[0]["user_input_required"], true);
}

#[test]
fn test_output_store_cannot_be_read_as_factory() {
    let out = TempDir::new().unwrap();
    let mut factory = StoreBuilder::new(StoreKind::Factory)
        .path(out.path())
        .build()
        .unwrap();
    let prepared = prepare_workflow(
        translate_pipeline(&serde_json::json!({"name": "p", "properties": {"activities": []}})),
        None,
    );
    let error = factory.dump(&prepared).unwrap_err();
    assert_eq!(error.code(), "FP-STORE-002");
}

#[test]
fn test_store_builder_by_name() {
    let out = TempDir::new().unwrap();
    let store = StoreBuilder::named("output").unwrap().path(out.path()).build().unwrap();
    assert!(matches!(
        store.load("missing"),
        Err(StoreError::NotFound { kind: "job", .. })
    ));
    assert_eq!("factory".parse::<StoreKind>().unwrap(), StoreKind::Factory);
    assert_eq!(StoreKind::Output.to_string(), "output");
    assert_eq!(
        StoreBuilder::named("s3").unwrap_err().code(),
        "FP-STORE-003"
    );
    assert_eq!(job_identifier("daily load"), "daily_load");
}
