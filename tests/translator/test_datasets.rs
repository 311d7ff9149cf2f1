use flowport::core::ir::{Dataset, FileFormat};
use flowport::core::translator::{translate_dataset, TranslationContext};
use serde_json::{json, Value};

fn lake() -> Value {
    json!({
        "name": "lake",
        "properties": {
            "type": "AzureBlobFS",
            "typeProperties": {
                "url": "https://salesdata.dfs.core.windows.net",
                "accountKey": {"type": "SecureString", "value": "a2V5"}
            }
        }
    })
}

fn sales_sql() -> Value {
    json!({
        "name": "sales_sql",
        "properties": {
            "type": "AzureSqlDatabase",
            "typeProperties": {
                "server": "sales.database.windows.net",
                "database": "sales",
                "userName": "etl_user",
                "password": "s3cret"
            }
        }
    })
}

fn dbx() -> Value {
    json!({
        "name": "dbx",
        "properties": {"type": "AzureDatabricksDeltaLake", "typeProperties": {"domain": "https://adb"}}
    })
}

fn dataset(name: &str, dataset_type: &str, service: Value, type_properties: Value) -> Value {
    json!({
        "name": name,
        "properties": {
            "type": dataset_type,
            "linkedServiceDefinition": service,
            "typeProperties": type_properties
        }
    })
}

#[test]
fn test_csv_dataset_on_data_lake() {
    let mut ctx = TranslationContext::new();
    let translated = translate_dataset(
        &dataset(
            "raw_orders",
            "DelimitedText",
            lake(),
            json!({
                "location": {"type": "AzureBlobFSLocation", "fileSystem": "raw", "folderPath": "orders/", "fileName": "2024.csv"},
                "columnDelimiter": ";",
                "firstRowAsHeader": true,
                "compressionCodec": "gzip"
            }),
        ),
        &mut ctx,
    )
    .unwrap();

    let Dataset::File(file) = translated else {
        panic!("expected file dataset");
    };
    assert_eq!(file.format, FileFormat::Csv);
    assert_eq!(file.container, "raw");
    assert_eq!(file.folder_path, "orders/2024.csv");
    assert_eq!(file.storage_account_name, "salesdata");
    assert_eq!(file.account_key.as_deref(), Some("a2V5"));
    assert_eq!(file.format_options["sep"], json!(";"));
    assert_eq!(file.format_options["header"], json!(true));
    assert_eq!(file.format_options["compression"], json!("gzip"));
    assert_eq!(
        file.abfss_location(),
        "abfss://raw@salesdata.dfs.core.windows.net/orders/2024.csv"
    );
    assert!(ctx.diagnostics().is_empty());
}

#[test]
fn test_file_formats_are_recognized() {
    let cases = [
        ("Json", FileFormat::Json),
        ("Avro", FileFormat::Avro),
        ("Orc", FileFormat::Orc),
        ("Parquet", FileFormat::Parquet),
    ];
    for (dataset_type, format) in cases {
        let mut ctx = TranslationContext::new();
        let translated = translate_dataset(
            &dataset(
                "files",
                dataset_type,
                lake(),
                json!({"location": {"container": "landing", "folderPath": "in"}}),
            ),
            &mut ctx,
        )
        .unwrap();
        assert_eq!(translated.type_tag(), format.as_str());
        assert!(translated.is_file());
    }
}

#[test]
fn test_file_dataset_location_expression() {
    let mut ctx = TranslationContext::new();
    let translated = translate_dataset(
        &dataset(
            "daily",
            "Parquet",
            lake(),
            json!({"location": {
                "fileSystem": "raw",
                "folderPath": {"value": "@pipeline().parameters.day", "type": "Expression"}
            }}),
        ),
        &mut ctx,
    )
    .unwrap();
    let Dataset::File(file) = translated else {
        panic!("expected file dataset");
    };
    assert_eq!(file.folder_path, "{{job.parameters.day}}");
}

#[test]
fn test_file_dataset_problems_are_soft() {
    let mut ctx = TranslationContext::new();
    let no_location = translate_dataset(&dataset("x", "Parquet", lake(), json!({})), &mut ctx).unwrap();
    let Dataset::Unsupported(unsupported) = no_location else {
        panic!("expected unsupported dataset");
    };
    assert_eq!(unsupported.dataset_type, "Parquet");
    assert_eq!(
        unsupported.unsupported.message,
        "Missing property 'location' in dataset properties"
    );

    let wrong_service = translate_dataset(
        &dataset(
            "x",
            "Parquet",
            sales_sql(),
            json!({"location": {"fileSystem": "raw", "folderPath": "a"}}),
        ),
        &mut ctx,
    )
    .unwrap();
    assert!(matches!(wrong_service, Dataset::Unsupported(_)));
}

#[test]
fn test_sql_table_dataset() {
    let mut ctx = TranslationContext::new();
    let translated = translate_dataset(
        &dataset(
            "orders_table",
            "AzureSqlTable",
            sales_sql(),
            json!({"schema": "sales", "table": "orders"}),
        ),
        &mut ctx,
    )
    .unwrap();

    let Dataset::SqlTable(table) = translated else {
        panic!("expected SQL table dataset");
    };
    assert_eq!(table.dbtable, "sales.orders");
    assert_eq!(table.host, "sales.database.windows.net");
    assert_eq!(table.database.as_deref(), Some("sales"));
    assert_eq!(table.user_name.as_deref(), Some("etl_user"));
    assert_eq!(table.password.as_deref(), Some("s3cret"));
    assert!(ctx.diagnostics().is_empty());
}

#[test]
fn test_sql_table_default_schema_is_reported() {
    let mut ctx = TranslationContext::new();
    let translated = translate_dataset(
        &dataset("orders_table", "SqlServerTable", sales_sql(), json!({"table": "orders"})),
        &mut ctx,
    )
    .unwrap();
    let Dataset::SqlTable(table) = translated else {
        panic!("expected SQL table dataset");
    };
    assert_eq!(table.dbtable, "dbo.orders");
    assert_eq!(ctx.diagnostics().len(), 1);
    assert_eq!(ctx.diagnostics()[0].property, "dataset.orders_table.schema");
}

#[test]
fn test_delta_table_dataset() {
    let mut ctx = TranslationContext::new();
    let translated = translate_dataset(
        &dataset(
            "orders_delta",
            "AzureDatabricksDeltaLakeDataset",
            dbx(),
            json!({"catalog": "main", "database": "sales", "table": "orders"}),
        ),
        &mut ctx,
    )
    .unwrap();
    let Dataset::DeltaTable(delta) = translated else {
        panic!("expected Delta dataset");
    };
    assert_eq!(delta.qualified_name(), "main.sales.orders");
    assert_eq!(delta.service_name, "dbx");

    let without_database = translate_dataset(
        &dataset("t", "AzureDatabricksDeltaLakeDataset", dbx(), json!({"table": "t"})),
        &mut ctx,
    )
    .unwrap();
    let Dataset::DeltaTable(delta) = without_database else {
        panic!("expected Delta dataset");
    };
    assert_eq!(delta.qualified_name(), "default.t");
}

#[test]
fn test_unsupported_dataset_types() {
    let mut ctx = TranslationContext::new();
    let translated = translate_dataset(
        &dataset("cosmos", "CosmosDbSqlApiCollection", lake(), json!({})),
        &mut ctx,
    )
    .unwrap();
    assert_eq!(translated.type_tag(), "CosmosDbSqlApiCollection");
    assert_eq!(translated.name(), "cosmos");

    let untyped = translate_dataset(&json!({"name": "x", "properties": {}}), &mut ctx).unwrap();
    let Dataset::Unsupported(unsupported) = untyped else {
        panic!("expected unsupported dataset");
    };
    assert_eq!(
        unsupported.unsupported.message,
        "Missing property 'type' in dataset definition"
    );
}

#[test]
fn test_dataset_without_linked_service_is_unsupported() {
    let mut ctx = TranslationContext::new();
    let translated = translate_dataset(
        &json!({"name": "x", "properties": {"type": "Parquet", "typeProperties": {}}}),
        &mut ctx,
    )
    .unwrap();
    let Dataset::Unsupported(unsupported) = translated else {
        panic!("expected unsupported dataset");
    };
    assert_eq!(unsupported.unsupported.message, "Missing linked service definition");
}

#[test]
fn test_malformed_inlined_linked_service_is_a_hard_error() {
    let mut ctx = TranslationContext::new();
    let error = translate_dataset(
        &json!({
            "name": "x",
            "properties": {"type": "Parquet", "linkedServiceDefinition": "lake"}
        }),
        &mut ctx,
    )
    .unwrap_err();
    assert_eq!(error.code, "FP-DATASET-001");
}
