//! Python notebook sources generated for copy activities and untranslatable activities.

use crate::core::ir::{
    ActivityBase, ColumnMapping, CopyActivity, Dataset, DatasetProperties, FileDataset,
    SqlTableDataset, UnsupportedValue,
};
use serde_json::Value;

const HEADER: &str = "# Databricks notebook source";

/// Options the dataset translator already stores as escaped string content.
const PRE_ESCAPED_OPTIONS: &[&str] = &["sep", "lineSep", "quote", "escape", "nullValue"];

/// Source-side SQL options and the reader option names they become.
const SQL_READ_OPTIONS: &[(&str, &str)] = &[
    ("isolation_level", "isolationLevel"),
    ("query_timeout_seconds", "queryTimeout"),
];
const SQL_WRITE_OPTIONS: &[&str] = &["batchsize", "sessionInitStatement", "numPartitions"];

/// Python string literal for text taken verbatim.
fn py_str(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Python string literal for an option value.
fn option_literal(name: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if PRE_ESCAPED_OPTIONS.contains(&name) => Some(format!("\"{}\"", text)),
        Value::String(text) => Some(py_str(text)),
        Value::Bool(flag) => Some(format!("\"{}\"", flag)),
        other => Some(format!("\"{}\"", other)),
    }
}

/// Notebook that moves data from the copy source to the copy sink with PySpark.
pub fn copy_notebook(base: &ActivityBase, copy: &CopyActivity, secret_scope: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", HEADER));
    out.push_str(&format!(
        "# Copy activity '{}': {} -> {}\n",
        base.name,
        copy.source_dataset.name(),
        copy.sink_dataset.name()
    ));
    out.push_str("import pyspark.sql.functions as F\n\n");

    out.push_str("# Source options\n");
    options_block(&mut out, "source", &copy.source_dataset, &copy.source_properties, secret_scope);
    out.push_str("\n# Sink options\n");
    options_block(&mut out, "sink", &copy.sink_dataset, &copy.sink_properties, secret_scope);

    out.push_str("\n# Read from the source\n");
    out.push_str(&format!("source_df = {}\n", read_expression(&copy.source_dataset)));
    out.push_str("\n# Map source columns to sink columns\n");
    out.push_str(&format!(
        "sink_df = {}\n",
        select_expression("source_df", &copy.column_mapping)
    ));
    out.push_str("\n# Write to the sink\n");
    out.push_str(&write_statement(&copy.sink_dataset, &copy.sink_properties));
    out
}

/// Declarative pipeline notebook materializing the copy sink as a table.
pub fn dlt_notebook(base: &ActivityBase, copy: &CopyActivity, secret_scope: &str) -> String {
    let table_name = match &copy.sink_dataset {
        Dataset::DeltaTable(table) => table.table_name.clone(),
        other => python_identifier(other.name()),
    };
    let function_name = python_identifier(&table_name);

    let mut out = String::new();
    out.push_str(&format!("{}\n", HEADER));
    out.push_str("import dlt\nimport pyspark.sql.functions as F\n\n");
    out.push_str("# Source options\n");
    options_block(&mut out, "source", &copy.source_dataset, &copy.source_properties, secret_scope);
    out.push('\n');
    out.push_str("@dlt.table(\n");
    out.push_str(&format!("    name={},\n", py_str(&table_name)));
    let comment = format!(
        "Copied from {} by activity {}; previously written to {}",
        copy.source_dataset.name(),
        base.name,
        copy.sink_dataset.name()
    );
    out.push_str(&format!("    comment={},\n", py_str(&comment)));
    out.push_str("    table_properties={\"delta.createdBy.flowport\": \"true\"},\n)\n");
    out.push_str(&format!("def {}():\n", function_name));
    out.push_str(&format!("    source_df = {}\n", read_expression(&copy.source_dataset)));
    out.push_str(&format!(
        "    return {}\n",
        select_expression("source_df", &copy.column_mapping).replace('\n', "\n    ")
    ));
    out
}

/// Notebook standing in for an activity that could not be translated; it fails when run.
pub fn placeholder_notebook(base: &ActivityBase, unsupported: &UnsupportedValue) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", HEADER));
    out.push_str(&format!(
        "# Activity '{}' of type '{}' could not be translated.\n",
        base.name, base.activity_type
    ));
    if !unsupported.value.is_null() {
        out.push_str("# Original definition:\n");
        let pretty = serde_json::to_string_pretty(&unsupported.value).unwrap_or_default();
        for line in pretty.lines() {
            out.push_str(&format!("#   {}\n", line));
        }
    }
    out.push_str(&format!("raise NotImplementedError({})\n", py_str(&unsupported.message)));
    out
}

fn options_block(
    out: &mut String,
    prefix: &str,
    dataset: &Dataset,
    properties: &DatasetProperties,
    secret_scope: &str,
) {
    out.push_str(&format!("{}_options = {{}}\n", prefix));
    match dataset {
        Dataset::File(file) => file_options(out, prefix, file, properties, secret_scope),
        Dataset::SqlTable(table) => sql_options(out, prefix, table, properties, secret_scope),
        Dataset::DeltaTable(_) | Dataset::Unsupported(_) => {}
    }
}

fn file_options(
    out: &mut String,
    prefix: &str,
    file: &FileDataset,
    properties: &DatasetProperties,
    secret_scope: &str,
) {
    for name in file.format.option_names() {
        let value = properties
            .options
            .get(*name)
            .or_else(|| file.format_options.get(*name));
        if let Some(literal) = value.and_then(|value| option_literal(name, value)) {
            out.push_str(&format!("{}_options[\"{}\"] = {}\n", prefix, name, literal));
        }
    }
    if let Some(records) = properties.options.get("records_per_file") {
        out.push_str(&format!(
            "spark.conf.set(\"spark.sql.files.maxRecordsPerFile\", \"{}\")\n",
            records
        ));
    }
    out.push_str(&format!(
        "spark.conf.set(\n    \"fs.azure.account.key.{}.dfs.core.windows.net\",\n    dbutils.secrets.get(scope={}, key={}),\n)\n",
        file.storage_account_name,
        py_str(secret_scope),
        py_str(&format!("{}_storage_account_key", file.service_name))
    ));
}

fn sql_options(
    out: &mut String,
    prefix: &str,
    table: &SqlTableDataset,
    properties: &DatasetProperties,
    secret_scope: &str,
) {
    let mut url = format!("jdbc:sqlserver://{}", table.host);
    if let Some(database) = &table.database {
        url.push_str(&format!(";database={}", database));
    }
    out.push_str(&format!("{}_options[\"url\"] = {}\n", prefix, py_str(&url)));
    for secret in ["user_name", "password"] {
        let option = if secret == "user_name" { "user" } else { secret };
        out.push_str(&format!(
            "{}_options[\"{}\"] = dbutils.secrets.get(scope={}, key={})\n",
            prefix,
            option,
            py_str(secret_scope),
            py_str(&format!("{}_{}", table.service_name, secret))
        ));
    }
    match properties.options.get("query").and_then(Value::as_str) {
        Some(query) => {
            out.push_str(&format!("{}_options[\"query\"] = {}\n", prefix, py_str(query)));
        }
        None => {
            out.push_str(&format!("{}_options[\"dbtable\"] = {}\n", prefix, py_str(&table.dbtable)));
        }
    }
    for (source_name, option) in SQL_READ_OPTIONS {
        if let Some(literal) = properties
            .options
            .get(*source_name)
            .and_then(|value| option_literal(option, value))
        {
            out.push_str(&format!("{}_options[\"{}\"] = {}\n", prefix, option, literal));
        }
    }
    for option in SQL_WRITE_OPTIONS {
        if let Some(literal) = properties
            .options
            .get(*option)
            .and_then(|value| option_literal(option, value))
        {
            out.push_str(&format!("{}_options[\"{}\"] = {}\n", prefix, option, literal));
        }
    }
}

fn read_expression(dataset: &Dataset) -> String {
    match dataset {
        Dataset::File(file) => format!(
            "spark.read.format(\"{}\").options(**source_options).load({})",
            file.format,
            py_str(&file.abfss_location())
        ),
        Dataset::DeltaTable(table) => format!("spark.read.table({})", py_str(&table.qualified_name())),
        Dataset::SqlTable(_) => {
            "spark.read.format(\"sqlserver\").options(**source_options).load()".to_string()
        }
        Dataset::Unsupported(dataset) => format!(
            "None  # unsupported source dataset {}",
            dataset.name
        ),
    }
}

fn select_expression(frame: &str, mappings: &[ColumnMapping]) -> String {
    if mappings.is_empty() {
        return frame.to_string();
    }
    let columns: Vec<String> = mappings
        .iter()
        .map(|mapping| {
            let expression = match mapping.target_type() {
                Some(target) => format!(
                    "cast(`{}` as {}) as `{}`",
                    mapping.source_column_name, target, mapping.sink_column_name
                ),
                None => format!(
                    "`{}` as `{}`",
                    mapping.source_column_name, mapping.sink_column_name
                ),
            };
            format!("    {},", py_str(&expression))
        })
        .collect();
    format!("{}.selectExpr(\n{}\n)", frame, columns.join("\n"))
}

fn write_statement(dataset: &Dataset, properties: &DatasetProperties) -> String {
    match dataset {
        Dataset::File(file) => format!(
            "sink_df.write.format(\"{}\").options(**sink_options).mode(\"overwrite\").save({})\n",
            file.format,
            py_str(&file.abfss_location())
        ),
        Dataset::DeltaTable(table) => format!(
            "sink_df.write.format(\"delta\").mode(\"overwrite\").saveAsTable({})\n",
            py_str(&table.qualified_name())
        ),
        Dataset::SqlTable(_) => {
            let mode = properties
                .options
                .get("mode")
                .and_then(Value::as_str)
                .unwrap_or("overwrite");
            format!(
                "sink_df.write.format(\"jdbc\").options(**sink_options).mode({}).save()\n",
                py_str(mode)
            )
        }
        Dataset::Unsupported(dataset) => {
            format!("raise NotImplementedError({})\n", py_str(&format!("Unsupported sink dataset {}", dataset.name)))
        }
    }
}

/// Valid Python identifier derived from a dataset or table name.
pub fn python_identifier(name: &str) -> String {
    let mut identifier: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if identifier.is_empty() || identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    identifier
}
