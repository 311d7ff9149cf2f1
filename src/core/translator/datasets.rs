#![allow(clippy::result_large_err)] // AppError carries context for the CLI report

use crate::core::error::AppError;
use crate::core::ir::{
    Dataset, DeltaTableDataset, FileDataset, FileFormat, LinkedService, SqlTableDataset,
    Translation, UnsupportedDataset, UnsupportedValue,
};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::expression;
use crate::core::translator::linked_services::translate_linked_service;
use crate::core::translator::values::{bool_field, expression_text, str_field, text_field};
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use serde_json::Value;

pub const DATASET_NAME_NOT_PROVIDED: &str = "DATASET_NAME_NOT_PROVIDED";
const DEFAULT_SQL_SCHEMA: &str = "dbo";
const DEFAULT_DELTA_DATABASE: &str = "default";

/// Translate a dataset definition with its linked service inlined.
///
/// Shape problems yield [`Dataset::Unsupported`]. The only hard error is an inlined linked
/// service that is present but not an object.
pub fn translate_dataset(payload: &Value, ctx: &mut TranslationContext) -> Result<Dataset, AppError> {
    let name = text_field(payload, "name").unwrap_or_else(|| DATASET_NAME_NOT_PROVIDED.to_string());
    let properties = payload.get("properties").unwrap_or(payload);
    let dataset_type = str_field(properties, "type").unwrap_or_default().to_string();
    let linked_service = linked_service_definition(payload, &name)?;

    let translated = match file_format(&dataset_type) {
        Some(format) => translate_file_dataset(&name, format, payload, linked_service),
        None => match dataset_type.as_str() {
            "AzureDatabricksDeltaLakeDataset" => {
                translate_delta_table_dataset(&name, payload, linked_service, ctx)
            }
            "AzureSqlTable" | "SqlServerTable" | "AzureSqlMITable" => {
                translate_sql_table_dataset(&name, payload, linked_service, ctx)
            }
            "" => Err(UnsupportedValue::new(
                payload.clone(),
                "Missing property 'type' in dataset definition",
            )),
            other => Err(UnsupportedValue::new(
                payload.clone(),
                format!("Unsupported dataset type '{}'", other),
            )),
        },
    };

    Ok(translated.unwrap_or_else(|unsupported| {
        Dataset::Unsupported(UnsupportedDataset {
            name,
            dataset_type,
            unsupported,
        })
    }))
}

/// Source dataset type name to file format.
pub fn file_format(dataset_type: &str) -> Option<FileFormat> {
    match dataset_type {
        "DelimitedText" => Some(FileFormat::Csv),
        "Json" => Some(FileFormat::Json),
        "Avro" => Some(FileFormat::Avro),
        "Orc" => Some(FileFormat::Orc),
        "Parquet" => Some(FileFormat::Parquet),
        _ => None,
    }
}

fn linked_service_definition<'a>(
    payload: &'a Value,
    dataset_name: &str,
) -> Result<Option<&'a Value>, AppError> {
    let definition = payload
        .get("linkedServiceDefinition")
        .or_else(|| {
            payload
                .get("properties")
                .and_then(|properties| properties.get("linkedServiceDefinition"))
        })
        .filter(|value| !value.is_null());
    match definition {
        None => Ok(None),
        Some(value) if value.is_object() => Ok(Some(value)),
        Some(_) => Err(AppError::new(
            ErrorCategory::TranslationError,
            format!(
                "Linked service definition of dataset '{}' must be an object",
                dataset_name
            ),
        )
        .with_code("FP-DATASET-001")),
    }
}

fn require_linked_service(payload: &Value, definition: Option<&Value>) -> Translation<LinkedService> {
    let definition = definition.ok_or_else(|| {
        UnsupportedValue::new(payload.clone(), "Missing linked service definition")
    })?;
    match translate_linked_service(definition) {
        LinkedService::Unsupported(service) => Err(UnsupportedValue::new(
            payload.clone(),
            format!(
                "Unsupported linked service '{}'; {}",
                service.service_name, service.unsupported.message
            ),
        )),
        service => Ok(service),
    }
}

fn dataset_type_properties(payload: &Value) -> &Value {
    let properties = payload.get("properties").unwrap_or(payload);
    properties.get("typeProperties").unwrap_or(properties)
}

fn translate_file_dataset(
    name: &str,
    format: FileFormat,
    payload: &Value,
    linked_service: Option<&Value>,
) -> Translation<Dataset> {
    let LinkedService::BlobStorage(storage) = require_linked_service(payload, linked_service)? else {
        return Err(UnsupportedValue::new(
            payload.clone(),
            format!("File dataset '{}' must use a storage linked service", name),
        ));
    };

    let type_properties = dataset_type_properties(payload);
    let location = type_properties.get("location").ok_or_else(|| {
        UnsupportedValue::new(payload.clone(), "Missing property 'location' in dataset properties")
    })?;
    let container = location_text(location, "fileSystem", payload)?
        .or(location_text(location, "container", payload)?)
        .ok_or_else(|| {
            UnsupportedValue::new(
                payload.clone(),
                "Missing property 'location.fileSystem' or 'location.container' in dataset properties",
            )
        })?;
    let folder_path = match (
        location_text(location, "folderPath", payload)?,
        location_text(location, "fileName", payload)?,
    ) {
        (Some(folder), Some(file)) => format!("{}/{}", folder.trim_end_matches('/'), file),
        (Some(folder), None) => folder,
        (None, Some(file)) => file,
        (None, None) => {
            return Err(UnsupportedValue::new(
                payload.clone(),
                "Missing property 'location.folderPath' or 'location.fileName' in dataset properties",
            ))
        }
    };

    Ok(Dataset::File(FileDataset {
        name: name.to_string(),
        format,
        service_name: storage.service_name,
        container,
        folder_path,
        storage_account_name: storage.storage_account_name,
        url: storage.url,
        account_key: storage.account_key,
        format_options: format_options(format, type_properties),
    }))
}

fn location_text(location: &Value, key: &str, payload: &Value) -> Translation<Option<String>> {
    let Some(raw) = location.get(key).and_then(expression_text) else {
        return Ok(None);
    };
    let text = expression::translate_value(raw).ok_or_else(|| {
        UnsupportedValue::new(
            payload.clone(),
            format!("Unsupported expression in 'location.{}': {}", key, raw),
        )
    })?;
    let text = text.trim().to_string();
    Ok((!text.is_empty()).then_some(text))
}

/// Reader/writer options of a file dataset, control characters JSON-escaped.
pub fn format_options(format: FileFormat, type_properties: &Value) -> IndexMap<String, Value> {
    let mut options = IndexMap::new();
    let mut put = |key: &str, value: Option<Value>| {
        if let Some(value) = value {
            options.insert(key.to_string(), value);
        }
    };
    let text = |key: &str| text_field(type_properties, key).map(Value::String);
    let character = |key: &str, default: &str| {
        let raw = str_field(type_properties, key).unwrap_or(default);
        Some(Value::String(escape_character(raw)))
    };

    match format {
        FileFormat::Csv => {
            put(
                "header",
                Some(Value::Bool(
                    bool_field(type_properties, "firstRowAsHeader").unwrap_or(false),
                )),
            );
            put("sep", character("columnDelimiter", ","));
            put("lineSep", character("rowDelimiter", "\n"));
            put("quote", character("quoteChar", "\""));
            put("escape", character("escapeChar", "\\"));
            put("nullValue", character("nullValue", ""));
            put("compression", text("compressionCodec"));
            put("encoding", text("encodingName"));
        }
        FileFormat::Json => {
            put("encoding", text("encodingName"));
            let compression = type_properties
                .get("compression")
                .and_then(|compression| str_field(compression, "type"))
                .map(|codec| Value::String(codec.to_string()))
                .or_else(|| text("compressionCodec"));
            put("compression", compression);
        }
        FileFormat::Avro => put("compression", text("avroCompressionCodec")),
        FileFormat::Orc => put("compression", text("orcCompressionCodec")),
        FileFormat::Parquet => put("compression", text("compressionCodec")),
    }
    options
}

/// JSON string escaping without the surrounding quotes.
fn escape_character(raw: &str) -> String {
    let quoted = serde_json::to_string(raw).unwrap_or_else(|_| format!("\"{}\"", raw));
    quoted[1..quoted.len() - 1].to_string()
}

fn translate_delta_table_dataset(
    name: &str,
    payload: &Value,
    linked_service: Option<&Value>,
    ctx: &mut TranslationContext,
) -> Translation<Dataset> {
    let service = require_linked_service(payload, linked_service)?;
    let type_properties = dataset_type_properties(payload);
    let table_name = text_field(type_properties, "table").ok_or_else(|| {
        UnsupportedValue::new(payload.clone(), "Missing property 'table' in Delta dataset")
    })?;
    let database_name = text_field(type_properties, "database").unwrap_or_else(|| {
        ctx.warn(
            format!("dataset.{}.database", name),
            format!(
                "Delta dataset '{}' has no database; using '{}'",
                name, DEFAULT_DELTA_DATABASE
            ),
        );
        DEFAULT_DELTA_DATABASE.to_string()
    });

    Ok(Dataset::DeltaTable(DeltaTableDataset {
        name: name.to_string(),
        service_name: service.service_name().to_string(),
        catalog_name: text_field(type_properties, "catalog"),
        database_name,
        table_name,
    }))
}

fn translate_sql_table_dataset(
    name: &str,
    payload: &Value,
    linked_service: Option<&Value>,
    ctx: &mut TranslationContext,
) -> Translation<Dataset> {
    let LinkedService::Sql(sql) = require_linked_service(payload, linked_service)? else {
        return Err(UnsupportedValue::new(
            payload.clone(),
            format!("SQL dataset '{}' must use a SQL linked service", name),
        ));
    };

    let type_properties = dataset_type_properties(payload);
    let table_name = text_field(type_properties, "table").ok_or_else(|| {
        UnsupportedValue::new(payload.clone(), "Missing property 'table' in SQL dataset")
    })?;
    let schema_name = text_field(type_properties, "schema").unwrap_or_else(|| {
        ctx.warn(
            format!("dataset.{}.schema", name),
            format!(
                "SQL dataset '{}' has no schema; using '{}'",
                name, DEFAULT_SQL_SCHEMA
            ),
        );
        DEFAULT_SQL_SCHEMA.to_string()
    });

    Ok(Dataset::SqlTable(SqlTableDataset {
        name: name.to_string(),
        service_name: sql.service_name,
        dbtable: format!("{}.{}", schema_name, table_name),
        schema_name,
        table_name,
        host: sql.host,
        database: sql.database,
        user_name: sql.user_name,
        authentication_type: sql.authentication_type,
        password: sql.password,
    }))
}
