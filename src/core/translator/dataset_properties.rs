use crate::core::ir::{ColumnMapping, ColumnType, DatasetProperties, Translation, UnsupportedValue};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::type_mapping::map_type;
use crate::core::translator::values::{
    array_field, as_u64, bool_field, parse_timespan, str_field, text_field,
};
use indexmap::IndexMap;
use serde_json::Value;

const DEFAULT_ISOLATION_LEVEL: &str = "READ_COMMITTED";

/// Copy source/sink type to the normalized dataset type tag.
pub fn properties_type(block_type: &str) -> Option<&'static str> {
    match block_type {
        "AvroSource" | "AvroSink" => Some("avro"),
        "AzureDatabricksDeltaLakeSource" | "AzureDatabricksDeltaLakeSink" => Some("delta"),
        "AzureSqlSource" | "AzureSqlSink" | "SqlServerSource" | "SqlServerSink"
        | "SqlMISource" | "SqlMISink" => Some("sqlserver"),
        "DelimitedTextSource" | "DelimitedTextSink" => Some("csv"),
        "JsonSource" | "JsonSink" => Some("json"),
        "OrcSource" | "OrcSink" => Some("orc"),
        "ParquetSource" | "ParquetSink" => Some("parquet"),
        _ => None,
    }
}

/// Translate the `source` or `sink` block of a copy activity.
///
/// `property` names the block in diagnostics (`source` or `sink`).
pub fn translate_dataset_properties(
    block: Option<&Value>,
    property: &str,
    ctx: &mut TranslationContext,
) -> Translation<DatasetProperties> {
    let block = block.ok_or_else(|| {
        UnsupportedValue::new(Value::Null, format!("Missing property '{}'", property))
    })?;
    let block_type = str_field(block, "type").unwrap_or_default();
    let dataset_type = properties_type(block_type).ok_or_else(|| {
        UnsupportedValue::new(
            block.clone(),
            format!("Unsupported {} type '{}'", property, block_type),
        )
    })?;

    let mut options = IndexMap::new();
    match dataset_type {
        "csv" | "json" | "avro" | "orc" | "parquet" => {
            let settings = block.get("formatSettings").unwrap_or(&Value::Null);
            if dataset_type == "csv" {
                if let Some(quote_all) = bool_field(settings, "quoteAllText") {
                    options.insert("quoteAll".to_string(), Value::Bool(quote_all));
                }
                if let Some(extension) = text_field(settings, "fileExtension") {
                    ctx.warn(
                        format!("{}.formatSettings.fileExtension", property),
                        format!(
                            "File extension '{}' is not applied; Spark names the written files",
                            extension
                        ),
                    );
                    options.insert("extension".to_string(), Value::String(extension));
                }
            }
            if let Some(rows) = settings.get("maxRowsPerFile").and_then(as_u64) {
                options.insert("records_per_file".to_string(), Value::from(rows));
            }
            if let Some(prefix) = text_field(settings, "fileNamePrefix") {
                ctx.warn(
                    format!("{}.formatSettings.fileNamePrefix", property),
                    format!(
                        "File name prefix '{}' is not applied; Spark names the written files",
                        prefix
                    ),
                );
                options.insert("file_name_prefix".to_string(), Value::String(prefix));
            }
        }
        "sqlserver" => sql_options(block, property, &mut options, ctx),
        _ => {}
    }

    Ok(DatasetProperties {
        dataset_type: dataset_type.to_string(),
        options,
    })
}

fn sql_options(
    block: &Value,
    property: &str,
    options: &mut IndexMap<String, Value>,
    ctx: &mut TranslationContext,
) {
    if property == "source" {
        let isolation = match str_field(block, "isolationLevel") {
            None => DEFAULT_ISOLATION_LEVEL.to_string(),
            Some(level) => isolation_level(level).unwrap_or_else(|| {
                ctx.warn(
                    "source.isolationLevel",
                    format!(
                        "Unsupported isolation level '{}'; using {}",
                        level, DEFAULT_ISOLATION_LEVEL
                    ),
                );
                DEFAULT_ISOLATION_LEVEL.to_string()
            }),
        };
        options.insert("isolation_level".to_string(), Value::String(isolation));

        if let Some(timeout) = str_field(block, "queryTimeout") {
            match parse_timespan(timeout) {
                Some(seconds) => {
                    options.insert("query_timeout_seconds".to_string(), Value::from(seconds));
                }
                None => ctx.warn(
                    "source.queryTimeout",
                    format!("Invalid query timeout '{}'", timeout),
                ),
            }
        }
        if let Some(query) = text_field(block, "sqlReaderQuery") {
            options.insert("query".to_string(), Value::String(query));
        }
        if let Some(partition) = str_field(block, "partitionOption") {
            if partition != "None" {
                ctx.warn(
                    "source.partitionOption",
                    format!("Partition option '{}' is not translated", partition),
                );
            }
        }
        return;
    }

    if let Some(batch) = block.get("writeBatchSize").and_then(as_u64) {
        options.insert("batchsize".to_string(), Value::from(batch));
    }
    if let Some(script) = text_field(block, "preCopyScript") {
        options.insert("sessionInitStatement".to_string(), Value::String(script));
    }
    match str_field(block, "writeBehavior") {
        None | Some("insert") => {
            options.insert("mode".to_string(), Value::String("append".to_string()));
        }
        Some(other) => ctx.warn(
            "sink.writeBehavior",
            format!("Write behavior '{}' is not supported", other),
        ),
    }
}

fn isolation_level(level: &str) -> Option<String> {
    let mapped = match level {
        "ReadCommitted" => "READ_COMMITTED",
        "ReadUncommitted" => "READ_UNCOMMITTED",
        "RepeatableRead" => "REPEATABLE_READ",
        "Serializable" => "SERIALIZABLE",
        "Snapshot" => "SNAPSHOT",
        _ => return None,
    };
    Some(mapped.to_string())
}

/// Column mappings of a tabular translator; sink types are mapped into `sink_type`'s type system.
///
/// A type that cannot be mapped stays on its column as [`ColumnType::Unsupported`] and is
/// reported as a diagnostic.
pub fn translate_column_mappings(
    translator: Option<&Value>,
    sink_type: &str,
    ctx: &mut TranslationContext,
) -> Vec<ColumnMapping> {
    let Some(translator) = translator else {
        return Vec::new();
    };
    let mut mappings = Vec::new();
    for (index, mapping) in array_field(translator, "mappings").iter().enumerate() {
        let source = mapping.get("source").unwrap_or(&Value::Null);
        let sink = mapping.get("sink").unwrap_or(&Value::Null);

        let source_name = text_field(source, "name").or_else(|| {
            source
                .get("ordinal")
                .and_then(as_u64)
                .filter(|ordinal| *ordinal >= 1)
                .map(|ordinal| format!("_c{}", ordinal - 1))
        });
        let Some(source_column_name) = source_name else {
            ctx.warn(
                format!("translator.mappings[{}].source", index),
                "Column mapping has neither a source name nor an ordinal",
            );
            continue;
        };
        let sink_column_name =
            text_field(sink, "name").unwrap_or_else(|| source_column_name.clone());

        let sink_column_type = str_field(sink, "type").map(|column_type| {
            match map_type(column_type, sink_type) {
                Ok(mapped) => ColumnType::Mapped(mapped),
                Err(err) => {
                    ctx.warn(format!("translator.mappings[{}].sink.type", index), &err.message);
                    ColumnType::Unsupported(UnsupportedValue::new(mapping.clone(), err.message))
                }
            }
        });

        mappings.push(ColumnMapping {
            source_column_name,
            sink_column_name,
            sink_column_type,
        });
    }
    mappings
}
