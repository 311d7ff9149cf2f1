#![allow(clippy::result_large_err)] // AppError carries context for the CLI report

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

/// Interim column types emitted by the copy translator, plus SQL Server native names.
const SQL_SERVER_TYPES: &[(&str, &str)] = &[
    ("boolean", "boolean"),
    ("byte", "tinyint"),
    ("byte[]", "binary"),
    ("char[]", "string"),
    ("datetime", "timestamp"),
    ("datetimeoffset", "timestamp"),
    ("decimal", "decimal(38, 18)"),
    ("double", "double"),
    ("guid", "string"),
    ("int16", "smallint"),
    ("int32", "int"),
    ("int64", "bigint"),
    ("single", "float"),
    ("string", "string"),
    ("timespan", "string"),
    ("bit", "boolean"),
    ("tinyint", "tinyint"),
    ("smallint", "smallint"),
    ("int", "int"),
    ("bigint", "bigint"),
    ("real", "float"),
    ("float", "double"),
    ("numeric", "decimal(38, 18)"),
    ("money", "decimal(19, 4)"),
    ("smallmoney", "decimal(10, 4)"),
    ("char", "string"),
    ("nchar", "string"),
    ("varchar", "string"),
    ("nvarchar", "string"),
    ("text", "string"),
    ("ntext", "string"),
    ("date", "date"),
    ("datetime2", "timestamp"),
    ("smalldatetime", "timestamp"),
    ("time", "string"),
    ("uniqueidentifier", "string"),
    ("binary", "binary"),
    ("varbinary", "binary"),
    ("image", "binary"),
    ("xml", "string"),
];

/// Spark SQL type names and their common aliases.
const DELTA_TYPES: &[(&str, &str)] = &[
    ("boolean", "boolean"),
    ("tinyint", "tinyint"),
    ("byte", "tinyint"),
    ("smallint", "smallint"),
    ("short", "smallint"),
    ("int", "int"),
    ("integer", "int"),
    ("bigint", "bigint"),
    ("long", "bigint"),
    ("float", "float"),
    ("real", "float"),
    ("double", "double"),
    ("decimal", "decimal(10, 0)"),
    ("string", "string"),
    ("varchar", "string"),
    ("char", "string"),
    ("binary", "binary"),
    ("date", "date"),
    ("timestamp", "timestamp"),
    ("timestamp_ntz", "timestamp_ntz"),
];

/// Interim column types used by file-based datasets.
const FILE_TYPES: &[(&str, &str)] = &[
    ("boolean", "boolean"),
    ("byte", "tinyint"),
    ("byte[]", "binary"),
    ("datetime", "timestamp"),
    ("datetimeoffset", "timestamp"),
    ("decimal", "decimal(38, 18)"),
    ("double", "double"),
    ("guid", "string"),
    ("int16", "smallint"),
    ("int32", "int"),
    ("int64", "bigint"),
    ("single", "float"),
    ("string", "string"),
    ("timespan", "string"),
];

fn table_for(source_system: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match source_system {
        "sqlserver" => Some(SQL_SERVER_TYPES),
        "delta" => Some(DELTA_TYPES),
        "csv" | "json" | "avro" | "orc" | "parquet" => Some(FILE_TYPES),
        _ => None,
    }
}

/// Map a source column type onto the target engine's type name.
///
/// Lookups are case-insensitive. Parameterized types such as `decimal(10, 2)` or `varchar(20)`
/// keep their parameters when the base name maps onto a parameterized target.
pub fn map_type(source_type: &str, source_system: &str) -> Result<String, AppError> {
    let table = table_for(source_system).ok_or_else(|| {
        AppError::new(
            ErrorCategory::TranslationError,
            format!("No type mapping registered for system '{}'", source_system),
        )
        .with_code("FP-TYPE-002")
    })?;

    let normalized = source_type.trim().to_ascii_lowercase();
    let (base, params) = match normalized.split_once('(') {
        Some((base, rest)) => (base.trim(), Some(rest.trim_end_matches(')').trim())),
        None => (normalized.as_str(), None),
    };

    let target = table
        .iter()
        .find(|(source, _)| *source == base)
        .map(|(_, target)| *target)
        .ok_or_else(|| {
            AppError::new(
                ErrorCategory::TranslationError,
                format!(
                    "No target type for '{}' in system '{}'",
                    source_type, source_system
                ),
            )
            .with_code("FP-TYPE-001")
        })?;

    match params {
        Some(params) if target.starts_with("decimal") && !params.is_empty() => {
            Ok(format!("decimal({})", params.replace(' ', "").replace(',', ", ")))
        }
        _ => Ok(target.to_string()),
    }
}
