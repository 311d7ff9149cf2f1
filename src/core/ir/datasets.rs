use super::unsupported::UnsupportedValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// File formats readable by the generated notebooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
    Avro,
    Orc,
    Parquet,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
            FileFormat::Avro => "avro",
            FileFormat::Orc => "orc",
            FileFormat::Parquet => "parquet",
        }
    }

    /// Format option names the generated readers and writers pass through, in emission order.
    pub fn option_names(&self) -> &'static [&'static str] {
        match self {
            FileFormat::Csv => &[
                "header",
                "sep",
                "lineSep",
                "quote",
                "quoteAll",
                "escape",
                "nullValue",
                "compression",
                "encoding",
            ],
            FileFormat::Json => &["encoding", "compression"],
            FileFormat::Avro | FileFormat::Orc | FileFormat::Parquet => &["compression"],
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DELTA_TYPE: &str = "delta";
pub const SQL_SERVER_TYPE: &str = "sqlserver";

/// Files in a storage container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDataset {
    pub name: String,
    pub format: FileFormat,
    pub service_name: String,
    pub container: String,
    pub folder_path: String,
    pub storage_account_name: String,
    pub url: String,
    pub account_key: Option<String>,
    pub format_options: IndexMap<String, Value>,
}

impl FileDataset {
    /// `abfss://` location of the dataset.
    pub fn abfss_location(&self) -> String {
        format!(
            "abfss://{}@{}.dfs.core.windows.net/{}",
            self.container,
            self.storage_account_name,
            self.folder_path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaTableDataset {
    pub name: String,
    pub service_name: String,
    pub catalog_name: Option<String>,
    pub database_name: String,
    pub table_name: String,
}

impl DeltaTableDataset {
    pub fn qualified_name(&self) -> String {
        match &self.catalog_name {
            Some(catalog) => format!("{}.{}.{}", catalog, self.database_name, self.table_name),
            None => format!("{}.{}", self.database_name, self.table_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlTableDataset {
    pub name: String,
    pub service_name: String,
    pub schema_name: String,
    pub table_name: String,
    /// `schema.table`
    pub dbtable: String,
    pub host: String,
    pub database: Option<String>,
    pub user_name: Option<String>,
    pub authentication_type: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupportedDataset {
    pub name: String,
    pub dataset_type: String,
    pub unsupported: UnsupportedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dataset {
    File(FileDataset),
    DeltaTable(DeltaTableDataset),
    SqlTable(SqlTableDataset),
    Unsupported(UnsupportedDataset),
}

impl Dataset {
    pub fn name(&self) -> &str {
        match self {
            Dataset::File(dataset) => &dataset.name,
            Dataset::DeltaTable(dataset) => &dataset.name,
            Dataset::SqlTable(dataset) => &dataset.name,
            Dataset::Unsupported(dataset) => &dataset.name,
        }
    }

    /// Normalized type tag: a file format name, `delta` or `sqlserver`.
    pub fn type_tag(&self) -> &str {
        match self {
            Dataset::File(dataset) => dataset.format.as_str(),
            Dataset::DeltaTable(_) => DELTA_TYPE,
            Dataset::SqlTable(_) => SQL_SERVER_TYPE,
            Dataset::Unsupported(dataset) => &dataset.dataset_type,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Dataset::File(_))
    }
}

/// Source or sink settings of a copy, keyed by option name in source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetProperties {
    pub dataset_type: String,
    pub options: IndexMap<String, Value>,
}

/// Target type of a mapped column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Mapped(String),
    Unsupported(UnsupportedValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source_column_name: String,
    pub sink_column_name: String,
    pub sink_column_type: Option<ColumnType>,
}

impl ColumnMapping {
    /// Target type when the mapping succeeded.
    pub fn target_type(&self) -> Option<&str> {
        match &self.sink_column_type {
            Some(ColumnType::Mapped(name)) => Some(name),
            _ => None,
        }
    }
}
