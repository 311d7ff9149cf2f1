use crate::core::translator::{TranslationOptions, DEFAULT_TIMEZONE_ID};
use crate::core::workflow::preparer::{
    PrepareOptions, DEFAULT_NOTEBOOK_ROOT, DEFAULT_NUM_WORKERS, DEFAULT_SECRET_SCOPE,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "flowport.toml";

/// Main configuration loaded from flowport.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FlowportConfig {
    /// Translation and preparation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Where source definitions are read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Where prepared workflows are written to
    #[serde(default)]
    pub output: OutputConfig,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslationConfig {
    /// Forces (or disables) declarative pipelines for file-to-file and file-to-Delta copies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_to_delta_sinks: Option<bool>,

    /// Secret scope receiving credentials
    #[serde(default = "default_secret_scope")]
    pub secret_scope: String,

    /// Workspace folder for generated notebooks
    #[serde(default = "default_notebook_root")]
    pub notebook_root: String,

    /// Time zone attached to job schedules
    #[serde(default = "default_timezone_id")]
    pub timezone_id: String,

    /// Worker count for clusters without a sizing policy
    #[serde(default = "default_num_workers")]
    pub default_num_workers: u32,
}

/// Source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Root of the factory git-layout export
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_secret_scope() -> String {
    DEFAULT_SECRET_SCOPE.to_string()
}

fn default_notebook_root() -> String {
    DEFAULT_NOTEBOOK_ROOT.to_string()
}

fn default_timezone_id() -> String {
    DEFAULT_TIMEZONE_ID.to_string()
}

fn default_num_workers() -> u32 {
    DEFAULT_NUM_WORKERS
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("flowport-out")
}

impl Default for TranslationConfig {
    fn default() -> Self {
        TranslationConfig {
            files_to_delta_sinks: None,
            secret_scope: default_secret_scope(),
            notebook_root: default_notebook_root(),
            timezone_id: default_timezone_id(),
            default_num_workers: default_num_workers(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            export_dir: default_export_dir(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: default_output_dir(),
        }
    }
}

impl TranslationConfig {
    pub fn translation_options(&self) -> TranslationOptions {
        TranslationOptions {
            timezone_id: self.timezone_id.clone(),
        }
    }

    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            files_to_delta_sinks: self.files_to_delta_sinks,
            secret_scope: self.secret_scope.clone(),
            notebook_root: self.notebook_root.clone(),
            default_num_workers: self.default_num_workers,
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
