//! Definition stores: where source pipelines are loaded from and prepared workflows are written to.

pub mod builder;
pub mod factory_export;
pub mod workflow_output;

pub use builder::{StoreBuilder, StoreKind};
pub use factory_export::FactoryExportStore;
pub use workflow_output::WorkflowOutputStore;

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::workflow::PreparedWorkflow;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
    #[error("{0}")]
    NotSupported(String),
    #[error("Invalid store configuration: {0}")]
    Configuration(String),
    #[error("I/O error on {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "FP-STORE-001",
            StoreError::NotSupported(_) => "FP-STORE-002",
            StoreError::Configuration(_) => "FP-STORE-003",
            StoreError::Io { .. } => "FP-STORE-004",
            StoreError::Parse { .. } => "FP-STORE-005",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        StoreError::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
        StoreError::Parse {
            path: path.into(),
            message: format!("{:#}", error),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        let suggestion = match &error {
            StoreError::NotFound { .. } => "Check the name and the export directory",
            StoreError::NotSupported(_) => "Use a store that supports this operation",
            StoreError::Configuration(_) => "Check the store kind and path",
            StoreError::Io { .. } => "Check file permissions and paths",
            StoreError::Parse { .. } => "Check that the definition is valid JSON",
        };
        let category = match &error {
            StoreError::Parse { .. } => ErrorCategory::SerializationError,
            StoreError::Io { .. } => ErrorCategory::IoError,
            _ => ErrorCategory::StoreError,
        };
        AppError::new(category, error.to_string())
            .with_code(error.code())
            .with_suggestion(suggestion)
    }
}

/// Source of raw pipeline definitions and sink for prepared workflows.
pub trait DefinitionStore {
    /// Load a resolved pipeline payload by name.
    fn load(&self, identifier: &str) -> Result<Value, StoreError>;

    /// Persist a prepared workflow, returning its identifier in the store when it has one.
    fn dump(&mut self, workflow: &PreparedWorkflow) -> Result<Option<String>, StoreError>;
}
