use super::{DefinitionStore, FactoryExportStore, StoreError, WorkflowOutputStore};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Registered store kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Read-only Data Factory git-layout export.
    Factory,
    /// Local output directory for prepared workflows.
    Output,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Factory => "factory",
            StoreKind::Output => "output",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "factory" => Ok(StoreKind::Factory),
            "output" => Ok(StoreKind::Output),
            other => Err(StoreError::Configuration(format!(
                "no definition store registered with kind '{}'",
                other
            ))),
        }
    }
}

/// Builder selecting and configuring a definition store.
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    kind: StoreKind,
    path: Option<PathBuf>,
}

impl StoreBuilder {
    pub fn new(kind: StoreKind) -> Self {
        Self { kind, path: None }
    }

    /// Builder for a kind given by name, e.g. from configuration.
    pub fn named(kind: &str) -> Result<Self, StoreError> {
        Ok(Self::new(kind.parse()?))
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Box<dyn DefinitionStore>, StoreError> {
        let path = self.path.ok_or_else(|| {
            StoreError::Configuration(format!("a path is required for the {} store", self.kind))
        })?;
        tracing::debug!(kind = %self.kind, path = %path.display(), "building definition store");
        Ok(match self.kind {
            StoreKind::Factory => Box::new(FactoryExportStore::new(path)?),
            StoreKind::Output => Box::new(WorkflowOutputStore::new(path)),
        })
    }
}
