pub mod config;
pub mod error;
pub mod ir;
pub mod lint;
pub mod store;
pub mod translator;
pub mod types;
pub mod workflow;

pub use config::{ConfigLoader, ConfigValidator, FlowportConfig};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use lint::{LintRegistry, LintResult, LintSeverity};
pub use store::{DefinitionStore, StoreBuilder, StoreError, StoreKind};
pub use translator::{translate_pipeline, translate_pipeline_with, TranslationOptions};
pub use types::*;
pub use workflow::{prepare_workflow, PrepareOptions, PreparedWorkflow, WorkflowPreparer};
