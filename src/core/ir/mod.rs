//! Intermediate representation shared by the translators and the workflow preparer.
//!
//! Values are produced once per translation run and are not mutated afterwards.

pub mod activities;
pub mod datasets;
pub mod linked_services;
pub mod pipeline;
pub mod unsupported;

pub use activities::{
    Activity, ActivityBase, ActivityKind, ConditionOperator, CopyActivity, Dependency,
    DependencyOutcome, ForEachActivity, IfConditionActivity, NotebookActivity, PipelineTask,
    SparkJarActivity, SparkPythonActivity,
};
pub use datasets::{
    ColumnMapping, ColumnType, Dataset, DatasetProperties, DeltaTableDataset, FileDataset,
    FileFormat, SqlTableDataset, UnsupportedDataset,
};
pub use linked_services::{
    BlobStorageLinkedService, ComputeClusterLinkedService, InitScript, LinkedService,
    SqlLinkedService, UnsupportedLinkedService, WorkerPolicy,
};
pub use pipeline::{NotTranslatable, PauseStatus, Pipeline, PipelineParameter, Schedule};
pub use unsupported::{Translation, UnsupportedValue};
