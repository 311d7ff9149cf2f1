//! Lowering of the intermediate representation into a target job and deployment artifacts.

pub mod artifacts;
pub mod job;
pub mod notebook;
pub mod preparer;
pub mod tags;

pub use artifacts::{NotebookArtifact, PipelineInstruction, PreparedWorkflow, SecretInstruction};
pub use job::{JobSettings, JobTask, RunIf, TaskDependency, TaskPayload};
pub use preparer::{is_placeholder_path, prepare_workflow, PrepareOptions, WorkflowPreparer};
pub use tags::{with_system_tag, SYSTEM_TAG};
