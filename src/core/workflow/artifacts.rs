use super::job::JobSettings;
use crate::core::ir::NotTranslatable;
use serde::{Deserialize, Serialize};

pub const PYTHON: &str = "python";

/// Notebook source to upload alongside the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookArtifact {
    /// Workspace path the job refers to.
    pub file_path: String,
    pub content: String,
    pub language: String,
}

impl NotebookArtifact {
    pub fn python(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: content.into(),
            language: PYTHON.to_string(),
        }
    }
}

/// Declarative pipeline to provision before the job can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInstruction {
    /// Task whose `pipeline_task.pipeline_id` receives the provisioned id.
    pub task_key: String,
    /// Notebook holding the pipeline definition.
    pub file_path: String,
    pub name: String,
}

impl PipelineInstruction {
    pub fn local_identifier(&self) -> String {
        let base = if self.name.is_empty() { "pipeline" } else { &self.name };
        format!("{}_local_pipeline", base)
    }
}

/// Secret that must exist in the target secret scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretInstruction {
    pub scope: String,
    pub key: String,
    pub service_name: String,
    pub service_type: String,
    /// Value found in the source metadata.
    pub provided_value: Option<String>,
    pub user_input_required: bool,
}

/// Job payload plus everything needed to deploy it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedWorkflow {
    pub job_settings: JobSettings,
    pub notebooks: Vec<NotebookArtifact>,
    pub pipelines: Vec<PipelineInstruction>,
    pub secrets: Vec<SecretInstruction>,
    pub unsupported: Vec<NotTranslatable>,
}

impl PreparedWorkflow {
    pub fn secrets_requiring_input(&self) -> impl Iterator<Item = &SecretInstruction> {
        self.secrets.iter().filter(|secret| secret.user_input_required)
    }
}
