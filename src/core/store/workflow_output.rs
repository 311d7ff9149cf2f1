use super::{DefinitionStore, StoreError};
use crate::core::workflow::{PipelineInstruction, PreparedWorkflow};
use crate::utils::{FileSerializer, FileUtils, JsonSerializer};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const JOB_FILE: &str = "job.json";
pub const PIPELINES_FILE: &str = "pipelines.json";
pub const SECRETS_FILE: &str = "secrets.json";
pub const UNSUPPORTED_FILE: &str = "unsupported.json";
pub const NOTEBOOK_DIR: &str = "notebooks";

/// Writes prepared workflows as local files, one directory per job.
///
/// ```text
/// <dir>/<job>/job.json
/// <dir>/<job>/notebooks/<notebook path>.py
/// <dir>/<job>/pipelines.json
/// <dir>/<job>/secrets.json
/// <dir>/<job>/unsupported.json
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowOutputStore {
    dir: PathBuf,
}

impl WorkflowOutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn job_dir(&self, identifier: &str) -> PathBuf {
        self.dir.join(identifier)
    }

    fn save_json<T: serde::Serialize>(&self, path: &Path, data: &T) -> Result<(), StoreError> {
        FileUtils
            .save_to_file(path, data, &JsonSerializer::pretty())
            .map_err(|error| StoreError::io(path, format!("{:#}", error)))
    }
}

/// Entry of `pipelines.json`: the instruction plus the name a local deployment bundle gives
/// the pipeline resource.
#[derive(Serialize)]
struct PipelineEntry<'a> {
    #[serde(flatten)]
    instruction: &'a PipelineInstruction,
    local_identifier: String,
}

impl<'a> From<&'a PipelineInstruction> for PipelineEntry<'a> {
    fn from(instruction: &'a PipelineInstruction) -> Self {
        Self {
            instruction,
            local_identifier: instruction.local_identifier(),
        }
    }
}

/// Directory name for a job: anything outside `[A-Za-z0-9_-]` becomes `_`.
pub fn job_identifier(name: &str) -> String {
    let identifier: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if identifier.is_empty() {
        "workflow".to_string()
    } else {
        identifier
    }
}

fn notebook_file(job_dir: &Path, file_path: &str) -> PathBuf {
    let mut path = job_dir.join(NOTEBOOK_DIR);
    for segment in file_path.split('/').filter(|segment| !segment.is_empty()) {
        if segment != ".." {
            path.push(segment);
        }
    }
    path.set_extension("py");
    path
}

impl DefinitionStore for WorkflowOutputStore {
    fn load(&self, identifier: &str) -> Result<Value, StoreError> {
        let path = self.job_dir(identifier).join(JOB_FILE);
        if !path.is_file() {
            return Err(StoreError::NotFound {
                kind: "job",
                name: identifier.to_string(),
            });
        }
        FileUtils
            .load_from_file(&path, &JsonSerializer::default())
            .map_err(|error| StoreError::parse(&path, &error))
    }

    fn dump(&mut self, workflow: &PreparedWorkflow) -> Result<Option<String>, StoreError> {
        let identifier = job_identifier(&workflow.job_settings.name);
        let job_dir = self.job_dir(&identifier);

        self.save_json(&job_dir.join(JOB_FILE), &workflow.job_settings)?;
        for notebook in &workflow.notebooks {
            let path = notebook_file(&job_dir, &notebook.file_path);
            FileUtils
                .write_text(&path, &notebook.content)
                .map_err(|error| StoreError::io(&path, format!("{:#}", error)))?;
        }
        let pipelines: Vec<PipelineEntry> =
            workflow.pipelines.iter().map(PipelineEntry::from).collect();
        self.save_json(&job_dir.join(PIPELINES_FILE), &pipelines)?;
        self.save_json(&job_dir.join(SECRETS_FILE), &workflow.secrets)?;
        self.save_json(&job_dir.join(UNSUPPORTED_FILE), &workflow.unsupported)?;

        tracing::info!(
            job = %workflow.job_settings.name,
            dir = %job_dir.display(),
            notebooks = workflow.notebooks.len(),
            "workflow written"
        );
        Ok(Some(identifier))
    }
}
