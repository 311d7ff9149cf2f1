//! Target job payload, serialized in the Jobs API shape.

use crate::core::ir::{ConditionOperator, PipelineParameter, Schedule};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<PipelineParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_runs: Option<u32>,
    pub tasks: Vec<JobTask>,
}

impl JobSettings {
    pub fn task(&self, task_key: &str) -> Option<&JobTask> {
        self.tasks.iter().find(|task| task.task_key == task_key)
    }
}

/// Condition on upstream outcomes under which a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunIf {
    AllSuccess,
    AllDone,
    AtLeastOneFailed,
    AllFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    pub task_key: String,
    /// Branch outcome (`"true"` / `"false"`) when the upstream task is a condition task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTask {
    pub task_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_if: Option<RunIf>,
    #[serde(flatten)]
    pub payload: TaskPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_retry_interval_millis: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_cluster_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_cluster: Option<NewCluster>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Value>,
}

/// Exactly one kind-specific block of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPayload {
    NotebookTask(NotebookTask),
    SparkJarTask(SparkJarTask),
    SparkPythonTask(SparkPythonTask),
    ConditionTask(ConditionTask),
    ForEachTask(ForEachTask),
    PipelineTask(PipelineTaskRef),
}

impl TaskPayload {
    /// Serialized name of the block, e.g. `notebook_task`.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskPayload::NotebookTask(_) => "notebook_task",
            TaskPayload::SparkJarTask(_) => "spark_jar_task",
            TaskPayload::SparkPythonTask(_) => "spark_python_task",
            TaskPayload::ConditionTask(_) => "condition_task",
            TaskPayload::ForEachTask(_) => "for_each_task",
            TaskPayload::PipelineTask(_) => "pipeline_task",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookTask {
    pub notebook_path: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub base_parameters: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkJarTask {
    pub main_class_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkPythonTask {
    pub python_file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTask {
    pub op: ConditionOperator,
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForEachTask {
    pub inputs: String,
    pub concurrency: u32,
    pub task: Box<JobTask>,
}

/// Reference to a declarative pipeline; the id is assigned when the pipeline is provisioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineTaskRef {
    pub pipeline_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoscale {
    pub min_workers: u32,
    pub max_workers: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_node_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_workers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<Autoscale>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub spark_conf: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub spark_env_vars: IndexMap<String, String>,
    #[serde(default)]
    pub custom_tags: BTreeMap<String, String>,
    /// Entries such as `{"dbfs": {"destination": "..."}}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_scripts: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_log_conf: Option<Value>,
}
