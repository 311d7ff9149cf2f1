use super::datasets::{ColumnMapping, Dataset, DatasetProperties};
use super::linked_services::ComputeClusterLinkedService;
use super::unsupported::UnsupportedValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Terminal state of an upstream task that releases a dependent task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyOutcome {
    Succeeded,
    Failed,
    Skipped,
    Completed,
    /// Branch taken when the upstream condition evaluated to true.
    True,
    /// Branch taken when the upstream condition evaluated to false.
    False,
}

impl DependencyOutcome {
    /// Parse a source dependency condition name (case-insensitive).
    pub fn from_condition(condition: &str) -> Option<Self> {
        match condition.to_ascii_lowercase().as_str() {
            "succeeded" => Some(DependencyOutcome::Succeeded),
            "failed" => Some(DependencyOutcome::Failed),
            "skipped" => Some(DependencyOutcome::Skipped),
            "completed" => Some(DependencyOutcome::Completed),
            _ => None,
        }
    }

    /// Branch outcome string understood by condition tasks.
    pub fn branch_value(&self) -> Option<&'static str> {
        match self {
            DependencyOutcome::True => Some("true"),
            DependencyOutcome::False => Some("false"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub task_key: String,
    pub outcome: DependencyOutcome,
}

impl Dependency {
    pub fn succeeded(task_key: impl Into<String>) -> Self {
        Self {
            task_key: task_key.into(),
            outcome: DependencyOutcome::Succeeded,
        }
    }
}

/// Fields shared by every activity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityBase {
    pub name: String,
    pub task_key: String,
    /// Activity type as spelled in the source.
    pub activity_type: String,
    pub description: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_retries: Option<u32>,
    pub min_retry_interval_millis: Option<u64>,
    pub depends_on: Vec<Dependency>,
    pub new_cluster: Option<ComputeClusterLinkedService>,
    pub libraries: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookActivity {
    pub notebook_path: String,
    pub base_parameters: IndexMap<String, String>,
    /// Set when this notebook stands in for an activity that could not be translated.
    pub placeholder: Option<UnsupportedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkJarActivity {
    pub main_class_name: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparkPythonActivity {
    pub python_file: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyActivity {
    pub source_dataset: Dataset,
    pub sink_dataset: Dataset,
    pub source_properties: DatasetProperties,
    pub sink_properties: DatasetProperties,
    pub column_mapping: Vec<ColumnMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForEachActivity {
    /// Serialized items expression evaluated by the target scheduler.
    pub items: String,
    pub concurrency: u32,
    /// Task keys of the loop body, in source order. The body tasks follow the container in the
    /// pipeline task list.
    pub body_task_keys: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    EqualTo,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    NotEqual,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::EqualTo => "EQUAL_TO",
            ConditionOperator::GreaterThan => "GREATER_THAN",
            ConditionOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            ConditionOperator::LessThan => "LESS_THAN",
            ConditionOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            ConditionOperator::NotEqual => "NOT_EQUAL",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfConditionActivity {
    pub op: ConditionOperator,
    pub left: String,
    pub right: String,
    /// Task keys of both branches (false branch first).
    pub child_task_keys: Vec<String>,
}

/// Kind-specific part of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityKind {
    Notebook(NotebookActivity),
    Copy(CopyActivity),
    ForEach(ForEachActivity),
    SparkJar(SparkJarActivity),
    SparkPython(SparkPythonActivity),
    IfCondition(IfConditionActivity),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(flatten)]
    pub base: ActivityBase,
    pub kind: ActivityKind,
}

impl Activity {
    pub fn task_key(&self) -> &str {
        &self.base.task_key
    }

    /// The untranslatable payload this activity stands in for, if any.
    pub fn placeholder(&self) -> Option<&UnsupportedValue> {
        match &self.kind {
            ActivityKind::Notebook(notebook) => notebook.placeholder.as_ref(),
            _ => None,
        }
    }
}

/// Slot in the pipeline task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineTask {
    pub activity: Activity,
}

impl PipelineTask {
    pub fn new(activity: Activity) -> Self {
        Self { activity }
    }
}
