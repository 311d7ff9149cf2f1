use super::activities::PipelineTask;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recorded explanation of a construct that could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotTranslatable {
    pub property: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineParameter {
    pub name: String,
    pub default: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PauseStatus {
    Paused,
    Unpaused,
}

/// Cron schedule in the target scheduler's Quartz dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub quartz_cron_expression: String,
    pub timezone_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_status: Option<PauseStatus>,
}

/// A translated pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<PipelineParameter>,
    pub schedule: Option<Schedule>,
    pub tasks: Vec<PipelineTask>,
    pub tags: BTreeMap<String, String>,
    pub max_concurrent_runs: Option<u32>,
    pub not_translatable: Vec<NotTranslatable>,
}

impl Pipeline {
    pub fn task(&self, task_key: &str) -> Option<&PipelineTask> {
        self.tasks
            .iter()
            .find(|task| task.activity.task_key() == task_key)
    }
}
