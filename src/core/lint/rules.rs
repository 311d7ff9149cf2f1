use super::{LintResult, LintSeverity, WorkflowLintRule};
use crate::core::workflow::{is_placeholder_path, JobTask, PreparedWorkflow, TaskPayload};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

pub fn built_in_rules() -> Vec<Box<dyn WorkflowLintRule>> {
    vec![
        Box::new(DuplicateTaskKeysRule),
        Box::new(UnknownDependencyTargetsRule),
        Box::new(DependencyCycleRule),
        Box::new(ForwardDependencyRule),
        Box::new(PlaceholderTaskRule),
        Box::new(SecretInputRule),
    ]
}

/// FP-LINT-001: every task key is unique, including loop iteration tasks.
struct DuplicateTaskKeysRule;

impl WorkflowLintRule for DuplicateTaskKeysRule {
    fn validate(&self, workflow: &PreparedWorkflow) -> Vec<LintResult> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for task in all_tasks(&workflow.job_settings.tasks) {
            *counts.entry(task.task_key.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(task_key, count)| {
                LintResult::new(
                    "FP-LINT-001",
                    LintSeverity::Error,
                    format!("duplicate task key '{}' found {} times", task_key, count),
                    Some(task_key.to_string()),
                    Some("rename activities so every task key is unique".to_string()),
                )
            })
            .collect()
    }
}

/// FP-LINT-002
struct UnknownDependencyTargetsRule;

impl WorkflowLintRule for UnknownDependencyTargetsRule {
    fn validate(&self, workflow: &PreparedWorkflow) -> Vec<LintResult> {
        let tasks = &workflow.job_settings.tasks;
        let mut out = Vec::new();
        for task in tasks {
            for dependency in &task.depends_on {
                if workflow.job_settings.task(&dependency.task_key).is_none() {
                    out.push(LintResult::new(
                        "FP-LINT-002",
                        LintSeverity::Error,
                        format!(
                            "task '{}' depends on unknown task '{}'",
                            task.task_key, dependency.task_key
                        ),
                        Some(task.task_key.clone()),
                        Some("point depends_on to an existing task key".to_string()),
                    ));
                }
            }
        }
        out
    }
}

/// FP-LINT-003
struct DependencyCycleRule;

impl WorkflowLintRule for DependencyCycleRule {
    fn validate(&self, workflow: &PreparedWorkflow) -> Vec<LintResult> {
        let tasks = &workflow.job_settings.tasks;
        let graph = build_dependency_graph(tasks);

        let mut out = Vec::new();
        for component in tarjan_scc(&graph) {
            let self_loop = component.len() == 1 && graph.contains_edge(component[0], component[0]);
            if component.len() < 2 && !self_loop {
                continue;
            }
            let mut members: Vec<usize> = component.iter().map(|idx| idx.index()).collect();
            members.sort_unstable();
            let keys: Vec<&str> = members
                .iter()
                .map(|&index| tasks[index].task_key.as_str())
                .collect();
            out.push(LintResult::new(
                "FP-LINT-003",
                LintSeverity::Error,
                format!("dependency cycle between {}", keys.join(", ")),
                Some(keys[0].to_string()),
                Some("remove one of the dependencies closing the cycle".to_string()),
            ));
        }
        out
    }
}

/// FP-LINT-004: the scheduler expects upstream tasks to be listed first.
struct ForwardDependencyRule;

impl WorkflowLintRule for ForwardDependencyRule {
    fn validate(&self, workflow: &PreparedWorkflow) -> Vec<LintResult> {
        let tasks = &workflow.job_settings.tasks;
        let positions: HashMap<&str, usize> = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (task.task_key.as_str(), index))
            .collect();

        let mut out = Vec::new();
        for (index, task) in tasks.iter().enumerate() {
            for dependency in &task.depends_on {
                let Some(&upstream) = positions.get(dependency.task_key.as_str()) else {
                    continue;
                };
                if upstream > index {
                    out.push(LintResult::new(
                        "FP-LINT-004",
                        LintSeverity::Error,
                        format!(
                            "task '{}' depends on '{}', which is listed after it",
                            task.task_key, dependency.task_key
                        ),
                        Some(task.task_key.clone()),
                        Some("order tasks so every dependency precedes its dependent".to_string()),
                    ));
                }
            }
        }
        out
    }
}

/// FP-LINT-005
struct PlaceholderTaskRule;

impl WorkflowLintRule for PlaceholderTaskRule {
    fn validate(&self, workflow: &PreparedWorkflow) -> Vec<LintResult> {
        all_tasks(&workflow.job_settings.tasks)
            .into_iter()
            .filter(|task| match &task.payload {
                TaskPayload::NotebookTask(notebook) => is_placeholder_path(&notebook.notebook_path),
                _ => false,
            })
            .map(|task| {
                LintResult::new(
                    "FP-LINT-005",
                    LintSeverity::Warning,
                    format!(
                        "task '{}' runs a placeholder notebook and will fail until replaced",
                        task.task_key
                    ),
                    Some(task.task_key.clone()),
                    Some("implement the activity by hand and update the notebook path".to_string()),
                )
            })
            .collect()
    }
}

/// FP-LINT-006
struct SecretInputRule;

impl WorkflowLintRule for SecretInputRule {
    fn validate(&self, workflow: &PreparedWorkflow) -> Vec<LintResult> {
        workflow
            .secrets_requiring_input()
            .map(|secret| {
                LintResult::new(
                    "FP-LINT-006",
                    LintSeverity::Info,
                    format!(
                        "secret '{}' in scope '{}' for service '{}' needs a value",
                        secret.key, secret.scope, secret.service_name
                    ),
                    Some(format!("{}/{}", secret.scope, secret.key)),
                    Some("provide the value when creating the secret scope".to_string()),
                )
            })
            .collect()
    }
}

/// Top-level tasks followed by the tasks nested in loops.
fn all_tasks(tasks: &[JobTask]) -> Vec<&JobTask> {
    let mut out = Vec::new();
    for task in tasks {
        out.push(task);
        if let TaskPayload::ForEachTask(for_each) = &task.payload {
            out.extend(all_tasks(std::slice::from_ref(for_each.task.as_ref())));
        }
    }
    out
}

/// Edges run from upstream to dependent; unknown targets are left out.
fn build_dependency_graph(tasks: &[JobTask]) -> DiGraph<(), ()> {
    let mut graph = DiGraph::<(), ()>::new();
    let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

    for task in tasks {
        let idx = graph.add_node(());
        node_map.entry(task.task_key.as_str()).or_insert(idx);
    }

    for (index, task) in tasks.iter().enumerate() {
        let to = NodeIndex::new(index);
        for dependency in &task.depends_on {
            if let Some(&from) = node_map.get(dependency.task_key.as_str()) {
                graph.add_edge(from, to, ());
            }
        }
    }

    graph
}
