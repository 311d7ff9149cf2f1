//! Lowering of a translated pipeline into a job payload and its deployment artifacts.

use super::artifacts::{NotebookArtifact, PipelineInstruction, PreparedWorkflow, SecretInstruction};
use super::job::{
    Autoscale, ConditionTask, ForEachTask, JobSettings, JobTask, NewCluster, NotebookTask,
    PipelineTaskRef, RunIf, SparkJarTask, SparkPythonTask, TaskDependency, TaskPayload,
};
use super::notebook::{copy_notebook, dlt_notebook, placeholder_notebook};
use super::tags::with_system_tag;
use crate::core::ir::{
    Activity, ActivityBase, ActivityKind, ComputeClusterLinkedService, CopyActivity, Dataset,
    DependencyOutcome, ForEachActivity, InitScript, NotTranslatable, Pipeline, UnsupportedValue,
    WorkerPolicy,
};
use indexmap::IndexMap;
use serde_json::{json, Value};

pub const DEFAULT_SECRET_SCOPE: &str = "flowport_credentials";
pub const DEFAULT_NOTEBOOK_ROOT: &str = "/Shared/flowport";
pub const DEFAULT_NUM_WORKERS: u32 = 1;
/// Folder under the notebook root holding notebooks that stand in for untranslatable tasks.
pub const PLACEHOLDER_FOLDER: &str = "unsupported";

/// Whether a notebook path points at a generated placeholder notebook.
pub fn is_placeholder_path(path: &str) -> bool {
    path.contains(&format!("/{}/", PLACEHOLDER_FOLDER))
}

/// Settings that shape the prepared workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Overrides the inferred choice between a declarative pipeline and a copy notebook.
    pub files_to_delta_sinks: Option<bool>,
    pub secret_scope: String,
    pub notebook_root: String,
    pub default_num_workers: u32,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            files_to_delta_sinks: None,
            secret_scope: DEFAULT_SECRET_SCOPE.to_string(),
            notebook_root: DEFAULT_NOTEBOOK_ROOT.to_string(),
            default_num_workers: DEFAULT_NUM_WORKERS,
        }
    }
}

/// Prepare a pipeline with default options and an optional declarative-pipeline override.
pub fn prepare_workflow(pipeline: Pipeline, files_to_delta_sinks: Option<bool>) -> PreparedWorkflow {
    WorkflowPreparer::new(PrepareOptions {
        files_to_delta_sinks,
        ..PrepareOptions::default()
    })
    .prepare(pipeline)
}

pub struct WorkflowPreparer {
    options: PrepareOptions,
}

/// Artifacts collected while lowering, deduplicated by path, name and key.
#[derive(Default)]
struct Collected {
    notebooks: IndexMap<String, NotebookArtifact>,
    pipelines: IndexMap<String, PipelineInstruction>,
    secrets: IndexMap<String, SecretInstruction>,
    unsupported: Vec<NotTranslatable>,
}

impl WorkflowPreparer {
    pub fn new(options: PrepareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrepareOptions {
        &self.options
    }

    fn placeholder_path(&self, task_key: &str) -> String {
        format!("{}/{}/{}", self.options.notebook_root, PLACEHOLDER_FOLDER, task_key)
    }

    /// Lower every task, then assemble the job settings. Never fails: tasks that cannot be
    /// lowered become failing notebooks and are listed in `unsupported`. A loop body embedded
    /// in its `for_each_task` is not repeated at the top level.
    pub fn prepare(&self, pipeline: Pipeline) -> PreparedWorkflow {
        tracing::info!(pipeline = %pipeline.name, tasks = pipeline.tasks.len(), "preparing workflow");
        let mut collected = Collected::default();
        let absorbed = absorbed_body_keys(&pipeline);
        let tasks: Vec<JobTask> = pipeline
            .tasks
            .iter()
            .filter(|task| !absorbed.contains_key(task.activity.task_key()))
            .map(|task| {
                let mut job_task = self.lower(&task.activity, &pipeline, &mut collected);
                redirect_dependencies(&mut job_task, &absorbed);
                job_task
            })
            .collect();

        let Pipeline {
            name,
            description,
            parameters,
            schedule,
            tags,
            max_concurrent_runs,
            mut not_translatable,
            ..
        } = pipeline;
        not_translatable.append(&mut collected.unsupported);

        let prepared = PreparedWorkflow {
            job_settings: JobSettings {
                name,
                description,
                parameters,
                schedule,
                tags: with_system_tag(tags),
                max_concurrent_runs,
                tasks,
            },
            notebooks: collected.notebooks.into_values().collect(),
            pipelines: collected.pipelines.into_values().collect(),
            secrets: collected.secrets.into_values().collect(),
            unsupported: not_translatable,
        };
        tracing::info!(
            job = %prepared.job_settings.name,
            notebooks = prepared.notebooks.len(),
            pipelines = prepared.pipelines.len(),
            secrets = prepared.secrets.len(),
            unsupported = prepared.unsupported.len(),
            "workflow prepared"
        );
        prepared
    }

    fn lower(&self, activity: &Activity, pipeline: &Pipeline, collected: &mut Collected) -> JobTask {
        let base = &activity.base;
        let payload = match &activity.kind {
            ActivityKind::Notebook(notebook) => match &notebook.placeholder {
                Some(unsupported) => {
                    let path = self.placeholder_path(&base.task_key);
                    collected.add_notebook(NotebookArtifact::python(
                        path.clone(),
                        placeholder_notebook(base, unsupported),
                    ));
                    TaskPayload::NotebookTask(NotebookTask {
                        notebook_path: path,
                        base_parameters: IndexMap::new(),
                    })
                }
                None => TaskPayload::NotebookTask(NotebookTask {
                    notebook_path: notebook.notebook_path.clone(),
                    base_parameters: notebook.base_parameters.clone(),
                }),
            },
            ActivityKind::SparkJar(jar) => TaskPayload::SparkJarTask(SparkJarTask {
                main_class_name: jar.main_class_name.clone(),
                parameters: jar.parameters.clone(),
            }),
            ActivityKind::SparkPython(python) => TaskPayload::SparkPythonTask(SparkPythonTask {
                python_file: python.python_file.clone(),
                parameters: python.parameters.clone(),
            }),
            ActivityKind::IfCondition(condition) => TaskPayload::ConditionTask(ConditionTask {
                op: condition.op,
                left: condition.left.clone(),
                right: condition.right.clone(),
            }),
            ActivityKind::ForEach(for_each) => match iteration_body(for_each, pipeline) {
                Ok(body) => {
                    let mut iteration = self.lower(body, pipeline, collected);
                    iteration.task_key = format!("{}_iteration", base.task_key);
                    iteration.depends_on.clear();
                    iteration.run_if = None;
                    TaskPayload::ForEachTask(ForEachTask {
                        inputs: for_each.items.clone(),
                        concurrency: for_each.concurrency,
                        task: Box::new(iteration),
                    })
                }
                Err(message) => {
                    tracing::warn!(task_key = %base.task_key, "{}", message);
                    collected.unsupported.push(NotTranslatable {
                        property: "for_each_task.task".to_string(),
                        message: message.clone(),
                        activity_name: Some(base.name.clone()),
                        activity_type: Some(base.activity_type.clone()),
                    });
                    let path = self.placeholder_path(&base.task_key);
                    collected.add_notebook(NotebookArtifact::python(
                        path.clone(),
                        placeholder_notebook(base, &UnsupportedValue::new(Value::Null, message)),
                    ));
                    TaskPayload::NotebookTask(NotebookTask {
                        notebook_path: path,
                        base_parameters: IndexMap::new(),
                    })
                }
            },
            ActivityKind::Copy(copy) => self.lower_copy(base, copy, collected),
        };

        let (depends_on, run_if) = lower_dependencies(base);
        let (existing_cluster_id, new_cluster) = match &base.new_cluster {
            Some(cluster) => match &cluster.existing_cluster_id {
                Some(id) => (Some(id.clone()), None),
                None => (None, Some(self.lower_cluster(cluster))),
            },
            None => (None, None),
        };

        JobTask {
            task_key: base.task_key.clone(),
            description: base.description.clone(),
            depends_on,
            run_if,
            payload,
            timeout_seconds: base.timeout_seconds,
            max_retries: base.max_retries,
            min_retry_interval_millis: base.min_retry_interval_millis,
            existing_cluster_id,
            new_cluster,
            libraries: base.libraries.clone(),
        }
    }

    fn lower_copy(&self, base: &ActivityBase, copy: &CopyActivity, collected: &mut Collected) -> TaskPayload {
        for dataset in [&copy.source_dataset, &copy.sink_dataset] {
            for secret in self.dataset_secrets(dataset) {
                collected.secrets.entry(secret.key.clone()).or_insert(secret);
            }
        }

        let path = format!("{}/copy_data/{}", self.options.notebook_root, base.task_key);
        if self.is_declarative(copy) {
            collected.add_notebook(NotebookArtifact::python(
                path.clone(),
                dlt_notebook(base, copy, &self.options.secret_scope),
            ));
            let instruction = PipelineInstruction {
                task_key: base.task_key.clone(),
                file_path: path,
                name: format!("{}_pipeline", base.task_key),
            };
            collected
                .pipelines
                .entry(instruction.name.clone())
                .or_insert(instruction);
            return TaskPayload::PipelineTask(PipelineTaskRef { pipeline_id: None });
        }

        collected.add_notebook(NotebookArtifact::python(
            path.clone(),
            copy_notebook(base, copy, &self.options.secret_scope),
        ));
        TaskPayload::NotebookTask(NotebookTask {
            notebook_path: path,
            base_parameters: IndexMap::new(),
        })
    }

    /// Declarative path: file source, file or Delta sink, and the effective flag set.
    fn is_declarative(&self, copy: &CopyActivity) -> bool {
        let sink_is_delta = matches!(copy.sink_dataset, Dataset::DeltaTable(_));
        let flag = self.options.files_to_delta_sinks.unwrap_or(sink_is_delta);
        flag && copy.source_dataset.is_file() && (copy.sink_dataset.is_file() || sink_is_delta)
    }

    fn dataset_secrets(&self, dataset: &Dataset) -> Vec<SecretInstruction> {
        let secret = |service_name: &str, name: &str, value: Option<&String>| SecretInstruction {
            scope: self.options.secret_scope.clone(),
            key: format!("{}_{}", service_name, name),
            service_name: service_name.to_string(),
            service_type: dataset.type_tag().to_string(),
            provided_value: value.cloned(),
            user_input_required: value.is_none(),
        };
        match dataset {
            Dataset::File(file) => vec![secret(
                &file.service_name,
                "storage_account_key",
                file.account_key.as_ref(),
            )],
            Dataset::SqlTable(table) => vec![
                secret(&table.service_name, "user_name", table.user_name.as_ref()),
                secret(&table.service_name, "password", table.password.as_ref()),
            ],
            Dataset::DeltaTable(_) | Dataset::Unsupported(_) => Vec::new(),
        }
    }

    fn lower_cluster(&self, cluster: &ComputeClusterLinkedService) -> NewCluster {
        let (num_workers, autoscale) = match cluster.workers {
            Some(WorkerPolicy::Fixed { num_workers }) => (Some(num_workers), None),
            Some(WorkerPolicy::Autoscale {
                min_workers,
                max_workers,
            }) => (
                None,
                Some(Autoscale {
                    min_workers,
                    max_workers,
                }),
            ),
            None => (Some(self.options.default_num_workers), None),
        };
        let custom_tags = cluster
            .custom_tags
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        NewCluster {
            spark_version: cluster.spark_version.clone(),
            node_type_id: cluster.node_type_id.clone(),
            driver_node_type_id: cluster.driver_node_type_id.clone(),
            num_workers,
            autoscale,
            spark_conf: cluster.spark_conf.clone(),
            spark_env_vars: cluster.spark_env_vars.clone(),
            custom_tags: with_system_tag(custom_tags),
            init_scripts: cluster.init_scripts.iter().map(init_script).collect(),
            cluster_log_conf: cluster
                .log_destination
                .as_ref()
                .map(|destination| json!({"dbfs": {"destination": destination}})),
        }
    }
}

impl Collected {
    fn add_notebook(&mut self, notebook: NotebookArtifact) {
        self.notebooks
            .entry(notebook.file_path.clone())
            .or_insert(notebook);
    }
}

/// The task run once per item of a loop. Only a leaf task can be embedded in
/// `for_each_task.task`; a nested container would leave its children outside the iteration.
fn iteration_body<'a>(
    for_each: &ForEachActivity,
    pipeline: &'a Pipeline,
) -> Result<&'a Activity, String> {
    let body = for_each
        .body_task_keys
        .first()
        .and_then(|key| pipeline.task(key))
        .map(|task| &task.activity)
        .ok_or_else(|| "Loop body task is missing from the pipeline".to_string())?;
    match body.kind {
        ActivityKind::IfCondition(_) | ActivityKind::ForEach(_) => Err(format!(
            "Loop body '{}' is a {} container and cannot run per iteration",
            body.base.name, body.base.activity_type
        )),
        _ => Ok(body),
    }
}

/// Task keys embedded in a `for_each_task`, mapped to the key of their loop.
fn absorbed_body_keys(pipeline: &Pipeline) -> IndexMap<String, String> {
    pipeline
        .tasks
        .iter()
        .filter_map(|task| match &task.activity.kind {
            ActivityKind::ForEach(for_each) => iteration_body(for_each, pipeline)
                .ok()
                .map(|body| (body.base.task_key.clone(), task.activity.base.task_key.clone())),
            _ => None,
        })
        .collect()
}

/// Point dependencies on an embedded task at its loop, dropping duplicates.
fn redirect_dependencies(task: &mut JobTask, absorbed: &IndexMap<String, String>) {
    let mut seen = Vec::new();
    task.depends_on.retain_mut(|dependency| {
        if let Some(loop_key) = absorbed.get(&dependency.task_key) {
            dependency.task_key = loop_key.clone();
        }
        if seen.contains(&dependency.task_key) {
            return false;
        }
        seen.push(dependency.task_key.clone());
        true
    });
}

fn init_script(script: &InitScript) -> Value {
    match script {
        InitScript::Dbfs { destination } => json!({"dbfs": {"destination": destination}}),
        InitScript::Volumes { destination } => json!({"volumes": {"destination": destination}}),
        InitScript::Workspace { destination } => json!({"workspace": {"destination": destination}}),
    }
}

/// Split dependencies into job dependencies and the task's run condition.
///
/// Branch outcomes stay on the dependency. The remaining outcomes decide `run_if`: all
/// `Failed` gives `ALL_FAILED`, any `Completed` gives `ALL_DONE`, any other `Failed` gives
/// `AT_LEAST_ONE_FAILED`, and plain success leaves the default.
pub fn lower_dependencies(base: &ActivityBase) -> (Vec<TaskDependency>, Option<RunIf>) {
    let depends_on = base
        .depends_on
        .iter()
        .map(|dependency| TaskDependency {
            task_key: dependency.task_key.clone(),
            outcome: dependency.outcome.branch_value().map(str::to_string),
        })
        .collect();

    let outcomes: Vec<DependencyOutcome> = base
        .depends_on
        .iter()
        .map(|dependency| dependency.outcome)
        .filter(|outcome| outcome.branch_value().is_none())
        .collect();
    let failed = outcomes
        .iter()
        .filter(|outcome| **outcome == DependencyOutcome::Failed)
        .count();
    let done = outcomes.iter().any(|outcome| {
        matches!(
            outcome,
            DependencyOutcome::Completed | DependencyOutcome::Skipped
        )
    });

    let run_if = if failed > 0 && failed == outcomes.len() {
        Some(RunIf::AllFailed)
    } else if done {
        Some(RunIf::AllDone)
    } else if failed > 0 {
        Some(RunIf::AtLeastOneFailed)
    } else {
        None
    };
    (depends_on, run_if)
}
