//! Activity translation: per-kind dispatch, placeholder substitution, flattening of nested
//! containers and dependency resolution.

mod copy;
mod for_each;
mod if_condition;
mod notebook;
mod policy;
mod spark;

pub use policy::parse_dependency_conditions;

use crate::core::ir::{
    Activity, ActivityBase, ActivityKind, Dependency, DependencyOutcome, NotebookActivity,
    Translation, UnsupportedValue,
};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::ordering::order_activities;
use crate::core::translator::values::{str_field, text_field};
use indexmap::IndexMap;
use serde_json::Value;

pub const UNNAMED_TASK: &str = "UNNAMED_TASK";
pub const PLACEHOLDER_NOTEBOOK_PATH: &str = "/UNSUPPORTED_ADF_ACTIVITY";

/// Dependency on a source activity, before names are resolved to task keys.
#[derive(Debug, Clone)]
pub(crate) struct PendingDependency {
    pub activity: String,
    pub outcome: DependencyOutcome,
}

/// Translated activity that still owns its translated children.
pub(crate) struct ActivityNode {
    activity: Activity,
    pending: Vec<PendingDependency>,
    children: Vec<ActivityNode>,
}

/// Output of a per-kind translator.
pub(crate) struct Translated {
    pub kind: ActivityKind,
    pub children: Vec<ActivityNode>,
}

impl Translated {
    fn leaf(kind: ActivityKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

/// Translate a list of activity payloads into a flat, ordered list of activities.
///
/// Containers are followed by their children; every child depends on its container. Explicit
/// dependencies are resolved to task keys and the list is ordered so that dependencies
/// precede their dependents.
pub fn translate_activities(payloads: &[Value], ctx: &mut TranslationContext) -> Vec<Activity> {
    let nodes: Vec<ActivityNode> = payloads
        .iter()
        .map(|payload| translate_node(payload, None, ctx))
        .collect();

    let mut flat = Vec::new();
    for node in nodes {
        flatten(node, &mut flat);
    }

    let resolved = flat
        .into_iter()
        .map(|(activity, pending)| resolve_dependencies(activity, pending, ctx))
        .collect();
    order_activities(resolved, ctx)
}

/// Translate one activity and, recursively, its children.
///
/// `parent` is the container's task key and the outcome that releases this child.
pub(crate) fn translate_node(
    payload: &Value,
    parent: Option<(&str, DependencyOutcome)>,
    ctx: &mut TranslationContext,
) -> ActivityNode {
    let name = text_field(payload, "name").unwrap_or_else(|| UNNAMED_TASK.to_string());
    let activity_type = str_field(payload, "type").unwrap_or("UNKNOWN").to_string();

    ctx.scoped(&name, &activity_type, |ctx| {
        let task_key = ctx.allocate_task_key(&name);
        let mut base = policy::translate_base(payload, &name, task_key, &activity_type, ctx);
        let pending = policy::parse_dependencies(payload, ctx);
        if let Some((parent_key, outcome)) = parent {
            base.depends_on.push(Dependency {
                task_key: parent_key.to_string(),
                outcome,
            });
        }

        let translated = match dispatch(payload, &activity_type, &base, ctx) {
            Ok(translated) => translated,
            Err(unsupported) => {
                ctx.record_unsupported("activity", &unsupported);
                Translated::leaf(placeholder_kind(unsupported))
            }
        };

        tracing::debug!(
            task_key = %base.task_key,
            activity_type = %activity_type,
            children = translated.children.len(),
            "translated activity"
        );
        ActivityNode {
            activity: Activity {
                base,
                kind: translated.kind,
            },
            pending,
            children: translated.children,
        }
    })
}

fn dispatch(
    payload: &Value,
    activity_type: &str,
    base: &ActivityBase,
    ctx: &mut TranslationContext,
) -> Translation<Translated> {
    match activity_type {
        "DatabricksNotebook" => notebook::translate_notebook(payload, ctx).map(Translated::leaf),
        "DatabricksSparkJar" => spark::translate_spark_jar(payload).map(Translated::leaf),
        "DatabricksSparkPython" => spark::translate_spark_python(payload).map(Translated::leaf),
        "IfCondition" => if_condition::translate_if_condition(payload, base, ctx),
        "ForEach" => for_each::translate_for_each(payload, base, ctx),
        "Copy" => copy::translate_copy(payload, ctx).map(Translated::leaf),
        other => Err(UnsupportedValue::new(
            payload.clone(),
            format!("Unsupported activity type '{}'", other),
        )),
    }
}

/// Notebook standing in for an activity that could not be translated.
pub fn placeholder_kind(unsupported: UnsupportedValue) -> ActivityKind {
    ActivityKind::Notebook(NotebookActivity {
        notebook_path: PLACEHOLDER_NOTEBOOK_PATH.to_string(),
        base_parameters: IndexMap::new(),
        placeholder: Some(unsupported),
    })
}

/// Translate the children of a container, each released by `outcome` of the container.
pub(crate) fn translate_children(
    payloads: &[Value],
    container_key: &str,
    outcome: DependencyOutcome,
    ctx: &mut TranslationContext,
) -> Vec<ActivityNode> {
    payloads
        .iter()
        .map(|payload| translate_node(payload, Some((container_key, outcome)), ctx))
        .collect()
}

impl ActivityNode {
    pub(crate) fn task_key(&self) -> &str {
        self.activity.task_key()
    }
}

fn flatten(node: ActivityNode, out: &mut Vec<(Activity, Vec<PendingDependency>)>) {
    let ActivityNode {
        activity,
        pending,
        children,
    } = node;
    out.push((activity, pending));
    for child in children {
        flatten(child, out);
    }
}

fn resolve_dependencies(
    mut activity: Activity,
    pending: Vec<PendingDependency>,
    ctx: &mut TranslationContext,
) -> Activity {
    let name = activity.base.name.clone();
    let activity_type = activity.base.activity_type.clone();

    for dependency in pending {
        let resolved = ctx.task_key_for(&dependency.activity).map(str::to_string);
        match resolved {
            Some(key) if key == activity.base.task_key => {
                ctx.scoped(&name, &activity_type, |ctx| {
                    ctx.warn("dependsOn", "Activity depends on itself; dependency dropped")
                });
            }
            Some(key) => {
                if activity
                    .base
                    .depends_on
                    .iter()
                    .all(|existing| existing.task_key != key)
                {
                    activity.base.depends_on.push(Dependency {
                        task_key: key,
                        outcome: dependency.outcome,
                    });
                }
            }
            None => {
                ctx.scoped(&name, &activity_type, |ctx| {
                    ctx.warn(
                        "dependsOn",
                        format!(
                            "Unknown upstream activity '{}'; dependency dropped",
                            dependency.activity
                        ),
                    )
                });
            }
        }
    }
    activity
}
