use super::PendingDependency;
use crate::core::ir::{ActivityBase, DependencyOutcome, LinkedService};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::linked_services::translate_linked_service;
use crate::core::translator::values::{array_field, parse_timespan, str_field, text_field, u64_field};
use serde_json::Value;

/// Fields every activity kind shares: description, retry policy, cluster and libraries.
pub(super) fn translate_base(
    payload: &Value,
    name: &str,
    task_key: String,
    activity_type: &str,
    ctx: &mut TranslationContext,
) -> ActivityBase {
    let mut base = ActivityBase {
        name: name.to_string(),
        task_key,
        activity_type: activity_type.to_string(),
        description: text_field(payload, "description"),
        timeout_seconds: None,
        max_retries: None,
        min_retry_interval_millis: None,
        depends_on: Vec::new(),
        new_cluster: None,
        libraries: Vec::new(),
    };

    if let Some(policy) = payload.get("policy") {
        apply_policy(&mut base, policy, ctx);
    }

    if let Some(definition) = payload.get("linkedServiceDefinition") {
        if !definition.is_object() {
            ctx.warn(
                "linkedServiceDefinition",
                "Linked service definition is not an object",
            );
        } else {
            match translate_linked_service(definition) {
                LinkedService::ComputeCluster(cluster) => base.new_cluster = Some(cluster),
                LinkedService::Unsupported(service) => ctx.warn(
                    "linkedServiceDefinition",
                    format!(
                        "Cluster linked service '{}' not translated: {}",
                        service.service_name, service.unsupported.message
                    ),
                ),
                other => ctx.warn(
                    "linkedServiceDefinition",
                    format!(
                        "Linked service '{}' of type '{}' is not a compute cluster",
                        other.service_name(),
                        other.service_type()
                    ),
                ),
            }
        }
    }

    if let Some(type_properties) = payload.get("typeProperties") {
        base.libraries = array_field(type_properties, "libraries").to_vec();
    }
    base
}

fn apply_policy(base: &mut ActivityBase, policy: &Value, ctx: &mut TranslationContext) {
    if let Some(timeout) = str_field(policy, "timeout") {
        match parse_timespan(timeout) {
            Some(seconds) => base.timeout_seconds = Some(seconds),
            None => ctx.warn(
                "policy.timeout",
                format!("Invalid timeout '{}'; no timeout set", timeout),
            ),
        }
    }
    if let Some(retries) = u64_field(policy, "retry") {
        base.max_retries = Some(u32::try_from(retries).unwrap_or(u32::MAX));
    }
    if let Some(interval) = u64_field(policy, "retryIntervalInSeconds") {
        base.min_retry_interval_millis = Some(interval.saturating_mul(1_000));
    }
    for flag in ["secureInput", "secureOutput"] {
        if policy.get(flag).and_then(Value::as_bool) == Some(true) {
            ctx.warn(
                format!("policy.{}", flag),
                "Secure input and output are not translated",
            );
        }
    }
}

/// Explicit upstream dependencies of an activity, by source activity name.
pub(super) fn parse_dependencies(
    payload: &Value,
    ctx: &mut TranslationContext,
) -> Vec<PendingDependency> {
    let mut pending = Vec::new();
    for entry in array_field(payload, "dependsOn") {
        let Some(activity) = text_field(entry, "activity") else {
            ctx.warn("dependsOn", "Dependency without an upstream activity name");
            continue;
        };
        let conditions: Vec<&str> = array_field(entry, "dependencyConditions")
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let outcome = parse_dependency_conditions(&activity, &conditions, ctx);
        pending.push(PendingDependency { activity, outcome });
    }
    pending
}

/// Reduce the conditions attached to one dependency to a single outcome.
///
/// No condition means `Succeeded`. `Skipped` and combinations of several conditions have no
/// equivalent in the target scheduler and fall back to `Completed` with a diagnostic.
pub fn parse_dependency_conditions(
    upstream: &str,
    conditions: &[&str],
    ctx: &mut TranslationContext,
) -> DependencyOutcome {
    match conditions {
        [] => DependencyOutcome::Succeeded,
        [condition] => match DependencyOutcome::from_condition(condition) {
            Some(DependencyOutcome::Skipped) => {
                ctx.warn(
                    "dependsOn.dependencyConditions",
                    format!(
                        "Condition 'Skipped' on '{}' is not supported; using Completed",
                        upstream
                    ),
                );
                DependencyOutcome::Completed
            }
            Some(outcome) => outcome,
            None => {
                ctx.warn(
                    "dependsOn.dependencyConditions",
                    format!(
                        "Unknown condition '{}' on '{}'; using Succeeded",
                        condition, upstream
                    ),
                );
                DependencyOutcome::Succeeded
            }
        },
        several => {
            ctx.warn(
                "dependsOn.dependencyConditions",
                format!(
                    "Multiple conditions [{}] on '{}' are not supported; using Completed",
                    several.join(", "),
                    upstream
                ),
            );
            DependencyOutcome::Completed
        }
    }
}
