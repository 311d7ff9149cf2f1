use super::activities::translate_activities;
use super::context::TranslationContext;
use super::parameters::translate_parameters;
use super::triggers::translate_schedule_trigger;
use super::values::{array_field, text_field, u64_field};
use super::TranslationOptions;
use crate::core::ir::{Pipeline, PipelineTask};
use serde_json::Value;
use std::collections::BTreeMap;

pub const UNNAMED_WORKFLOW: &str = "UNNAMED_WORKFLOW";

/// Translate a resolved pipeline payload with default options.
pub fn translate_pipeline(payload: &Value) -> Pipeline {
    translate_pipeline_with(payload, &TranslationOptions::default())
}

/// Translate a resolved pipeline payload: activities, parameters, annotations and the attached
/// trigger. Always returns a pipeline; everything that could not be mapped is listed in
/// `not_translatable`.
pub fn translate_pipeline_with(payload: &Value, options: &TranslationOptions) -> Pipeline {
    let mut ctx = TranslationContext::new();
    let name = text_field(payload, "name").unwrap_or_else(|| {
        ctx.warn("pipeline.name", "Pipeline has no name");
        UNNAMED_WORKFLOW.to_string()
    });
    let properties = payload.get("properties").unwrap_or(payload);
    tracing::info!(pipeline = %name, "translating pipeline");

    let parameters = translate_parameters(properties, &mut ctx);
    let tasks = translate_activities(array_field(properties, "activities"), &mut ctx)
        .into_iter()
        .map(PipelineTask::new)
        .collect::<Vec<_>>();
    let schedule = payload
        .get("trigger")
        .filter(|trigger| !trigger.is_null())
        .and_then(|trigger| translate_schedule_trigger(trigger, &options.timezone_id, &mut ctx));

    let tags: BTreeMap<String, String> = array_field(properties, "annotations")
        .iter()
        .filter_map(Value::as_str)
        .map(|annotation| (annotation.to_string(), String::new()))
        .collect();
    let max_concurrent_runs =
        u64_field(properties, "concurrency").map(|runs| u32::try_from(runs).unwrap_or(u32::MAX));

    let not_translatable = ctx.into_diagnostics();
    tracing::info!(
        pipeline = %name,
        tasks = tasks.len(),
        diagnostics = not_translatable.len(),
        "pipeline translated"
    );
    Pipeline {
        name,
        description: text_field(properties, "description"),
        parameters,
        schedule,
        tasks,
        tags,
        max_concurrent_runs,
        not_translatable,
    }
}
