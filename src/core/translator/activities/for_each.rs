use super::{translate_children, Translated};
use crate::core::ir::{
    ActivityBase, ActivityKind, DependencyOutcome, ForEachActivity, Translation, UnsupportedValue,
};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::expression::parse_items;
use crate::core::translator::values::{
    array_field, bool_field, expression_text, str_field, text_field, u64_field,
};
use serde_json::Value;

pub const DEFAULT_CONCURRENCY: u32 = 1;
pub const MAX_CONCURRENCY: u32 = 100;

/// Translate a loop; its inner activities become tasks released when the loop task succeeds.
pub(super) fn translate_for_each(
    payload: &Value,
    base: &ActivityBase,
    ctx: &mut TranslationContext,
) -> Translation<Translated> {
    let type_properties = payload.get("typeProperties").unwrap_or(&Value::Null);

    let raw_items = type_properties
        .get("items")
        .and_then(expression_text)
        .ok_or_else(|| UnsupportedValue::new(payload.clone(), "Missing property 'items'"))?;
    let items = parse_items(raw_items).ok_or_else(|| {
        UnsupportedValue::new(
            payload.clone(),
            format!("Unsupported items expression '{}'", raw_items),
        )
    })?;

    let body = array_field(type_properties, "activities");
    if body.is_empty() {
        return Err(UnsupportedValue::new(
            payload.clone(),
            "ForEach has no inner activities",
        ));
    }
    if let Some(container) = body
        .first()
        .and_then(|first| str_field(first, "type"))
        .filter(|kind| matches!(*kind, "IfCondition" | "ForEach"))
    {
        let name = body
            .first()
            .and_then(|first| text_field(first, "name"))
            .unwrap_or_default();
        return Err(UnsupportedValue::new(
            payload.clone(),
            format!(
                "Loop body '{}' is a {} container and cannot run per iteration",
                name, container
            ),
        ));
    }
    if body.len() > 1 {
        ctx.warn(
            "activities",
            "Only the first inner activity runs per iteration; the others run once after the loop",
        );
    }

    let concurrency = concurrency(type_properties, ctx);
    let children = translate_children(body, &base.task_key, DependencyOutcome::Succeeded, ctx);
    let body_task_keys = children
        .iter()
        .map(|child| child.task_key().to_string())
        .collect();

    Ok(Translated {
        kind: ActivityKind::ForEach(ForEachActivity {
            items,
            concurrency,
            body_task_keys,
        }),
        children,
    })
}

fn concurrency(type_properties: &Value, ctx: &mut TranslationContext) -> u32 {
    if bool_field(type_properties, "isSequential") == Some(true) {
        return 1;
    }
    let Some(requested) = u64_field(type_properties, "batchCount") else {
        return DEFAULT_CONCURRENCY;
    };
    if requested == 0 {
        ctx.warn("batchCount", "Batch count 0 is invalid; using 1");
        return DEFAULT_CONCURRENCY;
    }
    if requested > u64::from(MAX_CONCURRENCY) {
        ctx.warn(
            "batchCount",
            format!(
                "Batch count {} exceeds the limit of {}; clamped",
                requested, MAX_CONCURRENCY
            ),
        );
        return MAX_CONCURRENCY;
    }
    requested as u32
}
