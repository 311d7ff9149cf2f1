use super::{translate_children, Translated};
use crate::core::ir::{
    ActivityBase, ActivityKind, DependencyOutcome, IfConditionActivity, Translation,
    UnsupportedValue,
};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::expression::parse_condition;
use crate::core::translator::values::{array_field, expression_text};
use serde_json::Value;

/// Translate a two-way branch. False-branch children come first, then true-branch children;
/// each depends on the condition task with the matching branch outcome.
pub(super) fn translate_if_condition(
    payload: &Value,
    base: &ActivityBase,
    ctx: &mut TranslationContext,
) -> Translation<Translated> {
    let type_properties = payload.get("typeProperties").unwrap_or(&Value::Null);
    let expression = type_properties
        .get("expression")
        .and_then(expression_text)
        .ok_or_else(|| UnsupportedValue::new(payload.clone(), "Missing property 'expression'"))?;
    let comparison = parse_condition(expression).ok_or_else(|| {
        UnsupportedValue::new(
            payload.clone(),
            format!("Unsupported conditional expression '{}'", expression),
        )
    })?;

    let if_false = array_field(type_properties, "ifFalseActivities");
    let if_true = array_field(type_properties, "ifTrueActivities");
    if if_false.is_empty() && if_true.is_empty() {
        ctx.warn("ifTrueActivities", "If condition has no child activities");
    }

    let mut children = translate_children(if_false, &base.task_key, DependencyOutcome::False, ctx);
    children.extend(translate_children(
        if_true,
        &base.task_key,
        DependencyOutcome::True,
        ctx,
    ));
    let child_task_keys = children
        .iter()
        .map(|child| child.task_key().to_string())
        .collect();

    Ok(Translated {
        kind: ActivityKind::IfCondition(IfConditionActivity {
            op: comparison.op,
            left: comparison.left,
            right: comparison.right,
            child_task_keys,
        }),
        children,
    })
}
