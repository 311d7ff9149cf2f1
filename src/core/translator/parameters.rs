use crate::core::ir::PipelineParameter;
use crate::core::translator::context::TranslationContext;
use crate::core::translator::values::stringify;
use serde_json::Value;

/// Pipeline parameters `{name: {type, defaultValue}}`, in declaration order.
///
/// Defaults are rendered as strings; arrays and objects are serialized as JSON.
pub fn translate_parameters(properties: &Value, ctx: &mut TranslationContext) -> Vec<PipelineParameter> {
    let Some(parameters) = properties.get("parameters").and_then(Value::as_object) else {
        return Vec::new();
    };
    parameters
        .iter()
        .map(|(name, definition)| {
            let default = match definition.get("defaultValue") {
                Some(value) if !value.is_null() => stringify(value),
                _ => {
                    ctx.warn(
                        format!("parameters.{}", name),
                        format!("Parameter '{}' has no default value; using an empty string", name),
                    );
                    String::new()
                }
            };
            PipelineParameter {
                name: name.clone(),
                default,
            }
        })
        .collect()
}
