use crate::core::ir::{ActivityKind, NotebookActivity, Translation, UnsupportedValue};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::expression::translate_value;
use crate::core::translator::values::{expression_text, stringify};
use indexmap::IndexMap;
use serde_json::Value;

pub(super) fn translate_notebook(
    payload: &Value,
    ctx: &mut TranslationContext,
) -> Translation<ActivityKind> {
    let type_properties = payload.get("typeProperties").unwrap_or(&Value::Null);
    let notebook_path = type_properties
        .get("notebookPath")
        .and_then(expression_text)
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .ok_or_else(|| {
            UnsupportedValue::new(payload.clone(), "Missing property 'notebookPath'")
        })?;
    let notebook_path = translate_value(notebook_path).ok_or_else(|| {
        UnsupportedValue::new(
            payload.clone(),
            format!("Unsupported notebook path expression '{}'", notebook_path),
        )
    })?;

    Ok(ActivityKind::Notebook(NotebookActivity {
        notebook_path,
        base_parameters: base_parameters(type_properties, ctx),
        placeholder: None,
    }))
}

/// Notebook parameters with expressions rewritten into job parameter references.
///
/// A parameter whose expression cannot be rewritten keeps its name with an empty value.
fn base_parameters(type_properties: &Value, ctx: &mut TranslationContext) -> IndexMap<String, String> {
    let Some(parameters) = type_properties
        .get("baseParameters")
        .and_then(Value::as_object)
    else {
        return IndexMap::new();
    };

    let mut translated = IndexMap::new();
    for (name, value) in parameters {
        let rendered = match expression_text(value) {
            Some(text) => translate_value(text).unwrap_or_else(|| {
                ctx.warn(
                    format!("baseParameters.{}", name),
                    format!("Unsupported expression '{}'", text),
                );
                String::new()
            }),
            None => stringify(value),
        };
        translated.insert(name.clone(), rendered);
    }
    translated
}
