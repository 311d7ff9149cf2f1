use crate::core::ir::{ActivityKind, CopyActivity, Dataset, Translation, UnsupportedValue};
use crate::core::translator::context::TranslationContext;
use crate::core::translator::dataset_properties::{
    translate_column_mappings, translate_dataset_properties,
};
use crate::core::translator::datasets::translate_dataset;
use crate::core::translator::values::array_field;
use serde_json::Value;

/// Translate a copy activity whose input and output datasets have been inlined.
///
/// Every problem with the datasets or the source/sink blocks is collected; the activity is
/// unsupported when any is found.
pub(super) fn translate_copy(
    payload: &Value,
    ctx: &mut TranslationContext,
) -> Translation<ActivityKind> {
    let type_properties = payload.get("typeProperties").unwrap_or(&Value::Null);
    let mut problems = Vec::new();

    let source_dataset = dataset(payload, "inputDatasetDefinitions", "source", ctx)
        .map_err(|problem| problems.push(problem))
        .ok();
    let sink_dataset = dataset(payload, "outputDatasetDefinitions", "sink", ctx)
        .map_err(|problem| problems.push(problem))
        .ok();
    let source_properties = translate_dataset_properties(type_properties.get("source"), "source", ctx)
        .map_err(|problem| problems.push(problem))
        .ok();
    let sink_properties = translate_dataset_properties(type_properties.get("sink"), "sink", ctx)
        .map_err(|problem| problems.push(problem))
        .ok();

    if let Some(unsupported) = UnsupportedValue::merge(payload.clone(), problems) {
        return Err(unsupported);
    }
    let (Some(source_dataset), Some(sink_dataset), Some(source_properties), Some(sink_properties)) =
        (source_dataset, sink_dataset, source_properties, sink_properties)
    else {
        return Err(UnsupportedValue::new(payload.clone(), "Incomplete copy activity"));
    };

    let column_mapping = translate_column_mappings(
        type_properties.get("translator"),
        sink_dataset.type_tag(),
        ctx,
    );

    Ok(ActivityKind::Copy(CopyActivity {
        source_dataset,
        sink_dataset,
        source_properties,
        sink_properties,
        column_mapping,
    }))
}

fn dataset(
    payload: &Value,
    key: &str,
    role: &str,
    ctx: &mut TranslationContext,
) -> Translation<Dataset> {
    let definition = array_field(payload, key).first().ok_or_else(|| {
        UnsupportedValue::new(Value::Null, format!("Missing {} dataset definition", role))
    })?;
    match translate_dataset(definition, ctx) {
        Ok(Dataset::Unsupported(dataset)) => Err(UnsupportedValue::new(
            definition.clone(),
            format!(
                "Unsupported {} dataset '{}': {}",
                role, dataset.name, dataset.unsupported.message
            ),
        )),
        Ok(dataset) => Ok(dataset),
        Err(err) => Err(UnsupportedValue::new(
            definition.clone(),
            format!("Invalid {} dataset: {}", role, err.message),
        )),
    }
}
