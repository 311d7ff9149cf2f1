use crate::core::ir::{
    ActivityKind, SparkJarActivity, SparkPythonActivity, Translation, UnsupportedValue,
};
use crate::core::translator::values::{array_field, expression_text, stringify};
use serde_json::Value;

pub(super) fn translate_spark_jar(payload: &Value) -> Translation<ActivityKind> {
    let type_properties = payload.get("typeProperties").unwrap_or(&Value::Null);
    let main_class_name = required_text(payload, type_properties, "mainClassName")?;
    Ok(ActivityKind::SparkJar(SparkJarActivity {
        main_class_name,
        parameters: parameters(type_properties),
    }))
}

pub(super) fn translate_spark_python(payload: &Value) -> Translation<ActivityKind> {
    let type_properties = payload.get("typeProperties").unwrap_or(&Value::Null);
    let python_file = required_text(payload, type_properties, "pythonFile")?;
    Ok(ActivityKind::SparkPython(SparkPythonActivity {
        python_file,
        parameters: parameters(type_properties),
    }))
}

fn required_text(payload: &Value, type_properties: &Value, key: &str) -> Translation<String> {
    type_properties
        .get(key)
        .and_then(expression_text)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UnsupportedValue::new(payload.clone(), format!("Missing property '{}'", key)))
}

fn parameters(type_properties: &Value) -> Vec<String> {
    array_field(type_properties, "parameters")
        .iter()
        .map(|value| expression_text(value).map(str::to_string).unwrap_or_else(|| stringify(value)))
        .collect()
}
