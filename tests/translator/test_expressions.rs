use flowport::core::ir::ConditionOperator;
use flowport::core::translator::expression::{
    parse_condition, parse_items, translate_reference, translate_value,
};

#[test]
fn test_parameter_and_system_references() {
    assert_eq!(
        translate_reference("@pipeline().parameters.run_date").as_deref(),
        Some("{{job.parameters.run_date}}")
    );
    assert_eq!(
        translate_reference("pipeline().RunId").as_deref(),
        Some("{{job.run_id}}")
    );
    assert_eq!(
        translate_reference("@pipeline().Pipeline").as_deref(),
        Some("{{job.name}}")
    );
    assert_eq!(
        translate_reference("@pipeline().TriggerTime").as_deref(),
        Some("{{job.trigger.time.iso_datetime}}")
    );
    assert_eq!(translate_reference("@pipeline().DataFactory"), None);
}

#[test]
fn test_item_references() {
    assert_eq!(translate_reference("@item()").as_deref(), Some("{{input}}"));
    assert_eq!(
        translate_reference("@item().region.code").as_deref(),
        Some("{{input.region.code}}")
    );
}

#[test]
fn test_plain_values_pass_through() {
    assert_eq!(translate_value("full").as_deref(), Some("full"));
    assert_eq!(translate_value("  spaced  ").as_deref(), Some("  spaced  "));
    assert_eq!(translate_value("@@escaped").as_deref(), Some("@escaped"));
}

#[test]
fn test_whole_value_and_interpolated_expressions() {
    assert_eq!(
        translate_value("@pipeline().parameters.env").as_deref(),
        Some("{{job.parameters.env}}")
    );
    assert_eq!(
        translate_value("/landing/@{pipeline().parameters.env}/@{item()}").as_deref(),
        Some("/landing/{{job.parameters.env}}/{{input}}")
    );
}

#[test]
fn test_unknown_functions_are_not_translated() {
    assert_eq!(translate_value("@concat('a', 'b')"), None);
    assert_eq!(translate_value("@variables('folder')"), None);
    assert_eq!(translate_value("/data/@{utcnow()}/x"), None);
}

#[test]
fn test_items_from_create_array() {
    assert_eq!(
        parse_items("@createArray(1,2,3)").as_deref(),
        Some(r#"["1","2","3"]"#)
    );
    assert_eq!(
        parse_items("@createArray('east', 'west')").as_deref(),
        Some(r#"["east","west"]"#)
    );
}

#[test]
fn test_items_from_array_literal_and_reference() {
    assert_eq!(
        parse_items("@array('a, b ,c')").as_deref(),
        Some(r#"["a","b","c"]"#)
    );
    assert_eq!(
        parse_items("@pipeline().parameters.regions").as_deref(),
        Some("{{job.parameters.regions}}")
    );
}

#[test]
fn test_items_without_marker_are_unchanged() {
    assert_eq!(parse_items(r#"["x","y"]"#).as_deref(), Some(r#"["x","y"]"#));
}

#[test]
fn test_unsupported_items() {
    assert_eq!(parse_items("@activity('Lookup').output.value"), None);
    assert_eq!(parse_items("@array(pipeline().parameters.list)"), None);
}

#[test]
fn test_comparisons() {
    let equals = parse_condition("@equals(pipeline().parameters.mode, 'full')").unwrap();
    assert_eq!(equals.op, ConditionOperator::EqualTo);
    assert_eq!(equals.left, "{{job.parameters.mode}}");
    assert_eq!(equals.right, "full");

    let greater = parse_condition("@greaterOrEquals(item().count, 10)").unwrap();
    assert_eq!(greater.op, ConditionOperator::GreaterThanOrEqual);
    assert_eq!(greater.left, "{{input.count}}");
    assert_eq!(greater.right, "10");

    let less = parse_condition("@less(1, 2)").unwrap();
    assert_eq!(less.op, ConditionOperator::LessThan);
}

#[test]
fn test_negated_equality() {
    let negated = parse_condition("@not(equals(pipeline().parameters.env, 'prod'))").unwrap();
    assert_eq!(negated.op, ConditionOperator::NotEqual);
    assert_eq!(negated.left, "{{job.parameters.env}}");
    assert_eq!(negated.right, "prod");
    assert_eq!(negated.op.to_string(), "NOT_EQUAL");
}

#[test]
fn test_unsupported_conditions() {
    assert!(parse_condition("@and(equals(1, 1), equals(2, 2))").is_none());
    assert!(parse_condition("@not(greater(1, 2))").is_none());
    assert!(parse_condition("@equals(1)").is_none());
    assert!(parse_condition("@contains('abc', 'a')").is_none());
}
