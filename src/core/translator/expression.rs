//! Parser for the expression language embedded in pipeline payload strings.
//!
//! Only the shapes that have a counterpart in the target scheduler are recognized. Everything
//! else yields `None` and the caller decides whether that is a soft or hard failure.

use crate::core::ir::ConditionOperator;
use regex::Regex;
use std::sync::LazyLock;

const EXPRESSION_MARKER: char = '@';

static PARAMETER_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pipeline\(\)\.parameters\.([A-Za-z_][A-Za-z0-9_]*)$")
        .expect("valid parameter reference regex")
});

static SYSTEM_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pipeline\(\)\.([A-Za-z]+)$").expect("valid system variable regex")
});

static ITEM_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^item\(\)(?:\.([A-Za-z_][A-Za-z0-9_.]*))?$").expect("valid item reference regex")
});

static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\{([^}]*)\}").expect("valid interpolation regex"));

/// A function call `name(arg, ...)` with its arguments as raw, trimmed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<'a> {
    pub name: &'a str,
    pub args: Vec<&'a str>,
}

/// Parsed comparison of a conditional activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub op: ConditionOperator,
    pub left: String,
    pub right: String,
}

/// Parse `name(args)` where the closing parenthesis of the argument list ends the text.
pub fn parse_call(text: &str) -> Option<Call<'_>> {
    let text = text.trim();
    let open = text.find('(')?;
    let name = text[..open].trim();
    if !is_identifier(name) || !text.ends_with(')') {
        return None;
    }

    let inner_start = open + 1;
    let inner_end = text.len() - 1;
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut arg_start = inner_start;

    for (offset, ch) in text[inner_start..].char_indices() {
        let index = inner_start + offset;
        if let Some(open_quote) = quote {
            if ch == open_quote {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' => depth += 1,
            ')' if depth == 0 => {
                // The outer call must close exactly at the end of the text.
                if index != inner_end {
                    return None;
                }
            }
            ')' => depth -= 1,
            ',' if depth == 0 => {
                args.push(text[arg_start..index].trim());
                arg_start = index + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() || depth != 0 {
        return None;
    }

    let last = text[arg_start..inner_end].trim();
    if !last.is_empty() || !args.is_empty() {
        args.push(last);
    }
    Some(Call { name, args })
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn strip_marker(expression: &str) -> &str {
    let trimmed = expression.trim();
    trimmed.strip_prefix(EXPRESSION_MARKER).unwrap_or(trimmed)
}

/// Remove one level of matching quotes; doubled single quotes inside unescape to one.
pub fn unquote(text: &str) -> String {
    let text = text.trim();
    for quote in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let inner = &text[1..text.len() - 1];
            return if quote == '\'' {
                inner.replace("''", "'")
            } else {
                inner.to_string()
            };
        }
    }
    text.to_string()
}

/// Parse a comparison such as `@equals(a, b)` or `@not(equals(a, b))`.
pub fn parse_condition(expression: &str) -> Option<Comparison> {
    let call = parse_call(strip_marker(expression))?;
    let name = call.name.to_ascii_lowercase();

    let (op, args) = if name == "not" {
        let [negated] = call.args.as_slice() else {
            return None;
        };
        let inner = parse_call(negated)?;
        if !inner.name.eq_ignore_ascii_case("equals") {
            return None;
        }
        (ConditionOperator::NotEqual, inner.args)
    } else {
        let op = match name.as_str() {
            "equals" => ConditionOperator::EqualTo,
            "greater" => ConditionOperator::GreaterThan,
            "greaterorequals" => ConditionOperator::GreaterThanOrEqual,
            "less" => ConditionOperator::LessThan,
            "lessorequals" => ConditionOperator::LessThanOrEqual,
            _ => return None,
        };
        (op, call.args)
    };

    let [left, right] = args.as_slice() else {
        return None;
    };
    Some(Comparison {
        op,
        left: operand(left),
        right: operand(right),
    })
}

fn operand(raw: &str) -> String {
    translate_reference(raw).unwrap_or_else(|| unquote(raw))
}

/// Translate the items of a loop into a serialized list or a scheduler reference.
///
/// Text without the expression marker is taken as already understood by the target scheduler
/// and returned unchanged.
pub fn parse_items(expression: &str) -> Option<String> {
    let trimmed = expression.trim();
    if !trimmed.starts_with(EXPRESSION_MARKER) {
        return Some(expression.to_string());
    }
    let body = strip_marker(trimmed);

    if let Some(reference) = translate_reference(body) {
        return Some(reference);
    }

    let call = parse_call(body)?;
    let items: Vec<String> = if call.name.eq_ignore_ascii_case("createArray") {
        call.args.iter().map(|arg| unquote(arg)).collect()
    } else if call.name.eq_ignore_ascii_case("array") {
        let [literal] = call.args.as_slice() else {
            return None;
        };
        if !literal.starts_with('\'') {
            return None;
        }
        unquote(literal)
            .split(',')
            .map(|item| item.trim().to_string())
            .collect()
    } else {
        return None;
    };
    serde_json::to_string(&items).ok()
}

/// Rewrite a single reference (with or without the marker) into the scheduler's
/// `{{...}}` dynamic value syntax.
pub fn translate_reference(text: &str) -> Option<String> {
    let body = strip_marker(text);
    if let Some(captures) = PARAMETER_REF.captures(body) {
        return Some(format!("{{{{job.parameters.{}}}}}", &captures[1]));
    }
    if let Some(captures) = ITEM_REF.captures(body) {
        return Some(match captures.get(1) {
            Some(field) => format!("{{{{input.{}}}}}", field.as_str()),
            None => "{{input}}".to_string(),
        });
    }
    if let Some(captures) = SYSTEM_REF.captures(body) {
        let target = match &captures[1] {
            "Pipeline" => "job.name",
            "RunId" => "job.run_id",
            "TriggerTime" => "job.trigger.time.iso_datetime",
            "TriggerType" => "job.trigger.type",
            _ => return None,
        };
        return Some(format!("{{{{{}}}}}", target));
    }
    None
}

/// Translate a parameter value: plain text passes through, a whole-value expression or
/// `@{...}` interpolations are rewritten. `None` when any embedded expression is unknown.
pub fn translate_value(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("@@") {
        return Some(trimmed[1..].to_string());
    }
    if trimmed.starts_with(EXPRESSION_MARKER) && !trimmed.starts_with("@{") {
        return translate_reference(trimmed);
    }
    if !text.contains("@{") {
        return Some(text.to_string());
    }

    let mut failed = false;
    let rendered = INTERPOLATION.replace_all(text, |captures: &regex::Captures<'_>| {
        match translate_reference(captures[1].trim()) {
            Some(reference) => reference,
            None => {
                failed = true;
                captures[0].to_string()
            }
        }
    });
    (!failed).then(|| rendered.into_owned())
}
