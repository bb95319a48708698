//! Filter expressions in the backend's boolean mini-language.
//!
//! Conditions look like `attribute:operator:value` or `attribute:=[v1,v2]` and are joined by
//! [`FILTER_SEPARATOR`]. Conditions on the sub-attributes of a repeated field must be grouped as
//! `field.{a && b}`, otherwise the backend may satisfy each of them with a different element of
//! the array.

use std::collections::BTreeSet;

use crate::search_const::FILTER_SEPARATOR;
use crate::search_query::NumericOperator;
use crate::search_result::FacetOriginalValue;


/// Attribute path of an atomic condition: everything before the first `:`.
pub fn attribute_path(condition: &str) -> &str {
    condition.split_once(':').map_or(condition, |(path, _)| path)
}

/// Splits on [`FILTER_SEPARATOR`] outside backtick-quoted values and outside `field.{…}` groups,
/// so a value may contain ` && ` and an already grouped condition stays whole.
pub fn split_conditions(expression: &str) -> Vec<&str> {
    let bytes = expression.as_bytes();
    let separator = FILTER_SEPARATOR.as_bytes();
    let mut conditions = Vec::new();
    let mut quoted = false;
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'`' => quoted = !quoted,
            b'{' if !quoted => depth += 1,
            b'}' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
        if !quoted && depth == 0 && bytes[i..].starts_with(separator) {
            conditions.push(&expression[start..i]);
            i += separator.len();
            start = i;
            continue;
        }
        i += 1;
    }
    conditions.push(&expression[start..]);
    conditions
}

/// Scopes every condition on `nested_field.*` into a single grouped condition.
///
/// Outer conditions come first in their original order, followed by the nested ones. A single
/// nested condition is left unbracketed.
pub fn merge(nested_field: &str, expression: &str) -> String {
    if expression.is_empty() {
        return String::new();
    }
    let prefix = format!("{nested_field}.");
    let (inner, mut outer): (Vec<&str>, Vec<&str>) = split_conditions(expression)
        .into_iter()
        .partition(|condition| attribute_path(condition).starts_with(&prefix));

    match inner.len() {
        0 => outer.join(FILTER_SEPARATOR),
        1 => {
            outer.extend(inner);
            outer.join(FILTER_SEPARATOR)
        }
        _ => {
            let stripped = inner
                .iter()
                .map(|condition| &condition[prefix.len()..])
                .collect::<Vec<_>>()
                .join(FILTER_SEPARATOR);
            let grouped = format!("{nested_field}.{{{stripped}}}");
            outer.push(&grouped);
            outer.join(FILTER_SEPARATOR)
        }
    }
}

/// Applies [`merge`] for each repeated field in turn.
pub fn merge_all<'a>(nested_fields: impl IntoIterator<Item = &'a str>, expression: &str) -> String {
    nested_fields.into_iter().fold(expression.to_string(), |expression, field| merge(field, &expression))
}

/// `attribute:=[`a`,`b`]`; strings are backtick-quoted, integers are left bare.
pub fn membership_condition(attribute: &str, values: &BTreeSet<FacetOriginalValue>) -> String {
    let values_str = values
        .iter()
        .map(|value| match value {
            // backticks cannot be escaped inside a quoted value
            FacetOriginalValue::String(s) => format!("`{}`", s.replace('`', "")),
            FacetOriginalValue::Int(i) => i.to_string(),
        })
        .collect::<Vec<String>>()
        .join(",");
    format!("{attribute}:=[{values_str}]")
}

pub fn numeric_condition(attribute: &str, operator: NumericOperator, value: i64) -> String {
    format!("{attribute}:{}{value}", operator.as_str())
}

pub fn join_conditions<S: AsRef<str>>(conditions: &[S]) -> String {
    conditions
        .iter()
        .map(AsRef::as_ref)
        .filter(|condition| !condition.is_empty())
        .collect::<Vec<_>>()
        .join(FILTER_SEPARATOR)
}
