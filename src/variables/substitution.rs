//! Substitute bound variable values into query templates.

use super::parser::parse_variables;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Value bound to a variable: one string, or a list rendered as `(a|b)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Single(String),
    List(Vec<String>),
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Single(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Single(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(values: Vec<String>) -> Self {
        VariableValue::List(values)
    }
}

/// Current state of one variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableState {
    /// `None` while the variable has no value yet
    #[serde(default)]
    pub value: Option<VariableValue>,

    #[serde(default)]
    pub loading: bool,
}

impl VariableState {
    pub fn new(value: impl Into<VariableValue>) -> Self {
        Self {
            value: Some(value.into()),
            loading: false,
        }
    }
}

/// Variable name -> state, owned by whoever resolves variables
pub type VariableStateMap = HashMap<String, VariableState>;

/// Knobs for how values are rendered into the template
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionOptions {
    /// Escape regex metacharacters in list elements before joining them
    pub escape_list_values: bool,
}

/// Replace every `$name` and `${name}` in `text` with `value`
///
/// # Example
/// ```
/// use perses_trace::variables::{replace_variable, VariableValue};
/// let value = VariableValue::List(vec!["world".into(), "w".into()]);
/// assert_eq!(replace_variable("hello $var1", "var1", &value), "hello (world|w)");
/// ```
pub fn replace_variable(text: &str, name: &str, value: &VariableValue) -> String {
    replace_variable_with(text, name, value, SubstitutionOptions::default())
}

pub fn replace_variable_with(
    text: &str,
    name: &str,
    value: &VariableValue,
    options: SubstitutionOptions,
) -> String {
    let replacement = render_value(value, options);
    text.replace(&format!("${}", name), &replacement)
        .replace(&format!("${{{}}}", name), &replacement)
}

/// Substitute every referenced variable that has a value in `state`
///
/// Variables without a value are left in the text untouched.
pub fn replace_variables(text: &str, state: &VariableStateMap) -> String {
    replace_variables_with(text, state, SubstitutionOptions::default())
}

pub fn replace_variables_with(
    text: &str,
    state: &VariableStateMap,
    options: SubstitutionOptions,
) -> String {
    let mut names = parse_variables(text);
    // Longest first so `$__range` cannot eat the front of `$__range_ms`.
    // The sort is stable: equal lengths keep their order of appearance.
    names.sort_by_key(|name| Reverse(name.len()));

    names.iter().fold(text.to_string(), |current, name| {
        match state.get(name).and_then(|s| s.value.as_ref()) {
            Some(value) => replace_variable_with(&current, name, value, options),
            None => current,
        }
    })
}

fn render_value(value: &VariableValue, options: SubstitutionOptions) -> String {
    match value {
        VariableValue::Single(s) => s.clone(),
        VariableValue::List(values) if options.escape_list_values => {
            let escaped: Vec<String> = values.iter().map(|v| regex::escape(v)).collect();
            format!("({})", escaped.join("|"))
        }
        VariableValue::List(values) => format!("({})", values.join("|")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_variable_all_occurrences() {
        let value = VariableValue::from("world");
        assert_eq!(replace_variable("hello $var1 $var1", "var1", &value), "hello world world");
        assert_eq!(replace_variable("hello ${var1}!", "var1", &value), "hello world!");
    }

    #[test]
    fn test_replace_list_escaped() {
        let value = VariableValue::List(vec!["a.b".to_string(), "c+".to_string()]);
        let options = SubstitutionOptions {
            escape_list_values: true,
        };
        assert_eq!(replace_variable_with("$x", "x", &value, options), r"(a\.b|c\+)");
        assert_eq!(replace_variable("$x", "x", &value), "(a.b|c+)");
    }

    #[test]
    fn test_empty_list() {
        let value = VariableValue::List(Vec::new());
        assert_eq!(replace_variable("$x", "x", &value), "()");
    }

    #[test]
    fn test_state_deserializes_both_shapes() {
        let state: VariableStateMap = serde_json::from_str(
            r#"{"a": {"value": "x", "loading": false}, "b": {"value": ["1", "2"], "loading": true}, "c": {"loading": true}}"#,
        )
        .unwrap();
        assert_eq!(state["a"].value, Some(VariableValue::from("x")));
        assert_eq!(
            state["b"].value,
            Some(VariableValue::List(vec!["1".to_string(), "2".to_string()]))
        );
        assert_eq!(state["c"].value, None);
    }
}
