//! Substitute and vars command implementations.

use super::models::SubstituteArgs;
use crate::output::read_json_value;
use crate::utils::error::VariableError;
use crate::variables::{
    dashboard_builtins, parse_variables, replace_variables_with, time_range_builtins,
    with_builtins, SubstitutionOptions, TimeRange, VariableState, VariableStateMap, VariableValue,
};
use anyhow::{Context, Result};
use log::{debug, warn};

/// Parse a `name=value` or `name=a,b` binding
///
/// # Errors
/// * `VariableError::InvalidBinding` - no `=` or an empty name
pub fn parse_binding(binding: &str) -> Result<(String, VariableValue), VariableError> {
    let (name, raw) = binding
        .split_once('=')
        .ok_or_else(|| VariableError::InvalidBinding(format!("expected name=value, got {:?}", binding)))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(VariableError::InvalidBinding(format!(
            "empty variable name in {:?}",
            binding
        )));
    }

    let value = if raw.contains(',') {
        VariableValue::List(raw.split(',').map(str::to_string).collect())
    } else {
        VariableValue::Single(raw.to_string())
    };

    Ok((name.to_string(), value))
}

/// Assemble the variable state from a state file, bindings and builtins
pub fn build_state(args: &SubstituteArgs) -> Result<VariableStateMap> {
    let mut state: VariableStateMap = match &args.vars_file {
        Some(path) => {
            let raw = read_json_value(path).context("Failed to read variables file")?;
            serde_json::from_value(raw).context("Variables file is not a variable state map")?
        }
        None => VariableStateMap::new(),
    };

    // Command-line bindings override the file
    for binding in &args.bindings {
        let (name, value) = parse_binding(binding)?;
        debug!("binding {} = {:?}", name, value);
        state.insert(name, VariableState::new(value));
    }

    let mut builtins = Vec::new();
    if args.project.is_some() || args.dashboard.is_some() {
        builtins.extend(dashboard_builtins(
            args.project.as_deref().unwrap_or_default(),
            args.dashboard.as_deref().unwrap_or_default(),
        ));
    }
    match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            let range = TimeRange::parse(from, to)?;
            builtins.extend(time_range_builtins(&range));
        }
        (None, None) => {}
        _ => warn!("Both --from and --to are needed for time-range variables, ignoring"),
    }

    Ok(with_builtins(&state, &builtins))
}

/// Execute the substitute command, returning the expanded template
///
/// **Public** - main entry point called from main.rs
pub fn execute_substitute(args: &SubstituteArgs) -> Result<String> {
    let state = build_state(args)?;
    let options = SubstitutionOptions {
        escape_list_values: args.escape,
    };

    let result = replace_variables_with(&args.template, &state, options);

    let unresolved: Vec<String> = parse_variables(&result)
        .into_iter()
        .filter(|name| state.get(name).and_then(|s| s.value.as_ref()).is_none())
        .collect();
    if !unresolved.is_empty() {
        warn!("Unresolved variables left in template: {}", unresolved.join(", "));
    }

    Ok(result)
}

/// Execute the vars command: list referenced variable names
pub fn execute_vars(template: &str) -> Vec<String> {
    parse_variables(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding_single() {
        let (name, value) = parse_binding("job=api").unwrap();
        assert_eq!(name, "job");
        assert_eq!(value, VariableValue::from("api"));
    }

    #[test]
    fn test_parse_binding_list() {
        let (_, value) = parse_binding("instance=a,b").unwrap();
        assert_eq!(value, VariableValue::List(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_parse_binding_errors() {
        assert!(parse_binding("novalue").is_err());
        assert!(parse_binding("=value").is_err());
    }

    #[test]
    fn test_value_may_contain_equals() {
        let (_, value) = parse_binding("selector=a=b").unwrap();
        assert_eq!(value, VariableValue::from("a=b"));
    }
}
