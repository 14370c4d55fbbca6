//! Builtin variables that are always available to query templates.
//!
//! Dashboard builtins (`__dashboard`, `__project`) describe where a query runs;
//! time-range builtins (`__from`, `__to`, `__range*`) describe the selected window.

use super::substitution::{VariableState, VariableStateMap};
use crate::utils::error::VariableError;
use chrono::{DateTime, Utc};
use log::debug;

/// A builtin variable with its resolved value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinVariable {
    pub name: String,
    pub description: String,
    /// Where the variable comes from, e.g. "Dashboard" or "Time range"
    pub source: String,
    pub value: String,
}

impl BuiltinVariable {
    fn new(name: &str, description: &str, source: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            source: source.to_string(),
            value: value.into(),
        }
    }
}

/// Absolute time window selected for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// # Errors
    /// * `VariableError::InvalidTimeRange` - `end` is before `start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, VariableError> {
        if end < start {
            return Err(VariableError::InvalidTimeRange(format!(
                "end {} is before start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds from RFC 3339 strings
    pub fn parse(start: &str, end: &str) -> Result<Self, VariableError> {
        let parse = |raw: &str| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| VariableError::InvalidTimeRange(format!("{:?}: {}", raw, e)))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}

/// `__dashboard` and `__project` for the dashboard a query belongs to
pub fn dashboard_builtins(project: &str, dashboard: &str) -> Vec<BuiltinVariable> {
    vec![
        BuiltinVariable::new(
            "__dashboard",
            "The name of the current dashboard",
            "Dashboard",
            dashboard,
        ),
        BuiltinVariable::new(
            "__project",
            "The name of the current dashboard project",
            "Dashboard",
            project,
        ),
    ]
}

/// Time-range builtins derived from the selected window
pub fn time_range_builtins(range: &TimeRange) -> Vec<BuiltinVariable> {
    let range_ms = range.duration_ms();
    let range_s = range_ms / 1000;

    vec![
        BuiltinVariable::new(
            "__from",
            "Start of the time range, in unix milliseconds",
            "Time range",
            range.start.timestamp_millis().to_string(),
        ),
        BuiltinVariable::new(
            "__to",
            "End of the time range, in unix milliseconds",
            "Time range",
            range.end.timestamp_millis().to_string(),
        ),
        BuiltinVariable::new(
            "__range",
            "Duration of the time range, as a duration literal",
            "Time range",
            format!("{}s", range_s),
        ),
        BuiltinVariable::new(
            "__range_s",
            "Duration of the time range, in seconds",
            "Time range",
            range_s.to_string(),
        ),
        BuiltinVariable::new(
            "__range_ms",
            "Duration of the time range, in milliseconds",
            "Time range",
            range_ms.to_string(),
        ),
    ]
}

/// Builtins as a state map, none of them loading
pub fn builtin_state_map(builtins: &[BuiltinVariable]) -> VariableStateMap {
    builtins
        .iter()
        .map(|b| (b.name.clone(), VariableState::new(b.value.clone())))
        .collect()
}

/// Merge builtins under user variables; a user variable wins on a name clash
pub fn with_builtins(user: &VariableStateMap, builtins: &[BuiltinVariable]) -> VariableStateMap {
    let mut merged = builtin_state_map(builtins);
    for (name, state) in user {
        if merged.contains_key(name) {
            debug!("user variable {} shadows a builtin", name);
        }
        merged.insert(name.clone(), state.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::substitution::VariableValue;

    #[test]
    fn test_time_range_rejects_reversed() {
        let result = TimeRange::parse("2024-01-01T01:00:00Z", "2024-01-01T00:00:00Z");
        assert!(matches!(result, Err(VariableError::InvalidTimeRange(_))));
    }

    #[test]
    fn test_time_range_rejects_garbage() {
        assert!(TimeRange::parse("yesterday", "2024-01-01T00:00:00Z").is_err());
    }

    #[test]
    fn test_user_variable_wins() {
        let mut user = VariableStateMap::new();
        user.insert("__project".to_string(), VariableState::new("mine"));

        let merged = with_builtins(&user, &dashboard_builtins("perses", "overview"));
        assert_eq!(merged["__project"].value, Some(VariableValue::from("mine")));
        assert_eq!(merged["__dashboard"].value, Some(VariableValue::from("overview")));
    }
}
