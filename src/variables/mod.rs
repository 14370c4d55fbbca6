//! Query template variables.
//!
//! This module handles:
//! - Finding `$name` / `${name}` references in a template
//! - Substituting bound values, lists rendered as regex alternations
//! - Builtin dashboard and time-range variables

pub mod builtin;
pub mod parser;
pub mod substitution;

// Re-export main types and functions
pub use builtin::{
    builtin_state_map, dashboard_builtins, time_range_builtins, with_builtins, BuiltinVariable,
    TimeRange,
};
pub use parser::parse_variables;
pub use substitution::{
    replace_variable, replace_variable_with, replace_variables, replace_variables_with,
    SubstitutionOptions, VariableState, VariableStateMap, VariableValue,
};
