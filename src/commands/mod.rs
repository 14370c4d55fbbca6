//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod profile;
pub mod substitute;
pub mod tree;

// Re-export main command functions
pub use models::{ProfileArgs, SubstituteArgs, TreeArgs};
pub use profile::{execute_profile, validate_profile_args};
pub use substitute::{execute_substitute, execute_vars, parse_binding};
pub use tree::{execute_tree, validate_tree_args};
