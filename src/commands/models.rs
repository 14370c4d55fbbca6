use std::path::PathBuf;

use crate::utils::config::DEFAULT_TOP_NODES;

/// Arguments for the tree command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct TreeArgs {
    /// OTLP/JSON trace file
    pub input: PathBuf,

    /// Where to write the serialized tree (optional)
    pub output: Option<PathBuf>,

    /// Deepest level to print/serialize, roots are level 0
    pub max_depth: Option<usize>,

    /// Print the gantt listing to stdout
    pub print_tree: bool,
}

impl Default for TreeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("trace.json"),
            output: None,
            max_depth: None,
            print_tree: true,
        }
    }
}

/// Arguments for the substitute command
#[derive(Debug, Clone, Default)]
pub struct SubstituteArgs {
    /// Query template containing `$name` / `${name}` references
    pub template: String,

    /// Bindings in `name=value` or `name=a,b,c` form
    pub bindings: Vec<String>,

    /// JSON file with a variable state map (optional)
    pub vars_file: Option<PathBuf>,

    /// Escape regex metacharacters in list values
    pub escape: bool,

    pub project: Option<String>,
    pub dashboard: Option<String>,

    /// RFC 3339 bounds for the time-range builtins
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Arguments for the profile command
#[derive(Debug, Clone)]
pub struct ProfileArgs {
    /// Pyroscope response file
    pub input: PathBuf,

    /// Node id to focus on (optional)
    pub focus: Option<u64>,

    /// Free-text filter for the table rows
    pub search: String,

    /// Number of functions in the text summary
    pub top: usize,

    /// Where to write the table rows (optional)
    pub output: Option<PathBuf>,
}

impl Default for ProfileArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("profile.json"),
            focus: None,
            search: String::new(),
            top: DEFAULT_TOP_NODES,
            output: None,
        }
    }
}
