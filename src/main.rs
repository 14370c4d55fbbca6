//! Perses Trace CLI
//!
//! Inspect trace and profile payloads and expand query templates
//! the way Perses panels do.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use perses_trace::commands::{
    execute_profile, execute_substitute, execute_tree, execute_vars, validate_profile_args,
    validate_tree_args, ProfileArgs, SubstituteArgs, TreeArgs,
};
use perses_trace::utils::config::{DEFAULT_TOP_NODES, SCHEMA_VERSION};

/// Perses Trace - trace trees, flamegraphs and query variables
#[derive(Parser, Debug)]
#[command(name = "perses-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build and print the span tree of an OTLP/JSON trace
    Tree {
        /// Path to the trace JSON file
        #[arg(short, long, env = "PERSES_TRACE_FILE")]
        file: PathBuf,

        /// Output path for the serialized tree (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Deepest level to include, roots are level 0
        #[arg(long)]
        max_depth: Option<usize>,

        /// Do not print the gantt listing
        #[arg(long)]
        quiet: bool,
    },

    /// List the variables referenced by a template
    Vars {
        /// Query template
        #[arg(short, long)]
        template: String,
    },

    /// Expand variables in a template
    Substitute {
        /// Query template
        #[arg(short, long)]
        template: String,

        /// Variable binding, `name=value` or `name=a,b` for a list
        #[arg(long = "var")]
        vars: Vec<String>,

        /// JSON file with a variable state map
        #[arg(long)]
        vars_file: Option<PathBuf>,

        /// Escape regex metacharacters in list values
        #[arg(long)]
        escape: bool,

        /// Project name for `$__project`
        #[arg(long, env = "PERSES_PROJECT")]
        project: Option<String>,

        /// Dashboard name for `$__dashboard`
        #[arg(long, env = "PERSES_DASHBOARD")]
        dashboard: Option<String>,

        /// Start of the time range (RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// End of the time range (RFC 3339)
        #[arg(long)]
        to: Option<String>,
    },

    /// Build a flamegraph tree from a Pyroscope profile
    Profile {
        /// Path to the profile JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Node id to focus on
        #[arg(long)]
        focus: Option<u64>,

        /// Free-text filter for the table output
        #[arg(long, default_value = "")]
        search: String,

        /// Number of functions in the summary
        #[arg(long, default_value_t = DEFAULT_TOP_NODES)]
        top: usize,

        /// Output path for the table rows (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Tree {
            file,
            output,
            max_depth,
            quiet,
        } => {
            let args = TreeArgs {
                input: file,
                output,
                max_depth,
                print_tree: !quiet,
            };

            validate_tree_args(&args)?;
            execute_tree(args)?;
        }

        Commands::Vars { template } => {
            for name in execute_vars(&template) {
                println!("{}", name);
            }
        }

        Commands::Substitute {
            template,
            vars,
            vars_file,
            escape,
            project,
            dashboard,
            from,
            to,
        } => {
            let args = SubstituteArgs {
                template,
                bindings: vars,
                vars_file,
                escape,
                project,
                dashboard,
                from,
                to,
            };

            println!("{}", execute_substitute(&args)?);
        }

        Commands::Profile {
            file,
            focus,
            search,
            top,
            output,
        } => {
            let args = ProfileArgs {
                input: file,
                focus,
                search,
                top,
                output,
            };

            validate_profile_args(&args)?;
            execute_profile(&args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Perses Trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Tree Schema: v{}", SCHEMA_VERSION);
}
