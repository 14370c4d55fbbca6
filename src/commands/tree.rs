//! Tree command implementation.
//!
//! The tree command:
//! 1. Reads an OTLP/JSON trace file
//! 2. Parses and validates the payload
//! 3. Builds the span tree
//! 4. Prints the gantt listing and/or writes the serialized tree

use super::models::TreeArgs;
use crate::output::{read_json_value, render_trace, write_json, TreeDocument};
use crate::parser::parse_trace_payload;
use crate::tree::{build_trace, format_duration, Trace};
use anyhow::{bail, Context, Result};
use log::info;
use std::time::Instant;

/// Validate tree arguments before doing any work
pub fn validate_tree_args(args: &TreeArgs) -> Result<()> {
    if !args.input.is_file() {
        bail!("Trace file not found: {}", args.input.display());
    }
    if args.output.is_none() && !args.print_tree {
        bail!("Nothing to do: pass an output path or enable printing");
    }
    Ok(())
}

/// Execute the tree command
///
/// **Public** - main entry point called from main.rs
pub fn execute_tree(args: TreeArgs) -> Result<Trace> {
    let start_time = Instant::now();

    info!("Step 1/3: Reading trace from {}", args.input.display());
    let raw = read_json_value(&args.input).context("Failed to read trace file")?;

    info!("Step 2/3: Building span tree...");
    let payload = parse_trace_payload(&raw).context("Failed to parse trace payload")?;
    let trace = build_trace(payload);

    info!(
        "Trace has {} spans in {} root(s) across {} service(s), duration {}",
        trace.span_count(),
        trace.root_spans().len(),
        trace.service_names().len(),
        format_duration(trace.duration_ms())
    );

    info!("Step 3/3: Writing output...");
    if args.print_tree {
        println!("{}", render_trace(&trace, args.max_depth));
    }

    if let Some(output) = &args.output {
        let document = TreeDocument::from_trace(&trace, args.max_depth);
        write_json(&document, output).context("Failed to write tree JSON")?;
        info!("✓ Tree written to: {}", output.display());
    }

    info!("Tree completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(trace)
}
