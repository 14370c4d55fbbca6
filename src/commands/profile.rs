//! Profile command implementation.
//!
//! The profile command:
//! 1. Reads a Pyroscope response file
//! 2. Builds the flamegraph tree
//! 3. Optionally focuses on one frame
//! 4. Prints a summary and/or writes the table rows

use super::models::ProfileArgs;
use crate::flamegraph::{
    build_profile, find_total, focus_on, generate_text_summary, table_rows, ProfileData,
};
use crate::output::{read_json_value, write_json};
use crate::parser::parse_profile_response;
use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};

/// Validate profile arguments before doing any work
pub fn validate_profile_args(args: &ProfileArgs) -> Result<()> {
    if !args.input.is_file() {
        bail!("Profile file not found: {}", args.input.display());
    }
    // The search only filters the table rows, which are written to --output
    if !args.search.trim().is_empty() && args.output.is_none() {
        bail!("--search filters the table output: pass an output path as well");
    }
    Ok(())
}

/// Execute the profile command
///
/// **Public** - main entry point called from main.rs
pub fn execute_profile(args: &ProfileArgs) -> Result<ProfileData> {
    info!("Step 1/3: Reading profile from {}", args.input.display());
    let raw = read_json_value(&args.input).context("Failed to read profile file")?;
    let response = parse_profile_response(&raw).context("Failed to parse profile payload")?;

    info!("Step 2/3: Building flamegraph tree...");
    let mut profile = build_profile(&response).context("Failed to build profile tree")?;

    let Some(root) = profile.root.take() else {
        info!("Profile is empty, nothing to summarize");
        return Ok(profile);
    };

    let root = match args.focus {
        Some(id) => {
            debug!("Focusing on node {}", id);
            if find_total(&root, id).is_none() {
                return Err(anyhow!("Node {} does not exist in this profile", id));
            }
            focus_on(&root, id)
        }
        None => root,
    };

    info!("Step 3/3: Writing output...");
    println!("{}", generate_text_summary(&root, args.top, &profile.metadata.units));

    if let Some(output) = &args.output {
        let rows = table_rows(&root, &args.search);
        write_json(&rows, output).context("Failed to write profile table")?;
        info!("✓ {} table rows written to: {}", rows.len(), output.display());
    }

    profile.root = Some(root);
    Ok(profile)
}
