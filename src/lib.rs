//! Perses Trace
//!
//! Data transforms behind Perses trace, profile and query views:
//! - building a parent-linked span tree from an OTLP trace payload
//! - building a flamegraph tree from a Pyroscope profile
//! - expanding `$name` / `${name}` variables inside query templates
//!
//! This crate also provides the `perses-trace` CLI.
//!
//! ## Getting Started
//!
//! ```bash
//! perses-trace tree --file trace.json
//! perses-trace substitute --template 'up{job=~"$job"}' --var job=api,web
//! ```

pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod tree;
pub mod utils;
pub mod variables;
