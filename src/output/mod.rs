//! Output writers and serialized document schema.
//!
//! This module handles:
//! - Reading JSON payloads from disk
//! - Writing trace trees and profile tables as JSON
//! - Rendering trace trees as indented text

pub mod json;
pub mod schema;
pub mod text;

// Re-export main functions
pub use json::{read_json_value, validate_path, write_json};
pub use schema::{SpanNode, TreeDocument};
pub use text::render_trace;
