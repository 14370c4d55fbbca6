//! Flamegraph trees built from Pyroscope profiles.
//!
//! This module converts flamebearer responses into a frame tree and
//! provides the focus/search/table views used to inspect it.

pub mod filter;
pub mod profile;

// Re-export main types
pub use filter::{
    find_total, focus_on, generate_text_summary, matches_search, percentage, table_rows,
    ProfileTableRow,
};
pub use profile::{build_profile, ProfileData, ProfileNode};
