//! Pyroscope profile response schema.
//!
//! Pyroscope returns profiles in the "flamebearer" format: a names table plus
//! one flat integer row per stack depth. Each row is a sequence of
//! `(offset, total, self, name index)` tuples; see `flamegraph::profile`.

use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};

/// Top-level response of a Pyroscope render query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub flamebearer: Flamebearer,

    #[serde(default)]
    pub metadata: ProfileMetadata,

    #[serde(default)]
    pub timeline: Timeline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flamebearer {
    #[serde(default)]
    pub names: Vec<String>,

    #[serde(default)]
    pub levels: Vec<Vec<u64>>,

    #[serde(default)]
    pub num_ticks: u64,

    #[serde(default)]
    pub max_self: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetadata {
    #[serde(default)]
    pub spy_name: String,

    #[serde(default)]
    pub sample_rate: u64,

    #[serde(default)]
    pub units: String,

    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    #[serde(default)]
    pub start_time: i64,

    #[serde(default)]
    pub samples: Vec<u64>,

    #[serde(default)]
    pub duration_delta: u64,
}

/// Parse a Pyroscope response from a JSON value
///
/// # Errors
/// * `ParseError::InvalidFormat` - payload is not an object or lacks `flamebearer`
/// * `ParseError::JsonError` - fields have the wrong types
pub fn parse_profile_response(raw: &serde_json::Value) -> Result<ProfileResponse, ParseError> {
    let obj = raw.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("Profile payload must be a JSON object".to_string())
    })?;

    if !obj.contains_key("flamebearer") {
        return Err(ParseError::InvalidFormat(
            "Profile payload has no 'flamebearer' field".to_string(),
        ));
    }

    let response: ProfileResponse = serde_json::from_value(raw.clone())?;
    debug!(
        "Parsed profile: {} names, {} levels, {} ticks",
        response.flamebearer.names.len(),
        response.flamebearer.levels.len(),
        response.flamebearer.num_ticks
    );

    Ok(response)
}
