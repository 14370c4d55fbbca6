//! Build a flamegraph tree from a Pyroscope flamebearer.
//!
//! Every flamebearer level is a flat list of `(offset, total, self, name index)`
//! tuples. Offsets are relative to the end of the previous node on the same
//! level, so a running cursor recovers absolute `[start, end]` tick ranges.
//! A node belongs to the first node one level up whose range contains it.

use crate::parser::flamebearer::{ProfileMetadata, ProfileResponse, Timeline};
use crate::utils::config::FLAMEBEARER_TUPLE_LEN;
use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};

/// One frame of the flamegraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileNode {
    /// Sequential id, 1-based, level-major
    pub id: u64,
    pub name: String,
    pub level: usize,
    pub start: u64,
    pub end: u64,
    #[serde(rename = "self")]
    pub self_value: u64,
    pub total: u64,
    pub children: Vec<ProfileNode>,
}

impl ProfileNode {
    fn contains(&self, other: &ProfileNode) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Pre-order walk over this node and all descendants
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ProfileNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Profile tree plus the response metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    /// `None` for an empty profile
    pub root: Option<ProfileNode>,
    pub num_ticks: u64,
    pub max_self: u64,
    pub metadata: ProfileMetadata,
    pub timeline: Timeline,
}

/// Convert a Pyroscope response into a profile tree
///
/// **Public** - main entry point for profile construction
///
/// # Errors
/// * `ParseError::InvalidFormat` - a level is not a whole number of tuples,
///   or references a name that does not exist
pub fn build_profile(response: &ProfileResponse) -> Result<ProfileData, ParseError> {
    let flamebearer = &response.flamebearer;
    let mut next_id = 1u64;
    let mut levels: Vec<Vec<ProfileNode>> = Vec::with_capacity(flamebearer.levels.len());

    for (level, row) in flamebearer.levels.iter().enumerate() {
        if row.len() % FLAMEBEARER_TUPLE_LEN != 0 {
            return Err(ParseError::InvalidFormat(format!(
                "level {} has {} values, expected a multiple of {}",
                level,
                row.len(),
                FLAMEBEARER_TUPLE_LEN
            )));
        }

        let mut cursor = 0u64;
        let mut nodes = Vec::with_capacity(row.len() / FLAMEBEARER_TUPLE_LEN);
        for tuple in row.chunks_exact(FLAMEBEARER_TUPLE_LEN) {
            let (offset, total, self_value, name_index) = (tuple[0], tuple[1], tuple[2], tuple[3]);
            let name = usize::try_from(name_index)
                .ok()
                .and_then(|i| flamebearer.names.get(i))
                .ok_or_else(|| {
                    ParseError::InvalidFormat(format!(
                        "level {} references name {} but only {} names exist",
                        level,
                        name_index,
                        flamebearer.names.len()
                    ))
                })?;

            let start = cursor.checked_add(offset).ok_or_else(|| overflow(level))?;
            cursor = start.checked_add(total).ok_or_else(|| overflow(level))?;

            nodes.push(ProfileNode {
                id: next_id,
                name: name.clone(),
                level,
                start,
                end: cursor,
                self_value,
                total,
                children: Vec::new(),
            });
            next_id += 1;
        }
        levels.push(nodes);
    }

    let root = attach_children(levels);

    debug!("Built profile tree with {} nodes", next_id - 1);

    Ok(ProfileData {
        root,
        num_ticks: flamebearer.num_ticks,
        max_self: flamebearer.max_self,
        metadata: response.metadata.clone(),
        timeline: response.timeline.clone(),
    })
}

fn overflow(level: usize) -> ParseError {
    ParseError::InvalidFormat(format!("level {} overflows the tick range", level))
}

// Nodes are owned by their parent, so levels are folded bottom-up: by the time
// a level is attached to its parents it already carries its own children.
fn attach_children(mut levels: Vec<Vec<ProfileNode>>) -> Option<ProfileNode> {
    while levels.len() > 1 {
        let Some(row) = levels.pop() else { break };
        let Some(parents) = levels.last_mut() else { break };

        for node in row {
            match parents.iter_mut().find(|p| p.contains(&node)) {
                Some(parent) => parent.children.push(node),
                None => debug!(
                    "dropping node {} ({}) at level {}: no enclosing parent",
                    node.id, node.name, node.level
                ),
            }
        }
    }

    levels.pop().and_then(|row| row.into_iter().next())
}
