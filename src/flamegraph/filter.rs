//! Focus, search and tabulate a profile tree.

use super::profile::ProfileNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat row of the profile table view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTableRow {
    pub id: u64,
    pub name: String,
    #[serde(rename = "self")]
    pub self_value: u64,
    pub total: u64,
}

/// Narrow the tree down to the path leading to node `id`
///
/// Every ancestor of the focused node keeps only the child on that path and
/// takes the focused node's `start`/`end`, so the focused frame spans the
/// full width. The focused subtree itself is unchanged. An unknown id
/// returns the tree as is.
pub fn focus_on(root: &ProfileNode, id: u64) -> ProfileNode {
    let mut focused = root.clone();
    if !focus(&mut focused, id) {
        return root.clone();
    }
    focused
}

fn focus(node: &mut ProfileNode, id: u64) -> bool {
    if node.id == id {
        return true;
    }

    let Some(position) = node.children.iter_mut().position(|child| focus(child, id)) else {
        return false;
    };

    let child = node.children.swap_remove(position);
    node.start = child.start;
    node.end = child.end;
    node.children = vec![child];
    true
}

/// Total of node `id`, or `None` when it is not in the tree
pub fn find_total(root: &ProfileNode, id: u64) -> Option<u64> {
    if root.id == id {
        return Some(root.total);
    }
    root.children.iter().find_map(|child| find_total(child, id))
}

/// Whether a frame name matches a free-text search
///
/// The search is split into alphanumeric tokens (apostrophes kept); every
/// token must appear in the name, case-insensitively. An empty search matches
/// everything, a search made only of separators matches nothing.
pub fn matches_search(name: &str, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }

    let search = search.trim().to_lowercase();
    let tokens: Vec<&str> = search
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.is_empty() {
        return false;
    }

    let name = name.to_lowercase();
    tokens.iter().all(|token| name.contains(token))
}

/// Every matching node in pre-order, as table rows
pub fn table_rows(root: &ProfileNode, search: &str) -> Vec<ProfileTableRow> {
    let mut rows = Vec::new();
    root.walk(&mut |node| {
        if matches_search(&node.name, search) {
            rows.push(ProfileTableRow {
                id: node.id,
                name: node.name.clone(),
                self_value: node.self_value,
                total: node.total,
            });
        }
    });
    rows
}

/// Share of `value` in `total`, in percent
pub fn percentage(value: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    value as f64 / total as f64 * 100.0
}

/// Text table of the functions with the highest self value
///
/// Self values are summed per function name across the tree.
pub fn generate_text_summary(root: &ProfileNode, max_lines: usize, units: &str) -> String {
    let mut by_name: HashMap<&str, (u64, u64)> = HashMap::new();
    root.walk(&mut |node| {
        let entry = by_name.entry(node.name.as_str()).or_insert((0, 0));
        entry.0 += node.self_value;
        entry.1 += node.total;
    });

    let mut ranked: Vec<(&str, u64, u64)> = by_name
        .into_iter()
        .map(|(name, (self_value, total))| (name, self_value, total))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let root_total = root.total.max(1);
    let mut lines = Vec::new();

    lines.push(format!("  TOP FUNCTIONS BY SELF ({})", units));
    lines.push(format!("  {:<42} {:>14} {:>14} {:>8}", "Function", "SELF", "TOTAL", "%"));
    lines.push(format!("  {}", "-".repeat(81)));

    for (name, self_value, total) in ranked.iter().take(max_lines) {
        // Truncate long frame names for display
        let display_name = if name.chars().count() > 42 {
            let tail: String = name.chars().rev().take(39).collect::<Vec<_>>().into_iter().rev().collect();
            format!("...{}", tail)
        } else {
            name.to_string()
        };

        lines.push(format!(
            "  {:<42} {:>14} {:>14} {:>7.1}%",
            display_name,
            self_value,
            total,
            percentage(*self_value, root_total)
        ));
    }

    lines.join("\n")
}
