//! Terminal table for raw snapshot dumps.
//!
//! Formats one line per snapshot:
//! - Separates batches with a blank line when consecutive timestamps differ
//! - Truncates long entity ids to keep columns aligned

use crate::snapshot::{format_timestamp, Snapshot};

const ENTITY_WIDTH: usize = 48;

pub fn render(snapshots: &[Snapshot]) -> String {
    if snapshots.is_empty() {
        return String::from("No snapshots recorded.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<19}  {:<width$}  {:>9}  {:>6}  {}\n",
        "Timestamp",
        "Profile",
        "Interests",
        "Skills",
        "Status",
        width = ENTITY_WIDTH
    ));
    output.push_str(&"-".repeat(19 + ENTITY_WIDTH + 9 + 6 + 16));
    output.push('\n');

    let mut previous = None;
    for snapshot in snapshots {
        if previous.is_some_and(|ts| ts != snapshot.timestamp) {
            output.push('\n');
        }
        previous = Some(snapshot.timestamp);

        output.push_str(&format!(
            "{:<19}  {:<width$}  {:>9}  {:>6}  {}\n",
            format_timestamp(&snapshot.timestamp),
            truncate(&snapshot.entity_id, ENTITY_WIDTH),
            snapshot.interests_count,
            snapshot.skills_count,
            snapshot.status,
            width = ENTITY_WIDTH
        ));
    }

    output.push_str(&format!("\n{} snapshots\n", snapshots.len()));
    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
