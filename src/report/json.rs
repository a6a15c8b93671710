//! JSON output for trend rows.
//!
//! Serializes rows with raw numbers for scripting and piping; the display
//! cells (signed strings, glyphs) are included alongside.

use serde::Serialize;

use super::TrendRow;
use crate::snapshot::format_timestamp;
use crate::store::diff::Change;

#[derive(Serialize)]
struct JsonRow<'a> {
    entity_id: &'a str,
    timestamp: String,
    interests_count: u32,
    interests: &'a Change,
    skills_count: u32,
    skills: &'a Change,
    cells: [String; 5],
}

pub fn render(rows: &[TrendRow]) -> String {
    let rows: Vec<JsonRow<'_>> = rows
        .iter()
        .map(|row| JsonRow {
            entity_id: &row.entity_id,
            timestamp: format_timestamp(&row.timestamp),
            interests_count: row.interests_count,
            interests: &row.interests,
            skills_count: row.skills_count,
            skills: &row.skills,
            cells: row.cells(),
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| String::from("[]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::snap;
    use crate::report::trend_rows;

    #[test]
    fn rows_serialize_with_numbers_and_cells() {
        let rows = trend_rows(&[
            snap("A", "2024-01-01 00:00:00", 5, 10),
            snap("A", "2024-01-08 00:00:00", 8, 10),
        ]);
        let value: serde_json::Value = serde_json::from_str(&render(&rows)).unwrap();
        let row = &value[0];
        assert_eq!(row["entity_id"], "A");
        assert_eq!(row["timestamp"], "2024-01-08 00:00:00");
        assert_eq!(row["interests"]["delta"], 3);
        assert_eq!(row["interests"]["direction"], "Up");
        assert_eq!(row["skills"]["direction"], "Flat");
        assert_eq!(row["cells"][2], "+3 ▲");
    }

    #[test]
    fn no_rows_is_empty_array() {
        assert_eq!(render(&[]), "[]");
    }
}
