//! Trend report.
//!
//! Pairs each entity's latest snapshot with the one right before it in that
//! entity's own series. This is a different "previous" from the batch-wide
//! prior set used by [`comparison`]: an entity visited in every run always
//! has a predecessor here, regardless of which batch it falls in.

pub mod comparison;
pub mod csv;
pub mod html;
pub mod json;
pub mod table;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::store::diff::{Change, Direction};

pub const HEADERS: [&str; 5] = [
    "Profile URL",
    "Interests Count",
    "Interests Change",
    "Skills Count",
    "Skills Change",
];

pub const HTML_FILE: &str = "comparison_table.html";
pub const CSV_FILE: &str = "comparison_table.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendRow {
    pub entity_id: String,
    pub timestamp: NaiveDateTime,
    pub interests_count: u32,
    pub interests: Change,
    pub skills_count: u32,
    pub skills: Change,
}

impl TrendRow {
    /// Display cells in [`HEADERS`] order. Every artifact is built from these.
    pub fn cells(&self) -> [String; 5] {
        [
            self.entity_id.clone(),
            self.interests_count.to_string(),
            change_cell(&self.interests),
            self.skills_count.to_string(),
            change_cell(&self.skills),
        ]
    }
}

pub fn glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Flat => "",
    }
}

fn change_cell(change: &Change) -> String {
    match glyph(change.direction) {
        "" => change.signed(),
        g => format!("{} {g}", change.signed()),
    }
}

/// One row per entity with at least two snapshots, ordered by entity id.
///
/// Ties on timestamp keep their input order, so the later-written row is
/// treated as newer when `history` comes from the store.
pub fn trend_rows(history: &[Snapshot]) -> Vec<TrendRow> {
    let mut series: BTreeMap<&str, Vec<&Snapshot>> = BTreeMap::new();
    for snapshot in history {
        series.entry(snapshot.entity_id.as_str()).or_default().push(snapshot);
    }

    series
        .into_values()
        .filter_map(|mut snapshots| {
            snapshots.sort_by_key(|s| s.timestamp);
            let [.., previous, latest] = snapshots.as_slice() else {
                return None;
            };
            Some(TrendRow {
                entity_id: latest.entity_id.clone(),
                timestamp: latest.timestamp,
                interests_count: latest.interests_count,
                interests: Change::between(previous.interests_count, latest.interests_count),
                skills_count: latest.skills_count,
                skills: Change::between(previous.skills_count, latest.skills_count),
            })
        })
        .collect()
}

/// Files written by [`write_artifacts`].
#[derive(Debug)]
pub struct Artifacts {
    pub html: PathBuf,
    pub csv: PathBuf,
}

/// Writes the styled table and the flat CSV, both from the same rows.
pub fn write_artifacts(rows: &[TrendRow], out_dir: &Path) -> Result<Artifacts> {
    std::fs::create_dir_all(out_dir)?;

    let html = out_dir.join(HTML_FILE);
    std::fs::write(&html, html::render(rows))?;

    let csv = out_dir.join(CSV_FILE);
    std::fs::write(&csv, csv::render(rows))?;

    Ok(Artifacts { html, csv })
}
