//! Snapshot model.
//!
//! A snapshot is one timestamped observation of an entity's two metrics
//! plus the outcome of the extraction that produced it. Failed extractions
//! still produce a snapshot with zeroed counts, so the log never has gaps.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};

/// Text format used for timestamps in the database and in reports.
/// Lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Timeout,
    ElementNotFound,
    /// Unclassified fault. Build it with [`Status::other`] so the reason
    /// never reads back as one of the named variants.
    Other(String),
}

/// Reasons whose `Error: ` text is taken by a named variant.
const RESERVED_REASONS: [&str; 2] = ["Timeout", "Element not found"];

impl Status {
    /// An unclassified fault with `reason`. A reason that would collide with
    /// a named variant's stored text is tagged `(unclassified)`.
    pub fn other(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if RESERVED_REASONS.contains(&reason.as_str()) {
            Status::Other(format!("{reason} (unclassified)"))
        } else {
            Status::Other(reason)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("Success"),
            Status::Timeout => f.write_str("Error: Timeout"),
            Status::ElementNotFound => f.write_str("Error: Element not found"),
            Status::Other(reason) => write!(f, "Error: {reason}"),
        }
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Success" => Status::Success,
            "Error: Timeout" => Status::Timeout,
            "Error: Element not found" => Status::ElementNotFound,
            other => Status::Other(other.strip_prefix("Error: ").unwrap_or(other).to_string()),
        })
    }
}

/// Outcome of extracting one entity, before it is stamped and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub interests_count: u32,
    pub skills_count: u32,
    pub status: Status,
}

impl ExtractionResult {
    /// A failed extraction: counts are forced to zero.
    pub fn failed(status: Status) -> Self {
        ExtractionResult {
            interests_count: 0,
            skills_count: 0,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub entity_id: String,
    pub timestamp: NaiveDateTime,
    pub interests_count: u32,
    pub skills_count: u32,
    pub status: Status,
}

impl Snapshot {
    pub fn from_result(entity_id: &str, timestamp: NaiveDateTime, result: ExtractionResult) -> Self {
        Snapshot {
            entity_id: entity_id.to_string(),
            timestamp,
            interests_count: result.interests_count,
            skills_count: result.skills_count,
            status: result.status,
        }
    }
}

/// Current local time truncated to whole seconds, matching what the store keeps.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
}

/// One snapshot per entity, iterated in insertion order.
///
/// Inserting an entity that is already present replaces its snapshot in place.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    snapshots: Vec<Snapshot>,
    index: HashMap<String, usize>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        SnapshotSet::default()
    }

    pub fn insert(&mut self, snapshot: Snapshot) {
        match self.index.get(&snapshot.entity_id) {
            Some(&slot) => self.snapshots[slot] = snapshot,
            None => {
                self.index.insert(snapshot.entity_id.clone(), self.snapshots.len());
                self.snapshots.push(snapshot);
            }
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<&Snapshot> {
        self.index.get(entity_id).map(|&slot| &self.snapshots[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl FromIterator<Snapshot> for SnapshotSet {
    fn from_iter<I: IntoIterator<Item = Snapshot>>(iter: I) -> Self {
        let mut set = SnapshotSet::new();
        for snapshot in iter {
            set.insert(snapshot);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(entity: &str, interests: u32) -> Snapshot {
        Snapshot {
            entity_id: entity.to_string(),
            timestamp: parse_timestamp("2024-05-01 10:00:00").unwrap(),
            interests_count: interests,
            skills_count: 0,
            status: Status::Success,
        }
    }

    #[test]
    fn status_text_matches_stored_form() {
        assert_eq!(Status::Success.to_string(), "Success");
        assert_eq!(Status::Timeout.to_string(), "Error: Timeout");
        assert_eq!(Status::ElementNotFound.to_string(), "Error: Element not found");
        assert_eq!(Status::Other("boom".into()).to_string(), "Error: boom");
    }

    #[test]
    fn status_parses_back() {
        for status in [
            Status::Success,
            Status::Timeout,
            Status::ElementNotFound,
            Status::Other("session closed".into()),
        ] {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn reserved_reasons_survive_a_text_round_trip() {
        for reason in RESERVED_REASONS {
            let status = Status::other(reason);
            assert_ne!(status.to_string(), Status::Timeout.to_string());
            assert_ne!(status.to_string(), Status::ElementNotFound.to_string());
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
        assert_eq!(Status::other("boom"), Status::Other("boom".into()));
    }

    #[test]
    fn unknown_status_text_is_other() {
        assert_eq!("weird".parse::<Status>().unwrap(), Status::Other("weird".into()));
    }

    #[test]
    fn failed_result_zeroes_counts() {
        let result = ExtractionResult::failed(Status::Timeout);
        assert_eq!(result.interests_count, 0);
        assert_eq!(result.skills_count, 0);
        assert_eq!(result.status, Status::Timeout);
    }

    #[test]
    fn set_keeps_insertion_order_and_replaces_duplicates() {
        let set: SnapshotSet = vec![snap("b", 1), snap("a", 2), snap("b", 3)]
            .into_iter()
            .collect();

        let order: Vec<_> = set.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
        assert_eq!(set.get("b").unwrap().interests_count, 3);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn now_has_second_precision() {
        assert_eq!(now().nanosecond(), 0);
    }
}
