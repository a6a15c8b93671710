//! Snapshot set comparison.
//!
//! Compares the current batch against a prior batch:
//! - Matches snapshots by entity id
//! - Entities missing from either side are skipped; a delta needs both ends
//! - Deltas are exact signed differences, never clamped

use serde::Serialize;

use crate::snapshot::{Snapshot, SnapshotSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// Signed difference of one metric between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Change {
    pub delta: i64,
    pub direction: Direction,
}

impl Change {
    pub fn between(prior: u32, current: u32) -> Self {
        let delta = i64::from(current) - i64::from(prior);
        let direction = match delta {
            d if d > 0 => Direction::Up,
            d if d < 0 => Direction::Down,
            _ => Direction::Flat,
        };
        Change { delta, direction }
    }

    /// Always signed: "+2", "-3", "+0".
    pub fn signed(&self) -> String {
        format!("{:+}", self.delta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub entity_id: String,
    pub interests: Change,
    pub skills: Change,
}

impl Delta {
    pub fn between(prior: &Snapshot, current: &Snapshot) -> Self {
        Delta {
            entity_id: current.entity_id.clone(),
            interests: Change::between(prior.interests_count, current.interests_count),
            skills: Change::between(prior.skills_count, current.skills_count),
        }
    }
}

/// One delta per entity present in both sets, in `current`'s order.
pub fn compare(current: &SnapshotSet, prior: &SnapshotSet) -> Vec<Delta> {
    current
        .iter()
        .filter_map(|now| prior.get(&now.entity_id).map(|before| Delta::between(before, now)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{parse_timestamp, Status};

    fn snap(entity: &str, interests: u32, skills: u32) -> Snapshot {
        Snapshot {
            entity_id: entity.to_string(),
            timestamp: parse_timestamp("2024-06-01 12:00:00").unwrap(),
            interests_count: interests,
            skills_count: skills,
            status: Status::Success,
        }
    }

    fn set(snapshots: Vec<Snapshot>) -> SnapshotSet {
        snapshots.into_iter().collect()
    }

    #[test]
    fn growth_and_no_change() {
        let deltas = compare(&set(vec![snap("A", 8, 10)]), &set(vec![snap("A", 5, 10)]));
        assert_eq!(
            deltas,
            vec![Delta {
                entity_id: "A".into(),
                interests: Change { delta: 3, direction: Direction::Up },
                skills: Change { delta: 0, direction: Direction::Flat },
            }]
        );
    }

    #[test]
    fn shrinking_is_negative_and_unclamped() {
        let deltas = compare(&set(vec![snap("A", 0, 2)]), &set(vec![snap("A", 40, 3)]));
        assert_eq!(deltas[0].interests, Change { delta: -40, direction: Direction::Down });
        assert_eq!(deltas[0].skills, Change { delta: -1, direction: Direction::Down });
    }

    #[test]
    fn disjoint_sets_have_no_deltas() {
        let deltas = compare(&set(vec![snap("A", 1, 1)]), &set(vec![snap("B", 1, 1)]));
        assert!(deltas.is_empty());
    }

    #[test]
    fn empty_prior_has_no_deltas() {
        assert!(compare(&set(vec![snap("A", 1, 1)]), &SnapshotSet::new()).is_empty());
    }

    #[test]
    fn follows_current_order() {
        let current = set(vec![snap("C", 1, 1), snap("A", 1, 1), snap("B", 1, 1)]);
        let prior = set(vec![snap("A", 0, 0), snap("B", 0, 0), snap("C", 0, 0)]);
        let order: Vec<_> = compare(&current, &prior).into_iter().map(|d| d.entity_id).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn extreme_counts_do_not_overflow() {
        let change = Change::between(u32::MAX, 0);
        assert_eq!(change.delta, -i64::from(u32::MAX));
    }

    #[test]
    fn signed_strings_always_carry_a_sign() {
        assert_eq!(Change::between(5, 7).signed(), "+2");
        assert_eq!(Change::between(7, 4).signed(), "-3");
        assert_eq!(Change::between(4, 4).signed(), "+0");
    }
}
