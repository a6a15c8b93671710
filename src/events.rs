//! Structured event sink.
//!
//! Components report progress through an explicit `&mut dyn EventSink`
//! instead of logging globally. The binary plugs in [`TracingSink`].

use crate::report::comparison;
use crate::snapshot::{ExtractionResult, Status};
use crate::store::diff::Delta;

#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    ExtractionStarted {
        entity_id: &'a str,
    },
    SkillsCounted {
        entity_id: &'a str,
        skills: u32,
    },
    /// The interests page could not be reached; interests default to zero.
    InterestsUnavailable {
        entity_id: &'a str,
        reason: String,
    },
    StabilizeStep {
        attempt: u32,
        count: usize,
    },
    Stabilized {
        count: usize,
        attempts: u32,
        converged: bool,
    },
    ExtractionFinished {
        entity_id: &'a str,
        result: &'a ExtractionResult,
    },
    SnapshotRecorded {
        entity_id: &'a str,
        row_id: i64,
    },
    /// No batch older than the cutoff exists yet.
    NoPriorBatch,
    Compared {
        deltas: &'a [Delta],
    },
}

pub trait EventSink {
    fn emit(&mut self, event: Event<'_>);
}

/// Drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: Event<'_>) {}
}

/// Forwards events to `tracing`.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: Event<'_>) {
        match event {
            Event::ExtractionStarted { entity_id } => {
                tracing::info!(entity = entity_id, "processing profile");
            }
            Event::SkillsCounted { entity_id, skills } => {
                tracing::debug!(entity = entity_id, skills, "skills counted");
            }
            Event::InterestsUnavailable { entity_id, reason } => {
                tracing::warn!(entity = entity_id, %reason, "could not find interests for profile");
            }
            Event::StabilizeStep { attempt, count } => {
                tracing::debug!(attempt, count, "loaded elements");
            }
            Event::Stabilized { count, attempts, converged } => {
                if converged {
                    tracing::info!(count, attempts, "no more new elements loaded");
                } else {
                    tracing::warn!(count, attempts, "attempt cap reached before count settled; count is approximate");
                }
            }
            Event::ExtractionFinished { entity_id, result } => match &result.status {
                Status::Success => tracing::info!(
                    entity = entity_id,
                    interests = result.interests_count,
                    skills = result.skills_count,
                    "processed profile"
                ),
                status => tracing::error!(entity = entity_id, %status, "failed to process profile"),
            },
            Event::SnapshotRecorded { entity_id, row_id } => {
                tracing::debug!(entity = entity_id, row_id, "snapshot recorded");
            }
            Event::NoPriorBatch => tracing::info!("{}", comparison::NO_PRIOR_DATA),
            Event::Compared { deltas } => {
                tracing::info!("Comparison Report:\n{}", comparison::render(deltas));
            }
        }
    }
}

/// Keeps every event as text. Used by tests to assert on what was reported.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Event<'_>) {
        self.events.push(format!("{event:?}"));
    }
}
