//! Batch driver.
//!
//! Visits entities one at a time with the same page session, recording
//! each snapshot as soon as it is produced. A failure on one entity is
//! recorded and the batch moves on; only store failures stop the run.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use crate::extract::pacing::Pause;
use crate::extract::Extractor;
use crate::page::PageAccessor;
use crate::snapshot::{self, Snapshot, SnapshotSet};
use crate::store::diff::{self, Delta};
use crate::store::Store;

/// Reads one entity id per line. Blank lines, `#` comments and repeated
/// ids are skipped.
pub fn read_entity_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::EntityList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_entity_list(&text))
}

pub fn parse_entity_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

pub struct BatchOutcome {
    pub timestamp: NaiveDateTime,
    pub current: SnapshotSet,
    pub failures: usize,
}

/// Extracts and records up to `limit` distinct entities under one batch
/// timestamp. A repeated id is visited once.
pub fn run_batch<P: PageAccessor, S: Pause>(
    extractor: &mut Extractor<P, S>,
    store: &Store,
    entities: &[String],
    limit: usize,
    events: &mut dyn EventSink,
) -> Result<BatchOutcome> {
    run_batch_at(extractor, store, entities, limit, snapshot::now(), events)
}

pub fn run_batch_at<P: PageAccessor, S: Pause>(
    extractor: &mut Extractor<P, S>,
    store: &Store,
    entities: &[String],
    limit: usize,
    timestamp: NaiveDateTime,
    events: &mut dyn EventSink,
) -> Result<BatchOutcome> {
    let mut current = SnapshotSet::new();
    let mut failures = 0;
    let mut seen = HashSet::new();
    let distinct = entities.iter().filter(|id| seen.insert(*id));

    for (i, entity_id) in distinct.take(limit).enumerate() {
        if i > 0 {
            extractor.pace();
        }

        let result = extractor.extract(entity_id, events);
        if !result.status.is_success() {
            failures += 1;
        }

        let snapshot = Snapshot::from_result(entity_id, timestamp, result);
        let row_id = store.record(&snapshot)?;
        events.emit(Event::SnapshotRecorded { entity_id, row_id });
        current.insert(snapshot);
    }

    Ok(BatchOutcome { timestamp, current, failures })
}

/// Compares `current` with the prior batch and reports the result to `events`.
pub fn compare_with_prior(
    store: &Store,
    current: &SnapshotSet,
    now: NaiveDateTime,
    cutoff: std::time::Duration,
    events: &mut dyn EventSink,
) -> Result<Option<Vec<Delta>>> {
    let prior = store.latest_prior_snapshots_at(now, cutoff)?;
    if prior.is_empty() {
        events.emit(Event::NoPriorBatch);
        return Ok(None);
    }

    let deltas = diff::compare(current, &prior);
    events.emit(Event::Compared { deltas: &deltas });
    Ok(Some(deltas))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::ExtractConfig;
    use crate::events::RecordingSink;
    use crate::extract::pacing::RecordedPauses;
    use crate::extract::pattern::PhraseCount;
    use crate::page::fake::FakePage;
    use crate::page::PageError;
    use crate::snapshot::Status;
    use crate::store::HistoryOrder;

    fn extractor(page: FakePage) -> Extractor<FakePage, RecordedPauses> {
        Extractor::with_pause(
            page,
            RecordedPauses::default(),
            ExtractConfig::default(),
            Box::new(PhraseCount::new(r"Show all (\d+) skills").unwrap()),
        )
    }

    fn entities(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn entity_list_skips_blanks_and_comments() {
        let list = parse_entity_list("  https://a \n\n# paused\nhttps://b\n");
        assert_eq!(list, vec!["https://a", "https://b"]);
    }

    #[test]
    fn entity_list_drops_repeated_ids() {
        let list = parse_entity_list("https://p/a\nhttps://p/b\n https://p/a \n");
        assert_eq!(list, vec!["https://p/a", "https://p/b"]);
    }

    #[test]
    fn missing_entity_list_is_fatal() {
        let err = read_entity_list(Path::new("/nonexistent/profiles.txt")).unwrap_err();
        assert!(matches!(err, Error::EntityList { .. }));
    }

    #[test]
    fn batch_records_every_entity_including_failures() {
        let mut page = FakePage::default();
        page.documents.insert("a".into(), "<p>Show all 4 skills</p>".into());
        page.navigate_errors.insert("b".into(), PageError::Timeout("load".into()));
        let mut extractor = extractor(page);
        let store = Store::open_in_memory().unwrap();
        let mut sink = RecordingSink::default();

        let outcome =
            run_batch(&mut extractor, &store, &entities(&["a", "b", "c"]), 10, &mut sink).unwrap();

        assert_eq!(outcome.current.len(), 3);
        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.current.get("a").unwrap().skills_count, 4);
        assert_eq!(outcome.current.get("b").unwrap().status, Status::Timeout);

        let history = store.history(HistoryOrder::ByEntity).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|s| s.timestamp == outcome.timestamp));
        assert_eq!(sink.events.iter().filter(|e| e.starts_with("SnapshotRecorded")).count(), 3);
    }

    #[test]
    fn batch_respects_limit() {
        let mut extractor = extractor(FakePage::default());
        let store = Store::open_in_memory().unwrap();
        let outcome = run_batch(
            &mut extractor,
            &store,
            &entities(&["a", "b", "c", "d"]),
            2,
            &mut RecordingSink::default(),
        )
        .unwrap();
        assert_eq!(outcome.current.len(), 2);
        assert_eq!(extractor.page().visited, vec!["a", "b"]);
    }

    #[test]
    fn repeated_id_is_visited_once_per_batch() {
        let mut page = FakePage::default();
        page.documents.insert("a".into(), "<p>Show all 4 skills</p>".into());
        let mut extractor = extractor(page);
        let store = Store::open_in_memory().unwrap();

        let outcome = run_batch(
            &mut extractor,
            &store,
            &entities(&["a", "a", "b", "c"]),
            2,
            &mut RecordingSink::default(),
        )
        .unwrap();

        assert_eq!(extractor.page().visited, vec!["a", "b"]);
        assert_eq!(outcome.current.len(), 2);
        let history = store.history(HistoryOrder::ByEntity).unwrap();
        let ids: Vec<_> = history.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn entities_are_paced_apart() {
        let mut extractor = extractor(FakePage::default());
        let store = Store::open_in_memory().unwrap();
        run_batch(&mut extractor, &store, &entities(&["a", "b"]), 10, &mut RecordingSink::default())
            .unwrap();
        // each entity: two navigation waits, plus one wait between the two entities
        assert_eq!(extractor.pause().pauses.len(), 5);
    }

    #[test]
    fn comparison_uses_prior_batch() {
        let store = Store::open_in_memory().unwrap();
        let then = snapshot::parse_timestamp("2024-01-01 09:00:00").unwrap();
        let now = snapshot::parse_timestamp("2024-01-09 09:00:00").unwrap();
        let prior = Snapshot {
            entity_id: "a".into(),
            timestamp: then,
            interests_count: 5,
            skills_count: 10,
            status: Status::Success,
        };
        store.record(&prior).unwrap();

        let current: SnapshotSet = vec![Snapshot { timestamp: now, interests_count: 8, ..prior }]
            .into_iter()
            .collect();
        let mut sink = RecordingSink::default();
        let deltas =
            compare_with_prior(&store, &current, now, Duration::from_secs(7 * 86_400), &mut sink)
                .unwrap()
                .unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].interests.delta, 3);
        assert_eq!(sink.events.len(), 1);
        assert!(sink.events[0].starts_with("Compared"));
    }

    #[test]
    fn comparison_without_prior_data_is_none() {
        let store = Store::open_in_memory().unwrap();
        let now = snapshot::parse_timestamp("2024-01-09 09:00:00").unwrap();
        let mut sink = RecordingSink::default();
        let result =
            compare_with_prior(&store, &SnapshotSet::new(), now, Duration::from_secs(60), &mut sink)
                .unwrap();
        assert!(result.is_none());
        assert_eq!(sink.events, vec!["NoPriorBatch"]);
    }
}
