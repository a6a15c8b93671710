//! Lazy-load stabilization.
//!
//! Scrolls, waits, and counts matching elements until the count stops
//! growing or the attempt cap is hit. The result is a best-effort count:
//! content slower than `pause * max_attempts` is missed.

use std::time::Duration;

use super::pacing::Pause;
use crate::events::{Event, EventSink};
use crate::page::{PageAccessor, PageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stabilized {
    pub count: usize,
    pub attempts: u32,
    /// False when the attempt cap was reached while the count was still moving.
    pub converged: bool,
}

/// Runs the stabilization loop against `selector`.
///
/// Never fails on its own account; errors only surface when the page
/// accessor itself faults (lost session, script failure).
pub fn stabilize<P>(
    page: &mut P,
    pause: &mut dyn Pause,
    selector: &str,
    max_attempts: u32,
    pause_duration: Duration,
    events: &mut dyn EventSink,
) -> Result<Stabilized, PageError>
where
    P: PageAccessor + ?Sized,
{
    let mut previous = 0;
    let mut current = 0;
    let mut attempts = 0;

    while attempts < max_attempts {
        attempts += 1;
        page.trigger_lazy_load()?;
        pause.pause(pause_duration);
        current = page.find_all(selector)?.len();
        events.emit(Event::StabilizeStep { attempt: attempts, count: current });

        if current == previous {
            let result = Stabilized { count: current, attempts, converged: true };
            events.emit(Event::Stabilized { count: current, attempts, converged: true });
            return Ok(result);
        }
        previous = current;
    }

    events.emit(Event::Stabilized { count: current, attempts, converged: false });
    Ok(Stabilized { count: current, attempts, converged: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::extract::pacing::RecordedPauses;
    use crate::page::fake::FakePage;

    fn run(counts: &[usize], max_attempts: u32) -> (Stabilized, FakePage, RecordedPauses) {
        let mut page = FakePage {
            counts: counts.iter().copied().collect(),
            ..FakePage::default()
        };
        let mut pauses = RecordedPauses::default();
        let result = stabilize(
            &mut page,
            &mut pauses,
            "li.item",
            max_attempts,
            Duration::from_secs(2),
            &mut NullSink,
        )
        .unwrap();
        (result, page, pauses)
    }

    #[test]
    fn repeated_count_stops_after_two_iterations() {
        let (result, page, pauses) = run(&[3, 3], 10);
        assert_eq!(result, Stabilized { count: 3, attempts: 2, converged: true });
        assert_eq!(page.lazy_loads, 2);
        assert_eq!(pauses.pauses, vec![Duration::from_secs(2); 2]);
    }

    #[test]
    fn empty_page_settles_at_zero_immediately() {
        let (result, _, _) = run(&[0], 10);
        assert_eq!(result, Stabilized { count: 0, attempts: 1, converged: true });
    }

    #[test]
    fn growing_count_settles_when_it_stops() {
        let (result, _, _) = run(&[5, 9, 14, 14], 10);
        assert_eq!(result.count, 14);
        assert_eq!(result.attempts, 4);
        assert!(result.converged);
    }

    #[test]
    fn cap_returns_last_observed_count() {
        let (result, page, _) = run(&[1, 2, 3, 4, 5, 6], 4);
        assert_eq!(result, Stabilized { count: 4, attempts: 4, converged: false });
        assert_eq!(page.lazy_loads, 4);
    }

    #[test]
    fn zero_attempts_returns_zero() {
        let (result, page, _) = run(&[7], 0);
        assert_eq!(result.count, 0);
        assert!(!result.converged);
        assert_eq!(page.lazy_loads, 0);
    }

    #[test]
    fn page_faults_propagate() {
        let mut page = FakePage::default();
        page.faults.insert("trigger_lazy_load", PageError::Other("session gone".into()));
        let err = stabilize(
            &mut page,
            &mut RecordedPauses::default(),
            "li",
            3,
            Duration::ZERO,
            &mut NullSink,
        )
        .unwrap_err();
        assert_eq!(err, PageError::Other("session gone".into()));
    }
}
