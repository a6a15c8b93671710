//! Randomized pacing between page visits.
//!
//! Every navigation step is preceded by a random, never-zero pause so the
//! visit pattern does not look scripted. Sleeping goes through [`Pause`]
//! so tests can observe pauses without waiting on them.

use std::thread;
use std::time::Duration;

use rand::Rng;

pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

/// Blocks the current thread.
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Records pauses without sleeping.
#[derive(Debug, Default)]
pub struct RecordedPauses {
    pub pauses: Vec<Duration>,
}

impl Pause for RecordedPauses {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

/// Uniform random delay in `[min, max]`. `min` is clamped to at least 1ms.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    min: Duration,
    max: Duration,
}

impl Pacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = min.max(Duration::from_millis(1));
        Pacer { min, max: max.max(min) }
    }

    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rng.random_range(min..=max))
    }

    pub fn wait(&self, pause: &mut dyn Pause) {
        pause.pause(self.next_delay(&mut rand::rng()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_stay_in_range() {
        let pacer = Pacer::new(Duration::from_secs(2), Duration::from_secs(5));
        let mut rng = rand::rng();
        for _ in 0..200 {
            let d = pacer.next_delay(&mut rng);
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(5), "{d:?}");
        }
    }

    #[test]
    fn zero_range_is_clamped_above_zero() {
        let pacer = Pacer::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(pacer.next_delay(&mut rand::rng()), Duration::from_millis(1));
    }

    #[test]
    fn inverted_range_collapses_to_min() {
        let pacer = Pacer::new(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(pacer.next_delay(&mut rand::rng()), Duration::from_secs(3));
    }

    #[test]
    fn wait_goes_through_pause() {
        let mut recorded = RecordedPauses::default();
        Pacer::new(Duration::from_millis(5), Duration::from_millis(10)).wait(&mut recorded);
        assert_eq!(recorded.pauses.len(), 1);
        assert!(recorded.pauses[0] >= Duration::from_millis(5));
    }
}
