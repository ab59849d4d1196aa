//! Sources of "current time"
//!
//! Download gating and URL templating both depend on the current date. They query it through the [`Clock`] trait, so that tests (or simulations) can control it.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Local};

pub trait Clock: Send + Sync {
    /// Returns the current local time
    fn now(&self) -> DateTime<Local>;
}

/// The wall clock of the host
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that is stuck at a given instant
#[derive(Clone, Debug)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn new(instant: DateTime<Local>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// A clock that returns a predefined sequence of instants, one per call to `now()`.
///
/// Once the sequence is exhausted, the last instant is returned forever.
#[derive(Debug)]
pub struct SequenceClock {
    state: Mutex<(VecDeque<DateTime<Local>>, DateTime<Local>)>,
}

impl SequenceClock {
    /// Create a clock from a sequence of instants. Returns `None` if `instants` is empty
    pub fn new<I: IntoIterator<Item = DateTime<Local>>>(instants: I) -> Option<Self> {
        let remaining: VecDeque<_> = instants.into_iter().collect();
        let first = *remaining.front()?;
        Some(Self {
            state: Mutex::new((remaining, first)),
        })
    }
}

impl Clock for SequenceClock {
    fn now(&self) -> DateTime<Local> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let (remaining, last) = &mut *state;
        if let Some(next) = remaining.pop_front() {
            *last = next;
        }
        *last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2022, 1, 1, h, m, s).single().unwrap()
    }

    #[test]
    fn sequence_clock_repeats_last_instant() {
        let clock = SequenceClock::new(vec![at(0, 0, 0), at(0, 4, 59)]).unwrap();
        assert_eq!(clock.now(), at(0, 0, 0));
        assert_eq!(clock.now(), at(0, 4, 59));
        assert_eq!(clock.now(), at(0, 4, 59));
        assert_eq!(clock.now(), at(0, 4, 59));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(SequenceClock::new(Vec::new()).is_none());
    }

    #[test]
    fn fixed_clock() {
        let clock = FixedClock::new(at(12, 30, 0));
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), at(12, 30, 0));
    }
}
