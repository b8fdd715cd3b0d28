// src/scoreboard.rs

//! Ordered expected-value queue for checking a pipeline cycle by cycle.
//!
//! The driver pushes what the current input should produce and, on the same
//! cycle, checks what the pipeline emits against the value pushed `latency`
//! cycles earlier.

use alloc::collections::VecDeque;
use core::fmt::Debug;
use tracing::warn;

use crate::common::{HtfftError, Result};

#[derive(Clone, Debug)]
pub struct Scoreboard<T> {
    queue: VecDeque<Option<T>>,
    checked: usize,
}

impl<T: PartialEq + Debug> Scoreboard<T> {
    /// A queue primed with `latency` empty slots, so the first expected value
    /// is due `latency` cycles after it is pushed.
    pub fn new(latency: usize) -> Self {
        Self {
            queue: (0..latency).map(|_| None).collect(),
            checked: 0,
        }
    }

    /// Queues the value expected for this cycle's input; `None` means the
    /// output is don't-care.
    pub fn push(&mut self, expected: Option<T>) {
        self.queue.push_back(expected);
    }

    /// Compares `observed` with the oldest queued value.
    pub fn check(&mut self, observed: Option<&T>) -> Result<()> {
        let index = self.checked;
        self.checked += 1;
        match self.queue.pop_front().flatten() {
            None => Ok(()),
            Some(expected) if observed == Some(&expected) => Ok(()),
            Some(expected) => {
                warn!(index, ?expected, ?observed, "scoreboard mismatch");
                Err(HtfftError::ScoreboardMismatch { index })
            }
        }
    }

    /// `push` then `check`, one cycle of a driver loop.
    pub fn step(&mut self, expected: Option<T>, observed: Option<&T>) -> Result<()> {
        self.push(expected);
        self.check(observed)
    }

    /// Values pushed but not yet checked.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn checked(&self) -> usize {
        self.checked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;

    #[test]
    fn test_delays_by_latency() {
        let mut scoreboard = Scoreboard::new(2);
        assert_eq!(scoreboard.pending(), 2);
        // a pipeline that emits its input two cycles later
        let outputs = [None, None, Some(10), Some(11), Some(12)];
        for (cycle, output) in outputs.iter().enumerate() {
            scoreboard.step(Some(10 + cycle), output.as_ref()).unwrap();
        }
        assert_eq!(scoreboard.checked(), 5);
        assert_eq!(scoreboard.pending(), 2);
    }

    #[test]
    fn test_mismatch_reports_index() {
        let mut scoreboard = Scoreboard::new(0);
        scoreboard.step(Some(1), Some(&1)).unwrap();
        let err = scoreboard.step(Some(2), Some(&3)).unwrap_err();
        assert_eq!(err, HtfftError::ScoreboardMismatch { index: 1 });
        assert_eq!(err.kind(), ErrorKind::Precision);
        // missing output where one was expected
        assert!(scoreboard.step(Some(4), None).is_err());
    }

    #[test]
    fn test_dont_care_slots() {
        let mut scoreboard = Scoreboard::new(1);
        scoreboard.step(None, Some(&7)).unwrap();
        scoreboard.step(Some(1), Some(&99)).unwrap();
        assert!(scoreboard.check(Some(&2)).is_err());
    }
}
