use std::fmt;
use std::time::{Duration, SystemTime};

use crate::clock::elapsed_between;
use crate::session::Session;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Display values recomputed after every keystroke and timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub wpm: u32,
    pub accuracy: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
        }
    }
}

impl Score {
    pub fn compute(session: &Session, input: &str, now: SystemTime) -> Self {
        Self {
            wpm: words_per_minute(input, elapsed_between(session.started_at(), now)),
            accuracy: accuracy(session.typed_index(), session.error_count()),
        }
    }

    /// Completion message shown once per finished session.
    pub fn summary(&self, restart_delay: Duration) -> String {
        format!(
            "Congratulations! Your speed: {} WPM, Accuracy: {}%. New text in {} seconds...",
            self.wpm,
            self.accuracy,
            restart_delay.as_secs()
        )
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wpm   {}% acc", self.wpm, self.accuracy)
    }
}

/// Words in the input field. The field is trimmed and split on whitespace
/// runs; an empty field still counts as one word.
pub fn word_count(input: &str) -> usize {
    input.split_whitespace().count().max(1)
}

pub fn words_per_minute(input: &str, elapsed: Duration) -> u32 {
    let elapsed_ms = elapsed.as_millis();
    if elapsed_ms == 0 {
        return 0;
    }
    let minutes = elapsed_ms as f64 / MS_PER_MINUTE;
    (word_count(input) as f64 / minutes).round() as u32
}

pub fn accuracy(typed_index: usize, error_count: usize) -> u32 {
    if typed_index == 0 {
        return 100;
    }
    let correct = typed_index.saturating_sub(error_count) as f64;
    ((correct / typed_index as f64) * 100.0).round() as u32
}

pub fn elapsed_secs(started_at: SystemTime, now: SystemTime) -> u64 {
    elapsed_between(started_at, now).as_secs()
}
