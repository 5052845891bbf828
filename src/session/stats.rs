use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

const CHARS_PER_WORD: f64 = 5.0;

/// Numeric typing statistics, as rendered and as persisted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub accuracy: f64,
    pub elapsed_seconds: u64,
    pub correct_type_count: u32,
    pub typo_count: u32,
    pub wpm: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            accuracy: 100.0,
            elapsed_seconds: 0,
            correct_type_count: 0,
            typo_count: 0,
            wpm: 0.0,
        }
    }
}

impl Stats {
    pub fn total_keystrokes(&self) -> u32 {
        self.correct_type_count + self.typo_count
    }

    fn recompute_accuracy(&mut self) {
        let total = self.total_keystrokes();
        self.accuracy = if total == 0 {
            100.0
        } else {
            (self.correct_type_count as f64 / total as f64 * 100.0).round()
        };
    }

    fn recompute_wpm(&mut self) {
        if self.elapsed_seconds == 0 || self.correct_type_count == 0 {
            return;
        }
        let minutes = self.elapsed_seconds as f64 / 60.0;
        self.wpm = (self.correct_type_count as f64 / CHARS_PER_WORD / minutes).round();
    }
}

/// Elapsed-time accrual as a pure function: whole seconds between
/// `last_measure` and `now` are added, and the anchor moves to `now`.
/// The sub-second remainder is dropped.
pub fn accrue(stats: &Stats, now: Instant, last_measure: Instant) -> (Stats, Instant) {
    let whole_seconds = now.saturating_duration_since(last_measure).as_secs();
    let mut next = *stats;
    if whole_seconds > 0 {
        next.elapsed_seconds += whole_seconds;
        next.recompute_wpm();
    }
    (next, now)
}

/// Accumulates accuracy, elapsed time and WPM from keystroke correctness
/// signals and clock ticks. Owned per file session.
#[derive(Clone, Debug, Default)]
pub struct StatsEngine {
    stats: Stats,
    last_measure: Option<Instant>,
    is_typing: bool,
}

impl StatsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Stats {
        self.stats
    }

    pub fn is_active(&self) -> bool {
        self.is_typing
    }

    pub fn start_stats(&mut self, now: Instant) {
        self.stats = Stats::default();
        self.last_measure = Some(now);
        self.is_typing = true;
    }

    pub fn update_stats(&mut self, is_correct: bool) {
        if !self.is_typing {
            return;
        }
        if is_correct {
            self.stats.correct_type_count += 1;
            self.stats.recompute_wpm();
        } else {
            self.stats.typo_count += 1;
        }
        self.stats.recompute_accuracy();
    }

    /// Periodic clock callback. No effect while paused or stopped.
    pub fn tick(&mut self, now: Instant) {
        if !self.is_typing {
            return;
        }
        if let Some(last) = self.last_measure {
            let (stats, anchor) = accrue(&self.stats, now, last);
            self.stats = stats;
            self.last_measure = Some(anchor);
        }
    }

    pub fn pause_stats(&mut self) {
        self.last_measure = None;
        self.is_typing = false;
    }

    pub fn resume_stats(&mut self, now: Instant) {
        self.last_measure = Some(now);
        self.is_typing = true;
    }

    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
        self.last_measure = None;
        self.is_typing = false;
    }

    pub fn restore_stats(
        &mut self,
        accuracy: f64,
        elapsed_seconds: u64,
        correct_type_count: u32,
        typo_count: u32,
        wpm: f64,
    ) {
        self.stats = Stats {
            accuracy,
            elapsed_seconds,
            correct_type_count,
            typo_count,
            wpm,
        };
        self.last_measure = None;
        self.is_typing = false;
    }
}

/// Fires at most once per `interval`, so every engine tick sees at least one
/// whole second.
#[derive(Clone, Debug)]
pub struct StatsTicker {
    interval: Duration,
    last_fire: Option<Instant>,
}

impl StatsTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.last_fire = Some(now);
    }

    pub fn disarm(&mut self) {
        self.last_fire = None;
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                self.last_fire = Some(now);
                true
            }
            _ => false,
        }
    }
}

impl Default for StatsTicker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
