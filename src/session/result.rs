use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::stats::Stats;

/// Summary shown once a file is finished. Display values keep one decimal,
/// unlike the integer-rounded live stats.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResult {
    pub file_path: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub correct: u32,
    pub incorrect: u32,
    pub elapsed_secs: u64,
    pub total_chars: usize,
    pub timestamp: DateTime<Utc>,
}

impl SessionResult {
    pub fn from_stats(file_path: &str, stats: &Stats, total_chars: usize) -> Self {
        let accuracy = if stats.total_keystrokes() == 0 {
            100.0
        } else {
            round_one_decimal(stats.correct_type_count as f64 / stats.total_keystrokes() as f64 * 100.0)
        };
        let wpm = if stats.elapsed_seconds == 0 {
            0.0
        } else {
            round_one_decimal(stats.correct_type_count as f64 / 5.0 / (stats.elapsed_seconds as f64 / 60.0))
        };
        Self {
            file_path: file_path.to_string(),
            wpm,
            accuracy,
            correct: stats.correct_type_count,
            incorrect: stats.typo_count,
            elapsed_secs: stats.elapsed_seconds,
            total_chars,
            timestamp: Utc::now(),
        }
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `m:ss`, or `h:mm:ss` past the hour.
pub fn format_elapsed(secs: u64) -> String {
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_decimal_display() {
        let stats = Stats {
            accuracy: 67.0,
            elapsed_seconds: 45,
            correct_type_count: 2,
            typo_count: 1,
            wpm: 1.0,
        };
        let result = SessionResult::from_stats("src/lib.rs", &stats, 3);
        assert_eq!(result.accuracy, 66.7);
        // 2 / 5 / 0.75
        assert_eq!(result.wpm, 0.5);
    }

    #[test]
    fn test_no_keystrokes() {
        let result = SessionResult::from_stats("a", &Stats::default(), 0);
        assert_eq!(result.accuracy, 100.0);
        assert_eq!(result.wpm, 0.0);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(75), "1:15");
        assert_eq!(format_elapsed(3725), "1:02:05");
    }
}
