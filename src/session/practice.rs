use std::time::Instant;

use tracing::info;

use crate::session::buffer::{is_unsupported_content, split_lines};
use crate::session::result::SessionResult;
use crate::session::stats::{Stats, StatsEngine, StatsTicker};
use crate::session::typing::{Key, KeyOutcome, TypingMachine, TypingStatus};
use crate::store::progress::SavedProgress;

/// Everything scoped to the one file currently being typed. Switching files
/// means building a new `PracticeSession`, never mutating this one.
#[derive(Clone, Debug)]
pub struct PracticeSession {
    pub repository_id: u64,
    pub file_item_id: u64,
    pub file_path: String,
    machine: TypingMachine,
    stats: StatsEngine,
    ticker: StatsTicker,
}

impl PracticeSession {
    pub fn new(repository_id: u64, file_item_id: u64, file_path: &str, content: Option<&str>) -> Self {
        let machine = match content {
            Some(text) if !is_unsupported_content(text) => TypingMachine::new(split_lines(text)),
            _ => TypingMachine::unsupported(),
        };
        Self {
            repository_id,
            file_item_id,
            file_path: file_path.to_string(),
            machine,
            stats: StatsEngine::new(),
            ticker: StatsTicker::default(),
        }
    }

    pub fn machine(&self) -> &TypingMachine {
        &self.machine
    }

    pub fn status(&self) -> TypingStatus {
        self.machine.status()
    }

    pub fn stats(&self) -> Stats {
        self.stats.snapshot()
    }

    pub fn start(&mut self, now: Instant) {
        if self.machine.status() != TypingStatus::Ready {
            return;
        }
        self.machine.start_typing();
        self.stats.start_stats(now);
        self.ticker.arm(now);
    }

    pub fn pause(&mut self) {
        if self.machine.status() != TypingStatus::Typing {
            return;
        }
        self.machine.pause_typing();
        self.stats.pause_stats();
        self.ticker.disarm();
    }

    pub fn resume(&mut self, now: Instant) {
        if self.machine.status() != TypingStatus::Paused {
            return;
        }
        self.machine.resume_typing();
        self.stats.resume_stats(now);
        self.ticker.arm(now);
    }

    pub fn reset(&mut self) {
        self.machine.reset_typing();
        self.stats.reset_stats();
        self.ticker.disarm();
    }

    /// Apply one keystroke to the buffers and attribute its correctness to
    /// the statistics before returning.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.machine.handle_key(key);
        if let Some(correct) = outcome.correctness() {
            self.stats.update_stats(correct);
        }
        if matches!(outcome, KeyOutcome::Completed { .. }) {
            self.stats.pause_stats();
            self.ticker.disarm();
            info!(
                file = %self.file_path,
                wpm = self.stats.snapshot().wpm,
                accuracy = self.stats.snapshot().accuracy,
                "file completed"
            );
        }
        outcome
    }

    /// Host clock callback; accrues time at most once per second.
    pub fn on_tick(&mut self, now: Instant) {
        if self.ticker.poll(now) {
            self.stats.tick(now);
        }
    }

    pub fn result(&self) -> SessionResult {
        SessionResult::from_stats(
            &self.file_path,
            &self.stats.snapshot(),
            self.machine.buffer().total_chars(),
        )
    }

    /// Whether there is anything worth saving for later.
    pub fn has_progress(&self) -> bool {
        matches!(self.status(), TypingStatus::Typing | TypingStatus::Paused)
    }

    pub fn to_saved_progress(&self) -> SavedProgress {
        let buffer = self.machine.buffer();
        SavedProgress::new(
            self.repository_id,
            self.file_item_id,
            buffer.typed_text_lines.clone(),
            buffer.cursor_positions.clone(),
            buffer.cursor_line,
            self.stats.snapshot(),
        )
    }

    /// Rehydrate from saved progress. Stats are restored only when the
    /// buffers fit this file; the session is then paused.
    pub fn restore(&mut self, saved: SavedProgress) -> bool {
        if saved.repository_id != self.repository_id || saved.file_item_id != self.file_item_id {
            return false;
        }
        let stats = saved.stats;
        if !self
            .machine
            .restore(saved.typed_text_lines, saved.cursor_positions, saved.cursor_line)
        {
            return false;
        }
        self.stats.restore_stats(
            stats.accuracy,
            stats.elapsed_seconds,
            stats.correct_type_count,
            stats.typo_count,
            stats.wpm,
        );
        self.ticker.disarm();
        info!(file = %self.file_path, "progress restored");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const RUBY: &str = "def hello_world\n  puts 'Hello, World!'\nend\n";

    #[test]
    fn test_keystrokes_feed_stats() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new(1, 2, "hello.rb", Some(RUBY));
        session.start(t0);
        session.handle_key(Key::Char('d'));
        session.handle_key(Key::Char('x'));
        session.handle_key(Key::Backspace);
        session.handle_key(Key::Other);
        let stats = session.stats();
        assert_eq!(stats.correct_type_count, 1);
        assert_eq!(stats.typo_count, 1);
        assert_eq!(stats.accuracy, 50.0);
    }

    #[test]
    fn test_completion_stops_clock() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new(1, 2, "a.txt", Some("ab"));
        session.start(t0);
        session.handle_key(Key::Char('a'));
        session.on_tick(t0 + Duration::from_secs(1));
        assert_eq!(
            session.handle_key(Key::Char('b')),
            KeyOutcome::Completed { correct: true }
        );
        session.on_tick(t0 + Duration::from_secs(5));
        assert_eq!(session.stats().elapsed_seconds, 1);
        assert_eq!(session.status(), TypingStatus::Completed);
    }

    #[test]
    fn test_pause_and_resume() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new(1, 2, "a.txt", Some("abc"));
        session.start(t0);
        session.on_tick(t0 + Duration::from_secs(2));
        session.pause();
        session.on_tick(t0 + Duration::from_secs(30));
        assert_eq!(session.stats().elapsed_seconds, 2);
        session.resume(t0 + Duration::from_secs(30));
        session.on_tick(t0 + Duration::from_secs(31));
        assert_eq!(session.stats().elapsed_seconds, 3);
    }

    #[test]
    fn test_binary_content_is_unsupported() {
        let session = PracticeSession::new(1, 2, "logo.png", Some("\u{89}PNG\u{0}\u{1a}"));
        assert_eq!(session.status(), TypingStatus::Unsupported);
        let missing = PracticeSession::new(1, 2, "gone", None);
        assert_eq!(missing.status(), TypingStatus::Unsupported);
    }

    #[test]
    fn test_saved_progress_round_trip() {
        let t0 = Instant::now();
        let mut session = PracticeSession::new(1, 2, "hello.rb", Some(RUBY));
        session.start(t0);
        for ch in "def".chars() {
            session.handle_key(Key::Char(ch));
        }
        session.on_tick(t0 + Duration::from_secs(4));
        session.pause();
        let saved = session.to_saved_progress();

        let mut fresh = PracticeSession::new(1, 2, "hello.rb", Some(RUBY));
        assert!(fresh.restore(saved));
        assert_eq!(fresh.status(), TypingStatus::Paused);
        assert_eq!(fresh.machine().typed_text_lines(), ["def", "  ", ""]);
        assert_eq!(fresh.stats(), session.stats());

        let mut other_file = PracticeSession::new(1, 3, "hello.rb", Some(RUBY));
        assert!(!other_file.restore(session.to_saved_progress()));
    }
}
