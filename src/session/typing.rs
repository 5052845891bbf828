use tracing::{debug, info, trace};

use crate::session::buffer::LineBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TypingStatus {
    #[default]
    Ready,
    Typing,
    Paused,
    Completed,
    Unsupported,
}

impl TypingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TypingStatus::Ready => "ready",
            TypingStatus::Typing => "typing",
            TypingStatus::Paused => "paused",
            TypingStatus::Completed => "completed",
            TypingStatus::Unsupported => "unsupported",
        }
    }
}

/// Host-agnostic keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    /// Tab, arrows and any other key without a printable value.
    Other,
}

/// What a keystroke did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Status was not `typing`; nothing changed.
    Ignored,
    /// Non-printable key. The host should swallow its default action.
    Suppressed,
    /// A char was appended. `correct` compares it against the target.
    Typed { correct: bool },
    /// The keystroke finished the file. `correct` as for `Typed`.
    Completed { correct: bool },
    Backspaced,
    /// Backspace at the very start of the text.
    NoOp,
}

impl KeyOutcome {
    /// Correctness signal for the statistics engine, if the key produced one.
    pub fn correctness(self) -> Option<bool> {
        match self {
            KeyOutcome::Typed { correct } | KeyOutcome::Completed { correct } => Some(correct),
            _ => None,
        }
    }

    /// Whether the host should prevent the key's default behavior.
    pub fn prevents_default(self, key: Key) -> bool {
        matches!(self, KeyOutcome::Suppressed) || key == Key::Char(' ')
    }
}

/// Drives one file-typing session: owns the line buffers and the
/// ready/typing/paused/completed lifecycle.
#[derive(Clone, Debug)]
pub struct TypingMachine {
    buffer: LineBuffer,
    status: TypingStatus,
}

impl TypingMachine {
    pub fn new(target_text_lines: Vec<String>) -> Self {
        Self {
            buffer: LineBuffer::new(target_text_lines),
            status: TypingStatus::Ready,
        }
    }

    /// A machine for content that cannot be typed. It never leaves
    /// `unsupported`.
    pub fn unsupported() -> Self {
        Self {
            buffer: LineBuffer::new(Vec::new()),
            status: TypingStatus::Unsupported,
        }
    }

    pub fn status(&self) -> TypingStatus {
        self.status
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn typed_text_lines(&self) -> &[String] {
        &self.buffer.typed_text_lines
    }

    pub fn cursor_positions(&self) -> &[usize] {
        &self.buffer.cursor_positions
    }

    pub fn cursor_line(&self) -> usize {
        self.buffer.cursor_line
    }

    pub fn start_typing(&mut self) {
        if self.status != TypingStatus::Ready {
            debug!(status = self.status.as_str(), "start ignored");
            return;
        }
        self.buffer.initialize();
        self.status = TypingStatus::Typing;
        info!(lines = self.buffer.line_count(), "typing started");
    }

    pub fn pause_typing(&mut self) {
        if self.status != TypingStatus::Typing {
            debug!(status = self.status.as_str(), "pause ignored");
            return;
        }
        self.status = TypingStatus::Paused;
        info!("typing paused");
    }

    pub fn resume_typing(&mut self) {
        if self.status != TypingStatus::Paused {
            debug!(status = self.status.as_str(), "resume ignored");
            return;
        }
        self.status = TypingStatus::Typing;
        info!("typing resumed");
    }

    pub fn restart(&mut self) {
        self.resume_typing();
    }

    pub fn reset_typing(&mut self) {
        match self.status {
            TypingStatus::Typing | TypingStatus::Paused | TypingStatus::Completed => {
                self.buffer.initialize();
                self.status = TypingStatus::Ready;
                info!("typing reset");
            }
            TypingStatus::Ready => self.buffer.initialize(),
            TypingStatus::Unsupported => {}
        }
    }

    /// Rehydrate previously saved buffers. The machine lands in `paused` so
    /// the host resumes explicitly. Returns false, leaving the machine
    /// untouched, when the saved state does not fit this target text.
    pub fn restore(
        &mut self,
        typed_text_lines: Vec<String>,
        cursor_positions: Vec<usize>,
        cursor_line: usize,
    ) -> bool {
        if self.status == TypingStatus::Unsupported
            || !self
                .buffer
                .accepts_state(&typed_text_lines, &cursor_positions, cursor_line)
        {
            return false;
        }
        self.buffer.typed_text_lines = typed_text_lines;
        self.buffer.cursor_positions = cursor_positions;
        self.buffer.cursor_line = cursor_line;
        self.status = if self.buffer.is_complete() {
            TypingStatus::Completed
        } else {
            TypingStatus::Paused
        };
        true
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        if self.status != TypingStatus::Typing {
            return KeyOutcome::Ignored;
        }
        let outcome = match key {
            Key::Char(ch) => self.type_char(ch),
            Key::Enter => self.type_char('\n'),
            Key::Backspace => self.backspace(),
            Key::Other => KeyOutcome::Suppressed,
        };
        trace!(?key, ?outcome, line = self.buffer.cursor_line, "key handled");
        outcome
    }

    fn type_char(&mut self, ch: char) -> KeyOutcome {
        let buffer = &mut self.buffer;
        let line = buffer.cursor_line;
        let correct = buffer.expected_char() == Some(ch);

        if !buffer.is_line_full(line) {
            buffer.typed_text_lines[line].push(ch);
            buffer.cursor_positions[line] += 1;
        }

        if buffer.is_line_full(line) {
            buffer.cursor_line = (line + 1).min(buffer.last_line_index());
        }

        if buffer.is_complete() {
            self.status = TypingStatus::Completed;
            info!("typing completed");
            return KeyOutcome::Completed { correct };
        }
        KeyOutcome::Typed { correct }
    }

    fn backspace(&mut self) -> KeyOutcome {
        let buffer = &mut self.buffer;
        let line = buffer.cursor_line;
        let position = buffer.cursor_positions[line];

        if position == 0 {
            if line == 0 {
                return KeyOutcome::NoOp;
            }
            let previous = line - 1;
            buffer.cursor_line = previous;
            buffer.typed_text_lines[previous].pop();
            buffer.cursor_positions[previous] = buffer.cursor_positions[previous].saturating_sub(1);
        } else {
            buffer.typed_text_lines[line].pop();
            buffer.cursor_positions[line] = position - 1;
        }
        KeyOutcome::Backspaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruby() -> TypingMachine {
        TypingMachine::new(vec![
            "def hello_world\n".to_string(),
            "  puts 'Hello, World!'\n".to_string(),
            "end\n".to_string(),
        ])
    }

    fn type_str(machine: &mut TypingMachine, text: &str) {
        for ch in text.chars() {
            machine.handle_key(Key::Char(ch));
        }
    }

    #[test]
    fn test_type_single_char() {
        let mut machine = ruby();
        machine.start_typing();
        assert_eq!(machine.handle_key(Key::Char('d')), KeyOutcome::Typed { correct: true });
        assert_eq!(machine.typed_text_lines(), ["d", "  ", ""]);
        assert_eq!(machine.cursor_positions(), [1, 2, 0]);
    }

    #[test]
    fn test_enter_advances_line() {
        let mut machine = ruby();
        machine.start_typing();
        type_str(&mut machine, "def hello_world");
        assert_eq!(machine.cursor_line(), 0);
        machine.handle_key(Key::Enter);
        assert_eq!(machine.typed_text_lines(), ["def hello_world\n", "  ", ""]);
        assert_eq!(machine.cursor_positions(), [16, 2, 0]);
        assert_eq!(machine.cursor_line(), 1);
    }

    #[test]
    fn test_backspace_crosses_line_boundary() {
        let mut machine = ruby();
        machine.start_typing();
        type_str(&mut machine, "def hello_world");
        machine.handle_key(Key::Enter);
        for _ in 0..3 {
            assert_eq!(machine.handle_key(Key::Backspace), KeyOutcome::Backspaced);
        }
        assert_eq!(machine.typed_text_lines(), ["def hello_world", "", ""]);
        assert_eq!(machine.cursor_positions(), [15, 0, 0]);
        assert_eq!(machine.cursor_line(), 0);
    }

    #[test]
    fn test_backspace_at_origin_is_noop() {
        let mut machine = ruby();
        machine.start_typing();
        let before = machine.buffer().clone();
        assert_eq!(machine.handle_key(Key::Backspace), KeyOutcome::NoOp);
        assert_eq!(machine.buffer(), &before);
    }

    #[test]
    fn test_typing_everything_completes() {
        let mut machine = ruby();
        machine.start_typing();
        type_str(&mut machine, "def hello_world\n");
        type_str(&mut machine, "puts 'Hello, World!'\n");
        type_str(&mut machine, "end");
        assert_eq!(machine.status(), TypingStatus::Typing);
        assert_eq!(
            machine.handle_key(Key::Enter),
            KeyOutcome::Completed { correct: true }
        );
        assert_eq!(machine.status(), TypingStatus::Completed);
        assert_eq!(machine.cursor_line(), 2);
    }

    #[test]
    fn test_typo_still_advances() {
        let mut machine = ruby();
        machine.start_typing();
        assert_eq!(machine.handle_key(Key::Char('x')), KeyOutcome::Typed { correct: false });
        assert_eq!(machine.cursor_positions()[0], 1);
    }

    #[test]
    fn test_other_keys_are_suppressed() {
        let mut machine = ruby();
        machine.start_typing();
        let before = machine.buffer().clone();
        let outcome = machine.handle_key(Key::Other);
        assert_eq!(outcome, KeyOutcome::Suppressed);
        assert!(outcome.prevents_default(Key::Other));
        assert_eq!(machine.buffer(), &before);
    }

    #[test]
    fn test_space_prevents_default() {
        let mut machine = ruby();
        machine.start_typing();
        let outcome = machine.handle_key(Key::Char(' '));
        assert!(outcome.prevents_default(Key::Char(' ')));
        assert!(!KeyOutcome::Typed { correct: true }.prevents_default(Key::Char('a')));
    }

    #[test]
    fn test_keys_ignored_unless_typing() {
        let mut machine = ruby();
        assert_eq!(machine.handle_key(Key::Char('d')), KeyOutcome::Ignored);

        machine.start_typing();
        machine.pause_typing();
        assert_eq!(machine.handle_key(Key::Char('d')), KeyOutcome::Ignored);
        assert_eq!(machine.typed_text_lines(), ["", "  ", ""]);

        machine.resume_typing();
        assert_eq!(machine.status(), TypingStatus::Typing);
        assert_eq!(machine.handle_key(Key::Char('d')), KeyOutcome::Typed { correct: true });
    }

    #[test]
    fn test_reset_from_any_status() {
        let mut machine = ruby();
        machine.start_typing();
        type_str(&mut machine, "def");
        machine.reset_typing();
        assert_eq!(machine.status(), TypingStatus::Ready);
        assert_eq!(machine.typed_text_lines(), ["", "  ", ""]);

        machine.start_typing();
        type_str(&mut machine, "de");
        machine.pause_typing();
        machine.reset_typing();
        assert_eq!(machine.status(), TypingStatus::Ready);
        assert_eq!(machine.cursor_positions(), [0, 2, 0]);
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let mut machine = ruby();
        machine.pause_typing();
        assert_eq!(machine.status(), TypingStatus::Ready);
        machine.resume_typing();
        assert_eq!(machine.status(), TypingStatus::Ready);
        machine.start_typing();
        machine.start_typing();
        assert_eq!(machine.status(), TypingStatus::Typing);
    }

    #[test]
    fn test_restart_is_resume() {
        let mut machine = ruby();
        machine.start_typing();
        machine.pause_typing();
        machine.restart();
        assert_eq!(machine.status(), TypingStatus::Typing);
    }

    #[test]
    fn test_empty_file_completes_on_first_key() {
        let mut machine = TypingMachine::new(vec![String::new()]);
        machine.start_typing();
        assert_eq!(
            machine.handle_key(Key::Char('a')),
            KeyOutcome::Completed { correct: false }
        );
        assert_eq!(machine.typed_text_lines(), [""]);
    }

    #[test]
    fn test_unsupported_never_starts() {
        let mut machine = TypingMachine::unsupported();
        machine.start_typing();
        machine.reset_typing();
        assert_eq!(machine.status(), TypingStatus::Unsupported);
        assert_eq!(machine.handle_key(Key::Char('a')), KeyOutcome::Ignored);
    }

    #[test]
    fn test_restore_lands_paused() {
        let mut machine = ruby();
        let restored = machine.restore(
            vec!["def hello_world\n".to_string(), "  pu".to_string(), String::new()],
            vec![16, 4, 0],
            1,
        );
        assert!(restored);
        assert_eq!(machine.status(), TypingStatus::Paused);
        machine.resume_typing();
        assert_eq!(machine.handle_key(Key::Char('t')), KeyOutcome::Typed { correct: true });
    }

    #[test]
    fn test_restore_rejects_foreign_state() {
        let mut machine = ruby();
        assert!(!machine.restore(vec!["x".to_string()], vec![1], 0));
        assert_eq!(machine.status(), TypingStatus::Ready);
    }
}
