use std::borrow::Cow;

use icu_normalizer::ComposingNormalizerBorrowed;

/// Per-character comparison of typed text against the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect(char),
    Pending,
}

/// Target text split into lines, with the typed text and cursor offset for
/// each line.
///
/// Offsets are counted in chars, never bytes. `cursor_positions[i]` always
/// equals the char length of `typed_text_lines[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineBuffer {
    pub target_text_lines: Vec<Vec<char>>,
    pub typed_text_lines: Vec<String>,
    pub cursor_positions: Vec<usize>,
    pub cursor_line: usize,
}

impl LineBuffer {
    pub fn new(target_text_lines: Vec<String>) -> Self {
        let mut target: Vec<Vec<char>> = target_text_lines
            .iter()
            .map(|line| line.chars().collect())
            .collect();
        if target.is_empty() {
            target.push(Vec::new());
        }
        let mut buffer = Self {
            target_text_lines: target,
            typed_text_lines: Vec::new(),
            cursor_positions: Vec::new(),
            cursor_line: 0,
        };
        buffer.initialize();
        buffer
    }

    /// Seed every line with its leading whitespace, so indentation counts as
    /// already typed, and put the cursor on the first line.
    pub fn initialize(&mut self) {
        self.cursor_positions = self
            .target_text_lines
            .iter()
            .map(|line| leading_whitespace_len(line))
            .collect();
        self.typed_text_lines = self
            .target_text_lines
            .iter()
            .zip(&self.cursor_positions)
            .map(|(line, &indent)| line[..indent].iter().collect())
            .collect();
        self.cursor_line = 0;
    }

    pub fn line_count(&self) -> usize {
        self.target_text_lines.len()
    }

    pub fn last_line_index(&self) -> usize {
        self.target_text_lines.len().saturating_sub(1)
    }

    pub fn line_len(&self, line: usize) -> usize {
        self.target_text_lines.get(line).map_or(0, Vec::len)
    }

    /// The target char under the cursor, if the current line still has one.
    pub fn expected_char(&self) -> Option<char> {
        let pos = self.cursor_positions[self.cursor_line];
        self.target_text_lines[self.cursor_line].get(pos).copied()
    }

    pub fn is_line_full(&self, line: usize) -> bool {
        self.cursor_positions[line] >= self.line_len(line)
    }

    pub fn is_complete(&self) -> bool {
        let last = self.last_line_index();
        self.cursor_line == last && self.cursor_positions[last] == self.line_len(last)
    }

    /// Derived correctness of every target char on `line`.
    pub fn char_states(&self, line: usize) -> Vec<CharState> {
        let Some(target) = self.target_text_lines.get(line) else {
            return Vec::new();
        };
        let mut typed = self.typed_text_lines[line].chars();
        target
            .iter()
            .map(|&expected| match typed.next() {
                Some(actual) if actual == expected => CharState::Correct,
                Some(actual) => CharState::Incorrect(actual),
                None => CharState::Pending,
            })
            .collect()
    }

    pub fn total_chars(&self) -> usize {
        self.target_text_lines.iter().map(Vec::len).sum()
    }

    pub fn typed_chars(&self) -> usize {
        self.cursor_positions.iter().sum()
    }

    pub fn progress(&self) -> f64 {
        let total = self.total_chars();
        if total == 0 {
            return 0.0;
        }
        self.typed_chars() as f64 / total as f64
    }

    /// Validates buffers loaded from elsewhere against this buffer's target.
    pub fn accepts_state(
        &self,
        typed_text_lines: &[String],
        cursor_positions: &[usize],
        cursor_line: usize,
    ) -> bool {
        let lines = self.line_count();
        if typed_text_lines.len() != lines || cursor_positions.len() != lines {
            return false;
        }
        if cursor_line >= lines {
            return false;
        }
        typed_text_lines
            .iter()
            .zip(cursor_positions)
            .enumerate()
            .all(|(i, (typed, &pos))| {
                let typed_len = typed.chars().count();
                typed_len == pos && pos <= self.line_len(i)
            })
    }
}

fn leading_whitespace_len(line: &[char]) -> usize {
    line.iter()
        .position(|c| !c.is_whitespace())
        .unwrap_or(0)
}

/// Prepare raw file content for typing: unify line endings, NFC-normalize and
/// split into lines that keep their trailing newline.
pub fn split_lines(content: &str) -> Vec<String> {
    let unified: Cow<str> = if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(content)
    };
    let normalized = ComposingNormalizerBorrowed::new_nfc().normalize(&unified);

    let mut lines: Vec<String> = normalized
        .split_inclusive('\n')
        .map(str::to_string)
        .collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Binary or otherwise untypeable content.
pub fn is_unsupported_content(content: &str) -> bool {
    content
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\t' | '\r'))
}
