use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::buffer::{CharState, LineBuffer};
use crate::session::scroll::{Bounds, Viewport};
use crate::session::typing::TypingStatus;
use crate::ui::theme::Theme;

const TAB_WIDTH: usize = 4;

pub struct TypingArea<'a> {
    buffer: &'a LineBuffer,
    status: TypingStatus,
    title: &'a str,
    viewport: Viewport,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(
        buffer: &'a LineBuffer,
        status: TypingStatus,
        title: &'a str,
        viewport: Viewport,
        theme: &'a Theme,
    ) -> Self {
        Self {
            buffer,
            status,
            title,
            viewport,
            theme,
        }
    }

    /// The text region inside the border.
    pub fn inner(area: Rect) -> Rect {
        Block::bordered().inner(area)
    }
}

/// A render token maps a single target character to its display representation.
struct RenderToken {
    display: String,
    width: usize,
}

/// Expand one target line into render tokens, showing whitespace that has to
/// be typed.
fn build_line_tokens(target: &[char]) -> Vec<RenderToken> {
    let mut tokens = Vec::with_capacity(target.len());
    let mut col = 0usize;

    for &ch in target {
        let token = match ch {
            '\n' => RenderToken {
                display: "\u{21b5}".to_string(), // ↵
                width: 1,
            },
            '\t' => {
                let tab_width = TAB_WIDTH - (col % TAB_WIDTH);
                let mut display = String::from("\u{2192}"); // →
                for _ in 1..tab_width {
                    display.push('\u{00b7}'); // ·
                }
                RenderToken {
                    display,
                    width: tab_width,
                }
            }
            _ => RenderToken {
                display: ch.to_string(),
                width: 1,
            },
        };
        col += token.width;
        tokens.push(token);
    }

    tokens
}

/// Display column of the cursor within its line.
pub fn cursor_column(buffer: &LineBuffer) -> usize {
    let line = buffer.cursor_line;
    let pos = buffer.cursor_positions[line];
    build_line_tokens(&buffer.target_text_lines[line])
        .iter()
        .take(pos)
        .map(|t| t.width)
        .sum()
}

/// Screen-space box of the cursor cell, given the text region and the
/// current scroll offsets. May lie outside `inner` when scrolled away.
pub fn cursor_bounds(buffer: &LineBuffer, inner: Rect, viewport: Viewport) -> Bounds {
    let col = cursor_column(buffer) as f64;
    let row = buffer.cursor_line as f64;
    Bounds::new(
        inner.x as f64 + col - viewport.offset_x as f64,
        inner.y as f64 + row - viewport.offset_y as f64,
        1.0,
        1.0,
    )
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let status_label = match self.status {
            TypingStatus::Ready => " Ready: [Ctrl-S] to start ",
            TypingStatus::Typing => "",
            TypingStatus::Paused => " Paused: [Esc] to resume ",
            TypingStatus::Completed => " Completed ",
            TypingStatus::Unsupported => " Unsupported ",
        };

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .title_bottom(Line::from(status_label).right_aligned())
            .border_style(Style::default().fg(if self.status == TypingStatus::Typing {
                colors.border_focused()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.bg()));

        if self.status == TypingStatus::Unsupported {
            Paragraph::new(Line::from(Span::styled(
                "This file cannot be typed (binary or missing content).",
                Style::default().fg(colors.warning()),
            )))
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
            return;
        }

        let show_cursor = matches!(self.status, TypingStatus::Typing | TypingStatus::Paused);
        let cursor_line = self.buffer.cursor_line;
        let cursor_pos = self.buffer.cursor_positions[cursor_line];

        let lines: Vec<Line> = (0..self.buffer.line_count())
            .map(|i| {
                let target = &self.buffer.target_text_lines[i];
                let states = self.buffer.char_states(i);
                let tokens = build_line_tokens(target);

                let spans: Vec<Span> = tokens
                    .into_iter()
                    .zip(states)
                    .enumerate()
                    .map(|(j, (token, state))| {
                        let is_cursor = show_cursor && i == cursor_line && j == cursor_pos;
                        let style = match state {
                            _ if is_cursor => Style::default()
                                .fg(colors.text_cursor_fg())
                                .bg(colors.text_cursor_bg()),
                            CharState::Correct => Style::default().fg(colors.text_correct()),
                            CharState::Incorrect(_) => Style::default()
                                .fg(colors.text_incorrect())
                                .bg(colors.text_incorrect_bg())
                                .add_modifier(Modifier::UNDERLINED),
                            CharState::Pending => Style::default().fg(colors.text_pending()),
                        };

                        // Mistyped printable chars show what was typed; whitespace
                        // keeps its marker so the layout does not shift.
                        let display = match state {
                            CharState::Incorrect(actual)
                                if !target[j].is_whitespace() && !actual.is_control() =>
                            {
                                actual.to_string()
                            }
                            _ => token.display,
                        };
                        Span::styled(display, style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(block)
            .scroll((self.viewport.offset_y, self.viewport.offset_x))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::buffer::split_lines;

    fn buffer(text: &str) -> LineBuffer {
        LineBuffer::new(split_lines(text))
    }

    #[test]
    fn test_render_tokens_basic() {
        let target: Vec<char> = "abc".chars().collect();
        let tokens = build_line_tokens(&target);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].display, "a");
        assert_eq!(tokens[2].display, "c");
    }

    #[test]
    fn test_render_tokens_newline() {
        let target: Vec<char> = "a\n".chars().collect();
        let tokens = build_line_tokens(&target);
        assert_eq!(tokens[1].display, "\u{21b5}");
        assert_eq!(tokens[1].width, 1);
    }

    #[test]
    fn test_render_tokens_tab_alignment() {
        let target: Vec<char> = "\tab\t".chars().collect();
        let tokens = build_line_tokens(&target);
        assert_eq!(tokens[0].display, "\u{2192}\u{00b7}\u{00b7}\u{00b7}");
        assert_eq!(tokens[0].width, 4);
        // "ab" ends at col 6, so the second tab is two cells wide
        assert_eq!(tokens[3].display, "\u{2192}\u{00b7}");
        assert_eq!(tokens[3].width, 2);
    }

    #[test]
    fn test_cursor_column_counts_tab_cells() {
        let buf = buffer("\tx = 1\n");
        // leading tab is pre-typed; cursor sits on 'x'
        assert_eq!(buf.cursor_positions[0], 1);
        assert_eq!(cursor_column(&buf), 4);
    }

    #[test]
    fn test_cursor_bounds_follow_viewport() {
        let mut buf = buffer("ab\n  cd\n");
        buf.cursor_line = 1;
        let inner = Rect::new(1, 1, 20, 5);
        let at_origin = cursor_bounds(&buf, inner, Viewport::default());
        assert_eq!(at_origin, Bounds::new(3.0, 2.0, 1.0, 1.0));

        let scrolled = Viewport {
            offset_x: 5,
            offset_y: 0,
        };
        assert_eq!(cursor_bounds(&buf, inner, scrolled).left, -2.0);
    }

    #[test]
    fn test_render_marks_newline_and_mistake() {
        let mut buf = buffer("ab\n");
        buf.typed_text_lines[0] = "x".to_string();
        buf.cursor_positions[0] = 1;
        let theme = Theme::default();
        let area = Rect::new(0, 0, 12, 3);
        let mut out = Buffer::empty(area);
        TypingArea::new(&buf, TypingStatus::Typing, "a.txt", Viewport::default(), &theme)
            .render(area, &mut out);

        assert_eq!(out[(1, 1)].symbol(), "x");
        assert_eq!(out[(2, 1)].symbol(), "b");
        assert_eq!(out[(3, 1)].symbol(), "\u{21b5}");
        assert_eq!(out[(2, 1)].bg, theme.colors.text_cursor_bg());
    }

    #[test]
    fn test_unsupported_shows_notice() {
        let buf = buffer("");
        let theme = Theme::default();
        let area = Rect::new(0, 0, 70, 3);
        let mut out = Buffer::empty(area);
        TypingArea::new(&buf, TypingStatus::Unsupported, "blob.bin", Viewport::default(), &theme)
            .render(area, &mut out);
        let row: String = (0..70).map(|x| out[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("cannot be typed"));
    }
}
