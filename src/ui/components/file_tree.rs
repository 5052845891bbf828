use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::api::types::{FileStatus, FileType, TreeRow};
use crate::ui::theme::Theme;

pub struct FileTree<'a> {
    title: &'a str,
    rows: &'a [TreeRow],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> FileTree<'a> {
    pub fn new(title: &'a str, rows: &'a [TreeRow], selected: usize, theme: &'a Theme) -> Self {
        Self {
            title,
            rows,
            selected,
            theme,
        }
    }
}

/// First row to draw so that `selected` stays inside a window of `height`
/// rows.
pub fn window_start(selected: usize, len: usize, height: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    let half = height / 2;
    selected.saturating_sub(half).min(len - height)
}

fn status_marker(row: &TreeRow) -> &'static str {
    match (row.kind, row.status) {
        (FileType::Dir, _) => "  ",
        (FileType::File, FileStatus::Typed) => "\u{2713} ",  // ✓
        (FileType::File, FileStatus::Typing) => "\u{2026} ", // …
        (FileType::File, FileStatus::Untyped) => "  ",
    }
}

impl Widget for FileTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  No files in this repository.",
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let start = window_start(self.selected, self.rows.len(), height);

        let lines: Vec<Line> = self
            .rows
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, row)| {
                let is_selected = i == self.selected;
                let indent = "  ".repeat(row.depth);
                let name = if row.kind == FileType::Dir {
                    format!("{}/", row.name)
                } else {
                    row.name.clone()
                };

                let marker_color = match row.status {
                    FileStatus::Typed => colors.success(),
                    FileStatus::Typing => colors.warning(),
                    FileStatus::Untyped => colors.text_pending(),
                };
                let mut name_style = Style::default().fg(if row.kind == FileType::Dir {
                    colors.accent()
                } else {
                    colors.fg()
                });
                if is_selected {
                    name_style = name_style
                        .bg(colors.accent_dim())
                        .add_modifier(Modifier::BOLD);
                }

                Line::from(vec![
                    Span::styled(if is_selected { " > " } else { "   " }, name_style),
                    Span::styled(status_marker(row), Style::default().fg(marker_color)),
                    Span::styled(format!("{indent}{name}"), name_style),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start_keeps_selection_visible() {
        assert_eq!(window_start(0, 5, 10), 0);
        assert_eq!(window_start(3, 100, 10), 0);
        assert_eq!(window_start(50, 100, 10), 45);
        assert_eq!(window_start(99, 100, 10), 90);
        assert_eq!(window_start(4, 100, 0), 0);
    }

    #[test]
    fn test_status_markers() {
        let row = |kind, status| TreeRow {
            id: 1,
            name: "x".to_string(),
            depth: 0,
            kind,
            status,
        };
        assert_eq!(status_marker(&row(FileType::File, FileStatus::Typed)), "\u{2713} ");
        assert_eq!(status_marker(&row(FileType::Dir, FileStatus::Typed)), "  ");
    }
}
