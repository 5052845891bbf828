use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::api::types::RepositoryPreview;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Repository creation wizard: a URL field, then the previewed extensions
/// to include.
pub struct ImportForm<'a> {
    url: &'a LineInput,
    preview: Option<&'a RepositoryPreview>,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> ImportForm<'a> {
    pub fn new(
        url: &'a LineInput,
        preview: Option<&'a RepositoryPreview>,
        selected: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            url,
            preview,
            selected,
            theme,
        }
    }
}

impl Widget for ImportForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Import Repository ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            "  GitHub URL",
            Style::default().fg(colors.fg()),
        )))
        .render(layout[0], buf);

        let editing = self.preview.is_none();
        let (before, cursor_ch, after) = self.url.render_parts();
        let cursor_style = if editing {
            Style::default()
                .fg(colors.text_cursor_fg())
                .bg(colors.text_cursor_bg())
        } else {
            Style::default().fg(colors.accent())
        };
        let url_line = Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(before.to_string(), Style::default().fg(colors.accent())),
            Span::styled(cursor_ch.unwrap_or(' ').to_string(), cursor_style),
            Span::styled(after.to_string(), Style::default().fg(colors.accent())),
        ]);
        Paragraph::new(url_line).render(layout[1], buf);

        let (body, help) = match self.preview {
            None => (
                vec![Line::from(Span::styled(
                    "  Enter a repository URL and press Enter to preview it.",
                    Style::default().fg(colors.text_pending()),
                ))],
                "  [Enter] Preview  [Esc] Back",
            ),
            Some(preview) => {
                let mut lines = vec![
                    Line::from(vec![
                        Span::styled("  Name: ", Style::default().fg(colors.fg())),
                        Span::styled(
                            preview.name.clone(),
                            Style::default()
                                .fg(colors.accent())
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(""),
                ];
                if preview.extensions.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "  No typeable files found.",
                        Style::default().fg(colors.warning()),
                    )));
                }
                for (i, ext) in preview.extensions.iter().enumerate() {
                    let is_selected = i == self.selected;
                    let check = if ext.is_active { "[x]" } else { "[ ]" };
                    let style = Style::default()
                        .fg(if is_selected { colors.accent() } else { colors.fg() })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        });
                    lines.push(Line::from(vec![
                        Span::styled(if is_selected { " > " } else { "   " }, style),
                        Span::styled(format!("{check} {}", ext.name), style),
                        Span::styled(
                            format!("  ({} files)", ext.file_count),
                            Style::default().fg(colors.text_pending()),
                        ),
                    ]));
                }
                (lines, "  [Space] Toggle  [Enter] Create  [Esc] Edit URL")
            }
        };
        Paragraph::new(body).render(layout[2], buf);

        Paragraph::new(Line::from(Span::styled(
            help,
            Style::default().fg(colors.accent()),
        )))
        .render(layout[3], buf);
    }
}
