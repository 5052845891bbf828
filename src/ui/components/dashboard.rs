use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::result::SessionResult;
use crate::ui::theme::Theme;

/// Where the "mark as typed" request stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncState {
    Pending,
    Saved,
    Failed(String),
}

pub struct Dashboard<'a> {
    pub result: &'a SessionResult,
    pub sync: &'a SyncState,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(result: &'a SessionResult, sync: &'a SyncState, theme: &'a Theme) -> Self {
        Self {
            result,
            sync,
            theme,
        }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" File Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            self.result.file_path.as_str(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let wpm_line = Line::from(vec![
            Span::styled("  Speed:    ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1} WPM", self.result.wpm),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(wpm_line).render(layout[1], buf);

        let acc_line = Line::from(vec![
            Span::styled("  Accuracy: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1}%", self.result.accuracy),
                Style::default()
                    .fg(colors.accuracy_color(self.result.accuracy))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ({} correct, {} chars)",
                    self.result.correct, self.result.total_chars
                ),
                Style::default().fg(colors.text_pending()),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[2], buf);

        let time_line = Line::from(vec![
            Span::styled("  Time:     ", Style::default().fg(colors.fg())),
            Span::styled(self.result.elapsed_display(), Style::default().fg(colors.fg())),
        ]);
        Paragraph::new(time_line).render(layout[3], buf);

        let errors_line = Line::from(vec![
            Span::styled("  Errors:   ", Style::default().fg(colors.fg())),
            Span::styled(
                self.result.incorrect.to_string(),
                Style::default().fg(if self.result.incorrect == 0 {
                    colors.success()
                } else {
                    colors.error()
                }),
            ),
        ]);
        Paragraph::new(errors_line).render(layout[4], buf);

        let sync_lines: Vec<Line> = match self.sync {
            SyncState::Pending => vec![Line::from(Span::styled(
                "  Saving...",
                Style::default().fg(colors.text_pending()),
            ))],
            SyncState::Saved => vec![Line::from(Span::styled(
                "  Marked as typed",
                Style::default().fg(colors.success()),
            ))],
            SyncState::Failed(message) => message
                .lines()
                .map(|line| {
                    Line::from(Span::styled(
                        format!("  {line}"),
                        Style::default().fg(colors.error()),
                    ))
                })
                .collect(),
        };
        Paragraph::new(sync_lines).render(layout[5], buf);

        let help = Paragraph::new(Line::from(vec![
            Span::styled("  [Enter] Files  ", Style::default().fg(colors.accent())),
            Span::styled("[r] Type again  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Quit", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[6], buf);
    }
}
