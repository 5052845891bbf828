use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::result::format_elapsed;
use crate::session::stats::Stats;
use crate::session::typing::TypingStatus;
use crate::ui::theme::Theme;

/// Live numbers for the file being typed.
pub struct StatsSidebar<'a> {
    stats: &'a Stats,
    progress: f64,
    status: TypingStatus,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(stats: &'a Stats, progress: f64, status: TypingStatus, theme: &'a Theme) -> Self {
        Self {
            stats,
            progress,
            status,
            theme,
        }
    }
}

/// One-line form of the sidebar for narrow terminals.
pub fn compact_stats_line(stats: &Stats, progress: f64) -> String {
    format!(
        " WPM: {:.0} | Acc: {:.0}% | Errors: {} | {} | {:.0}%",
        stats.wpm,
        stats.accuracy,
        stats.typo_count,
        format_elapsed(stats.elapsed_seconds),
        progress * 100.0,
    )
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let stats = self.stats;

        let label = |text: &'static str| Span::styled(text, Style::default().fg(colors.fg()));

        let lines = vec![
            Line::from(vec![
                label("WPM: "),
                Span::styled(
                    format!("{:.0}", stats.wpm),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Accuracy: "),
                Span::styled(
                    format!("{:.0}%", stats.accuracy),
                    Style::default().fg(colors.accuracy_color(stats.accuracy)),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Progress: "),
                Span::styled(
                    format!("{:.0}%", self.progress * 100.0),
                    Style::default().fg(colors.accent()),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Correct: "),
                Span::styled(
                    stats.correct_type_count.to_string(),
                    Style::default().fg(colors.success()),
                ),
            ]),
            Line::from(vec![
                label("Errors:  "),
                Span::styled(
                    stats.typo_count.to_string(),
                    Style::default().fg(colors.error()),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                label("Time: "),
                Span::styled(
                    format_elapsed(stats.elapsed_seconds),
                    Style::default().fg(colors.fg()),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                self.status.as_str(),
                Style::default().fg(colors.text_pending()),
            )),
        ];

        let block = Block::bordered()
            .title(" Stats ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
