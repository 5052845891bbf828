use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::ui::theme::Theme;

/// Borderless one-row gauge: `label` on the left, the bar filling the rest.
pub struct ProgressBar<'a> {
    label: String,
    ratio: f64,
    theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: impl Into<String>, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            label: label.into(),
            ratio: if ratio.is_finite() {
                ratio.clamp(0.0, 1.0)
            } else {
                0.0
            },
            theme,
        }
    }
}

/// Cells of a `width`-wide bar that are filled at `ratio`.
pub fn filled_cells(ratio: f64, width: u16) -> u16 {
    (ratio * width as f64).round() as u16
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let colors = &self.theme.colors;

        let label = format!(" {} {:>3.0}% ", self.label, self.ratio * 100.0);
        let label_width = (label.chars().count() as u16).min(area.width);
        buf.set_stringn(
            area.x,
            area.y,
            &label,
            label_width as usize,
            Style::default().fg(colors.fg()).bg(colors.bg()),
        );

        let bar_x = area.x + label_width;
        let bar_width = area.width - label_width;
        let filled = filled_cells(self.ratio, bar_width);
        for x in bar_x..bar_x + bar_width {
            let style = if x < bar_x + filled {
                Style::default().bg(colors.bar_filled())
            } else {
                Style::default().bg(colors.bar_empty())
            };
            buf[(x, area.y)].set_symbol(" ").set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_cells() {
        assert_eq!(filled_cells(0.0, 40), 0);
        assert_eq!(filled_cells(0.5, 40), 20);
        assert_eq!(filled_cells(1.0, 40), 40);
    }

    #[test]
    fn test_ratio_is_clamped() {
        let theme = Theme::default();
        assert_eq!(ProgressBar::new("x", 3.0, &theme).ratio, 1.0);
        assert_eq!(ProgressBar::new("x", f64::NAN, &theme).ratio, 0.0);
    }
}
