use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // >=100 cols: typing area + stats sidebar
    Narrow, // <100 cols: full-width typing area, stats in the header
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }

    pub fn show_progress_bar(&self, height: u16) -> bool {
        height >= 16
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub progress: Option<Rect>,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(area);

        let (content, sidebar) = if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
                .split(vertical[1]);
            (horizontal[0], Some(horizontal[1]))
        } else {
            (vertical[1], None)
        };

        let (main, progress) = if tier.show_progress_bar(area.height) {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(content);
            (split[0], Some(split[1]))
        } else {
            (content, None)
        };

        Self {
            header: vertical[0],
            main,
            progress,
            sidebar,
            footer: vertical[2],
            tier,
        }
    }
}

/// Greedily pack footer hints into as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 12;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidebar_only_when_wide() {
        let wide = AppLayout::new(Rect::new(0, 0, 120, 40));
        assert!(wide.sidebar.is_some());
        let narrow = AppLayout::new(Rect::new(0, 0, 80, 40));
        assert!(narrow.sidebar.is_none());
        assert_eq!(narrow.main.width, 80);
    }

    #[test]
    fn test_progress_row_needs_height() {
        let tall = AppLayout::new(Rect::new(0, 0, 80, 30));
        let progress = tall.progress.unwrap();
        assert_eq!(progress.height, 1);
        assert_eq!(progress.y, tall.main.bottom());
        assert!(AppLayout::new(Rect::new(0, 0, 80, 10)).progress.is_none());
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let hints = ["[Esc] Pause", "[Ctrl-R] Reset", "[Ctrl-Q] Files"];
        let lines = pack_hint_lines(&hints, 30);
        assert_eq!(lines, vec![" [Esc] Pause  [Ctrl-R] Reset", " [Ctrl-Q] Files"]);
        assert!(pack_hint_lines(&hints, 0).is_empty());
    }

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(50, 50, area);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let big = Rect::new(0, 0, 200, 60);
        let rect = centered_rect(50, 50, big);
        assert_eq!(rect, Rect::new(50, 15, 100, 30));
    }
}
