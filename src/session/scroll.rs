use std::time::{Duration, Instant};

pub const DEFAULT_COOL_TIME: Duration = Duration::from_millis(150);
pub const DEFAULT_SCROLL_MARGIN: f64 = 0.1;

/// An axis-aligned box in the host's coordinate space (pixels, terminal
/// cells, ...).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

impl From<ratatui::layout::Rect> for Bounds {
    fn from(rect: ratatui::layout::Rect) -> Self {
        Self::new(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        )
    }
}

/// Scroll by this much on each axis to center the element in its container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRequest {
    pub dx: f64,
    pub dy: f64,
}

/// Throttled "keep the cursor visible" helper.
#[derive(Clone, Debug)]
pub struct AutoScroller {
    cool_time: Duration,
    scroll_margin: f64,
    last_scroll: Option<Instant>,
}

impl Default for AutoScroller {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoScroller {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_COOL_TIME, DEFAULT_SCROLL_MARGIN)
    }

    pub fn with_settings(cool_time: Duration, scroll_margin: f64) -> Self {
        Self {
            cool_time,
            scroll_margin,
            last_scroll: None,
        }
    }

    /// Decide whether `element` sits too close to the left or right edge of
    /// `container`. A missing element or container is a no-op, as is any
    /// call within the cool time of the previous scroll.
    pub fn scroll_into_view(
        &mut self,
        element: Option<Bounds>,
        container: Option<Bounds>,
        now: Instant,
    ) -> Option<ScrollRequest> {
        let (element, container) = (element?, container?);

        if let Some(last) = self.last_scroll {
            if now.saturating_duration_since(last) < self.cool_time {
                return None;
            }
        }

        let left_threshold = container.left + container.width * self.scroll_margin;
        let right_threshold = container.right() - container.width * self.scroll_margin;
        if element.left >= left_threshold && element.right() <= right_threshold {
            return None;
        }

        self.last_scroll = Some(now);
        let (ex, ey) = element.center();
        let (cx, cy) = container.center();
        Some(ScrollRequest {
            dx: ex - cx,
            dy: ey - cy,
        })
    }
}

/// Scroll offsets of a view onto content larger than the screen, in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub offset_x: u16,
    pub offset_y: u16,
}

impl Viewport {
    pub fn apply(&mut self, request: ScrollRequest) {
        self.offset_x = shift(self.offset_x, request.dx);
        self.offset_y = shift(self.offset_y, request.dy);
    }

    /// Bring `row` (content coordinates) back on screen, centered, when it
    /// has left the visible rows.
    pub fn follow_row(&mut self, row: u16, visible_rows: u16) {
        if visible_rows == 0 {
            return;
        }
        if row < self.offset_y || row >= self.offset_y.saturating_add(visible_rows) {
            self.offset_y = row.saturating_sub(visible_rows / 2);
        }
    }
}

fn shift(offset: u16, delta: f64) -> u16 {
    (offset as f64 + delta.round()).clamp(0.0, u16::MAX as f64) as u16
}
