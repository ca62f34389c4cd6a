//! Viewport window over the document's lines
//!
//! Lines are uniform height, so the visible range is plain arithmetic on the
//! scroll offset:
//!
//! ```text
//! start = floor(scroll_top / line_height)
//! end   = min(line_count - 1, ceil((viewport_height + scroll_top) / line_height))
//! ```
//!
//! The *extra* range pads both ends by a fixed margin so nearby lines are
//! already materialized when the user scrolls. The window remembers which
//! extra range it last handed out and reports only the difference on the next
//! update: lines that entered, lines that were evicted, and lines that must be
//! re-pulled because an edit touched them.

use std::ops::RangeInclusive;

/// Default number of rows kept materialized above and below the visible range
pub const DEFAULT_VIEWPORT_MARGIN: usize = 30;

/// Inclusive range of line indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn lines(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Lines of `self` that are not in `other`, in ascending order
    pub fn difference(&self, other: &LineRange) -> Vec<usize> {
        let mut lines = Vec::new();
        if other.end < self.start || self.end < other.start {
            lines.extend(self.lines());
            return lines;
        }
        if self.start < other.start {
            lines.extend(self.start..other.start);
        }
        if other.end < self.end {
            lines.extend(other.end + 1..=self.end);
        }
        lines
    }

    /// Overlap of two ranges, if any
    pub fn intersection(&self, other: &LineRange) -> Option<LineRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(LineRange { start, end })
    }

    fn union_hull(&self, other: &LineRange) -> LineRange {
        LineRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Lines covered by a viewport of `viewport_height` pixels scrolled to `scroll_top`
pub fn visible_range(
    scroll_top: f32,
    viewport_height: f32,
    line_height: f32,
    line_count: usize,
) -> LineRange {
    let last = line_count.saturating_sub(1);
    if line_height <= 0.0 {
        return LineRange::new(0, 0);
    }
    let scroll_top = scroll_top.max(0.0);
    let start = ((scroll_top / line_height).floor() as usize).min(last);
    let end = (((viewport_height.max(0.0) + scroll_top) / line_height).ceil() as usize).min(last);
    LineRange::new(start, end.max(start))
}

/// Pad `range` by `margin` rows on each side, clamped to the document
pub fn pad_range(range: LineRange, margin: usize, line_count: usize) -> LineRange {
    let last = line_count.saturating_sub(1);
    LineRange::new(
        range.start.saturating_sub(margin).min(last),
        range.end.saturating_add(margin).min(last),
    )
}

/// What changed in the materialized set since the previous update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowDelta {
    /// Lines that must be fetched because they just entered the window
    pub entered: Vec<usize>,
    /// Lines that left the window and can be dropped
    pub evicted: Vec<usize>,
    /// Lines that stayed in the window but were invalidated by an edit
    pub refreshed: Vec<usize>,
    /// Whether the whole window was rebuilt
    pub full: bool,
}

impl WindowDelta {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.evicted.is_empty() && self.refreshed.is_empty()
    }
}

/// Scroll state plus the set of lines currently materialized for rendering
#[derive(Debug, Clone)]
pub struct ViewportWindow {
    /// Distance in pixels from the top of the document to the top of the viewport
    scroll_top: f32,
    viewport_height: f32,
    line_height: f32,
    margin: usize,

    visible: LineRange,
    extra: LineRange,

    /// Extra range as of the last update; `None` before the first render
    materialized: Option<LineRange>,

    /// Lines invalidated by edits since the last update
    dirty: Option<LineRange>,

    /// Rebuild everything on the next update
    needs_full: bool,

    /// Scroll or size changed since the last update
    needs_update: bool,
}

impl ViewportWindow {
    pub fn new(viewport_height: f32, line_height: f32, margin: usize) -> Self {
        Self {
            scroll_top: 0.0,
            viewport_height,
            line_height,
            margin,
            visible: LineRange::default(),
            extra: LineRange::default(),
            materialized: None,
            dirty: None,
            needs_full: true,
            needs_update: true,
        }
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Visible range as of the last update
    pub fn visible(&self) -> LineRange {
        self.visible
    }

    /// Padded range as of the last update
    pub fn extra(&self) -> LineRange {
        self.extra
    }

    /// Number of whole rows the viewport shows
    pub fn rows(&self) -> usize {
        if self.line_height <= 0.0 {
            return 1;
        }
        ((self.viewport_height / self.line_height).floor() as usize).max(1)
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update || self.needs_full || self.dirty.is_some()
    }

    pub fn scroll_to(&mut self, scroll_top: f32) {
        let scroll_top = scroll_top.max(0.0);
        if scroll_top != self.scroll_top {
            self.scroll_top = scroll_top;
            self.needs_update = true;
        }
    }

    pub fn resize(&mut self, viewport_height: f32) {
        let viewport_height = viewport_height.max(0.0);
        if viewport_height != self.viewport_height {
            self.viewport_height = viewport_height;
            self.needs_update = true;
        }
    }

    /// Scroll just enough that `line` is inside the visible range
    pub fn ensure_visible(&mut self, line: usize) {
        if self.line_height <= 0.0 || self.viewport_height < self.line_height {
            return;
        }
        let top = line as f32 * self.line_height;
        let bottom = top + self.line_height;
        if top < self.scroll_top {
            self.scroll_to(top);
        } else if bottom > self.scroll_top + self.viewport_height {
            self.scroll_to(bottom - self.viewport_height);
        }
    }

    /// Invalidate `lines` after an edit; they are re-pulled on the next update
    pub fn mark_dirty(&mut self, lines: LineRange) {
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union_hull(&lines),
            None => lines,
        });
    }

    /// Invalidate every line from `line` to the end of the document
    pub fn mark_dirty_from(&mut self, line: usize) {
        self.mark_dirty(LineRange::new(line, usize::MAX));
    }

    /// Drop the materialized set so the next update rebuilds it
    pub fn reset(&mut self) {
        self.needs_full = true;
    }

    /// Recompute the window for a document of `line_count` lines and report
    /// which lines to fetch and which to drop.
    pub fn update(&mut self, line_count: usize) -> WindowDelta {
        let visible = visible_range(
            self.scroll_top,
            self.viewport_height,
            self.line_height,
            line_count,
        );
        let extra = pad_range(visible, self.margin, line_count);
        self.visible = visible;
        self.extra = extra;

        let delta = match self.materialized {
            Some(old) if !self.needs_full => {
                let refreshed = self
                    .dirty
                    .and_then(|dirty| dirty.intersection(&extra))
                    .and_then(|dirty| dirty.intersection(&old))
                    .map(|range| range.lines().collect())
                    .unwrap_or_default();
                WindowDelta {
                    entered: extra.difference(&old),
                    evicted: old.difference(&extra),
                    refreshed,
                    full: false,
                }
            }
            old => WindowDelta {
                entered: extra.lines().collect(),
                evicted: old
                    .map(|old| old.difference(&extra))
                    .unwrap_or_default(),
                refreshed: Vec::new(),
                full: true,
            },
        };

        tracing::trace!(
            "viewport update: visible={:?} extra={:?} entered={} evicted={} refreshed={} full={}",
            visible,
            extra,
            delta.entered.len(),
            delta.evicted.len(),
            delta.refreshed.len(),
            delta.full
        );

        self.materialized = Some(extra);
        self.dirty = None;
        self.needs_full = false;
        self.needs_update = false;
        delta
    }
}

impl Default for ViewportWindow {
    fn default() -> Self {
        Self::new(0.0, 20.0, DEFAULT_VIEWPORT_MARGIN)
    }
}
