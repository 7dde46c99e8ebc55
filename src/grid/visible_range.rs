//! Visible-range tracking - pixel windows per axis
//!
//! Horizontal: from the grid's own [`ScrollState`].
//! Vertical: the grid sits inside an outer scrolling list, so its window is
//! the outer viewport mapped into the grid's local coordinates.
//!
//! Both trackers are [`Derived`] nodes keyed on integer pixels: sub-pixel
//! scroll changes never bump their revision.

use super::derived::Derived;
use super::scroll::ScrollState;
use super::Px;
use tracing::trace;

/// Half-open pixel interval `[start, end)`.
///
/// # Invariants
/// - `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRange {
    /// First visible pixel.
    pub start: Px,
    /// One past the last visible pixel.
    pub end: Px,
}

impl PixelRange {
    /// Create a range; an inverted interval collapses to empty at `start`.
    pub fn new(start: Px, end: Px) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Width of the interval.
    pub fn len(&self) -> Px {
        self.end - self.start
    }

    /// True when no pixel is covered.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check whether pixel `value` is covered.
    pub fn contains(&self, value: Px) -> bool {
        (self.start..self.end).contains(&value)
    }
}

/// Horizontal window for a given offset, content width and viewport width.
///
/// `start = clamp(offset, 0, max(0, content - viewport))`,
/// `end = start + viewport`.
pub fn horizontal_visible_range(offset: Px, content: Px, viewport: Px) -> PixelRange {
    let max_offset = (content - viewport).max(0);
    let start = offset.clamp(0, max_offset);
    PixelRange::new(start, start + viewport.max(0))
}

/// Memoized horizontal window of one grid.
#[derive(Debug, Clone, Default)]
pub struct HorizontalRangeTracker {
    node: Derived<(Px, Px, Px), PixelRange>,
}

impl HorizontalRangeTracker {
    /// Create a tracker with nothing computed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current window of `scroll`.
    pub fn range(&mut self, scroll: &ScrollState) -> PixelRange {
        self.range_for(scroll.offset_px(), scroll.content(), scroll.viewport())
    }

    /// Window for explicit inputs; recomputed only when one of them changes.
    pub fn range_for(&mut self, offset: Px, content: Px, viewport: Px) -> PixelRange {
        *self.node.get((offset, content, viewport), |&(offset, content, viewport)| {
            let range = horizontal_visible_range(offset, content, viewport);
            trace!(start = range.start, end = range.end, "Horizontal range changed");
            range
        })
    }

    /// Bumped whenever the window changes.
    pub fn revision(&self) -> u64 {
        self.node.revision()
    }
}

/// One item currently laid out by the outer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem {
    /// Position of the item in the list.
    pub index: usize,
    /// Top edge relative to the list viewport (negative when scrolled past).
    pub offset: Px,
    /// Item height.
    pub size: Px,
}

/// Geometry signals from the outer vertically scrolling list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OuterListGeometry {
    /// Height of the list viewport.
    pub viewport_height: Px,
    /// Index of the first visible item.
    pub first_visible_index: usize,
    /// How far the first visible item is scrolled past the top edge.
    pub first_visible_scroll_offset: Px,
    /// Items currently laid out, in list order.
    pub visible_items: Vec<ListItem>,
}

impl OuterListGeometry {
    /// Visible item whose extent contains pixel `y`.
    pub fn item_at(&self, y: Px) -> Option<&ListItem> {
        self.visible_items
            .iter()
            .find(|item| (item.offset..item.offset + item.size).contains(&y))
    }
}

/// Vertical window of a grid embedded in an outer list.
///
/// `table_top` and `table_height` are the grid's bounds relative to the outer
/// viewport. The outer viewport is clipped to the grid:
/// `[clamp(-table_top, 0, h), clamp(viewport_height - table_top, 0, h))`.
///
/// When the item containing the grid's top edge is the list's first visible
/// item, its scroll offset replaces the lower bound: it is updated more
/// often than the item bounds and keeps the sticky row steady.
///
/// Returns `None` when the grid is off-screen.
pub fn vertical_visible_range(
    table_top: Px,
    table_height: Px,
    geometry: &OuterListGeometry,
) -> Option<PixelRange> {
    let height = table_height.max(0);
    let mut start = (-table_top).clamp(0, height);
    let end = (geometry.viewport_height - table_top).clamp(0, height);

    if geometry
        .item_at(table_top)
        .is_some_and(|item| item.index == geometry.first_visible_index)
    {
        start = geometry.first_visible_scroll_offset;
    }

    (start < end).then(|| PixelRange::new(start, end))
}

/// Memoized vertical window of one grid.
#[derive(Debug, Clone, Default)]
pub struct VerticalRangeTracker {
    node: Derived<(Px, Px, Px, Option<Px>), Option<PixelRange>>,
}

impl VerticalRangeTracker {
    /// Create a tracker with nothing computed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current window; recomputed only when the inputs it reads change.
    pub fn range(
        &mut self,
        table_top: Px,
        table_height: Px,
        geometry: &OuterListGeometry,
    ) -> Option<PixelRange> {
        let first_item_offset = geometry
            .item_at(table_top)
            .filter(|item| item.index == geometry.first_visible_index)
            .map(|_| geometry.first_visible_scroll_offset);
        let deps = (
            table_top,
            table_height,
            geometry.viewport_height,
            first_item_offset,
        );
        *self.node.get(deps, |_| {
            let range = vertical_visible_range(table_top, table_height, geometry);
            trace!(?range, "Vertical range changed");
            range
        })
    }

    /// Bumped whenever the window changes.
    pub fn revision(&self) -> u64 {
        self.node.revision()
    }
}
