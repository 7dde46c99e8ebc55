//! Screen-level scroll registry and pointer dispatch
//!
//! Every horizontally scrollable grid on a screen gets a [`ScrollState`],
//! created on first use and keyed by grid name. The registry also remembers
//! where each grid was last laid out (in the outer list's coordinates) so a
//! pointer-down can be routed to the grid under it.
//!
//! [`DragDispatcher`] turns raw pointer events into drag deltas and release
//! calls on the grid that was hit.

use super::scroll::{FlingConfig, ScrollState};
use super::Px;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace};

/// Default horizontal movement (px) before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 10.0;

/// Axis-aligned rectangle in the outer list's coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    /// Left edge.
    pub x: Px,
    /// Top edge.
    pub y: Px,
    /// Width.
    pub width: Px,
    /// Height.
    pub height: Px,
}

impl Bounds {
    /// Create bounds from position and size.
    pub fn new(x: Px, y: Px, width: Px, height: Px) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether a point falls inside (right and bottom edges excluded).
    pub fn contains(&self, x: Px, y: Px) -> bool {
        (self.x..self.x + self.width).contains(&x) && (self.y..self.y + self.height).contains(&y)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    scroll: ScrollState,
    bounds: Option<Bounds>,
}

/// Per-grid scroll states of one screen.
#[derive(Debug, Clone, Default)]
pub struct ScrollRegistry {
    config: FlingConfig,
    entries: BTreeMap<String, Entry>,
}

impl ScrollRegistry {
    /// Create an empty registry; new states use `config`.
    pub fn new(config: FlingConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
        }
    }

    fn entry(&mut self, name: &str) -> &mut Entry {
        let config = self.config;
        self.entries.entry(name.to_owned()).or_insert_with(|| {
            debug!(grid = name, "Scroll state created");
            Entry {
                scroll: ScrollState::new(config),
                bounds: None,
            }
        })
    }

    /// Scroll state for `name`, created on first access.
    pub fn scroll_mut(&mut self, name: &str) -> &mut ScrollState {
        &mut self.entry(name).scroll
    }

    /// Scroll state for `name`, if one exists.
    pub fn scroll(&self, name: &str) -> Option<&ScrollState> {
        self.entries.get(name).map(|e| &e.scroll)
    }

    /// Record where the grid was laid out this frame.
    pub fn set_bounds(&mut self, name: &str, bounds: Bounds) {
        self.entry(name).bounds = Some(bounds);
    }

    /// Forget the grid's bounds (it scrolled out of the outer list).
    pub fn clear_bounds(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.bounds = None;
        }
    }

    /// Last recorded bounds of `name`.
    pub fn bounds(&self, name: &str) -> Option<Bounds> {
        self.entries.get(name).and_then(|e| e.bounds)
    }

    /// Name of the grid whose bounds contain the point.
    pub fn hit_test(&self, x: Px, y: Px) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, e)| e.bounds.is_some_and(|b| b.contains(x, y)))
            .map(|(name, _)| name.as_str())
    }

    /// Advance every running fling. Returns true if any is still running.
    pub fn tick_all(&mut self, now: Instant) -> bool {
        self.entries
            .values_mut()
            .fold(false, |running, e| e.scroll.tick(now) || running)
    }

    /// Names of all registered grids, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered grids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no grid has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Routes pointer events to the grid under the pointer.
///
/// A press becomes a drag once the pointer has moved more than the threshold
/// horizontally; movement before that is not applied. Release ends the drag
/// and may start a fling.
#[derive(Debug, Clone)]
pub struct DragDispatcher {
    threshold: f32,
    down_x: f32,
    last_x: f32,
    dragging: bool,
    active: Option<String>,
}

impl Default for DragDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl DragDispatcher {
    /// Create a dispatcher with the given drag threshold.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            down_x: 0.0,
            last_x: 0.0,
            dragging: false,
            active: None,
        }
    }

    /// Grid receiving the current gesture.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// True once the threshold was crossed.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer pressed at `(x, y)`: pick the grid under it.
    pub fn pointer_down(&mut self, x: f32, y: f32, registry: &ScrollRegistry) {
        self.down_x = x;
        self.last_x = x;
        self.dragging = false;
        self.active = registry
            .hit_test(x.floor() as Px, y.floor() as Px)
            .map(str::to_owned);
        trace!(x, y, grid = ?self.active, "Pointer down");
    }

    /// Pointer moved to `x`.
    ///
    /// Returns the value reported by [`ScrollState::consume_delta`] when a
    /// delta was delivered to a grid.
    pub fn pointer_move(
        &mut self,
        x: f32,
        now: Instant,
        registry: &mut ScrollRegistry,
    ) -> Option<f32> {
        let delta = x - self.last_x;
        self.last_x = x;

        if !self.dragging && (x - self.down_x).abs() > self.threshold {
            self.dragging = true;
            debug!(grid = ?self.active, "Drag started");
        }
        if !self.dragging {
            return None;
        }

        let name = self.active.as_deref()?;
        Some(registry.scroll_mut(name).consume_delta(delta, now))
    }

    /// Pointer released or gesture cancelled.
    ///
    /// Returns true when the release started a fling.
    pub fn pointer_up(&mut self, now: Instant, registry: &mut ScrollRegistry) -> bool {
        let flung = match (self.dragging, self.active.take()) {
            (true, Some(name)) => registry.scroll_mut(&name).release(now),
            _ => false,
        };
        self.dragging = false;
        flung
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn registry_with_grid() -> ScrollRegistry {
        let mut registry = ScrollRegistry::default();
        registry.set_bounds("A", Bounds::new(0, 10, 80, 20));
        registry.scroll_mut("A").update_layout(400, 80);
        registry
    }

    mod registry {
        use super::*;

        #[test]
        fn states_are_created_lazily() {
            let mut registry = ScrollRegistry::default();
            assert!(registry.scroll("A").is_none());
            registry.scroll_mut("A");
            assert!(registry.scroll("A").is_some());
            assert_eq!(registry.len(), 1);
        }

        #[test]
        fn hit_test_uses_recorded_bounds() {
            let mut registry = registry_with_grid();
            registry.set_bounds("B", Bounds::new(0, 40, 80, 20));
            assert_eq!(registry.hit_test(5, 15), Some("A"));
            assert_eq!(registry.hit_test(5, 45), Some("B"));
            assert_eq!(registry.hit_test(5, 35), None);
        }

        #[test]
        fn cleared_bounds_are_not_hit() {
            let mut registry = registry_with_grid();
            registry.clear_bounds("A");
            assert_eq!(registry.hit_test(5, 15), None);
            assert!(registry.scroll("A").is_some());
        }

        #[test]
        fn names_are_sorted_and_survive_cleared_bounds() {
            let mut registry = ScrollRegistry::default();
            registry.scroll_mut("C");
            registry.set_bounds("A", Bounds::new(0, 0, 10, 10));
            registry.scroll_mut("B");
            registry.clear_bounds("A");
            assert_eq!(registry.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        }

        #[test]
        fn bottom_and_right_edges_are_outside() {
            let b = Bounds::new(0, 10, 80, 20);
            assert!(b.contains(79, 29));
            assert!(!b.contains(80, 15));
            assert!(!b.contains(5, 30));
        }
    }

    mod dispatch {
        use super::*;

        #[test]
        fn small_movement_is_not_a_drag() {
            let mut registry = registry_with_grid();
            let mut drag = DragDispatcher::default();
            let now = Instant::now();
            drag.pointer_down(40.0, 15.0, &registry);
            assert_eq!(drag.pointer_move(35.0, now, &mut registry), None);
            assert!(!drag.is_dragging());
            assert_eq!(registry.scroll("A").map(ScrollState::offset), Some(0.0));
        }

        #[test]
        fn drag_past_threshold_scrolls_active_grid() {
            let mut registry = registry_with_grid();
            let mut drag = DragDispatcher::default();
            let now = Instant::now();
            drag.pointer_down(60.0, 15.0, &registry);
            drag.pointer_move(55.0, now, &mut registry);
            assert!(drag.pointer_move(40.0, now, &mut registry).is_some());
            assert!(drag.is_dragging());
            // Only the delta of the event that crossed the threshold applies
            assert_eq!(registry.scroll("A").map(ScrollState::offset), Some(15.0));
        }

        #[test]
        fn press_outside_any_grid_moves_nothing() {
            let mut registry = registry_with_grid();
            let mut drag = DragDispatcher::default();
            drag.pointer_down(40.0, 50.0, &registry);
            assert_eq!(drag.active(), None);
            assert_eq!(drag.pointer_move(0.0, Instant::now(), &mut registry), None);
            assert!(drag.is_dragging());
        }

        #[test]
        fn fast_release_flings_and_clears_active() {
            let mut registry = registry_with_grid();
            let mut drag = DragDispatcher::new(2.0);
            let t0 = Instant::now();
            drag.pointer_down(60.0, 15.0, &registry);
            drag.pointer_move(50.0, t0, &mut registry);
            drag.pointer_move(40.0, t0 + Duration::from_millis(10), &mut registry);
            assert!(drag.pointer_up(t0 + Duration::from_millis(20), &mut registry));
            assert_eq!(drag.active(), None);
            assert!(registry.scroll("A").is_some_and(ScrollState::is_flinging));
            assert!(registry.tick_all(t0 + Duration::from_millis(36)));
        }

        #[test]
        fn release_without_drag_does_not_fling() {
            let mut registry = registry_with_grid();
            let mut drag = DragDispatcher::default();
            drag.pointer_down(60.0, 15.0, &registry);
            assert!(!drag.pointer_up(Instant::now(), &mut registry));
            assert_eq!(drag.active(), None);
        }
    }
}
