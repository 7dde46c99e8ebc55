//! Virtualized grid renderer
//!
//! Turns published [`GridDimensions`] and the per-axis pixel windows into the
//! set of cells to draw and where to draw them.
//!
//! Work happens in two passes with different costs:
//!
//! - **Materialization pass**: pixel windows are converted to index spans.
//!   Only when a span changes (a window edge crossed a row or column
//!   boundary) is the cell set re-derived and the slot pool reconciled.
//!   Sub-cell scrolling never reaches this pass.
//! - **Placement pass**: runs on every call. Computes `(x, y)` for each
//!   materialized cell, moving the sticky row and column with the window.
//!
//! # Slot pool
//!
//! Visible cells live in the active set. Cells that leave the window move to
//! an LRU pool capped at [`RendererConfig::pool_capacity`]; coming back into
//! view takes them out of the pool instead of calling the materializer again.
//! A new dataset identity empties both.

use super::derived::Derived;
use super::dimensions::{GridDimensions, GridIdentity};
use super::offsets::IndexSpan;
use super::visible_range::PixelRange;
use super::Px;
use lru::LruCache;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use tracing::debug;

/// Default number of off-screen cells retained for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 1000;

/// `(row, col)` of a cell.
pub type CellKey = (usize, usize);

/// Renderer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// Pin column 0 to the left edge of the window.
    pub sticky_left: bool,
    /// Pin row 0 to the top edge of the window.
    pub sticky_top: bool,
    /// Off-screen cells kept for reuse; 0 disables the pool.
    pub pool_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            sticky_left: true,
            sticky_top: true,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

/// A cell selected by the materialization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedCell {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Placed at the sticky column position instead of its own offset.
    pub sticky_x: bool,
    /// Placed at the sticky row position instead of its own offset.
    pub sticky_y: bool,
}

/// A positioned cell ready to draw.
#[derive(Debug)]
pub struct Placement<'a, D> {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Left edge in grid coordinates.
    pub x: Px,
    /// Top edge in grid coordinates.
    pub y: Px,
    /// Column width.
    pub width: Px,
    /// Row height.
    pub height: Px,
    /// Cell belongs to the sticky column.
    pub sticky_x: bool,
    /// Cell belongs to the sticky row.
    pub sticky_y: bool,
    /// Materialized content.
    pub drawable: &'a D,
}

/// Output of one layout call.
#[derive(Debug)]
pub struct GridFrame<'a, D> {
    /// Cells in draw order; sticky cells come after the cells they cover.
    pub placements: Vec<Placement<'a, D>>,
    /// Total grid width.
    pub total_width: Px,
    /// Total grid height.
    pub total_height: Px,
}

/// Counters for pool behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Cells built by the materializer.
    pub created: u64,
    /// Cells taken back from the pool.
    pub reused: u64,
    /// Cells dropped because the pool was full or invalidated.
    pub discarded: u64,
    /// Materialization passes run.
    pub passes: u64,
}

/// Position of a sticky band.
///
/// `start` clamped to `[0, total - first - last]`, so the band never
/// overlaps the final row or column.
///
/// # Examples
///
/// ```
/// # use lazygrid::grid::renderer::sticky_offset;
/// assert_eq!(sticky_offset(95, 100, 10, 10), 80);
/// assert_eq!(sticky_offset(30, 100, 10, 10), 30);
/// assert_eq!(sticky_offset(30, 15, 10, 10), 0);
/// ```
pub fn sticky_offset(start: Px, total: Px, first: Px, last: Px) -> Px {
    start.min(total - first - last).max(0)
}

/// Cell set for the given spans, in draw order.
///
/// Per visible row: scrolling cells, then the sticky column cell. The sticky
/// row comes last. Rows or columns with a size of 0 or less are skipped.
pub fn plan_cells(
    dims: &GridDimensions,
    rows: Option<IndexSpan>,
    cols: Option<IndexSpan>,
    config: &RendererConfig,
) -> Vec<PlannedCell> {
    let (Some(rows), Some(cols)) = (rows, cols) else {
        return Vec::new();
    };
    if dims.is_degenerate() {
        return Vec::new();
    }

    let col_sizes = dims.col_sizes();
    let row_sizes = dims.row_sizes();
    let mut cells = Vec::with_capacity(rows.len() * (cols.len() + 1));

    let mut plan_row = |row: usize, sticky_y: bool| {
        if row_sizes[row] <= 0 {
            return;
        }
        for col in cols.iter() {
            if (config.sticky_left && col == 0) || col_sizes[col] <= 0 {
                continue;
            }
            cells.push(PlannedCell {
                row,
                col,
                sticky_x: false,
                sticky_y,
            });
        }
        if config.sticky_left && col_sizes[0] > 0 {
            cells.push(PlannedCell {
                row,
                col: 0,
                sticky_x: true,
                sticky_y,
            });
        }
    };

    for row in rows.iter() {
        if config.sticky_top && row == 0 {
            continue;
        }
        plan_row(row, false);
    }
    if config.sticky_top {
        plan_row(0, true);
    }
    cells
}

/// Materializes and positions the visible cells of one grid.
///
/// `D` is whatever the host draws; the renderer only stores it.
pub struct GridRenderer<D> {
    config: RendererConfig,
    identity: Option<GridIdentity>,
    plan: Derived<(Option<IndexSpan>, Option<IndexSpan>), Vec<PlannedCell>>,
    applied_revision: u64,
    active: HashMap<CellKey, D>,
    pool: Option<LruCache<CellKey, D>>,
    stats: RenderStats,
}

impl<D> GridRenderer<D> {
    /// Create a renderer with an empty pool.
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            identity: None,
            plan: Derived::new(),
            applied_revision: 0,
            active: HashMap::new(),
            pool: NonZeroUsize::new(config.pool_capacity).map(LruCache::new),
            stats: RenderStats::default(),
        }
    }

    /// Settings in effect.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Pool counters.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Number of cells in the current window.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Number of off-screen cells retained for reuse.
    pub fn pool_len(&self) -> usize {
        self.pool.as_ref().map_or(0, LruCache::len)
    }

    /// Check whether a cell is retained in the pool.
    pub fn is_pooled(&self, row: usize, col: usize) -> bool {
        self.pool
            .as_ref()
            .is_some_and(|pool| pool.contains(&(row, col)))
    }

    /// Drop every materialized cell; the next layout starts from scratch.
    pub fn invalidate(&mut self) {
        let dropped = self.active.len() + self.pool_len();
        self.active.clear();
        if let Some(pool) = self.pool.as_mut() {
            pool.clear();
        }
        self.plan.invalidate();
        self.stats.discarded += dropped as u64;
        debug!(dropped, "Cell pool invalidated");
    }

    /// Lay out the grid for the current windows.
    ///
    /// `materialize(row, col, width, height)` is called only for cells that
    /// are neither visible already nor retained in the pool. A `None` window
    /// means the grid is off-screen on that axis and nothing is drawn.
    pub fn layout<F>(
        &mut self,
        dims: &GridDimensions,
        range_x: Option<PixelRange>,
        range_y: Option<PixelRange>,
        mut materialize: F,
    ) -> GridFrame<'_, D>
    where
        F: FnMut(usize, usize, Px, Px) -> D,
    {
        if self.identity.as_ref() != Some(dims.identity()) {
            if self.identity.is_some() {
                self.invalidate();
            }
            self.identity = Some(dims.identity().clone());
        }

        let cols = range_x.and_then(|r| dims.col_span(r.start, r.end));
        let rows = range_y.and_then(|r| dims.row_span(r.start, r.end));
        let config = self.config;
        self.plan
            .get((rows, cols), |&(rows, cols)| plan_cells(dims, rows, cols, &config));

        if self.plan.revision() != self.applied_revision {
            self.applied_revision = self.plan.revision();
            let plan = self.plan.peek().map(Vec::as_slice).unwrap_or_default();
            reconcile(
                plan,
                dims,
                &mut self.active,
                self.pool.as_mut(),
                &mut self.stats,
                &mut materialize,
            );
            debug!(
                rows = ?rows,
                cols = ?cols,
                active = self.active.len(),
                pooled = self.pool.as_ref().map_or(0, LruCache::len),
                "Materialization pass"
            );
        }

        self.place(dims, range_x, range_y)
    }

    fn place(
        &self,
        dims: &GridDimensions,
        range_x: Option<PixelRange>,
        range_y: Option<PixelRange>,
    ) -> GridFrame<'_, D> {
        let col_sizes = dims.col_sizes();
        let row_sizes = dims.row_sizes();
        let plan = self.plan.peek().map(Vec::as_slice).unwrap_or_default();

        let (sticky_x, sticky_y) = match (col_sizes.first(), row_sizes.first()) {
            (Some(&first_col), Some(&first_row)) => (
                sticky_offset(
                    range_x.map_or(0, |r| r.start),
                    dims.total_width(),
                    first_col,
                    col_sizes.last().copied().unwrap_or(0),
                ),
                sticky_offset(
                    range_y.map_or(0, |r| r.start),
                    dims.total_height(),
                    first_row,
                    row_sizes.last().copied().unwrap_or(0),
                ),
            ),
            _ => (0, 0),
        };

        let placements = plan
            .iter()
            .filter_map(|cell| {
                let drawable = self.active.get(&(cell.row, cell.col))?;
                Some(Placement {
                    row: cell.row,
                    col: cell.col,
                    x: if cell.sticky_x {
                        sticky_x
                    } else {
                        dims.col_offsets()[cell.col]
                    },
                    y: if cell.sticky_y {
                        sticky_y
                    } else {
                        dims.row_offsets()[cell.row]
                    },
                    width: col_sizes[cell.col],
                    height: row_sizes[cell.row],
                    sticky_x: cell.sticky_x,
                    sticky_y: cell.sticky_y,
                    drawable,
                })
            })
            .collect();

        GridFrame {
            placements,
            total_width: dims.total_width(),
            total_height: dims.total_height(),
        }
    }
}

impl<D> Default for GridRenderer<D> {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

/// Bring the active set in line with `plan`.
///
/// Cells leaving the window go to the pool (evicting its oldest entry when
/// full); cells entering come from the pool or the materializer.
fn reconcile<D, F>(
    plan: &[PlannedCell],
    dims: &GridDimensions,
    active: &mut HashMap<CellKey, D>,
    mut pool: Option<&mut LruCache<CellKey, D>>,
    stats: &mut RenderStats,
    materialize: &mut F,
) where
    F: FnMut(usize, usize, Px, Px) -> D,
{
    stats.passes += 1;

    let wanted: HashSet<CellKey> = plan.iter().map(|c| (c.row, c.col)).collect();
    let leaving: Vec<CellKey> = active
        .keys()
        .filter(|key| !wanted.contains(key))
        .copied()
        .collect();
    for key in leaving {
        let Some(slot) = active.remove(&key) else {
            continue;
        };
        match pool.as_deref_mut() {
            Some(pool) => {
                if pool.push(key, slot).is_some() {
                    stats.discarded += 1;
                }
            }
            None => stats.discarded += 1,
        }
    }

    for cell in plan {
        let key = (cell.row, cell.col);
        if active.contains_key(&key) {
            continue;
        }
        let slot = match pool.as_deref_mut().and_then(|pool| pool.pop(&key)) {
            Some(slot) => {
                stats.reused += 1;
                slot
            }
            None => {
                stats.created += 1;
                materialize(
                    cell.row,
                    cell.col,
                    dims.col_sizes()[cell.col],
                    dims.row_sizes()[cell.row],
                )
            }
        };
        active.insert(key, slot);
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod renderer_tests;
