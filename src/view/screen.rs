//! Demo screen state: an outer vertical list holding one grid per table.
//!
//! Per table the list has three items: a heading line, the grid (or a
//! placeholder while it is being measured) and a trailer line. Item `3t + 1`
//! is the grid of table `t`.
//!
//! Nothing here talks to the terminal; [`DemoScreen::render`] draws into a
//! plain ratatui `Buffer`.

use super::cells::{draw_cell, put_clipped, CellRect, CellView};
use super::constants::{GRID_PAD_END, GRID_PAD_START, LABEL_HEIGHT, PLACEHOLDER_HEIGHT};
use super::styles::GridStyles;
use crate::config::ResolvedConfig;
use crate::demo::{TableData, TextMeasure};
use crate::error::SizeError;
use crate::grid::registry::Bounds;
use crate::grid::visible_range::{ListItem, VerticalRangeTracker};
use crate::grid::{
    CellMeasurer, GridDimensions, GridRenderer, HorizontalRangeTracker, OuterListGeometry, Px,
    ScrollRegistry, SizeJob, SizingConfig, TableSource,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::sync::Arc;
use std::task::Poll;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Items the outer list shows per table.
const ITEMS_PER_TABLE: usize = 3;

/// Kind of an outer-list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuterItem {
    /// Heading line of table `t`.
    Heading(usize),
    /// Grid of table `t`.
    Grid(usize),
    /// Line after table `t`.
    Trailer(usize),
}

impl OuterItem {
    /// Item at list position `index`.
    pub fn at(index: usize) -> Self {
        let table = index / ITEMS_PER_TABLE;
        match index % ITEMS_PER_TABLE {
            0 => Self::Heading(table),
            1 => Self::Grid(table),
            _ => Self::Trailer(table),
        }
    }
}

/// One table with its measurement job and rendering state.
pub struct TableView {
    data: TableData,
    job: Option<SizeJob>,
    dims: Option<Arc<GridDimensions>>,
    failure: Option<SizeError>,
    renderer: GridRenderer<CellView>,
    horizontal: HorizontalRangeTracker,
    vertical: VerticalRangeTracker,
}

impl TableView {
    fn new(data: TableData, config: &ResolvedConfig) -> Self {
        let job = SizeJob::new(
            data.dataset_key(),
            Instant::now(),
            data.col_count(),
            data.row_count(),
        );
        Self {
            data,
            job: Some(job),
            dims: None,
            failure: None,
            renderer: GridRenderer::new(config.renderer()),
            horizontal: HorizontalRangeTracker::new(),
            vertical: VerticalRangeTracker::new(),
        }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        self.data.name()
    }

    /// Published dimensions, once measured.
    pub fn dimensions(&self) -> Option<&Arc<GridDimensions>> {
        self.dims.as_ref()
    }

    /// Measurement error, if the computation failed.
    pub fn failure(&self) -> Option<&SizeError> {
        self.failure.as_ref()
    }

    /// True while cells are still being measured.
    pub fn is_measuring(&self) -> bool {
        self.job.is_some()
    }

    /// Fraction of measurement done.
    pub fn progress(&self) -> f64 {
        self.job.as_ref().map_or(1.0, SizeJob::progress)
    }

    /// Renderer, for inspecting pool behaviour.
    pub fn renderer(&self) -> &GridRenderer<CellView> {
        &self.renderer
    }

    fn grid_height(&self) -> Px {
        self.dims
            .as_ref()
            .map_or(PLACEHOLDER_HEIGHT, |dims| dims.total_height())
    }
}

/// State of the demo screen.
pub struct DemoScreen {
    tables: Vec<TableView>,
    measurer: CellMeasurer<String, TextMeasure>,
    text_measure: TextMeasure,
    registry: ScrollRegistry,
    sizing: SizingConfig,
    styles: GridStyles,
    outer_offset: Px,
    list_height: Px,
}

impl DemoScreen {
    /// Queue measurement for every table.
    pub fn new(tables: Vec<TableData>, config: &ResolvedConfig, styles: GridStyles) -> Self {
        let text_measure = TextMeasure::default();
        Self {
            tables: tables
                .into_iter()
                .map(|data| TableView::new(data, config))
                .collect(),
            measurer: CellMeasurer::new(text_measure, config.measure_cache_capacity),
            text_measure,
            registry: ScrollRegistry::new(config.fling()),
            sizing: config.sizing(),
            styles,
            outer_offset: 0,
            list_height: 0,
        }
    }

    /// Tables in list order.
    pub fn tables(&self) -> &[TableView] {
        &self.tables
    }

    /// Scroll states and hit boxes of the grids.
    pub fn registry(&self) -> &ScrollRegistry {
        &self.registry
    }

    /// Mutable access for pointer dispatch.
    pub fn registry_mut(&mut self) -> &mut ScrollRegistry {
        &mut self.registry
    }

    /// Styles used for drawing.
    pub fn styles(&self) -> &GridStyles {
        &self.styles
    }

    /// Lines the outer list is scrolled by.
    pub fn outer_offset(&self) -> Px {
        self.outer_offset
    }

    /// True while any table is still being measured.
    pub fn is_measuring(&self) -> bool {
        self.tables.iter().any(TableView::is_measuring)
    }

    /// Run one measurement burst of the configured length.
    ///
    /// Returns true while work remains.
    pub fn advance_sizing(&mut self) -> bool {
        self.advance_sizing_for(self.sizing.yield_interval)
    }

    /// Run one measurement burst of at most `budget` on the first table
    /// that still needs it.
    ///
    /// A failed table records its error and shows a failure placeholder;
    /// the other tables keep going.
    pub fn advance_sizing_for(&mut self, budget: Duration) -> bool {
        let measurer = &mut self.measurer;
        let Some(table) = self.tables.iter_mut().find(|t| t.job.is_some()) else {
            return false;
        };
        let Some(job) = table.job.as_mut() else {
            return false;
        };

        let mut source = TableSource::new(table.data.rows(), measurer);
        match job.step(&mut source, budget) {
            Ok(Poll::Pending) => {}
            Ok(Poll::Ready(dims)) => {
                debug!(
                    table = table.data.name(),
                    calls = job.calls(),
                    bursts = job.bursts(),
                    "Table measured"
                );
                table.dims = Some(dims);
                table.job = None;
            }
            Err(err) => {
                warn!(table = table.data.name(), error = %err, "Table could not be measured");
                table.failure = Some(err);
                table.job = None;
            }
        }

        self.is_measuring()
    }

    /// Advance running flings. Returns true while any is running.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.registry.tick_all(now)
    }

    fn item_sizes(&self) -> impl Iterator<Item = Px> + '_ {
        self.tables
            .iter()
            .flat_map(|t| [LABEL_HEIGHT, t.grid_height(), LABEL_HEIGHT])
    }

    /// Total height of the outer list content.
    pub fn content_height(&self) -> Px {
        self.item_sizes().fold(0, Px::saturating_add)
    }

    /// Largest outer offset for the current list height.
    pub fn max_outer_offset(&self) -> Px {
        (self.content_height() - self.list_height).max(0)
    }

    /// Set the outer list's viewport height and re-clamp its offset.
    pub fn set_list_height(&mut self, height: Px) {
        self.list_height = height.max(0);
        self.outer_offset = self.outer_offset.clamp(0, self.max_outer_offset());
    }

    /// Scroll the outer list by `lines` (positive = down), clamped.
    pub fn scroll_outer(&mut self, lines: Px) {
        self.outer_offset = self
            .outer_offset
            .saturating_add(lines)
            .clamp(0, self.max_outer_offset());
    }

    /// Jump to the top of the outer list.
    pub fn scroll_outer_to_top(&mut self) {
        self.outer_offset = 0;
    }

    /// Jump to the bottom of the outer list.
    pub fn scroll_outer_to_bottom(&mut self) {
        self.outer_offset = self.max_outer_offset();
    }

    /// Lines moved by a page scroll.
    pub fn page_size(&self) -> Px {
        (self.list_height - 1).max(1)
    }

    /// Items intersecting the outer viewport, with offsets relative to its top.
    pub fn geometry(&self) -> OuterListGeometry {
        let mut geometry = OuterListGeometry {
            viewport_height: self.list_height,
            ..OuterListGeometry::default()
        };

        let mut top: Px = 0;
        for (index, size) in self.item_sizes().enumerate() {
            let offset = top - self.outer_offset;
            if offset >= self.list_height {
                break;
            }
            if offset + size > 0 {
                if geometry.visible_items.is_empty() {
                    geometry.first_visible_index = index;
                    geometry.first_visible_scroll_offset = -offset;
                }
                geometry.visible_items.push(ListItem {
                    index,
                    offset,
                    size,
                });
            }
            top = top.saturating_add(size);
        }

        geometry
    }

    /// Name of the topmost grid on screen that has been measured.
    pub fn first_visible_grid(&self) -> Option<&str> {
        self.geometry()
            .visible_items
            .iter()
            .find_map(|item| match OuterItem::at(item.index) {
                OuterItem::Grid(t) => self.tables.get(t).filter(|t| t.dims.is_some()),
                _ => None,
            })
            .map(TableView::name)
    }

    /// Pan the topmost visible grid by `delta` columns.
    pub fn nudge(&mut self, delta: f32) {
        if let Some(name) = self.first_visible_grid().map(str::to_owned) {
            self.registry.scroll_mut(&name).scroll_by(delta);
        }
    }

    /// Pan the grid under `(x, y)` by `delta` columns.
    pub fn nudge_at(&mut self, x: Px, y: Px, delta: f32) {
        if let Some(name) = self.registry.hit_test(x, y).map(str::to_owned) {
            self.registry.scroll_mut(&name).scroll_by(delta);
        }
    }

    /// One-line summary of measurement progress.
    pub fn status_line(&self) -> String {
        let progress = self
            .tables
            .iter()
            .find(|t| t.is_measuring())
            .map(|t| format!("measuring {} {:.0}%", t.name(), t.progress() * 100.0))
            .unwrap_or_else(|| "ready".to_owned());
        format!(" lazygrid | {progress} | drag or ←/→ to pan, ↑/↓ to scroll, q to quit")
    }

    /// Draw the outer list into `area` of `buf`.
    ///
    /// Records each visible grid's bounds for hit-testing and refreshes its
    /// scroll layout; grids that scrolled away lose their bounds.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.set_list_height(Px::from(area.height));
        let geometry = self.geometry();

        let mut shown = vec![false; self.tables.len()];
        for item in &geometry.visible_items {
            let top = Px::from(area.y) + item.offset;
            match OuterItem::at(item.index) {
                OuterItem::Heading(t) => {
                    let Some(table) = self.tables.get(t) else {
                        continue;
                    };
                    let text = format!(
                        "[{}] {}×{}",
                        table.name(),
                        table.data.col_count(),
                        table.data.row_count()
                    );
                    let x = Px::from(area.x) + GRID_PAD_START;
                    put_clipped(buf, area, x, top, &text, self.styles.label);
                }
                OuterItem::Trailer(t) => {
                    let Some(table) = self.tables.get(t) else {
                        continue;
                    };
                    let text = format!("end of table {}", table.name());
                    let x = Px::from(area.x) + GRID_PAD_START;
                    put_clipped(buf, area, x, top, &text, self.styles.label);
                }
                OuterItem::Grid(t) => {
                    if let Some(flag) = shown.get_mut(t) {
                        *flag = self.render_grid(t, item, &geometry, area, buf);
                    }
                }
            }
        }

        for (table, shown) in self.tables.iter().zip(shown) {
            if !shown {
                self.registry.clear_bounds(table.name());
            }
        }
    }

    /// Draw one grid. Returns true when the grid is interactive on screen.
    fn render_grid(
        &mut self,
        index: usize,
        item: &ListItem,
        geometry: &OuterListGeometry,
        area: Rect,
        buf: &mut Buffer,
    ) -> bool {
        let Some(table) = self.tables.get_mut(index) else {
            return false;
        };
        let grid_x = Px::from(area.x) + GRID_PAD_START;
        let top = Px::from(area.y) + item.offset;

        let Some(dims) = table.dims.clone() else {
            let text = match &table.failure {
                Some(err) => format!("failed: {err}"),
                None => format!("measuring… {:.0}%", table.progress() * 100.0),
            };
            put_clipped(buf, area, grid_x, top, &text, self.styles.placeholder);
            return false;
        };

        let viewport_width = (Px::from(area.width) - GRID_PAD_START).max(0);
        let name = table.data.name();
        self.registry.set_bounds(
            name,
            Bounds::new(grid_x, top, viewport_width, item.size),
        );
        let scroll = self.registry.scroll_mut(name);
        scroll.update_layout(dims.total_width() + GRID_PAD_END, viewport_width);

        let range_x = table.horizontal.range(scroll);
        let range_y = table.vertical.range(item.offset, dims.total_height(), geometry);

        let TableView { data, renderer, .. } = table;
        let text_measure = self.text_measure;
        let frame = renderer.layout(&dims, Some(range_x), range_y, |row, col, width, _height| {
            CellView::new(
                row,
                col,
                data.cell(row, col).unwrap_or_default(),
                text_measure.inner_width(width),
            )
        });

        let clip = Rect {
            x: u16::try_from(grid_x).unwrap_or(area.x),
            width: u16::try_from(viewport_width).unwrap_or(0),
            ..area
        }
        .intersection(area);

        for placement in &frame.placements {
            let rect = CellRect {
                x: grid_x + placement.x - range_x.start,
                y: top + placement.y,
                width: placement.width,
                height: placement.height,
            };
            draw_cell(
                buf,
                clip,
                rect,
                text_measure.padding_x,
                placement.drawable,
                &self.styles,
            );
        }
        true
    }
}

#[cfg(test)]
#[path = "screen_tests.rs"]
mod tests;
