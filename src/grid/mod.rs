//! Virtualization core - pure grid geometry, no terminal I/O
//!
//! Leaf-first:
//! - [`offsets`] - prefix-sum lookup from pixel to index
//! - [`measure`] - bounded measurement caches and providers
//! - [`sizing`] - two-pass size computation with cooperative yielding
//! - [`scroll`] - horizontal drag and fling physics
//! - [`visible_range`] - per-axis pixel windows
//! - [`renderer`] - materialized cell set, sticky placement, reuse pool
//! - [`registry`] - per-grid scroll state and pointer dispatch

pub mod derived;
pub mod dimensions;
pub mod measure;
pub mod offsets;
pub mod registry;
pub mod renderer;
pub mod scroll;
pub mod sizing;
pub mod visible_range;

/// Pixel coordinate or length.
///
/// The demo host maps one terminal cell to one pixel.
pub type Px = i32;

pub use dimensions::{DatasetKey, GridDimensions, GridIdentity};
pub use measure::{CellMeasurer, ContentMeasure, FixedMeasure, Measure, MeasureCache, TableSource};
pub use offsets::{value_to_index, IndexSpan};
pub use registry::{DragDispatcher, ScrollRegistry};
pub use renderer::{GridFrame, GridRenderer, Placement, RendererConfig};
pub use scroll::{FlingConfig, ScrollState};
pub use sizing::{compute_grid_dimensions, compute_grid_dimensions_blocking, SizeJob, SizingConfig};
pub use visible_range::{HorizontalRangeTracker, OuterListGeometry, PixelRange};
