//! Published row/column geometry for one dataset version

use super::offsets::{span_for, value_to_index, IndexSpan};
use super::Px;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Identity token of a dataset version.
///
/// A change of key is the only thing that triggers remeasurement; editing
/// cell content under the same key keeps the old dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetKey(Arc<str>);

impl DatasetKey {
    /// Create a key from any string-like value.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl Serialize for DatasetKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// `(dataset_key, created_at)` - the identity used for cache invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridIdentity {
    /// Dataset the dimensions were measured from.
    pub dataset_key: DatasetKey,
    /// When the computation for this version started.
    pub created_at: Instant,
}

/// Immutable sizes and offset tables for every row and column of a grid.
///
/// Built once by the size computation engine and shared behind an `Arc`.
/// A new dataset version gets a new value; existing values never change.
///
/// # Invariants
/// - `col_offsets.len() == col_sizes.len()` and likewise for rows
/// - offsets start at 0 and are non-decreasing
/// - `total_width == col_offsets[last] + col_sizes[last]` (0 when empty)
/// - sizes are never negative
///
/// # Equality
/// Two values are equal when their [`GridIdentity`] matches. The arrays are
/// not compared.
#[derive(Debug, Clone)]
pub struct GridDimensions {
    identity: GridIdentity,
    col_sizes: Vec<Px>,
    row_sizes: Vec<Px>,
    col_offsets: Vec<Px>,
    row_offsets: Vec<Px>,
    total_width: Px,
    total_height: Px,
}

impl PartialEq for GridDimensions {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for GridDimensions {}

impl GridDimensions {
    /// Build dimensions from resolved column widths and row heights.
    ///
    /// Negative sizes are treated as 0 so the offset tables stay
    /// non-decreasing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lazygrid::grid::dimensions::{DatasetKey, GridDimensions};
    /// # use std::time::Instant;
    /// let dims = GridDimensions::from_sizes(
    ///     DatasetKey::new("A"),
    ///     Instant::now(),
    ///     vec![10, 20, 30],
    ///     vec![5, 5, 5],
    /// );
    /// assert_eq!(dims.col_offsets(), &[0, 10, 30]);
    /// assert_eq!(dims.total_width(), 60);
    /// assert_eq!(dims.total_height(), 15);
    /// ```
    pub fn from_sizes(
        dataset_key: DatasetKey,
        created_at: Instant,
        col_sizes: Vec<Px>,
        row_sizes: Vec<Px>,
    ) -> Self {
        let col_sizes: Vec<Px> = col_sizes.into_iter().map(|s| s.max(0)).collect();
        let row_sizes: Vec<Px> = row_sizes.into_iter().map(|s| s.max(0)).collect();
        let (col_offsets, total_width) = prefix_sums(&col_sizes);
        let (row_offsets, total_height) = prefix_sums(&row_sizes);
        Self {
            identity: GridIdentity {
                dataset_key,
                created_at,
            },
            col_sizes,
            row_sizes,
            col_offsets,
            row_offsets,
            total_width,
            total_height,
        }
    }

    /// Dimensions of a grid with no rows and no columns.
    pub fn empty(dataset_key: DatasetKey, created_at: Instant) -> Self {
        Self::from_sizes(dataset_key, created_at, Vec::new(), Vec::new())
    }

    /// Identity of the dataset version.
    pub fn identity(&self) -> &GridIdentity {
        &self.identity
    }

    /// Dataset key these dimensions were measured from.
    pub fn dataset_key(&self) -> &DatasetKey {
        &self.identity.dataset_key
    }

    /// Creation stamp.
    pub fn created_at(&self) -> Instant {
        self.identity.created_at
    }

    /// Width of every column.
    pub fn col_sizes(&self) -> &[Px] {
        &self.col_sizes
    }

    /// Height of every row.
    pub fn row_sizes(&self) -> &[Px] {
        &self.row_sizes
    }

    /// Left edge of every column.
    pub fn col_offsets(&self) -> &[Px] {
        &self.col_offsets
    }

    /// Top edge of every row.
    pub fn row_offsets(&self) -> &[Px] {
        &self.row_offsets
    }

    /// Sum of all column widths.
    pub fn total_width(&self) -> Px {
        self.total_width
    }

    /// Sum of all row heights.
    pub fn total_height(&self) -> Px {
        self.total_height
    }

    /// Number of columns.
    pub fn col_count(&self) -> usize {
        self.col_sizes.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_sizes.len()
    }

    /// True when the grid has no area to draw.
    pub fn is_degenerate(&self) -> bool {
        self.total_width <= 0 || self.total_height <= 0
    }

    /// Column containing x, clamped to the valid range.
    pub fn col_at(&self, x: Px) -> usize {
        value_to_index(&self.col_offsets, x)
    }

    /// Row containing y, clamped to the valid range.
    pub fn row_at(&self, y: Px) -> usize {
        value_to_index(&self.row_offsets, y)
    }

    /// Columns touched by the half-open pixel interval `[start, end)`.
    pub fn col_span(&self, start: Px, end: Px) -> Option<IndexSpan> {
        span_for(&self.col_offsets, start, end)
    }

    /// Rows touched by the half-open pixel interval `[start, end)`.
    pub fn row_span(&self, start: Px, end: Px) -> Option<IndexSpan> {
        span_for(&self.row_offsets, start, end)
    }

    /// Min/max/average statistics for logging and the `--dump` output.
    pub fn summary(&self) -> DimensionSummary {
        DimensionSummary {
            dataset_key: self.identity.dataset_key.clone(),
            cols: self.col_count(),
            rows: self.row_count(),
            total_width: self.total_width,
            total_height: self.total_height,
            col_width: SizeStats::of(&self.col_sizes),
            row_height: SizeStats::of(&self.row_sizes),
        }
    }

    /// Emit the published-dimensions log line.
    pub(crate) fn log_published(&self) {
        let summary = self.summary();
        info!(
            dataset = %summary.dataset_key,
            cols = summary.cols,
            rows = summary.rows,
            total_width = summary.total_width,
            total_height = summary.total_height,
            col_width = ?summary.col_width,
            row_height = ?summary.row_height,
            "Grid dimensions published"
        );
    }
}

fn prefix_sums(sizes: &[Px]) -> (Vec<Px>, Px) {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut running: Px = 0;
    for &size in sizes {
        offsets.push(running);
        running = running.saturating_add(size);
    }
    (offsets, running)
}

/// Min, max and mean of a size array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeStats {
    /// Smallest size (0 when empty).
    pub min: Px,
    /// Largest size (0 when empty).
    pub max: Px,
    /// Arithmetic mean (0.0 when empty).
    pub avg: f64,
}

impl SizeStats {
    fn of(sizes: &[Px]) -> Self {
        if sizes.is_empty() {
            return Self {
                min: 0,
                max: 0,
                avg: 0.0,
            };
        }
        let sum: i64 = sizes.iter().map(|&s| i64::from(s)).sum();
        Self {
            min: sizes.iter().copied().min().unwrap_or(0),
            max: sizes.iter().copied().max().unwrap_or(0),
            avg: sum as f64 / sizes.len() as f64,
        }
    }
}

/// Serializable overview of a [`GridDimensions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSummary {
    /// Dataset key.
    pub dataset_key: DatasetKey,
    /// Column count.
    pub cols: usize,
    /// Row count.
    pub rows: usize,
    /// Total width in pixels.
    pub total_width: Px,
    /// Total height in pixels.
    pub total_height: Px,
    /// Column width statistics.
    pub col_width: SizeStats,
    /// Row height statistics.
    pub row_height: SizeStats,
}
