//! Size computation engine - measures every cell and builds offset tables
//!
//! Two passes over the grid:
//! 1. Column widths: `col_sizes[c] = max over rows of measure_width(r, c)`
//! 2. Row heights: `row_sizes[r] = max over cols of measure_height(r, c, col_sizes[c])`
//!
//! The height pass strictly follows the width pass because a cell's height
//! depends on the width of its column.
//!
//! # Cooperative Scheduling
//!
//! A 2000×30 table means 120k measurement calls. [`SizeJob`] keeps its
//! position between calls, so the host can run a burst of work, handle its own
//! events, and resume. [`SizeJob::step`] always performs at least one
//! measurement per call, then keeps going until its time budget runs out.
//!
//! Drivers:
//! - [`compute_grid_dimensions`] - async, yields to the runtime between
//!   bursts and aggregates on a blocking task
//! - [`compute_grid_dimensions_blocking`] - synchronous, no yielding, same
//!   output
//! - [`SizeJob::step`] - manual, for hosts with their own event loop

use super::dimensions::{DatasetKey, GridDimensions};
use super::measure::Measure;
use super::Px;
use crate::error::{MeasureError, SizeError};
use std::sync::Arc;
use std::task::Poll;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Default length of a measurement burst before yielding.
pub const DEFAULT_YIELD_INTERVAL: Duration = Duration::from_millis(333);

/// Scheduling settings for size computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingConfig {
    /// Maximum contiguous work before yielding to the host loop.
    pub yield_interval: Duration,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            yield_interval: DEFAULT_YIELD_INTERVAL,
        }
    }
}

/// Outcome of one burst of measurement work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Budget exhausted; call again to continue.
    Pending,
    /// Every cell has been measured.
    Measured,
}

#[derive(Debug, Clone)]
enum Phase {
    Widths { col: usize, row: usize },
    Heights { row: usize, col: usize },
    Measured,
    Published(Arc<GridDimensions>),
    Failed(SizeError),
}

/// Resumable two-pass size computation for one dataset version.
#[derive(Debug, Clone)]
pub struct SizeJob {
    dataset_key: DatasetKey,
    created_at: Instant,
    cols: usize,
    rows: usize,
    col_sizes: Vec<Px>,
    row_sizes: Vec<Px>,
    phase: Phase,
    calls: u64,
    bursts: u64,
}

impl SizeJob {
    /// Prepare a computation over `cols × rows` cells.
    pub fn new(dataset_key: DatasetKey, created_at: Instant, cols: usize, rows: usize) -> Self {
        debug!(dataset = %dataset_key, cols, rows, "Size computation queued");
        Self {
            dataset_key,
            created_at,
            cols,
            rows,
            col_sizes: vec![0; cols],
            row_sizes: vec![0; rows],
            phase: Phase::Widths { col: 0, row: 0 },
            calls: 0,
            bursts: 0,
        }
    }

    /// Dataset being measured.
    pub fn dataset_key(&self) -> &DatasetKey {
        &self.dataset_key
    }

    /// Measurement calls performed so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Number of bursts that ended by yielding.
    pub fn bursts(&self) -> u64 {
        self.bursts
    }

    /// Fraction of measurement calls done, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f64 {
        let total = 2 * self.cols as u64 * self.rows as u64;
        if total == 0 {
            return 1.0;
        }
        (self.calls as f64 / total as f64).min(1.0)
    }

    /// True once measurement is done (successfully or not).
    pub fn is_finished(&self) -> bool {
        matches!(
            self.phase,
            Phase::Measured | Phase::Published(_) | Phase::Failed(_)
        )
    }

    /// Run measurement for up to `budget`, without aggregating.
    ///
    /// Always performs at least one measurement call when work remains.
    ///
    /// # Errors
    ///
    /// Returns the first measurement failure. The job stays failed: later
    /// calls return the same error.
    pub fn run_burst<M: Measure + ?Sized>(
        &mut self,
        measure: &mut M,
        budget: Duration,
    ) -> Result<Progress, SizeError> {
        let deadline = Instant::now().checked_add(budget);
        self.run_until(measure, deadline)
    }

    fn run_until<M: Measure + ?Sized>(
        &mut self,
        measure: &mut M,
        deadline: Option<Instant>,
    ) -> Result<Progress, SizeError> {
        loop {
            match self.phase {
                Phase::Widths { col, .. } if col >= self.cols => {
                    self.phase = Phase::Heights { row: 0, col: 0 };
                    continue;
                }
                Phase::Widths { col, row } if row >= self.rows => {
                    self.phase = Phase::Widths { col: col + 1, row: 0 };
                    continue;
                }
                Phase::Widths { col, row } => {
                    let width = measure
                        .measure_width(row, col)
                        .map_err(|e| self.fail(e))?;
                    self.col_sizes[col] = self.col_sizes[col].max(width);
                    self.phase = Phase::Widths { col, row: row + 1 };
                }
                Phase::Heights { row, .. } if row >= self.rows => {
                    self.phase = Phase::Measured;
                    continue;
                }
                Phase::Heights { row, col } if col >= self.cols => {
                    self.phase = Phase::Heights { row: row + 1, col: 0 };
                    continue;
                }
                Phase::Heights { row, col } => {
                    let height = measure
                        .measure_height(row, col, self.col_sizes[col])
                        .map_err(|e| self.fail(e))?;
                    self.row_sizes[row] = self.row_sizes[row].max(height);
                    self.phase = Phase::Heights { row, col: col + 1 };
                }
                Phase::Measured | Phase::Published(_) => return Ok(Progress::Measured),
                Phase::Failed(ref err) => return Err(err.clone()),
            }

            self.calls += 1;
            if deadline.is_some_and(|d| Instant::now() >= d) {
                self.bursts += 1;
                trace!(
                    dataset = %self.dataset_key,
                    calls = self.calls,
                    "Measurement burst exhausted, yielding"
                );
                return Ok(Progress::Pending);
            }
        }
    }

    fn fail(&mut self, err: MeasureError) -> SizeError {
        debug!(dataset = %self.dataset_key, error = %err, "Size computation aborted");
        let err = SizeError::Measure(err);
        self.phase = Phase::Failed(err.clone());
        err
    }

    /// Run one burst and, once all cells are measured, aggregate and publish.
    ///
    /// Returns `Poll::Pending` while work remains. After completion every
    /// call returns the same published `Arc`.
    pub fn step<M: Measure + ?Sized>(
        &mut self,
        measure: &mut M,
        budget: Duration,
    ) -> Result<Poll<Arc<GridDimensions>>, SizeError> {
        if let Phase::Published(ref dims) = self.phase {
            return Ok(Poll::Ready(Arc::clone(dims)));
        }
        match self.run_burst(measure, budget)? {
            Progress::Pending => Ok(Poll::Pending),
            Progress::Measured => {
                let dims = self.aggregate();
                Ok(Poll::Ready(self.publish(dims)))
            }
        }
    }

    fn aggregate(&mut self) -> GridDimensions {
        GridDimensions::from_sizes(
            self.dataset_key.clone(),
            self.created_at,
            std::mem::take(&mut self.col_sizes),
            std::mem::take(&mut self.row_sizes),
        )
    }

    fn publish(&mut self, dims: GridDimensions) -> Arc<GridDimensions> {
        dims.log_published();
        let dims = Arc::new(dims);
        self.phase = Phase::Published(Arc::clone(&dims));
        dims
    }
}

/// Compute dimensions asynchronously, yielding between bursts.
///
/// Each burst runs for at most `config.yield_interval` before yielding one
/// scheduler tick. Prefix sums are built on a blocking task and published as
/// one immutable snapshot.
///
/// # Errors
///
/// Measurement failure aborts immediately; nothing is published.
pub async fn compute_grid_dimensions<M: Measure + ?Sized>(
    mut job: SizeJob,
    measure: &mut M,
    config: SizingConfig,
) -> Result<Arc<GridDimensions>, SizeError> {
    loop {
        match job.run_burst(measure, config.yield_interval)? {
            Progress::Pending => tokio::task::yield_now().await,
            Progress::Measured => break,
        }
    }

    let dataset_key = job.dataset_key.clone();
    let created_at = job.created_at;
    let col_sizes = std::mem::take(&mut job.col_sizes);
    let row_sizes = std::mem::take(&mut job.row_sizes);
    let dims = tokio::task::spawn_blocking(move || {
        GridDimensions::from_sizes(dataset_key, created_at, col_sizes, row_sizes)
    })
    .await
    .map_err(|e| SizeError::AggregationFailed {
        reason: e.to_string(),
    })?;

    Ok(job.publish(dims))
}

/// Compute dimensions in one go, without yielding.
///
/// For previews and non-interactive contexts. Output is identical to
/// [`compute_grid_dimensions`].
pub fn compute_grid_dimensions_blocking<M: Measure + ?Sized>(
    mut job: SizeJob,
    measure: &mut M,
) -> Result<Arc<GridDimensions>, SizeError> {
    job.run_until(measure, None)?;
    let dims = job.aggregate();
    Ok(job.publish(dims))
}
