//! Error types for the grid engine.
//!
//! Errors are structured with `thiserror` and compose via `?` and `From`.
//!
//! # Error Hierarchy
//!
//! - [`SizeError`] - Size computation aborted
//!   - [`MeasureError`] - A measurement provider call failed
//!   - `AggregationFailed` - The prefix-sum task could not be joined
//!
//! # Recovery Strategy
//!
//! A failed size computation publishes nothing. Callers keep whatever
//! `GridDimensions` they already hold, so the grid keeps rendering the previous
//! dataset until a new computation succeeds.
//!
//! [`FlingError`] never leaves the scroll module: a failed animation step is
//! logged and ends the fling (see [`crate::grid::scroll`]).

use thiserror::Error;

/// A measurement provider failed to size a cell.
///
/// Carries the cell coordinates so the log line pinpoints the offending
/// content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to measure cell ({row}, {col}): {reason}")]
pub struct MeasureError {
    /// Row index of the cell.
    pub row: usize,
    /// Column index of the cell.
    pub col: usize,
    /// Provider-specific reason.
    pub reason: String,
}

impl MeasureError {
    /// Create a measurement error for the given cell.
    pub fn new(row: usize, col: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            col,
            reason: reason.into(),
        }
    }
}

/// Size computation aborted before publishing dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    /// A measurement call failed; the computation stops at that cell.
    #[error("Size computation aborted: {0}")]
    Measure(#[from] MeasureError),

    /// The aggregation step (prefix sums and totals) did not complete.
    ///
    /// Only produced by the async driver, which runs aggregation on a
    /// blocking task.
    #[error("Size aggregation failed: {reason}")]
    AggregationFailed {
        /// Join failure description.
        reason: String,
    },
}

/// A fling animation step produced an unusable state.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FlingError {
    /// Offset or velocity became NaN or infinite.
    #[error("Fling state is not finite (value {value}, velocity {velocity})")]
    NonFinite {
        /// Offset at the failed step.
        value: f32,
        /// Velocity at the failed step.
        velocity: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_error_message_names_the_cell() {
        let err = MeasureError::new(3, 7, "font not loaded");
        assert_eq!(
            err.to_string(),
            "Failed to measure cell (3, 7): font not loaded"
        );
    }

    #[test]
    fn size_error_from_measure_error() {
        let err: SizeError = MeasureError::new(0, 1, "boom").into();
        assert!(matches!(err, SizeError::Measure(ref m) if m.col == 1));
        assert!(err.to_string().contains("boom"));
    }
}
