//! Offset table lookups - pixel position to row/column index
//!
//! An offset table is a prefix-sum array: `offsets[i]` is the pixel position
//! where row (or column) `i` starts, `offsets[0] == 0`, and the array is
//! non-decreasing. Zero-sized rows produce repeated values.
//!
//! # Complexity
//!
//! - `value_to_index`: O(log n)
//! - `span_for`: O(log n)

use super::Px;

/// Find the index of the interval containing `value`.
///
/// Returns:
/// - `0` if `offsets` is empty or `value <= offsets[0]`
/// - `offsets.len() - 1` if `value >= offsets[last]`
/// - otherwise the unique `i` with `offsets[i] <= value < offsets[i + 1]`
///
/// Out-of-range values clamp to the nearest valid index; this never fails.
///
/// # Examples
///
/// ```
/// # use lazygrid::grid::offsets::value_to_index;
/// let col_offsets = [0, 10, 30];
/// assert_eq!(value_to_index(&col_offsets, -5), 0);
/// assert_eq!(value_to_index(&col_offsets, 9), 0);
/// assert_eq!(value_to_index(&col_offsets, 10), 1);
/// assert_eq!(value_to_index(&col_offsets, 25), 1);
/// assert_eq!(value_to_index(&col_offsets, 500), 2);
/// assert_eq!(value_to_index(&[], 42), 0);
/// ```
pub fn value_to_index(offsets: &[Px], value: Px) -> usize {
    let (Some(&first), Some(&last)) = (offsets.first(), offsets.last()) else {
        return 0;
    };
    if value <= first {
        return 0;
    }
    if value >= last {
        return offsets.len() - 1;
    }

    // Here offsets[0] < value < offsets[last], so the answer lies in
    // [0, len - 2] and mid + 1 never leaves the array.
    let mut low = 0;
    let mut high = offsets.len() - 1;
    while high > low {
        let mid = low + (high - low) / 2;
        if value < offsets[mid] {
            high = mid - 1;
        } else if value >= offsets[mid + 1] {
            low = mid + 1;
        } else {
            return mid;
        }
    }
    low
}

/// Inclusive range of row or column indices.
///
/// # Invariants
/// - `first <= last`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexSpan {
    /// First index (inclusive).
    pub first: usize,
    /// Last index (inclusive).
    pub last: usize,
}

impl IndexSpan {
    /// Create a span, swapping the bounds if given in reverse.
    pub fn new(first: usize, last: usize) -> Self {
        if first <= last {
            Self { first, last }
        } else {
            Self {
                first: last,
                last: first,
            }
        }
    }

    /// Number of indices covered.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Spans always cover at least one index.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `index` falls inside the span.
    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }

    /// Iterate the covered indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.first..=self.last
    }
}

/// Map the half-open pixel interval `[start, end)` to the span of indices it
/// touches.
///
/// Returns `None` when the table is empty or the interval is empty.
///
/// # Examples
///
/// ```
/// # use lazygrid::grid::offsets::{span_for, IndexSpan};
/// let col_offsets = [0, 10, 30];
/// assert_eq!(span_for(&col_offsets, 15, 45), Some(IndexSpan::new(1, 2)));
/// assert_eq!(span_for(&col_offsets, 15, 15), None);
/// ```
pub fn span_for(offsets: &[Px], start: Px, end: Px) -> Option<IndexSpan> {
    if offsets.is_empty() || end <= start {
        return None;
    }
    Some(IndexSpan::new(
        value_to_index(offsets, start),
        value_to_index(offsets, end - 1),
    ))
}
