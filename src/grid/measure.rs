//! Cell measurement: provider traits and LRU memoization
//!
//! Measuring a cell is expensive (it runs a text layout), and large tables
//! repeat the same content many times. [`CellMeasurer`] memoizes width by
//! content and height by `(content, width)` in two bounded LRU caches that
//! outlive individual size computations.

use super::Px;
use crate::error::MeasureError;
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Default number of entries kept by each measurement cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Engine-facing measurement interface, addressed by cell position.
///
/// Implementations must be deterministic for a given content and width.
pub trait Measure {
    /// Natural width of the cell at `(row, col)`.
    fn measure_width(&mut self, row: usize, col: usize) -> Result<Px, MeasureError>;

    /// Height of the cell at `(row, col)` when constrained to `width`.
    fn measure_height(&mut self, row: usize, col: usize, width: Px) -> Result<Px, MeasureError>;
}

/// Content-level measurement provider, backed by some layout engine.
pub trait ContentMeasure<T> {
    /// Natural width of `item`.
    fn measure_width(&mut self, row: usize, col: usize, item: &T) -> Result<Px, MeasureError>;

    /// Height of `item` when laid out at `width`.
    fn measure_height(
        &mut self,
        row: usize,
        col: usize,
        item: &T,
        width: Px,
    ) -> Result<Px, MeasureError>;
}

/// Bounded least-recently-used memo of measured sizes.
///
/// Failed computations are not cached.
pub struct MeasureCache<K: Hash + Eq> {
    cache: LruCache<K, Px>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq> MeasureCache<K> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 falls back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or(NonZeroUsize::MIN.saturating_add(DEFAULT_CACHE_CAPACITY - 1));
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached size for `key`, computing and inserting it on a miss.
    ///
    /// A hit marks `key` most recently used. An insert beyond capacity evicts
    /// the least recently used entry.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lazygrid::grid::measure::MeasureCache;
    /// let mut cache: MeasureCache<&str> = MeasureCache::new(2);
    /// let w = cache.get_or_compute("abc", || Ok::<_, ()>(30)).unwrap();
    /// assert_eq!(w, 30);
    /// // Second lookup does not call the closure
    /// let w = cache.get_or_compute("abc", || Err(())).unwrap();
    /// assert_eq!(w, 30);
    /// ```
    pub fn get_or_compute<E>(
        &mut self,
        key: K,
        compute: impl FnOnce() -> Result<Px, E>,
    ) -> Result<Px, E> {
        if let Some(&size) = self.cache.get(&key) {
            self.hits += 1;
            return Ok(size);
        }
        self.misses += 1;
        let size = compute()?;
        self.cache.put(key, size);
        Ok(size)
    }

    /// Check for `key` without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to compute.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl<K: Hash + Eq> Default for MeasureCache<K> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Memoizing wrapper around a [`ContentMeasure`] provider.
///
/// Width is cached by content alone and height by `(content, width)`.
/// Cell position is passed through to the provider but is not part of the key,
/// so two cells with equal content share one measurement.
pub struct CellMeasurer<T: Hash + Eq + Clone, M> {
    provider: M,
    width_cache: MeasureCache<T>,
    height_cache: MeasureCache<(T, Px)>,
}

impl<T: Hash + Eq + Clone, M: ContentMeasure<T>> CellMeasurer<T, M> {
    /// Wrap `provider` with caches of `capacity` entries each.
    pub fn new(provider: M, capacity: usize) -> Self {
        Self {
            provider,
            width_cache: MeasureCache::new(capacity),
            height_cache: MeasureCache::new(capacity),
        }
    }

    /// Cached natural width of `item`.
    pub fn measure_width(&mut self, row: usize, col: usize, item: &T) -> Result<Px, MeasureError> {
        let provider = &mut self.provider;
        self.width_cache
            .get_or_compute(item.clone(), || provider.measure_width(row, col, item))
    }

    /// Cached height of `item` at `width`.
    pub fn measure_height(
        &mut self,
        row: usize,
        col: usize,
        item: &T,
        width: Px,
    ) -> Result<Px, MeasureError> {
        let provider = &mut self.provider;
        self.height_cache
            .get_or_compute((item.clone(), width), || {
                provider.measure_height(row, col, item, width)
            })
    }

    /// Width cache, for inspection.
    pub fn width_cache(&self) -> &MeasureCache<T> {
        &self.width_cache
    }

    /// Height cache, for inspection.
    pub fn height_cache(&self) -> &MeasureCache<(T, Px)> {
        &self.height_cache
    }

    /// Borrow the wrapped provider.
    pub fn provider(&self) -> &M {
        &self.provider
    }
}

/// Row-major cell matrix bound to a [`CellMeasurer`].
///
/// Column count is taken from the first row. A shorter row surfaces as a
/// [`MeasureError`] for the missing cell.
pub struct TableSource<'a, T: Hash + Eq + Clone, M> {
    rows: &'a [Vec<T>],
    measurer: &'a mut CellMeasurer<T, M>,
}

impl<'a, T: Hash + Eq + Clone, M: ContentMeasure<T>> TableSource<'a, T, M> {
    /// Bind `rows` to `measurer`.
    pub fn new(rows: &'a [Vec<T>], measurer: &'a mut CellMeasurer<T, M>) -> Self {
        Self { rows, measurer }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (length of the first row).
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    fn cell(&self, row: usize, col: usize) -> Result<&'a T, MeasureError> {
        let rows: &'a [Vec<T>] = self.rows;
        rows.get(row)
            .and_then(|r| r.get(col))
            .ok_or_else(|| MeasureError::new(row, col, "cell missing from source row"))
    }
}

impl<T: Hash + Eq + Clone, M: ContentMeasure<T>> Measure for TableSource<'_, T, M> {
    fn measure_width(&mut self, row: usize, col: usize) -> Result<Px, MeasureError> {
        let item = self.cell(row, col)?;
        self.measurer.measure_width(row, col, item)
    }

    fn measure_height(&mut self, row: usize, col: usize, width: Px) -> Result<Px, MeasureError> {
        let item = self.cell(row, col)?;
        self.measurer.measure_height(row, col, item, width)
    }
}

/// Provider that reports the same size for every cell.
///
/// Used for previews and tests where no layout engine is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMeasure {
    /// Width reported for every cell.
    pub width: Px,
    /// Height reported for every cell.
    pub height: Px,
}

impl<T> ContentMeasure<T> for FixedMeasure {
    fn measure_width(&mut self, _row: usize, _col: usize, _item: &T) -> Result<Px, MeasureError> {
        Ok(self.width)
    }

    fn measure_height(
        &mut self,
        _row: usize,
        _col: usize,
        _item: &T,
        _width: Px,
    ) -> Result<Px, MeasureError> {
        Ok(self.height)
    }
}

/// [`Measure`] built from two closures.
pub struct FnMeasure<W, H> {
    width: W,
    height: H,
}

/// Build a [`Measure`] from a width closure and a height closure.
pub fn measure_fn<W, H>(width: W, height: H) -> FnMeasure<W, H>
where
    W: FnMut(usize, usize) -> Result<Px, MeasureError>,
    H: FnMut(usize, usize, Px) -> Result<Px, MeasureError>,
{
    FnMeasure { width, height }
}

impl<W, H> Measure for FnMeasure<W, H>
where
    W: FnMut(usize, usize) -> Result<Px, MeasureError>,
    H: FnMut(usize, usize, Px) -> Result<Px, MeasureError>,
{
    fn measure_width(&mut self, row: usize, col: usize) -> Result<Px, MeasureError> {
        (self.width)(row, col)
    }

    fn measure_height(&mut self, row: usize, col: usize, width: Px) -> Result<Px, MeasureError> {
        (self.height)(row, col, width)
    }
}
