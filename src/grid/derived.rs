//! Dependency-tracked derived values
//!
//! A [`Derived`] caches a value together with the dependency tuple it was
//! computed from. Reading it with the current dependencies returns the cached
//! value unless a dependency changed, in which case the value is recomputed.
//!
//! Downstream consumers compare [`Derived::revision`] to find out whether
//! anything changed since they last looked, without comparing the value
//! itself.

/// Cached value keyed by its dependencies.
#[derive(Debug, Clone)]
pub struct Derived<D, V> {
    deps: Option<D>,
    value: Option<V>,
    revision: u64,
}

impl<D, V> Default for Derived<D, V> {
    fn default() -> Self {
        Self {
            deps: None,
            value: None,
            revision: 0,
        }
    }
}

impl<D: PartialEq, V> Derived<D, V> {
    /// Create an empty node; the first read always computes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `deps`, recomputing only if `deps` changed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lazygrid::grid::derived::Derived;
    /// let mut calls = 0;
    /// let mut node: Derived<(i32, i32), i32> = Derived::new();
    /// assert_eq!(*node.get((1, 2), |&(a, b)| { calls += 1; a + b }), 3);
    /// assert_eq!(*node.get((1, 2), |&(a, b)| { calls += 1; a + b }), 3);
    /// assert_eq!(calls, 1);
    /// ```
    pub fn get(&mut self, deps: D, compute: impl FnOnce(&D) -> V) -> &V {
        let stale = self.deps.as_ref() != Some(&deps);
        match (&mut self.value, stale) {
            (Some(value), false) => value,
            (slot, _) => {
                let value = compute(&deps);
                self.deps = Some(deps);
                self.revision = self.revision.wrapping_add(1);
                slot.insert(value)
            }
        }
    }

    /// Last computed value, if any.
    pub fn peek(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Incremented every time the value is recomputed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop the cached value so the next read recomputes.
    pub fn invalidate(&mut self) {
        self.deps = None;
        self.value = None;
    }
}
