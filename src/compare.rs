//! Key comparison strategies
//!
//! Every key-vs-key decision a [`BinomialHeap`](crate::binomial::BinomialHeap)
//! makes goes through a [`KeyCompare`] implementation. Two are provided:
//!
//! - [`NaturalOrder`]: plain `Ord`, nothing recorded.
//! - [`ComparisonCounter`]: `Ord` plus a tally of every call, shared between
//!   all clones of the counter.
//!
//! Degree comparisons made while splicing root lists are structural and never
//! reach the comparator, so the tally is exactly the number of key
//! comparisons.
//!
//! # Attributing cost to one operation
//!
//! ```rust
//! use binomial_lab::binomial::BinomialHeap;
//! use binomial_lab::compare::ComparisonCounter;
//!
//! let counter = ComparisonCounter::new();
//! let mut heap = BinomialHeap::with_comparator(counter.clone());
//! heap.insert(2);
//!
//! let before = counter.snapshot();
//! heap.insert(1);
//! assert_eq!(counter.since(before), 1); // one link
//!
//! let (min, cost) = counter.measure(|| heap.minimum());
//! assert_eq!((min, cost), (Some(1), 0)); // a single root needs no comparison
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Strict "less than" over keys.
///
/// Implementations must be a strict weak order consistent across calls; the
/// heap relies on it for heap order but never on `a == b` directly.
pub trait KeyCompare<K: ?Sized> {
    /// Returns true if `a` orders strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;
}

/// Uncounted comparison through `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyCompare<K> for NaturalOrder {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// A point-in-time reading of a [`ComparisonCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Snapshot(u64);

impl Snapshot {
    /// The raw count at the time of the snapshot.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Counting comparator with a shared tally.
///
/// Clones share one tally, so two heaps built from clones of the same counter
/// (and the heap produced by melding them) all add to the same total. The
/// tally only grows through comparisons and is only reset by [`reset`].
///
/// The tally lives in an `Rc<Cell<_>>`: a counter and every heap holding it
/// stay on one thread, and reads or resets must happen between heap
/// operations.
///
/// [`reset`]: ComparisonCounter::reset
#[derive(Clone, Default)]
pub struct ComparisonCounter {
    count: Rc<Cell<u64>>,
}

impl ComparisonCounter {
    /// Creates a counter with a fresh tally of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tally.
    #[inline]
    pub fn get(&self) -> u64 {
        self.count.get()
    }

    /// Sets the tally back to zero for every clone.
    pub fn reset(&self) {
        self.count.set(0);
    }

    /// Records the current tally.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.count.get())
    }

    /// Comparisons made since `snapshot` was taken.
    ///
    /// Saturates at zero if the counter was reset in between.
    pub fn since(&self, snapshot: Snapshot) -> u64 {
        self.count.get().saturating_sub(snapshot.0)
    }

    /// Runs `op` and returns its result with the comparisons it made.
    pub fn measure<R>(&self, op: impl FnOnce() -> R) -> (R, u64) {
        let before = self.snapshot();
        let result = op();
        (result, self.since(before))
    }

    /// Returns true if both handles share one tally.
    pub fn shares_tally_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.count, &other.count)
    }

    #[inline]
    fn bump(&self) {
        self.count.set(self.count.get() + 1);
    }
}

impl fmt::Debug for ComparisonCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparisonCounter")
            .field("count", &self.get())
            .finish()
    }
}

impl<K: Ord + ?Sized> KeyCompare<K> for ComparisonCounter {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self.bump();
        a < b
    }
}
