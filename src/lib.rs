//! Binomial heap with exact comparison accounting
//!
//! This crate provides an arena-backed binomial heap whose every key
//! comparison can be counted, together with the experiment harness used to
//! check its cost bounds against measurements.
//!
//! # Features
//!
//! - **Binomial Heap**: O(1) amortized insert; O(log n) minimum, extract-min and
//!   union of heaps sharing one arena
//! - **Comparison counting**: a shared counter injected as the heap's comparator,
//!   read by snapshot difference to attribute cost to single operations
//! - **Invariant audit**: heap order, canonical root list and binomial tree shape
//! - **Experiments**: per-operation cost tables, size sweeps and repeated trials
//!
//! # Example
//!
//! ```rust
//! use binomial_lab::binomial::BinomialHeap;
//! use binomial_lab::compare::ComparisonCounter;
//!
//! let counter = ComparisonCounter::new();
//! let mut left = BinomialHeap::with_comparator(counter.clone());
//! let mut right = left.new_sibling();
//! left.extend([4, 1, 7]);
//! right.extend([3, 9]);
//!
//! let mut heap = left.union(right);
//! assert_eq!(heap.len(), 5);
//! assert_eq!(heap.extract_min(), Some(1));
//! assert!(counter.get() > 0);
//! ```

pub mod arena;
pub mod binomial;
pub mod compare;
pub mod experiment;
pub mod rank;
pub mod traits;

pub use arena::SharedArena;
pub use binomial::{BinomialHeap, InvariantViolation};
pub use compare::{ComparisonCounter, KeyCompare, NaturalOrder};
pub use traits::Heap;
