//! Degree type and helpers for binomial tree shape.
//!
//! # Why u8?
//!
//! The degree of a binomial tree root is bounded by `log₂(n)`. A heap holding
//! every addressable `usize` element still has degrees below 64, so `u8`
//! leaves ample headroom while keeping [`Node`](crate::arena::Node) small.
//!
//! # Canonical degrees
//!
//! A heap of `n` elements in canonical form holds exactly one tree per set bit
//! of `n`: 13 = 0b1101 gives trees of degree 0, 2 and 3.
//! [`canonical_degrees`] produces that list, and the invariant checks in
//! [`BinomialHeap`](crate::binomial::BinomialHeap) compare the root list
//! against it.

use smallvec::SmallVec;

/// Degree of a binomial tree node (its number of children).
pub type Degree = u8;

/// Maximum representable degree.
pub const MAX_DEGREE: Degree = u8::MAX;

/// Degrees of a canonical root list. Inline capacity covers any heap up to
/// 2¹⁶ elements without spilling.
pub type DegreeList = SmallVec<[Degree; 16]>;

/// Increment a degree, panicking on overflow.
///
/// # Panics
///
/// Panics if `degree == MAX_DEGREE`, which would need a tree of 2²⁵⁵ nodes
/// and so can only mean the link primitive was fed inconsistent roots.
///
/// # Example
///
/// ```rust
/// use binomial_lab::rank::checked_increment;
///
/// assert_eq!(checked_increment(3), 4);
/// ```
#[inline]
pub fn checked_increment(degree: Degree) -> Degree {
    degree
        .checked_add(1)
        .expect("degree overflow: a binomial tree of degree 255 cannot exist")
}

/// Set bit positions of `len`, ascending.
///
/// # Example
///
/// ```rust
/// use binomial_lab::rank::canonical_degrees;
///
/// assert_eq!(canonical_degrees(13).as_slice(), &[0, 2, 3]);
/// assert!(canonical_degrees(0).is_empty());
/// ```
pub fn canonical_degrees(len: usize) -> DegreeList {
    (0..usize::BITS)
        .filter(|bit| len & (1usize << bit) != 0)
        .map(|bit| bit as Degree)
        .collect()
}

/// Binomial coefficient C(k, i): the number of nodes at depth `i` of a
/// binomial tree of degree `k`.
pub fn binomial(k: usize, i: usize) -> usize {
    if i > k {
        return 0;
    }
    let i = i.min(k - i);
    (0..i).fold(1usize, |acc, j| acc * (k - j) / (j + 1))
}
