//! Binomial Heap implementation
//!
//! A binomial heap is a forest of binomial trees with:
//! - O(log n) insert worst case, O(1) amortized
//! - O(log n) minimum and extract-min
//! - O(log n) meld (union) of two heaps sharing an arena
//!
//! # Algorithm Overview
//!
//! **Binomial Tree Bₖ**: Recursively defined:
//! - B₀ is a single node
//! - Bₖ is formed by linking two Bₖ₋₁ trees, one root becoming the leftmost
//!   child of the other
//! - Bₖ has exactly 2ᵏ nodes, and C(k, i) of them sit at depth i
//!
//! The roots form a singly linked **root list** sorted by strictly increasing
//! degree, at most one tree per degree. The degrees present are the set bits
//! of the element count: 13 elements are held as B₀, B₂ and B₃.
//!
//! Every public operation reduces to two primitives:
//! - **link**: one key comparison decides which of two equal-degree roots
//!   becomes the child of the other
//! - **merge + consolidate**: splice two degree-sorted root lists together,
//!   then link equal-degree neighbours left to right, exactly like carry
//!   propagation in binary addition
//!
//! `insert` melds a singleton tree into the root list. `extract_min` unhooks
//! the minimum root, reverses its child list (children are kept in decreasing
//! degree order) and melds that list back in.
//!
//! # Storage
//!
//! Nodes live in a [`NodeArena`] reached through a [`SharedArena`] handle and
//! refer to each other by key. Heaps created with
//! [`new_sibling`](BinomialHeap::new_sibling) or
//! [`with_arena`](BinomialHeap::with_arena) on the same handle keep their
//! nodes in one arena, and `union` between them only splices root lists: no
//! node is moved, copied or freed.
//!
//! Heaps on different arenas still meld correctly, but the nodes of one side
//! are moved across first, which costs O(min(n₁, n₂)) when neither arena is
//! shared with a third heap and O(n₂) otherwise. Moving nodes makes no key
//! comparisons and does not change the shape of any tree.
//!
//! # Comparison accounting
//!
//! All key comparisons go through the heap's [`KeyCompare`] value. With a
//! [`ComparisonCounter`](crate::compare::ComparisonCounter) the tally is
//! exact:
//! - a link costs exactly one comparison
//! - scanning r roots for the minimum costs r − 1 comparisons
//! - merging root lists compares degrees only and costs nothing

use std::fmt;
use std::mem;
use std::rc::Rc;

use thiserror::Error;
use tracing::trace;

use crate::arena::{Node, NodeArena, NodeKey, SharedArena};
use crate::compare::{KeyCompare, NaturalOrder};
use crate::rank::{self, Degree, DegreeList};
use crate::traits::Heap;

/// A structural fault found by [`BinomialHeap::check_invariants`].
///
/// None of these can be produced through the public API; they exist so tests
/// can audit the structure after arbitrary operation sequences.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root degrees {degrees:?} are not strictly increasing")]
    RootOrder { degrees: Vec<Degree> },
    #[error("root degrees {found:?} do not match the set bits {expected:?} of len {len}")]
    NotCanonical {
        len: usize,
        found: Vec<Degree>,
        expected: Vec<Degree>,
    },
    #[error("root of degree {degree} still has a parent link")]
    RootHasParent { degree: Degree },
    #[error("node at depth {depth} does not point back to its parent")]
    BrokenParentLink { depth: usize },
    #[error("node at depth {depth} has a smaller key than its parent")]
    HeapOrder { depth: usize },
    #[error("node of degree {degree} has {children} children")]
    DegreeMismatch { degree: Degree, children: usize },
    #[error("child {position} of a degree-{parent} node has degree {found}")]
    ChildDegree {
        parent: Degree,
        position: usize,
        found: Degree,
    },
    #[error("tree of degree {degree} has {found} nodes at depth {depth}, expected {expected}")]
    DepthProfile {
        degree: Degree,
        depth: usize,
        found: usize,
        expected: usize,
    },
    #[error("len is {len} but {counted} nodes are reachable")]
    SizeMismatch { len: usize, counted: usize },
    #[error("len is {len} but the heap's own arena stores {stored} nodes")]
    ArenaMismatch { len: usize, stored: usize },
}

/// Binomial Heap
///
/// `C` decides key order and may record comparisons; see
/// [`ComparisonCounter`](crate::compare::ComparisonCounter).
///
/// # Example
///
/// ```rust
/// use binomial_lab::binomial::BinomialHeap;
///
/// let mut heap = BinomialHeap::new();
/// for key in [10, 5, 15, 3, 8] {
///     heap.insert(key);
/// }
/// assert_eq!(heap.to_string(), "B0(8) B2(3)");
/// assert_eq!(heap.minimum(), Some(3));
///
/// // a second heap on the same arena melds without moving nodes
/// let mut other = heap.new_sibling();
/// other.insert(1);
/// let mut heap = heap.union(other);
/// assert_eq!(heap.extract_min(), Some(1));
/// assert_eq!(heap.extract_min(), Some(3));
/// ```
pub struct BinomialHeap<K, C = NaturalOrder> {
    /// Owner of every node in the forest, possibly shared with other heaps
    arena: SharedArena<K>,
    /// First root of the root list (lowest degree)
    head: Option<NodeKey>,
    /// Number of keys, kept alongside the recursive `size`
    len: usize,
    cmp: C,
}

impl<K: Ord> BinomialHeap<K> {
    /// Creates an empty heap ordered by `Ord`, on a fresh arena.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Alias of [`BinomialHeap::new`].
    pub fn make_heap() -> Self {
        Self::new()
    }
}

impl<K: Ord> Default for BinomialHeap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> BinomialHeap<K, C> {
    /// Creates an empty heap that compares keys through `cmp`, on a fresh
    /// arena.
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_arena(NodeArena::shared(), cmp)
    }

    /// Creates an empty heap storing its nodes in `arena`.
    pub fn with_arena(arena: SharedArena<K>, cmp: C) -> Self {
        Self {
            arena,
            head: None,
            len: 0,
            cmp,
        }
    }

    /// Creates an empty heap on this heap's arena with a clone of its
    /// comparator. Melding the two later splices root lists only.
    pub fn new_sibling(&self) -> Self
    where
        C: Clone,
    {
        Self::with_arena(Rc::clone(&self.arena), self.cmp.clone())
    }

    pub fn arena(&self) -> &SharedArena<K> {
        &self.arena
    }

    /// Returns true if both heaps store their nodes in one arena.
    pub fn shares_arena_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena)
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// O(1)
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of keys, O(1).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of keys, counted by walking every tree. O(n).
    pub fn size(&self) -> usize {
        self.arena.borrow().count_trees(self.head)
    }

    /// Degrees of the root list, in list order.
    pub fn root_degrees(&self) -> DegreeList {
        let arena = self.arena.borrow();
        let degrees = arena
            .siblings(self.head)
            .map(|root| arena[root].degree)
            .collect();
        degrees
    }
}

impl<K, C: KeyCompare<K>> BinomialHeap<K, C> {
    /// Inserts a key
    ///
    /// **Time Complexity**: O(log n) worst case, O(1) amortized
    ///
    /// **Algorithm**: a new B₀ tree is melded into the root list. Each B₀
    /// already present turns into a carry: with m keys already in the heap,
    /// the insert performs as many links as m has trailing one bits. Over m
    /// inserts from empty that adds up to m − popcount(m) comparisons.
    pub fn insert(&mut self, key: K) {
        let mut arena = self.arena.borrow_mut();
        let node = arena.insert(Node::singleton(key));
        self.head = Forest::new(&mut arena, &self.cmp).union_lists(self.head, Some(node));
        self.len += 1;
    }

    /// Returns a copy of the smallest key, or `None` if empty
    ///
    /// **Time Complexity**: O(log n), one comparison per root after the first
    ///
    /// When several roots hold equal minimal keys, the first in list order is
    /// returned.
    pub fn minimum(&self) -> Option<K>
    where
        K: Clone,
    {
        let arena = self.arena.borrow();
        let (_, min) = locate_min(&arena, &self.cmp, self.head)?;
        Some(arena[min].key.clone())
    }

    /// Removes and returns the smallest key, or `None` if empty
    ///
    /// **Time Complexity**: O(log n)
    ///
    /// **Algorithm**:
    /// 1. Scan the root list for the minimum root and its predecessor
    /// 2. Splice the minimum root out of the root list
    /// 3. Reverse its child list (Bₖ₋₁, ..., B₀ becomes B₀, ..., Bₖ₋₁) and
    ///    clear the children's parent links
    /// 4. Meld that list with the remaining roots
    ///
    /// Exactly one node is freed.
    pub fn extract_min(&mut self) -> Option<K> {
        let mut arena = self.arena.borrow_mut();
        let (prev, min) = locate_min(&arena, &self.cmp, self.head)?;

        let after = arena[min].sibling;
        match prev {
            Some(prev) => arena[prev].sibling = after,
            None => self.head = after,
        }

        let node = arena.remove(min)?;
        let mut forest = Forest::new(&mut arena, &self.cmp);
        let children = forest.detach_children(node.child);
        self.head = forest.union_lists(self.head, children);
        self.len -= 1;
        Some(node.key)
    }

    /// Melds two heaps into one, consuming both
    ///
    /// **Time Complexity**: O(log n) where n is the combined size, when both
    /// heaps share an arena. Otherwise the nodes of one side are moved into
    /// the other's arena first, which adds O(min(n₁, n₂)) when neither arena
    /// is shared with a third heap and O(n₂) when one is.
    ///
    /// The result keeps `self`'s comparator and arena. Nothing of `other`
    /// outlives the call except its keys, now owned by the result.
    pub fn union(mut self, other: Self) -> Self {
        self.union_with(other);
        self
    }

    /// Moves every key of `other` into this heap
    ///
    /// Same cost as [`union`](Self::union). On equal degrees, `self`'s roots
    /// come first in the merged root list, so `self`'s tree survives a tie on
    /// keys.
    pub fn union_with(&mut self, mut other: Self) {
        let other_len = mem::take(&mut other.len);
        let mut other_head = other.head.take();
        if !self.shares_arena_with(&other) {
            other_head = self.relocate(&mut other.arena, other_head, other_len);
        }

        trace!(left = self.len, right = other_len, "melding binomial heaps");
        let mut arena = self.arena.borrow_mut();
        self.head = Forest::new(&mut arena, &self.cmp).union_lists(self.head, other_head);
        self.len += other_len;
    }

    /// Drains the heap in ascending order.
    pub fn into_sorted_vec(mut self) -> Vec<K> {
        let mut sorted = Vec::with_capacity(self.len);
        while let Some(key) = self.extract_min() {
            sorted.push(key);
        }
        sorted
    }

    /// Brings the trees of a heap on another arena into this heap's arena and
    /// returns their root-list head there.
    ///
    /// When neither arena is shared, the larger one is kept and the smaller
    /// side's nodes move; otherwise `other`'s nodes move into `self`'s arena.
    fn relocate(
        &mut self,
        other_arena: &mut SharedArena<K>,
        other_head: Option<NodeKey>,
        other_len: usize,
    ) -> Option<NodeKey> {
        let private = Rc::strong_count(&self.arena) == 1 && Rc::strong_count(other_arena) == 1;
        if private && self.len < other_len {
            mem::swap(&mut self.arena, other_arena);
            let mine = self.head.take();
            trace!(moved = self.len, "adopting the larger arena");
            self.head = self
                .arena
                .borrow_mut()
                .transplant(&mut other_arena.borrow_mut(), mine);
            other_head
        } else {
            trace!(moved = other_len, "moving nodes across arenas");
            self.arena
                .borrow_mut()
                .transplant(&mut other_arena.borrow_mut(), other_head)
        }
    }
}

/// Finds the minimum root and the root before it in the list.
fn locate_min<K, C: KeyCompare<K>>(
    arena: &NodeArena<K>,
    cmp: &C,
    head: Option<NodeKey>,
) -> Option<(Option<NodeKey>, NodeKey)> {
    let mut min = head?;
    let mut min_prev = None;
    let mut prev = min;

    for root in arena.siblings(arena[min].sibling) {
        if cmp.less(&arena[root].key, &arena[min].key) {
            min = root;
            min_prev = Some(prev);
        }
        prev = root;
    }
    Some((min_prev, min))
}

/// The structural primitives, working on one borrowed arena.
struct Forest<'a, K, C> {
    arena: &'a mut NodeArena<K>,
    cmp: &'a C,
}

impl<'a, K, C: KeyCompare<K>> Forest<'a, K, C> {
    fn new(arena: &'a mut NodeArena<K>, cmp: &'a C) -> Self {
        Self { arena, cmp }
    }

    /// Turns a child list into a root list: reversed, parent links cleared.
    fn detach_children(&mut self, first: Option<NodeKey>) -> Option<NodeKey> {
        let mut reversed = None;
        let mut current = first;
        while let Some(node) = current {
            let entry = &mut self.arena[node];
            current = entry.sibling;
            entry.sibling = reversed;
            entry.parent = None;
            reversed = Some(node);
        }
        reversed
    }

    /// Merges two canonical root lists and consolidates the result.
    fn union_lists(&mut self, a: Option<NodeKey>, b: Option<NodeKey>) -> Option<NodeKey> {
        let merged = self.merge_root_lists(a, b);
        let head = self.consolidate(merged);
        debug_assert!(
            self.degrees_strictly_increase(head),
            "consolidate left two roots of equal degree: {:?}",
            self.arena
                .siblings(head)
                .map(|root| self.arena[root].degree)
                .collect::<Vec<_>>()
        );
        head
    }

    /// Links two roots of equal degree and returns the surviving root
    ///
    /// **Time Complexity**: O(1), exactly one key comparison
    ///
    /// The root with the smaller key stays on top; on equal keys `a` stays on
    /// top. The other root becomes the new leftmost child, so children stay in
    /// decreasing degree order and the survivor's degree grows by one.
    fn link(&mut self, a: NodeKey, b: NodeKey) -> NodeKey {
        debug_assert_eq!(self.arena[a].degree, self.arena[b].degree);

        let (root, child) = if self.cmp.less(&self.arena[b].key, &self.arena[a].key) {
            (b, a)
        } else {
            (a, b)
        };

        let first_child = self.arena[root].child;
        let loser = &mut self.arena[child];
        loser.parent = Some(root);
        loser.sibling = first_child;

        let winner = &mut self.arena[root];
        winner.child = Some(child);
        winner.degree = rank::checked_increment(winner.degree);
        root
    }

    /// Splices two degree-sorted root lists into one, like the merge step of
    /// merge sort
    ///
    /// Ordering is by degree only, so no key comparisons happen here. On
    /// equal degrees the root from `a` goes first. Duplicate degrees are left
    /// for [`consolidate`](Self::consolidate).
    fn merge_root_lists(
        &mut self,
        mut a: Option<NodeKey>,
        mut b: Option<NodeKey>,
    ) -> Option<NodeKey> {
        let mut head = None;
        let mut tail: Option<NodeKey> = None;

        while let (Some(x), Some(y)) = (a, b) {
            let next = if self.arena[x].degree <= self.arena[y].degree {
                a = self.arena[x].sibling;
                x
            } else {
                b = self.arena[y].sibling;
                y
            };
            self.append_root(&mut head, tail, next);
            tail = Some(next);
        }

        if let Some(rest) = a.or(b) {
            self.append_root(&mut head, tail, rest);
        }
        head
    }

    fn append_root(&mut self, head: &mut Option<NodeKey>, tail: Option<NodeKey>, node: NodeKey) {
        match tail {
            Some(tail) => self.arena[tail].sibling = Some(node),
            None => *head = Some(node),
        }
    }

    /// Resolves duplicate degrees in a merged root list, left to right
    ///
    /// **Algorithm**: scan with `prev`, `x` and `next = x.sibling`:
    /// - degrees of `x` and `next` differ: advance
    /// - a third root after `next` shares their degree: advance, so the pair
    ///   after `x` links instead and the carry lands behind `x`
    /// - otherwise link `x` with `next`, put the survivor in `x`'s slot and
    ///   look again at the same position, since the grown tree may now collide
    ///   with its new successor
    ///
    /// A merged list holds at most two roots of any degree plus one carry, so
    /// the scan ends with strictly increasing degrees.
    fn consolidate(&mut self, mut head: Option<NodeKey>) -> Option<NodeKey> {
        let mut x = head?;
        let mut prev: Option<NodeKey> = None;

        while let Some(next) = self.arena[x].sibling {
            let degree = self.arena[x].degree;
            let after = self.arena[next].sibling;
            let triple = after.is_some_and(|after| self.arena[after].degree == degree);

            if self.arena[next].degree != degree || triple {
                prev = Some(x);
                x = next;
                continue;
            }

            let survivor = self.link(x, next);
            self.arena[survivor].sibling = after;
            match prev {
                Some(prev) => self.arena[prev].sibling = Some(survivor),
                None => head = Some(survivor),
            }
            x = survivor;
        }
        head
    }

    fn degrees_strictly_increase(&self, head: Option<NodeKey>) -> bool {
        let mut roots = self.arena.siblings(head).map(|root| self.arena[root].degree);
        let Some(mut last) = roots.next() else {
            return true;
        };
        roots.all(|degree| {
            let increasing = degree > last;
            last = degree;
            increasing
        })
    }
}

impl<K: Ord, C> BinomialHeap<K, C> {
    /// Audits the whole structure
    ///
    /// Checks, for every tree: heap order, parent back-links, degree equal to
    /// the number of children, children in decreasing degree order, and
    /// C(k, i) nodes at each depth i of a degree-k tree. For the root list:
    /// strictly increasing degrees matching the set bits of `len`, and
    /// `len == size()`. When no other heap or handle shares the arena, the
    /// arena must hold exactly `len` nodes.
    ///
    /// Keys are compared through `Ord` directly, never through the heap's
    /// comparator, so auditing leaves comparison tallies untouched.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let degrees = self.root_degrees();
        if degrees.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(InvariantViolation::RootOrder {
                degrees: degrees.to_vec(),
            });
        }

        let expected = rank::canonical_degrees(self.len);
        if degrees != expected {
            return Err(InvariantViolation::NotCanonical {
                len: self.len,
                found: degrees.to_vec(),
                expected: expected.to_vec(),
            });
        }

        let arena = self.arena.borrow();
        for root in arena.siblings(self.head) {
            let node = &arena[root];
            if node.parent.is_some() {
                return Err(InvariantViolation::RootHasParent {
                    degree: node.degree,
                });
            }
            check_tree(&arena, root)?;
        }

        let counted = arena.count_trees(self.head);
        if counted != self.len {
            return Err(InvariantViolation::SizeMismatch {
                len: self.len,
                counted,
            });
        }
        if Rc::strong_count(&self.arena) == 1 && arena.len() != self.len {
            return Err(InvariantViolation::ArenaMismatch {
                len: self.len,
                stored: arena.len(),
            });
        }
        Ok(())
    }
}

fn check_tree<K: Ord>(arena: &NodeArena<K>, root: NodeKey) -> Result<(), InvariantViolation> {
    let degree = arena[root].degree;
    let mut per_depth = vec![0usize; usize::from(degree) + 1];
    check_subtree(arena, root, 0, &mut per_depth)?;

    for (depth, &found) in per_depth.iter().enumerate() {
        let expected = rank::binomial(usize::from(degree), depth);
        if found != expected {
            return Err(InvariantViolation::DepthProfile {
                degree,
                depth,
                found,
                expected,
            });
        }
    }
    Ok(())
}

fn check_subtree<K: Ord>(
    arena: &NodeArena<K>,
    node: NodeKey,
    depth: usize,
    per_depth: &mut Vec<usize>,
) -> Result<(), InvariantViolation> {
    if per_depth.len() <= depth {
        per_depth.resize(depth + 1, 0);
    }
    per_depth[depth] += 1;

    let parent = &arena[node];
    let mut children = 0usize;
    for child in arena.siblings(parent.child) {
        let entry = &arena[child];
        children += 1;
        if entry.parent != Some(node) {
            return Err(InvariantViolation::BrokenParentLink { depth: depth + 1 });
        }
        if entry.key < parent.key {
            return Err(InvariantViolation::HeapOrder { depth: depth + 1 });
        }
        if usize::from(entry.degree) + children != usize::from(parent.degree) {
            return Err(InvariantViolation::ChildDegree {
                parent: parent.degree,
                position: children,
                found: entry.degree,
            });
        }
        check_subtree(arena, child, depth + 1, per_depth)?;
    }

    if children != usize::from(parent.degree) {
        return Err(InvariantViolation::DegreeMismatch {
            degree: parent.degree,
            children,
        });
    }
    Ok(())
}

/// Frees this heap's nodes from a shared arena. A heap that is the last
/// holder of its arena leaves the freeing to the arena itself.
impl<K, C> Drop for BinomialHeap<K, C> {
    fn drop(&mut self) {
        if Rc::strong_count(&self.arena) == 1 {
            return;
        }
        if let Some(head) = self.head.take() {
            if let Ok(mut arena) = self.arena.try_borrow_mut() {
                arena.free_trees(Some(head));
            }
        }
    }
}

impl<K: Clone, C: KeyCompare<K> + Default> Heap<K> for BinomialHeap<K, C> {
    fn new() -> Self {
        Self::with_comparator(C::default())
    }

    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, key: K) {
        self.insert(key);
    }

    fn peek(&self) -> Option<K> {
        self.minimum()
    }

    fn pop(&mut self) -> Option<K> {
        self.extract_min()
    }

    fn merge(&mut self, other: Self) {
        self.union_with(other);
    }
}

impl<K, C: KeyCompare<K>> Extend<K> for BinomialHeap<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, keys: I) {
        for key in keys {
            self.insert(key);
        }
    }
}

impl<K, C: KeyCompare<K> + Default> FromIterator<K> for BinomialHeap<K, C> {
    fn from_iter<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut heap = Self::with_comparator(C::default());
        heap.extend(keys);
        heap
    }
}

/// Root list in the form `B<degree>(<root key>)`, e.g. `B0(8) B2(3)`.
impl<K: fmt::Display, C> fmt::Display for BinomialHeap<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("empty");
        }
        let arena = self.arena.borrow();
        for (i, root) in arena.siblings(self.head).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let node = &arena[root];
            write!(f, "B{}({})", node.degree, node.key)?;
        }
        Ok(())
    }
}

impl<K: fmt::Debug, C> fmt::Debug for BinomialHeap<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.borrow();
        let roots: Vec<_> = arena
            .siblings(self.head)
            .map(|root| (arena[root].degree, &arena[root].key))
            .collect();
        f.debug_struct("BinomialHeap")
            .field("len", &self.len)
            .field("roots", &roots)
            .finish()
    }
}
