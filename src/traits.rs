//! Common heap trait
//!
//! [`Heap`] is the minimal priority-queue surface shared by the heaps in this
//! crate. It mirrors `std::collections::BinaryHeap` (`push`, `peek`, `pop`)
//! with two differences: it is a min-heap, and it stores bare keys with no
//! attached payload. Generic tests are written against it so that every
//! comparator configuration is held to the same behaviour.

/// Base trait for min-heaps over ordered keys
///
/// # Example
///
/// ```rust
/// use binomial_lab::Heap;
/// use binomial_lab::binomial::BinomialHeap;
///
/// let mut heap: BinomialHeap<i32> = Heap::new();
/// heap.push(3);
/// heap.push(1);
/// heap.push(2);
///
/// assert_eq!(heap.peek(), Some(1));
/// assert_eq!(heap.pop(), Some(1));
/// ```
pub trait Heap<K> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap holds no keys
    fn is_empty(&self) -> bool;

    /// Returns the number of keys in the heap
    fn len(&self) -> usize;

    /// Inserts a key
    ///
    /// # Time Complexity
    /// O(log n) worst case, O(1) amortized for a binomial heap.
    fn push(&mut self, key: K);

    /// Returns a copy of the smallest key without removing it
    ///
    /// # Time Complexity
    /// O(log n) for a binomial heap: every root is scanned.
    fn peek(&self) -> Option<K>;

    /// Removes and returns the smallest key
    ///
    /// # Time Complexity
    /// O(log n).
    fn pop(&mut self) -> Option<K>;

    /// Moves every key of `other` into this heap, consuming `other`
    ///
    /// # Time Complexity
    /// O(log n) for binomial heaps sharing an arena. Heaps on different
    /// arenas first move the nodes of one side, which costs O(min(n₁, n₂)).
    fn merge(&mut self, other: Self);
}
