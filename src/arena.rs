//! Slotmap-backed node storage for binomial trees
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeKey`]: the
//! arena owns every node, and `parent`/`child`/`sibling` are plain optional
//! keys. Relinking during consolidation or extraction only rewrites keys, so
//! no node can be freed while still reachable.
//!
//! # Characteristics
//! - Contiguous storage, one allocation per arena growth rather than per node
//! - Generational keys: a key to a removed node never aliases a new node
//! - Explicit removal: a node is freed only by [`NodeArena::remove`] or
//!   [`NodeArena::free_trees`]
//!
//! # Sharing
//!
//! Heaps hold their arena through a [`SharedArena`] handle. Heaps built on the
//! same handle keep their nodes side by side, so melding them only splices
//! root lists. Heaps on different arenas can still be melded, but the nodes
//! of one side must first be moved across with [`NodeArena::transplant`].

use std::cell::RefCell;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::rank::Degree;

new_key_type! {
    /// Stable handle to a node inside one [`NodeArena`].
    pub struct NodeKey;
}

/// Arena handle cloned into every heap that stores its nodes there.
pub type SharedArena<K> = Rc<RefCell<NodeArena<K>>>;

/// A binomial tree node.
///
/// - `parent`: upward link, `None` exactly when the node is a root
/// - `child`: leftmost child (highest degree), `None` for a leaf
/// - `sibling`: next node in the parent's child list, or in the root list
/// - `degree`: number of children; a subtree of degree k holds 2ᵏ nodes
#[derive(Debug, Clone)]
pub struct Node<K> {
    pub key: K,
    pub degree: Degree,
    pub parent: Option<NodeKey>,
    pub child: Option<NodeKey>,
    pub sibling: Option<NodeKey>,
}

impl<K> Node<K> {
    /// A detached degree-0 tree.
    pub fn singleton(key: K) -> Self {
        Self {
            key,
            degree: 0,
            parent: None,
            child: None,
            sibling: None,
        }
    }
}

/// Owner of the nodes of one or more heaps.
#[derive(Debug, Clone)]
pub struct NodeArena<K> {
    nodes: SlotMap<NodeKey, Node<K>>,
}

impl<K> Default for NodeArena<K> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }
}

impl<K> NodeArena<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh empty arena behind a handle heaps can share.
    pub fn shared() -> SharedArena<K> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: Node<K>) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Frees a node, returning it if the key was live.
    pub fn remove(&mut self, key: NodeKey) -> Option<Node<K>> {
        self.nodes.remove(key)
    }

    pub fn get(&self, key: NodeKey) -> Option<&Node<K>> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Walks a sibling list starting at `first`.
    pub fn siblings(&self, first: Option<NodeKey>) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(first, move |&node| self.nodes[node].sibling)
    }

    /// Number of nodes in the trees of the list starting at `first`.
    pub fn count_trees(&self, first: Option<NodeKey>) -> usize {
        self.siblings(first)
            .map(|node| 1 + self.count_trees(self.nodes[node].child))
            .sum()
    }

    /// Frees every node of the trees in the list starting at `first` and
    /// returns how many were freed.
    pub fn free_trees(&mut self, first: Option<NodeKey>) -> usize {
        let mut pending: Vec<NodeKey> = first.into_iter().collect();
        let mut freed = 0;
        while let Some(key) = pending.pop() {
            if let Some(node) = self.nodes.remove(key) {
                freed += 1;
                pending.extend(node.child);
                pending.extend(node.sibling);
            }
        }
        freed
    }

    /// Moves the trees of the list starting at `first` out of `from` and
    /// into this arena, returning the new key of the list head.
    ///
    /// Shapes, degrees and list order are kept; only keys change. Costs one
    /// removal and one insertion per moved node.
    ///
    /// # Panics
    ///
    /// Panics if the list links to a node that is not live in `from`.
    pub fn transplant(
        &mut self,
        from: &mut NodeArena<K>,
        first: Option<NodeKey>,
    ) -> Option<NodeKey> {
        self.transplant_list(from, first, None)
    }

    fn transplant_list(
        &mut self,
        from: &mut NodeArena<K>,
        first: Option<NodeKey>,
        parent: Option<NodeKey>,
    ) -> Option<NodeKey> {
        let mut head = None;
        let mut tail: Option<NodeKey> = None;
        let mut current = first;

        while let Some(old) = current {
            let Node {
                key,
                degree,
                child,
                sibling,
                ..
            } = from
                .nodes
                .remove(old)
                .expect("tree links to a node that was already freed");
            current = sibling;

            let new = self.nodes.insert(Node {
                key,
                degree,
                parent,
                child: None,
                sibling: None,
            });
            let children = self.transplant_list(from, child, Some(new));
            self.nodes[new].child = children;

            match tail {
                Some(tail) => self.nodes[tail].sibling = Some(new),
                None => head = Some(new),
            }
            tail = Some(new);
        }
        head
    }
}

impl<K> Index<NodeKey> for NodeArena<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, key: NodeKey) -> &Node<K> {
        &self.nodes[key]
    }
}

impl<K> IndexMut<NodeKey> for NodeArena<K> {
    #[inline]
    fn index_mut(&mut self, key: NodeKey) -> &mut Node<K> {
        &mut self.nodes[key]
    }
}
