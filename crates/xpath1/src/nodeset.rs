use core::cmp::Ordering;
use core::fmt;
use std::sync::Mutex;

use crate::errors::Error;
use crate::model::XPathNode;

/// A set of nodes, deduplicated by node identity.
///
/// The backing list keeps insertion order; document order is computed on
/// demand through an AVL index built over the adapter's
/// `compare_document_order` and cached until the next insert. Building the
/// index is fallible because the comparator is: adapters without a common
/// root cannot order their nodes.
pub struct NodeSet<N: XPathNode> {
    items: Vec<N>,
    // Cached permutation of `items` in document order.
    order: Mutex<Option<Vec<usize>>>,
}

impl<N: XPathNode> NodeSet<N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            order: Mutex::new(None),
        }
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = N>) -> Self {
        let mut set = Self::new();
        for node in nodes {
            set.insert(node);
        }
        set
    }

    /// Add a node; duplicates are ignored. Invalidates the order cache.
    pub fn insert(&mut self, node: N) -> bool {
        if self.items.contains(&node) {
            return false;
        }
        self.items.push(node);
        *self.lock_order() = None;
        true
    }

    /// Union with another set.
    pub fn merge(&mut self, other: &Self) {
        for node in &other.items {
            self.insert(node.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.items.contains(node)
    }

    /// Iterate in backing (insertion) order.
    pub fn iter(&self) -> core::slice::Iter<'_, N> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[N] {
        &self.items
    }

    /// Materialize the set in document order.
    pub fn ordered(&self) -> Result<Vec<N>, Error> {
        let permutation = self.order_permutation()?;
        Ok(permutation.iter().map(|&i| self.items[i].clone()).collect())
    }

    /// First node in document order, if any.
    pub fn first(&self) -> Result<Option<N>, Error> {
        if self.items.is_empty() {
            return Ok(None);
        }
        let permutation = self.order_permutation()?;
        Ok(permutation.first().map(|&i| self.items[i].clone()))
    }

    fn order_permutation(&self) -> Result<Vec<usize>, Error> {
        let mut cache = self.lock_order();
        if let Some(permutation) = cache.as_ref() {
            return Ok(permutation.clone());
        }
        let index = OrderIndex::build(&self.items)?;
        let mut permutation = Vec::with_capacity(self.items.len());
        index.in_order(index.root, &mut permutation);
        *cache = Some(permutation.clone());
        Ok(permutation)
    }

    fn lock_order(&self) -> std::sync::MutexGuard<'_, Option<Vec<usize>>> {
        self.order.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<N: XPathNode> Default for NodeSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: XPathNode> Clone for NodeSet<N> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            order: Mutex::new(self.lock_order().clone()),
        }
    }
}

impl<N: XPathNode> fmt::Debug for NodeSet<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<N: XPathNode> FromIterator<N> for NodeSet<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self::from_nodes(iter)
    }
}

impl<'a, N: XPathNode> IntoIterator for &'a NodeSet<N> {
    type Item = &'a N;
    type IntoIter = core::slice::Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Arena-backed AVL tree over indices into the item list. Entries live in a
/// flat vector and reference children by index; there are no parent links.
struct OrderIndex {
    entries: Vec<Entry>,
    root: Option<usize>,
}

struct Entry {
    item: usize,
    left: Option<usize>,
    right: Option<usize>,
    height: i32,
}

impl OrderIndex {
    fn build<N: XPathNode>(items: &[N]) -> Result<Self, Error> {
        let mut index = Self {
            entries: Vec::with_capacity(items.len()),
            root: None,
        };
        for item in 0..items.len() {
            index.root = Some(index.insert(items, index.root, item)?);
        }
        Ok(index)
    }

    fn insert<N: XPathNode>(
        &mut self,
        items: &[N],
        at: Option<usize>,
        item: usize,
    ) -> Result<usize, Error> {
        let Some(entry) = at else {
            self.entries.push(Entry {
                item,
                left: None,
                right: None,
                height: 1,
            });
            return Ok(self.entries.len() - 1);
        };
        match items[item].compare_document_order(&items[self.entries[entry].item])? {
            Ordering::Less => {
                let left = self.insert(items, self.entries[entry].left, item)?;
                self.entries[entry].left = Some(left);
            }
            // Identity dedup happens before indexing, so Equal here means the
            // comparator is coarser than identity; keep a stable position.
            Ordering::Greater | Ordering::Equal => {
                let right = self.insert(items, self.entries[entry].right, item)?;
                self.entries[entry].right = Some(right);
            }
        }
        self.update_height(entry);
        Ok(self.rebalance(entry))
    }

    fn height(&self, at: Option<usize>) -> i32 {
        at.map_or(0, |e| self.entries[e].height)
    }

    fn update_height(&mut self, entry: usize) {
        let h = 1 + core::cmp::max(
            self.height(self.entries[entry].left),
            self.height(self.entries[entry].right),
        );
        self.entries[entry].height = h;
    }

    fn balance(&self, entry: usize) -> i32 {
        self.height(self.entries[entry].left) - self.height(self.entries[entry].right)
    }

    fn rebalance(&mut self, entry: usize) -> usize {
        let balance = self.balance(entry);
        if balance > 1 {
            if let Some(left) = self.entries[entry].left
                && self.balance(left) < 0
            {
                self.entries[entry].left = Some(self.rotate_left(left));
            }
            self.rotate_right(entry)
        } else if balance < -1 {
            if let Some(right) = self.entries[entry].right
                && self.balance(right) > 0
            {
                self.entries[entry].right = Some(self.rotate_right(right));
            }
            self.rotate_left(entry)
        } else {
            entry
        }
    }

    fn rotate_left(&mut self, entry: usize) -> usize {
        let Some(pivot) = self.entries[entry].right else {
            return entry;
        };
        self.entries[entry].right = self.entries[pivot].left;
        self.entries[pivot].left = Some(entry);
        self.update_height(entry);
        self.update_height(pivot);
        pivot
    }

    fn rotate_right(&mut self, entry: usize) -> usize {
        let Some(pivot) = self.entries[entry].left else {
            return entry;
        };
        self.entries[entry].left = self.entries[pivot].right;
        self.entries[pivot].right = Some(entry);
        self.update_height(entry);
        self.update_height(pivot);
        pivot
    }

    fn in_order(&self, at: Option<usize>, out: &mut Vec<usize>) {
        let Some(entry) = at else { return };
        self.in_order(self.entries[entry].left, out);
        out.push(self.entries[entry].item);
        self.in_order(self.entries[entry].right, out);
    }
}
