use std::{
    cmp::Ordering,
    fmt, mem,
    ops::{Deref, RangeBounds},
};

use compare::{Compare, Natural};
use log::{debug, trace, warn};
use rand::Rng;

use crate::{
    depth::Depth,
    error::Error,
    iter::{Iter, Keys, Values},
    node::{self, Link, Node},
    stats::Stats,
};

/// Bst manage a single instance of in-memory index using a plain,
/// unbalanced [binary search tree][bst].
///
/// Every operation costs time proportional to the height of the tree.
/// Entries arriving in sort order degenerate the tree into a chain of
/// `n` nodes. Removal uses [Hibbard deletion][hibbard], always pulling
/// the successor from the right sub-tree, so a long run of removals
/// skews the tree towards an expected depth of `sqrt(n)`. Deletion heavy
/// workloads are better served by [`Llrb`](crate::Llrb).
///
/// [bst]: https://en.wikipedia.org/wiki/Binary_search_tree
/// [hibbard]: https://en.wikipedia.org/wiki/Binary_search_tree#Deletion
#[derive(Clone)]
pub struct Bst<K, V, C = Natural<K>> {
    name: String,
    pub(crate) root: Link<K, V>,
    cmp: C,
}

/// Different ways to construct a new Bst instance.
impl<K, V> Bst<K, V>
where
    K: Ord,
{
    /// Create an empty instance of Bst, identified by `name`, ordering
    /// keys by their natural order.
    pub fn new<S>(name: S) -> Bst<K, V>
    where
        S: AsRef<str>,
    {
        Bst::with_cmp(name, compare::natural())
    }

    /// Create an instance of Bst holding a single entry.
    pub fn with_root<S>(name: S, key: K, value: V) -> Bst<K, V>
    where
        S: AsRef<str>,
    {
        let mut bst = Bst::new(name);
        bst.put(key, value);
        bst
    }

    /// Create a new instance of Bst and load it with entries from
    /// `iter`. Note that iterator should return (key, value) tuples,
    /// where key must be ``unique``.
    pub fn load_from<S, I>(name: S, iter: I) -> Result<Bst<K, V>, Error<K>>
    where
        S: AsRef<str>,
        I: Iterator<Item = (K, V)>,
    {
        let mut bst = Bst::new(name);
        for (key, value) in iter {
            bst.create(key, value)?;
        }
        debug!("{}: loaded {} entries", bst.name, bst.len());
        Ok(bst)
    }
}

impl<K, V, C> Bst<K, V, C>
where
    C: Compare<K>,
{
    /// Create an empty instance of Bst, identified by `name`, ordering
    /// keys using the three-way comparator `cmp`.
    pub fn with_cmp<S>(name: S, cmp: C) -> Bst<K, V, C>
    where
        S: AsRef<str>,
    {
        Bst {
            name: name.as_ref().to_string(),
            root: None,
            cmp,
        }
    }
}

/// Maintenance API.
impl<K, V, C> Bst<K, V, C>
where
    C: Compare<K>,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Bst instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return the comparator ordering this instance.
    #[inline]
    pub fn cmp(&self) -> &C {
        &self.cmp
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        node::size(self.root.as_ref().map(Deref::deref))
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Return the number of nodes on the longest path from root to leaf.
    pub fn height(&self) -> usize {
        node::height(self.root.as_ref().map(Deref::deref))
    }

    /// Return quickly with basic statisics, only entries() method is valid
    /// with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.len(), mem::size_of::<Node<K, V>>())
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        debug!("{}: clear {} entries", self.name, self.len());
        node::drop_tree(self.root.take());
    }
}

type Insert<K, V> = (Box<Node<K, V>>, Option<Error<K>>);

type Upsert<K, V> = (Box<Node<K, V>>, Option<V>);

type Delete<K, V> = (Link<K, V>, Option<V>);

type Delmin<K, V> = (Link<K, V>, Box<Node<K, V>>);

/// Write operations on Bst instance.
impl<K, V, C> Bst<K, V, C>
where
    C: Compare<K>,
{
    /// Create a new {key, value} entry in the index. If key is already
    /// present return error and leave the index untouched.
    pub fn create(&mut self, key: K, value: V) -> Result<(), Error<K>> {
        let (root, error) = Self::insert(self.root.take(), &self.cmp, key, value);
        self.root = Some(root);
        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let (root, old_value) = Self::upsert(self.root.take(), &self.cmp, key, value);
        self.root = Some(root);
        old_value
    }

    /// Delete key from this instance and return its value. If key is
    /// not present, then delete is effectively a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let (root, old_value) = Self::do_delete(self.root.take(), &self.cmp, key);
        self.root = root;
        if old_value.is_some() {
            trace!("{}: removed entry, {} left", self.name, self.len());
        }
        old_value
    }

    /// Delete the entry with the smallest key and return it. Fails with
    /// [`Error::Empty`] on an empty index.
    pub fn remove_min(&mut self) -> Result<(K, V), Error<K>> {
        let root = self.root.take().ok_or(Error::Empty)?;
        let (root, min) = Self::delete_min(root);
        self.root = root;
        let Node { key, value, .. } = *min;
        Ok((key, value))
    }

    /// Delete the entry with the largest key and return it. Fails with
    /// [`Error::Empty`] on an empty index.
    pub fn remove_max(&mut self) -> Result<(K, V), Error<K>> {
        let root = self.root.take().ok_or(Error::Empty)?;
        let (root, max) = Self::delete_max(root);
        self.root = root;
        let Node { key, value, .. } = *max;
        Ok((key, value))
    }

    /// Validate BST tree with following rules:
    ///
    /// * Keys are in strictly increasing order.
    /// * Every node counts the entries in its sub-tree.
    /// * Every node is black.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<K>>
    where
        K: Clone + fmt::Debug,
    {
        let root = self.root.as_ref().map(Deref::deref);
        let mut depths = Depth::new();
        let res = Self::validate_tree(root, &mut depths)
            .and_then(|_| node::validate_order(self.iter(), &self.cmp));
        if let Err(err) = &res {
            warn!("{}: validate failed, {}", self.name, err);
        }
        res?;

        let mut stats = self.stats();
        stats.set_depths(depths);
        Ok(stats)
    }
}

/// Read operations on Bst instance.
impl<K, V, C> Bst<K, V, C>
where
    C: Compare<K>,
{
    /// Get the value for key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let root = self.root.as_ref().map(Deref::deref);
        node::get(root, &self.cmp, key).map(|n| &n.value)
    }

    /// Get a mutable reference to the value for key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        node::get_mut(&mut self.root, &self.cmp, key)
    }

    /// Check whether key is present in this index.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.get(key).is_some()
    }

    /// Return the largest key less than or equal to `key`.
    pub fn floor<Q>(&self, key: &Q) -> Option<&K>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let root = self.root.as_ref().map(Deref::deref);
        node::floor(root, &self.cmp, key).map(|n| &n.key)
    }

    /// Return the smallest key greater than or equal to `key`.
    pub fn ceiling<Q>(&self, key: &Q) -> Option<&K>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let root = self.root.as_ref().map(Deref::deref);
        node::ceiling(root, &self.cmp, key).map(|n| &n.key)
    }

    /// Return the number of keys strictly less than `key`. `key` need
    /// not be present in the index.
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let root = self.root.as_ref().map(Deref::deref);
        node::count_less(root, &self.cmp, key, false)
    }

    /// Return the entry whose key has `rank` keys less than it.
    pub fn select(&self, rank: usize) -> Option<(&K, &V)> {
        let root = self.root.as_ref().map(Deref::deref);
        node::select(root, rank).map(|n| (&n.key, &n.value))
    }

    /// Return the entry with the smallest key.
    pub fn min(&self) -> Option<(&K, &V)> {
        node::min(self.root.as_ref().map(Deref::deref)).map(|n| (&n.key, &n.value))
    }

    /// Return the entry with the largest key.
    pub fn max(&self) -> Option<(&K, &V)> {
        node::max(self.root.as_ref().map(Deref::deref)).map(|n| (&n.key, &n.value))
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(&K, &V)> {
        let root = self.root.as_ref().map(Deref::deref);
        node::random(root, rng).map(|n| (&n.key, &n.value))
    }

    /// Return an iterator over all entries in this instance.
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(self.root.as_ref().map(Deref::deref))
    }

    /// Return an iterator over all keys in this instance.
    pub fn keys(&self) -> Keys<K, V> {
        Keys(self.iter())
    }

    /// Return an iterator over all values in this instance.
    pub fn values(&self) -> Values<K, V> {
        Values(self.iter())
    }

    /// Range over all entries from low to high. Use `rev()` on the
    /// returned iterator to range from high to low.
    pub fn range<Q, R>(&self, range: R) -> Iter<K, V>
    where
        Q: ?Sized,
        R: RangeBounds<Q>,
        C: Compare<Q, K>,
    {
        let root = self.root.as_ref().map(Deref::deref);
        Iter::range(root, &self.cmp, range.start_bound(), range.end_bound())
    }
}

impl<K, V, C> Bst<K, V, C>
where
    C: Compare<K>,
{
    fn insert(node: Link<K, V>, cmp: &C, key: K, value: V) -> Insert<K, V> {
        let mut node = match node {
            None => return (Node::new(key, value, true /*black*/), None),
            Some(node) => node,
        };

        let err = match cmp.compare(&key, &node.key) {
            Ordering::Less => {
                let (left, e) = Self::insert(node.left.take(), cmp, key, value);
                node.left = Some(left);
                e
            }
            Ordering::Greater => {
                let (right, e) = Self::insert(node.right.take(), cmp, key, value);
                node.right = Some(right);
                e
            }
            Ordering::Equal => Some(Error::OverwriteKey),
        };
        node.update_size();
        (node, err)
    }

    fn upsert(node: Link<K, V>, cmp: &C, key: K, value: V) -> Upsert<K, V> {
        let mut node = match node {
            None => return (Node::new(key, value, true /*black*/), None),
            Some(node) => node,
        };

        let old_value = match cmp.compare(&key, &node.key) {
            Ordering::Less => {
                let (left, o) = Self::upsert(node.left.take(), cmp, key, value);
                node.left = Some(left);
                o
            }
            Ordering::Greater => {
                let (right, o) = Self::upsert(node.right.take(), cmp, key, value);
                node.right = Some(right);
                o
            }
            Ordering::Equal => Some(mem::replace(&mut node.value, value)),
        };
        node.update_size();
        (node, old_value)
    }

    // Hibbard deletion.
    fn do_delete<Q>(node: Link<K, V>, cmp: &C, key: &Q) -> Delete<K, V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let mut node = match node {
            None => return (None, None),
            Some(node) => node,
        };

        let old_value = match cmp.compare(key, &node.key) {
            Ordering::Less => {
                let (left, old_value) = Self::do_delete(node.left.take(), cmp, key);
                node.left = left;
                old_value
            }
            Ordering::Greater => {
                let (right, old_value) = Self::do_delete(node.right.take(), cmp, key);
                node.right = right;
                old_value
            }
            Ordering::Equal => {
                let left = node.left.take();
                let Node { value, right, .. } = *node;
                match right {
                    None => return (left, Some(value)),
                    Some(right) => {
                        let (right, mut next) = Self::delete_min(right);
                        next.left = left;
                        next.right = right;
                        next.update_size();
                        return (Some(next), Some(value));
                    }
                }
            }
        };
        node.update_size();
        (Some(node), old_value)
    }

    fn delete_min(mut node: Box<Node<K, V>>) -> Delmin<K, V> {
        match node.left.take() {
            None => (node.right.take(), node),
            Some(left) => {
                let (left, min) = Self::delete_min(left);
                node.left = left;
                node.update_size();
                (Some(node), min)
            }
        }
    }

    fn delete_max(mut node: Box<Node<K, V>>) -> Delmin<K, V> {
        match node.right.take() {
            None => (node.left.take(), node),
            Some(right) => {
                let (right, max) = Self::delete_max(right);
                node.right = right;
                node.update_size();
                (Some(node), max)
            }
        }
    }

    // Walks the tree with an explicit stack, a degenerate Bst is as deep
    // as it is long.
    fn validate_tree(root: Option<&Node<K, V>>, depths: &mut Depth) -> Result<(), Error<K>> {
        let mut stack = vec![(root, 0)];
        while let Some((node, depth)) = stack.pop() {
            let node = match node {
                None => {
                    depths.sample(depth);
                    continue;
                }
                Some(node) => node,
            };

            if !node.is_black() {
                return Err(Error::RedNode);
            }
            let (left, right) = (node.left_deref(), node.right_deref());
            let actual = 1 + node::size(left) + node::size(right);
            if node.size != actual {
                return Err(Error::SizeMismatch(node.size, actual));
            }
            stack.push((right, depth + 1));
            stack.push((left, depth + 1));
        }
        Ok(())
    }
}

impl<K, V, C> Drop for Bst<K, V, C> {
    fn drop(&mut self) {
        node::drop_tree(self.root.take())
    }
}

impl<K, V, C> fmt::Debug for Bst<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Compare<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a Bst<K, V, C>
where
    C: Compare<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
