use std::{
    cmp::Ordering,
    fmt, mem,
    ops::{Deref, DerefMut, RangeBounds},
};

use compare::{Compare, Natural};
use log::{debug, trace, warn};
use rand::Rng;

use crate::{
    depth::Depth,
    error::Error,
    iter::{Iter, Keys, Values},
    node::{self, is_black, is_red, is_red_left, Link, Node},
    stats::Stats,
};

/// Llrb manage a single instance of in-memory index using
/// [left-leaning-red-black][llrb] tree.
///
/// Tree height stays within `2 * log2(n + 1)`, hence every operation,
/// including removal, completes in logarithmic time.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
#[derive(Clone)]
pub struct Llrb<K, V, C = Natural<K>> {
    name: String,
    pub(crate) root: Link<K, V>,
    cmp: C,
}

/// Different ways to construct a new Llrb instance.
impl<K, V> Llrb<K, V>
where
    K: Ord,
{
    /// Create an empty instance of Llrb, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Llrb<K, V>
    where
        S: AsRef<str>,
    {
        Llrb::with_cmp(name, compare::natural())
    }

    /// Create an instance of Llrb holding a single entry.
    pub fn with_root<S>(name: S, key: K, value: V) -> Llrb<K, V>
    where
        S: AsRef<str>,
    {
        let mut llrb = Llrb::new(name);
        llrb.put(key, value);
        llrb
    }

    /// Create a new instance of Llrb tree and load it with entries
    /// from `iter`. Note that iterator should return (key, value) tuples,
    /// where key must be ``unique``.
    pub fn load_from<S, I>(name: S, iter: I) -> Result<Llrb<K, V>, Error<K>>
    where
        S: AsRef<str>,
        I: Iterator<Item = (K, V)>,
    {
        let mut llrb = Llrb::new(name);
        for (key, value) in iter {
            llrb.create(key, value)?;
        }
        debug!("{}: loaded {} entries", llrb.name, llrb.len());
        Ok(llrb)
    }
}

impl<K, V, C> Llrb<K, V, C>
where
    C: Compare<K>,
{
    /// Create an empty instance of Llrb, identified by `name`, ordering
    /// keys using the three-way comparator `cmp`.
    pub fn with_cmp<S>(name: S, cmp: C) -> Llrb<K, V, C>
    where
        S: AsRef<str>,
    {
        Llrb {
            name: name.as_ref().to_string(),
            root: None,
            cmp,
        }
    }
}

/// Maintenance API.
impl<K, V, C> Llrb<K, V, C>
where
    C: Compare<K>,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Llrb instances.
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

/// Write operations on Llrb instance.
impl<K, V, C> Llrb<K, V, C>
where
    C: Compare<K>,
{
    /// Create a new {key, value} entry in the index. If key is already
    /// present return error and leave the index untouched.
    pub fn create(&mut self, key: K, value: V) -> Result<(), Error<K>> {
        let (mut root, error) = Self::insert(self.root.take(), &self.cmp, key, value);
        root.set_black();
        self.root = Some(root);
        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let (mut root, old_value) = Self::upsert(self.root.take(), &self.cmp, key, value);
        root.set_black();
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
        // descending on a missing key would reshape the tree for nothing.
        let root = self.root.as_ref().map(Deref::deref);
        node::get(root, &self.cmp, key)?;

        let root = self.prepare_root()?;
        let (root, old_value) = Self::do_delete(root, &self.cmp, key);
        self.finish_root(root);
        trace!("{}: removed entry, {} left", self.name, self.len());
        old_value
    }

    /// Delete the entry with the smallest key and return it. Fails with
    /// [`Error::Empty`] on an empty index.
    pub fn remove_min(&mut self) -> Result<(K, V), Error<K>> {
        let root = self.prepare_root().ok_or(Error::Empty)?;
        let (root, min) = Self::delete_min(root);
        self.finish_root(root);
        let Node { key, value, .. } = *min;
        Ok((key, value))
    }

    /// Delete the entry with the largest key and return it. Fails with
    /// [`Error::Empty`] on an empty index.
    pub fn remove_max(&mut self) -> Result<(K, V), Error<K>> {
        let root = self.prepare_root().ok_or(Error::Empty)?;
        let (root, max) = Self::delete_max(root);
        self.finish_root(root);
        let Node { key, value, .. } = *max;
        Ok((key, value))
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * Root is black.
    /// * No red link leans right.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Every node counts the entries in its sub-tree.
    /// * Make sure keys are in sorted order.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<K>>
    where
        K: Clone + fmt::Debug,
    {
        let root = self.root.as_ref().map(Deref::deref);
        let mut depths = Depth::new();
        let res = if is_red(root) {
            Err(Error::RedRoot)
        } else {
            Self::validate_tree(root, false, 0, 0, &mut depths)
        };
        let res = res.and_then(|blacks| {
            node::validate_order(self.iter(), &self.cmp)?;
            Ok(blacks)
        });
        let blacks = match res {
            Ok(blacks) => blacks,
            Err(err) => {
                warn!("{}: validate failed, {}", self.name, err);
                return Err(err);
            }
        };

        let mut stats = self.stats();
        stats.set_blacks(blacks);
        stats.set_depths(depths);
        Ok(stats)
    }

    // Take the root for a top-down delete, when both children are black
    // the root is made red so that there is a red link to borrow from.
    fn prepare_root(&mut self) -> Option<Box<Node<K, V>>> {
        let mut root = self.root.take()?;
        if is_black(root.left_deref()) && is_black(root.right_deref()) {
            root.set_red();
        }
        Some(root)
    }

    fn finish_root(&mut self, root: Link<K, V>) {
        self.root = root.map(|mut root| {
            root.set_black();
            root
        });
    }
}

/// Read operations on Llrb instance.
impl<K, V, C> Llrb<K, V, C>
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

impl<K, V, C> Llrb<K, V, C>
where
    C: Compare<K>,
{
    fn insert(node: Link<K, V>, cmp: &C, key: K, value: V) -> Insert<K, V> {
        let mut node = match node {
            None => return (Node::new(key, value, false /*red*/), None),
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
        (Self::walkuprot_23(node), err)
    }

    fn upsert(node: Link<K, V>, cmp: &C, key: K, value: V) -> Upsert<K, V> {
        let mut node = match node {
            None => return (Node::new(key, value, false /*red*/), None),
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
        (Self::walkuprot_23(node), old_value)
    }

    // caller shall make sure that key is present in this sub-tree.
    fn do_delete<Q>(mut node: Box<Node<K, V>>, cmp: &C, key: &Q) -> Delete<K, V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        if cmp.compare(key, &node.key) == Ordering::Less {
            if is_black(node.left_deref()) && !is_red_left(node.left_deref()) {
                node = Self::move_red_left(node);
            }
            let (left, old_value) = match node.left.take() {
                Some(left) => Self::do_delete(left, cmp, key),
                None => (None, None),
            };
            node.left = left;
            return (Some(Self::fixup(node)), old_value);
        }

        if is_red(node.left_deref()) {
            node = Self::rotate_right(node);
        }
        if cmp.compare(key, &node.key) == Ordering::Equal && node.right.is_none() {
            let Node { left, value, .. } = *node;
            return (left, Some(value));
        }
        let ok = node.right.is_some() && is_black(node.right_deref());
        if ok && !is_red_left(node.right_deref()) {
            node = Self::move_red_right(node);
        }

        let old_value = match (cmp.compare(key, &node.key), node.right.take()) {
            (Ordering::Equal, Some(right)) => {
                let (right, next) = Self::delete_min(right);
                node.right = right;
                let Node {
                    key: next_key,
                    value: next_value,
                    ..
                } = *next;
                node.key = next_key;
                Some(mem::replace(&mut node.value, next_value))
            }
            (_, Some(right)) => {
                let (right, old_value) = Self::do_delete(right, cmp, key);
                node.right = right;
                old_value
            }
            (_, None) => None,
        };
        (Some(Self::fixup(node)), old_value)
    }

    fn delete_min(mut node: Box<Node<K, V>>) -> Delmin<K, V> {
        if node.left.is_none() {
            return (node.right.take(), node);
        }
        if is_black(node.left_deref()) && !is_red_left(node.left_deref()) {
            node = Self::move_red_left(node);
        }
        match node.left.take() {
            Some(left) => {
                let (left, min) = Self::delete_min(left);
                node.left = left;
                (Some(Self::fixup(node)), min)
            }
            None => panic!("delete_min(): lost left child, call the programmer"),
        }
    }

    fn delete_max(mut node: Box<Node<K, V>>) -> Delmin<K, V> {
        if is_red(node.left_deref()) {
            node = Self::rotate_right(node);
        }
        if node.right.is_none() {
            return (node.left.take(), node);
        }
        if is_black(node.right_deref()) && !is_red_left(node.right_deref()) {
            node = Self::move_red_right(node);
        }
        match node.right.take() {
            Some(right) => {
                let (right, max) = Self::delete_max(right);
                node.right = right;
                (Some(Self::fixup(node)), max)
            }
            None => panic!("delete_max(): lost right child, call the programmer"),
        }
    }

    fn validate_tree(
        node: Option<&Node<K, V>>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        depths: &mut Depth,
    ) -> Result<usize, Error<K>> {
        let node = match node {
            None => {
                depths.sample(depth);
                return Ok(nb);
            }
            Some(node) => node,
        };

        let red = !node.is_black();
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if is_red(node.right_deref()) {
            return Err(Error::RightRed);
        }
        if !red {
            nb += 1;
        }
        let (left, right) = (node.left_deref(), node.right_deref());
        let lblacks = Self::validate_tree(left, red, nb, depth + 1, depths)?;
        let rblacks = Self::validate_tree(right, red, nb, depth + 1, depths)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }
        let actual = 1 + node::size(left) + node::size(right);
        if node.size != actual {
            return Err(Error::SizeMismatch(node.size, actual));
        }
        Ok(lblacks)
    }

    //--------- rotation routines for 2-3 algorithm ----------------

    // Restore invariants after an insert in one of node's sub-trees,
    // the order of the three steps matters.
    fn walkuprot_23(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        if is_red(node.right_deref()) && !is_red(node.left_deref()) {
            node = Self::rotate_left(node);
        }
        if is_red(node.left_deref()) && is_red_left(node.left_deref()) {
            node = Self::rotate_right(node);
        }
        if is_red(node.left_deref()) && is_red(node.right_deref()) {
            Self::flip_colors(node.deref_mut())
        }
        node.update_size();
        node
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    (r)                 (r)  \
    //            /       \                 /     \
    //          left       x             node      xr
    //                    / \            /  \
    //                  xl   xr       left   xl
    //
    pub(crate) fn rotate_left(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut x = match node.right.take() {
            Some(x) if !x.is_black() => x,
            _ => panic!("rotate_left(): rotating a black link ? Call the programmer"),
        };
        node.right = x.left.take();
        x.black = node.black;
        node.set_red();
        node.update_size();
        x.left = Some(node);
        x.update_size();
        x
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //            (r)   \                   (r)  \
    //           /       \                 /      \
    //          x       right             xl      node
    //         / \                                / \
    //       xl   xr                             xr  right
    //
    pub(crate) fn rotate_right(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut x = match node.left.take() {
            Some(x) if !x.is_black() => x,
            _ => panic!("rotate_right(): rotating a black link ? Call the programmer"),
        };
        node.left = x.right.take();
        x.black = node.black;
        node.set_red();
        node.update_size();
        x.right = Some(node);
        x.update_size();
        x
    }

    // Split a temporary 4-node, passing the red link up to the parent.
    //
    //        (b)                    (r)
    //         |                      |
    //        node                   node
    //        / \                    / \
    //      (r) (r)                (b) (b)
    //     /      \               /      \
    //   left    right          left    right
    //
    pub(crate) fn flip_colors(node: &mut Node<K, V>) {
        let ok = node.is_black() && is_red(node.left_deref()) && is_red(node.right_deref());
        if !ok {
            panic!("flip_colors(): not a black node with red children ? Call the programmer");
        }
        Self::flip(node)
    }

    //        (x)                   (!x)
    //         |                     |
    //        node                  node
    //        / \                   / \
    //      (y) (z)              (!y) (!z)
    //     /      \              /      \
    //   left    right         left    right
    //
    fn flip(node: &mut Node<K, V>) {
        if let Some(left) = node.left.as_mut() {
            left.toggle_link();
        }
        if let Some(right) = node.right.as_mut() {
            right.toggle_link();
        }
        node.toggle_link();
    }

    fn fixup(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        if is_red(node.right_deref()) {
            node = Self::rotate_left(node);
        }
        if is_red(node.left_deref()) && is_red_left(node.left_deref()) {
            node = Self::rotate_right(node);
        }
        if is_red(node.left_deref()) && is_red(node.right_deref()) {
            Self::flip(node.deref_mut());
        }
        node.update_size();
        node
    }

    fn move_red_left(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        Self::flip(node.deref_mut());
        if is_red_left(node.right_deref()) {
            if let Some(right) = node.right.take() {
                node.right = Some(Self::rotate_right(right));
            }
            node = Self::rotate_left(node);
            Self::flip(node.deref_mut());
        }
        node
    }

    fn move_red_right(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        Self::flip(node.deref_mut());
        if is_red_left(node.left_deref()) {
            node = Self::rotate_right(node);
            Self::flip(node.deref_mut());
        }
        node
    }
}

impl<K, V, C> Drop for Llrb<K, V, C> {
    fn drop(&mut self) {
        node::drop_tree(self.root.take())
    }
}

impl<K, V, C> fmt::Debug for Llrb<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Compare<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a Llrb<K, V, C>
where
    C: Compare<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
