use std::{
    cmp::Ordering,
    ops::{Bound, Deref},
};

use compare::Compare;
use rand::Rng;

use crate::{error::Error, iter::Iter};

pub(crate) type Link<K, V> = Option<Box<Node<K, V>>>;

/// Node corresponds to a single entry in [`Bst`](crate::Bst) and
/// [`Llrb`](crate::Llrb) instances. Both trees share this shape, the
/// color bit is only interpreted by `Llrb`, `Bst` nodes stay black.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) size: usize,   // store: entries in this sub-tree
    pub(crate) black: bool,   // store: black or red
    pub(crate) left: Link<K, V>,  // store: left child
    pub(crate) right: Link<K, V>, // store: right child
}

// Primary operations on a single node.
impl<K, V> Node<K, V> {
    // CREATE operation
    pub(crate) fn new(key: K, value: V, black: bool) -> Box<Node<K, V>> {
        Box::new(Node {
            key,
            value,
            size: 1,
            black,
            left: None,
            right: None,
        })
    }

    #[inline]
    pub(crate) fn left_deref(&self) -> Option<&Node<K, V>> {
        self.left.as_ref().map(Deref::deref)
    }

    #[inline]
    pub(crate) fn right_deref(&self) -> Option<&Node<K, V>> {
        self.right.as_ref().map(Deref::deref)
    }

    #[inline]
    pub(crate) fn update_size(&mut self) {
        self.size = 1 + size(self.left_deref()) + size(self.right_deref());
    }

    #[inline]
    pub(crate) fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    pub(crate) fn set_black(&mut self) {
        self.black = true
    }

    #[inline]
    pub(crate) fn toggle_link(&mut self) {
        self.black = !self.black
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.black
    }
}

#[inline]
pub(crate) fn size<K, V>(node: Option<&Node<K, V>>) -> usize {
    node.map_or(0, |node| node.size)
}

#[inline]
pub(crate) fn is_red<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.map_or(false, |node| !node.is_black())
}

#[inline]
pub(crate) fn is_black<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.map_or(true, |node| node.is_black())
}

/// Whether the left child of `node` is red.
#[inline]
pub(crate) fn is_red_left<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.map_or(false, |node| is_red(node.left_deref()))
}

pub(crate) fn get<'a, K, V, Q, C>(
    mut node: Option<&'a Node<K, V>>,
    cmp: &C,
    key: &Q,
) -> Option<&'a Node<K, V>>
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    while let Some(nref) = node {
        node = match cmp.compare(key, &nref.key) {
            Ordering::Less => nref.left_deref(),
            Ordering::Greater => nref.right_deref(),
            Ordering::Equal => return Some(nref),
        };
    }
    None
}

pub(crate) fn get_mut<'a, K, V, Q, C>(link: &'a mut Link<K, V>, cmp: &C, key: &Q) -> Option<&'a mut V>
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    let mut node = link.as_deref_mut();
    while let Some(nref) = node {
        node = match cmp.compare(key, &nref.key) {
            Ordering::Less => nref.left.as_deref_mut(),
            Ordering::Greater => nref.right.as_deref_mut(),
            Ordering::Equal => return Some(&mut nref.value),
        };
    }
    None
}

/// Largest entry whose key is less than or equal to `key`.
pub(crate) fn floor<'a, K, V, Q, C>(
    mut node: Option<&'a Node<K, V>>,
    cmp: &C,
    key: &Q,
) -> Option<&'a Node<K, V>>
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    let mut best = None;
    while let Some(nref) = node {
        node = match cmp.compare(key, &nref.key) {
            Ordering::Equal => return Some(nref),
            Ordering::Less => nref.left_deref(),
            Ordering::Greater => {
                best = Some(nref);
                nref.right_deref()
            }
        };
    }
    best
}

/// Smallest entry whose key is greater than or equal to `key`.
pub(crate) fn ceiling<'a, K, V, Q, C>(
    mut node: Option<&'a Node<K, V>>,
    cmp: &C,
    key: &Q,
) -> Option<&'a Node<K, V>>
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    let mut best = None;
    while let Some(nref) = node {
        node = match cmp.compare(key, &nref.key) {
            Ordering::Equal => return Some(nref),
            Ordering::Greater => nref.right_deref(),
            Ordering::Less => {
                best = Some(nref);
                nref.left_deref()
            }
        };
    }
    best
}

/// Count entries whose key is less than `key`, or less than or equal
/// to `key` when `inclusive`.
pub(crate) fn count_less<K, V, Q, C>(
    mut node: Option<&Node<K, V>>,
    cmp: &C,
    key: &Q,
    inclusive: bool,
) -> usize
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    let mut count = 0;
    while let Some(nref) = node {
        node = match cmp.compare(key, &nref.key) {
            Ordering::Less => nref.left_deref(),
            Ordering::Greater => {
                count += 1 + size(nref.left_deref());
                nref.right_deref()
            }
            Ordering::Equal if inclusive => return count + 1 + size(nref.left_deref()),
            Ordering::Equal => return count + size(nref.left_deref()),
        };
    }
    count
}

/// Entry at position `rank` in sort order, counting from zero.
pub(crate) fn select<K, V>(mut node: Option<&Node<K, V>>, mut rank: usize) -> Option<&Node<K, V>> {
    while let Some(nref) = node {
        let left = size(nref.left_deref());
        node = match rank.cmp(&left) {
            Ordering::Less => nref.left_deref(),
            Ordering::Greater => {
                rank -= left + 1;
                nref.right_deref()
            }
            Ordering::Equal => return Some(nref),
        };
    }
    None
}

pub(crate) fn min<K, V>(node: Option<&Node<K, V>>) -> Option<&Node<K, V>> {
    let mut nref = node?;
    while let Some(left) = nref.left_deref() {
        nref = left;
    }
    Some(nref)
}

pub(crate) fn max<K, V>(node: Option<&Node<K, V>>) -> Option<&Node<K, V>> {
    let mut nref = node?;
    while let Some(right) = nref.right_deref() {
        nref = right;
    }
    Some(nref)
}

/// Number of nodes on the longest path from `node` down to a leaf.
pub(crate) fn height<K, V>(node: Option<&Node<K, V>>) -> usize {
    let mut stack: Vec<(&Node<K, V>, usize)> = node.into_iter().map(|n| (n, 1)).collect();
    let mut height = 0;
    while let Some((nref, depth)) = stack.pop() {
        height = height.max(depth);
        stack.extend(nref.left_deref().map(|n| (n, depth + 1)));
        stack.extend(nref.right_deref().map(|n| (n, depth + 1)));
    }
    height
}

/// Pick an entry uniformly at random.
pub(crate) fn random<'a, K, V, R>(node: Option<&'a Node<K, V>>, rng: &mut R) -> Option<&'a Node<K, V>>
where
    R: Rng,
{
    match size(node) {
        0 => None,
        n => select(node, rng.gen_range(0, n)),
    }
}

// key satisfies the lower bound of a range.
pub(crate) fn after_low<K, Q, C>(cmp: &C, low: Bound<&Q>, key: &K) -> bool
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    match low {
        Bound::Included(q) => cmp.compare(q, key) != Ordering::Greater,
        Bound::Excluded(q) => cmp.compare(q, key) == Ordering::Less,
        Bound::Unbounded => true,
    }
}

// key satisfies the upper bound of a range.
pub(crate) fn before_high<K, Q, C>(cmp: &C, high: Bound<&Q>, key: &K) -> bool
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    match high {
        Bound::Included(q) => cmp.compare(q, key) != Ordering::Less,
        Bound::Excluded(q) => cmp.compare(q, key) == Ordering::Greater,
        Bound::Unbounded => true,
    }
}

/// Walk entries in iteration order and make sure every key is
/// strictly greater than its predecessor.
pub(crate) fn validate_order<'a, K, V, C>(iter: Iter<'a, K, V>, cmp: &C) -> Result<(), Error<K>>
where
    K: 'a + Clone,
    V: 'a,
    C: Compare<K>,
{
    let mut prev: Option<&K> = None;
    for (key, _) in iter {
        if let Some(prev) = prev {
            if cmp.compare(prev, key) != Ordering::Less {
                return Err(Error::SortError(prev.clone(), key.clone()));
            }
        }
        prev = Some(key);
    }
    Ok(())
}

/// Tear down a tree without recursing, a degenerate `Bst` can be as
/// deep as it is long.
pub(crate) fn drop_tree<K, V>(root: Link<K, V>) {
    let mut stack: Vec<Box<Node<K, V>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}
