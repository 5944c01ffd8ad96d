use std::{iter::FusedIterator, ops::Bound};

use compare::Compare;

use crate::node::{self, Node};

/// Iterate over entries in sort order, returned by `iter()` and
/// `range()` on [`Bst`](crate::Bst) and [`Llrb`](crate::Llrb).
///
/// Entries can be consumed from both ends. Since every node knows the
/// size of its sub-tree, the exact number of entries left is always
/// known.
pub struct Iter<'a, K, V> {
    front: Vec<&'a Node<K, V>>, // path to the next entry from the low end
    back: Vec<&'a Node<K, V>>,  // path to the next entry from the high end
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Node<K, V>>) -> Iter<'a, K, V> {
        let mut iter = Iter {
            front: vec![],
            back: vec![],
            remaining: node::size(root),
        };
        iter.push_left(root);
        iter.push_right(root);
        iter
    }

    pub(crate) fn range<Q, C>(
        root: Option<&'a Node<K, V>>,
        cmp: &C,
        low: Bound<&Q>,
        high: Bound<&Q>,
    ) -> Iter<'a, K, V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let below = match low {
            Bound::Included(q) => node::count_less(root, cmp, q, false),
            Bound::Excluded(q) => node::count_less(root, cmp, q, true),
            Bound::Unbounded => 0,
        };
        let upto = match high {
            Bound::Included(q) => node::count_less(root, cmp, q, true),
            Bound::Excluded(q) => node::count_less(root, cmp, q, false),
            Bound::Unbounded => node::size(root),
        };

        let mut front = vec![];
        let mut nref = root;
        while let Some(n) = nref {
            nref = if node::after_low(cmp, low, &n.key) {
                front.push(n);
                n.left_deref()
            } else {
                n.right_deref()
            };
        }

        let mut back = vec![];
        let mut nref = root;
        while let Some(n) = nref {
            nref = if node::before_high(cmp, high, &n.key) {
                back.push(n);
                n.right_deref()
            } else {
                n.left_deref()
            };
        }

        Iter {
            front,
            back,
            remaining: upto.saturating_sub(below),
        }
    }

    fn push_left(&mut self, mut nref: Option<&'a Node<K, V>>) {
        while let Some(n) = nref {
            self.front.push(n);
            nref = n.left_deref();
        }
    }

    fn push_right(&mut self, mut nref: Option<&'a Node<K, V>>) {
        while let Some(n) = nref {
            self.back.push(n);
            nref = n.right_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.front.pop()?;
        self.remaining -= 1;
        self.push_left(n.right_deref());
        Some((&n.key, &n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let n = self.back.pop()?;
        self.remaining -= 1;
        self.push_right(n.left_deref());
        Some((&n.key, &n.value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// Keys in sort order, refer to [`Iter`].
pub struct Keys<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

/// Values in sort order of their keys, refer to [`Iter`].
pub struct Values<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}
