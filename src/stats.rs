use crate::depth::Depth;

/// Statistics on [`Bst`](crate::Bst) and [`Llrb`](crate::Llrb) trees.
/// Serves two purpose:
///
/// * To get partial but quick statistics via `stats()` method.
/// * To get full statisics via `validate()` method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    height: Option<usize>,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    pub(crate) fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            height: Default::default(),
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    pub(crate) fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    pub(crate) fn set_depths(&mut self, depths: Depth) {
        self.height = Some(depths.max());
        self.depths = Some(depths)
    }

    /// Return number of entries in the tree.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head. Although the node overhead
    /// is constant, the node size varies based on key and value types.
    /// EG:
    ///
    /// ```
    /// use llrb_symtab::Llrb;
    /// let llrb: Llrb<u64, u64> = Llrb::new("myinstance");
    ///
    /// // size of key: 8 bytes
    /// // size of value: 8 bytes
    /// // overhead is 32 bytes
    /// assert_eq!(llrb.stats().node_size(), 48);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of nodes on the longest root to leaf path. Only
    /// available from `validate()`.
    #[inline]
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    /// Return number of black nodes from root to leaf, on both left
    /// and right child. Only available from `Llrb::validate()`.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        self.depths.clone().filter(|d| d.samples() > 0)
    }
}
