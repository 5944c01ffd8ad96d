use std::{error, fmt};

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum Error<K> {
    /// Usage error, operation needs at least one entry in the index.
    Empty,
    /// Returned by create() API when key is already present.
    OverwriteKey,
    /// Fatal case, a red node has a red left child.
    ConsecutiveReds,
    /// Fatal case, a red link is leaning right.
    RightRed,
    /// Fatal case, root of the tree is colored red.
    RedRoot,
    /// Fatal case, a node of an unbalanced tree is colored red.
    RedNode,
    /// Fatal case, breaking the black-balance rule. The String
    /// component of this variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order.
    SortError(K, K),
    /// Fatal case, subtree count is stale, (recorded, actual).
    SizeMismatch(usize, usize),
}

impl<K> fmt::Display for Error<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Empty => write!(f, "index is empty"),
            Error::OverwriteKey => write!(f, "key already present"),
            Error::ConsecutiveReds => write!(f, "consecutive red links"),
            Error::RightRed => write!(f, "right leaning red link"),
            Error::RedRoot => write!(f, "root is red"),
            Error::RedNode => write!(f, "red node in unbalanced tree"),
            Error::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks {}", msg),
            Error::SortError(a, b) => write!(f, "sort error {:?} {:?}", a, b),
            Error::SizeMismatch(n, m) => write!(f, "size mismatch recorded:{} actual:{}", n, m),
        }
    }
}

impl<K> error::Error for Error<K> where K: fmt::Debug {}
