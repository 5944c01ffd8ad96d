//! Ordered symbol table, mapping unique keys to values, in two flavours:
//!
//! * [`Bst`], a plain binary search tree with no balance guarantee.
//! * [`Llrb`], a [left-leaning-red-black][llrb] tree, height stays
//!   logarithmic for any sequence of operations.
//!
//! Both share the same node shape and the same read API: `get`, `floor`,
//! `ceiling`, `rank`, `select`, ordered iteration and ranges. Keys are
//! ordered by a three-way comparator implementing [`compare::Compare`],
//! defaulting to their natural order.
//!
//! [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree

mod bst;
mod depth;
mod error;
mod iter;
mod llrb;
mod node;
mod stats;

pub use crate::bst::Bst;
pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::iter::{Iter, Keys, Values};
pub use crate::llrb::Llrb;
pub use crate::stats::Stats;

#[cfg(test)]
mod llrb_test;
