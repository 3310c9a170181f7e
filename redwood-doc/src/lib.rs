//! An ordered multiset engine: a naive binary search tree, an
//! in-place rotation primitive, red-black insertion repair, and a
//! bounded ascending iterator.

#[doc(inline)]
pub use tree::{self, *};
