#[doc(inline)]
pub use bst::{self, *};
#[doc(inline)]
pub use rb_tree::{self, *};
