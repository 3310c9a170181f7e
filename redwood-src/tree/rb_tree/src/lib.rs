use std::fmt;

use bst::Bst;

/// A red-black tree: a `Bst` that repairs itself after every insertion
/// so that no root-to-leaf path is more than twice as long as another.
///
/// The container also carries the bounds used by `iter`: once set, a
/// minimum or maximum applies to every iterator created afterwards
/// until it is replaced or cleared.
pub struct RbTree<T> {
    tree: Bst<T>,
    min: Option<T>,
    max: Option<T>,
}

impl<T: Ord> RbTree<T> {
    pub fn new() -> Self { Self { tree: Bst::new(), min: None, max: None } }

    pub fn is_empty(&self) -> bool { self.tree.is_empty() }
    pub fn len(&self) -> usize { self.tree.len() }
    pub fn height(&self) -> usize { self.tree.height() }
    pub fn clear(&mut self) { self.tree.clear() }
    pub fn contains(&self, data: &T) -> bool { self.tree.contains(data) }

    pub fn insert(&mut self, data: T) {
        let v = self.tree.insert(data);
        if self.tree.parent(v).is_none() {
            // sole node of a previously empty tree; the root stays black
            return;
        }
        self.tree.flip_color(v);
        self.ensure_red_property(v);
    }

    /// Repairs a red-red violation at `n`, a red node whose parent may
    /// also be red, and any violation the repair pushes further up.
    fn ensure_red_property(&mut self, n: usize) {
        let father = match self.tree.parent(n) {
            Some(f) if self.tree.is_red(f) => f,
            _ => return,
        };
        // a red node is never the root, so the grandparent exists
        let grand = self.tree.parent(father).unwrap();
        let father_is_left = self.tree.left(grand) == Some(father);
        let aunt = if father_is_left {
            self.tree.right(grand)
        } else {
            self.tree.left(grand)
        };

        if aunt.map_or(true, |a| !self.tree.is_red(a)) {
            let same_side = if father_is_left {
                self.tree.left(father) == Some(n)
            } else {
                self.tree.right(father) == Some(n)
            };
            if same_side {
                // straight line: one rotation settles the subtree
                self.tree.rotate(father, grand).unwrap();
                self.tree.flip_color(father);
                self.tree.flip_color(grand);
            } else {
                // zig-zag: rotate n into the straight position first
                self.tree.rotate(n, father).unwrap();
                self.tree.rotate(n, grand).unwrap();
                self.tree.flip_color(n);
                self.tree.flip_color(grand);
            }
        } else {
            self.tree.flip_color(grand);
            self.tree.flip_color(self.tree.left(grand).unwrap());
            self.tree.flip_color(self.tree.right(grand).unwrap());
            if self.tree.root() == Some(grand) {
                if self.tree.is_red(grand) {
                    self.tree.flip_color(grand);
                }
            } else {
                self.ensure_red_property(grand);
            }
        }
    }

    /// Sets the inclusive lower bound for iterators created after this
    /// call; `None` removes the bound. Live iterators are unaffected.
    pub fn set_iter_min(&mut self, min: Option<T>) { self.min = min; }

    /// Sets the inclusive upper bound for iterators created after this
    /// call; `None` removes the bound. Live iterators are unaffected.
    pub fn set_iter_max(&mut self, max: Option<T>) { self.max = max; }

    /// An ascending traversal over the values between the currently
    /// set bounds (both inclusive), duplicates included.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.tree, self.min.as_ref(), self.max.as_ref())
    }
}

impl<T: Ord> Default for RbTree<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Ord> FromIterator<T> for RbTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for RbTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for data in iter {
            self.insert(data);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RbTree<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tree.fmt(fmt)
    }
}

/// Bounded ascending traversal, built lazily: subtrees that a bound
/// rules out are never pushed onto the ancestor stack.
pub struct Iter<'a, T> {
    tree: &'a Bst<T>,
    min: Option<&'a T>,
    max: Option<&'a T>,
    stack: Vec<usize>,
}

impl<'a, T: Ord> Iter<'a, T> {
    fn new(
        tree: &'a Bst<T>,
        min: Option<&'a T>,
        max: Option<&'a T>,
    ) -> Self {
        let mut iter = Self { tree, min, max, stack: vec![] };
        iter.descend(tree.root());
        iter
    }

    /// Pushes the in-range part of the left spine of `node`. When the
    /// minimum rules a node out it rules out the whole left subtree
    /// with it, so the walk steps right instead of pushing.
    fn descend(&mut self, mut node: Option<usize>) {
        while let Some(v) = node {
            node = match self.min {
                Some(min) if min > self.tree.data(v) => self.tree.right(v),
                _ => {
                    self.stack.push(v);
                    self.tree.left(v)
                }
            };
        }
    }
}

impl<'a, T: Ord> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<&'a T> {
        let &v = self.stack.last()?;
        // everything below the top of the stack is larger still, so
        // one out-of-range value ends the whole traversal
        if matches!(self.max, Some(max) if max < self.tree.data(v)) {
            return None;
        }
        self.stack.pop();
        self.descend(self.tree.right(v));
        Some(self.tree.data(v))
    }
}

impl<'a, T: Ord> IntoIterator for &'a RbTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Iter<'a, T> { self.iter() }
}

#[cfg(test)]
fn assert_invariants<T: Ord>(tree: &RbTree<T>) {
    bst::debug::assert_links(&tree.tree);
    if let Some(r) = tree.tree.root() {
        assert!(!tree.tree.is_red(r), "root must be black");
    }
    black_height(&tree.tree, tree.tree.root());
}

// checks the red-red and black-height properties of a subtree and
// returns its black-height (absent children count for 1)
#[cfg(test)]
fn black_height<T>(tree: &Bst<T>, node: Option<usize>) -> usize {
    let v = match node {
        Some(v) => v,
        None => return 1,
    };
    if tree.is_red(v) {
        for c in [tree.left(v), tree.right(v)].into_iter().flatten() {
            assert!(!tree.is_red(c), "red node with a red child");
        }
    }
    let lh = black_height(tree, tree.left(v));
    let rh = black_height(tree, tree.right(v));
    assert_eq!(lh, rh, "black-height differs between siblings");
    lh + usize::from(!tree.is_red(v))
}

#[cfg(test)]
fn collected<T: Clone + Ord>(tree: &RbTree<T>) -> Vec<T> {
    tree.iter().cloned().collect()
}

#[test]
fn first_insert_makes_a_black_root() {
    let mut tree = RbTree::new();
    tree.insert(1);
    assert_eq!(tree.len(), 1);
    let r = tree.tree.root().unwrap();
    assert_eq!(*tree.tree.data(r), 1);
    assert!(!tree.tree.is_red(r));

    tree.insert(9);
    assert_eq!(tree.len(), 2);
    let nine = tree.tree.right(r).unwrap();
    assert_eq!(*tree.tree.data(nine), 9);
    assert!(!tree.tree.is_red(r));
    assert!(tree.tree.is_red(nine));
}

#[test]
fn straight_line_rotates_father_up() {
    let mut tree = RbTree::new();
    tree.insert(1);
    tree.insert(9);
    // 1-9 and 9-12 are both right-child edges
    tree.insert(12);

    assert_eq!(tree.len(), 3);
    let t = &tree.tree;
    let r = t.root().unwrap();
    assert_eq!(*t.data(r), 9);
    assert!(!t.is_red(r));
    assert_eq!(*t.data(t.left(r).unwrap()), 1);
    assert!(t.is_red(t.left(r).unwrap()));
    assert_eq!(*t.data(t.right(r).unwrap()), 12);
    assert!(t.is_red(t.right(r).unwrap()));
}

#[test]
fn zig_zag_rotates_the_new_node_up_twice() {
    let mut tree = RbTree::new();
    tree.insert(1);
    tree.insert(9);
    // 9 is a right child but 7 arrives as 9's left child
    tree.insert(7);

    assert_eq!(tree.len(), 3);
    let t = &tree.tree;
    let r = t.root().unwrap();
    assert_eq!(*t.data(r), 7);
    assert!(!t.is_red(r));
    assert_eq!(*t.data(t.left(r).unwrap()), 1);
    assert!(t.is_red(t.left(r).unwrap()));
    assert_eq!(*t.data(t.right(r).unwrap()), 9);
    assert!(t.is_red(t.right(r).unwrap()));
}

#[test]
fn red_aunt_recolors_without_rotation() {
    let mut tree = RbTree::new();
    tree.insert(7);
    tree.insert(1);
    tree.insert(9);
    tree.insert(4);

    assert_eq!(tree.len(), 4);
    let t = &tree.tree;
    let r = t.root().unwrap();
    assert_eq!(*t.data(r), 7);
    assert!(!t.is_red(r));
    let one = t.left(r).unwrap();
    let nine = t.right(r).unwrap();
    assert_eq!(*t.data(one), 1);
    assert!(!t.is_red(one));
    assert_eq!(*t.data(nine), 9);
    assert!(!t.is_red(nine));
    let four = t.right(one).unwrap();
    assert_eq!(*t.data(four), 4);
    assert!(t.is_red(four));
}

#[test]
fn red_aunt_at_the_root_leaves_the_root_black() {
    let mut tree = RbTree::new();
    tree.insert(7);
    tree.insert(1);
    tree.insert(9);
    // 12's father 9 and aunt 1 are both red: recolor only
    tree.insert(12);

    let t = &tree.tree;
    let r = t.root().unwrap();
    assert_eq!(*t.data(r), 7);
    assert!(!t.is_red(r));
    assert!(!t.is_red(t.left(r).unwrap()));
    let nine = t.right(r).unwrap();
    assert!(!t.is_red(nine));
    let twelve = t.right(nine).unwrap();
    assert_eq!(*t.data(twelve), 12);
    assert!(t.is_red(twelve));
    assert_invariants(&tree);
}

#[test]
fn red_aunt_repair_cascades_upward() {
    // hand-built valid tree whose lower levels force a recolor that
    // re-violates the red property at the grandparent
    let mut t = Bst::new();
    let m = t.push_node("M");
    let f = t.push_node("F");
    let d = t.push_node("D");
    let h = t.push_node("H");
    let g = t.push_node("G");
    let i = t.push_node("I");
    let r = t.push_node("R");
    let tt = t.push_node("T");
    let w = t.push_node("W");

    t.set_root(m);
    t.link_left(m, f);
    t.link_right(m, tt);
    t.link_left(f, d);
    t.link_right(f, h);
    t.link_left(h, g);
    t.link_right(h, i);
    t.link_left(tt, r);
    t.link_right(tt, w);
    // fresh nodes are black; F, G, I, R and W are the red ones
    for v in [f, g, i, r, w] {
        t.flip_color(v);
    }

    let mut tree = RbTree { tree: t, min: None, max: None };
    assert_invariants(&tree);
    tree.insert("L");

    assert_eq!(tree.len(), 10);
    let t = &tree.tree;
    let root = t.root().unwrap();
    assert_eq!(*t.data(root), "H");
    assert!(!t.is_red(root));

    let left = t.left(root).unwrap();
    assert_eq!(*t.data(left), "F");
    assert!(t.is_red(left));
    let right = t.right(root).unwrap();
    assert_eq!(*t.data(right), "M");
    assert!(t.is_red(right));

    assert_eq!(*t.data(t.left(left).unwrap()), "D");
    assert!(!t.is_red(t.left(left).unwrap()));
    assert_eq!(*t.data(t.right(left).unwrap()), "G");
    assert!(!t.is_red(t.right(left).unwrap()));

    let i = t.left(right).unwrap();
    assert_eq!(*t.data(i), "I");
    assert!(!t.is_red(i));
    let tt = t.right(right).unwrap();
    assert_eq!(*t.data(tt), "T");
    assert!(!t.is_red(tt));

    assert_eq!(*t.data(t.right(i).unwrap()), "L");
    assert!(t.is_red(t.right(i).unwrap()));
    assert_eq!(*t.data(t.left(tt).unwrap()), "R");
    assert!(t.is_red(t.left(tt).unwrap()));
    assert_eq!(*t.data(t.right(tt).unwrap()), "W");
    assert!(t.is_red(t.right(tt).unwrap()));

    assert_invariants(&tree);
}

#[test]
fn ascending_inserts_stay_balanced() {
    let tree: RbTree<i32> = (1..=5).collect();
    assert_eq!(collected(&tree), [1, 2, 3, 4, 5]);
    // ceil(log2(5 + 1))
    assert!(tree.height() <= 3);
    assert_invariants(&tree);
}

#[test]
fn duplicates_are_kept() {
    let tree: RbTree<i32> = [7, 1, 9, 7].into_iter().collect();
    assert_eq!(tree.len(), 4);
    assert_eq!(collected(&tree), [1, 7, 7, 9]);
    assert!(tree.contains(&7));
    assert_invariants(&tree);
}

#[test]
fn iter_with_min_bound() {
    let mut tree = RbTree::new();
    // a bound set before the values arrive applies all the same
    tree.set_iter_min(Some("k"));
    tree.extend(["a", "m", "g", "z", "t", "k"]);
    assert_eq!(collected(&tree), ["k", "m", "t", "z"]);
}

#[test]
fn iter_with_max_bound() {
    let mut tree: RbTree<&str> =
        ["a", "m", "g", "z", "t", "k"].into_iter().collect();
    tree.set_iter_max(Some("k"));
    assert_eq!(collected(&tree), ["a", "g", "k"]);
}

#[test]
fn iter_with_both_bounds() {
    let mut tree: RbTree<&str> =
        ["a", "m", "g", "z", "t", "k"].into_iter().collect();
    tree.set_iter_min(Some("k"));
    tree.set_iter_max(Some("s"));
    assert_eq!(collected(&tree), ["k", "m"]);
}

#[test]
fn bounded_iter_keeps_duplicates() {
    let mut tree: RbTree<&str> =
        ["a", "m", "m", "g", "z", "t", "t", "k"].into_iter().collect();
    tree.set_iter_min(Some("k"));
    tree.set_iter_max(Some("z"));
    assert_eq!(collected(&tree), ["k", "m", "m", "t", "t", "z"]);
}

#[test]
fn bounds_are_inclusive_on_both_sides() {
    let mut tree: RbTree<i32> =
        [1, 4, 7, 15, 15, 21, 25, 30].into_iter().collect();
    tree.set_iter_min(Some(5));
    tree.set_iter_max(Some(25));
    assert_eq!(collected(&tree), [7, 15, 15, 21, 25]);
}

#[test]
fn bounds_persist_and_can_be_cleared() {
    let mut tree: RbTree<i32> = (1..=10).collect();
    tree.set_iter_min(Some(4));
    tree.set_iter_max(Some(6));
    assert_eq!(collected(&tree), [4, 5, 6]);
    // every new iterator sees the same bounds
    assert_eq!(collected(&tree), [4, 5, 6]);

    // two live iterators advance independently
    let mut a = tree.iter();
    let mut b = tree.iter();
    assert_eq!(a.next(), Some(&4));
    assert_eq!(a.next(), Some(&5));
    assert_eq!(b.next(), Some(&4));

    tree.set_iter_min(None);
    tree.set_iter_max(None);
    assert_eq!(collected(&tree), (1..=10).collect::<Vec<_>>());

    tree.set_iter_min(Some(11));
    assert_eq!(tree.iter().next(), None);
}

#[test]
fn exhausted_iterator_stays_exhausted() {
    let tree: RbTree<i32> = [2, 1].into_iter().collect();
    let mut iter = tree.iter();
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.next(), Some(&2));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next(), None);
}

#[test]
fn random_inserts_keep_the_invariants() {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_seed([7; 32]);
    for _ in 0..30 {
        let n = rng.gen_range(1..=300);
        let mut tree = RbTree::new();
        let mut oracle = vec![];
        for _ in 0..n {
            let x = rng.gen_range(0..100_u32);
            tree.insert(x);
            oracle.push(x);
            assert_invariants(&tree);
        }
        oracle.sort_unstable();
        assert_eq!(tree.len(), n);
        assert_eq!(collected(&tree), oracle);
    }
}

#[test]
fn random_bounded_iteration_matches_the_oracle() {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_seed([23; 32]);
    for _ in 0..50 {
        let n = rng.gen_range(0..200);
        let mut tree = RbTree::new();
        let mut values = vec![];
        for _ in 0..n {
            let x = rng.gen_range(0..60_u32);
            tree.insert(x);
            values.push(x);
        }
        values.sort_unstable();

        let min = rng.gen_range(0..60);
        let max = rng.gen_range(0..60);
        tree.set_iter_min(Some(min));
        tree.set_iter_max(Some(max));
        let expected: Vec<_> = values
            .iter()
            .copied()
            .filter(|&x| min <= x && x <= max)
            .collect();
        assert_eq!(collected(&tree), expected);
    }
}

#[test]
fn clear_keeps_the_bounds() {
    let mut tree: RbTree<i32> = (1..=8).collect();
    tree.set_iter_min(Some(3));
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.iter().next(), None);

    tree.extend(1..=8);
    assert_eq!(collected(&tree), (3..=8).collect::<Vec<_>>());
}

#[test]
fn debug_fmt_ignores_the_bounds() {
    let mut tree: RbTree<i32> = [3, 1, 2].into_iter().collect();
    tree.set_iter_min(Some(2));
    assert_eq!(format!("{tree:?}"), "[1, 2, 3]");
}

#[test]
fn into_iterator_for_references() {
    let tree: RbTree<i32> = [2, 3, 1].into_iter().collect();
    let mut out = vec![];
    for &x in &tree {
        out.push(x);
    }
    assert_eq!(out, [1, 2, 3]);
}
