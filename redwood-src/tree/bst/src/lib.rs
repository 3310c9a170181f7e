use std::{cmp::Ordering, fmt};

struct Node<T> {
    data: T,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    red: bool,
}

/// An ordered multiset as a binary search tree.
///
/// Nodes live in an arena and reference each other by index, so the
/// parent link can point back up the tree without owning anything.
/// Equal values route to the left subtree, and iteration yields them
/// in their stored multiplicity.
///
/// No rebalancing happens here; `rotate` is provided as a structural
/// primitive for layers that do.
pub struct Bst<T> {
    nodes: Vec<Node<T>>,
    root: Option<usize>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RotateError {
    UnknownNode(usize),
    NotAdjacent { child: usize, parent: usize },
}

impl fmt::Display for RotateError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::UnknownNode(v) => write!(fmt, "no node {v} in this tree"),
            Self::NotAdjacent { child, parent } => {
                write!(fmt, "node {child} is not a child of node {parent}")
            }
        }
    }
}

impl std::error::Error for RotateError {}

impl<T> Bst<T> {
    pub fn new() -> Self { Self { nodes: vec![], root: None } }

    pub fn is_empty(&self) -> bool { self.root.is_none() }

    /// Counts the stored values, duplicates included.
    ///
    /// The count is recomputed from the tree on every call rather than
    /// maintained incrementally.
    pub fn len(&self) -> usize { self.count(self.root) }

    fn count(&self, node: Option<usize>) -> usize {
        match node {
            None => 0,
            Some(v) => {
                1 + self.count(self.nodes[v].left)
                    + self.count(self.nodes[v].right)
            }
        }
    }

    /// Number of nodes on the longest root-to-leaf path; 0 when empty.
    pub fn height(&self) -> usize { self.depth(self.root) }

    fn depth(&self, node: Option<usize>) -> usize {
        match node {
            None => 0,
            Some(v) => {
                1 + self
                    .depth(self.nodes[v].left)
                    .max(self.depth(self.nodes[v].right))
            }
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub fn root(&self) -> Option<usize> { self.root }
    pub fn data(&self, v: usize) -> &T { &self.nodes[v].data }
    pub fn parent(&self, v: usize) -> Option<usize> { self.nodes[v].parent }
    pub fn left(&self, v: usize) -> Option<usize> { self.nodes[v].left }
    pub fn right(&self, v: usize) -> Option<usize> { self.nodes[v].right }

    pub fn is_red(&self, v: usize) -> bool { self.nodes[v].red }
    pub fn flip_color(&mut self, v: usize) {
        self.nodes[v].red = !self.nodes[v].red;
    }

    /// Allocates a detached (black) node and returns its index.
    pub fn push_node(&mut self, data: T) -> usize {
        self.nodes.push(Node {
            data,
            parent: None,
            left: None,
            right: None,
            red: false,
        });
        self.nodes.len() - 1
    }

    pub fn link_left(&mut self, parent: usize, child: usize) {
        self.nodes[parent].left = Some(child);
        self.nodes[child].parent = Some(parent);
    }

    pub fn link_right(&mut self, parent: usize, child: usize) {
        self.nodes[parent].right = Some(child);
        self.nodes[child].parent = Some(parent);
    }

    pub fn set_root(&mut self, v: usize) {
        self.nodes[v].parent = None;
        self.root = Some(v);
    }

    /// Exchanges `child` with its parent, preserving in-order sequence.
    ///
    /// A right child rotates left over `parent`, a left child rotates
    /// right; the subtree between the two nodes changes sides, and
    /// `child` takes over `parent`'s slot in the grandparent (or the
    /// root). Fails without touching the tree when an index is out of
    /// range or the two nodes are not an immediate child/parent pair.
    pub fn rotate(
        &mut self,
        child: usize,
        parent: usize,
    ) -> Result<(), RotateError> {
        for v in [child, parent] {
            if v >= self.nodes.len() {
                return Err(RotateError::UnknownNode(v));
            }
        }
        if self.nodes[child].parent != Some(parent) {
            return Err(RotateError::NotAdjacent { child, parent });
        }

        let grand = self.nodes[parent].parent;
        if self.nodes[parent].right == Some(child) {
            let mid = self.nodes[child].left;
            self.nodes[parent].right = mid;
            if let Some(m) = mid {
                self.nodes[m].parent = Some(parent);
            }
            self.nodes[child].left = Some(parent);
            self.nodes[parent].parent = Some(child);
        } else {
            let mid = self.nodes[child].right;
            self.nodes[parent].left = mid;
            if let Some(m) = mid {
                self.nodes[m].parent = Some(parent);
            }
            self.nodes[child].right = Some(parent);
            self.nodes[parent].parent = Some(child);
        }

        self.nodes[child].parent = grand;
        match grand {
            None => self.root = Some(child),
            Some(g) => {
                if self.nodes[g].right == Some(parent) {
                    self.nodes[g].right = Some(child);
                } else {
                    self.nodes[g].left = Some(child);
                }
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> InOrder<'_, T> { InOrder::new(self) }
}

pub mod debug;

impl<T: Ord> Bst<T> {
    /// Inserts `data` as a new leaf and returns its index.
    ///
    /// Placement is the naive descent: values less than or equal to a
    /// node go left, strictly greater go right. The index lets callers
    /// run their own fixup from the new node.
    pub fn insert(&mut self, data: T) -> usize {
        let v = self.push_node(data);
        match self.root {
            None => self.root = Some(v),
            Some(r) => self.place(v, r),
        }
        v
    }

    fn place(&mut self, new: usize, sub: usize) {
        if self.nodes[new].data <= self.nodes[sub].data {
            match self.nodes[sub].left {
                Some(l) => self.place(new, l),
                None => self.link_left(sub, new),
            }
        } else {
            match self.nodes[sub].right {
                Some(r) => self.place(new, r),
                None => self.link_right(sub, new),
            }
        }
    }

    pub fn contains(&self, data: &T) -> bool {
        match self.root {
            Some(r) => self.contains_in(data, r),
            None => false,
        }
    }

    fn contains_in(&self, data: &T, sub: usize) -> bool {
        match data.cmp(&self.nodes[sub].data) {
            Ordering::Equal => true,
            Ordering::Less => match self.nodes[sub].left {
                Some(l) => self.contains_in(data, l),
                None => false,
            },
            Ordering::Greater => match self.nodes[sub].right {
                Some(r) => self.contains_in(data, r),
                None => false,
            },
        }
    }
}

impl<T> Default for Bst<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Ord> FromIterator<T> for Bst<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for Bst<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for data in iter {
            self.insert(data);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Bst<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_list().entries(self.iter()).finish()
    }
}

/// Unbounded ascending traversal over a `Bst`.
///
/// The stack holds the ancestors still to visit, so the walk can pause
/// between `next` calls instead of recursing through the whole tree.
pub struct InOrder<'a, T> {
    tree: &'a Bst<T>,
    stack: Vec<usize>,
}

impl<'a, T> InOrder<'a, T> {
    fn new(tree: &'a Bst<T>) -> Self {
        let mut iter = Self { tree, stack: vec![] };
        iter.descend(tree.root);
        iter
    }

    fn descend(&mut self, mut node: Option<usize>) {
        while let Some(v) = node {
            self.stack.push(v);
            node = self.tree.nodes[v].left;
        }
    }
}

impl<'a, T> Iterator for InOrder<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<&'a T> {
        let v = self.stack.pop()?;
        self.descend(self.tree.nodes[v].right);
        Some(&self.tree.nodes[v].data)
    }
}

impl<'a, T> IntoIterator for &'a Bst<T> {
    type Item = &'a T;
    type IntoIter = InOrder<'a, T>;
    fn into_iter(self) -> InOrder<'a, T> { self.iter() }
}

#[cfg(test)]
fn in_order<T: Clone>(tree: &Bst<T>) -> Vec<T> {
    tree.iter().cloned().collect()
}

#[cfg(test)]
fn level_order<T: Clone>(tree: &Bst<T>) -> Vec<T> {
    let mut queue: std::collections::VecDeque<_> =
        tree.root().into_iter().collect();
    let mut out = vec![];
    while let Some(v) = queue.pop_front() {
        out.push(tree.data(v).clone());
        queue.extend(tree.left(v));
        queue.extend(tree.right(v));
    }
    out
}

#[test]
fn insert_shapes() {
    let tree: Bst<i32> = [1, 2, 3, 4, 5].into_iter().collect();
    assert_eq!(level_order(&tree), [1, 2, 3, 4, 5]);
    assert_eq!(in_order(&tree), [1, 2, 3, 4, 5]);

    let tree: Bst<i32> = [5, 4, 3, 2, 1].into_iter().collect();
    assert_eq!(level_order(&tree), [5, 4, 3, 2, 1]);
    assert_eq!(in_order(&tree), [1, 2, 3, 4, 5]);

    let tree: Bst<i32> = [3, 1, 5, 2, 4].into_iter().collect();
    assert_eq!(level_order(&tree), [3, 1, 5, 2, 4]);
    assert_eq!(in_order(&tree), [1, 2, 3, 4, 5]);
}

#[test]
fn duplicates_route_left() {
    let mut tree = Bst::new();
    let first = tree.insert(7);
    tree.insert(1);
    tree.insert(9);
    let second = tree.insert(7);

    // the duplicate descends left of the equal root, then right of 1
    let one = tree.left(first).unwrap();
    assert_eq!(tree.right(one), Some(second));
    assert_eq!(tree.parent(second), Some(one));
    assert_eq!(in_order(&tree), [1, 7, 7, 9]);
    assert_eq!(tree.len(), 4);
}

#[test]
fn contains_finds_stored_values() {
    let tree: Bst<i32> =
        [4, 7, 9, 11, 3, 20, 15, 1, 6].into_iter().collect();
    for x in [4, 7, 9, 11, 3, 20, 15, 1, 6] {
        assert!(tree.contains(&x));
    }
    for x in [0, 2, 5, 8, 21] {
        assert!(!tree.contains(&x));
    }

    let empty = Bst::<i32>::new();
    assert!(!empty.contains(&4));

    let tree: Bst<&str> = ["7", "6", "9", "8", "11"].into_iter().collect();
    assert!(tree.contains(&"9"));
    assert!(!tree.contains(&"10"));
}

#[test]
fn len_counts_duplicates() {
    let tree: Bst<i32> = [7, 7, 6, 9, 8, 11, 13, 1, 2].into_iter().collect();
    assert_eq!(tree.len(), 9);
    let tree: Bst<i32> = [7, 11, 13, 1, 2].into_iter().collect();
    assert_eq!(tree.len(), 5);
}

#[test]
fn empty_and_clear() {
    let mut tree = Bst::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);

    tree.clear();
    assert!(tree.is_empty());

    tree.extend(["hudbi", "uewe", "hue32ei", "heh3uehoi", "whey3h"]);
    assert!(!tree.is_empty());
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
}

#[test]
fn rotate_without_shared_children() {
    // right rotation at the root
    let mut tree = Bst::new();
    let parent = tree.push_node(10);
    let child = tree.push_node(5);
    tree.set_root(parent);
    tree.link_left(parent, child);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.root(), Some(child));
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.left(child), None);
    assert_eq!(tree.right(child), Some(parent));
    assert_eq!(tree.parent(parent), Some(child));
    assert_eq!(tree.left(parent), None);
    assert_eq!(tree.right(parent), None);

    // left rotation at the root
    let mut tree = Bst::new();
    let parent = tree.push_node(10);
    let child = tree.push_node(15);
    tree.set_root(parent);
    tree.link_right(parent, child);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.root(), Some(child));
    assert_eq!(tree.left(child), Some(parent));
    assert_eq!(tree.right(child), None);
    assert_eq!(tree.parent(parent), Some(child));

    // right rotation below a grandparent
    let mut tree = Bst::new();
    let grand = tree.push_node(20);
    let parent = tree.push_node(10);
    let child = tree.push_node(5);
    tree.set_root(grand);
    tree.link_left(grand, parent);
    tree.link_left(parent, child);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.root(), Some(grand));
    assert_eq!(tree.left(grand), Some(child));
    assert_eq!(tree.parent(child), Some(grand));
    assert_eq!(tree.right(child), Some(parent));
    assert_eq!(tree.parent(parent), Some(child));

    // left rotation below a grandparent
    let mut tree = Bst::new();
    let grand = tree.push_node(20);
    let parent = tree.push_node(25);
    let child = tree.push_node(30);
    tree.set_root(grand);
    tree.link_right(grand, parent);
    tree.link_right(parent, child);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.right(grand), Some(child));
    assert_eq!(tree.parent(child), Some(grand));
    assert_eq!(tree.left(child), Some(parent));
    assert_eq!(tree.right(child), None);
}

#[test]
fn rotate_with_one_shared_child() {
    // right rotation; the parent keeps its right child
    let mut tree = Bst::new();
    let parent = tree.push_node(10);
    let child = tree.push_node(5);
    let other = tree.push_node(15);
    tree.set_root(parent);
    tree.link_left(parent, child);
    tree.link_right(parent, other);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.root(), Some(child));
    assert_eq!(tree.right(child), Some(parent));
    assert_eq!(tree.right(parent), Some(other));
    assert_eq!(tree.parent(other), Some(parent));
    assert_eq!(in_order(&tree), [5, 10, 15]);

    // left rotation below a grandparent; the child's left subtree
    // switches over to the parent
    let mut tree = Bst::new();
    let grand = tree.push_node(50);
    let parent = tree.push_node(40);
    let child = tree.push_node(45);
    let mid = tree.push_node(42);
    tree.set_root(grand);
    tree.link_left(grand, parent);
    tree.link_right(parent, child);
    tree.link_left(child, mid);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.left(grand), Some(child));
    assert_eq!(tree.parent(child), Some(grand));
    assert_eq!(tree.left(child), Some(parent));
    assert_eq!(tree.right(parent), Some(mid));
    assert_eq!(tree.parent(mid), Some(parent));
    assert_eq!(in_order(&tree), [40, 42, 45, 50]);
}

#[test]
fn rotate_with_two_shared_children() {
    // left rotation at the root; child's left subtree moves across
    let mut tree = Bst::new();
    let parent = tree.push_node(10);
    let child = tree.push_node(15);
    let cl = tree.push_node(12);
    let cr = tree.push_node(18);
    tree.set_root(parent);
    tree.link_right(parent, child);
    tree.link_left(child, cl);
    tree.link_right(child, cr);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.root(), Some(child));
    assert_eq!(tree.left(child), Some(parent));
    assert_eq!(tree.right(child), Some(cr));
    assert_eq!(tree.right(parent), Some(cl));
    assert_eq!(tree.parent(cl), Some(parent));
    assert_eq!(in_order(&tree), [10, 12, 15, 18]);
}

#[test]
fn rotate_with_three_shared_children() {
    let mut tree = Bst::new();
    let parent = tree.push_node(10);
    let child = tree.push_node(8);
    let sibling = tree.push_node(15);
    let cl = tree.push_node(6);
    let cr = tree.push_node(9);
    tree.set_root(parent);
    tree.link_left(parent, child);
    tree.link_right(parent, sibling);
    tree.link_left(child, cl);
    tree.link_right(child, cr);

    tree.rotate(child, parent).unwrap();
    assert_eq!(tree.root(), Some(child));
    assert_eq!(tree.left(child), Some(cl));
    assert_eq!(tree.right(child), Some(parent));
    assert_eq!(tree.left(parent), Some(cr));
    assert_eq!(tree.parent(cr), Some(parent));
    assert_eq!(tree.right(parent), Some(sibling));
    assert_eq!(in_order(&tree), [6, 8, 9, 10, 15]);
    debug::assert_links(&tree);
    debug::visualize(&tree);
}

#[test]
fn rotate_rejects_bad_arguments() {
    let mut tree: Bst<i32> = [10, 5, 15, 3].into_iter().collect();
    let before_in = in_order(&tree);
    let before_level = level_order(&tree);

    let root = tree.root().unwrap();
    let five = tree.left(root).unwrap();
    let three = tree.left(five).unwrap();

    // a grandchild is not an immediate child
    assert_eq!(
        tree.rotate(three, root),
        Err(RotateError::NotAdjacent { child: three, parent: root })
    );
    // nor is an unrelated sibling pair
    let fifteen = tree.right(root).unwrap();
    assert_eq!(
        tree.rotate(five, fifteen),
        Err(RotateError::NotAdjacent { child: five, parent: fifteen })
    );
    assert_eq!(tree.rotate(42, root), Err(RotateError::UnknownNode(42)));
    assert_eq!(tree.rotate(root, 42), Err(RotateError::UnknownNode(42)));

    // failed calls leave the structure untouched
    assert_eq!(in_order(&tree), before_in);
    assert_eq!(level_order(&tree), before_level);
}

#[test]
fn random_rotations_preserve_order() {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_seed([61; 32]);
    for _ in 0..20 {
        let n = rng.gen_range(2..100);
        let mut tree = Bst::new();
        for _ in 0..n {
            tree.insert(rng.gen_range(0..50_u32));
        }
        let mut expected = in_order(&tree);
        expected.sort_unstable();
        assert_eq!(in_order(&tree), expected);

        for _ in 0..50 {
            let child = rng.gen_range(0..n);
            if let Some(parent) = tree.parent(child) {
                tree.rotate(child, parent).unwrap();
            }
            debug::assert_links(&tree);
            assert_eq!(in_order(&tree), expected);
        }
    }
}

#[test]
fn rotate_error_messages() {
    assert_eq!(
        RotateError::UnknownNode(3).to_string(),
        "no node 3 in this tree"
    );
    assert_eq!(
        RotateError::NotAdjacent { child: 1, parent: 4 }.to_string(),
        "node 1 is not a child of node 4"
    );
}

#[test]
fn debug_fmt() {
    let tree: Bst<i32> = [3, 1, 2].into_iter().collect();
    assert_eq!(format!("{tree:?}"), "[1, 2, 3]");
    assert_eq!(format!("{:?}", Bst::<i32>::new()), "[]");
}
