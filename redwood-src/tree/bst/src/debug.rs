use crate::Bst;

/// Prints the tree sideways on stderr, right subtree on top, one node
/// per line; red nodes are marked with an asterisk.
pub fn visualize<T: std::fmt::Debug>(tree: &Bst<T>) {
    fn dfs<T: std::fmt::Debug>(tree: &Bst<T>, v: usize, depth: usize) {
        if let Some(r) = tree.right(v) {
            dfs(tree, r, depth + 1);
        }
        let pad = "    ".repeat(depth);
        let mark = if tree.is_red(v) { "*" } else { "" };
        eprintln!("{pad}{:?}{mark}", tree.data(v));
        if let Some(l) = tree.left(v) {
            dfs(tree, l, depth + 1);
        }
    }

    match tree.root() {
        Some(r) => dfs(tree, r, 0),
        None => eprintln!("(empty)"),
    }
}

/// Checks that every linked parent/child pair points at each other
/// and that the root has no parent.
pub fn assert_links<T>(tree: &Bst<T>) {
    fn dfs<T>(tree: &Bst<T>, v: usize) {
        for c in [tree.left(v), tree.right(v)].into_iter().flatten() {
            assert_eq!(
                tree.parent(c),
                Some(v),
                "child {c} does not point back at {v}"
            );
            dfs(tree, c);
        }
    }

    if let Some(r) = tree.root() {
        assert_eq!(tree.parent(r), None, "the root has a parent");
        dfs(tree, r);
    }
}
