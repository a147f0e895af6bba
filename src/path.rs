//! Addressing nodes of a record tree.
//!
//! A [`Path`] names a node by its depth (`move_number`) and the child index
//! chosen at every branching ancestor on the way down. Ancestors with a
//! single child consume no index, so the main line of an unbranched record
//! is addressed by depth alone.
//!
//! Internally a node is reached through a *route*: the child index taken at
//! every level, branching or not. Routes are what [`Cursor`] keeps between
//! searches.

use crate::error::{GoError, Result};
use crate::record::{Node, RecordTree};

/// Address of a node: ply depth plus the variation picked at each branch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    pub move_number: usize,
    pub variations: Vec<usize>,
}

impl Path {
    /// The root node.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(move_number: usize, variations: Vec<usize>) -> Self {
        Self {
            move_number,
            variations,
        }
    }
}

impl RecordTree {
    /// The node at `path`, or `None` when the path names no node.
    ///
    /// `path.variations` must hold exactly one entry per branching ancestor.
    pub fn node_at(&self, path: &Path) -> Option<&Node> {
        let route = self.route_of(path)?;
        node_by_route(&self.root, &route)
    }

    pub fn node_at_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let route = self.route_of(path)?;
        let mut node = &mut self.root;
        for &i in &route {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Like [`RecordTree::node_at`], with `GoError::PathNotFound` instead of
    /// `None`.
    pub fn try_node_at(&self, path: &Path) -> Result<&Node> {
        self.node_at(path).ok_or_else(|| GoError::PathNotFound {
            move_number: path.move_number,
            variations: path.variations.clone(),
        })
    }

    /// The path of `node`, which must be a node of this tree (compared by
    /// identity, not by value).
    pub fn path_of(&self, node: &Node) -> Option<Path> {
        let mut stack = vec![(&self.root, Vec::new())];
        while let Some((current, route)) = stack.pop() {
            if std::ptr::eq(current, node) {
                return path_of_route(&self.root, &route);
            }
            for (i, child) in current.children.iter().enumerate().rev() {
                let mut next = route.clone();
                next.push(i);
                stack.push((child, next));
            }
        }
        None
    }

    /// First node in pre-order (root first) matching `predicate`.
    pub fn find<F>(&self, mut predicate: F) -> Option<(&Node, Path)>
    where
        F: FnMut(&Node) -> bool,
    {
        let mut route = Vec::new();
        loop {
            let node = node_by_route(&self.root, &route)?;
            if predicate(node) {
                return path_of_route(&self.root, &route).map(|path| (node, path));
            }
            if !step_forward(&self.root, &mut route) {
                return None;
            }
        }
    }

    /// Path of the node `move_number` plies down the main line (first child
    /// at every branch).
    pub fn main_line(&self, move_number: usize) -> Option<Path> {
        let mut route = Vec::with_capacity(move_number);
        let mut node = &self.root;
        for _ in 0..move_number {
            node = node.children.first()?;
            route.push(0);
        }
        path_of_route(&self.root, &route)
    }

    /// Every path of the tree in pre-order.
    pub fn paths(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        let mut route = Vec::new();
        loop {
            paths.extend(path_of_route(&self.root, &route));
            if !step_forward(&self.root, &mut route) {
                return paths;
            }
        }
    }

    fn route_of(&self, path: &Path) -> Option<Vec<usize>> {
        let mut route = Vec::with_capacity(path.move_number);
        let mut variations = path.variations.iter();
        let mut node = &self.root;
        for _ in 0..path.move_number {
            let i = match node.children.len() {
                0 => return None,
                1 => 0,
                _ => *variations.next()?,
            };
            node = node.children.get(i)?;
            route.push(i);
        }
        match variations.next() {
            Some(_) => None,
            None => Some(route),
        }
    }
}

/// `None` once the route leaves the tree, e.g. after children were removed.
fn node_by_route<'a>(root: &'a Node, route: &[usize]) -> Option<&'a Node> {
    route.iter().try_fold(root, |node, &i| node.children.get(i))
}

fn path_of_route(root: &Node, route: &[usize]) -> Option<Path> {
    let mut variations = Vec::new();
    let mut node = root;
    for &i in route {
        if node.children.len() > 1 {
            variations.push(i);
        }
        node = node.children.get(i)?;
    }
    Some(Path {
        move_number: route.len(),
        variations,
    })
}

fn child_count(root: &Node, route: &[usize]) -> usize {
    node_by_route(root, route).map_or(0, |node| node.children.len())
}

/// Moves `route` to the next node in pre-order. `false` at the last node
/// or when `route` names no node.
fn step_forward(root: &Node, route: &mut Vec<usize>) -> bool {
    let Some(node) = node_by_route(root, route) else {
        return false;
    };
    if !node.children.is_empty() {
        route.push(0);
        return true;
    }
    while let Some(last) = route.pop() {
        if last + 1 < child_count(root, route) {
            route.push(last + 1);
            return true;
        }
    }
    false
}

/// Moves `route` to the previous node in pre-order. `false` at the root or
/// when `route` names no node.
fn step_backward(root: &Node, route: &mut Vec<usize>) -> bool {
    if node_by_route(root, route).is_none() {
        return false;
    }
    let Some(last) = route.pop() else {
        return false;
    };
    if last > 0 {
        route.push(last - 1);
        while let n @ 1.. = child_count(root, route) {
            route.push(n - 1);
        }
    }
    true
}

/// A search session over one record tree.
///
/// The cursor remembers the child taken at every level down to its current
/// node. Successive [`Cursor::next_match`] calls therefore continue one
/// pre-order traversal instead of re-entering branches already passed, and
/// [`Cursor::previous_match`] walks the same order backwards.
///
/// A cursor holds no borrow of the tree; pass the same tree to each call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    route: Vec<usize>,
}

impl Cursor {
    /// A cursor on the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor on the node at `path`.
    pub fn at(tree: &RecordTree, path: &Path) -> Option<Self> {
        tree.route_of(path).map(|route| Self { route })
    }

    /// The current path, or `None` if `tree` no longer holds the node the
    /// cursor was on.
    pub fn path(&self, tree: &RecordTree) -> Option<Path> {
        path_of_route(&tree.root, &self.route)
    }

    pub fn node<'a>(&self, tree: &'a RecordTree) -> Option<&'a Node> {
        node_by_route(&tree.root, &self.route)
    }

    /// Advances to the next matching node after the current one.
    ///
    /// Leaves the cursor where it was if nothing matches or if its node has
    /// been removed from `tree`.
    pub fn next_match<'a, F>(
        &mut self,
        tree: &'a RecordTree,
        predicate: F,
    ) -> Option<(&'a Node, Path)>
    where
        F: FnMut(&Node) -> bool,
    {
        self.search(tree, predicate, step_forward)
    }

    /// Moves back to the closest matching node before the current one.
    ///
    /// Leaves the cursor where it was if nothing matches.
    pub fn previous_match<'a, F>(
        &mut self,
        tree: &'a RecordTree,
        predicate: F,
    ) -> Option<(&'a Node, Path)>
    where
        F: FnMut(&Node) -> bool,
    {
        self.search(tree, predicate, step_backward)
    }

    fn search<'a, F>(
        &mut self,
        tree: &'a RecordTree,
        mut predicate: F,
        step: fn(&Node, &mut Vec<usize>) -> bool,
    ) -> Option<(&'a Node, Path)>
    where
        F: FnMut(&Node) -> bool,
    {
        let mut route = self.route.clone();
        while step(&tree.root, &mut route) {
            let node = node_by_route(&tree.root, &route)?;
            if predicate(node) {
                let path = path_of_route(&tree.root, &route)?;
                self.route = route;
                return Some((node, path));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse;

    // Root -> a -> b -> (c -> d | e | f -> (g | h))
    const BRANCHED: &str = "(;C[root];C[a];C[b](;C[c];C[d])(;C[e])(;C[f](;C[g])(;C[h])))";

    fn comment(node: &Node) -> &str {
        node.comment.as_deref().unwrap_or_default()
    }

    #[test]
    fn test_node_at_main_line() {
        let tree = parse(BRANCHED).unwrap();
        assert_eq!(comment(tree.node_at(&Path::root()).unwrap()), "root");
        assert_eq!(comment(tree.node_at(&Path::new(2, vec![])).unwrap()), "b");
        assert_eq!(comment(tree.node_at(&Path::new(4, vec![0])).unwrap()), "d");
        assert!(tree.node_at(&Path::new(4, vec![])).is_none());
        assert!(tree.node_at(&Path::new(5, vec![0])).is_none());

        assert_eq!(tree.main_line(2), Some(Path::new(2, vec![])));
        assert_eq!(tree.main_line(4), Some(Path::new(4, vec![0])));
        assert_eq!(tree.main_line(5), None);
    }

    #[test]
    fn test_node_at_variations() {
        let tree = parse(BRANCHED).unwrap();
        assert_eq!(comment(tree.node_at(&Path::new(3, vec![1])).unwrap()), "e");
        assert_eq!(comment(tree.node_at(&Path::new(4, vec![2, 1])).unwrap()), "h");
        assert!(tree.node_at(&Path::new(3, vec![3])).is_none());
        assert!(tree.node_at(&Path::new(4, vec![1])).is_none());
        assert!(tree.node_at(&Path::new(2, vec![0])).is_none());
        assert_eq!(
            tree.try_node_at(&Path::new(9, vec![])),
            Err(GoError::PathNotFound {
                move_number: 9,
                variations: Vec::new()
            })
        );
    }

    #[test]
    fn test_path_of() {
        let tree = parse(BRANCHED).unwrap();
        let h = &tree.root.children[0].children[0].children[2].children[1];
        assert_eq!(comment(h), "h");
        assert_eq!(tree.path_of(h), Some(Path::new(4, vec![2, 1])));
        assert_eq!(tree.path_of(&tree.root), Some(Path::root()));

        let stranger = Node::new();
        assert_eq!(tree.path_of(&stranger), None);
    }

    #[test]
    fn test_path_round_trip() {
        let tree = parse(BRANCHED).unwrap();
        let paths = tree.paths();
        assert_eq!(paths.len(), 9);
        for path in &paths {
            let node = tree.node_at(path).unwrap();
            assert_eq!(tree.path_of(node).as_ref(), Some(path));
        }
    }

    #[test]
    fn test_node_at_mut() {
        let mut tree = parse(BRANCHED).unwrap();
        tree.node_at_mut(&Path::new(3, vec![1])).unwrap().comment = Some("E".into());
        assert_eq!(comment(tree.node_at(&Path::new(3, vec![1])).unwrap()), "E");
    }

    #[test]
    fn test_find_pre_order() {
        let tree = parse(BRANCHED).unwrap();
        let (node, path) = tree.find(|n| comment(n) == "g").unwrap();
        assert_eq!(comment(node), "g");
        assert_eq!(path, Path::new(4, vec![2, 0]));
        let (node, _) = tree.find(|n| comment(n).len() == 1 && comment(n) > "c").unwrap();
        assert_eq!(comment(node), "d");
        assert!(tree.find(|n| comment(n) == "zzz").is_none());
    }

    #[test]
    fn test_cursor_moves_forward_monotonically() {
        let tree = parse(BRANCHED).unwrap();
        let mut cursor = Cursor::new();
        let leaves: Vec<String> = std::iter::from_fn(|| {
            cursor
                .next_match(&tree, |n| n.children.is_empty())
                .map(|(n, _)| comment(n).to_string())
        })
        .collect();
        assert_eq!(leaves, vec!["d", "e", "g", "h"]);
        assert_eq!(cursor.path(&tree), Some(Path::new(4, vec![2, 1])));
    }

    #[test]
    fn test_cursor_backward() {
        let tree = parse(BRANCHED).unwrap();
        let mut cursor = Cursor::at(&tree, &Path::new(4, vec![2, 1])).unwrap();
        let seen: Vec<String> = std::iter::from_fn(|| {
            cursor
                .previous_match(&tree, |_| true)
                .map(|(n, _)| comment(n).to_string())
        })
        .collect();
        assert_eq!(seen, vec!["g", "f", "e", "d", "c", "b", "a", "root"]);
        assert_eq!(cursor.path(&tree), Some(Path::root()));
    }

    #[test]
    fn test_cursor_from_middle_of_branch() {
        let tree = parse(BRANCHED).unwrap();
        let mut cursor = Cursor::at(&tree, &Path::new(3, vec![1])).unwrap();
        assert_eq!(comment(cursor.node(&tree).unwrap()), "e");

        let (next, path) = cursor.next_match(&tree, |_| true).unwrap();
        assert_eq!(comment(next), "f");
        assert_eq!(path, Path::new(3, vec![2]));

        let (prev, _) = cursor.previous_match(&tree, |n| comment(n) == "d").unwrap();
        assert_eq!(comment(prev), "d");
        assert!(cursor.previous_match(&tree, |n| comment(n) == "h").is_none());
        assert_eq!(comment(cursor.node(&tree).unwrap()), "d");
    }

    #[test]
    fn test_cursor_survives_removed_branch() {
        let mut tree = parse("(;SZ[9];B[aa];W[bb];B[cc])").unwrap();
        let mut cursor = Cursor::at(&tree, &Path::new(3, vec![])).unwrap();
        let before = cursor.clone();
        tree.root.children[0].children.clear();

        assert!(cursor.node(&tree).is_none());
        assert!(cursor.path(&tree).is_none());
        assert!(cursor.next_match(&tree, |_| true).is_none());
        assert!(cursor.previous_match(&tree, |_| true).is_none());
        assert_eq!(cursor, before);

        // Another tree with the same shape is searched normally.
        let other = parse("(;C[x];C[y];C[z];C[w])").unwrap();
        let (prev, path) = cursor.previous_match(&other, |_| true).unwrap();
        assert_eq!(comment(prev), "z");
        assert_eq!(path, Path::new(2, vec![]));
    }
}
