//! Rebuilding parent/child trees from flat records.
//!
//! Records only know their own `parent` pointer. [`Forest`] indexes them into
//! an arena (nodes addressed by position, edges as index lists) and can then
//! answer root, child, ancestor and depth queries or materialise nested
//! [`Tree`] values.
//!
//! Dangling parent pointers make a record a root. Parent cycles are broken
//! while indexing: the earliest record of each cycle (in input order) is
//! promoted to a root, so every record appears exactly once and traversal
//! always terminates.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::task::Task;

/// Anything with an id and an optional parent id.
pub trait TreeNode {
    fn node_id(&self) -> u64;
    fn parent_id(&self) -> Option<u64>;
}

/// A record with its subtree, its ancestor ids (root first) and its depth
/// (roots are depth 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tree<T> {
    #[serde(flatten)]
    pub node: T,
    pub children: Vec<Tree<T>>,
    pub ancestors: Vec<u64>,
    pub depth: usize,
}

pub type TaskTree = Tree<Task>;

impl<T> Tree<T> {
    /// Number of nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Tree::size).sum::<usize>()
    }

    /// Pre-order walk.
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a Tree<T>>) {
        out.push(self);
        for c in &self.children {
            c.walk(out);
        }
    }
}

/// Arena view over a borrowed slice of records.
pub struct Forest<'a, T> {
    nodes: &'a [T],
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    index: HashMap<u64, usize>,
}

impl<'a, T: TreeNode> Forest<'a, T> {
    /// Index `nodes`. Children keep input order.
    pub fn new(nodes: &'a [T]) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            index.entry(n.node_id()).or_insert(i);
        }

        let mut parent: Vec<Option<usize>> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                n.parent_id()
                    .and_then(|pid| index.get(&pid).copied())
                    .filter(|&p| p != i)
            })
            .collect();

        break_cycles(nodes, &mut parent);

        let mut children = vec![Vec::new(); nodes.len()];
        let mut roots = Vec::new();
        for (i, p) in parent.iter().enumerate() {
            // Duplicate ids after the first occurrence are ignored.
            if index.get(&nodes[i].node_id()) != Some(&i) {
                continue;
            }
            match p {
                Some(p) => children[*p].push(i),
                None => roots.push(i),
            }
        }

        Forest {
            nodes,
            parent,
            children,
            roots,
            index,
        }
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn node(&self, idx: usize) -> &'a T {
        &self.nodes[idx]
    }

    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    pub fn position(&self, id: u64) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Ancestor indices, root first, direct parent last.
    pub fn ancestors(&self, idx: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cur = self.parent[idx];
        while let Some(p) = cur {
            chain.push(p);
            cur = self.parent[p];
        }
        chain.reverse();
        chain
    }

    pub fn depth(&self, idx: usize) -> usize {
        let mut depth = 0;
        let mut cur = self.parent[idx];
        while let Some(p) = cur {
            depth += 1;
            cur = self.parent[p];
        }
        depth
    }
}

impl<'a, T: TreeNode + Clone> Forest<'a, T> {
    /// Materialise the subtree rooted at `idx`.
    pub fn subtree(&self, idx: usize) -> Tree<T> {
        let ancestors = self
            .ancestors(idx)
            .into_iter()
            .map(|a| self.nodes[a].node_id())
            .collect();
        self.build(idx, ancestors)
    }

    fn build(&self, idx: usize, ancestors: Vec<u64>) -> Tree<T> {
        let mut child_ancestors = ancestors.clone();
        child_ancestors.push(self.nodes[idx].node_id());
        let depth = ancestors.len();
        Tree {
            node: self.nodes[idx].clone(),
            children: self.children[idx]
                .iter()
                .map(|&c| self.build(c, child_ancestors.clone()))
                .collect(),
            ancestors,
            depth,
        }
    }

    pub fn trees(&self) -> Vec<Tree<T>> {
        self.roots.iter().map(|&r| self.subtree(r)).collect()
    }
}

fn break_cycles<T: TreeNode>(nodes: &[T], parent: &mut [Option<usize>]) {
    const NEW: u8 = 0;
    const ON_PATH: u8 = 1;
    const SETTLED: u8 = 2;

    let mut state = vec![NEW; parent.len()];
    for i in 0..parent.len() {
        let mut path = Vec::new();
        let mut cur = Some(i);
        while let Some(c) = cur {
            match state[c] {
                SETTLED => break,
                ON_PATH => {
                    let pos = path.iter().position(|&x| x == c).unwrap_or(0);
                    let breaker = path[pos..].iter().copied().min().unwrap_or(c);
                    warn!(
                        id = nodes[breaker].node_id(),
                        "parent cycle detected, treating record as a root"
                    );
                    parent[breaker] = None;
                    break;
                }
                _ => {
                    state[c] = ON_PATH;
                    path.push(c);
                    cur = parent[c];
                }
            }
        }
        for c in path {
            state[c] = SETTLED;
        }
    }
}

/// Assemble flat records into nested trees, roots in input order.
pub fn build_forest<T: TreeNode + Clone>(nodes: &[T]) -> Vec<Tree<T>> {
    Forest::new(nodes).trees()
}

/// Follow parent pointers from `node` through `all`, returning the ancestors
/// root first. Empty for roots; stops at a missing parent or a repeat.
pub fn build_ancestor_chain<T: TreeNode + Clone>(node: &T, all: &[T]) -> Vec<T> {
    let by_id: HashMap<u64, &T> = all.iter().map(|n| (n.node_id(), n)).collect();
    let mut seen = HashSet::from([node.node_id()]);
    let mut chain = Vec::new();
    let mut cur = node.parent_id();
    while let Some(pid) = cur {
        if !seen.insert(pid) {
            break;
        }
        let Some(p) = by_id.get(&pid) else {
            break;
        };
        chain.push((*p).clone());
        cur = p.parent_id();
    }
    chain.reverse();
    chain
}

/// Build a map of parent ids to their children's ids, children in input order.
pub fn build_children_map<T: TreeNode>(nodes: &[T]) -> BTreeMap<u64, Vec<u64>> {
    let mut map: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for n in nodes {
        if let Some(p) = n.parent_id() {
            map.entry(p).or_default().push(n.node_id());
        }
    }
    map
}

/// Every id reachable below `root` in `children`, `root` itself excluded.
pub fn collect_descendants(root: u64, children: &BTreeMap<u64, Vec<u64>>) -> HashSet<u64> {
    let mut out = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        for &c in children.get(&id).map(Vec::as_slice).unwrap_or_default() {
            if c != root && out.insert(c) {
                stack.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node {
        id: u64,
        parent: Option<u64>,
    }

    impl TreeNode for Node {
        fn node_id(&self) -> u64 {
            self.id
        }
        fn parent_id(&self) -> Option<u64> {
            self.parent
        }
    }

    fn n(id: u64, parent: Option<u64>) -> Node {
        Node { id, parent }
    }

    fn ids<T: TreeNode>(trees: &[Tree<T>]) -> Vec<u64> {
        trees.iter().map(|t| t.node.node_id()).collect()
    }

    #[test]
    fn test_single_root_with_children_in_input_order() {
        let nodes = vec![n(1, None), n(2, Some(1)), n(3, Some(1))];
        let forest = build_forest(&nodes);
        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(ids(&forest[0].children), vec![2, 3]);
        assert_eq!(forest[0].depth, 0);
        assert_eq!(forest[0].children[1].depth, 1);
        assert_eq!(forest[0].children[1].ancestors, vec![1]);
    }

    #[test]
    fn test_children_listed_before_parent_still_attach() {
        let nodes = vec![n(3, Some(2)), n(2, Some(1)), n(1, None)];
        let forest = build_forest(&nodes);
        assert_eq!(ids(&forest), vec![1]);
        let grandchild = &forest[0].children[0].children[0];
        assert_eq!(grandchild.node.id, 3);
        assert_eq!(grandchild.ancestors, vec![1, 2]);
        assert_eq!(grandchild.depth, 2);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let nodes = vec![n(1, None), n(2, Some(99)), n(3, Some(2))];
        let forest = build_forest(&nodes);
        assert_eq!(ids(&forest), vec![1, 2]);
        assert_eq!(ids(&forest[1].children), vec![3]);
        assert!(forest[1].ancestors.is_empty());
    }

    #[test]
    fn test_every_node_appears_once() {
        let nodes = vec![
            n(1, None),
            n(2, Some(1)),
            n(3, Some(2)),
            n(4, None),
            n(5, Some(4)),
            n(6, Some(1)),
        ];
        let forest = build_forest(&nodes);
        let total: usize = forest.iter().map(Tree::size).sum();
        assert_eq!(total, nodes.len());
    }

    #[test]
    fn test_cycle_is_broken_instead_of_looping() {
        let nodes = vec![n(1, Some(3)), n(2, Some(1)), n(3, Some(2)), n(4, Some(4))];
        let forest = build_forest(&nodes);
        assert_eq!(ids(&forest), vec![1, 4]);
        assert_eq!(forest[0].size(), 3);
        assert_eq!(forest[1].size(), 1);
    }

    #[test]
    fn test_empty_input() {
        let nodes: Vec<Node> = Vec::new();
        assert!(build_forest(&nodes).is_empty());
    }

    #[test]
    fn test_ancestor_chain_root_first() {
        let nodes = vec![n(1, None), n(2, Some(1)), n(3, Some(2)), n(4, Some(3))];
        let chain = build_ancestor_chain(&nodes[3], &nodes);
        assert_eq!(chain.iter().map(|x| x.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(build_ancestor_chain(&nodes[0], &nodes).is_empty());
    }

    #[test]
    fn test_ancestor_chain_stops_on_cycle_and_missing() {
        let cyclic = vec![n(1, Some(2)), n(2, Some(1))];
        let chain = build_ancestor_chain(&cyclic[0], &cyclic);
        assert_eq!(chain.iter().map(|x| x.id).collect::<Vec<_>>(), vec![2]);

        let dangling = vec![n(1, Some(7))];
        assert!(build_ancestor_chain(&dangling[0], &dangling).is_empty());
    }

    #[test]
    fn test_forest_queries() {
        let nodes = vec![n(10, None), n(20, Some(10)), n(30, Some(20))];
        let forest = Forest::new(&nodes);
        let leaf = forest.position(30).unwrap();
        assert_eq!(forest.depth(leaf), 2);
        assert_eq!(
            forest.ancestors(leaf).iter().map(|&i| forest.node(i).id).collect::<Vec<_>>(),
            vec![10, 20]
        );
        assert_eq!(forest.children(forest.position(10).unwrap()), &[1]);
    }

    #[test]
    fn test_children_map() {
        let nodes = vec![n(1, None), n(3, Some(1)), n(2, Some(1)), n(4, Some(2))];
        let map = build_children_map(&nodes);
        assert_eq!(map.get(&1), Some(&vec![3, 2]));
        assert_eq!(map.get(&2), Some(&vec![4]));
        assert!(map.get(&3).is_none());
    }

    #[test]
    fn test_descendants_terminate_on_cycles() {
        let nodes = vec![n(1, None), n(2, Some(1)), n(3, Some(2)), n(5, None)];
        let map = build_children_map(&nodes);
        assert_eq!(collect_descendants(1, &map), HashSet::from([2, 3]));
        assert!(collect_descendants(5, &map).is_empty());

        let cyclic = vec![n(1, Some(2)), n(2, Some(1))];
        let map = build_children_map(&cyclic);
        assert_eq!(collect_descendants(1, &map), HashSet::from([2]));
    }
}
