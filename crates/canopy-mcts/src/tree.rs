// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Search Tree
//!
//! Arena storage for the Monte Carlo search tree. Every node lives in a
//! `NodeEnvelope` next to the engine's bookkeeping: parent link, children,
//! the branch that created it, depth, cached bound, status and statistics.
//! Links are `NodeIndex` values into the arena, never references, and nodes
//! are never removed. A node that can no longer contribute is closed instead.
//!
//! ## Node lifecycle
//!
//! - A node is created `Open` with its branch list cached. Creating a node
//!   calls `TreeNode::branches` exactly once.
//! - Expansion takes the problem state and the cached branches out of the
//!   envelope. From then on only the statistics change.
//! - A node becomes `Exhausted` when it is a simulated leaf or when all of its
//!   children are closed, and `Pruned` when its bound is dominated by the
//!   incumbent. Closing a node releases its problem state and propagates
//!   exhaustion to every ancestor whose children are now all closed.
//!
//! The search is complete once the root is closed.

use crate::node::TreeNode;
use crate::stats::NodeStats;
use canopy_core::utils::index::{TypedArena, TypedIndex, TypedIndexTag};
use canopy_search::solution::Solution;
use smallvec::SmallVec;
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeTag;

impl TypedIndexTag for NodeTag {
    const NAME: &'static str = "NodeIndex";
}

/// Index of a node in the `SearchTree` arena.
pub type NodeIndex = TypedIndex<NodeTag>;

/// Child lists of typical binary and ternary branching stay inline.
type ChildList = SmallVec<[NodeIndex; 4]>;

/// Whether a node can still be selected.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum NodeStatus {
    /// The node or part of its subtree is still unexplored.
    #[default]
    Open,
    /// The node's bound is no better than the incumbent.
    Pruned,
    /// Every leaf below the node was simulated or pruned.
    Exhausted,
}

impl NodeStatus {
    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, NodeStatus::Open)
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeStatus::Open => write!(f, "Open"),
            NodeStatus::Pruned => write!(f, "Pruned"),
            NodeStatus::Exhausted => write!(f, "Exhausted"),
        }
    }
}

/// A tree node together with the engine's bookkeeping.
pub struct NodeEnvelope<N>
where
    N: TreeNode,
{
    node: Option<N>,
    parent: Option<NodeIndex>,
    branch: Option<N::Branch>,
    children: Option<ChildList>,
    pending: Vec<N::Branch>,
    is_leaf: bool,
    depth: usize,
    bound: N::Value,
    status: NodeStatus,
    stats: NodeStats<N::Value, N::Data>,
}

impl<N> NodeEnvelope<N>
where
    N: TreeNode,
{
    #[inline]
    fn new(
        node: N,
        parent: Option<NodeIndex>,
        branch: Option<N::Branch>,
        depth: usize,
        bound: N::Value,
    ) -> Self {
        let pending = node.branches();
        let is_leaf = pending.is_empty();
        Self {
            node: Some(node),
            parent,
            branch,
            children: None,
            pending,
            is_leaf,
            depth,
            bound,
            status: NodeStatus::Open,
            stats: NodeStats::default(),
        }
    }

    /// The problem state, `None` once the node was expanded or closed.
    #[inline]
    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// The branch applied to the parent to create this node, `None` for the root.
    #[inline]
    pub fn branch(&self) -> Option<&N::Branch> {
        self.branch.as_ref()
    }

    /// Children in branch order. Empty until the node is expanded.
    #[inline]
    pub fn children(&self) -> &[NodeIndex] {
        self.children.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Whether `branches` returned no choices for this node.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The cached bound, `-inf` if the bound was never computed.
    #[inline]
    pub fn bound(&self) -> N::Value {
        self.bound
    }

    #[inline]
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    #[inline]
    pub fn stats(&self) -> &NodeStats<N::Value, N::Data> {
        &self.stats
    }
}

impl<N> std::fmt::Debug for NodeEnvelope<N>
where
    N: TreeNode,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeEnvelope")
            .field("parent", &self.parent)
            .field("branch", &self.branch)
            .field("children", &self.children)
            .field("depth", &self.depth)
            .field("bound", &self.bound)
            .field("status", &self.status)
            .field("sim_count", &self.stats.sim_count())
            .finish()
    }
}

/// The Monte Carlo search tree.
pub struct SearchTree<N>
where
    N: TreeNode,
{
    nodes: TypedArena<NodeTag, NodeEnvelope<N>>,
    height: usize,
}

impl<N> SearchTree<N>
where
    N: TreeNode,
{
    /// Creates a tree consisting of `root` with the given cached bound.
    pub fn new(root: N, bound: N::Value) -> Self {
        let mut nodes = TypedArena::new();
        nodes.push(NodeEnvelope::new(root, None, None, 0, bound));
        Self { nodes, height: 0 }
    }

    #[inline(always)]
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Number of nodes ever created, closed ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a tree holds at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth of the deepest node.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&NodeEnvelope<N>> {
        self.nodes.get(index)
    }

    #[inline]
    pub fn node(&self, index: NodeIndex) -> Option<&N> {
        self.nodes[index].node()
    }

    #[inline]
    pub fn stats(&self, index: NodeIndex) -> &NodeStats<N::Value, N::Data> {
        &self.nodes[index].stats
    }

    #[inline]
    pub fn status(&self, index: NodeIndex) -> NodeStatus {
        self.nodes[index].status
    }

    #[inline]
    pub fn is_open(&self, index: NodeIndex) -> bool {
        self.nodes[index].is_open()
    }

    #[inline]
    pub fn is_expanded(&self, index: NodeIndex) -> bool {
        self.nodes[index].is_expanded()
    }

    #[inline]
    pub fn is_leaf(&self, index: NodeIndex) -> bool {
        self.nodes[index].is_leaf
    }

    #[inline]
    pub fn depth(&self, index: NodeIndex) -> usize {
        self.nodes[index].depth
    }

    #[inline]
    pub fn bound(&self, index: NodeIndex) -> N::Value {
        self.nodes[index].bound
    }

    #[inline]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes[index].parent
    }

    #[inline]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.nodes[index].children()
    }

    /// Iterates over every envelope in creation order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &NodeEnvelope<N>)> {
        self.nodes.iter()
    }

    /// Number of nodes that are still open.
    pub fn open_count(&self) -> usize {
        self.nodes.iter().filter(|(_, env)| env.is_open()).count()
    }

    /// The branch choices leading from the root to `index`.
    pub fn path(&self, index: NodeIndex) -> Vec<N::Branch> {
        let mut path = Vec::with_capacity(self.nodes[index].depth);
        let mut current = index;
        while let Some(parent) = self.nodes[current].parent {
            if let Some(branch) = &self.nodes[current].branch {
                path.push(branch.clone());
            }
            current = parent;
        }
        path.reverse();
        path
    }

    /// Takes the problem state and the cached branches out of an open,
    /// unexpanded node and marks it expanded.
    ///
    /// Returns `None` if the node was already expanded or closed.
    pub fn begin_expansion(&mut self, index: NodeIndex) -> Option<(N, Vec<N::Branch>)> {
        let envelope = &mut self.nodes[index];
        if envelope.is_expanded() || !envelope.is_open() {
            return None;
        }
        let node = envelope.node.take()?;
        let branches = std::mem::take(&mut envelope.pending);
        envelope.children = Some(ChildList::with_capacity(branches.len()));
        Some((node, branches))
    }

    /// Attaches a new open child to an expanded `parent`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `parent` has not been expanded.
    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        branch: N::Branch,
        node: N,
        bound: N::Value,
    ) -> NodeIndex {
        debug_assert!(
            self.nodes[parent].is_expanded(),
            "called `SearchTree::add_child` with unexpanded parent {}",
            parent
        );
        let depth = self.nodes[parent].depth + 1;
        let index = self
            .nodes
            .push(NodeEnvelope::new(node, Some(parent), Some(branch), depth, bound));
        if let Some(children) = self.nodes[parent].children.as_mut() {
            children.push(index);
        }
        self.height = self.height.max(depth);
        index
    }

    /// Records `solution` at `index` and at every ancestor up to the root.
    pub fn backpropagate(&mut self, index: NodeIndex, solution: &Rc<Solution<N::Value, N::Data>>) {
        let mut current = Some(index);
        while let Some(i) = current {
            let envelope = &mut self.nodes[i];
            envelope.stats.record(solution);
            current = envelope.parent;
        }
    }

    /// Closes an open node with `status` and propagates exhaustion upwards.
    ///
    /// Every open descendant is released as `NodeStatus::Pruned`, so a closed
    /// node never has open nodes below it.
    ///
    /// Returns the number of ancestors that became exhausted as a result.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `status` is `NodeStatus::Open`.
    pub fn close(&mut self, index: NodeIndex, status: NodeStatus) -> usize {
        debug_assert!(
            !status.is_open(),
            "called `SearchTree::close` with status Open for {}",
            index
        );
        if !self.nodes[index].is_open() {
            return 0;
        }
        self.release(index, status);
        self.release_descendants(index);

        let mut closed = 0;
        let mut current = self.nodes[index].parent;
        while let Some(parent) = current {
            let envelope = &self.nodes[parent];
            if !envelope.is_open() || !envelope.is_expanded() {
                break;
            }
            let all_closed = envelope
                .children()
                .iter()
                .all(|&child| !self.nodes[child].is_open());
            if !all_closed {
                break;
            }
            self.release(parent, NodeStatus::Exhausted);
            closed += 1;
            current = self.nodes[parent].parent;
        }
        closed
    }

    /// Closes an expanded node whose children are all closed, or which
    /// received no children. Returns `true` if the node was closed.
    pub fn settle(&mut self, index: NodeIndex) -> bool {
        let envelope = &self.nodes[index];
        if !envelope.is_open() || !envelope.is_expanded() {
            return false;
        }
        let all_closed = envelope
            .children()
            .iter()
            .all(|&child| !self.nodes[child].is_open());
        if all_closed {
            self.close(index, NodeStatus::Exhausted);
        }
        all_closed
    }

    /// Open nodes whose cached bound is no better than `cutoff`.
    ///
    /// The walk starts at the root and does not descend below a reported
    /// node, so no reported node is an ancestor of another.
    pub fn dominated(&self, cutoff: N::Value) -> Vec<NodeIndex> {
        let mut dominated = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(index) = stack.pop() {
            let envelope = &self.nodes[index];
            if !envelope.is_open() {
                continue;
            }
            if envelope.bound >= cutoff {
                dominated.push(index);
            } else {
                stack.extend(envelope.children().iter().rev().copied());
            }
        }
        dominated
    }

    #[inline]
    fn release_descendants(&mut self, index: NodeIndex) {
        let mut stack = self.nodes[index].children().to_vec();
        while let Some(current) = stack.pop() {
            if !self.nodes[current].is_open() {
                continue;
            }
            self.release(current, NodeStatus::Pruned);
            stack.extend_from_slice(self.nodes[current].children());
        }
    }

    fn release(&mut self, index: NodeIndex, status: NodeStatus) {
        let envelope = &mut self.nodes[index];
        envelope.status = status;
        envelope.node = None;
        envelope.pending = Vec::new();
    }
}

impl<N> std::fmt::Debug for SearchTree<N>
where
    N: TreeNode,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTree")
            .field("len", &self.len())
            .field("height", &self.height)
            .field("root", &self.nodes[self.root()])
            .finish()
    }
}

impl<N> std::fmt::Display for SearchTree<N>
where
    N: TreeNode,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchTree(nodes: {}, open: {}, height: {}, root: {})",
            self.len(),
            self.open_count(),
            self.height,
            self.status(self.root())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// Binary strings of a fixed length; the value is the number of ones.
    #[derive(Debug, Clone, PartialEq)]
    struct Bits {
        len: usize,
        bits: Vec<bool>,
    }

    impl TreeNode for Bits {
        type Instance = usize;
        type Branch = bool;
        type Value = f64;
        type Data = ();

        fn root(len: usize) -> Self {
            Bits {
                len,
                bits: Vec::new(),
            }
        }

        fn copy(&self) -> Self {
            self.clone()
        }

        fn branches(&self) -> Vec<bool> {
            if self.bits.len() < self.len {
                vec![false, true]
            } else {
                Vec::new()
            }
        }

        fn apply(&mut self, branch: &bool) {
            self.bits.push(*branch);
        }

        fn simulate<R>(&self, _rng: &mut R) -> Solution<f64>
        where
            R: Rng + ?Sized,
        {
            Solution::feasible(self.bits.iter().filter(|&&b| b).count() as f64)
        }

        fn bound(&self) -> f64 {
            self.bits.iter().filter(|&&b| b).count() as f64
        }
    }

    fn expand_all(tree: &mut SearchTree<Bits>, index: NodeIndex) -> Vec<NodeIndex> {
        let (node, branches) = tree.begin_expansion(index).unwrap();
        branches
            .into_iter()
            .map(|branch| {
                let mut child = node.copy();
                child.apply(&branch);
                let bound = child.bound();
                tree.add_child(index, branch, child, bound)
            })
            .collect()
    }

    #[test]
    fn test_new_tree_has_open_root() {
        let tree = SearchTree::new(Bits::root(2), f64::NEG_INFINITY);
        let root = tree.root();
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert!(tree.is_open(root));
        assert!(!tree.is_expanded(root));
        assert!(!tree.is_leaf(root));
        assert_eq!(tree.depth(root), 0);
        assert!(tree.parent(root).is_none());
        assert!(tree.path(root).is_empty());
    }

    #[test]
    fn test_expansion_attaches_children_in_branch_order() {
        let mut tree = SearchTree::new(Bits::root(2), 0.0);
        let root = tree.root();
        let children = expand_all(&mut tree, root);

        assert_eq!(tree.children(root), children.as_slice());
        assert!(tree.node(root).is_none());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.get(children[0]).unwrap().branch(), Some(&false));
        assert_eq!(tree.get(children[1]).unwrap().branch(), Some(&true));
        assert_eq!(tree.bound(children[1]), 1.0);
        assert!(tree.begin_expansion(root).is_none());
    }

    #[test]
    fn test_path_follows_branches_from_root() {
        let mut tree = SearchTree::new(Bits::root(3), 0.0);
        let root = tree.root();
        let first = expand_all(&mut tree, root);
        let second = expand_all(&mut tree, first[1]);
        let third = expand_all(&mut tree, second[0]);

        assert_eq!(tree.path(third[1]), vec![true, false, true]);
        assert_eq!(tree.depth(third[1]), 3);
        assert_eq!(tree.node(third[1]).unwrap().bits, vec![true, false, true]);
        assert!(tree.is_leaf(third[1]));
    }

    #[test]
    fn test_backpropagate_updates_every_ancestor() {
        let mut tree = SearchTree::new(Bits::root(2), 0.0);
        let root = tree.root();
        let first = expand_all(&mut tree, root);
        let second = expand_all(&mut tree, first[0]);

        tree.backpropagate(second[1], &Rc::new(Solution::feasible(1.0)));
        tree.backpropagate(first[1], &Rc::new(Solution::feasible(2.0)));

        assert_eq!(tree.stats(root).sim_count(), 2);
        assert_eq!(tree.stats(first[0]).sim_count(), 1);
        assert_eq!(tree.stats(second[1]).sim_count(), 1);
        assert_eq!(tree.stats(second[0]).sim_count(), 0);
        assert_eq!(tree.stats(root).sim_best().map(|s| s.value()), Some(1.0));
        assert_eq!(tree.stats(root).sim_sol().map(|s| s.value()), Some(2.0));
    }

    #[test]
    fn test_closing_all_children_exhausts_ancestors() {
        let mut tree = SearchTree::new(Bits::root(2), 0.0);
        let root = tree.root();
        let first = expand_all(&mut tree, root);
        let second = expand_all(&mut tree, first[0]);

        assert_eq!(tree.close(second[0], NodeStatus::Exhausted), 0);
        assert!(tree.is_open(first[0]));
        assert_eq!(tree.close(second[1], NodeStatus::Pruned), 1);
        assert_eq!(tree.status(first[0]), NodeStatus::Exhausted);
        assert!(tree.is_open(root));

        assert_eq!(tree.close(first[1], NodeStatus::Pruned), 1);
        assert_eq!(tree.status(root), NodeStatus::Exhausted);
        assert_eq!(tree.open_count(), 0);
    }

    #[test]
    fn test_closing_releases_open_descendants() {
        let mut tree = SearchTree::new(Bits::root(3), 0.0);
        let root = tree.root();
        let first = expand_all(&mut tree, root);
        let second = expand_all(&mut tree, first[0]);
        let third = expand_all(&mut tree, second[1]);
        tree.close(third[0], NodeStatus::Exhausted);

        assert_eq!(tree.close(first[0], NodeStatus::Pruned), 0);
        for &index in second.iter().chain(third.iter()) {
            assert!(!tree.is_open(index));
            assert!(tree.node(index).is_none());
        }
        assert_eq!(tree.status(second[0]), NodeStatus::Pruned);
        assert_eq!(tree.status(third[0]), NodeStatus::Exhausted);
        assert_eq!(tree.status(third[1]), NodeStatus::Pruned);
        assert!(tree.is_open(first[1]));
        assert_eq!(tree.open_count(), 2);
        assert_eq!(tree.dominated(f64::NEG_INFINITY), vec![root]);
    }

    #[test]
    fn test_closing_a_closed_node_is_a_no_op() {
        let mut tree = SearchTree::new(Bits::root(1), 0.0);
        let root = tree.root();
        let children = expand_all(&mut tree, root);
        tree.close(children[0], NodeStatus::Pruned);
        assert_eq!(tree.close(children[0], NodeStatus::Exhausted), 0);
        assert_eq!(tree.status(children[0]), NodeStatus::Pruned);
        assert!(tree.node(children[0]).is_none());
    }

    #[test]
    fn test_settle_closes_childless_expanded_node() {
        let mut tree = SearchTree::new(Bits::root(0), 0.0);
        let root = tree.root();
        assert!(!tree.settle(root));
        let (_, branches) = tree.begin_expansion(root).unwrap();
        assert!(branches.is_empty());
        assert!(tree.settle(root));
        assert_eq!(tree.status(root), NodeStatus::Exhausted);
    }

    #[test]
    fn test_dominated_skips_subtrees_of_reported_nodes() {
        let mut tree = SearchTree::new(Bits::root(3), 0.0);
        let root = tree.root();
        let first = expand_all(&mut tree, root);
        let _below_one = expand_all(&mut tree, first[1]);
        let below_zero = expand_all(&mut tree, first[0]);

        // Bounds: first = [0, 1], below_zero = [0, 1]
        assert_eq!(tree.dominated(1.0), vec![below_zero[1], first[1]]);
        assert_eq!(tree.dominated(0.0), vec![root]);

        tree.close(below_zero[1], NodeStatus::Pruned);
        assert_eq!(tree.dominated(1.0), vec![first[1]]);
    }

    #[test]
    fn test_display() {
        let tree = SearchTree::new(Bits::root(1), 0.0);
        assert_eq!(
            tree.to_string(),
            "SearchTree(nodes: 1, open: 1, height: 0, root: Open)"
        );
    }
}
