// bdecomp - heuristic branch decompositions of graphs
// Copyright (C) 2025 - The bdecomp developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rooted branch decompositions stored as an arena of nodes
//!
//! A decomposition of a graph with `n` vertices has `2n - 1` nodes. Nodes
//! `0..n` are the leaves, node `v` holding vertex `v`; the remaining ids are
//! internal nodes. Every node stores its vertex set, the width of the cut
//! between that set and its complement, and the maximum and sum of widths
//! over its subtree, so the cost of the whole tree is read off the root.

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::ops::Range;

use crate::error::DecompError;
use crate::graph::{Graph, V};
use crate::vertex_set::VertexSet;
use crate::width::WidthFunction;

pub type NodeId = usize;

/// The side of its parent a node hangs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Branch {
    #[default]
    Left,
    Right,
}

impl Branch {
    pub fn other(self) -> Branch {
        match self {
            Branch::Left => Branch::Right,
            Branch::Right => Branch::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Breadth first, every node before its children.
    ParentFirst,
    /// Post-order, every node after its children.
    ChildrenFirst,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecompNode {
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    branch: Branch,
    set: VertexSet,
    vertex: Option<V>,
    width: f64,
    subtree_width: f64,
    subtree_sum: f64,
}

impl DecompNode {
    fn empty(n: usize) -> Self {
        DecompNode {
            parent: None,
            left: None,
            right: None,
            branch: Branch::Left,
            set: VertexSet::new(n),
            vertex: None,
            width: 0.0,
            subtree_width: 0.0,
            subtree_sum: 0.0,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    #[inline]
    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn child(&self, branch: Branch) -> Option<NodeId> {
        match branch {
            Branch::Left => self.left,
            Branch::Right => self.right,
        }
    }

    #[inline]
    pub fn branch(&self) -> Branch {
        self.branch
    }

    #[inline]
    pub fn set(&self) -> &VertexSet {
        &self.set
    }

    /// The graph vertex of a leaf.
    pub fn vertex(&self) -> Option<V> {
        self.vertex
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Width of the cut between this node's set and its complement.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn subtree_width(&self) -> f64 {
        self.subtree_width
    }

    #[inline]
    pub fn subtree_sum(&self) -> f64 {
        self.subtree_sum
    }

    /// Number of nodes below and including this one.
    pub fn subtree_size(&self) -> usize {
        (2 * self.set.count()).saturating_sub(1)
    }
}

/// A branch decomposition of `graph`, scored by `width_fn`.
///
/// Cloning copies the nodes but shares the graph and width function.
#[derive(Clone)]
pub struct DecompTree<'a> {
    graph: &'a Graph,
    width_fn: &'a WidthFunction,
    nodes: Vec<DecompNode>,
    slots: Vec<NodeId>,
    root: NodeId,
}

impl<'a> DecompTree<'a> {
    /// Allocate the nodes of a decomposition. The leaves are initialised,
    /// nothing is attached yet.
    pub fn new(graph: &'a Graph, width_fn: &'a WidthFunction) -> Result<Self, DecompError> {
        let n = graph.vertex_count();
        if n == 0 {
            return Err(DecompError::EmptyGraph);
        }
        let mut nodes = vec![DecompNode::empty(n); 2 * n - 1];
        for v in graph.vertices() {
            nodes[v].set.insert(v);
            nodes[v].vertex = Some(v);
        }
        Ok(DecompTree {
            graph,
            width_fn,
            nodes,
            slots: (0..2 * n - 1).collect(),
            root: 0,
        })
    }

    #[inline]
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    #[inline]
    pub fn width_function(&self) -> &'a WidthFunction {
        self.width_fn
    }

    /// Number of vertices of the decomposed graph.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Number of nodes, always `2n - 1`.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &DecompNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[DecompNode] {
        &self.nodes
    }

    /// The leaf holding vertex `v`.
    pub fn leaf(&self, v: V) -> NodeId {
        v
    }

    /// Ids of the internal nodes.
    pub fn internal_nodes(&self) -> Range<NodeId> {
        self.vertex_count()..self.nodes.len()
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        self.nodes[node.parent?].child(node.branch.other())
    }

    /// Maximum width over all cuts of the tree.
    pub fn width(&self) -> f64 {
        self.nodes[self.root].subtree_width
    }

    /// Width of the root's right child, whose cut is counted twice in the
    /// subtree sum.
    pub fn top_width(&self) -> f64 {
        self.nodes[self.root]
            .right
            .map_or(0.0, |right| self.nodes[right].width)
    }

    /// `width * n^2 + sum of widths - top width`. Minimising the cost
    /// minimises the width first and the total width second.
    pub fn cost(&self) -> f64 {
        let root = &self.nodes[self.root];
        self.compose_cost(root.subtree_width, root.subtree_sum, self.top_width())
    }

    pub(crate) fn compose_cost(&self, max: f64, sum: f64, top: f64) -> f64 {
        let n = self.vertex_count() as f64;
        max * n * n + sum - top
    }

    /// The node stored in slot `i`.
    ///
    /// Slots are a permutation of the node ids that callers may reorder
    /// freely, e.g. to sample nodes without replacement.
    #[inline]
    pub fn slot(&self, i: usize) -> NodeId {
        self.slots[i]
    }

    pub fn swap_slots(&mut self, i: usize, j: usize) {
        self.slots.swap(i, j);
    }

    /// Hang `child` below `parent` on the given side, or make it the root
    /// when `parent` is `None`. The root is always tagged [`Branch::Left`].
    /// Sets and widths are left untouched.
    pub fn attach(&mut self, parent: Option<NodeId>, child: NodeId, branch: Branch) {
        match parent {
            Some(p) => {
                self.set_child(p, branch, Some(child));
                self.nodes[child].parent = Some(p);
                self.nodes[child].branch = branch;
            }
            None => {
                self.nodes[child].parent = None;
                self.nodes[child].branch = Branch::Left;
                self.root = child;
            }
        }
    }

    fn set_child(&mut self, parent: NodeId, branch: Branch, child: Option<NodeId>) {
        match branch {
            Branch::Left => self.nodes[parent].left = child,
            Branch::Right => self.nodes[parent].right = child,
        }
    }

    /// Remove `parent` from the tree and put its child `kept` in its place.
    ///
    /// `parent` keeps its other child and the set of that child. With
    /// `update_sets`, the other child's vertices are also removed from the
    /// sets of all former ancestors.
    pub fn replace_by_child(&mut self, parent: NodeId, kept: NodeId, update_sets: bool) {
        debug_assert_eq!(self.nodes[kept].parent, Some(parent));
        let kept_branch = self.nodes[kept].branch;
        self.set_child(parent, kept_branch, None);
        let mut set = mem::take(&mut self.nodes[parent].set);
        set -= &self.nodes[kept].set;
        self.nodes[parent].set = set;

        let (grandparent, branch) = (self.nodes[parent].parent, self.nodes[parent].branch);
        self.attach(grandparent, kept, branch);
        self.nodes[parent].parent = None;

        if update_sets {
            let removed = self.nodes[parent].set.clone();
            let mut ancestor = grandparent;
            while let Some(a) = ancestor {
                self.nodes[a].set -= &removed;
                ancestor = self.nodes[a].parent;
            }
        }
    }

    /// Put the detached node `node`, which has at most one child, in the
    /// place of `target` and hang `target` in its free branch.
    ///
    /// With `update_sets`, the vertices of `node`'s other child are added to
    /// the sets of all new ancestors.
    pub fn insert_as_sibling(&mut self, node: NodeId, target: NodeId, update_sets: bool) {
        let (parent, branch) = (self.nodes[target].parent, self.nodes[target].branch);
        self.attach(parent, node, branch);
        let free = if self.nodes[node].left.is_none() {
            Branch::Left
        } else {
            Branch::Right
        };
        self.attach(Some(node), target, free);
        let mut set = mem::take(&mut self.nodes[node].set);
        set |= &self.nodes[target].set;
        self.nodes[node].set = set;

        if update_sets {
            if let Some(other) = self.nodes[node].child(free.other()) {
                let added = self.nodes[other].set.clone();
                let mut ancestor = parent;
                while let Some(a) = ancestor {
                    self.nodes[a].set |= &added;
                    ancestor = self.nodes[a].parent;
                }
            }
        }
    }

    /// Recompute the aggregates of one node from its children. With
    /// `sets`, first recompute its set as the union of its children's sets
    /// (leaves keep theirs) and look up its width again.
    pub fn refresh_node(&mut self, id: NodeId, sets: bool) {
        match (self.nodes[id].left, self.nodes[id].right) {
            (Some(l), Some(r)) => {
                if sets {
                    let mut set = mem::take(&mut self.nodes[id].set);
                    set.clone_from(&self.nodes[l].set);
                    set |= &self.nodes[r].set;
                    self.nodes[id].width = self.width_fn.width(self.graph, &set);
                    self.nodes[id].set = set;
                }
                let (left, right) = (&self.nodes[l], &self.nodes[r]);
                let subtree_width = left.subtree_width.max(right.subtree_width);
                let subtree_sum = left.subtree_sum + right.subtree_sum;
                let node = &mut self.nodes[id];
                node.subtree_width = node.width.max(subtree_width);
                node.subtree_sum = node.width + subtree_sum;
            }
            _ => {
                if sets {
                    self.nodes[id].width = self.width_fn.width(self.graph, &self.nodes[id].set);
                }
                let node = &mut self.nodes[id];
                node.subtree_width = node.width;
                node.subtree_sum = node.width;
            }
        }
    }

    /// Refresh `start` and its ancestors, stopping before `end` (or after
    /// the root when `end` is `None`).
    pub fn refresh_path(&mut self, start: Option<NodeId>, end: Option<NodeId>, sets: bool) {
        let mut current = start;
        while let Some(id) = current {
            if Some(id) == end {
                break;
            }
            self.refresh_node(id, sets);
            current = self.nodes[id].parent;
        }
    }

    /// Recompute every set, width and aggregate bottom-up. Fails with
    /// [`DecompError::NotBuilt`] unless all nodes hang below the root.
    pub fn compute_width(&mut self) -> Result<f64, DecompError> {
        let order = self.subtree(self.root, Traversal::ChildrenFirst);
        let complete = self.nodes[self.root].parent.is_none()
            && order.len() == self.nodes.len()
            && order.iter().all(|&id| {
                let node = &self.nodes[id];
                match (node.left, node.right) {
                    (Some(_), Some(_)) => true,
                    (None, None) => node.vertex.is_some(),
                    _ => false,
                }
            });
        if !complete {
            return Err(DecompError::NotBuilt);
        }
        for id in order {
            self.refresh_node(id, true);
        }
        Ok(self.width())
    }

    /// All nodes of the subtree below `id`, including `id`.
    pub fn subtree(&self, id: NodeId, traversal: Traversal) -> Vec<NodeId> {
        let mut result = Vec::new();
        match traversal {
            Traversal::ParentFirst => {
                let mut queue = VecDeque::from([id]);
                while let Some(node) = queue.pop_front() {
                    result.push(node);
                    queue.extend(self.nodes[node].left);
                    queue.extend(self.nodes[node].right);
                }
            }
            Traversal::ChildrenFirst => {
                let mut stack = vec![(id, false)];
                while let Some((node, expanded)) = stack.pop() {
                    if expanded {
                        result.push(node);
                        continue;
                    }
                    stack.push((node, true));
                    stack.extend(self.nodes[node].right.map(|r| (r, false)));
                    stack.extend(self.nodes[node].left.map(|l| (l, false)));
                }
            }
        }
        result
    }

    /// The vertices of the leaves from left to right.
    pub fn leaves_in_order(&self) -> Vec<V> {
        self.subtree(self.root, Traversal::ChildrenFirst)
            .into_iter()
            .filter_map(|id| self.nodes[id].vertex)
            .collect()
    }

    /// Post-order position of a node: the nodes of a subtree occupy a
    /// contiguous range, left subtree first, and the subtree root comes last.
    pub fn position(&self, id: NodeId) -> usize {
        let mut start = 0;
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[current].branch == Branch::Right {
                if let Some(left) = self.nodes[parent].left {
                    start += self.nodes[left].subtree_size();
                }
            }
            current = parent;
        }
        (start + self.nodes[id].subtree_size()).saturating_sub(1)
    }

    /// The node at a post-order position, found in `O(depth)`.
    pub fn find(&self, position: usize) -> Option<NodeId> {
        let mut node = self.root;
        let mut start = 0;
        if position >= self.nodes[node].subtree_size() {
            return None;
        }
        loop {
            let current = &self.nodes[node];
            if position + 1 == start + current.subtree_size() {
                return Some(node);
            }
            let (left, right) = (current.left?, current.right?);
            let left_size = self.nodes[left].subtree_size();
            if position < start + left_size {
                node = left;
            } else {
                start += left_size;
                node = right;
            }
        }
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Whether `node` lies in the subtree of `ancestor`.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.nodes[ancestor].set.is_superset(&self.nodes[node].set)
    }

    /// The deepest node whose subtree holds both `a` and `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let (mut a, mut b) = (a, b);
        let (mut depth_a, mut depth_b) = (self.depth(a), self.depth(b));
        while depth_a > depth_b {
            a = self.nodes[a].parent.unwrap_or(a);
            depth_a -= 1;
        }
        while depth_b > depth_a {
            b = self.nodes[b].parent.unwrap_or(b);
            depth_b -= 1;
        }
        while a != b {
            match (self.nodes[a].parent, self.nodes[b].parent) {
                (Some(pa), Some(pb)) => {
                    a = pa;
                    b = pb;
                }
                _ => break,
            }
        }
        a
    }

    /// The tree as nested pairs of vertex names, e.g. `((a, b), c)`.
    pub fn structure(&self) -> String {
        let mut stack: Vec<String> = Vec::new();
        for id in self.subtree(self.root, Traversal::ChildrenFirst) {
            match self.nodes[id].vertex {
                Some(v) => stack.push(self.graph.name(v).to_string()),
                None => {
                    let right = stack.pop().unwrap_or_default();
                    let left = stack.pop().unwrap_or_default();
                    stack.push(format!("({}, {})", left, right));
                }
            }
        }
        stack.pop().unwrap_or_default()
    }

    /// Check every structural and numeric invariant of the tree against a
    /// fresh evaluation of the width function.
    pub fn is_consistent(&self) -> bool {
        let order = self.subtree(self.root, Traversal::ChildrenFirst);
        order.len() == self.nodes.len()
            && self.nodes[self.root].parent.is_none()
            && self.nodes[self.root].set == self.graph.all_vertices()
            && order.iter().all(|&id| self.node_is_consistent(id))
    }

    fn node_is_consistent(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        if node.width != self.width_fn.width(self.graph, &node.set) {
            return false;
        }
        match (node.left, node.right) {
            (None, None) => {
                node.vertex
                    .is_some_and(|v| node.set == VertexSet::singleton(self.vertex_count(), v))
                    && node.subtree_width == node.width
                    && node.subtree_sum == node.width
            }
            (Some(l), Some(r)) => {
                let (left, right) = (&self.nodes[l], &self.nodes[r]);
                left.parent == Some(id)
                    && right.parent == Some(id)
                    && left.branch == Branch::Left
                    && right.branch == Branch::Right
                    && !left.set.intersects(&right.set)
                    && node.set == &left.set | &right.set
                    && node.subtree_width
                        == node.width.max(left.subtree_width.max(right.subtree_width))
                    && node.subtree_sum == node.width + (left.subtree_sum + right.subtree_sum)
            }
            _ => false,
        }
    }
}

impl fmt::Display for DecompTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.structure())
    }
}

impl fmt::Debug for DecompTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecompTree")
            .field("nodes", &self.nodes.len())
            .field("width", &self.width())
            .field("cost", &self.cost())
            .field("structure", &self.structure())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::path;
    use crate::width::WidthParameter;
    use rstest::{fixture, rstest};

    /// Builds `((0, 1), (2, 3))` over the path 0 - 1 - 2 - 3.
    fn balanced<'a>(graph: &'a Graph, f: &'a WidthFunction) -> DecompTree<'a> {
        let mut tree = DecompTree::new(graph, f).unwrap();
        tree.attach(None, 6, Branch::Left);
        tree.attach(Some(6), 4, Branch::Left);
        tree.attach(Some(6), 5, Branch::Right);
        tree.attach(Some(4), 0, Branch::Left);
        tree.attach(Some(4), 1, Branch::Right);
        tree.attach(Some(5), 2, Branch::Left);
        tree.attach(Some(5), 3, Branch::Right);
        tree.compute_width().unwrap();
        tree
    }

    #[fixture]
    fn p4() -> Graph {
        path(4)
    }

    #[rstest]
    fn widths_and_cost(p4: Graph) {
        let f = WidthFunction::new(WidthParameter::Rank);
        let tree = balanced(&p4, &f);
        assert!(tree.is_consistent());
        assert_eq!(tree.width(), 1.0);
        assert_eq!(tree.node(6).subtree_sum(), 6.0);
        assert_eq!(tree.top_width(), 1.0);
        assert_eq!(tree.cost(), 21.0);
        assert_eq!(tree.structure(), "((0, 1), (2, 3))");
        assert_eq!(tree.leaves_in_order(), vec![0, 1, 2, 3]);
    }

    #[rstest]
    fn positions_are_post_order(p4: Graph) {
        let f = WidthFunction::new(WidthParameter::Rank);
        let tree = balanced(&p4, &f);
        let order = tree.subtree(tree.root(), Traversal::ChildrenFirst);
        assert_eq!(order, vec![0, 1, 4, 2, 3, 5, 6]);
        for (i, &id) in order.iter().enumerate() {
            assert_eq!(tree.position(id), i);
            assert_eq!(tree.find(i), Some(id));
        }
        assert_eq!(tree.find(7), None);
        assert_eq!(
            tree.subtree(tree.root(), Traversal::ParentFirst),
            vec![6, 4, 5, 0, 1, 2, 3]
        );
    }

    #[rstest]
    fn relatives(p4: Graph) {
        let f = WidthFunction::new(WidthParameter::Rank);
        let tree = balanced(&p4, &f);
        assert_eq!(tree.sibling(4), Some(5));
        assert_eq!(tree.sibling(6), None);
        assert_eq!(tree.depth(3), 2);
        assert_eq!(tree.common_ancestor(0, 1), 4);
        assert_eq!(tree.common_ancestor(1, 3), 6);
        assert_eq!(tree.common_ancestor(0, 4), 4);
        assert!(tree.is_ancestor_or_self(5, 3));
        assert!(!tree.is_ancestor_or_self(4, 3));
    }

    #[rstest]
    fn replace_and_insert_keep_sets(p4: Graph) {
        let f = WidthFunction::new(WidthParameter::Rank);
        let mut tree = balanced(&p4, &f);
        // Move leaf 0 next to leaf 3.
        tree.replace_by_child(4, 1, true);
        assert_eq!(tree.node(6).set().iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(tree.parent(1), Some(6));
        tree.insert_as_sibling(4, 3, true);
        assert_eq!(tree.node(4).set().iter().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(tree.node(5).set().iter().collect::<Vec<_>>(), vec![0, 2, 3]);
        tree.refresh_path(Some(4), None, true);
        assert_eq!(tree.structure(), "(1, (2, (0, 3)))");
        assert!(tree.is_consistent());
    }

    #[rstest]
    fn clone_is_independent(p4: Graph) {
        let f = WidthFunction::new(WidthParameter::Rank);
        let tree = balanced(&p4, &f);
        let mut copy = tree.clone();
        copy.replace_by_child(5, 2, false);
        copy.insert_as_sibling(5, 0, false);
        copy.compute_width().unwrap();
        assert_eq!(tree.structure(), "((0, 1), (2, 3))");
        assert_eq!(copy.structure(), "(((0, 3), 1), 2)");
        assert!(copy.is_consistent());
    }

    #[rstest]
    fn incomplete_tree_is_rejected(p4: Graph) {
        let f = WidthFunction::new(WidthParameter::Rank);
        let mut tree = DecompTree::new(&p4, &f).unwrap();
        tree.attach(None, 4, Branch::Left);
        tree.attach(Some(4), 0, Branch::Left);
        tree.attach(Some(4), 1, Branch::Right);
        assert_eq!(tree.compute_width(), Err(DecompError::NotBuilt));
    }

    #[test]
    fn empty_and_single_vertex_graphs() {
        let f = WidthFunction::new(WidthParameter::Boolean);
        let empty = Graph::new(0);
        assert_eq!(DecompTree::new(&empty, &f).err(), Some(DecompError::EmptyGraph));
        let single = Graph::new(1);
        let mut tree = DecompTree::new(&single, &f).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.compute_width(), Ok(0.0));
        assert_eq!(tree.cost(), 0.0);
        assert_eq!(tree.structure(), "0");
    }
}
