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

//! Reversible edits of a decomposition tree
//!
//! Every operation can predict the cost of the tree it would produce
//! without touching the tree. Only the nodes whose sets change have their
//! widths looked up; the aggregates of every other subtree are reused.

use crate::decomp_tree::{DecompTree, NodeId};
use crate::error::DecompError;
use crate::vertex_set::VertexSet;

/// A local search step on a [`DecompTree`].
///
/// The cost of the resulting tree is computed lazily and remembered.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Leave the tree as it is.
    Identity { cost: f64 },
    Move { op: MoveOp, cost: Option<f64> },
    Swap { op: SwapOp, cost: Option<f64> },
}

impl From<MoveOp> for Operation {
    fn from(op: MoveOp) -> Self {
        Operation::Move { op, cost: None }
    }
}

impl From<SwapOp> for Operation {
    fn from(op: SwapOp) -> Self {
        Operation::Swap { op, cost: None }
    }
}

impl Operation {
    /// The identity at the tree's current cost.
    pub fn identity(tree: &DecompTree) -> Self {
        Operation::Identity { cost: tree.cost() }
    }

    /// The cost of the tree after this operation, if already known.
    pub fn known_cost(&self) -> Option<f64> {
        match self {
            Operation::Identity { cost } => Some(*cost),
            Operation::Move { cost, .. } | Operation::Swap { cost, .. } => *cost,
        }
    }

    /// Cost of the tree after this operation, predicted incrementally on the
    /// untouched tree.
    pub fn cost(&mut self, tree: &DecompTree) -> f64 {
        match self {
            Operation::Identity { cost } => *cost,
            Operation::Move { op, cost } => *cost.get_or_insert_with(|| op.predict_cost(tree)),
            Operation::Swap { op, cost } => *cost.get_or_insert_with(|| op.predict_cost(tree)),
        }
    }

    /// Apply the operation and return the new cost of the tree.
    pub fn execute(&mut self, tree: &mut DecompTree) -> f64 {
        match self {
            Operation::Identity { .. } => {}
            Operation::Move { op, .. } => op.apply(tree),
            Operation::Swap { op, .. } => op.apply(tree),
        }
        let actual = tree.cost();
        if let Some(predicted) = self.known_cost() {
            debug_assert!(
                (predicted - actual).abs() <= 1e-6 * actual.abs().max(1.0),
                "predicted cost {} of {:?} differs from {}",
                predicted,
                self,
                actual
            );
        }
        match self {
            Operation::Identity { cost } => *cost = actual,
            Operation::Move { cost, .. } | Operation::Swap { cost, .. } => *cost = Some(actual),
        }
        actual
    }

    /// Undo a previous [`execute`](Self::execute). The tree must be in the
    /// state the execution left it in.
    pub fn revert(&self, tree: &mut DecompTree) {
        match self {
            Operation::Identity { .. } => {}
            Operation::Move { op, .. } => op.undo(tree),
            Operation::Swap { op, .. } => op.apply(tree),
        }
    }

    /// Cost after the operation, by executing and reverting it.
    pub fn brute_force_cost(&self, tree: &mut DecompTree) -> f64 {
        match self {
            Operation::Identity { .. } => tree.cost(),
            Operation::Move { op, .. } => {
                op.apply(tree);
                let cost = tree.cost();
                op.undo(tree);
                cost
            }
            Operation::Swap { op, .. } => {
                op.apply(tree);
                let cost = tree.cost();
                op.apply(tree);
                cost
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveKind {
    /// The target lies outside the subtree of the moved node's parent.
    Unrelated,
    /// The target is a proper ancestor of the moved node's parent.
    IntoAncestor,
    /// The target lies strictly inside the subtree of the moved node's sibling.
    IntoSiblingSubtree,
}

impl MoveKind {
    fn reversed(self) -> Self {
        match self {
            MoveKind::Unrelated => MoveKind::Unrelated,
            MoveKind::IntoAncestor => MoveKind::IntoSiblingSubtree,
            MoveKind::IntoSiblingSubtree => MoveKind::IntoAncestor,
        }
    }
}

/// Prune the subtree of `node` and regraft it as the sibling of `target`.
///
/// The old parent of `node` is spliced out, its other child taking its
/// place, and reinserted as the new parent of `node` and `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOp {
    node: NodeId,
    parent: NodeId,
    sibling: NodeId,
    target: NodeId,
    kind: MoveKind,
}

impl MoveOp {
    /// Fails unless `node` has a parent and `target` is neither in the
    /// subtree of `node` nor its parent or sibling.
    pub fn new(tree: &DecompTree, node: NodeId, target: NodeId) -> Result<Self, DecompError> {
        let invalid = DecompError::InvalidMove { node, target };
        if node >= tree.len() || target >= tree.len() {
            return Err(invalid);
        }
        let (Some(parent), Some(sibling)) = (tree.parent(node), tree.sibling(node)) else {
            return Err(invalid);
        };
        if target == parent || target == sibling || tree.is_ancestor_or_self(node, target) {
            return Err(invalid);
        }
        let kind = if tree.is_ancestor_or_self(target, node) {
            MoveKind::IntoAncestor
        } else if tree.is_ancestor_or_self(sibling, target) {
            MoveKind::IntoSiblingSubtree
        } else {
            MoveKind::Unrelated
        };
        Ok(MoveOp {
            node,
            parent,
            sibling,
            target,
            kind,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    fn apply(&self, tree: &mut DecompTree) {
        relocate(tree, self.parent, self.sibling, self.target, self.kind);
    }

    fn undo(&self, tree: &mut DecompTree) {
        relocate(tree, self.parent, self.target, self.sibling, self.kind.reversed());
    }

    fn predict_cost(&self, tree: &DecompTree) -> f64 {
        let &MoveOp {
            node: x,
            parent: p,
            sibling: s,
            target: y,
            kind,
        } = self;
        let moved = tree.node(x).set();
        let widths = Widths(tree);

        match kind {
            MoveKind::Unrelated => {
                let c = tree.common_ancestor(p, y);
                let old_side =
                    climb(tree, p, Some(c), Aggregate::of(tree, s), Delta::remove(moved));
                let new_parent = Aggregate::of(tree, x)
                    .join(Aggregate::of(tree, y), widths.of(&(moved | tree.node(y).set())));
                let new_side = climb(tree, y, Some(c), new_parent, Delta::add(moved));
                let top = old_side.join(new_side, tree.node(c).width());
                let total = climb(tree, c, None, top, Delta::NONE);

                let top_width = match tree.node(c).right() {
                    Some(right) if c == tree.root() => {
                        if tree.is_ancestor_or_self(right, p) {
                            widths.of(&(tree.node(right).set() - moved))
                        } else {
                            widths.of(&(tree.node(right).set() | moved))
                        }
                    }
                    _ => tree.top_width(),
                };
                tree.compose_cost(total.max, total.sum, top_width)
            }
            MoveKind::IntoAncestor => {
                let shrunk = climb(
                    tree,
                    p,
                    tree.parent(y),
                    Aggregate::of(tree, s),
                    Delta::remove(moved),
                );
                let new_parent = shrunk.join(Aggregate::of(tree, x), tree.node(y).width());
                let total = climb(tree, y, None, new_parent, Delta::NONE);
                let top_width = if y == tree.root() {
                    tree.node(x).width()
                } else {
                    tree.top_width()
                };
                tree.compose_cost(total.max, total.sum, top_width)
            }
            MoveKind::IntoSiblingSubtree => {
                let new_parent = Aggregate::of(tree, x)
                    .join(Aggregate::of(tree, y), widths.of(&(moved | tree.node(y).set())));
                let grown = climb(tree, y, Some(p), new_parent, Delta::add(moved));
                let total = climb(tree, p, None, grown, Delta::NONE);
                let top_width = if p == tree.root() {
                    let sibling = tree.node(s);
                    let other = match (sibling.left(), sibling.right()) {
                        (Some(l), Some(r)) if tree.is_ancestor_or_self(l, y) => r,
                        (Some(l), _) => l,
                        _ => s,
                    };
                    tree.node(other).width()
                } else {
                    tree.top_width()
                };
                tree.compose_cost(total.max, total.sum, top_width)
            }
        }
    }
}

/// Splice `parent` out above `sibling` and back in above `target`, then
/// refresh exactly the nodes whose sets or aggregates changed.
fn relocate(
    tree: &mut DecompTree,
    parent: NodeId,
    sibling: NodeId,
    target: NodeId,
    kind: MoveKind,
) {
    let common = match kind {
        MoveKind::Unrelated => Some(tree.common_ancestor(parent, target)),
        _ => None,
    };
    let grandparent = tree.parent(parent);
    tree.replace_by_child(parent, sibling, false);
    tree.insert_as_sibling(parent, target, false);

    match kind {
        MoveKind::Unrelated => {
            tree.refresh_path(grandparent, common, true);
            tree.refresh_path(Some(parent), common, true);
            tree.refresh_path(common, None, false);
        }
        MoveKind::IntoAncestor => {
            // Everything from the old grandparent up to the new parent.
            let above = tree.parent(parent);
            tree.refresh_path(grandparent, above, true);
            tree.refresh_path(above, None, false);
        }
        MoveKind::IntoSiblingSubtree => {
            let above = tree.parent(sibling);
            tree.refresh_path(Some(parent), above, true);
            tree.refresh_path(above, None, false);
        }
    }
}

/// Exchange the subtrees of two nodes, neither of which contains the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOp {
    first: NodeId,
    second: NodeId,
}

impl SwapOp {
    pub fn new(tree: &DecompTree, first: NodeId, second: NodeId) -> Result<Self, DecompError> {
        let invalid = DecompError::InvalidSwap { first, second };
        if first >= tree.len() || second >= tree.len() || first == second {
            return Err(invalid);
        }
        if tree.parent(first).is_none()
            || tree.parent(second).is_none()
            || tree.sibling(first) == Some(second)
            || tree.is_ancestor_or_self(first, second)
            || tree.is_ancestor_or_self(second, first)
        {
            return Err(invalid);
        }
        Ok(SwapOp { first, second })
    }

    pub fn nodes(&self) -> (NodeId, NodeId) {
        (self.first, self.second)
    }

    /// Swapping is its own inverse.
    fn apply(&self, tree: &mut DecompTree) {
        let (a, b) = (self.first, self.second);
        let common = tree.common_ancestor(a, b);
        let (parent_a, branch_a) = (tree.parent(a), tree.node(a).branch());
        let (parent_b, branch_b) = (tree.parent(b), tree.node(b).branch());
        tree.attach(parent_a, b, branch_a);
        tree.attach(parent_b, a, branch_b);
        tree.refresh_path(parent_a, Some(common), true);
        tree.refresh_path(parent_b, Some(common), true);
        tree.refresh_path(Some(common), None, false);
    }

    fn predict_cost(&self, tree: &DecompTree) -> f64 {
        let (a, b) = (self.first, self.second);
        let (set_a, set_b) = (tree.node(a).set(), tree.node(b).set());
        let c = tree.common_ancestor(a, b);
        let side_a = climb(tree, a, Some(c), Aggregate::of(tree, b), Delta::replace(set_b, set_a));
        let side_b = climb(tree, b, Some(c), Aggregate::of(tree, a), Delta::replace(set_a, set_b));
        let joined = side_a.join(side_b, tree.node(c).width());
        let total = climb(tree, c, None, joined, Delta::NONE);

        let top_width = match tree.node(c).right() {
            Some(right) if c == tree.root() => {
                let (add, remove) = if tree.is_ancestor_or_self(right, a) {
                    (set_b, set_a)
                } else {
                    (set_a, set_b)
                };
                let mut set = tree.node(right).set() - remove;
                set |= add;
                Widths(tree).of(&set)
            }
            _ => tree.top_width(),
        };
        tree.compose_cost(total.max, total.sum, top_width)
    }
}

/// Maximum and sum of the widths in a subtree.
#[derive(Debug, Clone, Copy)]
struct Aggregate {
    max: f64,
    sum: f64,
}

impl Aggregate {
    fn of(tree: &DecompTree, id: NodeId) -> Self {
        let node = tree.node(id);
        Aggregate {
            max: node.subtree_width(),
            sum: node.subtree_sum(),
        }
    }

    /// The aggregate of a node of width `width` with children `self` and `other`.
    fn join(self, other: Aggregate, width: f64) -> Self {
        Aggregate {
            max: width.max(self.max.max(other.max)),
            sum: width + (self.sum + other.sum),
        }
    }
}

/// Change applied to the sets of the ancestors passed by [`climb`].
#[derive(Clone, Copy)]
struct Delta<'s> {
    add: Option<&'s VertexSet>,
    remove: Option<&'s VertexSet>,
}

impl<'s> Delta<'s> {
    const NONE: Delta<'static> = Delta {
        add: None,
        remove: None,
    };

    fn add(set: &'s VertexSet) -> Self {
        Delta {
            add: Some(set),
            remove: None,
        }
    }

    fn remove(set: &'s VertexSet) -> Self {
        Delta {
            add: None,
            remove: Some(set),
        }
    }

    fn replace(add: &'s VertexSet, remove: &'s VertexSet) -> Self {
        Delta {
            add: Some(add),
            remove: Some(remove),
        }
    }
}

#[derive(Clone, Copy)]
struct Widths<'t, 'a>(&'t DecompTree<'a>);

impl Widths<'_, '_> {
    fn of(&self, set: &VertexSet) -> f64 {
        self.0.width_function().width(self.0.graph(), set)
    }
}

/// Aggregate at the top of the path from `child` up to, excluding, `end`,
/// given that `child`'s subtree is replaced by one with aggregate `acc` and
/// the set of every ancestor on the way changes by `delta`.
fn climb(
    tree: &DecompTree,
    child: NodeId,
    end: Option<NodeId>,
    acc: Aggregate,
    delta: Delta,
) -> Aggregate {
    let widths = Widths(tree);
    let (mut child, mut acc) = (child, acc);
    while let Some(ancestor) = tree.parent(child) {
        if Some(ancestor) == end {
            break;
        }
        let node = tree.node(ancestor);
        let width = if delta.add.is_none() && delta.remove.is_none() {
            node.width()
        } else {
            let mut set = node.set().clone();
            if let Some(remove) = delta.remove {
                set -= remove;
            }
            if let Some(add) = delta.add {
                set |= add;
            }
            widths.of(&set)
        };
        let sibling = tree
            .sibling(child)
            .map_or(Aggregate { max: 0.0, sum: 0.0 }, |s| Aggregate::of(tree, s));
        acc = acc.join(sibling, width);
        child = ancestor;
    }
    acc
}
