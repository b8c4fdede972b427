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

//! Neighbourhoods of a decomposition tree

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::operation::{MoveOp, Operation, SwapOp};
use crate::decomp_tree::{Branch, DecompTree, NodeId, Traversal};
use crate::error::DecompError;

/// A family of [`Operation`]s.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    /// Regraft a subtree next to another node.
    #[display("move")]
    Move,
    /// Exchange two disjoint subtrees.
    #[display("swap")]
    Swap,
}

impl Operator {
    /// Enumerate every operation of this family on `tree`, in random order.
    pub fn neighborhood(self, tree: &DecompTree) -> Neighborhood {
        let order = tree.subtree(tree.root(), Traversal::ParentFirst);
        let candidates: Vec<Candidate> = match self {
            Operator::Move => order
                .iter()
                .map(|&node| Candidate::new(node, move_count(tree, node)))
                .collect(),
            Operator::Swap => {
                // Size of the right subtrees hanging off the path to each
                // node where the path turns left.
                let mut inherited = vec![0; tree.len()];
                order
                    .iter()
                    .map(|&node| {
                        let Some(parent) = tree.parent(node) else {
                            return Candidate::new(node, 0);
                        };
                        let mut own = inherited[parent];
                        let mut count = own;
                        if tree.node(node).branch() == Branch::Left {
                            if let Some(right) = tree.node(parent).right() {
                                own += tree.node(right).subtree_size();
                                count = own - 1;
                            }
                        }
                        inherited[node] = own;
                        Candidate::new(node, count)
                    })
                    .collect()
            }
        };
        let remaining = candidates.iter().map(|c| c.count).sum();
        Neighborhood {
            operator: self,
            candidates,
            remaining,
        }
    }

    /// A uniformly random operation of this family.
    ///
    /// Fails with [`DecompError::NoCandidate`] when the tree has no
    /// neighbour, which is always the case below four nodes.
    pub fn random_operation(
        self,
        tree: &mut DecompTree,
        rng: &mut impl Rng,
    ) -> Result<Operation, DecompError> {
        let no_candidate = DecompError::NoCandidate { nodes: tree.len() };
        if tree.len() <= 3 {
            return Err(no_candidate);
        }
        match self {
            Operator::Move => random_move(tree, rng),
            Operator::Swap => self
                .neighborhood(tree)
                .next_operation(tree, rng)
                .ok_or(no_candidate),
        }
    }
}

/// Number of targets `node` can be moved next to.
fn move_count(tree: &DecompTree, node: NodeId) -> usize {
    if tree.parent(node).is_none() {
        return 0;
    }
    let outside = tree.vertex_count() - tree.node(node).set().count();
    (2 * outside).saturating_sub(2)
}

fn move_targets(tree: &DecompTree, node: NodeId) -> Vec<NodeId> {
    let (Some(parent), Some(sibling)) = (tree.parent(node), tree.sibling(node)) else {
        return Vec::new();
    };
    let mut targets = Vec::with_capacity(move_count(tree, node));
    let mut child = parent;
    while let Some(ancestor) = tree.parent(child) {
        if let Some(other) = tree.sibling(child) {
            targets.extend(tree.subtree(other, Traversal::ParentFirst));
        }
        targets.push(ancestor);
        child = ancestor;
    }
    targets.extend(tree.subtree(sibling, Traversal::ParentFirst).into_iter().skip(1));
    targets
}

/// Swap partners of `node` in the right subtrees along its path, so that
/// every unordered pair belongs to exactly one node.
fn swap_partners(tree: &DecompTree, node: NodeId) -> Vec<NodeId> {
    let mut partners = Vec::new();
    let mut child = node;
    while let Some(parent) = tree.parent(child) {
        if tree.node(child).branch() == Branch::Left {
            if let Some(right) = tree.node(parent).right() {
                let skip = usize::from(child == node);
                partners.extend(tree.subtree(right, Traversal::ParentFirst).into_iter().skip(skip));
            }
        }
        child = parent;
    }
    partners
}

fn random_move(tree: &mut DecompTree, rng: &mut impl Rng) -> Result<Operation, DecompError> {
    let no_candidate = DecompError::NoCandidate { nodes: tree.len() };
    // Draw nodes without replacement until one can move.
    let mut end = tree.len();
    let node = loop {
        if end == 0 {
            return Err(no_candidate);
        }
        let i = rng.random_range(0..end);
        let node = tree.slot(i);
        if move_count(tree, node) > 0 {
            break node;
        }
        end -= 1;
        tree.swap_slots(i, end);
    };

    let (Some(parent), Some(sibling)) = (tree.parent(node), tree.sibling(node)) else {
        return Err(no_candidate);
    };
    let last = tree.position(node);
    let mut excluded = [
        (last + 1 - tree.node(node).subtree_size(), last),
        (tree.position(parent), tree.position(parent)),
        (tree.position(sibling), tree.position(sibling)),
    ];
    excluded.sort_unstable();

    // The r-th position outside of the excluded ranges.
    let mut position = rng.random_range(0..move_count(tree, node));
    for (first, last) in excluded {
        if position >= first {
            position += last - first + 1;
        }
    }
    let target = tree.find(position).ok_or(no_candidate)?;
    Ok(MoveOp::new(tree, node, target)?.into())
}

#[derive(Debug, Clone)]
struct Candidate {
    node: NodeId,
    /// Operations of this node not yet returned.
    count: usize,
    partners: Option<Vec<NodeId>>,
}

impl Candidate {
    fn new(node: NodeId, count: usize) -> Self {
        Candidate {
            node,
            count,
            partners: None,
        }
    }
}

/// Lazy random enumeration of the operations of an [`Operator`].
///
/// Each operation is returned exactly once. Node partners are only
/// materialised once a node is first drawn.
#[derive(Debug, Clone)]
pub struct Neighborhood {
    operator: Operator,
    candidates: Vec<Candidate>,
    remaining: usize,
}

impl Neighborhood {
    /// Number of operations not yet returned.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// The next operation, drawn uniformly among those not returned yet.
    ///
    /// `tree` must be the tree the neighbourhood was built from, unchanged.
    pub fn next_operation(&mut self, tree: &DecompTree, rng: &mut impl Rng) -> Option<Operation> {
        if self.remaining == 0 {
            return None;
        }
        let mut sample = rng.random_range(0..self.remaining);
        let mut i = 0;
        while i < self.candidates.len() {
            let count = self.candidates[i].count;
            if count == 0 {
                self.candidates.swap_remove(i);
            } else if sample < count {
                break;
            } else {
                sample -= count;
                i += 1;
            }
        }

        let operator = self.operator;
        let candidate = self.candidates.get_mut(i)?;
        let node = candidate.node;
        let partners = candidate.partners.get_or_insert_with(|| match operator {
            Operator::Move => move_targets(tree, node),
            Operator::Swap => swap_partners(tree, node),
        });
        debug_assert!(partners.len() >= candidate.count);
        let k = rng.random_range(0..candidate.count);
        let partner = partners[k];
        partners.swap(k, candidate.count - 1);
        candidate.count -= 1;
        self.remaining -= 1;

        let operation = match operator {
            Operator::Move => MoveOp::new(tree, node, partner).map(Operation::from),
            Operator::Swap => SwapOp::new(tree, node, partner).map(Operation::from),
        };
        debug_assert!(operation.is_ok(), "{:?}", operation);
        operation.ok()
    }
}
