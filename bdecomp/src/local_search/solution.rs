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

use itertools::Itertools;

use super::operation::Operation;
use crate::decomp_tree::DecompTree;

/// A tree under local search together with the operations applied since
/// its best state.
///
/// The log only shrinks on a new best or a revert. The searches keep it
/// bounded: hill climbing only performs improvements, annealing reverts
/// after `reset_after` iterations without a new best, and the perturbation
/// search reverts once more than `reset_after` operations are pending.
#[derive(Debug, Clone)]
pub struct Solution<'a> {
    tree: DecompTree<'a>,
    best_cost: f64,
    best_width: f64,
    /// Starts with an identity at the best cost, so the best state is always
    /// one of the logged states.
    log: Vec<Operation>,
}

impl<'a> Solution<'a> {
    pub fn new(tree: DecompTree<'a>) -> Self {
        let log = vec![Operation::identity(&tree)];
        Solution {
            best_cost: tree.cost(),
            best_width: tree.width(),
            tree,
            log,
        }
    }

    pub fn tree(&self) -> &DecompTree<'a> {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut DecompTree<'a> {
        &mut self.tree
    }

    pub fn into_tree(self) -> DecompTree<'a> {
        self.tree
    }

    /// Cost of the current tree.
    pub fn cost(&self) -> f64 {
        self.tree.cost()
    }

    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }

    pub fn best_width(&self) -> f64 {
        self.best_width
    }

    /// Number of operations that [`revert_to_best`](Self::revert_to_best)
    /// may have to undo.
    pub fn pending(&self) -> usize {
        self.log.len() - 1
    }

    /// Apply `op` and log it. Returns true if the tree reached a strictly
    /// better cost than ever before.
    ///
    /// On a new best, everything logged so far can no longer be the target
    /// of a revert and is dropped.
    pub fn perform(&mut self, mut op: Operation) -> bool {
        let cost = op.execute(&mut self.tree);
        if cost < self.best_cost {
            self.best_cost = cost;
            self.best_width = self.tree.width();
            self.log.clear();
            self.log.push(Operation::Identity { cost });
            true
        } else {
            self.log.push(op);
            false
        }
    }

    /// Undo logged operations back to the earliest state of least cost.
    pub fn revert_to_best(&mut self) -> &DecompTree<'a> {
        let best = self
            .log
            .iter()
            .map(|op| op.known_cost().unwrap_or(f64::INFINITY))
            .position_min_by(|a, b| a.total_cmp(b))
            .unwrap_or(0);
        while self.log.len() > best + 1 {
            if let Some(op) = self.log.pop() {
                op.revert(&mut self.tree);
            }
        }
        log::trace!("reverted to cost {:.2}", self.tree.cost());
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::Constructor;
    use crate::graph::tests::random_graph;
    use crate::local_search::Operator;
    use crate::width::{WidthFunction, WidthParameter};
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn reverts_to_best_state() {
        let mut rng = SmallRng::seed_from_u64(23);
        let g = random_graph(12, 0.3, &mut rng);
        let f = WidthFunction::new(WidthParameter::Rank);
        let tree = Constructor::RandomBottomUp.construct(&g, &f, &mut rng).unwrap();
        let mut solution = Solution::new(tree);

        let mut best = (solution.cost(), solution.tree().structure());
        for _ in 0..100 {
            let op = Operator::Move
                .random_operation(solution.tree_mut(), &mut rng)
                .unwrap();
            let improved = solution.perform(op);
            assert_eq!(improved, solution.cost() < best.0);
            if improved {
                best = (solution.cost(), solution.tree().structure());
                assert_eq!(solution.pending(), 0);
            }
            assert_eq!(solution.best_cost(), best.0);
        }

        let tree = solution.revert_to_best();
        assert!(tree.is_consistent());
        assert_eq!(tree.cost(), best.0);
        assert_eq!(tree.structure(), best.1);
        assert_eq!(solution.best_width(), solution.tree().width());
        assert_eq!(solution.pending(), 0);
    }
}
