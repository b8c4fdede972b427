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

use rand::Rng;

use super::{LocalSearch, Operation, PRECISION};
use crate::error::DecompError;

impl<R: Rng> LocalSearch<'_, R> {
    /// One hill-climbing step on the focused solution. Returns false once
    /// no solution can be improved.
    pub(super) fn climb(&mut self, best: bool) -> bool {
        let candidate = if best {
            self.best_improvement()
        } else {
            self.first_improvement()
        };
        match candidate {
            Some(op) => {
                let solution = &mut self.solutions[self.focus];
                solution.perform(op);
                log::debug!(
                    "iteration {}: width {}, cost {:.2}",
                    self.iterations,
                    solution.tree().width(),
                    solution.cost()
                );
            }
            None => {
                log::debug!("tree {} is locally optimal", self.focus);
                self.converged[self.focus] = true;
            }
        }
        self.update_focus();
        self.converged.iter().any(|&c| !c)
    }

    /// The first operation in random order that lowers the cost of the
    /// focused tree.
    pub(super) fn first_improvement(&mut self) -> Option<Operation> {
        let tree = self.solutions[self.focus].tree();
        let current = tree.cost();
        for &operator in &self.operators {
            let mut neighborhood = operator.neighborhood(tree);
            while let Some(mut op) = neighborhood.next_operation(tree, &mut self.rng) {
                self.explored += 1;
                if op.cost(tree) - current < -PRECISION {
                    return Some(op);
                }
            }
        }
        None
    }

    /// The cheapest operation of all neighbourhoods, if it lowers the cost.
    pub(super) fn best_improvement(&mut self) -> Option<Operation> {
        let tree = self.solutions[self.focus].tree();
        let mut best_cost = tree.cost() - PRECISION;
        let mut best = None;
        for &operator in &self.operators {
            let mut neighborhood = operator.neighborhood(tree);
            while let Some(mut op) = neighborhood.next_operation(tree, &mut self.rng) {
                self.explored += 1;
                let cost = op.cost(tree);
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(op);
                }
            }
        }
        best
    }

    fn perturbation_size(&self) -> usize {
        self.max_perturbation
            .min(self.min_perturbation + self.failures)
    }

    /// First improvement, or a random perturbation of the best tree when
    /// none exists.
    pub(super) fn vns_step(&mut self) -> Result<bool, DecompError> {
        if let Some(op) = self.first_improvement() {
            if self.solutions[self.focus].perform(op) {
                self.failures = 0;
            }
            self.update_focus();
            return Ok(true);
        }

        let size = self.perturbation_size();
        let reset_after = self.schedule.reset_after;
        let solution = &mut self.solutions[self.focus];
        log::info!(
            "perturbation of size {} after {} failures, best cost {:.2}",
            size,
            self.failures + 1,
            solution.best_cost()
        );
        if solution.cost() > solution.best_cost() || solution.pending() > reset_after {
            solution.revert_to_best();
        }
        for _ in 0..size {
            let operator = self.operators[self.rng.random_range(0..self.operators.len())];
            let op = operator.random_operation(solution.tree_mut(), &mut self.rng)?;
            solution.perform(op);
        }
        log::debug!(
            "perturbed to width {}, cost {:.0}",
            solution.tree().width(),
            solution.cost()
        );
        self.failures += 1;
        Ok(true)
    }
}
