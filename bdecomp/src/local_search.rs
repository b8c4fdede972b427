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

//! Improvement heuristics for decomposition trees
//!
//! A [`LocalSearch`] keeps one [`Solution`] per tree it was given and works
//! on the one with the largest best width. The hill climbers stop once no
//! operation improves any tree, variable neighbourhood search and simulated
//! annealing run until the time budget or iteration limit is spent.

mod annealer;
mod hill_climb;
pub mod operation;
pub mod operator;
pub mod solution;

use std::time::{Duration, Instant};

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use annealer::{acceptance_probability, cooling_interval, AnnealingSchedule};
pub use operation::{MoveOp, Operation, SwapOp};
pub use operator::{Neighborhood, Operator};
pub use solution::Solution;

use crate::decomp_tree::DecompTree;
use crate::error::DecompError;
use annealer::AnnealingState;

/// Cost differences below this are treated as no change.
pub const PRECISION: f64 = 1e-4;

/// How a [`LocalSearch`] picks the next operation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Apply the first improving operation found.
    #[display("first-improvement")]
    FirstImprovement,
    /// Apply the best operation of the whole neighbourhood, if it improves.
    #[display("best-improvement")]
    BestImprovement,
    /// First improvement, with random perturbations at local optima.
    #[default]
    #[display("variable-neighborhood")]
    VariableNeighborhood,
    #[display("simulated-annealing")]
    SimulatedAnnealing,
}

/// Counters of a finished or running search.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    /// Operations whose cost was evaluated.
    pub explored: usize,
    pub elapsed_secs: f64,
}

pub struct LocalSearch<'a, R: Rng> {
    solutions: Vec<Solution<'a>>,
    operators: Vec<Operator>,
    strategy: Strategy,
    rng: R,
    focus: usize,
    /// Solutions the hill climbers could not improve any more.
    converged: Vec<bool>,
    iterations: usize,
    explored: usize,
    iteration_limit: Option<usize>,
    min_perturbation: usize,
    max_perturbation: usize,
    failures: usize,
    schedule: AnnealingSchedule,
    annealing: AnnealingState,
    started: Instant,
    budget: Option<f64>,
}

impl<'a, R: Rng> LocalSearch<'a, R> {
    /// Search on `trees` with the given operators, [`Operator::Move`] if
    /// none are given.
    pub fn new(
        trees: Vec<DecompTree<'a>>,
        operators: Vec<Operator>,
        strategy: Strategy,
        rng: R,
    ) -> Self {
        let solutions: Vec<Solution<'a>> = trees.into_iter().map(Solution::new).collect();
        let focus = solutions
            .iter()
            .position_max_by(|a, b| a.cost().total_cmp(&b.cost()))
            .unwrap_or(0);
        let operators = if operators.is_empty() {
            vec![Operator::Move]
        } else {
            operators.into_iter().unique().collect()
        };
        LocalSearch {
            converged: vec![false; solutions.len()],
            solutions,
            operators,
            strategy,
            rng,
            focus,
            iterations: 0,
            explored: 0,
            iteration_limit: None,
            min_perturbation: 2,
            max_perturbation: 8,
            failures: 0,
            schedule: AnnealingSchedule::default(),
            annealing: AnnealingState::default(),
            started: Instant::now(),
            budget: None,
        }
    }

    /// Stop after this many iterations, whatever the time budget.
    pub fn set_iteration_limit(&mut self, limit: Option<usize>) {
        self.iteration_limit = limit;
    }

    /// Number of random operations in a perturbation grows from `min` by
    /// one per failed perturbation, up to `max`.
    pub fn set_perturbation(&mut self, min: usize, max: usize) {
        self.min_perturbation = min;
        self.max_perturbation = max.max(min);
    }

    pub fn set_annealing_schedule(&mut self, schedule: AnnealingSchedule) {
        self.schedule = schedule;
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn solutions(&self) -> &[Solution<'a>] {
        &self.solutions
    }

    /// Index of the solution currently worked on.
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            iterations: self.iterations,
            explored: self.explored,
            elapsed_secs: self.elapsed().as_secs_f64(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Search for `budget_secs` seconds, or without a time limit when the
    /// budget is not positive, and return the best tree of every solution.
    ///
    /// Running out of candidate operations ends the search early.
    pub fn run(&mut self, budget_secs: f64) -> Result<Vec<DecompTree<'a>>, DecompError> {
        self.started = Instant::now();
        self.budget = (budget_secs > 0.0).then_some(budget_secs);
        self.iterations = 0;
        self.explored = 0;
        self.failures = 0;
        // Trees of at most three nodes have no neighbours at all.
        for (converged, solution) in self.converged.iter_mut().zip(&self.solutions) {
            *converged = solution.tree().len() <= 3;
        }
        self.update_focus();
        if self.strategy == Strategy::SimulatedAnnealing {
            self.start_annealing();
        }
        log::info!(
            "{} with {} on {} tree(s), budget {}",
            self.strategy,
            self.operators.iter().join(", "),
            self.solutions.len(),
            self.budget.map_or("unlimited".to_string(), |b| format!("{b}s")),
        );

        while self.converged.iter().any(|&c| !c) && !self.out_of_budget() {
            self.iterations += 1;
            match self.iterate() {
                Ok(true) => {}
                Ok(false) => break,
                Err(DecompError::NoCandidate { nodes }) => {
                    log::debug!("no operation on a tree with {nodes} nodes");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let trees = self
            .solutions
            .iter_mut()
            .map(|solution| solution.revert_to_best().clone())
            .collect();
        let stats = self.stats();
        log::info!(
            "finished after {} iterations and {} evaluations in {:.2}s, width {}",
            stats.iterations,
            stats.explored,
            stats.elapsed_secs,
            self.width()
        );
        Ok(trees)
    }

    /// Largest best width over all solutions.
    pub fn width(&self) -> f64 {
        self.solutions
            .iter()
            .map(Solution::best_width)
            .fold(0.0, f64::max)
    }

    fn iterate(&mut self) -> Result<bool, DecompError> {
        match self.strategy {
            Strategy::FirstImprovement => Ok(self.climb(false)),
            Strategy::BestImprovement => Ok(self.climb(true)),
            Strategy::VariableNeighborhood => self.vns_step(),
            Strategy::SimulatedAnnealing => self.anneal_step(),
        }
    }

    fn out_of_budget(&self) -> bool {
        self.iteration_limit.is_some_and(|limit| self.iterations >= limit)
            || self.remaining_secs().is_some_and(|r| r <= 0.0)
    }

    fn remaining_secs(&self) -> Option<f64> {
        self.budget.map(|b| b - self.elapsed().as_secs_f64())
    }

    /// Focus on the unconverged solution with the largest best width.
    fn update_focus(&mut self) {
        let focus = self
            .solutions
            .iter()
            .enumerate()
            .filter(|&(i, _)| !self.converged[i])
            .max_by(|(_, a), (_, b)| a.best_width().total_cmp(&b.best_width()))
            .map(|(i, _)| i);
        if let Some(focus) = focus {
            self.focus = focus;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::Constructor;
    use crate::graph::tests::{cycle, path, random_graph};
    use crate::graph::Graph;
    use crate::width::{WidthFunction, WidthParameter};
    use rand::{rngs::SmallRng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case(Strategy::FirstImprovement)]
    #[case(Strategy::BestImprovement)]
    fn hill_climbers_never_worsen(#[case] strategy: Strategy) {
        let mut rng = SmallRng::seed_from_u64(29);
        let g = random_graph(14, 0.3, &mut rng);
        let f = WidthFunction::new(WidthParameter::Rank);
        let tree = Constructor::RandomBottomUp.construct(&g, &f, &mut rng).unwrap();
        let initial = tree.cost();

        let mut search = LocalSearch::new(
            vec![tree],
            vec![Operator::Move, Operator::Swap],
            strategy,
            SmallRng::seed_from_u64(1),
        );
        let trees = search.run(0.0).unwrap();
        assert_eq!(trees.len(), 1);
        assert!(trees[0].is_consistent());
        assert!(trees[0].cost() <= initial);
        assert!(search.stats().iterations > 0);
    }

    #[rstest]
    #[case(WidthParameter::Rank)]
    #[case(WidthParameter::Boolean)]
    fn path_reaches_width_one(#[case] parameter: WidthParameter) {
        let g = path(4);
        let f = WidthFunction::new(parameter);
        let mut rng = SmallRng::seed_from_u64(3);
        let tree = Constructor::RandomTopDown.construct(&g, &f, &mut rng).unwrap();
        let mut search = LocalSearch::new(vec![tree], vec![], Strategy::FirstImprovement, rng);
        let trees = search.run(0.0).unwrap();
        assert_eq!(trees[0].width(), 1.0);
    }

    #[rstest]
    #[case(Strategy::VariableNeighborhood)]
    #[case(Strategy::SimulatedAnnealing)]
    fn iteration_limit_bounds_search(#[case] strategy: Strategy) {
        let mut rng = SmallRng::seed_from_u64(31);
        let g = cycle(10);
        let f = WidthFunction::new(WidthParameter::MaximumMatching);
        let tree = Constructor::RandomBottomUp.construct(&g, &f, &mut rng).unwrap();
        let initial = tree.cost();
        let mut search = LocalSearch::new(vec![tree], vec![Operator::Swap], strategy, rng);
        search.set_iteration_limit(Some(50));
        let trees = search.run(0.0).unwrap();
        assert!(search.stats().iterations <= 50);
        assert!(trees[0].is_consistent());
        assert!(trees[0].cost() <= initial);
    }

    #[test]
    fn tiny_trees_are_skipped() {
        let g = Graph::from_edges(2, &[(0, 1)]);
        let f = WidthFunction::new(WidthParameter::Rank);
        let mut rng = SmallRng::seed_from_u64(0);
        let tree = Constructor::GreedyLinear.construct(&g, &f, &mut rng).unwrap();
        let mut search = LocalSearch::new(vec![tree], vec![], Strategy::VariableNeighborhood, rng);
        let trees = search.run(0.0).unwrap();
        assert_eq!(search.stats().iterations, 0);
        assert_eq!(trees[0].len(), 3);
        assert_eq!(trees[0].leaves_in_order().into_iter().sorted().collect_vec(), vec![0, 1]);
    }

    #[rstest]
    #[case(Strategy::VariableNeighborhood)]
    #[case(Strategy::SimulatedAnnealing)]
    fn tiny_trees_do_not_stop_the_others(#[case] strategy: Strategy) {
        let mut rng = SmallRng::seed_from_u64(3);
        let edge = Graph::from_edges(2, &[(0, 1)]);
        let big = cycle(8);
        let f = WidthFunction::new(WidthParameter::Rank);
        let trees = vec![
            Constructor::GreedyLinear.construct(&edge, &f, &mut rng).unwrap(),
            Constructor::RandomBottomUp.construct(&big, &f, &mut rng).unwrap(),
        ];
        let mut search = LocalSearch::new(trees, vec![], strategy, rng);
        search.set_iteration_limit(Some(50));
        let trees = search.run(0.0).unwrap();
        assert_eq!(search.focus(), 1);
        assert_eq!(search.stats().iterations, 50);
        assert_eq!(trees.len(), 2);
    }

    #[test]
    fn focus_follows_widest_solution() {
        let mut rng = SmallRng::seed_from_u64(37);
        let small = path(3);
        let dense = random_graph(9, 0.6, &mut rng);
        let f = WidthFunction::new(WidthParameter::Rank);
        let trees = vec![
            Constructor::GreedyLinear.construct(&small, &f, &mut rng).unwrap(),
            Constructor::RandomBottomUp.construct(&dense, &f, &mut rng).unwrap(),
        ];
        let search = LocalSearch::new(trees, vec![], Strategy::BestImprovement, rng);
        assert_eq!(search.focus(), 1);
    }

    #[test]
    fn budget_stops_unbounded_strategies() {
        let mut rng = SmallRng::seed_from_u64(41);
        let g = random_graph(12, 0.4, &mut rng);
        let f = WidthFunction::new(WidthParameter::Boolean);
        let tree = Constructor::RandomBottomUp.construct(&g, &f, &mut rng).unwrap();
        let mut search = LocalSearch::new(vec![tree], vec![], Strategy::VariableNeighborhood, rng);
        let trees = search.run(0.2).unwrap();
        assert!(trees[0].is_consistent());
        assert!(search.elapsed().as_secs_f64() < 5.0);
    }

    #[test]
    fn empty_search_returns_nothing() {
        let mut search: LocalSearch<'_, SmallRng> = LocalSearch::new(
            vec![],
            vec![],
            Strategy::default(),
            SmallRng::seed_from_u64(0),
        );
        assert!(search.run(0.0).unwrap().is_empty());
    }

    #[test]
    fn perturbations_on_a_plateau_stay_bounded() {
        let g = Graph::new(6);
        let f = WidthFunction::new(WidthParameter::Rank);
        let mut rng = SmallRng::seed_from_u64(3);
        let tree = Constructor::RandomBottomUp.construct(&g, &f, &mut rng).unwrap();
        let mut search = LocalSearch::new(vec![tree], vec![], Strategy::VariableNeighborhood, rng);
        search.set_annealing_schedule(AnnealingSchedule {
            reset_after: 3,
            ..Default::default()
        });
        for _ in 0..50 {
            assert!(search.vns_step().unwrap());
            assert!(search.solutions[0].pending() <= 3 + search.max_perturbation);
        }
    }
}
