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
use serde::{Deserialize, Serialize};

use super::{LocalSearch, Operator, PRECISION};
use crate::error::DecompError;

/// Temperatures and cooling of simulated annealing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealingSchedule {
    pub initial_temperature: f64,
    /// With a time budget, cooling is paced to reach this temperature when
    /// the budget runs out. Without one, the search stops below it.
    pub target_temperature: f64,
    pub cooling_rate: f64,
    /// Non-improving iterations before returning to the best tree.
    pub reset_after: usize,
    /// Relative weight of each operator of the search. Uniform when empty.
    pub operator_weights: Vec<f64>,
}

impl Default for AnnealingSchedule {
    fn default() -> Self {
        AnnealingSchedule {
            initial_temperature: 100.0,
            target_temperature: 0.1,
            cooling_rate: 0.97,
            reset_after: 1000,
            operator_weights: Vec::new(),
        }
    }
}

/// Probability of accepting a cost increase of `deterioration`. Increases
/// below 10 are treated as 10.
pub fn acceptance_probability(deterioration: f64, temperature: f64) -> f64 {
    (-deterioration.max(10.0) / temperature).exp()
}

/// Seconds between two coolings so that `initial` cools down to `target`
/// in `remaining_secs`.
pub fn cooling_interval(initial: f64, target: f64, cooling_rate: f64, remaining_secs: f64) -> f64 {
    let steps = (target / initial).ln() / cooling_rate.ln();
    if steps > 0.0 {
        remaining_secs / steps
    } else {
        remaining_secs
    }
}

#[derive(Debug, Clone, Default)]
pub(super) struct AnnealingState {
    /// Per solution.
    temperatures: Vec<f64>,
    intervals: Vec<f64>,
    previous_cooling: f64,
    without_improvement: usize,
    /// Cumulative operator probabilities.
    cumulative: Vec<f64>,
}

impl AnnealingState {
    fn operator(&self, r: f64, operators: &[Operator]) -> Operator {
        let i = self
            .cumulative
            .iter()
            .position(|&c| r < c)
            .unwrap_or(operators.len() - 1);
        operators[i.min(operators.len() - 1)]
    }
}

impl<R: Rng> LocalSearch<'_, R> {
    pub(super) fn start_annealing(&mut self) {
        let schedule = &self.schedule;
        let interval = self.remaining_secs().map_or(0.0, |remaining| {
            cooling_interval(
                schedule.initial_temperature,
                schedule.target_temperature,
                schedule.cooling_rate,
                remaining,
            )
        });

        let uniform = vec![1.0; self.operators.len()];
        let weights = if schedule.operator_weights.len() == self.operators.len()
            && schedule.operator_weights.iter().all(|&w| w >= 0.0)
            && schedule.operator_weights.iter().sum::<f64>() > 0.0
        {
            &schedule.operator_weights
        } else {
            &uniform
        };
        let total: f64 = weights.iter().sum();
        let cumulative = weights
            .iter()
            .scan(0.0, |acc, w| {
                *acc += w / total;
                Some(*acc)
            })
            .collect();

        self.annealing = AnnealingState {
            temperatures: vec![schedule.initial_temperature; self.solutions.len()],
            intervals: vec![interval; self.solutions.len()],
            previous_cooling: 0.0,
            without_improvement: 0,
            cumulative,
        };
    }

    /// One annealing iteration on the focused solution. Returns false once
    /// an unbudgeted search has cooled below the target temperature.
    pub(super) fn anneal_step(&mut self) -> Result<bool, DecompError> {
        let focus = self.focus;
        let cooling_rate = self.schedule.cooling_rate;
        match self.budget {
            None => {
                self.annealing.temperatures[focus] *= cooling_rate;
                if self.annealing.temperatures[focus] < self.schedule.target_temperature {
                    log::debug!("cooled below {}", self.schedule.target_temperature);
                    return Ok(false);
                }
            }
            Some(_) => {
                let elapsed = self.elapsed().as_secs_f64();
                if elapsed - self.annealing.previous_cooling > self.annealing.intervals[focus] {
                    self.annealing.previous_cooling = elapsed;
                    self.annealing.temperatures[focus] *= cooling_rate;
                }
            }
        }
        let temperature = self.annealing.temperatures[focus];

        let operator = self.annealing.operator(self.rng.random(), &self.operators);
        let solution = &mut self.solutions[focus];
        let mut op = operator.random_operation(solution.tree_mut(), &mut self.rng)?;
        self.explored += 1;
        let current = solution.cost();
        let deterioration = op.cost(solution.tree()) - current;

        let accepted = deterioration < PRECISION
            || self.rng.random::<f64>() < acceptance_probability(deterioration, temperature);
        if accepted && solution.perform(op) {
            self.annealing.without_improvement = 0;
            log::debug!(
                "new best width {}, cost {:.2} at temperature {:.3}",
                solution.best_width(),
                solution.best_cost(),
                temperature
            );
        } else {
            self.annealing.without_improvement += 1;
            if self.annealing.without_improvement > self.schedule.reset_after {
                log::debug!(
                    "no improvement in {} iterations, resetting",
                    self.schedule.reset_after
                );
                solution.revert_to_best();
                self.annealing.without_improvement = 0;
            }
        }

        if accepted {
            self.update_focus();
            if self.focus != focus {
                if let Some(remaining) = self.remaining_secs() {
                    self.annealing.intervals[self.focus] = cooling_interval(
                        self.annealing.temperatures[self.focus],
                        self.schedule.target_temperature,
                        cooling_rate,
                        remaining,
                    );
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::Constructor;
    use crate::graph::Graph;
    use crate::local_search::Strategy;
    use crate::width::{WidthFunction, WidthParameter};
    use approx::assert_relative_eq;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn acceptance_is_monotone() {
        let temperatures = [1.0, 10.0, 100.0, 1000.0];
        for pair in temperatures.windows(2) {
            assert!(acceptance_probability(50.0, pair[0]) < acceptance_probability(50.0, pair[1]));
        }
        let deteriorations = [10.0, 20.0, 100.0, 1000.0];
        for pair in deteriorations.windows(2) {
            assert!(acceptance_probability(pair[0], 50.0) > acceptance_probability(pair[1], 50.0));
        }
    }

    #[test]
    fn small_deteriorations_are_clamped() {
        assert_eq!(acceptance_probability(0.5, 20.0), acceptance_probability(10.0, 20.0));
        assert_relative_eq!(acceptance_probability(10.0, 10.0), (-1.0f64).exp());
    }

    #[test]
    fn cooling_reaches_target_at_deadline() {
        let interval = cooling_interval(100.0, 1.0, 0.97, 60.0);
        let steps = (60.0 / interval).round() as i32;
        assert_relative_eq!(100.0 * 0.97f64.powi(steps), 1.0, max_relative = 0.05);
    }

    #[test]
    fn operators_follow_weights() {
        let state = AnnealingState {
            cumulative: vec![0.25, 1.0],
            ..Default::default()
        };
        let operators = [Operator::Move, Operator::Swap];
        assert_eq!(state.operator(0.1, &operators), Operator::Move);
        assert_eq!(state.operator(0.3, &operators), Operator::Swap);
        assert_eq!(state.operator(1.0, &operators), Operator::Swap);
    }

    #[test]
    fn plateaus_reset_to_best() {
        // Without edges every tree costs the same, so no step is a new best.
        let g = Graph::new(6);
        let f = WidthFunction::new(WidthParameter::Rank);
        let mut rng = SmallRng::seed_from_u64(9);
        let tree = Constructor::RandomBottomUp.construct(&g, &f, &mut rng).unwrap();
        let operators = vec![Operator::Move, Operator::Swap];
        let mut search = LocalSearch::new(vec![tree], operators, Strategy::SimulatedAnnealing, rng);
        search.set_annealing_schedule(AnnealingSchedule {
            reset_after: 5,
            ..Default::default()
        });
        search.start_annealing();

        let mut resets = 0;
        for _ in 0..100 {
            assert!(search.anneal_step().unwrap());
            let pending = search.solutions[0].pending();
            assert!(pending <= 5, "{} operations pending", pending);
            if pending == 0 {
                resets += 1;
            }
        }
        assert_eq!(resets, 16);
    }
}
