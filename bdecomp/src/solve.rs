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

//! End-to-end decomposition of a graph
//!
//! ```
//! use bdecomp::graph::Graph;
//! use bdecomp::solve::{solve, SolveOptions};
//! use bdecomp::width::WidthParameter;
//!
//! let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
//! let options = SolveOptions {
//!     width: WidthParameter::Rank,
//!     budget_secs: 0.0,
//!     iteration_limit: Some(100),
//!     ..SolveOptions::default()
//! };
//! let report = solve(&graph, &options).unwrap();
//! assert_eq!(report.width, 1.0);
//! ```

use std::borrow::Cow;
use std::fmt;

use itertools::Itertools;
use rand::{rngs::SmallRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::construct::Constructor;
use crate::decomp_tree::DecompTree;
use crate::error::DecompError;
use crate::graph::Graph;
use crate::local_search::{AnnealingSchedule, LocalSearch, Operator, SearchStats, Strategy};
use crate::ordered_tree::optimal_ordered_tree;
use crate::reduce::{reduce, ReductionRule};
use crate::width::{CacheStats, WidthFunction, WidthParameter, DEFAULT_CAPACITY};

/// Everything that configures a run of [`solve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    pub width: WidthParameter,
    pub constructor: Constructor,
    pub strategy: Strategy,
    pub operators: Vec<Operator>,
    /// Time budget of the local search. Not positive means unbounded.
    pub budget_secs: f64,
    pub iteration_limit: Option<usize>,
    pub seed: u64,
    /// Apply all reduction rules first.
    pub reduce: bool,
    pub cache_capacity: usize,
    /// Rebuild each tree with the optimal tree for its leaf order.
    pub refine: bool,
    pub annealing: AnnealingSchedule,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            width: WidthParameter::default(),
            constructor: Constructor::default(),
            strategy: Strategy::default(),
            operators: vec![Operator::Move],
            budget_secs: 10.0,
            iteration_limit: None,
            seed: 0,
            reduce: false,
            cache_capacity: DEFAULT_CAPACITY,
            refine: false,
            annealing: AnnealingSchedule::default(),
        }
    }
}

/// The decomposition of one graph left after reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentReport {
    pub vertices: Vec<String>,
    pub width: f64,
    pub cost: f64,
    /// Nested pairs of vertex names.
    pub tree: String,
}

impl ComponentReport {
    fn new(tree: &DecompTree) -> Self {
        ComponentReport {
            vertices: tree.graph().names().to_vec(),
            width: tree.width(),
            cost: tree.cost(),
            tree: tree.structure(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub options: SolveOptions,
    /// Largest width over all components, 0 without any.
    pub width: f64,
    pub components: Vec<ComponentReport>,
    pub search: SearchStats,
    pub cache: CacheStats,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} = {}", self.options.width, self.width)?;
        for (i, component) in self.components.iter().enumerate() {
            writeln!(
                f,
                "component {}: {} vertices, width {}, cost {:.2}",
                i,
                component.vertices.len(),
                component.width,
                component.cost
            )?;
            writeln!(f, "  {}", component.tree)?;
        }
        writeln!(
            f,
            "{} iterations, {} candidates explored in {:.2}s",
            self.search.iterations, self.search.explored, self.search.elapsed_secs
        )?;
        write!(f, "cache: {}", self.cache)
    }
}

/// Decompose `graph` as configured by `options`.
pub fn solve(graph: &Graph, options: &SolveOptions) -> Result<Report, DecompError> {
    let mut rng = SmallRng::seed_from_u64(options.seed);
    let graphs: Vec<Cow<Graph>> = if options.reduce {
        reduce(graph, &ReductionRule::ALL)
            .into_iter()
            .map(Cow::Owned)
            .collect()
    } else {
        vec![Cow::Borrowed(graph)]
    };
    log::info!(
        "decomposing {} graph(s) with sizes {}",
        graphs.len(),
        graphs.iter().map(|g| g.vertex_count()).join(", ")
    );

    let width_fn = WidthFunction::with_capacity(options.width, options.cache_capacity);
    let trees = graphs
        .iter()
        .map(|g| options.constructor.construct(g, &width_fn, &mut rng))
        .collect::<Result<Vec<_>, _>>()?;

    let mut search = LocalSearch::new(trees, options.operators.clone(), options.strategy, &mut rng);
    search.set_iteration_limit(options.iteration_limit);
    search.set_annealing_schedule(options.annealing.clone());
    let mut trees = search.run(options.budget_secs)?;
    let stats = search.stats();

    if options.refine {
        for tree in trees.iter_mut() {
            let refined = optimal_ordered_tree(tree)?;
            if refined.cost() < tree.cost() {
                *tree = refined;
            }
        }
    }

    let components: Vec<ComponentReport> = trees.iter().map(ComponentReport::new).collect();
    Ok(Report {
        options: options.clone(),
        width: components.iter().map(|c| c.width).fold(0.0, f64::max),
        components,
        search: stats,
        cache: width_fn.cache_stats(),
    })
}
