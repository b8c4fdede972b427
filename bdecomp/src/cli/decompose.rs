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

//! The `decompose` CLI subcommand.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

use crate::construct::Constructor;
use crate::graph_loader::load_dgf;
use crate::local_search::{Operator, Strategy};
use crate::solve::{solve, SolveOptions};
use crate::width::{WidthParameter, DEFAULT_CAPACITY};

use super::CliError;

/// Decompose a graph.
#[derive(Parser, Debug)]
pub struct DecomposeArgs {
    /// Graph in DGF format.
    input: PathBuf,

    /// Width parameter to minimise.
    #[arg(long, short, value_enum, default_value_t)]
    width: WidthParameter,

    /// Heuristic building the initial trees.
    #[arg(long, short, value_enum, default_value_t)]
    constructor: Constructor,

    /// Local search strategy.
    #[arg(long, short, value_enum, default_value_t)]
    strategy: Strategy,

    /// Local search operator, may be repeated.
    #[arg(long = "operator", value_enum, default_values_t = vec![Operator::Move])]
    operators: Vec<Operator>,

    /// Time budget in seconds, unbounded when not positive.
    #[arg(long, short, default_value_t = 10.0, allow_hyphen_values = true)]
    time: f64,

    /// Maximum number of local search iterations.
    #[arg(long)]
    iterations: Option<usize>,

    /// Seed of the random number generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Remove isolated and pendant vertices and twins, and split components.
    #[arg(long)]
    reduce: bool,

    /// Rebuild each tree optimally for its leaf order after the search.
    #[arg(long)]
    refine: bool,

    /// Maximum number of cached widths.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    cache_capacity: usize,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Output to a file instead of printing the result.
    #[arg(long, short)]
    out: Option<PathBuf>,
}

impl DecomposeArgs {
    fn options(&self) -> SolveOptions {
        SolveOptions {
            width: self.width,
            constructor: self.constructor,
            strategy: self.strategy,
            operators: self.operators.clone(),
            budget_secs: self.time,
            iteration_limit: self.iterations,
            seed: self.seed,
            reduce: self.reduce,
            cache_capacity: self.cache_capacity,
            refine: self.refine,
            ..SolveOptions::default()
        }
    }

    /// Run the `decompose` command using the provided arguments.
    pub fn run(self) -> Result<(), CliError> {
        let graph = load_dgf(&self.input)?;
        let report = solve(&graph, &self.options())?;
        let text = if self.json {
            serde_json::to_string_pretty(&report)?
        } else {
            report.to_string()
        };
        if let Some(out_path) = self.out {
            fs::write(out_path, text)?;
        } else {
            println!("{text}");
        }
        Ok(())
    }
}
