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

//! The `cut` CLI subcommand.

use clap::Parser;
use std::path::PathBuf;

use crate::graph_loader::load_dgf;
use crate::vertex_set::VertexSet;
use crate::width::{WidthFunction, WidthParameter};

use super::CliError;

/// Print the width of the cut between the given vertices and the rest.
#[derive(Parser, Debug)]
pub struct CutArgs {
    /// Graph in DGF format.
    input: PathBuf,

    /// Names of the vertices on one side of the cut.
    #[arg(required = true)]
    vertices: Vec<String>,

    #[arg(long, short, value_enum, default_value_t)]
    width: WidthParameter,
}

impl CutArgs {
    /// Run the `cut` command using the provided arguments.
    pub fn run(self) -> Result<(), CliError> {
        let graph = load_dgf(&self.input)?;
        let mut side = VertexSet::new(graph.vertex_count());
        for name in &self.vertices {
            let v = graph
                .vertex_by_name(name)
                .ok_or_else(|| CliError::UnknownVertex(name.clone()))?;
            side.insert(v);
        }
        let width = WidthFunction::new(self.width).width(&graph, &side);
        println!("{width}");
        Ok(())
    }
}
