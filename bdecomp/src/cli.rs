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

//! The bdecomp command line interface.

use clap::{crate_version, Parser};

use crate::error::DecompError;
use crate::graph_loader::LoadError;

pub mod cut;
pub mod decompose;

/// CLI arguments.
#[derive(Parser, Debug)]
#[clap(version = crate_version!(), long_about = None)]
#[clap(about = "Heuristic branch decompositions of graphs")]
pub enum Cli {
    /// Decompose a graph and report the best tree found.
    Decompose(decompose::DecomposeArgs),
    /// Print the width of a single cut.
    Cut(cut::CutArgs),
}

/// Error type for the CLI.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum CliError {
    /// Error reading or writing files.
    #[display("IO error: {_0}")]
    IO(std::io::Error),
    /// Error reading the input graph.
    #[display("Error loading graph: {_0}")]
    Load(LoadError),
    #[display("Decomposition failed: {_0}")]
    Decomp(DecompError),
    #[display("Error writing JSON: {_0}")]
    Json(serde_json::Error),
    /// A vertex name that is not in the graph.
    #[display("Unknown vertex '{_0}'")]
    UnknownVertex(String),
}

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        match self {
            Cli::Decompose(args) => args.run(),
            Cli::Cut(args) => args.run(),
        }
    }
}
