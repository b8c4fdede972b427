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

use crate::decomp_tree::NodeId;

/// Failures of tree construction and local search.
///
/// None of these leave a tree partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecompError {
    /// The graph has no vertices, so there is nothing to decompose.
    #[error("cannot decompose a graph without vertices")]
    EmptyGraph,
    /// The tree is too small to have any neighbour under the operator.
    #[error("a tree with {nodes} nodes has no candidate operation")]
    NoCandidate { nodes: usize },
    #[error("cannot move node {node} next to node {target}")]
    InvalidMove { node: NodeId, target: NodeId },
    #[error("cannot swap nodes {first} and {second}")]
    InvalidSwap { first: NodeId, second: NodeId },
    /// The tree has nodes without a position.
    #[error("the decomposition tree is not fully built")]
    NotBuilt,
}
