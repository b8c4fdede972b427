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

//! Heuristic branch decompositions of graphs.
//!
//! A branch decomposition is a full binary tree whose leaves are the
//! vertices of a graph. Every node splits the vertices in two, and a width
//! parameter scores these cuts. [`decomp_tree::DecompTree`] keeps widths and
//! their aggregates up to date under local search, see [`local_search`].

pub mod cli;
pub mod construct;
pub mod decomp_tree;
pub mod error;
pub mod graph;
pub mod graph_loader;
pub mod local_search;
pub mod ordered_tree;
pub mod reduce;
pub mod solve;
pub mod vertex_set;
pub mod width;

pub use decomp_tree::DecompTree;
pub use error::DecompError;
pub use graph::Graph;
pub use width::{WidthFunction, WidthParameter};
