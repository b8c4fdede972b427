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

use rustc_hash::FxHashSet;

use crate::graph::Graph;
use crate::vertex_set::VertexSet;

use super::smaller_side;

/// log2 of the number of distinct sets `N(S) ∩ other` over all subsets `S`
/// of one side of the cut.
///
/// The unions are grown vertex by vertex from the empty set. Vertices with
/// no neighbour across the cut are skipped, as they add no new union.
pub fn boolean_width(graph: &Graph, left: &VertexSet, right: &VertexSet) -> f64 {
    let (side, other) = smaller_side(left, right);
    let mut unions: FxHashSet<VertexSet> = FxHashSet::default();
    unions.insert(VertexSet::new(graph.vertex_count()));
    for v in side {
        let neighborhood = graph.neighborhood(v) & other;
        if neighborhood.is_empty() {
            continue;
        }
        let grown: Vec<VertexSet> = unions.iter().map(|u| u | &neighborhood).collect();
        unions.extend(grown);
    }
    (unions.len() as f64).log2()
}
