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

use bitgauss::BitMatrix;

use crate::graph::{Graph, V};
use crate::vertex_set::VertexSet;

use super::smaller_side;

/// GF(2) rank of the adjacency matrix between the two sides of a cut.
///
/// Only vertices with a neighbour across the cut become rows or columns.
pub fn rank_width(graph: &Graph, left: &VertexSet, right: &VertexSet) -> f64 {
    let (side, other) = smaller_side(left, right);
    let mut reached = VertexSet::new(graph.vertex_count());
    let rows: Vec<V> = side
        .iter()
        .filter(|&v| {
            let across = graph.neighborhood(v) & other;
            reached |= &across;
            !across.is_empty()
        })
        .collect();
    let cols: Vec<V> = reached.iter().collect();
    if rows.is_empty() {
        return 0.0;
    }
    BitMatrix::build(rows.len(), cols.len(), |i, j| graph.connected(rows[i], cols[j])).rank()
        as f64
}
