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

//! Maximum matching across a cut, by augmenting paths in BFS layers

use std::collections::VecDeque;

use crate::graph::{Graph, V};
use crate::vertex_set::VertexSet;

use super::smaller_side;

const INFINITY: usize = usize::MAX;

/// Size of a maximum matching using only edges that cross the cut.
pub fn matching_width(graph: &Graph, left: &VertexSet, right: &VertexSet) -> f64 {
    let (side, other) = smaller_side(left, right);
    let adjacency: Vec<Vec<V>> = side
        .iter()
        .map(|v| (graph.neighborhood(v) & other).iter().collect())
        .collect();
    Matching::new(&adjacency, graph.vertex_count()).maximum() as f64
}

/// Hopcroft-Karp state. Rows of `adjacency` are the vertices of the
/// smaller side, their entries vertices of the other side.
struct Matching<'a> {
    adjacency: &'a [Vec<V>],
    mate_of_row: Vec<Option<V>>,
    mate_of_vertex: Vec<Option<usize>>,
    distance: Vec<usize>,
}

impl<'a> Matching<'a> {
    fn new(adjacency: &'a [Vec<V>], vertex_count: usize) -> Self {
        Matching {
            adjacency,
            mate_of_row: vec![None; adjacency.len()],
            mate_of_vertex: vec![None; vertex_count],
            distance: vec![INFINITY; adjacency.len()],
        }
    }

    fn maximum(mut self) -> usize {
        let mut size = 0;
        while self.layer() {
            for row in 0..self.adjacency.len() {
                if self.mate_of_row[row].is_none() && self.augment(row) {
                    size += 1;
                }
            }
        }
        size
    }

    /// Layer the rows by alternating distance from the free rows. Returns
    /// whether some free vertex is reachable.
    fn layer(&mut self) -> bool {
        let mut queue = VecDeque::new();
        for (row, mate) in self.mate_of_row.iter().enumerate() {
            if mate.is_none() {
                self.distance[row] = 0;
                queue.push_back(row);
            } else {
                self.distance[row] = INFINITY;
            }
        }

        let mut found = false;
        while let Some(row) = queue.pop_front() {
            for &v in &self.adjacency[row] {
                match self.mate_of_vertex[v] {
                    None => found = true,
                    Some(next) if self.distance[next] == INFINITY => {
                        self.distance[next] = self.distance[row] + 1;
                        queue.push_back(next);
                    }
                    Some(_) => {}
                }
            }
        }
        found
    }

    fn augment(&mut self, row: usize) -> bool {
        for i in 0..self.adjacency[row].len() {
            let v = self.adjacency[row][i];
            let reachable = match self.mate_of_vertex[v] {
                None => true,
                Some(next) => {
                    self.distance[next] == self.distance[row] + 1 && self.augment(next)
                }
            };
            if reachable {
                self.mate_of_row[row] = Some(v);
                self.mate_of_vertex[v] = Some(row);
                return true;
            }
        }
        self.distance[row] = INFINITY;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{cycle, path};
    use rstest::rstest;

    #[rstest]
    #[case(1, 1)]
    #[case(2, 3)]
    #[case(4, 4)]
    #[case(6, 2)]
    fn complete_bipartite(#[case] p: usize, #[case] q: usize) {
        let edges: Vec<_> = (0..p)
            .flat_map(|u| (p..p + q).map(move |v| (u, v)))
            .collect();
        let g = Graph::from_edges(p + q, &edges);
        let left = VertexSet::from_indices(p + q, 0..p);
        assert_eq!(matching_width(&g, &left, &left.complement()), p.min(q) as f64);
    }

    #[test]
    fn needs_augmenting_path() {
        // A greedy choice 0-3 blocks 1, which can only use 3.
        let g = Graph::from_edges(6, &[(0, 3), (0, 4), (1, 3), (2, 4), (2, 5)]);
        let left = VertexSet::from_indices(6, [0, 1, 2]);
        assert_eq!(matching_width(&g, &left, &left.complement()), 3.0);
    }

    #[test]
    fn alternating_cut_of_cycle() {
        let g = cycle(6);
        let left = VertexSet::from_indices(6, [0, 2, 4]);
        assert_eq!(matching_width(&g, &left, &left.complement()), 3.0);
        let left = VertexSet::from_indices(6, [0, 1, 2]);
        assert_eq!(matching_width(&g, &left, &left.complement()), 2.0);
        let g = path(3);
        let left = VertexSet::from_indices(3, [1]);
        assert_eq!(matching_width(&g, &left, &left.complement()), 1.0);
    }
}
