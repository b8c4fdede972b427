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

//! Simple undirected graphs with dense vertex indices

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;

use crate::vertex_set::VertexSet;

pub type V = usize;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a graph instance, used to key cached widths.
///
/// A clone or any mutation of a graph yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    fn fresh() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An undirected simple graph.
///
/// Vertices are `0..vertex_count()`. Each vertex keeps both an adjacency list
/// and its neighbourhood as a [`VertexSet`] over the whole vertex range.
#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    names: Vec<String>,
    adjacency: Vec<Vec<V>>,
    neighborhoods: Vec<VertexSet>,
}

impl Clone for Graph {
    fn clone(&self) -> Self {
        Graph {
            id: GraphId::fresh(),
            names: self.names.clone(),
            adjacency: self.adjacency.clone(),
            neighborhoods: self.neighborhoods.clone(),
        }
    }
}

impl Graph {
    /// A graph with `n` isolated vertices named `0`, `1`, ...
    pub fn new(n: usize) -> Self {
        Graph::with_names((0..n).map(|v| v.to_string()).collect())
    }

    /// A graph with one isolated vertex per name.
    pub fn with_names(names: Vec<String>) -> Self {
        let n = names.len();
        Graph {
            id: GraphId::fresh(),
            names,
            adjacency: vec![Vec::new(); n],
            neighborhoods: vec![VertexSet::new(n); n],
        }
    }

    pub fn from_edges(n: usize, edges: &[(V, V)]) -> Self {
        let mut g = Graph::new(n);
        for &(u, v) in edges {
            g.add_edge(u, v);
        }
        g
    }

    /// Add the edge `u`-`v`. Returns false for self loops and existing edges.
    pub fn add_edge(&mut self, u: V, v: V) -> bool {
        if u == v || self.neighborhoods[u].contains(v) {
            return false;
        }
        self.adjacency[u].push(v);
        self.adjacency[v].push(u);
        self.neighborhoods[u].insert(v);
        self.neighborhoods[v].insert(u);
        self.id = GraphId::fresh();
        true
    }

    #[inline]
    pub fn id(&self) -> GraphId {
        self.id
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.names.len()
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn vertices(&self) -> Range<V> {
        0..self.vertex_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = (V, V)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, ns)| ns.iter().filter(move |&&v| u < v).map(move |&v| (u, v)))
    }

    pub fn name(&self, v: V) -> &str {
        &self.names[v]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn neighbors(&self, v: V) -> &[V] {
        &self.adjacency[v]
    }

    pub fn neighborhood(&self, v: V) -> &VertexSet {
        &self.neighborhoods[v]
    }

    pub fn degree(&self, v: V) -> usize {
        self.adjacency[v].len()
    }

    pub fn connected(&self, u: V, v: V) -> bool {
        self.neighborhoods[u].contains(v)
    }

    /// The set of all vertices.
    pub fn all_vertices(&self) -> VertexSet {
        VertexSet::full(self.vertex_count())
    }

    /// Look a vertex up by name.
    pub fn vertex_by_name(&self, name: &str) -> Option<V> {
        self.names.iter().position(|n| n == name)
    }

    /// The subgraph induced by `keep`, with vertices renumbered in ascending
    /// order of their old index. Names are preserved.
    pub fn induced(&self, keep: &VertexSet) -> Graph {
        let index: FxHashMap<V, V> = keep.iter().enumerate().map(|(i, v)| (v, i)).collect();
        let mut g = Graph::with_names(keep.iter().map(|v| self.names[v].clone()).collect());
        for (u, v) in self.edges() {
            if let (Some(&a), Some(&b)) = (index.get(&u), index.get(&v)) {
                g.add_edge(a, b);
            }
        }
        g
    }

    /// The vertex sets of the connected components, ordered by smallest vertex.
    pub fn components(&self) -> Vec<VertexSet> {
        let n = self.vertex_count();
        let mut seen = VertexSet::new(n);
        let mut components = Vec::new();
        let mut stack = Vec::new();
        for start in self.vertices() {
            if seen.contains(start) {
                continue;
            }
            let mut component = VertexSet::new(n);
            seen.insert(start);
            stack.push(start);
            while let Some(v) = stack.pop() {
                component.insert(v);
                for &w in &self.adjacency[v] {
                    if !seen.contains(w) {
                        seen.insert(w);
                        stack.push(w);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }
}
