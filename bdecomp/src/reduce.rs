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

//! Reduction rules shrinking a graph before it is decomposed

use serde::{Deserialize, Serialize};

use crate::graph::{Graph, V};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum ReductionRule {
    /// Drop an isolated vertex.
    #[display("degree-zero")]
    DegreeZero,
    /// Drop a pendant vertex whose neighbour has other neighbours.
    #[display("degree-one")]
    DegreeOne,
    /// Drop a vertex of degree at least two that has a twin.
    #[display("twin")]
    Twin,
    /// Split a disconnected graph into its components.
    #[display("components")]
    Components,
}

impl ReductionRule {
    pub const ALL: [ReductionRule; 4] = [
        ReductionRule::Components,
        ReductionRule::DegreeZero,
        ReductionRule::DegreeOne,
        ReductionRule::Twin,
    ];

    pub fn is_applicable(self, graph: &Graph) -> bool {
        match self {
            ReductionRule::Components => !graph.is_connected(),
            _ => self.removable_vertex(graph).is_some(),
        }
    }

    /// The graphs left after one application of the rule. A graph the rule
    /// does not apply to is returned unchanged.
    pub fn apply(self, graph: &Graph) -> Vec<Graph> {
        match self {
            ReductionRule::Components => graph
                .components()
                .iter()
                .map(|component| graph.induced(component))
                .collect(),
            _ => match self.removable_vertex(graph) {
                Some(v) => {
                    let mut keep = graph.all_vertices();
                    keep.remove(v);
                    vec![graph.induced(&keep)]
                }
                None => vec![graph.clone()],
            },
        }
    }

    fn removable_vertex(self, graph: &Graph) -> Option<V> {
        match self {
            ReductionRule::DegreeZero => graph.vertices().find(|&v| graph.degree(v) == 0),
            ReductionRule::DegreeOne => graph.vertices().find(|&v| {
                graph.degree(v) == 1 && graph.degree(graph.neighbors(v)[0]) > 1
            }),
            ReductionRule::Twin => graph
                .vertices()
                .find(|&v| graph.degree(v) > 1 && twin(graph, v).is_some()),
            ReductionRule::Components => None,
        }
    }
}

/// A vertex with the same neighbourhood as `v`, apart from `v` itself.
fn twin(graph: &Graph, v: V) -> Option<V> {
    let nv = graph.neighborhood(v);
    let mut candidates = graph.all_vertices();
    candidates.clear();
    for &u in graph.neighbors(v) {
        candidates |= graph.neighborhood(u);
    }
    candidates.remove(v);
    candidates.iter().find(|&w| {
        let nw = graph.neighborhood(w);
        nv == nw || (nv.contains(w) && (nv ^ nw).count() == 2)
    })
}

/// Apply the first applicable rule until none applies to any graph, and
/// return the remaining non-empty graphs in order.
pub fn reduce(graph: &Graph, rules: &[ReductionRule]) -> Vec<Graph> {
    let mut reduced = Vec::new();
    let mut work = vec![graph.clone()];
    while let Some(g) = work.pop() {
        match rules.iter().find(|rule| rule.is_applicable(&g)) {
            Some(rule) => {
                let parts = rule.apply(&g);
                log::debug!(
                    "{} on {} vertices left {} graph(s)",
                    rule,
                    g.vertex_count(),
                    parts.len()
                );
                work.extend(parts.into_iter().rev());
            }
            None if g.vertex_count() > 0 => reduced.push(g),
            None => {}
        }
    }
    reduced
}
