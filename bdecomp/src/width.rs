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

//! Symmetric width functions on cuts of a graph
//!
//! A cut is a 2-partition of the vertices, given by one side as a
//! [`VertexSet`]. Every width is evaluated through a [`WidthFunction`],
//! which memoises results per graph in a [`WidthCache`].

pub mod boolean;
pub mod cache;
pub mod matching;
pub mod rank;

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::vertex_set::VertexSet;

pub use cache::{CacheStats, WidthCache, DEFAULT_CAPACITY};

/// The width parameters that can score a cut.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum WidthParameter {
    /// Rank of the cut's adjacency matrix over GF(2).
    #[default]
    #[display("rank-width")]
    Rank,
    /// Size of a maximum matching in the bipartite graph of the cut.
    #[display("maximum-matching-width")]
    MaximumMatching,
    /// log2 of the number of distinct neighbourhoods across the cut.
    #[display("boolean-width")]
    Boolean,
}

impl WidthParameter {
    /// Compute the width of the cut `(left, right)` from scratch.
    pub fn compute(self, graph: &Graph, left: &VertexSet, right: &VertexSet) -> f64 {
        match self {
            WidthParameter::Rank => rank::rank_width(graph, left, right),
            WidthParameter::MaximumMatching => matching::matching_width(graph, left, right),
            WidthParameter::Boolean => boolean::boolean_width(graph, left, right),
        }
    }
}

/// Returns the smaller side of a cut first. Ties pick `right`.
pub(crate) fn smaller_side<'s>(
    left: &'s VertexSet,
    right: &'s VertexSet,
) -> (&'s VertexSet, &'s VertexSet) {
    if left.count() < right.count() {
        (left, right)
    } else {
        (right, left)
    }
}

/// A width parameter together with its cache.
///
/// Widths are looked up through a [`RefCell`], so a single function can be
/// shared by reference between any number of trees over the same graphs.
#[derive(Debug)]
pub struct WidthFunction {
    parameter: WidthParameter,
    cache: RefCell<WidthCache>,
}

impl WidthFunction {
    pub fn new(parameter: WidthParameter) -> Self {
        WidthFunction::with_capacity(parameter, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(parameter: WidthParameter, capacity: usize) -> Self {
        WidthFunction {
            parameter,
            cache: RefCell::new(WidthCache::new(capacity)),
        }
    }

    pub fn parameter(&self) -> WidthParameter {
        self.parameter
    }

    /// Width of the cut between `left` and its complement.
    pub fn width(&self, graph: &Graph, left: &VertexSet) -> f64 {
        self.cached(graph, left, || left.complement())
    }

    /// Width of the cut between `left` and `right`.
    ///
    /// `right` must be the complement of `left` within the graph.
    pub fn width_of_cut(&self, graph: &Graph, left: &VertexSet, right: &VertexSet) -> f64 {
        debug_assert_eq!(*right, left.complement());
        self.cached(graph, left, || right.clone())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    fn cached(&self, graph: &Graph, left: &VertexSet, right: impl FnOnce() -> VertexSet) -> f64 {
        let hit = self.cache.borrow_mut().get(graph.id(), left);
        if let Some(width) = hit {
            return width;
        }
        let right = right();
        let width = self.parameter.compute(graph, left, &right);
        let mut cache = self.cache.borrow_mut();
        cache.insert(graph.id(), left.clone(), width);
        cache.insert(graph.id(), right, width);
        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{cycle, path, random_graph};
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case(WidthParameter::Rank)]
    #[case(WidthParameter::MaximumMatching)]
    #[case(WidthParameter::Boolean)]
    fn width_is_symmetric(#[case] parameter: WidthParameter) {
        let mut rng = SmallRng::seed_from_u64(11);
        let g = random_graph(12, 0.4, &mut rng);
        for _ in 0..40 {
            let left = VertexSet::from_indices(12, (0..12).filter(|_| rng.random_bool(0.5)));
            let a = parameter.compute(&g, &left, &left.complement());
            let b = parameter.compute(&g, &left.complement(), &left);
            assert_eq!(a, b, "asymmetric {} on {:?}", parameter, left);
        }
    }

    #[rstest]
    #[case(WidthParameter::Rank)]
    #[case(WidthParameter::MaximumMatching)]
    #[case(WidthParameter::Boolean)]
    fn degenerate_cut_is_zero(#[case] parameter: WidthParameter) {
        let g = cycle(5);
        let empty = VertexSet::new(5);
        assert_eq!(parameter.compute(&g, &empty, &empty.complement()), 0.0);
    }

    #[test]
    fn cut_and_complement_are_cached_together() {
        let g = path(6);
        let f = WidthFunction::new(WidthParameter::Rank);
        let left = VertexSet::from_indices(6, [0, 1, 2]);
        assert_eq!(f.width(&g, &left), 1.0);
        assert_eq!(f.width(&g, &left.complement()), 1.0);
        let stats = f.cache_stats();
        assert_eq!(stats.size, 2);
        assert_eq!((stats.requests, stats.hits), (2, 1));
    }

    #[test]
    fn separate_graphs_get_separate_entries() {
        let g = path(4);
        let mut h = g.clone();
        h.add_edge(0, 3);
        let f = WidthFunction::new(WidthParameter::MaximumMatching);
        let left = VertexSet::from_indices(4, [0, 1]);
        assert_eq!(f.width(&g, &left), 1.0);
        assert_eq!(f.width(&h, &left), 2.0);
    }

    #[test]
    fn parameter_names() {
        assert_eq!(WidthParameter::Rank.to_string(), "rank-width");
        assert_eq!(WidthParameter::Boolean.to_string(), "boolean-width");
    }
}
