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

//! Construction heuristics for initial decomposition trees

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::decomp_tree::{Branch, DecompTree, NodeId};
use crate::error::DecompError;
use crate::graph::{Graph, V};
use crate::vertex_set::VertexSet;
use crate::width::WidthFunction;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Constructor {
    /// Join two random subtrees until one is left.
    #[display("random-bottom-up")]
    RandomBottomUp,
    /// Split the set of a random unfinished node in two random halves.
    #[display("random-top-down")]
    RandomTopDown,
    /// Join the two subtrees whose union has the smallest width.
    #[display("greedy-bottom-up")]
    GreedyBottomUp,
    /// Grow a caterpillar from a random vertex, always adding the vertex
    /// that keeps the grown side narrowest.
    #[default]
    #[display("greedy-linear")]
    GreedyLinear,
}

impl Constructor {
    /// Build a decomposition of `graph` with all widths computed.
    pub fn construct<'a>(
        self,
        graph: &'a Graph,
        width_fn: &'a WidthFunction,
        rng: &mut impl Rng,
    ) -> Result<DecompTree<'a>, DecompError> {
        let mut tree = DecompTree::new(graph, width_fn)?;
        if graph.vertex_count() > 1 {
            match self {
                Constructor::RandomBottomUp => random_bottom_up(&mut tree, rng),
                Constructor::RandomTopDown => random_top_down(&mut tree, rng),
                Constructor::GreedyBottomUp => greedy_bottom_up(&mut tree),
                Constructor::GreedyLinear => greedy_linear(&mut tree, rng),
            }
        }
        tree.compute_width()?;
        log::debug!(
            "{} tree for {} vertices: width {}, cost {:.2}",
            self,
            graph.vertex_count(),
            tree.width(),
            tree.cost()
        );
        Ok(tree)
    }
}

/// Hang `left` and `right` below the internal node `parent`.
fn join(tree: &mut DecompTree, parent: NodeId, left: NodeId, right: NodeId) {
    tree.attach(Some(parent), left, Branch::Left);
    tree.attach(Some(parent), right, Branch::Right);
}

fn random_bottom_up(tree: &mut DecompTree, rng: &mut impl Rng) {
    let n = tree.vertex_count();
    let mut active: Vec<NodeId> = (0..n).collect();
    for parent in tree.internal_nodes() {
        let size = active.len();
        let first = rng.random_range(0..size);
        let mut second = rng.random_range(0..size - 1);
        if second >= first {
            second += 1;
        }
        join(tree, parent, active[first], active[second]);
        active[first] = parent;
        active.swap_remove(second);
    }
    tree.attach(None, active[0], Branch::Left);
}

fn greedy_bottom_up(tree: &mut DecompTree) {
    let (graph, width_fn) = (tree.graph(), tree.width_function());
    let n = tree.vertex_count();
    let mut active: Vec<(NodeId, VertexSet)> =
        (0..n).map(|v| (v, VertexSet::singleton(n, v))).collect();
    for parent in tree.internal_nodes() {
        let mut best = (f64::INFINITY, 0, 1);
        for i in 0..active.len() {
            for j in (i + 1)..active.len() {
                let width = width_fn.width(graph, &(&active[i].1 | &active[j].1));
                if width < best.0 {
                    best = (width, i, j);
                }
            }
        }
        let (_, first, second) = best;
        join(tree, parent, active[first].0, active[second].0);
        let set = &active[first].1 | &active[second].1;
        active[first] = (parent, set);
        active.swap_remove(second);
    }
    tree.attach(None, active[0].0, Branch::Left);
}

fn random_top_down(tree: &mut DecompTree, rng: &mut impl Rng) {
    let mut internal = tree.internal_nodes();
    let Some(root) = internal.next() else {
        return;
    };
    tree.attach(None, root, Branch::Left);
    let mut pending: Vec<(NodeId, Vec<V>)> = vec![(root, tree.graph().vertices().collect())];
    while !pending.is_empty() {
        let (parent, mut vertices) = pending.swap_remove(rng.random_range(0..pending.len()));
        vertices.shuffle(rng);
        let split = rng.random_range(1..vertices.len());
        let (left, right) = vertices.split_at(split);
        for (branch, part) in [(Branch::Left, left), (Branch::Right, right)] {
            let child = match part {
                [v] => tree.leaf(*v),
                _ => {
                    let Some(id) = internal.next() else {
                        return;
                    };
                    pending.push((id, part.to_vec()));
                    id
                }
            };
            tree.attach(Some(parent), child, branch);
        }
    }
}

fn greedy_linear(tree: &mut DecompTree, rng: &mut impl Rng) {
    let (graph, width_fn) = (tree.graph(), tree.width_function());
    let n = tree.vertex_count();
    let start = rng.random_range(0..n);
    let mut grown = VertexSet::singleton(n, start);
    let mut rest = grown.complement();
    let mut reach = graph.neighborhood(start).clone();
    let mut root = tree.leaf(start);

    for parent in tree.internal_nodes() {
        // Prefer vertices close to the grown side.
        let near = &grown | &reach;
        let mut candidates: Vec<V> = rest
            .iter()
            .filter(|&v| graph.neighborhood(v).intersects(&near))
            .collect();
        if candidates.is_empty() {
            candidates = rest.iter().collect();
        }

        let mut best = (f64::INFINITY, None);
        for v in candidates {
            grown.insert(v);
            rest.remove(v);
            let width = width_fn.width_of_cut(graph, &grown, &rest);
            grown.remove(v);
            rest.insert(v);
            if width < best.0 {
                best = (width, Some(v));
            }
        }
        let Some(v) = best.1 else {
            break;
        };

        grown.insert(v);
        rest.remove(v);
        reach |= graph.neighborhood(v);
        reach.remove(v);
        let leaf = tree.leaf(v);
        tree.attach(None, parent, Branch::Left);
        join(tree, parent, leaf, root);
        root = parent;
    }
}
