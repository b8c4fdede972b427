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

//! Optimal decompositions for a fixed leaf order
//!
//! Given the left-to-right order of the leaves of a tree, dynamic
//! programming over contiguous intervals of that order finds the tree of
//! least width among all trees with the same order.

use crate::decomp_tree::{Branch, DecompTree, NodeId};
use crate::error::DecompError;

/// Rebuild `tree` as the narrowest tree with its leaf order.
///
/// Intervals whose best split is already wider than `tree` are not
/// evaluated, so the result is never wider than the input.
pub fn optimal_ordered_tree<'a>(tree: &DecompTree<'a>) -> Result<DecompTree<'a>, DecompError> {
    let (graph, width_fn) = (tree.graph(), tree.width_function());
    let order = tree.leaves_in_order();
    let n = order.len();
    let bound = tree.width();

    // widths[index * (n + 1) + len]: least width of a tree over the `len`
    // leaves starting at `index`.
    let mut widths = vec![f64::INFINITY; n * (n + 1)];
    let at = |index: usize, len: usize| index * (n + 1) + len;
    for index in (0..n).rev() {
        let mut set = tree.node(tree.leaf(order[index])).set().clone();
        widths[at(index, 1)] = tree.node(tree.leaf(order[index])).width();
        for len in 2..=(n - index) {
            set.insert(order[index + len - 1]);
            let children = (1..len)
                .map(|left| widths[at(index, left)].max(widths[at(index + left, len - left)]))
                .fold(f64::INFINITY, f64::min);
            widths[at(index, len)] = if children > bound {
                f64::INFINITY
            } else {
                children.max(width_fn.width(graph, &set))
            };
        }
    }

    let mut result = DecompTree::new(graph, width_fn)?;
    let mut internal = result.internal_nodes();
    let mut stack: Vec<(Option<NodeId>, Branch, usize, usize)> = vec![(None, Branch::Left, 0, n)];
    while let Some((parent, branch, index, len)) = stack.pop() {
        let id = if len == 1 {
            result.leaf(order[index])
        } else {
            let id = internal.next().ok_or(DecompError::NotBuilt)?;
            // The last of the best splits.
            let mut split = (f64::INFINITY, 1);
            for left in 1..len {
                let width = widths[at(index, left)].max(widths[at(index + left, len - left)]);
                if width <= split.0 {
                    split = (width, left);
                }
            }
            let left = split.1;
            stack.push((Some(id), Branch::Left, index, left));
            stack.push((Some(id), Branch::Right, index + left, len - left));
            id
        };
        result.attach(parent, id, branch);
    }
    result.compute_width()?;
    log::debug!(
        "ordered tree of width {} for a tree of width {}",
        result.width(),
        bound
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::Constructor;
    use crate::graph::tests::{path, random_graph};
    use crate::width::{WidthFunction, WidthParameter};
    use rand::{rngs::SmallRng, SeedableRng};
    use rstest::rstest;

    #[test]
    fn fixes_a_bad_split_of_a_path() {
        let g = path(6);
        let f = WidthFunction::new(WidthParameter::Rank);
        // ((0, 1), ((2, 3), (4, 5))), where {2, 3} cuts two edges.
        let mut tree = DecompTree::new(&g, &f).unwrap();
        tree.attach(None, 6, Branch::Left);
        for (parent, left, right) in [(6, 7, 8), (7, 0, 1), (8, 9, 10), (9, 2, 3), (10, 4, 5)] {
            tree.attach(Some(parent), left, Branch::Left);
            tree.attach(Some(parent), right, Branch::Right);
        }
        tree.compute_width().unwrap();
        assert_eq!(tree.width(), 2.0);

        let optimal = optimal_ordered_tree(&tree).unwrap();
        assert!(optimal.is_consistent());
        assert_eq!(optimal.width(), 1.0);
        assert_eq!(optimal.leaves_in_order(), tree.leaves_in_order());
    }

    #[rstest]
    #[case(WidthParameter::Rank)]
    #[case(WidthParameter::MaximumMatching)]
    #[case(WidthParameter::Boolean)]
    fn never_wider_than_input(#[case] parameter: WidthParameter) {
        let mut rng = SmallRng::seed_from_u64(43);
        for n in [1, 2, 5, 12] {
            let g = random_graph(n, 0.35, &mut rng);
            let f = WidthFunction::new(parameter);
            let tree = Constructor::RandomBottomUp.construct(&g, &f, &mut rng).unwrap();
            let optimal = optimal_ordered_tree(&tree).unwrap();
            assert!(optimal.is_consistent());
            assert!(optimal.width() <= tree.width());
            assert_eq!(optimal.leaves_in_order(), tree.leaves_in_order());
        }
    }
}
