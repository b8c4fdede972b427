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

//! Fixed-size sets of vertex indices

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Sub, SubAssign};

use fixedbitset::{FixedBitSet, Ones};

/// A subset of `0..len()`.
///
/// The universe size is fixed at creation. Equality and hashing depend on
/// the universe size and the members only.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexSet(FixedBitSet);

impl VertexSet {
    /// The empty set over a universe of `len` vertices.
    pub fn new(len: usize) -> Self {
        VertexSet(FixedBitSet::with_capacity(len))
    }

    /// The set containing every vertex of the universe.
    pub fn full(len: usize) -> Self {
        let mut bits = FixedBitSet::with_capacity(len);
        bits.insert_range(..);
        VertexSet(bits)
    }

    pub fn singleton(len: usize, v: usize) -> Self {
        let mut s = VertexSet::new(len);
        s.insert(v);
        s
    }

    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut s = VertexSet::new(len);
        for v in indices {
            s.insert(v);
        }
        s
    }

    /// Size of the universe.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        self.0.contains(v)
    }

    /// Panics if `v` is outside of the universe.
    #[inline]
    pub fn insert(&mut self, v: usize) {
        self.0.insert(v);
    }

    #[inline]
    pub fn remove(&mut self, v: usize) {
        if v < self.len() {
            self.0.remove(v);
        }
    }

    pub fn set(&mut self, v: usize, value: bool) {
        if value {
            self.insert(v);
        } else {
            self.remove(v);
        }
    }

    /// Number of vertices in the set.
    pub fn count(&self) -> usize {
        self.0.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_clear()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn intersects(&self, other: &VertexSet) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn is_subset(&self, other: &VertexSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &VertexSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Replace the set by its complement within the universe.
    pub fn complement_in_place(&mut self) {
        self.0.toggle_range(..);
    }

    pub fn complement(&self) -> VertexSet {
        let mut s = self.clone();
        s.complement_in_place();
        s
    }

    /// The smallest vertex of the set.
    pub fn first(&self) -> Option<usize> {
        self.0.minimum()
    }

    /// Iterate over the vertices in ascending order.
    pub fn iter(&self) -> Ones<'_> {
        self.0.ones()
    }
}

impl<'a> IntoIterator for &'a VertexSet {
    type Item = usize;
    type IntoIter = Ones<'a>;

    fn into_iter(self) -> Ones<'a> {
        self.iter()
    }
}

impl fmt::Debug for VertexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl BitOrAssign<&VertexSet> for VertexSet {
    fn bitor_assign(&mut self, rhs: &VertexSet) {
        debug_assert_eq!(self.len(), rhs.len(), "vertex sets over different universes");
        self.0.union_with(&rhs.0);
    }
}

impl BitAndAssign<&VertexSet> for VertexSet {
    fn bitand_assign(&mut self, rhs: &VertexSet) {
        debug_assert_eq!(self.len(), rhs.len(), "vertex sets over different universes");
        self.0.intersect_with(&rhs.0);
    }
}

impl BitXorAssign<&VertexSet> for VertexSet {
    fn bitxor_assign(&mut self, rhs: &VertexSet) {
        debug_assert_eq!(self.len(), rhs.len(), "vertex sets over different universes");
        self.0.symmetric_difference_with(&rhs.0);
    }
}

impl SubAssign<&VertexSet> for VertexSet {
    fn sub_assign(&mut self, rhs: &VertexSet) {
        self.0.difference_with(&rhs.0);
    }
}

macro_rules! binop {
    ($trait:ident, $method:ident, $assign:ident) => {
        impl $trait<&VertexSet> for &VertexSet {
            type Output = VertexSet;

            fn $method(self, rhs: &VertexSet) -> VertexSet {
                let mut s = self.clone();
                s.$assign(rhs);
                s
            }
        }
    };
}

binop!(BitOr, bitor, bitor_assign);
binop!(BitAnd, bitand, bitand_assign);
binop!(BitXor, bitxor, bitxor_assign);
binop!(Sub, sub, sub_assign);

impl Not for &VertexSet {
    type Output = VertexSet;

    fn not(self) -> VertexSet {
        self.complement()
    }
}
