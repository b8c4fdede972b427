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

//! Least-recently-used store of cut widths, keyed by graph and vertex set

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::graph::GraphId;
use crate::vertex_set::VertexSet;

pub const DEFAULT_CAPACITY: usize = 1_000_000;

#[derive(Debug, Clone)]
struct Entry {
    graph: GraphId,
    key: VertexSet,
    value: f64,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Bounded width cache with least-recently-used eviction.
///
/// Entries live in a slab and are threaded onto a doubly linked recency
/// list, with `head` the least and `tail` the most recently used entry.
#[derive(Clone)]
pub struct WidthCache {
    capacity: usize,
    index: FxHashMap<GraphId, FxHashMap<VertexSet, usize>>,
    entries: Vec<Entry>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    hits: u64,
    requests: u64,
}

/// Usage counters of a [`WidthCache`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub requests: u64,
    pub hits: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size = {}, maximum size = {}, requests = {}, hit ratio = {:.2}",
            self.size,
            self.capacity,
            self.requests,
            self.hit_ratio()
        )
    }
}

impl fmt::Debug for WidthCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WidthCache({})", self.stats())
    }
}

impl Default for WidthCache {
    fn default() -> Self {
        WidthCache::new(DEFAULT_CAPACITY)
    }
}

impl WidthCache {
    pub fn new(capacity: usize) -> Self {
        WidthCache {
            capacity,
            index: FxHashMap::default(),
            entries: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            hits: 0,
            requests: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len,
            capacity: self.capacity,
            requests: self.requests,
            hits: self.hits,
        }
    }

    /// Look up a cut and mark it as most recently used.
    pub fn get(&mut self, graph: GraphId, key: &VertexSet) -> Option<f64> {
        self.requests += 1;
        let slot = *self.index.get(&graph)?.get(key)?;
        self.hits += 1;
        self.unlink(slot);
        self.push_back(slot);
        Some(self.entries[slot].value)
    }

    /// Whether a cut is stored, without touching the recency order or counters.
    pub fn contains(&self, graph: GraphId, key: &VertexSet) -> bool {
        self.index
            .get(&graph)
            .is_some_and(|entries| entries.contains_key(key))
    }

    /// Store a cut as the most recently used entry, evicting the least
    /// recently used one when the capacity is exceeded.
    pub fn insert(&mut self, graph: GraphId, key: VertexSet, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if let Some(&slot) = self.index.get(&graph).and_then(|entries| entries.get(&key)) {
            self.entries[slot].value = value;
            self.unlink(slot);
            self.push_back(slot);
            return;
        }

        let entry = Entry {
            graph,
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.entries[slot] = entry;
                slot
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        self.index.entry(graph).or_default().insert(key, slot);
        self.push_back(slot);
        self.len += 1;

        if self.len > self.capacity {
            self.evict_oldest();
        }
    }

    /// Drop every entry, keeping the counters.
    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn evict_oldest(&mut self) {
        let Some(slot) = self.head else {
            return;
        };
        self.unlink(slot);
        let Entry { graph, key, .. } = &self.entries[slot];
        if let Some(entries) = self.index.get_mut(graph) {
            entries.remove(key);
            if entries.is_empty() {
                self.index.remove(graph);
            }
        }
        log::trace!("evicted cut {:?} from the width cache", self.entries[slot].key);
        self.entries[slot].key = VertexSet::default();
        self.free.push(slot);
        self.len -= 1;
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.entries[slot].prev, self.entries[slot].next);
        match prev {
            Some(p) => self.entries[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.entries[n].prev = prev,
            None => self.tail = prev,
        }
        self.entries[slot].prev = None;
        self.entries[slot].next = None;
    }

    fn push_back(&mut self, slot: usize) {
        self.entries[slot].prev = self.tail;
        self.entries[slot].next = None;
        match self.tail {
            Some(t) => self.entries[t].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::path;

    fn key(v: usize) -> VertexSet {
        VertexSet::singleton(8, v)
    }

    #[test]
    fn evicts_least_recently_used() {
        let g = path(8);
        let mut cache = WidthCache::new(3);
        cache.insert(g.id(), key(0), 0.0);
        cache.insert(g.id(), key(1), 1.0);
        cache.insert(g.id(), key(2), 2.0);
        assert_eq!(cache.get(g.id(), &key(0)), Some(0.0));

        cache.insert(g.id(), key(3), 3.0);
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(g.id(), &key(1)));
        assert!(cache.contains(g.id(), &key(0)));

        cache.insert(g.id(), key(4), 4.0);
        assert!(!cache.contains(g.id(), &key(2)));
        assert_eq!(cache.get(g.id(), &key(3)), Some(3.0));
        assert_eq!(cache.get(g.id(), &key(4)), Some(4.0));
        assert_eq!(cache.get(g.id(), &key(0)), Some(0.0));
    }

    #[test]
    fn graphs_do_not_collide() {
        let g = path(8);
        let h = g.clone();
        let mut cache = WidthCache::default();
        cache.insert(g.id(), key(5), 1.0);
        assert_eq!(cache.get(h.id(), &key(5)), None);
        assert_eq!(cache.get(g.id(), &key(5)), Some(1.0));
        let stats = cache.stats();
        assert_eq!((stats.requests, stats.hits), (2, 1));
        assert!((stats.hit_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reinsert_refreshes_entry() {
        let g = path(8);
        let mut cache = WidthCache::new(2);
        cache.insert(g.id(), key(0), 0.0);
        cache.insert(g.id(), key(1), 1.0);
        cache.insert(g.id(), key(0), 5.0);
        cache.insert(g.id(), key(2), 2.0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(g.id(), &key(0)), Some(5.0));
        assert!(!cache.contains(g.id(), &key(1)));
    }

    #[test]
    fn slots_are_reused_after_eviction() {
        let g = path(8);
        let mut cache = WidthCache::new(2);
        for v in 0..8 {
            cache.insert(g.id(), key(v), v as f64);
        }
        assert_eq!(cache.entries.len(), 3);
        assert_eq!(cache.get(g.id(), &key(6)), Some(6.0));
        assert_eq!(cache.get(g.id(), &key(7)), Some(7.0));
    }
}
