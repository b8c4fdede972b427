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

//! Reading graphs in the DGF text format.
//!
//! ```text
//! c a comment
//! p edges 4 3
//! e a b
//! e b c
//! e c d
//! ```

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::graph::Graph;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("can't read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

pub fn load_dgf(path: impl AsRef<Path>) -> Result<Graph, LoadError> {
    let source = fs::read_to_string(path)?;
    parse_dgf(&source)
}

pub fn parse_dgf(source: &str) -> Result<Graph, LoadError> {
    let mut declared: usize = 0;
    let mut names: Vec<String> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut edges = Vec::new();

    let mut vertex = |name: &str, names: &mut Vec<String>| -> usize {
        *index.entry(name.to_string()).or_insert_with(|| {
            names.push(name.to_string());
            names.len() - 1
        })
    };

    for (i, line) in source.lines().enumerate() {
        let line_no = i + 1;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let syntax = |message: &str| LoadError::Syntax {
            line: line_no,
            message: message.to_string(),
        };
        match parts.first().copied() {
            Some("p") => {
                let count = parts.get(2).ok_or_else(|| syntax("missing vertex count"))?;
                declared = count
                    .parse()
                    .map_err(|_| syntax(&format!("invalid vertex count '{count}'")))?;
            }
            Some("n") => {
                let name = parts.get(1).ok_or_else(|| syntax("missing vertex name"))?;
                vertex(*name, &mut names);
            }
            Some("e") => {
                if parts.len() < 3 {
                    return Err(syntax("an edge needs two endpoints"));
                }
                let u = vertex(parts[1], &mut names);
                let v = vertex(parts[2], &mut names);
                edges.push((u, v));
            }
            _ => {}
        }
    }

    let missing = declared.saturating_sub(names.len());
    for k in (1..=missing).rev() {
        names.push(format!("dummy_{k}"));
    }

    let mut graph = Graph::with_names(names);
    for (u, v) in edges {
        graph.add_edge(u, v);
    }
    log::debug!(
        "loaded graph with {} vertices and {} edges",
        graph.vertex_count(),
        graph.num_edges()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_edges_and_names() {
        let g = parse_dgf("c path\np edges 4 3\ne a b\ne b c\n\ne c d\ne d c\n").unwrap();
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.names(), &["a", "b", "c", "d"]);
        assert!(g.connected(2, 3));
    }

    #[test]
    fn pads_declared_vertices() {
        let g = parse_dgf("p edge 4 1\nn x\ne x y\n").unwrap();
        assert_eq!(g.names(), &["x", "y", "dummy_2", "dummy_1"]);
        assert_eq!(g.degree(2), 0);
    }

    #[rstest]
    #[case("p edge\n", 1)]
    #[case("p edge many 3\n", 1)]
    #[case("e a b\ne c\n", 2)]
    #[case("n\n", 1)]
    fn reports_malformed_lines(#[case] source: &str, #[case] line: usize) {
        match parse_dgf(source) {
            Err(LoadError::Syntax { line: l, .. }) => assert_eq!(l, line),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_dgf("/definitely/not/here.dgf"),
            Err(LoadError::Io(_))
        ));
    }
}
