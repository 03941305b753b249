//! Dependency graph management using `petgraph`.
//!
//! Builds a directed acyclic graph from environment references and resolves
//! the order, and the parallel levels, in which environments are compiled.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use pinmulti_common::error::{PinmultiError, Result};
use pinmulti_common::types::Environment;

/// A dependency graph of environments.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: petgraph::Graph<String, ()>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
        }
    }

    /// Builds the graph of `environments` and their references.
    ///
    /// References to environments outside the set are ignored.
    #[must_use]
    pub fn from_environments(environments: &[Environment]) -> Self {
        let mut graph = Self::new();
        let mut node_map = HashMap::new();
        for env in environments {
            let idx = graph.add_environment(env.name.as_str());
            let _ = node_map.insert(env.name.as_str(), idx);
        }
        for env in environments {
            for reference in &env.references {
                if let (Some(&dependent), Some(&dependency)) =
                    (node_map.get(env.name.as_str()), node_map.get(reference.as_str()))
                {
                    graph.add_dependency(dependent, dependency);
                }
            }
        }
        graph
    }

    /// Adds an environment node to the graph.
    pub fn add_environment(&mut self, name: impl Into<String>) -> NodeIndex {
        self.graph.add_node(name.into())
    }

    /// Adds a dependency edge: `dependent` references `dependency`.
    ///
    /// The graph edge points from `dependency` to `dependent`
    /// so that topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.add_edge(dependency, dependent, ());
    }

    /// Returns a topological ordering of environments for compilation.
    ///
    /// Referenced environments appear before the environments that
    /// reference them.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        self.sorted_indices().map(|indices| {
            indices
                .iter()
                .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                .collect()
        })
    }

    /// Groups environments into levels that can be compiled concurrently.
    ///
    /// Every environment in level N references only environments in
    /// levels before N. Names within a level are sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn parallel_levels(&self) -> Result<Vec<Vec<String>>> {
        let sorted = self.sorted_indices()?;
        let mut levels: Vec<Vec<String>> = Vec::new();
        let mut processed: HashMap<NodeIndex, usize> = HashMap::new();

        for idx in sorted {
            let level = self
                .graph
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .filter_map(|dep| processed.get(&dep).map(|l| l + 1))
                .max()
                .unwrap_or(0);
            if level >= levels.len() {
                levels.resize(level + 1, Vec::new());
            }
            levels[level].push(self.graph[idx].clone());
            let _ = processed.insert(idx, level);
        }

        for level in &mut levels {
            level.sort();
        }
        Ok(levels)
    }

    fn sorted_indices(&self) -> Result<Vec<NodeIndex>> {
        petgraph::algo::toposort(&self.graph, None).map_err(|cycle| PinmultiError::Config {
            message: format!(
                "cyclic reference detected involving environment \"{}\"",
                self.graph[cycle.node_id()]
            ),
        })
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pinmulti_common::types::{EnvName, OutputLayout};

    use super::*;

    #[test]
    fn empty_graph_resolves_to_empty() {
        let graph = DependencyGraph::new();
        assert!(graph.resolve_order().expect("should resolve").is_empty());
        assert!(graph.parallel_levels().expect("should resolve").is_empty());
    }

    #[test]
    fn linear_reference_chain() {
        let mut graph = DependencyGraph::new();
        let test = graph.add_environment("test");
        let base = graph.add_environment("base");
        graph.add_dependency(test, base);

        let order = graph.resolve_order().expect("should resolve");
        let test_pos = order.iter().position(|n| n == "test").expect("test");
        let base_pos = order.iter().position(|n| n == "base").expect("base");
        assert!(base_pos < test_pos, "base should come before test: {order:?}");
    }

    #[test]
    fn diamond_levels() {
        let mut graph = DependencyGraph::new();
        let local = graph.add_environment("local");
        let test = graph.add_environment("test");
        let docs = graph.add_environment("docs");
        let base = graph.add_environment("base");
        graph.add_dependency(local, test);
        graph.add_dependency(local, docs);
        graph.add_dependency(test, base);
        graph.add_dependency(docs, base);

        let levels = graph.parallel_levels().expect("should resolve");
        assert_eq!(
            levels,
            vec![
                vec!["base".to_owned()],
                vec!["docs".to_owned(), "test".to_owned()],
                vec!["local".to_owned()],
            ]
        );
    }

    #[test]
    fn uneven_depths_use_longest_path() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_environment("a");
        let b = graph.add_environment("b");
        let c = graph.add_environment("c");
        graph.add_dependency(b, a);
        graph.add_dependency(c, b);
        graph.add_dependency(c, a);

        let levels = graph.parallel_levels().expect("should resolve");
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[2], vec!["c".to_owned()]);
    }

    #[test]
    fn cycle_detection() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_environment("a");
        let b = graph.add_environment("b");
        graph.add_dependency(a, b);
        graph.add_dependency(b, a);

        let msg = graph.resolve_order().unwrap_err().to_string();
        assert!(msg.contains("cyclic"), "got: {msg}");
        assert!(graph.parallel_levels().is_err());
    }

    #[test]
    fn builds_from_environments() {
        let layout = OutputLayout::new("req", "txt");
        let envs = vec![
            Environment::new("test", "req/test.in", &layout, vec![EnvName::new("base")]),
            Environment::new("base", "req/base.in", &layout, Vec::new()),
            Environment::new("docs", "req/docs.in", &layout, Vec::new()),
        ];

        let levels = DependencyGraph::from_environments(&envs)
            .parallel_levels()
            .expect("should resolve");
        assert_eq!(
            levels,
            vec![vec!["base".to_owned(), "docs".to_owned()], vec!["test".to_owned()]]
        );
    }
}
