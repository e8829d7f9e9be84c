//! Dependency graph view using petgraph.
//!
//! Projects a [`PackageJson`] traversal onto a directed graph so that
//! relationship queries (dependents, cycles, depth) can reuse petgraph's
//! algorithms. Edges point from the dependent package to its dependency and
//! carry the category they were declared under.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use super::package_json::{NodeId, PackageJson};
use crate::parser::DependencyKind;

/// A package as seen by the graph view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Display name (manifest name, or the name it was looked up by)
    pub name: String,
    /// Installed version, if the manifest declared one
    pub version: Option<String>,
    /// Whether a manifest was found on disk
    pub installed: bool,
}

/// A directed graph over one traversal.
///
/// Dependencies are looked up by the name they were resolved under. The
/// project at the top of a root traversal has no such name and is only
/// reachable through [`DependencyGraph::root`].
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<GraphNode, DependencyKind>,
    /// Maps package names to their node indices for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl DependencyGraph {
    /// Builds the graph view of a traversal.
    ///
    /// Every arena node becomes a graph node; every category link becomes an
    /// edge, so a package listed under two categories of the same parent has
    /// two parallel edges.
    pub fn from_package_json(pkg: &PackageJson) -> Self {
        let mut graph = DiGraph::with_capacity(pkg.node_count(), pkg.node_count());
        let mut node_indices = HashMap::with_capacity(pkg.node_count());
        let mut by_id = Vec::with_capacity(pkg.node_count());

        for (id, node) in pkg.nodes() {
            let idx = graph.add_node(GraphNode {
                name: node.label().to_string(),
                version: node.version().map(str::to_string),
                installed: node.is_installed(),
            });
            if id != NodeId::ROOT || !pkg.is_root() {
                node_indices.insert(node.id().to_string(), idx);
            }
            by_id.push(idx);
        }

        for (id, node) in pkg.nodes() {
            for (kind, _, child) in node.edges() {
                graph.add_edge(by_id[id.index()], by_id[child.index()], kind);
            }
        }

        Self {
            graph,
            node_indices,
            root: by_id[0],
        }
    }

    /// The node the traversal was built from.
    pub fn root(&self) -> &GraphNode {
        &self.graph[self.root]
    }

    /// Gets a node by the name it was resolved under.
    pub fn get_node(&self, name: &str) -> Option<&GraphNode> {
        self.node_indices
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Gets the direct dependencies of a package (outgoing edges), with the
    /// category of each link.
    pub fn get_dependencies(&self, name: &str) -> Vec<(DependencyKind, &GraphNode)> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Gets the packages that depend on `name` (incoming edges).
    pub fn get_dependents(&self, name: &str) -> Vec<(DependencyKind, &GraphNode)> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<(DependencyKind, &GraphNode)> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (*edge.weight(), &self.graph[other])
            })
            .collect()
    }

    /// Checks if the graph contains cycles.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Detects and returns all cycles in the graph.
    ///
    /// Each strongly connected component with more than one node is a cycle,
    /// as is a single node with a self-loop.
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&self.graph) {
            if scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]) {
                let mut nodes: Vec<String> = scc
                    .iter()
                    .map(|&idx| self.graph[idx].name.clone())
                    .collect();
                nodes.reverse();
                cycles.push(CycleInfo { nodes });
            }
        }

        cycles
    }

    /// Returns the set of package names that are part of any cycle.
    pub fn get_nodes_in_cycles(&self) -> HashSet<String> {
        self.detect_cycles()
            .into_iter()
            .flat_map(|cycle| cycle.nodes)
            .collect()
    }

    /// Shortest distance from the root to the dependency `name`.
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        let target = *self.node_indices.get(name)?;
        self.depths().get(&target).copied()
    }

    /// Gets the nodes at a given distance from the root.
    pub fn get_nodes_at_depth(&self, depth: usize) -> Vec<&GraphNode> {
        let mut nodes: Vec<&GraphNode> = self
            .depths()
            .into_iter()
            .filter(|&(_, d)| d == depth)
            .map(|(idx, _)| &self.graph[idx])
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }

    fn depths(&self) -> HashMap<NodeIndex, usize> {
        let mut depths = HashMap::with_capacity(self.graph.node_count());
        depths.insert(self.root, 0);

        let mut bfs = Bfs::new(&self.graph, self.root);
        while let Some(idx) = bfs.next(&self.graph) {
            let depth = depths[&idx];
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                depths.entry(next).or_insert(depth + 1);
            }
        }

        depths
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if a package name resolved to a node.
    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }
}

/// Information about a detected circular dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The package names in the cycle (the last connects back to the first)
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        match self.nodes.first() {
            Some(first) => format!("{} -> {}", self.nodes.join(" -> "), first),
            None => String::new(),
        }
    }

    /// Returns the number of packages in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
