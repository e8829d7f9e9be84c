//! Graph module for dependency relationship modeling.
//!
//! [`PackageJson`] walks the installed tree and owns the resulting nodes;
//! [`DependencyGraph`] is a petgraph projection of one walk for relationship
//! queries such as cycle detection.
//!
//! # Example
//!
//! ```no_run
//! use pkgscope::graph::PackageJson;
//! use pkgscope::parser::ManifestReader;
//!
//! let mut pkg = PackageJson::root();
//! pkg.read(&ManifestReader::new(".")).unwrap();
//!
//! let graph = pkg.to_graph();
//! for cycle in graph.detect_cycles() {
//!     println!("{}", cycle.cycle_path());
//! }
//! ```

mod dependency_graph;
mod package_json;

pub use dependency_graph::{CycleInfo, DependencyGraph, GraphNode};
pub use package_json::{Edges, NodeId, PackageJson, PackageNode};
