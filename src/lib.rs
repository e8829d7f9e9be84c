//! pkgscope - inspect a project's package.json and installed dependency tree
//!
//! This crate reads `package.json` manifests from a project and its
//! `node_modules` directory and builds an in-memory graph of declared and
//! transitive dependencies, without shelling out to a package manager.

pub mod export;
pub mod graph;
pub mod parser;

pub use graph::{DependencyGraph, NodeId, PackageJson, PackageNode};
pub use parser::{DependencyKind, Manifest, ManifestReader, ReadError, ReadResult};
