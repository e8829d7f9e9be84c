//! JSON export implementation.
//!
//! Exports a traversal as one JSON document: the project, per-category
//! counts, and every discovered package with its outgoing links.

use super::Exporter;
use crate::graph::{PackageJson, PackageNode};
use crate::parser::DependencyKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Project info for JSON output.
#[derive(Serialize)]
struct JsonProject {
    name: Option<String>,
    version: Option<String>,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    total_packages: usize,
    missing_packages: usize,
    /// Direct links from the project, keyed by manifest field name
    direct: BTreeMap<&'static str, usize>,
}

/// One outgoing link.
#[derive(Serialize)]
struct JsonLink {
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Serializable package for JSON output.
#[derive(Serialize)]
struct JsonPackage {
    name: String,
    version: Option<String>,
    installed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<JsonLink>,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport {
    project: JsonProject,
    summary: JsonSummary,
    dependencies: Vec<JsonLink>,
    packages: Vec<JsonPackage>,
}

fn links(node: &PackageNode) -> Vec<JsonLink> {
    node.edges()
        .map(|(kind, name, _)| JsonLink {
            name: name.to_string(),
            kind: kind.field_name(),
        })
        .collect()
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, pkg: &PackageJson, writer: &mut W) -> io::Result<()> {
        let packages: Vec<JsonPackage> = pkg
            .flat_dependencies()
            .iter()
            .filter_map(|(name, &id)| pkg.node(id).map(|node| (name, node)))
            .map(|(name, node)| JsonPackage {
                name: name.clone(),
                version: node.version().map(str::to_string),
                installed: node.is_installed(),
                dependencies: links(node),
            })
            .collect();

        let direct = DependencyKind::ALL
            .iter()
            .map(|&kind| (kind.field_name(), pkg.dependencies_of(kind).len()))
            .collect();

        let export = JsonExport {
            project: JsonProject {
                name: pkg.name().map(str::to_string),
                version: pkg.version().map(str::to_string),
            },
            summary: JsonSummary {
                total_packages: packages.len(),
                missing_packages: packages.iter().filter(|p| !p.installed).count(),
                direct,
            },
            dependencies: links(pkg.root_node()),
            packages,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
