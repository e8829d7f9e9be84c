//! Export functionality for a dependency traversal.
//!
//! This module renders a [`PackageJson`] either as machine-readable JSON or
//! as an indented text tree.

pub mod json;
pub mod tree;

use crate::graph::PackageJson;
use std::io::{self, Write};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JSON format - machine-readable, full data
    Json,
    /// Text tree - for terminals
    #[default]
    Tree,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "tree" | "text" => Ok(ExportFormat::Tree),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, tree",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Tree => write!(f, "tree"),
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the traversal to the given writer.
    fn export<W: Write>(&self, pkg: &PackageJson, writer: &mut W) -> io::Result<()>;
}

/// Export a traversal in the specified format.
pub fn export<W: Write>(format: ExportFormat, pkg: &PackageJson, writer: &mut W) -> io::Result<()> {
    match format {
        ExportFormat::Json => json::JsonExporter.export(pkg, writer),
        ExportFormat::Tree => tree::TreeExporter.export(pkg, writer),
    }
}

/// Export a traversal to a string.
pub fn export_to_string(format: ExportFormat, pkg: &PackageJson) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, pkg, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
