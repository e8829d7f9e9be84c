//! Text tree export.
//!
//! Renders the traversal as an indented tree with box-drawing branches.
//! A package is expanded the first time it is printed; later occurrences
//! are marked `(deduped)` so cycles and shared dependencies print once.

use super::Exporter;
use crate::graph::{NodeId, PackageJson, PackageNode};
use crate::parser::DependencyKind;
use std::collections::HashSet;
use std::io::{self, Write};

/// Text tree exporter implementation.
pub struct TreeExporter;

/// One rendered line of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Name the package was listed under
    pub name: String,
    /// Installed version, if known
    pub version: Option<String>,
    /// Category the link was declared in; `None` for the top line
    pub kind: Option<DependencyKind>,
    /// Depth in the tree (0 = the project)
    pub depth: usize,
    /// Whether this is the last child of its parent
    pub is_last_child: bool,
    /// Whether the package was already expanded higher up
    pub deduped: bool,
    /// Whether a manifest was found for the package
    pub installed: bool,
}

impl TreeLine {
    /// Build the tree prefix (indentation and branch lines)
    pub fn tree_prefix(&self, ancestors_are_last: &[bool]) -> String {
        let mut prefix = String::new();

        for &is_last in ancestors_are_last.iter().take(self.depth.saturating_sub(1)) {
            if is_last {
                prefix.push_str("    ");
            } else {
                prefix.push_str("│   ");
            }
        }

        if self.depth > 0 {
            if self.is_last_child {
                prefix.push_str("└── ");
            } else {
                prefix.push_str("├── ");
            }
        }

        prefix
    }

    fn label(&self) -> String {
        let mut label = match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        };
        if let Some(kind) = self.kind {
            if kind != DependencyKind::Dependencies {
                label.push_str(&format!(" [{}]", kind.label()));
            }
        }
        if !self.installed && self.depth > 0 {
            label.push_str(" (missing)");
        }
        if self.deduped {
            label.push_str(" (deduped)");
        }
        label
    }
}

/// Flattens the traversal into render order.
pub fn flatten(pkg: &PackageJson) -> Vec<TreeLine> {
    let mut lines = Vec::new();
    let mut seen = HashSet::new();
    let root = pkg.root_node();

    lines.push(TreeLine {
        name: root.label().to_string(),
        version: root.version().map(str::to_string),
        kind: None,
        depth: 0,
        is_last_child: true,
        deduped: false,
        installed: root.is_installed(),
    });
    seen.insert(NodeId::ROOT);
    flatten_children(pkg, root, 1, &mut seen, &mut lines);

    lines
}

fn flatten_children(
    pkg: &PackageJson,
    node: &PackageNode,
    depth: usize,
    seen: &mut HashSet<NodeId>,
    lines: &mut Vec<TreeLine>,
) {
    let edges: Vec<_> = node.edges().collect();
    let count = edges.len();

    for (i, (kind, name, id)) in edges.into_iter().enumerate() {
        let Some(child) = pkg.node(id) else {
            continue;
        };
        let first_visit = seen.insert(id);

        lines.push(TreeLine {
            name: name.to_string(),
            version: child.version().map(str::to_string),
            kind: Some(kind),
            depth,
            is_last_child: i + 1 == count,
            deduped: !first_visit,
            installed: child.is_installed(),
        });

        if first_visit {
            flatten_children(pkg, child, depth + 1, seen, lines);
        }
    }
}

impl Exporter for TreeExporter {
    fn export<W: Write>(&self, pkg: &PackageJson, writer: &mut W) -> io::Result<()> {
        let mut ancestors: Vec<bool> = Vec::new();

        for line in flatten(pkg) {
            ancestors.truncate(line.depth.saturating_sub(1));
            writeln!(writer, "{}{}", line.tree_prefix(&ancestors), line.label())?;
            if line.depth > 0 {
                ancestors.push(line.is_last_child);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{export_to_string, ExportFormat};
    use crate::parser::ManifestReader;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(dir: &Path) -> PackageJson {
        let mut pkg = PackageJson::root();
        pkg.read(&ManifestReader::new(dir)).unwrap();
        pkg
    }

    #[test]
    fn test_tree_output() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"name": "app", "version": "1.0.0", "dependencies": {"a": "1", "b": "1"}, "devDependencies": {"c": "1"}}"#,
        );
        write(dir.path(), "node_modules/a/package.json", r#"{"name": "a", "version": "1.0.0", "dependencies": {"b": "1"}}"#);
        write(dir.path(), "node_modules/b/package.json", r#"{"name": "b", "version": "2.0.0"}"#);

        let text = export_to_string(ExportFormat::Tree, &read(dir.path())).unwrap();
        let expected = "\
app@1.0.0
├── a@1.0.0
│   └── b@2.0.0
├── b@2.0.0 (deduped)
└── c [dev] (missing)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_flatten_marks_cycles_deduped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", r#"{"dependencies": {"a": "1"}}"#);
        write(dir.path(), "node_modules/a/package.json", r#"{"name": "a", "dependencies": {"b": "1"}}"#);
        write(dir.path(), "node_modules/b/package.json", r#"{"name": "b", "dependencies": {"a": "1"}}"#);

        let lines = flatten(&read(dir.path()));
        let names: Vec<(&str, usize, bool)> = lines
            .iter()
            .map(|l| (l.name.as_str(), l.depth, l.deduped))
            .collect();
        assert_eq!(
            names,
            vec![("root", 0, false), ("a", 1, false), ("b", 2, false), ("a", 3, true)]
        );
    }

    #[test]
    fn test_tree_prefix_nested() {
        let line = TreeLine {
            name: "x".to_string(),
            version: None,
            kind: Some(DependencyKind::Dependencies),
            depth: 3,
            is_last_child: true,
            deduped: false,
            installed: true,
        };
        assert_eq!(line.tree_prefix(&[false, true]), "│       └── ");
    }
}
