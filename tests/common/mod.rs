//! Fixture helpers shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A throwaway project directory with a package.json and a node_modules tree.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new(manifest: &str) -> Self {
        let project = Self {
            dir: TempDir::new().unwrap(),
        };
        project.file("package.json", manifest);
        project
    }

    /// A project directory with no package.json at all.
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn install(self, name: &str, manifest: &str) -> Self {
        self.file(&format!("node_modules/{}/package.json", name), manifest);
        self
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
