//! Reader for package.json manifests on disk.
//!
//! A [`ManifestReader`] knows where the project root and its installed
//! modules live, and turns an optional package name into a parsed
//! [`Manifest`]. A missing file is not an error: it reads as an empty
//! manifest. A file that exists but is not valid JSON is. Beyond that the
//! content is not validated.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::types::Manifest;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Directory, relative to the project root, that installed packages live in.
pub const DEFAULT_MODULES_DIR: &str = "node_modules";

/// Errors that can occur while reading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON.
    #[error("Failed to parse JSON in {}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ReadError {
    /// Returns true for failures caused by malformed JSON text.
    pub fn is_syntax(&self) -> bool {
        matches!(self, ReadError::Syntax { .. })
    }

    /// The manifest path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            ReadError::Io { path, .. } | ReadError::Syntax { path, .. } => path,
        }
    }
}

/// Result type alias for manifest reads.
pub type ReadResult<T> = Result<T, ReadError>;

/// Locates and parses manifests for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReader {
    project_root: PathBuf,
    modules_dir: PathBuf,
}

impl Default for ManifestReader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ManifestReader {
    /// Creates a reader rooted at `project_root`, with installed packages
    /// under `<project_root>/node_modules`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            modules_dir: PathBuf::from(DEFAULT_MODULES_DIR),
        }
    }

    /// Overrides the modules directory. Relative paths are joined onto the
    /// project root.
    pub fn with_modules_dir(mut self, modules_dir: impl Into<PathBuf>) -> Self {
        self.modules_dir = modules_dir.into();
        self
    }

    /// The project root this reader resolves paths against.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The directory installed packages are read from.
    pub fn modules_dir(&self) -> PathBuf {
        self.project_root.join(&self.modules_dir)
    }

    /// Computes the manifest path for `name`, or for the project itself
    /// when `name` is `None`.
    ///
    /// Only the plain segments of `name` are joined, so the result always
    /// stays under the modules directory.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use pkgscope::parser::ManifestReader;
    ///
    /// let reader = ManifestReader::new("/work/app");
    /// assert_eq!(reader.manifest_path(None), Path::new("/work/app/package.json"));
    /// assert_eq!(
    ///     reader.manifest_path(Some("@scope/pkg")),
    ///     Path::new("/work/app/node_modules/@scope/pkg/package.json")
    /// );
    /// ```
    pub fn manifest_path(&self, name: Option<&str>) -> PathBuf {
        match name {
            Some(name) => {
                let mut path = self.modules_dir();
                path.extend(Path::new(name).components().filter_map(|c| match c {
                    Component::Normal(segment) => Some(segment),
                    _ => None,
                }));
                path.join(MANIFEST_FILE)
            }
            None => self.project_root.join(MANIFEST_FILE),
        }
    }

    /// Reads the manifest for `name`, returning `None` if the file does not
    /// exist.
    ///
    /// A name that is absolute, empty, or climbs out with `..` does not name
    /// a package under the modules directory and reads as missing.
    pub fn read_optional(&self, name: Option<&str>) -> ReadResult<Option<Manifest>> {
        if let Some(name) = name.filter(|name| !is_package_name(name)) {
            debug!(name, "name leaves the modules directory, treating as missing");
            return Ok(None);
        }

        let path = self.manifest_path(name);
        debug!(path = %path.display(), "reading manifest");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "manifest not found, using empty record");
                return Ok(None);
            }
            Err(source) => return Err(ReadError::Io { path, source }),
        };

        parse_manifest(&content, path).map(Some)
    }

    /// Reads the manifest for `name`. A missing file yields
    /// `Manifest::default()`.
    pub fn read(&self, name: Option<&str>) -> ReadResult<Manifest> {
        Ok(self.read_optional(name)?.unwrap_or_default())
    }
}

/// True if every segment of `name` is a plain path segment.
fn is_package_name(name: &str) -> bool {
    let mut segments = 0;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => segments += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    segments > 0
}

fn parse_manifest(content: &str, path: PathBuf) -> ReadResult<Manifest> {
    serde_json::from_str::<Value>(content)
        .map(Manifest::from_value)
        .map_err(|source| ReadError::Syntax { path, source })
}

/// Reads a manifest relative to the current directory.
///
/// With no name this is `./package.json`; otherwise it is
/// `./node_modules/<name>/package.json`.
pub fn read_package_json(name: Option<&str>) -> ReadResult<Manifest> {
    ManifestReader::default().read(name)
}

/// Parses a package.json from a file path. Unlike [`ManifestReader::read`],
/// a missing file is an error here.
pub fn parse_file(path: &Path) -> ReadResult<Manifest> {
    let content = fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&content, path.to_path_buf())
}

/// Parses a package.json from a string.
///
/// # Example
///
/// ```
/// use pkgscope::parser::parse_str;
///
/// let pkg = parse_str(r#"{"name": "my-app", "version": "1.0.0"}"#).unwrap();
/// assert_eq!(pkg.version.as_deref(), Some("1.0.0"));
///
/// let err = parse_str(r#"{ "name": "test", invalid json }"#).unwrap_err();
/// assert!(err.is_syntax());
/// ```
pub fn parse_str(content: &str) -> ReadResult<Manifest> {
    parse_manifest(content, PathBuf::from("<input>"))
}
