//! Parser module for pkgscope.
//!
//! This module reads npm `package.json` manifests, either for the project
//! itself or for a package installed under `node_modules`.
//!
//! # Example
//!
//! ```no_run
//! use pkgscope::parser::{DependencyKind, ManifestReader};
//!
//! let reader = ManifestReader::new(".");
//! let pkg = reader.read(None).unwrap();
//!
//! let dev = pkg.dependency_names(DependencyKind::DevDependencies);
//! println!("{:?} has {} dev dependencies", pkg.name, dev.len());
//! ```

pub mod reader;
pub mod types;

pub use reader::{
    parse_file, parse_str, read_package_json, ManifestReader, ReadError, ReadResult,
    DEFAULT_MODULES_DIR, MANIFEST_FILE,
};

pub use types::{
    BundleDependencies, Dependency, DependencyKind, Manifest, PeerDependencyMeta, Ranges,
};
