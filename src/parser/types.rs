//! Shared types for manifest parsing.
//!
//! This module defines the data structures used to represent a
//! `package.json` manifest and the dependency categories it declares.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Represents the structure of a package.json file.
///
/// The six dependency categories are typed; every other top-level field is
/// kept verbatim in [`Manifest::extra`] so the raw record survives a
/// parse/serialize cycle.
///
/// Known fields are read leniently: a field whose JSON shape does not match
/// (say `"dependencies": []` or `"version": 1`) reads as absent instead of
/// failing the whole document. Dependency maps keep every key, whatever the
/// value, and only string values count as ranges.
///
/// # Example
///
/// ```
/// use pkgscope::parser::types::Manifest;
///
/// let json = r#"{"name": "my-app", "version": "1.0.0"}"#;
/// let pkg: Manifest = serde_json::from_str(json).unwrap();
/// assert_eq!(pkg.name.as_deref(), Some("my-app"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Manifest {
    /// The name of the package.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// The version of the package.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Runtime dependencies.
    #[serde(
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "Option::is_none"
    )]
    pub dependencies: Option<Ranges>,

    /// Development-only dependencies.
    #[serde(
        rename = "devDependencies",
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "Option::is_none"
    )]
    pub dev_dependencies: Option<Ranges>,

    /// Peer dependencies that the host package must provide.
    #[serde(
        rename = "peerDependencies",
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "Option::is_none"
    )]
    pub peer_dependencies: Option<Ranges>,

    /// Per-peer metadata, keyed by peer name.
    #[serde(
        rename = "peerDependenciesMeta",
        default,
        deserialize_with = "lenient_peer_meta",
        skip_serializing_if = "Option::is_none"
    )]
    pub peer_dependencies_meta: Option<BTreeMap<String, PeerDependencyMeta>>,

    /// Dependencies shipped inside the package tarball.
    #[serde(
        rename = "bundleDependencies",
        alias = "bundledDependencies",
        default,
        deserialize_with = "lenient_bundle",
        skip_serializing_if = "Option::is_none"
    )]
    pub bundle_dependencies: Option<BundleDependencies>,

    /// Optional dependencies that enhance functionality if available.
    #[serde(
        rename = "optionalDependencies",
        default,
        deserialize_with = "lenient_ranges",
        skip_serializing_if = "Option::is_none"
    )]
    pub optional_dependencies: Option<Ranges>,

    /// Every other top-level field, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dependency map: name to the declared range, as written.
pub type Ranges = BTreeMap<String, Value>;

impl Manifest {
    /// Builds a manifest from an already parsed JSON document.
    ///
    /// Anything other than a JSON object (an array, a string, `null`) carries
    /// no fields and yields an empty manifest.
    pub fn from_value(value: Value) -> Manifest {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Manifest::default(),
        }
    }

    /// Returns the names listed under one dependency category.
    ///
    /// Map-shaped categories come back sorted by name. A bundle list keeps
    /// its listed order with duplicates removed, and `"bundleDependencies":
    /// true` expands to every name under `dependencies`.
    pub fn dependency_names(&self, kind: DependencyKind) -> Vec<String> {
        match kind {
            DependencyKind::Dependencies => keys(&self.dependencies),
            DependencyKind::DevDependencies => keys(&self.dev_dependencies),
            DependencyKind::PeerDependencies => keys(&self.peer_dependencies),
            DependencyKind::PeerDependenciesMeta => keys(&self.peer_dependencies_meta),
            DependencyKind::OptionalDependencies => keys(&self.optional_dependencies),
            DependencyKind::BundleDependencies => match &self.bundle_dependencies {
                None | Some(BundleDependencies::All(false)) => Vec::new(),
                Some(BundleDependencies::All(true)) => keys(&self.dependencies),
                Some(BundleDependencies::Map(map)) => map.keys().cloned().collect(),
                Some(BundleDependencies::Names(names)) => {
                    let mut seen = Vec::with_capacity(names.len());
                    for name in names {
                        if !seen.contains(name) {
                            seen.push(name.clone());
                        }
                    }
                    seen
                }
            },
        }
    }

    /// Returns the declared range for `name` under `kind`, if there is one.
    ///
    /// `peerDependenciesMeta`, list-shaped bundle entries and non-string
    /// values carry no range.
    pub fn range_of(&self, kind: DependencyKind, name: &str) -> Option<&str> {
        let map = match kind {
            DependencyKind::Dependencies => self.dependencies.as_ref(),
            DependencyKind::DevDependencies => self.dev_dependencies.as_ref(),
            DependencyKind::PeerDependencies => self.peer_dependencies.as_ref(),
            DependencyKind::OptionalDependencies => self.optional_dependencies.as_ref(),
            DependencyKind::BundleDependencies => match &self.bundle_dependencies {
                Some(BundleDependencies::Map(map)) => Some(map),
                _ => None,
            },
            DependencyKind::PeerDependenciesMeta => None,
        };
        map.and_then(|m| m.get(name)).and_then(Value::as_str)
    }

    /// Returns true if any dependency category lists at least one name.
    pub fn has_dependencies(&self) -> bool {
        DependencyKind::ALL
            .iter()
            .any(|&kind| !self.dependency_names(kind).is_empty())
    }

    /// Flattens every category into a list of [`Dependency`] records.
    ///
    /// A name listed under two categories appears once per category.
    ///
    /// # Example
    ///
    /// ```
    /// use pkgscope::parser::{parse_str, DependencyKind};
    ///
    /// let pkg = parse_str(r#"{
    ///     "dependencies": {"react": "^18.0.0"},
    ///     "devDependencies": {"typescript": "^5.0.0"}
    /// }"#).unwrap();
    ///
    /// let deps = pkg.declared_dependencies();
    /// assert_eq!(deps.len(), 2);
    /// assert!(deps.iter().any(|d| d.name == "typescript" && d.kind == DependencyKind::DevDependencies));
    /// ```
    pub fn declared_dependencies(&self) -> Vec<Dependency> {
        DependencyKind::ALL
            .iter()
            .flat_map(|&kind| {
                self.dependency_names(kind).into_iter().map(move |name| {
                    let range = self.range_of(kind, &name).map(str::to_string);
                    Dependency { name, range, kind }
                })
            })
            .collect()
    }
}

fn keys<V>(map: &Option<BTreeMap<String, V>>) -> Vec<String> {
    map.as_ref()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default()
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(de)?.as_bool().unwrap_or(false))
}

fn lenient_ranges<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Ranges>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    })
}

fn lenient_peer_meta<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<Option<BTreeMap<String, PeerDependencyMeta>>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Object(map) => Some(
            map.into_iter()
                .map(|(name, meta)| (name, serde_json::from_value(meta).unwrap_or_default()))
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_bundle<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<Option<BundleDependencies>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Bool(all) => Some(BundleDependencies::All(all)),
        Value::Array(items) => Some(BundleDependencies::Names(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(name) => Some(name),
                    _ => None,
                })
                .collect(),
        )),
        Value::Object(map) => Some(BundleDependencies::Map(map.into_iter().collect())),
        _ => None,
    })
}

/// An entry of `peerDependenciesMeta`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PeerDependencyMeta {
    /// Whether the peer may be absent.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub optional: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The accepted shapes of `bundleDependencies`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum BundleDependencies {
    /// `true` bundles every runtime dependency, `false` bundles none.
    All(bool),
    /// A list of package names. Non-string entries are dropped.
    Names(Vec<String>),
    /// A name to range map.
    Map(Ranges),
}

/// The six dependency-type categories a manifest can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    /// `dependencies` - required at runtime.
    Dependencies,
    /// `devDependencies` - only needed during development.
    DevDependencies,
    /// `peerDependencies` - expected to be provided by the consumer.
    PeerDependencies,
    /// `peerDependenciesMeta` - metadata about peers.
    PeerDependenciesMeta,
    /// `bundleDependencies` - shipped inside the package.
    BundleDependencies,
    /// `optionalDependencies` - installation continues if they fail.
    OptionalDependencies,
}

impl DependencyKind {
    /// All categories, in the order a root traversal walks them.
    pub const ALL: [DependencyKind; 6] = [
        DependencyKind::Dependencies,
        DependencyKind::DevDependencies,
        DependencyKind::PeerDependencies,
        DependencyKind::PeerDependenciesMeta,
        DependencyKind::BundleDependencies,
        DependencyKind::OptionalDependencies,
    ];

    /// Position of this kind within [`DependencyKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            DependencyKind::Dependencies => 0,
            DependencyKind::DevDependencies => 1,
            DependencyKind::PeerDependencies => 2,
            DependencyKind::PeerDependenciesMeta => 3,
            DependencyKind::BundleDependencies => 4,
            DependencyKind::OptionalDependencies => 5,
        }
    }

    /// The manifest field this category is read from.
    pub fn field_name(self) -> &'static str {
        match self {
            DependencyKind::Dependencies => "dependencies",
            DependencyKind::DevDependencies => "devDependencies",
            DependencyKind::PeerDependencies => "peerDependencies",
            DependencyKind::PeerDependenciesMeta => "peerDependenciesMeta",
            DependencyKind::BundleDependencies => "bundleDependencies",
            DependencyKind::OptionalDependencies => "optionalDependencies",
        }
    }

    /// Returns a short label for the category.
    pub fn label(self) -> &'static str {
        match self {
            DependencyKind::Dependencies => "prod",
            DependencyKind::DevDependencies => "dev",
            DependencyKind::PeerDependencies => "peer",
            DependencyKind::PeerDependenciesMeta => "peer-meta",
            DependencyKind::BundleDependencies => "bundle",
            DependencyKind::OptionalDependencies => "optional",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl std::str::FromStr for DependencyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DependencyKind::ALL
            .into_iter()
            .find(|kind| kind.field_name() == s || kind.label() == s)
            .or_else(|| (s == "bundledDependencies").then_some(DependencyKind::BundleDependencies))
            .ok_or_else(|| format!("Unknown dependency category: '{}'", s))
    }
}

/// A single declared dependency, tagged with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The package name (e.g., "react", "@types/node").
    pub name: String,

    /// The declared range, when the category carries one.
    pub range: Option<String>,

    /// The category this entry was listed under.
    pub kind: DependencyKind,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range {
            Some(range) => write!(f, "{}@{} ({})", self.name, range, self.kind.label()),
            None => write!(f, "{} ({})", self.name, self.kind.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> Manifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_dependency_kind_all_order() {
        for (i, kind) in DependencyKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(DependencyKind::ALL[0], DependencyKind::Dependencies);
    }

    #[test]
    fn test_dependency_kind_from_str() {
        assert_eq!(
            "devDependencies".parse::<DependencyKind>().unwrap(),
            DependencyKind::DevDependencies
        );
        assert_eq!(
            "peer".parse::<DependencyKind>().unwrap(),
            DependencyKind::PeerDependencies
        );
        assert_eq!(
            "bundledDependencies".parse::<DependencyKind>().unwrap(),
            DependencyKind::BundleDependencies
        );
        assert!("scripts".parse::<DependencyKind>().is_err());
    }

    #[test]
    fn test_dependency_kind_display() {
        assert_eq!(
            DependencyKind::PeerDependenciesMeta.to_string(),
            "peerDependenciesMeta"
        );
    }

    #[test]
    fn test_manifest_default_is_empty() {
        let pkg = Manifest::default();
        assert!(pkg.name.is_none());
        assert!(pkg.version.is_none());
        assert!(!pkg.has_dependencies());
        assert!(pkg.declared_dependencies().is_empty());
    }

    #[test]
    fn test_bundle_dependencies_as_list() {
        let pkg = manifest(r#"{"bundleDependencies": ["b", "a", "b"]}"#);
        assert_eq!(
            pkg.dependency_names(DependencyKind::BundleDependencies),
            vec!["b", "a"]
        );
        assert!(pkg.range_of(DependencyKind::BundleDependencies, "a").is_none());
    }

    #[test]
    fn test_bundle_dependencies_alias_and_bool() {
        let pkg = manifest(
            r#"{"dependencies": {"x": "1", "y": "2"}, "bundledDependencies": true}"#,
        );
        assert_eq!(
            pkg.dependency_names(DependencyKind::BundleDependencies),
            vec!["x", "y"]
        );

        let pkg = manifest(r#"{"dependencies": {"x": "1"}, "bundleDependencies": false}"#);
        assert!(pkg
            .dependency_names(DependencyKind::BundleDependencies)
            .is_empty());
    }

    #[test]
    fn test_peer_dependencies_meta_names() {
        let pkg = manifest(
            r#"{"peerDependenciesMeta": {"react": {"optional": true}, "vue": {}}}"#,
        );
        assert_eq!(
            pkg.dependency_names(DependencyKind::PeerDependenciesMeta),
            vec!["react", "vue"]
        );
        let meta = pkg.peer_dependencies_meta.as_ref().unwrap();
        assert!(meta["react"].optional);
        assert!(!meta["vue"].optional);
    }

    #[test]
    fn test_extra_fields_are_kept() {
        let pkg = manifest(r#"{"name": "a", "scripts": {"build": "tsc"}, "private": true}"#);
        assert_eq!(pkg.extra.get("private"), Some(&Value::Bool(true)));

        let back = serde_json::to_value(&pkg).unwrap();
        assert_eq!(back["scripts"]["build"], "tsc");
        assert!(back.get("dependencies").is_none());
    }

    #[test]
    fn test_mismatched_field_shapes_read_as_absent() {
        let pkg = manifest(
            r#"{"name": "a", "version": 1, "dependencies": [], "devDependencies": "x", "peerDependencies": null}"#,
        );
        assert_eq!(pkg.name.as_deref(), Some("a"));
        assert!(pkg.version.is_none());
        assert!(pkg.dependencies.is_none());
        assert!(pkg.dev_dependencies.is_none());
        assert!(pkg.peer_dependencies.is_none());
        assert!(!pkg.has_dependencies());
    }

    #[test]
    fn test_non_string_ranges_keep_their_names() {
        let pkg = manifest(r#"{"dependencies": {"x": null, "y": "^1.0.0", "z": 3}}"#);
        assert_eq!(
            pkg.dependency_names(DependencyKind::Dependencies),
            vec!["x", "y", "z"]
        );
        assert!(pkg.range_of(DependencyKind::Dependencies, "x").is_none());
        assert_eq!(pkg.range_of(DependencyKind::Dependencies, "y"), Some("^1.0.0"));
    }

    #[test]
    fn test_odd_peer_meta_and_bundle_entries() {
        let pkg = manifest(
            r#"{"peerDependenciesMeta": {"x": true, "y": {"optional": "yes"}}, "bundleDependencies": ["a", 1, "b"]}"#,
        );
        assert_eq!(
            pkg.dependency_names(DependencyKind::PeerDependenciesMeta),
            vec!["x", "y"]
        );
        let meta = pkg.peer_dependencies_meta.as_ref().unwrap();
        assert!(!meta["x"].optional);
        assert!(!meta["y"].optional);
        assert_eq!(
            pkg.dependency_names(DependencyKind::BundleDependencies),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_from_value_non_object_is_empty() {
        assert_eq!(Manifest::from_value(Value::Array(vec![])), Manifest::default());
        assert_eq!(Manifest::from_value(Value::Null), Manifest::default());
    }

    #[test]
    fn test_declared_dependencies_keeps_duplicates_per_kind() {
        let pkg = manifest(
            r#"{"dependencies": {"shared": "^1.0.0"}, "devDependencies": {"shared": "^1.2.0"}}"#,
        );
        let deps = pkg.declared_dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].to_string(), "shared@^1.0.0 (prod)");
        assert_eq!(deps[1].to_string(), "shared@^1.2.0 (dev)");
    }
}
