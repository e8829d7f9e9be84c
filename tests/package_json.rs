//! Integration tests for reading a project and its installed tree.

mod common;

use common::Project;
use pkgscope::parser::{read_package_json, DependencyKind, ManifestReader, ReadError};
use pkgscope::PackageJson;

const TYPE_FEST: &str = r#"{"name": "type-fest", "version": "4.26.1"}"#;

fn read_root(project: &Project) -> PackageJson {
    let mut pkg = PackageJson::root();
    pkg.read(&ManifestReader::new(project.path())).unwrap();
    pkg
}

fn sample_project() -> Project {
    Project::new(
        r#"{
            "name": "@universal-packages/package-json",
            "version": "1.2.3",
            "dependencies": {"type-fest": "^4.0.0"},
            "devDependencies": {"typescript": "^5.0.0", "type-fest": "^4.0.0"}
        }"#,
    )
    .install("type-fest", TYPE_FEST)
    .install(
        "typescript",
        r#"{"name": "typescript", "version": "5.4.0", "devDependencies": {"mocha": "*"}}"#,
    )
}

#[test]
fn reads_project_name_and_version() {
    let pkg = read_root(&sample_project());

    assert_eq!(pkg.name(), Some("@universal-packages/package-json"));
    assert_eq!(pkg.version(), Some("1.2.3"));
    assert_eq!(
        pkg.manifest().name.as_deref(),
        Some("@universal-packages/package-json")
    );
}

#[test]
fn named_package_reads_installed_manifest() {
    let project = sample_project();
    let mut pkg = PackageJson::named("type-fest");
    pkg.read(&ManifestReader::new(project.path())).unwrap();

    assert!(!pkg.is_root());
    assert_eq!(pkg.name(), Some("type-fest"));
    assert_eq!(pkg.version(), Some("4.26.1"));
}

#[test]
fn missing_package_reads_as_empty() {
    let project = sample_project();
    let mut pkg = PackageJson::named("non-existent-package");
    pkg.read(&ManifestReader::new(project.path())).unwrap();

    assert!(pkg.name().is_none());
    assert!(pkg.version().is_none());
    assert!(!pkg.root_node().is_installed());
}

#[test]
fn root_populates_flat_dependencies() {
    let pkg = read_root(&sample_project());

    assert!(pkg.is_root());
    let flat: Vec<&str> = pkg.flat_dependencies().keys().map(String::as_str).collect();
    assert_eq!(flat, vec!["type-fest", "typescript"]);
    assert_eq!(pkg.get("type-fest").unwrap().name(), Some("type-fest"));
}

#[test]
fn reads_each_dependency_category() {
    let pkg = read_root(&sample_project());

    assert!(pkg.dependencies().contains_key("type-fest"));
    assert!(pkg.dev_dependencies().contains_key("typescript"));
    assert!(pkg.peer_dependencies().is_empty());
    assert!(pkg.peer_dependencies_meta().is_empty());
    assert!(pkg.bundle_dependencies().is_empty());
    assert!(pkg.optional_dependencies().is_empty());
}

#[test]
fn shared_dependency_is_one_node() {
    let pkg = read_root(&sample_project());

    let from_prod = pkg.dependencies()["type-fest"];
    let from_dev = pkg.dev_dependencies()["type-fest"];
    assert_eq!(from_prod, from_dev);
    assert_eq!(pkg.flat_dependencies()["type-fest"], from_prod);
    assert_eq!(pkg.node(from_prod).unwrap().version(), Some("4.26.1"));
}

#[test]
fn nested_nodes_only_expand_dependencies() {
    let pkg = read_root(&sample_project());

    let typescript = pkg.get("typescript").unwrap();
    assert!(!typescript.is_root());
    for kind in DependencyKind::ALL {
        assert!(typescript.dependencies_of(kind).is_empty(), "{}", kind);
    }
    assert!(pkg.get("mocha").is_none());
}

#[test]
fn non_root_read_leaves_flat_dependencies_empty() {
    let project = Project::new("{}").install(
        "type-fest",
        r#"{"name": "type-fest", "dependencies": {"other": "1"}, "devDependencies": {"x": "1"}}"#,
    );
    let mut pkg = PackageJson::named("type-fest");
    pkg.read(&ManifestReader::new(project.path())).unwrap();

    assert!(pkg.flat_dependencies().is_empty());
    assert!(pkg.dev_dependencies().is_empty());
    assert_eq!(pkg.node_count(), 1);
}

#[test]
fn malformed_manifest_is_a_syntax_error() {
    let project = Project::new(r#"{ "name": "test", invalid json }"#);
    let mut pkg = PackageJson::root();
    let err = pkg.read(&ManifestReader::new(project.path())).unwrap_err();

    assert!(err.is_syntax());
    assert!(matches!(err, ReadError::Syntax { .. }));
}

#[test]
fn empty_manifest_has_no_dependencies() {
    let pkg = read_root(&Project::new("{}"));

    assert!(pkg.name().is_none());
    assert!(pkg.version().is_none());
    assert!(pkg.flat_dependencies().is_empty());
    assert!(pkg.root_node().is_installed());
}

#[test]
fn missing_project_manifest_is_empty() {
    let pkg = read_root(&Project::empty());

    assert!(pkg.name().is_none());
    assert!(!pkg.root_node().is_installed());
    assert!(pkg.flat_dependencies().is_empty());
}

#[test]
fn peer_bundle_and_optional_categories() {
    let project = Project::new(
        r#"{
            "name": "test-peer-package",
            "version": "1.0.0",
            "peerDependencies": {"type-fest": "^4.0.0"},
            "peerDependenciesMeta": {"type-fest": {"optional": true}},
            "bundleDependencies": ["type-fest"],
            "optionalDependencies": {"typescript": "^5.0.0"}
        }"#,
    )
    .install("type-fest", TYPE_FEST);

    let pkg = read_root(&project);
    assert_eq!(pkg.name(), Some("test-peer-package"));

    let peer = pkg.peer_dependencies()["type-fest"];
    assert_eq!(pkg.node(peer).unwrap().name(), Some("type-fest"));
    assert_eq!(pkg.flat_dependencies()["type-fest"], peer);
    assert_eq!(pkg.peer_dependencies_meta()["type-fest"], peer);
    assert_eq!(pkg.bundle_dependencies()["type-fest"], peer);

    let optional = pkg.get("typescript").unwrap();
    assert!(!optional.is_installed());
    assert_eq!(pkg.flat_dependencies().len(), 2);
}

#[test]
fn custom_modules_dir() {
    let project = Project::new(r#"{"dependencies": {"a": "1"}}"#);
    project.file("vendor/a/package.json", r#"{"name": "a", "version": "0.1.0"}"#);

    let mut pkg = PackageJson::root();
    pkg.read(&ManifestReader::new(project.path()).with_modules_dir("vendor"))
        .unwrap();
    assert_eq!(pkg.get("a").unwrap().version(), Some("0.1.0"));
}

#[test]
fn read_package_json_uses_current_directory() {
    // Run from the crate root, where no node_modules/<name> exists.
    let manifest = read_package_json(Some("definitely-not-installed-pkg")).unwrap();
    assert!(manifest.name.is_none());
}
