//! Manifest-driven dependency tree.
//!
//! [`PackageJson`] mirrors the manifest hierarchy found under a project's
//! `node_modules`. Nodes live in an arena and are addressed by [`NodeId`];
//! a dependency name maps to exactly one node per traversal, no matter how
//! many parents or categories list it.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::dependency_graph::DependencyGraph;
use crate::parser::{DependencyKind, Manifest, ManifestReader, ReadResult};

/// Handle to a node inside one [`PackageJson`] traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The node a traversal was constructed for.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Child links of a node, keyed by dependency name.
pub type Edges = BTreeMap<String, NodeId>;

/// One package in the tree: its manifest plus classified child links.
#[derive(Debug, Clone, Default)]
pub struct PackageNode {
    fixed_name: Option<String>,
    name: Option<String>,
    version: Option<String>,
    installed: bool,
    manifest: Manifest,
    edges: [Edges; 6],
}

impl PackageNode {
    fn new(fixed_name: Option<String>) -> Self {
        Self {
            fixed_name,
            ..Self::default()
        }
    }

    fn load(&mut self, reader: &ManifestReader) -> ReadResult<()> {
        let manifest = reader.read_optional(self.fixed_name.as_deref())?;
        self.installed = manifest.is_some();
        self.manifest = manifest.unwrap_or_default();
        self.name = self.manifest.name.clone();
        self.version = self.manifest.version.clone();
        Ok(())
    }

    /// The name this node was looked up by, or `"root"` for an unnamed root.
    pub fn id(&self) -> &str {
        self.fixed_name.as_deref().unwrap_or("root")
    }

    /// The name this node is displayed under: the manifest name if there is
    /// one, otherwise [`PackageNode::id`].
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id())
    }

    /// `name` from the manifest; `None` if the manifest was missing or
    /// did not declare it.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `version` from the manifest.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// True if a manifest file was found for this node.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// True if this node was constructed without a fixed name.
    pub fn is_root(&self) -> bool {
        self.fixed_name.is_none()
    }

    /// The raw manifest record.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Child links under one category.
    pub fn dependencies_of(&self, kind: DependencyKind) -> &Edges {
        &self.edges[kind.index()]
    }

    /// Iterates over every child link, tagged with its category.
    pub fn edges(&self) -> impl Iterator<Item = (DependencyKind, &str, NodeId)> + '_ {
        DependencyKind::ALL.into_iter().flat_map(move |kind| {
            self.edges[kind.index()]
                .iter()
                .map(move |(name, &id)| (kind, name.as_str(), id))
        })
    }
}

/// A package manifest and everything reachable from it.
///
/// Constructed without a name it is the project root: [`PackageJson::read`]
/// loads `./package.json` and expands all six dependency categories, then
/// each discovered package's `dependencies`, into [`flat_dependencies`].
/// Constructed with a name it reads `node_modules/<name>/package.json` only.
///
/// [`flat_dependencies`]: PackageJson::flat_dependencies
///
/// # Example
///
/// ```no_run
/// use pkgscope::graph::PackageJson;
/// use pkgscope::parser::ManifestReader;
///
/// let mut pkg = PackageJson::root();
/// pkg.read(&ManifestReader::new(".")).unwrap();
///
/// for (name, id) in pkg.dependencies() {
///     let dep = pkg.node(*id).unwrap();
///     println!("{} {}", name, dep.version().unwrap_or("(missing)"));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PackageJson {
    nodes: Vec<PackageNode>,
    flat: Edges,
}

impl Default for PackageJson {
    fn default() -> Self {
        Self::root()
    }
}

impl PackageJson {
    /// Creates the project root.
    pub fn root() -> Self {
        Self::with_name(None)
    }

    /// Creates a node for an installed package.
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_name(Some(name.into()))
    }

    /// Creates a node; it is the root iff `name` is `None`.
    pub fn with_name(name: Option<String>) -> Self {
        Self {
            nodes: vec![PackageNode::new(name)],
            flat: Edges::new(),
        }
    }

    /// Reads the manifest and, for the root, the whole installed tree.
    ///
    /// Any previous traversal is discarded first. A malformed manifest at
    /// any depth aborts the read and leaves this value unread.
    pub fn read(&mut self, reader: &ManifestReader) -> ReadResult<()> {
        let fixed_name = self.root_node().fixed_name.clone();
        *self = Self::with_name(fixed_name.clone());

        let mut traversal = Traversal {
            reader,
            nodes: vec![PackageNode::new(fixed_name)],
            registry: Edges::new(),
        };
        traversal.nodes[NodeId::ROOT.0].load(reader)?;

        if self.is_root() {
            for kind in DependencyKind::ALL {
                traversal.expand(NodeId::ROOT, kind)?;
            }
            debug!(packages = traversal.registry.len(), "dependency tree read");
        }

        self.nodes = traversal.nodes;
        self.flat = traversal.registry;
        Ok(())
    }

    /// True if this value was constructed without a fixed name.
    pub fn is_root(&self) -> bool {
        self.root_node().is_root()
    }

    /// The node this value was constructed for.
    pub fn root_node(&self) -> &PackageNode {
        &self.nodes[NodeId::ROOT.0]
    }

    /// `name` from the manifest.
    pub fn name(&self) -> Option<&str> {
        self.root_node().name()
    }

    /// `version` from the manifest.
    pub fn version(&self) -> Option<&str> {
        self.root_node().version()
    }

    /// The raw manifest record.
    pub fn manifest(&self) -> &Manifest {
        self.root_node().manifest()
    }

    /// Resolves a node handle.
    pub fn node(&self, id: NodeId) -> Option<&PackageNode> {
        self.nodes.get(id.0)
    }

    /// Looks up a discovered package by dependency name.
    pub fn get(&self, name: &str) -> Option<&PackageNode> {
        self.flat.get(name).and_then(|&id| self.node(id))
    }

    /// Every node in discovery order, starting with this one.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PackageNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    /// Number of nodes, including this one.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Child links under one category.
    pub fn dependencies_of(&self, kind: DependencyKind) -> &Edges {
        self.root_node().dependencies_of(kind)
    }

    /// Child links under `dependencies`.
    pub fn dependencies(&self) -> &Edges {
        self.dependencies_of(DependencyKind::Dependencies)
    }

    /// Child links under `devDependencies`.
    pub fn dev_dependencies(&self) -> &Edges {
        self.dependencies_of(DependencyKind::DevDependencies)
    }

    /// Child links under `peerDependencies`.
    pub fn peer_dependencies(&self) -> &Edges {
        self.dependencies_of(DependencyKind::PeerDependencies)
    }

    /// Child links under `peerDependenciesMeta`.
    pub fn peer_dependencies_meta(&self) -> &Edges {
        self.dependencies_of(DependencyKind::PeerDependenciesMeta)
    }

    /// Child links under `bundleDependencies`.
    pub fn bundle_dependencies(&self) -> &Edges {
        self.dependencies_of(DependencyKind::BundleDependencies)
    }

    /// Child links under `optionalDependencies`.
    pub fn optional_dependencies(&self) -> &Edges {
        self.dependencies_of(DependencyKind::OptionalDependencies)
    }

    /// Every package discovered by a root traversal, keyed by name.
    /// Always empty for a non-root value.
    pub fn flat_dependencies(&self) -> &Edges {
        &self.flat
    }

    /// Builds a petgraph view of this traversal.
    pub fn to_graph(&self) -> DependencyGraph {
        DependencyGraph::from_package_json(self)
    }
}

/// State shared across one depth-first expansion.
struct Traversal<'a> {
    reader: &'a ManifestReader,
    nodes: Vec<PackageNode>,
    registry: Edges,
}

impl Traversal<'_> {
    fn expand(&mut self, parent: NodeId, kind: DependencyKind) -> ReadResult<()> {
        let names = self.nodes[parent.0].manifest.dependency_names(kind);
        if names.is_empty() {
            return Ok(());
        }
        trace!(parent = self.nodes[parent.0].id(), %kind, count = names.len(), "expanding");

        for name in names {
            let child = self.resolve(&name)?;
            self.nodes[parent.0].edges[kind.index()].insert(name, child);
        }
        Ok(())
    }

    fn resolve(&mut self, name: &str) -> ReadResult<NodeId> {
        if let Some(&id) = self.registry.get(name) {
            trace!(name, "reusing node");
            return Ok(id);
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(PackageNode::new(Some(name.to_string())));
        // Registered before expansion so cycles terminate.
        self.registry.insert(name.to_string(), id);
        debug!(name, "new node");

        self.nodes[id.0].load(self.reader)?;
        self.expand(id, DependencyKind::Dependencies)?;
        Ok(id)
    }
}
