//! Core TagStore implementation

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde_yaml::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{LoadError, ResolveError};
use crate::node::TagNode;
use crate::pick::Picker;

/// Separator between tag path segments
pub const PATH_SEPARATOR: char = ':';

/// Options for discovering tag files
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File extensions (without the dot) treated as tag files
    pub extensions: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extensions: crate::DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|ext| ext == e))
            .unwrap_or(false)
    }
}

/// What happened during a load
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files parsed and registered, in load order
    pub loaded: Vec<PathBuf>,
    /// Files that could not be loaded; their namespaces are absent
    pub failures: Vec<LoadError>,
    /// Namespaces registered more than once (last file wins)
    pub overridden: Vec<String>,
}

/// File state captured at load time, used to detect changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackedFile {
    path: PathBuf,
    modified: Option<SystemTime>,
}

/// Namespaced tag trees loaded from a set of directories
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    namespaces: BTreeMap<String, TagNode>,
    sources: BTreeMap<String, PathBuf>,
    tracked: Vec<TrackedFile>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace directly, returning the tree it replaced
    pub fn insert(&mut self, namespace: impl Into<String>, node: TagNode) -> Option<TagNode> {
        let namespace = namespace.into();
        debug!(%namespace, "TagStore::insert: called");
        self.sources.remove(&namespace);
        self.namespaces.insert(namespace, node)
    }

    /// Load every tag file found under `dirs`
    ///
    /// Directories are read in order and files inside each directory in
    /// sorted order, so when two files share a stem the later one wins
    /// deterministically. A file that fails to load is reported and skipped.
    /// Missing directories are skipped; an unreadable directory is an error.
    pub fn load<P: AsRef<Path>>(dirs: &[P], options: &LoadOptions) -> Result<(Self, LoadReport), LoadError> {
        debug!(dir_count = dirs.len(), ?options, "TagStore::load: called");
        let mut store = Self::new();
        let mut report = LoadReport::default();

        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.exists() {
                debug!(?dir, "TagStore::load: directory does not exist, skipping");
                continue;
            }

            for path in Self::discover(dir, options)? {
                store.tracked.push(TrackedFile::capture(&path));
                match load_file(&path) {
                    Ok((namespace, node)) => {
                        if store.namespaces.insert(namespace.clone(), node).is_some() {
                            warn!(%namespace, ?path, "Tag namespace defined twice, later file wins");
                            report.overridden.push(namespace.clone());
                        }
                        store.sources.insert(namespace, path.clone());
                        report.loaded.push(path);
                    }
                    Err(e) => {
                        warn!(?path, error = %e, "Failed to load tag file");
                        report.failures.push(e);
                    }
                }
            }
        }

        info!(
            namespaces = store.namespaces.len(),
            failures = report.failures.len(),
            "Loaded tag files"
        );
        Ok((store, report))
    }

    /// Find tag files under `dir`, recursively, sorted by path
    pub fn discover(dir: &Path, options: &LoadOptions) -> Result<Vec<PathBuf>, LoadError> {
        debug!(?dir, "TagStore::discover: called");
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && options.matches(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    return Err(LoadError::Walk {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => warn!(?dir, error = %e, "Skipping unreadable entry in tag directory"),
            }
        }

        debug!(?dir, file_count = files.len(), "TagStore::discover: complete");
        Ok(files)
    }

    /// Root tree of a namespace
    pub fn namespace(&self, name: &str) -> Option<&TagNode> {
        self.namespaces.get(name)
    }

    /// All namespace names, sorted
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Source files of all loaded namespaces, sorted
    pub fn files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = self.sources.values().map(|p| p.as_path()).collect();
        files.sort();
        files
    }

    /// Walk a tag path down to its node
    pub fn lookup(&self, path: &str) -> Result<&TagNode, ResolveError> {
        debug!(%path, "TagStore::lookup: called");
        let mut segments = path.split(PATH_SEPARATOR);
        let root = segments.next().unwrap_or_default();
        let mut node = self.namespaces.get(root).ok_or_else(|| ResolveError::ReferenceNotFound {
            path: path.to_string(),
            segment: root.to_string(),
        })?;

        for segment in segments {
            node = match node {
                TagNode::Mapping(entries) => entries.get(segment).ok_or_else(|| ResolveError::ReferenceNotFound {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })?,
                TagNode::Leaf(_) | TagNode::Sequence(_) => {
                    return Err(ResolveError::TypeMismatch {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    });
                }
            };
        }

        Ok(node)
    }

    /// Pick up to `count` tags at `path`
    ///
    /// A leaf always yields itself once. Pools yield `min(count, len)`
    /// distinct entries in draw order; a mapping yields values, not keys.
    pub fn resolve(&self, path: &str, count: usize, picker: &mut dyn Picker) -> Result<Vec<String>, ResolveError> {
        debug!(%path, %count, "TagStore::resolve: called");
        let picked: Vec<&TagNode> = match self.lookup(path)? {
            TagNode::Leaf(tag) => return Ok(vec![tag.clone()]),
            TagNode::Sequence(items) => {
                let amount = count.min(items.len());
                picker.sample(items.len(), amount).into_iter().map(|i| &items[i]).collect()
            }
            TagNode::Mapping(entries) => {
                let values: Vec<&TagNode> = entries.values().collect();
                let amount = count.min(values.len());
                picker.sample(values.len(), amount).into_iter().map(|i| values[i]).collect()
            }
        };

        picked
            .into_iter()
            .map(|node| match node {
                TagNode::Leaf(tag) => Ok(tag.clone()),
                TagNode::Sequence(_) | TagNode::Mapping(_) => Err(ResolveError::NestedPool { path: path.to_string() }),
            })
            .collect()
    }

    /// Every tag path that names a pool, sorted
    pub fn group_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (name, node) in &self.namespaces {
            collect_groups(name.clone(), node, &mut paths);
        }
        paths.sort();
        paths
    }

    pub(crate) fn tracked(&self) -> &[TrackedFile] {
        &self.tracked
    }
}

impl TrackedFile {
    pub(crate) fn capture(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            modified: fs::metadata(path).and_then(|m| m.modified()).ok(),
        }
    }
}

fn collect_groups(prefix: String, node: &TagNode, paths: &mut Vec<String>) {
    if !node.is_pool() {
        return;
    }
    if let TagNode::Mapping(entries) = node {
        for (key, child) in entries {
            collect_groups(format!("{}{}{}", prefix, PATH_SEPARATOR, key), child, paths);
        }
    }
    paths.push(prefix);
}

fn load_file(path: &Path) -> Result<(String, TagNode), LoadError> {
    debug!(?path, "load_file: called");
    let namespace = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LoadError::InvalidName { path: path.to_path_buf() })?
        .to_string();

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(?path, %namespace, "load_file: parsed");
    Ok((namespace, TagNode::from_yaml(value)))
}
