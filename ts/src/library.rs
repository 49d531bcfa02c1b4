//! Reloadable handle over a TagStore
//!
//! Readers take an `Arc<TagStore>` snapshot and keep using it for as long as
//! they like. A reload builds a complete replacement store first and only then
//! swaps it in, so no reader ever observes a partially rebuilt store.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::error::LoadError;
use crate::store::{LoadOptions, LoadReport, TagStore, TrackedFile};

/// Owner of the current tag store and the directories it came from
#[derive(Debug)]
pub struct TagLibrary {
    dirs: Vec<PathBuf>,
    options: LoadOptions,
    current: RwLock<Arc<TagStore>>,
}

impl TagLibrary {
    /// Load the tag directories (later directories override earlier ones)
    pub fn open(dirs: Vec<PathBuf>, options: LoadOptions) -> Result<(Self, LoadReport), LoadError> {
        debug!(?dirs, "TagLibrary::open: called");
        let (store, report) = TagStore::load(&dirs, &options)?;
        let library = Self {
            dirs,
            options,
            current: RwLock::new(Arc::new(store)),
        };
        Ok((library, report))
    }

    /// Wrap an already built store; reloads will read no directories
    pub fn from_store(store: TagStore) -> Self {
        Self {
            dirs: Vec::new(),
            options: LoadOptions::default(),
            current: RwLock::new(Arc::new(store)),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// The store as of now; unaffected by later reloads
    pub fn snapshot(&self) -> Arc<TagStore> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Rebuild the store from disk and swap it in
    pub fn reload(&self) -> Result<LoadReport, LoadError> {
        debug!("TagLibrary::reload: called");
        info!("Reloading tag files");
        let (store, report) = TagStore::load(&self.dirs, &self.options)?;
        self.swap(store);
        Ok(report)
    }

    /// Reload only if tag files were added, removed or modified since the last load
    pub fn reload_if_changed(&self) -> Result<Option<LoadReport>, LoadError> {
        debug!("TagLibrary::reload_if_changed: called");
        if !self.has_changes()? {
            debug!("TagLibrary::reload_if_changed: no changes, skipping");
            return Ok(None);
        }
        self.reload().map(Some)
    }

    /// Compare the tag files on disk with the ones the current store was built from
    pub fn has_changes(&self) -> Result<bool, LoadError> {
        let mut on_disk = Vec::new();
        for dir in self.dirs.iter().filter(|d| d.exists()) {
            on_disk.extend(TagStore::discover(dir, &self.options)?.iter().map(|p| TrackedFile::capture(p)));
        }
        let changed = on_disk.as_slice() != self.snapshot().tracked();
        debug!(%changed, "TagLibrary::has_changes: compared");
        Ok(changed)
    }

    fn swap(&self, store: TagStore) {
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(store);
        debug!(namespaces = guard.len(), "TagLibrary::swap: store replaced");
    }
}
