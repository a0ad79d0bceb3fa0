use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::DataError;
use super::loader::{load_file, LoadOptions};
use super::model::NormalizedDataset;

/// Identity of a source file: path plus a modification signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceKey {
    pub fn for_path(path: &Path) -> Result<Self, DataError> {
        let meta = std::fs::metadata(path)?;
        Ok(SourceKey {
            path: path.to_path_buf(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Memoises the last loaded dataset.
///
/// A hit hands out the same `Arc`; a changed source is reloaded and replaces
/// the cached dataset wholesale. Sessions share the dataset read-only.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    key: SourceKey,
    options: LoadOptions,
    dataset: Arc<NormalizedDataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it if the source changed.
    ///
    /// A failed load leaves the previous entry untouched.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<NormalizedDataset>, DataError> {
        let key = SourceKey::for_path(path)?;

        if let Some(entry) = &self.entry {
            if entry.key == key && entry.options == *options {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        let dataset = Arc::new(load_file(path, options)?);
        self.entry = Some(CacheEntry {
            key,
            options: *options,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    /// Drop the cached dataset so the next call reloads.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn cached_key(&self) -> Option<&SourceKey> {
        self.entry.as_ref().map(|e| &e.key)
    }
}
