//! Loading of flag documents from disk.
//!
//! A data directory holds one JSON document per scanned codebase, each an
//! array of [`FlagRecord`]s. Every load re-reads the whole directory; there
//! is no cache. A single malformed document fails the whole load.

pub mod merge;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::DataConfig;
use crate::error::{Error, Result};
use crate::flag::FlagRecord;

pub use merge::{find_flag, merge_flags};

/// Read every flag document in `dir` and concatenate their records.
///
/// Only regular files whose extension matches one of `extensions`
/// (case-insensitively) are read. Files are read in file-name order so the
/// result does not depend on directory iteration order.
///
/// # Errors
///
/// Returns [`Error::DataDirMissing`] if `dir` does not exist,
/// [`Error::DataDirRead`] or [`Error::DocumentRead`] on I/O failures, and
/// [`Error::DocumentParse`] if any document is not a valid array of flag
/// records. No records are returned on error.
pub fn load_all(dir: &Path, extensions: &[String]) -> Result<Vec<FlagRecord>> {
    if !dir.is_dir() {
        return Err(Error::DataDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let documents = list_documents(dir, extensions)?;
    let mut records = Vec::new();

    for path in &documents {
        let content = std::fs::read_to_string(path).map_err(|source| Error::DocumentRead {
            path: path.clone(),
            source,
        })?;
        let flags: Vec<FlagRecord> =
            serde_json::from_str(&content).map_err(|source| Error::DocumentParse {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), flags = flags.len(), "Loaded flag document");
        records.extend(flags);
    }

    info!(
        dir = %dir.display(),
        documents = documents.len(),
        records = records.len(),
        "Loaded feature flags"
    );
    Ok(records)
}

/// List matching documents in `dir`, sorted by file name.
fn list_documents(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let read_dir_err = |source| Error::DataDirRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();

        if !path.is_file() {
            debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }
        if !has_extension(&path, extensions) {
            debug!(path = %path.display(), "Skipping file with unrecognized extension");
            continue;
        }
        documents.push(path);
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Handle on a flag data directory.
///
/// Holds only the location and the accepted extensions; every accessor
/// performs a fresh load, so concurrent callers never share state.
#[derive(Debug, Clone)]
pub struct FlagStore {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl FlagStore {
    /// Create a store reading `.json` documents from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: vec!["json".to_string()],
        }
    }

    /// Create a store from the data section of the configuration.
    #[must_use]
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// The directory this store reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load all records without merging.
    ///
    /// # Errors
    ///
    /// See [`load_all`].
    pub fn load(&self) -> Result<Vec<FlagRecord>> {
        load_all(&self.dir, &self.extensions)
    }

    /// Load and merge all records.
    ///
    /// # Errors
    ///
    /// See [`load_all`].
    pub fn flags(&self) -> Result<Vec<FlagRecord>> {
        Ok(merge_flags(self.load()?))
    }

    /// Load, merge, and return the flag with the given name.
    ///
    /// An unknown name is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// See [`load_all`].
    pub fn find(&self, name: &str) -> Result<Option<FlagRecord>> {
        let flags = self.flags()?;
        Ok(find_flag(&flags, name).cloned())
    }
}
