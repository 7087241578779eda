use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::foundation::error::{EditorError, EditorResult};
use crate::layers::fetch::normalize_rel_path;

/// Object store that holds uploaded and processed images.
pub trait ObjectStorage: Send + Sync {
    /// `true` when an object exists under `key`.
    fn exists(&self, key: &str) -> EditorResult<bool>;

    /// Create or replace the object under `key`.
    fn upsert(&self, key: &str, bytes: &[u8]) -> EditorResult<()>;
}

/// Image stored remotely: a fetchable URL plus its storage key.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RemoteAsset {
    /// Source handed to the layer fetcher.
    pub url: String,
    /// Key used for existence checks.
    pub key: String,
}

impl RemoteAsset {
    /// Pair a URL with its key.
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }
}

/// Process-local storage, mainly for tests and offline sessions.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete `key`; returns whether it existed.
    pub fn remove(&self, key: &str) -> EditorResult<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    /// Copy of the object under `key`.
    pub fn get(&self, key: &str) -> EditorResult<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn lock(&self) -> EditorResult<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.objects
            .lock()
            .map_err(|_| EditorError::storage("in-memory storage lock poisoned"))
    }
}

impl ObjectStorage for InMemoryStorage {
    fn exists(&self, key: &str) -> EditorResult<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    fn upsert(&self, key: &str, bytes: &[u8]) -> EditorResult<()> {
        self.lock()?.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
}

/// Storage backed by a directory; keys are relative paths.
#[derive(Clone, Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Store objects below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory objects live in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> EditorResult<PathBuf> {
        let rel = normalize_rel_path(key)
            .map_err(|e| EditorError::storage(format!("invalid key '{key}': {e}")))?;
        Ok(self.root.join(rel))
    }
}

impl ObjectStorage for FsStorage {
    fn exists(&self, key: &str) -> EditorResult<bool> {
        let path = self.path_for(key)?;
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(EditorError::storage(format!(
                "stat '{}': {e}",
                path.display()
            ))),
        }
    }

    fn upsert(&self, key: &str, bytes: &[u8]) -> EditorResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create '{}'", parent.display()))?;
        }
        // Readers never observe a partially written object.
        let tmp = partial_path(&path);
        let written = std::fs::write(&tmp, bytes)
            .with_context(|| format!("write '{}'", tmp.display()))
            .and_then(|()| {
                std::fs::rename(&tmp, &path)
                    .with_context(|| format!("rename into '{}'", path.display()))
            });
        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written.map_err(EditorError::from)
    }
}

// `a.png` -> `a.png.partial`, so keys differing only in extension never share a temp file.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "../../tests/unit/export/storage.rs"]
mod tests;
