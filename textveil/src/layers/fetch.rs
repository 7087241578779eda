use std::path::{Path, PathBuf};

use crate::foundation::error::{EditorError, EditorResult};
use crate::layers::resolver::LayerLoadError;

/// Delivers the bytes behind a layer source identifier.
///
/// Fetchers are shared across threads when both layers load concurrently.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw (still encoded) image bytes for `source`.
    fn fetch(&self, source: &str) -> Result<Vec<u8>, LayerLoadError>;
}

impl<F> ImageFetcher for F
where
    F: Fn(&str) -> Result<Vec<u8>, LayerLoadError> + Send + Sync,
{
    fn fetch(&self, source: &str) -> Result<Vec<u8>, LayerLoadError> {
        self(source)
    }
}

/// Fetches `file://` or bare relative sources from a local directory.
#[derive(Clone, Debug)]
pub struct FsImageFetcher {
    root: PathBuf,
}

impl FsImageFetcher {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory sources are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageFetcher for FsImageFetcher {
    #[tracing::instrument(level = "debug", skip(self))]
    fn fetch(&self, source: &str) -> Result<Vec<u8>, LayerLoadError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Err(LayerLoadError::Rejected(format!(
                "'{source}' is remote; this fetcher only reads local files"
            )));
        }
        let rel = source.strip_prefix("file://").unwrap_or(source);
        let norm = normalize_rel_path(rel).map_err(|e| LayerLoadError::Rejected(e.to_string()))?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LayerLoadError::NotFound(path.display().to_string()),
            _ => LayerLoadError::Network(format!("read '{}': {e}", path.display())),
        })
    }
}

/// Normalize and validate root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> EditorResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(EditorError::validation("paths must be relative"));
    }
    if s.is_empty() {
        return Err(EditorError::validation("path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(EditorError::validation("paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(EditorError::validation("path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/layers/fetch.rs"]
mod tests;
