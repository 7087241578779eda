use crate::export::storage::{ObjectStorage, RemoteAsset};
use crate::foundation::error::{EditorError, EditorResult};
use crate::layers::resolver::LayerKind;

/// Outcome of a passing integrity check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// The background asset is gone and must be dropped before exporting.
    pub background_missing: bool,
}

/// Confirms the remote assets behind an export still exist.
///
/// A missing subject blocks the export. A missing background only degrades it.
pub struct IntegrityGuard;

impl IntegrityGuard {
    /// Check `subject` first, then `background`. Absent layers are not checked.
    #[tracing::instrument(skip_all)]
    pub fn verify(
        storage: &dyn ObjectStorage,
        background: Option<&RemoteAsset>,
        subject: Option<&RemoteAsset>,
    ) -> EditorResult<IntegrityReport> {
        if let Some(subject) = subject
            && !storage.exists(&subject.key)?
        {
            tracing::warn!(key = %subject.key, "subject asset missing");
            return Err(EditorError::MissingRemoteAsset {
                layer: LayerKind::Subject,
                key: subject.key.clone(),
            });
        }

        let background_missing = match background {
            Some(bg) => !storage.exists(&bg.key)?,
            None => false,
        };
        if background_missing {
            tracing::warn!("background asset missing; exporting without it");
        }
        Ok(IntegrityReport { background_missing })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/integrity.rs"]
mod tests;
