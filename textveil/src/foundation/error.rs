use crate::layers::resolver::LayerKind;

/// Convenience result type used across textveil.
pub type EditorResult<T> = Result<T, EditorError>;

/// Top-level error taxonomy used by editor APIs.
///
/// Layer load failures and color normalization failures are absorbed into render state and
/// notices; they never surface as an `EditorError`.
#[derive(thiserror::Error, Debug)]
pub enum EditorError {
    /// Invalid user-provided style or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A font face could not be resolved or loaded.
    #[error("font error: {0}")]
    Font(String),

    /// The object storage collaborator failed to answer.
    #[error("storage error: {0}")]
    Storage(String),

    /// The render surface is gone (or the frame never settled); the export must not proceed.
    #[error("preview unavailable: {0}")]
    PreviewUnavailable(String),

    /// A layer's remote asset no longer exists upstream.
    #[error("missing remote asset for {layer} layer (key '{key}')")]
    MissingRemoteAsset {
        /// Layer whose asset is gone.
        layer: LayerKind,
        /// Storage key that reported `exists = false`.
        key: String,
    },

    /// The entitlement gate refused the operation.
    #[error("not entitled: {0}")]
    NotEntitled(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EditorError {
    /// Build a [`EditorError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`EditorError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`EditorError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`EditorError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`EditorError::PreviewUnavailable`] value.
    pub fn preview_unavailable(msg: impl Into<String>) -> Self {
        Self::PreviewUnavailable(msg.into())
    }

    /// Build a [`EditorError::NotEntitled`] value.
    pub fn not_entitled(msg: impl Into<String>) -> Self {
        Self::NotEntitled(msg.into())
    }

    /// Return `true` when retrying the same export later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PreviewUnavailable(_) | Self::Storage(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
