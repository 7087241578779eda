use crate::export::storage::RemoteAsset;
use crate::foundation::error::EditorResult;

/// Decides whether the current user may run paid operations.
pub trait EntitlementGate: Send + Sync {
    /// Background removal on a new upload.
    fn may_process(&self) -> bool;

    /// Downloading the composited image.
    fn may_export(&self) -> bool;
}

/// Gate with fixed answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticGate {
    /// Answer for [`EntitlementGate::may_process`].
    pub process: bool,
    /// Answer for [`EntitlementGate::may_export`].
    pub export: bool,
}

impl StaticGate {
    /// Everything allowed.
    pub fn allow_all() -> Self {
        Self {
            process: true,
            export: true,
        }
    }

    /// Everything refused.
    pub fn deny_all() -> Self {
        Self {
            process: false,
            export: false,
        }
    }
}

impl EntitlementGate for StaticGate {
    fn may_process(&self) -> bool {
        self.process
    }

    fn may_export(&self) -> bool {
        self.export
    }
}

/// Produces the cut-out subject for an uploaded photo.
pub trait BackgroundRemover: Send + Sync {
    /// Remove the background of `source`, returning the stored subject image.
    fn remove_background(&self, source: &RemoteAsset) -> EditorResult<RemoteAsset>;
}

impl<F> BackgroundRemover for F
where
    F: Fn(&RemoteAsset) -> EditorResult<RemoteAsset> + Send + Sync,
{
    fn remove_background(&self, source: &RemoteAsset) -> EditorResult<RemoteAsset> {
        self(source)
    }
}
