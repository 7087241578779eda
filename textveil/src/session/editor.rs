use std::path::Path;

use crate::export::exporter::{ExportOpts, ExportedImage, Exporter};
use crate::export::integrity::IntegrityGuard;
use crate::export::storage::{ObjectStorage, RemoteAsset};
use crate::foundation::error::{EditorError, EditorResult};
use crate::layers::fetch::ImageFetcher;
use crate::layers::resolver::{LayerKind, LoadTicket};
use crate::notice::Notice;
use crate::render::compositor::Compositor;
use crate::render::frame::FrameOutcome;
use crate::session::gate::{BackgroundRemover, EntitlementGate};
use crate::session::manifest::SessionManifest;
use crate::style::document::{FontId, StyleDocument};
use crate::style::history::HistoryStore;
use crate::style::presets::Preset;

/// Result of a successful export.
#[derive(Clone, Debug)]
pub struct ExportOutcome {
    /// Encoded image.
    pub image: ExportedImage,
    /// `true` when the background was dropped because its asset vanished.
    pub degraded: bool,
    /// Everything the user should be told about this export.
    pub notices: Vec<Notice>,
}

/// One user's editing session: style history, both layers, and the export path.
pub struct EditorSession {
    history: HistoryStore,
    compositor: Compositor,
    gate: Box<dyn EntitlementGate>,
    background: Option<RemoteAsset>,
    subject: Option<RemoteAsset>,
}

impl EditorSession {
    /// Session starting from the default style.
    pub fn new(compositor: Compositor, gate: impl EntitlementGate + 'static) -> Self {
        Self {
            history: HistoryStore::default(),
            compositor,
            gate: Box::new(gate),
            background: None,
            subject: None,
        }
    }

    /// Reopen a session described by `manifest`; relative paths resolve against `base_dir`.
    #[tracing::instrument(skip(manifest, gate))]
    pub fn from_manifest(
        manifest: &SessionManifest,
        base_dir: &Path,
        gate: impl EntitlementGate + 'static,
    ) -> EditorResult<Self> {
        let fonts = manifest.font_registry(base_dir)?;
        let compositor = Compositor::new(manifest.compositor.clone(), fonts)?;
        let mut style = manifest.style.clone();
        if compositor.fonts().contains(&style.font_family) {
            style.font_weight = compositor
                .fonts()
                .coerce(&style.font_family, style.font_weight)?;
        }
        style.validate()?;

        let mut session = Self::new(compositor, gate);
        session.history = HistoryStore::new(style);
        session.set_background(manifest.background.clone());
        session.set_subject(manifest.subject.clone());
        Ok(session)
    }

    /// Style history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Current style.
    pub fn current(&self) -> &StyleDocument {
        self.history.current()
    }

    /// Validate and record `doc`.
    pub fn commit(&mut self, doc: StyleDocument) -> EditorResult<&StyleDocument> {
        doc.validate()?;
        self.history.commit(doc);
        Ok(self.history.current())
    }

    /// Derive a new style from the current one and record it.
    pub fn edit(
        &mut self,
        f: impl FnOnce(StyleDocument) -> StyleDocument,
    ) -> EditorResult<&StyleDocument> {
        let next = f(self.history.current().clone());
        self.commit(next)
    }

    /// Step back in history.
    pub fn undo(&mut self) -> &StyleDocument {
        self.history.undo()
    }

    /// Step forward in history.
    pub fn redo(&mut self) -> &StyleDocument {
        self.history.redo()
    }

    /// Apply a preset as one history entry, coercing its weight to what the family ships.
    pub fn apply_preset(&mut self, preset: &Preset) -> EditorResult<&StyleDocument> {
        let mut next = preset.apply(self.history.current());
        let fonts = self.compositor.fonts();
        if fonts.contains(&next.font_family) {
            next.font_weight = fonts.coerce(&next.font_family, next.font_weight)?;
        }
        self.commit(next)
    }

    /// Switch font family; the weight is coerced in the same history entry.
    pub fn set_font_family(&mut self, id: FontId) -> EditorResult<&StyleDocument> {
        let next = self
            .history
            .current()
            .clone()
            .with_font_family(id, self.compositor.fonts())?;
        self.commit(next)
    }

    /// Background asset, if any.
    pub fn background(&self) -> Option<&RemoteAsset> {
        self.background.as_ref()
    }

    /// Subject asset, if any.
    pub fn subject(&self) -> Option<&RemoteAsset> {
        self.subject.as_ref()
    }

    /// Replace the background asset; returns the load to perform, if any.
    pub fn set_background(&mut self, asset: Option<RemoteAsset>) -> Option<LoadTicket> {
        let url = asset.as_ref().map(|a| a.url.clone());
        self.background = asset;
        self.compositor.set_layer_source(LayerKind::Background, url)
    }

    /// Replace the subject asset; returns the load to perform, if any.
    pub fn set_subject(&mut self, asset: Option<RemoteAsset>) -> Option<LoadTicket> {
        let url = asset.as_ref().map(|a| a.url.clone());
        self.subject = asset;
        self.compositor.set_layer_source(LayerKind::Subject, url)
    }

    /// Start editing a new photo: it becomes the background, and its cut-out the subject.
    ///
    /// The old subject is cleared before removal runs, so a failed removal leaves no stale
    /// subject behind.
    #[tracing::instrument(skip(self, remover), fields(key = %source.key))]
    pub fn upload(
        &mut self,
        source: RemoteAsset,
        remover: &dyn BackgroundRemover,
    ) -> EditorResult<()> {
        if !self.gate.may_process() {
            return Err(EditorError::not_entitled(
                "background removal is not available on this plan",
            ));
        }
        self.set_background(Some(source.clone()));
        self.set_subject(None);
        let subject = remover.remove_background(&source)?;
        self.set_subject(Some(subject));
        Ok(())
    }

    /// Compositor driving the preview.
    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Mutable compositor (font loading, surface lifecycle, manual load completion).
    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Fetch every pending layer; see [`Compositor::resolve_pending`].
    pub fn resolve_layers(&mut self, fetcher: &dyn ImageFetcher) -> usize {
        self.compositor.resolve_pending(fetcher)
    }

    /// Render the preview of the current style.
    pub fn render(&mut self) -> EditorResult<FrameOutcome> {
        self.compositor.render(self.history.current())
    }

    /// Verify remote assets, then export the current style.
    ///
    /// A vanished subject aborts with [`EditorError::MissingRemoteAsset`]. A vanished background
    /// is removed from the session and the export continues without it.
    #[tracing::instrument(skip(self, storage))]
    pub fn export(
        &mut self,
        storage: &dyn ObjectStorage,
        opts: &ExportOpts,
    ) -> EditorResult<ExportOutcome> {
        if !self.gate.may_export() {
            return Err(EditorError::not_entitled(
                "downloads are not available on this plan",
            ));
        }

        let report =
            IntegrityGuard::verify(storage, self.background.as_ref(), self.subject.as_ref())?;
        let mut notices = Vec::new();
        if report.background_missing {
            if let Some(bg) = &self.background {
                notices.push(Notice::BackgroundDropped { key: bg.key.clone() });
            }
            self.set_background(None);
        }

        let image = Exporter::export(&mut self.compositor, self.history.current(), opts)?;
        notices.extend(image.notices.iter().cloned());
        Ok(ExportOutcome {
            image,
            degraded: report.background_missing,
            notices,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
