//! Textveil is the core of a "text behind the subject" image editor.
//!
//! A photo is split into two layers: the original (background) and a cut-out of its foreground
//! (subject). Styled text is composited between them, so the subject appears in front of it.
//!
//! - Edit a [`StyleDocument`] through a [`HistoryStore`] with undo/redo
//! - Load both layers through a [`Compositor`] and render previews
//! - Export PNG or JPEG with an [`Exporter`], or drive everything through an [`EditorSession`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod foundation;
pub(crate) mod text;

/// Font catalog and face loading.
pub mod fonts;
/// Export encoding, object storage, and remote-asset integrity checks.
pub mod export;
/// Layer load state and image fetching.
pub mod layers;
/// User-facing notices for degraded results.
pub mod notice;
/// Composition and rasterization.
pub mod render;
/// Editing sessions, manifests, and entitlement hooks.
pub mod session;
/// Style documents, colors, presets, and history.
pub mod style;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Size, Vec2};
pub use crate::foundation::error::{EditorError, EditorResult};

pub use crate::export::exporter::{
    ExportFormat, ExportOpts, ExportedImage, Exporter, encode_frame,
};
pub use crate::export::integrity::{IntegrityGuard, IntegrityReport};
pub use crate::export::storage::{FsStorage, InMemoryStorage, ObjectStorage, RemoteAsset};
pub use crate::fonts::registry::{FontFace, FontFamily, FontRegistry, FontSource};
pub use crate::layers::fetch::{FsImageFetcher, ImageFetcher};
pub use crate::layers::resolver::{
    LayerAsset, LayerKind, LayerLoadError, LayerResolver, LoadState, LoadTicket,
};
pub use crate::notice::{ColorField, Notice};
pub use crate::render::compositor::{Compositor, CompositorOpts};
pub use crate::render::fingerprint::FrameFingerprint;
pub use crate::render::frame::{
    FrameLayout, FrameOutcome, FrameState, RenderedFrame, TextNodeLayout,
};
pub use crate::session::editor::{EditorSession, ExportOutcome};
pub use crate::session::gate::{BackgroundRemover, EntitlementGate, StaticGate};
pub use crate::session::manifest::{FontFamilyConfig, FontsConfig, SessionManifest};
pub use crate::style::color::{
    ColorNormalizer, CssColorNormalizer, NormalizedColor, UnsupportedColor, resolve_color,
};
pub use crate::style::document::{FontId, FontWeight, Position, StyleDocument};
pub use crate::style::history::HistoryStore;
pub use crate::style::presets::{Preset, builtin_presets};
