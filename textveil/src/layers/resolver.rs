//! Per-layer image loading state.
//!
//! Loads are modeled without IO: [`LayerResolver::set_source`] hands out a [`LoadTicket`], the
//! caller fetches the bytes however it likes, and [`LayerResolver::complete`] applies the result.
//! Every source change bumps a generation counter, so a completion for a superseded source is
//! discarded instead of overwriting the newer one.

use std::fmt;
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::core::Canvas;

/// One of the two image layers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Bottom layer: the original photo.
    Background,
    /// Top layer: the cut-out foreground.
    Subject,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Background => "background",
            Self::Subject => "subject",
        })
    }
}

/// Why a layer image could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayerLoadError {
    /// The source does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The origin refused to serve the image to this client.
    #[error("rejected by origin policy: {0}")]
    Rejected(String),
    /// Transport failure.
    #[error("fetch failed: {0}")]
    Network(String),
    /// Bytes arrived but are not a decodable image.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Load state of one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// No source set.
    Empty,
    /// A source is set and its load has not completed.
    Pending,
    /// The image is decoded and drawable.
    Ready,
    /// The load failed; a placeholder is drawn instead.
    Failed(LayerLoadError),
}

impl LoadState {
    /// `true` while a load is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Pending => 1,
            Self::Ready => 2,
            Self::Failed(_) => 3,
        }
    }
}

/// Permission to deliver the bytes for one specific source of one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    /// Layer the ticket belongs to.
    pub kind: LayerKind,
    /// Source generation the ticket was issued for.
    pub generation: u64,
    /// Source identifier (URL or relative path) to fetch.
    pub source: String,
}

/// Read-only view of a layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerAsset {
    /// Which layer.
    pub kind: LayerKind,
    /// Current source identifier.
    pub source: Option<String>,
    /// Current load state.
    pub state: LoadState,
    /// Natural pixel size once ready.
    pub natural_size: Option<Canvas>,
}

/// Load-state machine for one layer.
#[derive(Clone, Debug)]
pub struct LayerResolver {
    kind: LayerKind,
    source: Option<String>,
    generation: u64,
    state: LoadState,
    image: Option<Arc<PreparedImage>>,
}

impl LayerResolver {
    /// Empty layer.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            source: None,
            generation: 0,
            state: LoadState::Empty,
            image: None,
        }
    }

    /// Which layer this resolver tracks.
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Current source identifier.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Current load state.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Number of source changes so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot of the layer.
    pub fn asset(&self) -> LayerAsset {
        LayerAsset {
            kind: self.kind,
            source: self.source.clone(),
            state: self.state.clone(),
            natural_size: self.natural_size(),
        }
    }

    /// Natural size of the decoded image, if ready.
    pub fn natural_size(&self) -> Option<Canvas> {
        self.image.as_ref().map(|img| Canvas {
            width: img.width,
            height: img.height,
        })
    }

    /// Point the layer at `source`.
    ///
    /// Returns a ticket when a load must start. Setting the current source again is a no-op,
    /// and an empty identifier clears the layer.
    pub fn set_source(&mut self, source: Option<String>) -> Option<LoadTicket> {
        let source = source.filter(|s| !s.trim().is_empty());
        if source == self.source {
            return None;
        }

        self.generation += 1;
        self.source = source;
        self.image = None;
        match &self.source {
            None => {
                self.state = LoadState::Empty;
                tracing::debug!(layer = %self.kind, generation = self.generation, "layer cleared");
                None
            }
            Some(_) => {
                self.state = LoadState::Pending;
                tracing::debug!(layer = %self.kind, generation = self.generation, "layer load started");
                self.pending_ticket()
            }
        }
    }

    /// Ticket for the outstanding load, if any.
    pub fn pending_ticket(&self) -> Option<LoadTicket> {
        match (&self.state, &self.source) {
            (LoadState::Pending, Some(source)) => Some(LoadTicket {
                kind: self.kind,
                generation: self.generation,
                source: source.clone(),
            }),
            _ => None,
        }
    }

    /// Restart a failed load of the current source.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        if !matches!(self.state, LoadState::Failed(_)) {
            return None;
        }
        self.generation += 1;
        self.state = LoadState::Pending;
        self.pending_ticket()
    }

    /// Apply fetched bytes (or a fetch failure) for `ticket`.
    ///
    /// Returns `false`, leaving the layer untouched, when the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<u8>, LayerLoadError>,
    ) -> bool {
        if !self.accepts(ticket) {
            return self.discard(ticket);
        }
        self.complete_decoded(ticket, decode_fetched(result))
    }

    pub(crate) fn complete_decoded(
        &mut self,
        ticket: &LoadTicket,
        result: Result<PreparedImage, LayerLoadError>,
    ) -> bool {
        if !self.accepts(ticket) {
            return self.discard(ticket);
        }
        match result {
            Ok(img) => {
                tracing::debug!(layer = %self.kind, width = img.width, height = img.height, "layer ready");
                self.image = Some(Arc::new(img));
                self.state = LoadState::Ready;
            }
            Err(err) => {
                tracing::warn!(layer = %self.kind, source = ?self.source, %err, "layer load failed");
                self.image = None;
                self.state = LoadState::Failed(err);
            }
        }
        true
    }

    pub(crate) fn image(&self) -> Option<&Arc<PreparedImage>> {
        self.image.as_ref()
    }

    /// `(generation, state)` pair that changes whenever the drawn content can change.
    pub(crate) fn identity(&self) -> (u64, u8) {
        (self.generation, self.state.tag())
    }

    fn accepts(&self, ticket: &LoadTicket) -> bool {
        ticket.kind == self.kind
            && ticket.generation == self.generation
            && self.state.is_pending()
            && self.source.as_deref() == Some(ticket.source.as_str())
    }

    fn discard(&self, ticket: &LoadTicket) -> bool {
        tracing::debug!(
            layer = %self.kind,
            ticket_generation = ticket.generation,
            current_generation = self.generation,
            "discarding stale layer load"
        );
        false
    }
}

pub(crate) fn decode_fetched(
    result: Result<Vec<u8>, LayerLoadError>,
) -> Result<PreparedImage, LayerLoadError> {
    let bytes = result?;
    decode_image(&bytes).map_err(|e| LayerLoadError::Decode(format!("{e:#}")))
}

#[cfg(test)]
#[path = "../../tests/unit/layers/resolver.rs"]
mod tests;
