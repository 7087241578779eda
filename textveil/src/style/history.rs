use crate::style::document::StyleDocument;

/// Linear undo/redo history of [`StyleDocument`] snapshots.
///
/// The store is never empty. Committing after an undo discards the redo branch.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    snapshots: Vec<StyleDocument>,
    cursor: usize,
}

impl HistoryStore {
    /// History holding only `initial`.
    pub fn new(initial: StyleDocument) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    /// Record `doc` as the newest state, dropping anything after the cursor.
    pub fn commit(&mut self, doc: StyleDocument) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(doc);
        self.cursor = self.snapshots.len() - 1;
    }

    /// Apply `f` to a copy of the current document and commit the result.
    pub fn edit(&mut self, f: impl FnOnce(StyleDocument) -> StyleDocument) -> &StyleDocument {
        let next = f(self.current().clone());
        self.commit(next);
        self.current()
    }

    /// Step back; a no-op at the oldest snapshot.
    pub fn undo(&mut self) -> &StyleDocument {
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    /// Step forward; a no-op at the newest snapshot.
    pub fn redo(&mut self) -> &StyleDocument {
        if self.cursor + 1 < self.snapshots.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Document at the cursor.
    pub fn current(&self) -> &StyleDocument {
        &self.snapshots[self.cursor]
    }

    /// `true` unless the cursor is at the oldest snapshot.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// `true` unless the cursor is at the newest snapshot.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the current snapshot.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[StyleDocument] {
        &self.snapshots
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(StyleDocument::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/history.rs"]
mod tests;
