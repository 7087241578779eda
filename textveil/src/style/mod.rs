/// Color normalization.
pub mod color;
/// The style document and its value types.
pub mod document;
/// Undo/redo history.
pub mod history;
/// Built-in style presets.
pub mod presets;
