/// The compositor and its options.
pub mod compositor;
pub(crate) mod cpu;
/// Frame fingerprints.
pub mod fingerprint;
/// Rendered frames and layouts.
pub mod frame;
pub(crate) mod plan;
