/// The editing session.
pub mod editor;
/// Entitlement and background-removal hooks.
pub mod gate;
/// On-disk session manifests.
pub mod manifest;
