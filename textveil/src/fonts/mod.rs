/// Font families, faces, and the registry.
pub mod registry;
