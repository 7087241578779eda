/// Image fetchers.
pub mod fetch;
/// Per-layer load state machines.
pub mod resolver;
