/// Frame encoding and export options.
pub mod exporter;
/// Remote asset existence checks.
pub mod integrity;
/// Object storage backends.
pub mod storage;
