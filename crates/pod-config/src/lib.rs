//! Configuration loading for the Pod registry shim
//!
//! Resolves the registry endpoint, cache store location and event topic from
//! an optional pod.toml, the environment and command line flags.

pub mod settings;
pub mod merge;

// Re-export main types
pub use settings::{PodConfig, RegistrySection, StorageSection, StorageBackend, EventsSection, ServerSection};
pub use merge::{ConfigLoader, ConfigLayering, ConfigSource};

use pod_core::error::PodError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, PodError>;
