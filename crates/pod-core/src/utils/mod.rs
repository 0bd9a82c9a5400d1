//! Utility functions and helpers.
//!
//! Common functionality used across multiple Pod crates.

pub mod name;
pub mod path;

// Re-export commonly used utilities
pub use name::{cache_key, decode_package_name, encode_package_name, MANIFEST_FILE};
pub use path::{is_safe_key, safe_join};
