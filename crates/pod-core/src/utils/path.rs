//! Key utilities for safe file system lookups.
//!
//! Cache keys come from request paths, so they are checked for directory
//! traversal before being joined onto a storage root.

use crate::error::{PodError, PodResult};
use std::path::{Path, PathBuf};

/// Check if a `/`-separated key stays inside its root
pub fn is_safe_key(key: &str) -> bool {
    if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
        return false;
    }

    // Track depth to detect escaping
    let mut depth = 0i32;

    for segment in key.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            // Windows drive prefixes and backslash separators
            s if s.contains('\\') || s.contains(':') => return false,
            _ => depth += 1,
        }
    }

    depth > 0
}

/// Safely join a key onto a base directory, preventing directory traversal
pub fn safe_join(base: &Path, key: &str) -> PodResult<PathBuf> {
    if !is_safe_key(key) {
        return Err(PodError::storage(format!("Refusing unsafe key: {}", key)));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in key.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }

    Ok(segments.iter().fold(base.to_path_buf(), |path, s| path.join(s)))
}
