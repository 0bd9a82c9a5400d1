//! Package name handling: cache keys and URL encoding.

use percent_encoding::percent_decode_str;

use crate::error::{PodError, PodResult};

/// File name the publish pipeline writes each manifest under
pub const MANIFEST_FILE: &str = "index.json";

/// Cache key holding the manifest for a package
pub fn cache_key(package_name: &str) -> String {
    format!("{}/{}", package_name, MANIFEST_FILE)
}

/// Decode a URL-encoded package name path segment
pub fn decode_package_name(encoded: &str) -> PodResult<String> {
    let decoded = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|e| PodError::InvalidPackageName {
            name: encoded.to_string(),
            reason: format!("not valid UTF-8 once decoded: {}", e),
        })?;

    if decoded.trim().is_empty() {
        return Err(PodError::InvalidPackageName {
            name: encoded.to_string(),
            reason: "name is empty".to_string(),
        });
    }

    Ok(decoded.into_owned())
}

/// Encode package name for registry URLs (handle scoped packages)
pub fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/pkg -> @org%2fpkg
        name.replace('/', "%2f")
    } else {
        name.to_string()
    }
}
