//! Core data types for the Pod registry shim.
//!
//! This module provides the fundamental types used throughout Pod:
//! - Package manifest documents as stored in the cache
//! - Caller identity and the inbound request event
//! - The response envelope handed back to the host

pub mod envelope;
pub mod event;
pub mod manifest;

// Re-export all public types
pub use envelope::ResponseEnvelope;
pub use event::{Authorizer, Caller, PathParameters, RequestContext, RequestEvent};
pub use manifest::{PackageManifest, ATTACHMENTS_FIELD};
