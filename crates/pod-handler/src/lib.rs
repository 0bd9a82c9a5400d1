//! Cache-first package metadata handler
//!
//! Serves `GET /registry/{name}`: the manifest published to the cache store
//! when there is one, the upstream registry's document otherwise.

pub mod handler;

// Re-export main types
pub use handler::{invoke, Collaborators, RetrievalHandler, SOURCE};
