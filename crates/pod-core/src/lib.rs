//! # pod-core
//!
//! Core types and utilities shared across all Pod crates.
//!
//! This crate provides:
//! - PackageManifest, the ordered package document
//! - Caller identity, the inbound RequestEvent and the ResponseEnvelope
//! - PodError enum for unified error handling
//! - Cache key and package name helpers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (PackageManifest, ResponseEnvelope, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{PodError, PodResult};
pub use types::{Caller, PackageManifest, RequestEvent, ResponseEnvelope};
