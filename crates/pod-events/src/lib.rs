//! Failure event logging for the Pod registry shim
//!
//! Handlers report failures through an [`EventLogger`], attributed to the
//! caller that triggered them. Events go to an HTTP topic when one is
//! configured and to the tracing subscriber otherwise.

pub mod console;
pub mod topic;

// Re-export main types
pub use console::TracingLogger;
pub use topic::{ErrorEvent, TopicLogger};

use std::sync::Arc;
use async_trait::async_trait;
use pod_config::EventsSection;
use pod_core::error::{PodError, PodResult};
use pod_core::types::Caller;

/// Sink for failure events
#[async_trait]
pub trait EventLogger: Send + Sync {
    /// Record `error` on behalf of `caller`
    async fn error(&self, caller: &Caller, error: &PodError) -> PodResult<()>;
}

/// Build the configured event logger for handlers labelled `source`
pub fn build_logger(source: &str, section: &EventsSection) -> PodResult<Arc<dyn EventLogger>> {
    let logger: Arc<dyn EventLogger> = match &section.topic {
        Some(topic) => Arc::new(TopicLogger::new(source, topic)?),
        None => Arc::new(TracingLogger::new(source)),
    };
    Ok(logger)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_logger_without_topic() {
        let logger = build_logger("package:get", &EventsSection::default()).unwrap();
        let caller = Caller::new("foo", "https://example.com");
        assert!(logger.error(&caller, &PodError::storage("boom")).await.is_ok());
    }

    #[test]
    fn test_build_logger_with_topic() {
        let section = EventsSection {
            topic: Some("https://events.example.com/pod".to_string()),
        };
        assert!(build_logger("package:get", &section).is_ok());
    }
}
