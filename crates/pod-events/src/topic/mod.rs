//! Topic event logger
//!
//! Publishes each failure as a JSON document to an HTTP topic endpoint, so
//! an alerting pipeline can fan it out.

use std::time::Duration;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pod_core::error::{PodError, PodResult};
use pod_core::types::Caller;
use crate::EventLogger;

/// Event document published to the topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub source: String,
    pub level: String,
    pub user: Caller,
    pub error: ErrorPayload,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorEvent {
    pub fn new(source: &str, caller: &Caller, error: &PodError) -> Self {
        let status = match error {
            PodError::Upstream { status, .. } => Some(*status),
            _ => None,
        };

        Self {
            source: source.to_string(),
            level: "error".to_string(),
            user: caller.clone(),
            error: ErrorPayload {
                message: error.to_string(),
                status,
            },
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Publishes events to an HTTP topic
#[derive(Debug, Clone)]
pub struct TopicLogger {
    client: Client,
    source: String,
    topic: Url,
}

impl TopicLogger {
    /// Create a logger posting to `topic`, which must be an http(s) URL
    pub fn new(source: impl Into<String>, topic: &str) -> PodResult<Self> {
        let topic = Url::parse(topic)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| PodError::ConfigValidation {
                field: "events.topic".to_string(),
                reason: format!("'{}' is not an http(s) URL", topic),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent(concat!("pod/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PodError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            client,
            source: source.into(),
            topic,
        })
    }
}

#[async_trait]
impl EventLogger for TopicLogger {
    async fn error(&self, caller: &Caller, error: &PodError) -> PodResult<()> {
        let event = ErrorEvent::new(&self.source, caller, error);
        debug!("Publishing {} event to {}", event.level, self.topic);

        let response = self
            .client
            .post(self.topic.clone())
            .json(&event)
            .send()
            .await
            .map_err(|e| PodError::EventDelivery {
                message: format!("topic unreachable: {}", e),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(PodError::EventDelivery {
                message: format!("topic returned status {}", response.status().as_u16()),
                source: None,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn caller() -> Caller {
        Caller::new("foo", "https://example.com")
    }

    #[test]
    fn test_event_shape() {
        let event = ErrorEvent::new("package:get", &caller(), &PodError::upstream(500, "Npm error."));
        assert_eq!(event.level, "error");
        assert_eq!(event.error.status, Some(500));
        assert!(event.timestamp.ends_with('Z'));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["user"]["name"], "foo");
        assert_eq!(value["user"]["avatar"], "https://example.com");
        assert_eq!(value["error"]["message"], "Npm error.");
    }

    #[test]
    fn test_storage_event_has_no_status() {
        let event = ErrorEvent::new("package:get", &caller(), &PodError::storage("Storage error."));
        let value = serde_json::to_value(&event).unwrap();
        assert!(value["error"].get("status").is_none());
    }

    #[tokio::test]
    async fn test_publish_event() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/topics/pod"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let logger = TopicLogger::new("package:get", &format!("{}/topics/pod", server.uri())).unwrap();
        logger.error(&caller(), &PodError::storage("Storage error.")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: ErrorEvent = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body.source, "package:get");
        assert_eq!(body.user, caller());
        assert_eq!(body.error.message, "Storage error.");
    }

    #[test]
    fn test_rejects_non_http_topic() {
        let result = TopicLogger::new("package:get", "arn:aws:sns:us-east-1:123456789012:pod");
        assert!(matches!(result, Err(PodError::ConfigValidation { .. })));

        assert!(TopicLogger::new("package:get", "not a url").is_err());
    }

    #[tokio::test]
    async fn test_publish_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let logger = TopicLogger::new("package:get", &server.uri()).unwrap();
        let result = logger.error(&caller(), &PodError::storage("Storage error.")).await;
        assert!(matches!(result, Err(PodError::EventDelivery { .. })));
    }
}
