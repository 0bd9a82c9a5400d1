//! Inbound request event and caller identity.
//!
//! The event shape mirrors what an API gateway hands a serverless function:
//! the authorizer has already run and attached the caller, and the package
//! name arrives as a URL-encoded path segment.

use serde::{Deserialize, Serialize};

use crate::error::{PodError, PodResult};
use crate::utils::decode_package_name;

/// Identity of the acting caller, used only for log attribution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub name: String,
    pub avatar: String,
}

impl Caller {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// Request delivered to the handler by the hosting environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEvent {
    pub request_context: RequestContext,
    pub path_parameters: PathParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub authorizer: Authorizer,
}

/// Claims attached by the upstream authorizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorizer {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathParameters {
    /// URL-encoded package name
    pub name: String,
}

impl RequestEvent {
    /// Build an event for a package name that is already URL-encoded
    pub fn new(encoded_name: impl Into<String>, caller: &Caller) -> Self {
        Self {
            request_context: RequestContext {
                authorizer: Authorizer {
                    username: caller.name.clone(),
                    avatar: caller.avatar.clone(),
                },
            },
            path_parameters: PathParameters {
                name: encoded_name.into(),
            },
        }
    }

    /// Caller identity attached by the authorizer
    pub fn caller(&self) -> Caller {
        let authorizer = &self.request_context.authorizer;
        Caller::new(authorizer.username.clone(), authorizer.avatar.clone())
    }

    /// Decoded package name from the path
    pub fn package_name(&self) -> PodResult<String> {
        decode_package_name(&self.path_parameters.name)
    }

    /// Parse an event from JSON text
    pub fn from_json(text: &str) -> PodResult<Self> {
        serde_json::from_str(text).map_err(|e| PodError::InvalidPackageName {
            name: String::new(),
            reason: format!("malformed request event: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = r#"{
        "requestContext": {
            "authorizer": { "username": "foo", "avatar": "https://example.com" }
        },
        "pathParameters": { "name": "%40types%2Fnode" }
    }"#;

    #[test]
    fn test_parse_event() {
        let event = RequestEvent::from_json(EVENT).unwrap();
        assert_eq!(event.caller(), Caller::new("foo", "https://example.com"));
        assert_eq!(event.package_name().unwrap(), "@types/node");
    }

    #[test]
    fn test_missing_authorizer_fields_default() {
        let event = RequestEvent::from_json(
            r#"{"requestContext":{},"pathParameters":{"name":"foo-bar-package"}}"#,
        )
        .unwrap();
        assert_eq!(event.caller(), Caller::default());
        assert_eq!(event.package_name().unwrap(), "foo-bar-package");
    }

    #[test]
    fn test_missing_path_rejected() {
        let err = RequestEvent::from_json(r#"{"requestContext":{}}"#).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_round_trip_through_constructor() {
        let caller = Caller::new("bar", "https://example.com/bar.png");
        let event = RequestEvent::new("foo-bar-package", &caller);
        assert_eq!(event.caller(), caller);

        let text = serde_json::to_string(&event).unwrap();
        assert!(text.contains(r#""pathParameters":{"name":"foo-bar-package"}"#));
    }
}
