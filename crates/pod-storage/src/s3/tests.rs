//! Unit tests for the S3 store

use super::*;

use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path};

const NO_SUCH_KEY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message><Key>foo-bar-package/index.json</Key></Error>"#;

const ACCESS_DENIED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>"#;

async fn store_for(server: &MockServer) -> S3Store {
    S3Store::with_endpoint(&server.uri(), "foo-bucket").unwrap()
}

#[test]
fn test_virtual_host_url() {
    let store = S3Store::new("foo-bucket", "bar-region").unwrap();
    assert_eq!(
        store.object_url("foo-bar-package/index.json").as_str(),
        "https://foo-bucket.s3.bar-region.amazonaws.com/foo-bar-package/index.json"
    );
}

#[test]
fn test_endpoint_url_encodes_segments() {
    let store = S3Store::with_endpoint("http://localhost:9000/", "foo-bucket").unwrap();
    assert_eq!(
        store.object_url("@types/node/index.json").as_str(),
        "http://localhost:9000/foo-bucket/@types/node/index.json"
    );
    assert_eq!(
        store.object_url("with space/index.json").as_str(),
        "http://localhost:9000/foo-bucket/with%20space/index.json"
    );
}

#[test]
fn test_extract_element() {
    assert_eq!(extract_element(NO_SUCH_KEY_XML, "Code").as_deref(), Some("NoSuchKey"));
    assert_eq!(extract_element(ACCESS_DENIED_XML, "Message").as_deref(), Some("Access Denied"));
    assert_eq!(extract_element("<Error></Error>", "Code"), None);
    assert_eq!(extract_element("", "Code"), None);
}

#[tokio::test]
async fn test_get_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo-bucket/foo-bar-package/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"foo-bar-package"}"#))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    match store.get("foo-bar-package/index.json").await {
        CacheLookup::Found(bytes) => assert_eq!(bytes, br#"{"name":"foo-bar-package"}"#.to_vec()),
        other => panic!("Expected Found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_no_such_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/foo-bucket/foo-bar-package/index.json"))
        .respond_with(ResponseTemplate::new(404).set_body_string(NO_SUCH_KEY_XML))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    assert!(store.get("foo-bar-package/index.json").await.is_not_found());
}

#[tokio::test]
async fn test_get_bare_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    assert!(store.get("missing/index.json").await.is_not_found());
}

#[tokio::test]
async fn test_get_access_denied_is_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string(ACCESS_DENIED_XML))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    match store.get("foo-bar-package/index.json").await {
        CacheLookup::Failure(err) => {
            assert_eq!(err.to_string(), "Access Denied");
            assert_eq!(err.status_code(), 500);
        }
        other => panic!("Expected Failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_server_error_without_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    match store.get("foo-bar-package/index.json").await {
        CacheLookup::Failure(err) => assert_eq!(err.to_string(), "Cache store returned status 503"),
        other => panic!("Expected Failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_unreachable_store() {
    // Nothing listens on port 9 locally
    let store = S3Store::with_endpoint("http://127.0.0.1:9", "foo-bucket").unwrap();
    assert!(matches!(
        store.get("foo-bar-package/index.json").await,
        CacheLookup::Failure(PodError::Storage { .. })
    ));
}
