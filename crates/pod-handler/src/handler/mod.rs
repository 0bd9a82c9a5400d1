//! Retrieval handler: cache lookup with upstream fallback
//!
//! Every path ends in a [`ResponseEnvelope`]; no error escapes the handler.
//!
//! | Outcome                      | Status          | Logged |
//! |------------------------------|-----------------|--------|
//! | cache hit                    | 200             | no     |
//! | miss, upstream ok            | 200             | no     |
//! | miss, upstream fails (500)   | 500             | yes    |
//! | miss, upstream fails (other) | upstream status | no     |
//! | cache failure                | 500             | yes    |

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use pod_config::PodConfig;
use pod_core::error::{PodError, PodResult};
use pod_core::types::{Caller, PackageManifest, RequestEvent, ResponseEnvelope};
use pod_core::utils::cache_key;
use pod_events::{build_logger, EventLogger};
use pod_registry::{NpmClient, UpstreamRegistry};
use pod_storage::{build_store, CacheLookup, CacheStore};

/// Event source label for this handler
pub const SOURCE: &str = "package:get";

/// Collaborators a handler is built from
pub struct Collaborators {
    pub store: Arc<dyn CacheStore>,
    pub upstream: Arc<dyn UpstreamRegistry>,
    pub logger: Arc<dyn EventLogger>,
}

impl Collaborators {
    /// Build fresh collaborators from configuration
    pub fn from_config(config: &PodConfig) -> PodResult<Self> {
        Ok(Self {
            store: build_store(&config.storage)?,
            upstream: Arc::new(NpmClient::from_section(&config.registry)?),
            logger: build_logger(SOURCE, &config.events)?,
        })
    }
}

/// Answers "give me package X" requests
pub struct RetrievalHandler {
    store: Arc<dyn CacheStore>,
    upstream: Arc<dyn UpstreamRegistry>,
    logger: Arc<dyn EventLogger>,
    /// Upstream registry endpoint
    registry: String,
}

impl RetrievalHandler {
    pub fn new(
        store: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamRegistry>,
        logger: Arc<dyn EventLogger>,
        registry: impl Into<String>,
    ) -> Self {
        Self {
            store,
            upstream,
            logger,
            registry: registry.into(),
        }
    }

    /// Create a handler with collaborators built from configuration
    pub fn from_config(config: &PodConfig) -> PodResult<Self> {
        let Collaborators { store, upstream, logger } = Collaborators::from_config(config)?;
        Ok(Self::new(store, upstream, logger, config.registry.url.clone()))
    }

    /// Serve the manifest for `package_name`
    #[instrument(skip(self, caller))]
    pub async fn get(&self, package_name: &str, caller: &Caller) -> ResponseEnvelope {
        let key = cache_key(package_name);

        match self.store.get(&key).await {
            CacheLookup::Found(bytes) => match PackageManifest::from_slice(&bytes) {
                Ok(mut manifest) => {
                    debug!(attachments = manifest.attachment_count(), "Cache hit for {}", key);
                    manifest.strip_attachments();
                    ResponseEnvelope::ok_json(&manifest)
                }
                Err(e) => {
                    let error = PodError::MalformedDocument {
                        key,
                        message: e.to_string(),
                    };
                    self.cache_failure(caller, error).await
                }
            },
            CacheLookup::NotFound => {
                debug!("Cache miss for {}, asking {}", key, self.registry);
                self.fetch_upstream(package_name, caller).await
            }
            CacheLookup::Failure(error) => self.cache_failure(caller, error).await,
        }
    }

    /// Decode the request event and serve it
    pub async fn handle_event(&self, event: &RequestEvent) -> ResponseEnvelope {
        match event.package_name() {
            Ok(name) => self.get(&name, &event.caller()).await,
            Err(error) => {
                warn!("Rejecting request: {}", error);
                ResponseEnvelope::from_error(&error)
            }
        }
    }

    async fn fetch_upstream(&self, package_name: &str, caller: &Caller) -> ResponseEnvelope {
        match self.upstream.fetch_package(&self.registry, package_name).await {
            Ok(document) => ResponseEnvelope::ok_json(&document),
            Err(upstream) => {
                debug!("Upstream lookup failed with status {}", upstream.status);
                let log = upstream.is_server_error();
                let error = PodError::from(upstream);
                if log {
                    self.report(caller, &error).await;
                }
                ResponseEnvelope::from_error(&error)
            }
        }
    }

    async fn cache_failure(&self, caller: &Caller, error: PodError) -> ResponseEnvelope {
        self.report(caller, &error).await;
        ResponseEnvelope::error(500, error.to_string())
    }

    /// Log a failure; a failed log write never changes the response
    async fn report(&self, caller: &Caller, error: &PodError) {
        if let Err(log_error) = self.logger.error(caller, error).await {
            warn!("Dropped failure event for {}: {}", caller.name, log_error);
        }
    }
}

/// Run one invocation with collaborators built from `config`
pub async fn invoke(config: &PodConfig, event: &RequestEvent) -> ResponseEnvelope {
    match RetrievalHandler::from_config(config) {
        Ok(handler) => handler.handle_event(event).await,
        Err(error) => {
            warn!("Failed to build handler: {}", error);
            ResponseEnvelope::error(500, error.to_string())
        }
    }
}
