//! Tracing-backed event logger

use async_trait::async_trait;
use tracing::error;

use pod_core::error::{PodError, PodResult};
use pod_core::types::Caller;
use crate::EventLogger;

/// Emits failure events through the tracing subscriber
#[derive(Debug, Clone)]
pub struct TracingLogger {
    source: String,
}

impl TracingLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

#[async_trait]
impl EventLogger for TracingLogger {
    async fn error(&self, caller: &Caller, err: &PodError) -> PodResult<()> {
        error!(
            source = %self.source,
            caller.name = %caller.name,
            caller.avatar = %caller.avatar,
            status = err.status_code(),
            recoverable = err.is_recoverable(),
            "{}",
            err
        );
        Ok(())
    }
}
