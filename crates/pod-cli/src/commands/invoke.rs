//! Invoke command: one serverless-style invocation.
//!
//! Reads a request event (API gateway shape) and prints the response
//! envelope as JSON, the same contract a function host expects.

use anyhow::Context;
use camino::Utf8PathBuf;
use tokio::io::AsyncReadExt;

use pod_config::PodConfig;
use pod_core::types::{RequestEvent, ResponseEnvelope};

/// Handle raw event text and return the envelope
pub async fn run(event_text: &str, config: &PodConfig) -> ResponseEnvelope {
    match RequestEvent::from_json(event_text) {
        Ok(event) => pod_handler::invoke(config, &event).await,
        Err(error) => ResponseEnvelope::from_error(&error),
    }
}

pub async fn execute(event: Option<Utf8PathBuf>, config: &PodConfig) -> anyhow::Result<()> {
    let text = match event {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read event file {}", path))?,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read event from stdin")?;
            text
        }
    };

    let envelope = run(&text, config).await;
    println!("{}", serde_json::to_string(&envelope)?);
    Ok(())
}
