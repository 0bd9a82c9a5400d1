//! # pod-cli
//!
//! Cache-first npm package metadata server.
//!
//! This is the entry point for the `pod` binary. It parses flags, sets up
//! logging, resolves configuration and dispatches to the command handlers.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use pod_core::error::PodError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;

/// Cache-first npm package metadata server
#[derive(Parser)]
#[command(name = "pod", version, about = "Cache-first npm package metadata server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./pod.toml when present)
    #[arg(long, global = true, env = "POD_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve GET /registry/{name} over HTTP
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
        /// Upstream registry URL
        #[arg(long)]
        registry: Option<String>,
    },
    /// Handle one request event and print the response envelope
    Invoke {
        /// JSON event file (reads stdin when omitted)
        #[arg(long)]
        event: Option<Utf8PathBuf>,
    },
    /// Print the resolved configuration
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting pod v{}", env!("CARGO_PKG_VERSION"));

    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
    if let Err(e) = rt.block_on(commands::dispatch(cli)) {
        report_error(&e);
        std::process::exit(1);
    }
    Ok(())
}

/// Print an error chain with the first actionable suggestion found
fn report_error(error: &anyhow::Error) {
    eprintln!("error: {:#}", error);
    let suggestion = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PodError>())
        .and_then(PodError::suggestion);
    if let Some(help) = suggestion {
        eprintln!("help: {}", help);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pod={level},pod_handler={level},pod_storage={level},pod_registry={level},pod_events={level},pod_config={level}"
        ))
    });

    // stdout belongs to `invoke` output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("pod encountered an unexpected error: {}", panic_info);
        eprintln!("pod crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
