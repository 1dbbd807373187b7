//! Feasure agent: one-shot request handler.
//!
//! Reads a `DispatchRequest` JSON document from stdin, routes it through
//! the dispatcher, and writes the `DispatchOutcome` JSON to stdout. Logs go
//! to stderr.

use std::process::ExitCode;
use std::sync::Arc;

use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use feasure_agent::config::AgentConfig;
use feasure_agent::{Dispatcher, OpenAiClient, VocabularyRegistry};
use feasure_protocol::DispatchRequest;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "feasure-agent starting");

    // ── Load config ─────────────────────────────────────────────
    // Missing credentials abort here, before any request is read.
    let config = match std::env::args().nth(1) {
        Some(path) => AgentConfig::from_file(&path)?,
        None => AgentConfig::from_env()?,
    };
    tracing::info!(
        model = %config.openai.model,
        base_url = %config.openai.base_url,
        "config loaded"
    );

    let vocabulary = Arc::new(VocabularyRegistry::standard());
    let client = Arc::new(OpenAiClient::new(config.openai)?);
    let dispatcher = Dispatcher::new(client, vocabulary);

    // ── Read request ────────────────────────────────────────────
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let request: DispatchRequest = serde_json::from_str(&input)?;

    match dispatcher.dispatch(&request).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, class = ?e.class(), "request failed");
            let body = json!({
                "error": e.to_string(),
                "class": e.class(),
                "retryable": e.is_retryable(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
