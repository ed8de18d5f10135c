//! Startup helpers and the scripted demo run by the `chatroom-demo` binary.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;

use crate::chat::{ChatConfig, ChatManager, SendPolicy};

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration from the JSON file named by `CHATROOM_CONFIG`, if set,
/// then apply `CHATROOM_*` environment overrides.
///
/// # Errors
/// Returns an error if the file cannot be read or the configuration is invalid.
pub fn load_config() -> anyhow::Result<ChatConfig> {
    let config = std::env::var("CHATROOM_CONFIG")
        .ok()
        .map(|path| read_config_file(&path))
        .transpose()?
        .unwrap_or_default()
        .with_env_overrides();
    config.validate().context("invalid config after env overrides")?;
    Ok(config)
}

fn read_config_file(path: &str) -> anyhow::Result<ChatConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path}"))?;
    ChatConfig::from_json_str(&raw).with_context(|| format!("invalid config in {path}"))
}

/// Run the demo on a single-threaded runtime.
///
/// # Returns
/// `ExitCode::SUCCESS` when the script completes, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();
    tracing::info!("Starting chatroom demo v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(run_demo()) {
        tracing::error!("Demo failed: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Scripted walk through sessions, replies, paging and search.
///
/// # Errors
/// Returns an error if configuration or any chat operation fails.
pub async fn run_demo() -> anyhow::Result<()> {
    let config = load_config()?.with_send_policy(SendPolicy::AllowOverlap);
    let mut chat = ChatManager::new(config)?;

    let alpha = chat.create_session("Alpha")?;
    let beta = chat.create_session("Beta")?;
    let _ = chat.create_session("Alpine notes")?;

    chat.select_session(Some(alpha))?;
    let ticket = chat.send_message("hi")?;
    tracing::info!(delay = ?ticket.delay, body = %ticket.body, "Reply armed");

    chat.select_session(Some(beta))?;
    let _ = chat.send_message("this room is about to disappear")?;
    chat.delete_session(beta);

    chat.drain_replies().await;

    chat.select_session(Some(alpha))?;
    for i in 0..24 {
        let _ = chat.send_message(&format!("message {i}"))?;
    }
    chat.drain_replies().await;
    tracing::info!(
        visible = chat.visible_messages().len(),
        has_more = chat.has_more(),
        "Paged view"
    );
    let _ = chat.load_older();
    tracing::info!(
        visible = chat.visible_messages().len(),
        has_more = chat.has_more(),
        "After loading older messages"
    );

    for typed in ["a", "al", "alp"] {
        chat.set_search_query(typed);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    if chat.search_applied().await {
        let names: Vec<String> = chat.filtered_sessions().into_iter().map(|s| s.name).collect();
        tracing::info!(?names, "Search results");
    }

    tracing::info!("Final state:\n{}", chat.snapshot().to_json()?);
    chat.shutdown();
    Ok(())
}
