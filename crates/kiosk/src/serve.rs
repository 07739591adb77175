// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kiosk serve` command implementation.
//!
//! Wires the SQLite store, the Telegram channel adapter, and the dispatcher
//! together, then pumps inbound events until a shutdown signal arrives.

use std::sync::Arc;

use kiosk_bot::Dispatcher;
use kiosk_config::model::KioskConfig;
use kiosk_core::error::KioskError;
use kiosk_core::traits::{ChannelAdapter, ChatChannel, CommerceStore, PluginAdapter};
use kiosk_storage::SqliteStore;
use kiosk_telegram::TelegramChannel;
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `kiosk serve` command.
///
/// Serve-time requirements (bot token, admin ids, payment card) are checked
/// here rather than at config load so that `kiosk config` works on an
/// unconfigured machine.
pub async fn run_serve(config: KioskConfig) -> Result<(), KioskError> {
    init_tracing(&config.bot.log_level);

    info!("starting kiosk serve");
    check_serve_requirements(&config)?;

    let store = SqliteStore::new(config.storage.clone(), config.bot.order_prefix.clone());
    store.initialize().await?;
    let store = Arc::new(store);
    info!(path = config.storage.database_path.as_str(), "storage ready");

    let mut telegram = TelegramChannel::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram channel");
        e
    })?;
    telegram.connect().await?;
    let channel = Arc::new(telegram);
    info!("telegram channel connected");

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&store) as Arc<dyn CommerceStore>,
        Arc::clone(&channel) as Arc<dyn ChatChannel>,
        &config,
    ));

    let cancel = shutdown::install_signal_handler();
    info!(admins = config.bot.admin_ids.len(), "kiosk bot running");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = channel.receive() => {
                match event {
                    Ok(event) => {
                        // Each event is handled on its own task so a slow
                        // storage call cannot stall the inbound stream.
                        let dispatcher = Arc::clone(&dispatcher);
                        tokio::spawn(async move {
                            dispatcher.dispatch(event).await;
                        });
                    }
                    Err(e) => {
                        // The inbound stream only fails when polling has
                        // stopped, so there is nothing left to serve.
                        warn!(error = %e, "inbound channel closed");
                        break;
                    }
                }
            }
        }
    }

    info!("shutting down");
    dispatcher.shutdown();
    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "telegram shutdown reported an error");
    }
    store.close().await?;

    info!("kiosk serve shutdown complete");
    Ok(())
}

/// Checks the configuration keys that only matter when actually serving.
fn check_serve_requirements(config: &KioskConfig) -> Result<(), KioskError> {
    let mut missing = Vec::new();
    if config.telegram.bot_token.is_none() {
        missing.push("telegram.bot_token (or KIOSK_TELEGRAM_BOT_TOKEN)");
    }
    if config.bot.admin_ids.is_empty() {
        missing.push("bot.admin_ids");
    }
    if config.bot.payment_card.is_empty() {
        missing.push("bot.payment_card");
    }
    if missing.is_empty() {
        return Ok(());
    }
    for key in &missing {
        eprintln!("error: missing required config: {key}");
    }
    Err(KioskError::Config(format!(
        "{} required config value(s) missing",
        missing.len()
    )))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kiosk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
