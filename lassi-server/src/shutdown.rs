//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use crate::state::AppState;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Notify;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

/// Spawns a task that listens for SIGHUP and reloads the configuration.
///
/// The listen address is fixed for the life of the process; every other
/// section is swapped in place. Returns a Notify that stops the task.
pub fn spawn_config_reload_handler(
    state: AppState,
    config_loader: Arc<ConfigLoader>,
) -> Arc<Notify> {
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_notify_clone = shutdown_notify.clone();

    tokio::spawn(async move {
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading configuration");
                    let loader = config_loader.clone();
                    let reloaded = tokio::task::spawn_blocking(move || loader.reload()).await;
                    match reloaded {
                        Ok(Ok(loaded_config)) => {
                            let listen = state.config.server.read().await.listen;
                            if loaded_config.server.listen != listen {
                                tracing::warn!(
                                    current = %listen,
                                    configured = %loaded_config.server.listen,
                                    "Listen address changes require a restart"
                                );
                            }
                            *state.config.auth.write().await = loaded_config.auth;
                            *state.config.kiosk.write().await = loaded_config.kiosk;
                            *state.config.storefront.write().await = loaded_config.storefront;

                            tracing::info!("Configuration reloaded successfully");
                        }
                        Ok(Err(e)) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                        Err(e) => {
                            tracing::error!("Configuration reload task failed: {}", e);
                        }
                    }
                }
                _ = shutdown_notify_clone.notified() => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }
            }
        }
    });

    shutdown_notify
}
