//! Skyview appview binary — constructs the process-wide service context.
//!
//! Loads configuration, initializes structured logging, builds the
//! [`AppContext`](skyview_appview::AppContext) every request borrows, and
//! parks until SIGTERM/SIGINT. The HTTP surface that mounts request
//! handlers onto this context is wired up by the deployment layer.

use skyview_appview::{config, AppContext};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (String, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (path, "cli-arg");
    }

    if let Ok(path) = std::env::var("SKYVIEW_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (path, "env-var");
        }
    }

    ("config.toml".to_string(), "default")
}

#[tokio::main]
async fn main() {
    let (config_path, config_source) = resolve_config_path();

    // Load configuration
    let config = config::load_config(&config_path)
        .expect("failed to load configuration — the appview cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = %config_path,
        "resolved startup configuration path"
    );

    // Build the service context. Misconfiguration here is fatal: a context
    // missing a collaborator or holding an unusable key must never serve.
    let ctx = Arc::new(
        AppContext::from_config(config.service)
            .expect("failed to construct app context — check service identity and key config"),
    );

    tracing::info!(
        server_did = %ctx.server_did(),
        dataplane = ctx.dataplane().base_url(),
        default_labelers = ctx.default_labelers().len(),
        "skyview appview context ready"
    );

    shutdown_signal().await;
    tracing::info!("skyview appview shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
