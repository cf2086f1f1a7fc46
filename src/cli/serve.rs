//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::VigilConfig;
use crate::scheduler::CycleScheduler;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load configuration from `path` if it exists, then apply env overrides.
pub fn load_config(path: &Path) -> Result<VigilConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let config = if path.exists() {
        VigilConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        VigilConfig::default()
    };

    Ok(config.with_env_overrides())
}

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<VigilConfig, Box<dyn std::error::Error>> {
    let mut config = load_config(&args.config)?;

    // Apply CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.background {
        config.monitor.poll_in_background = true;
    }

    Ok(config)
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and merge configuration
    let config = load_config_with_overrides(&args)?;

    // Validate configuration
    config.validate()?;

    // 2. Initialize tracing
    crate::logging::init_tracing(&config.logging)?;

    tracing::info!("Starting Vigil server");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Resolve endpoints and build the scheduler
    let scheduler = Arc::new(CycleScheduler::from_config(&config)?);

    // 4. Build API router
    let config = Arc::new(config);
    let app_state = Arc::new(AppState::new(Arc::clone(&scheduler), Arc::clone(&config)));
    let app = create_router(app_state);

    // 5. Start background poller (if enabled)
    let cancel_token = CancellationToken::new();
    let poller_handle = if config.monitor.poll_in_background {
        tracing::info!("Starting background poller");
        Some(Arc::clone(&scheduler).start(cancel_token.clone()))
    } else {
        tracing::info!("Background polling disabled, cycles run on request");
        None
    };

    // 6. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, endpoints = scheduler.endpoints().len(), "Vigil API server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    // 7. Cleanup
    if let Some(handle) = poller_handle {
        tracing::info!("Waiting for background poller to stop");
        handle.await?;
    }

    tracing::info!("Vigil server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn args(config: PathBuf) -> ServeArgs {
        ServeArgs {
            config,
            port: None,
            host: None,
            log_level: None,
            background: false,
        }
    }

    #[tokio::test]
    async fn test_serve_config_loading() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[monitor]\nworker_cap = 3").unwrap();

        let config = load_config_with_overrides(&args(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.monitor.worker_cap, 3);
    }

    #[tokio::test]
    async fn test_serve_cli_overrides_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nhost = \"127.0.0.1\"").unwrap();

        let mut serve_args = args(temp.path().to_path_buf());
        serve_args.port = Some(9000); // Override
        serve_args.log_level = Some("debug".to_string());
        serve_args.background = true;

        let config = load_config_with_overrides(&serve_args).unwrap();
        assert_eq!(config.server.port, 9000); // CLI wins
        assert_eq!(config.logging.level, "debug");
        assert!(config.monitor.poll_in_background);
    }

    #[tokio::test]
    async fn test_serve_works_without_config_file() {
        let config =
            load_config_with_overrides(&args(PathBuf::from("nonexistent-vigil.toml"))).unwrap();
        assert!(config.endpoints.is_empty());
        assert!(!config.monitor.poll_in_background);
    }

    #[tokio::test]
    async fn test_serve_rejects_malformed_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[[endpoints]]\npath = \"/missing-name\"").unwrap();

        assert!(load_config_with_overrides(&args(temp.path().to_path_buf())).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_signal_triggers_cancel() {
        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();

        let handle = tokio::spawn(async move {
            // Simulate shutdown after 100ms
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel_clone.cancel();
        });

        // This should return when cancelled
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(Duration::from_secs(5)) => {
                panic!("Shutdown didn't trigger");
            }
        }

        handle.await.unwrap();
    }
}
