#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code; startup failures exit with a logged error.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use gateway::{
    GatewayConfig, GatewayState, auth::AcceptAllAuthenticator, build_router, config::Mode,
    credentials::CredentialStore, secret::SigningSecret,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment variables
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(Mode::Release);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.mode);

    tracing::info!(
        "Loaded configuration: service_name={}, api_key_file={}, mode={}, credential_reload={:?}",
        config.service_name,
        config.api_key_file.display(),
        config.mode,
        config.credential_reload,
    );

    // Generate the JWT secret. Tokens from a previous process no longer verify.
    let secret = match SigningSecret::generate() {
        Ok(secret) => secret,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    tracing::warn!("account passwords are not checked: every login with a valid API-Key succeeds");

    let state = GatewayState::new(
        &config.service_name,
        secret,
        CredentialStore::new(config.api_key_file.clone(), config.credential_reload),
        Arc::new(AcceptAllAuthenticator),
    );
    let app = build_router(state);

    let addr = SocketAddr::new(config.listen_host, config.listen_port);
    tracing::info!("listening on {}://{}", config.protocol, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        });

    tracing::info!("API server shutdown");
}

fn init_tracing(mode: Mode) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| mode.default_log_filter().into());
    let registry = tracing_subscriber::registry().with(filter);

    match mode {
        Mode::Debug => registry.with(tracing_subscriber::fmt::layer()).init(),
        Mode::Release => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
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
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
