use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use kernel::{DOWNLOAD_FORM_ROUTE, DOWNLOAD_ROUTE, UPLOAD_ROUTE};
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    classify::ServerErrorsFailureClass, limit::RequestBodyLimitLayer, trace::TraceLayer,
};
use tracing::Span;

pub mod config;
pub mod domain;
pub mod file_reply;
mod handlers;
pub mod sniff;
pub mod store;
mod views;

use crate::config::Config;
use crate::store::FileStore;
use std::error::Error;
use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use handlers::ApiDoc;

pub async fn run() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "fstore=debug,server=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration from environment
    let config = Config::from_env()?;

    // Start init
    let store = FileStore::open(&config).await?;
    tracing::info!(
        "upload root: {} download root: {}",
        store.upload_root().display(),
        store.download_root().display()
    );

    let socket = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(socket).await?;
    tracing::debug!("listening on {socket}");

    let app = create_routes(store, config.max_upload_size);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn create_routes(store: FileStore, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            UPLOAD_ROUTE,
            get(handlers::upload_form).post(handlers::upload),
        )
        .route(DOWNLOAD_FORM_ROUTE, get(handlers::download_form))
        .route(DOWNLOAD_ROUTE, get(handlers::download))
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .with_state(Arc::new(store))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        tracing::error!("Server error: {error}");
                    },
                ))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_upload_size))
                .into_inner(),
        )
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
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

    tracing::info!("signal received, starting graceful shutdown");
}
