//! HTTP server assembly and lifecycle

use crate::config::{AppConfig, ServerConfig};
use crate::database;
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use newsroom::domain::collaborators::{BlobStore, Mailer};
use newsroom::infra::{build_mailer, LocalBlobStore};
use newsroom::NewsroomModule;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Connect, migrate and initialize the newsroom module
pub async fn bootstrap(config: &AppConfig) -> Result<Arc<NewsroomModule>> {
    let db = database::connect(&config.database).await?;
    NewsroomModule::migrate(&db)
        .await
        .context("database migration failed")?;

    let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.storage));
    let mailer: Arc<dyn Mailer> = build_mailer(&config.email)?;

    Ok(Arc::new(NewsroomModule::init(
        Arc::new(db),
        config.newsroom.clone(),
        blobs,
        mailer,
    )))
}

/// Full application router with the cross-cutting HTTP layers
pub fn build_router(config: &AppConfig, module: &NewsroomModule) -> Result<Router> {
    let storage = &config.storage;
    let router = module
        .register_rest(Router::new())
        .nest_service(&storage.public_path, ServeDir::new(&storage.root_dir))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes));

    let router = match cors_layer(&config.server)? {
        Some(cors) => router.layer(cors),
        None => router,
    };

    Ok(router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            ))),
    ))
}

fn cors_layer(config: &ServerConfig) -> Result<Option<CorsLayer>> {
    if config.cors_allowed_origins.is_empty() {
        return Ok(None);
    }
    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{}'", o))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    ))
}

/// Serve until Ctrl+C or SIGTERM, then stop background work
pub async fn run(config: AppConfig) -> Result<()> {
    let module = bootstrap(&config).await?;
    let app = build_router(&config, &module)?;

    let cancel = CancellationToken::new();
    let background = tokio::spawn(module.clone().serve(cancel.clone()));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "Newskoop server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .context("server error")?;

    cancel.cancel();
    background.await.context("background task panicked")??;
    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
        _ = cancel.cancelled() => {}
    }
    cancel.cancel();
}
