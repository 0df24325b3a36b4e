//! HTTP surface: download endpoints plus static serving of stored media.

mod error;
mod handlers;

use std::future::Future;
use std::path::Path;

use anyhow::Context;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::expiry::is_record_path;
use crate::media::MediaKind;
use crate::service::MediaService;
use crate::storage;

pub use handlers::DownloadParams;

/// Builds the application router over `service`.
pub fn router(service: MediaService) -> Router {
    let base_dir = service.config().base_dir.clone();
    let videos = ServeDir::new(storage::kind_dir(&base_dir, MediaKind::Video));
    let images = ServeDir::new(storage::kind_dir(&base_dir, MediaKind::Image));

    Router::new()
        .route("/download", get(handlers::download))
        .route("/download/video", get(handlers::download_video))
        .route("/download/image", get(handlers::download_image))
        .nest_service("/videos", videos)
        .nest_service("/images", images)
        .layer(middleware::from_fn(hide_internal_files))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// In-progress downloads and expiry records live next to served files; never expose them.
async fn hide_internal_files(req: Request, next: Next) -> Response {
    if is_internal_path(req.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}

/// Checks the decoded last segment, the name `ServeDir` will open.
/// Paths that do not decode are treated as internal.
fn is_internal_path(raw: &str) -> bool {
    let decoded = match urlencoding::decode(raw) {
        Ok(d) => d,
        Err(_) => return true,
    };
    let name = decoded
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("");
    storage::is_temp_path(Path::new(name)) || is_record_path(Path::new(name))
}

/// Prepares storage, binds `host:port` and serves until `shutdown` resolves.
/// Pending deletion timers are dropped on exit; their records remain for the next start.
pub async fn serve<F>(service: MediaService, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let report = service.prepare().await.context("failed to prepare storage")?;
    tracing::info!(
        base_dir = %service.config().base_dir.display(),
        rescheduled = report.rescheduled,
        deleted = report.deleted,
        "storage ready"
    );

    let listen_address = format!("{}:{}", service.config().host, service.config().port);
    let listener = tokio::net::TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("failed to bind {}", listen_address))?;
    tracing::info!(
        "listening on http://{} (public base {})",
        listen_address,
        service.config().base_url
    );

    axum::serve(listener, router(service.clone()))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    service.scheduler().shutdown();
    tracing::info!("server stopped");
    Ok(())
}
