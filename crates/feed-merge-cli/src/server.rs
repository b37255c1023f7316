use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use feed_merge::{CalendarMerger, MergeError};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const CALENDAR_PATH: &str = "/calendar/merged.ics";
const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Merge(#[from] MergeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "merge failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn router(merger: Arc<CalendarMerger>) -> Router {
    Router::new()
        .route(CALENDAR_PATH, get(merged_calendar))
        .route("/health", get(health))
        .with_state(merger)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(Any),
        )
}

/// Each request runs a fresh merge. A client that disconnects drops the
/// handler future, which cancels its outstanding fetches.
async fn merged_calendar(
    State(merger): State<Arc<CalendarMerger>>,
) -> Result<impl IntoResponse, ApiError> {
    let merged = merger.merge().await?;
    Ok((
        [(header::CONTENT_TYPE, CALENDAR_CONTENT_TYPE)],
        merged.document,
    ))
}

async fn health() -> &'static str {
    "ok"
}

#[tracing::instrument(level = "info", skip_all)]
pub async fn serve(addr: SocketAddr, merger: CalendarMerger) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, merger).await
}

/// Serve on an already bound listener.
pub async fn serve_on(listener: TcpListener, merger: CalendarMerger) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, path = CALENDAR_PATH, "serving merged calendar");
    axum::serve(listener, router(Arc::new(merger))).await?;
    Ok(())
}
