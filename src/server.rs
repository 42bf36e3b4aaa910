//! HTTP front door: `GET /api/download`.
//!
//! `?links=a,b` runs a batch and answers with the [`BatchReport`];
//! `?link=a` runs one album and answers with its tracks. Requests are
//! processed one at a time because every album drives its own browser.

use crate::pipeline::{parse_links, BatchReport, Pipeline};
use crate::session::BrowserLauncher;
use crate::RipError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared state for the download handler.
pub struct AppState<L> {
    pipeline: Pipeline<L>,
    busy: Mutex<()>,
}

impl<L: BrowserLauncher> AppState<L> {
    pub fn new(pipeline: Pipeline<L>) -> Self {
        Self {
            pipeline,
            busy: Mutex::new(()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    pub links: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SingleAlbumResponse {
    pub link: String,
    pub album: String,
    pub tracks: Vec<String>,
    pub count: usize,
}

/// An error body of the form `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<RipError> for ApiError {
    fn from(error: RipError) -> Self {
        let status = match error {
            RipError::Input(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Build the router serving `/api/download`.
pub fn router<L: BrowserLauncher + 'static>(state: Arc<AppState<L>>) -> Router {
    Router::new()
        .route("/api/download", get(download::<L>))
        .with_state(state)
}

async fn download<L: BrowserLauncher + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    if let Some(links) = query.links.as_deref() {
        let links = parse_links(links)?;
        let _guard = state.busy.lock().await;
        log::info!("Batch request for {} links", links.len());
        let report: BatchReport = state.pipeline.run(&links).await;
        return Ok(Json(report).into_response());
    }

    match query.link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => {
            let _guard = state.busy.lock().await;
            log::info!("Single album request for {link}");
            let album = state.pipeline.run_single(link).await?;
            let count = album.tracks.len();
            Ok(Json(SingleAlbumResponse {
                link: album.link,
                album: album.album,
                tracks: album.tracks,
                count,
            })
            .into_response())
        }
        _ => Err(ApiError::bad_request("provide `links` query param")),
    }
}

/// Serve the router on `bind` until the process is stopped.
pub async fn serve<L: BrowserLauncher + 'static>(
    pipeline: Pipeline<L>,
    bind: &str,
) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(Arc::new(AppState::new(pipeline)))).await?;
    Ok(())
}
