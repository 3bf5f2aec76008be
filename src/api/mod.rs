//! # Scan API
//!
//! HTTP wrapper around the scanner core.
//!
//! ## Endpoints
//! - `POST /api/scan/{detector}?limit=&offset=` - multipart upload (field
//!   `file`), returns a [`ScanPage`]
//! - `GET /api/detectors` - detector slugs and descriptions
//! - `GET /health` - liveness check
//!
//! Every request parses its own upload; nothing is shared between requests
//! except the read-only configuration.
//!
//! Copyright (c) 2026 logscan contributors. Licensed under the MIT License.

pub mod page;

pub use page::{Columns, PageParams, ScanPage};

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::QueryRejection,
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::detection::Detector;
use crate::log_sources::RecordSet;
use crate::{ScanError, ScanResult, ScannerConfig, ServerConfig};

/// Multipart field carrying the log file.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
struct AppState {
    config: Arc<ScannerConfig>,
}

/// Build the application router.
pub fn build_router(config: ScannerConfig) -> Router {
    let body_limit = config.server.max_upload_bytes;
    let cors = cors_layer(&config.server);
    let state = AppState {
        config: Arc::new(config),
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/detectors", get(detectors_handler))
        .route("/api/scan/{detector}", post(scan_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(server: &ServerConfig) -> Option<CorsLayer> {
    if !server.enable_cors {
        return None;
    }
    if server.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }
    let origins = server
        .cors_origins
        .iter()
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
    )
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ScannerConfig) -> ScanResult<()> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Could not install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received. Stopping gracefully...");
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn detectors_handler() -> Json<serde_json::Value> {
    let detectors: Vec<_> = Detector::ALL
        .iter()
        .map(|d| {
            json!({
                "name": d.slug(),
                "description": d.description(),
                "columns": d.columns(),
            })
        })
        .collect();
    Json(json!({ "detectors": detectors }))
}

async fn scan_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    query: Result<Query<PageParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ScanResult<Json<ScanPage>> {
    let detector: Detector = slug.parse()?;
    let Query(params) = query.map_err(|e| ScanError::InvalidRequest(e.body_text()))?;
    let (limit, offset) = params.resolve(&state.config.scan)?;
    let multipart = multipart.map_err(|e| ScanError::Upload(e.body_text()))?;
    let upload = read_upload(multipart, state.config.server.max_upload_bytes).await?;
    log::info!(
        "Scanning {} byte upload with {} (limit={}, offset={})",
        upload.len(),
        detector,
        limit,
        offset,
    );

    let page = tokio::task::spawn_blocking(move || {
        let records = RecordSet::parse(&upload);
        let result = detector.detect(&records);
        ScanPage::build(&result, limit, offset)
    })
    .await
    .map_err(|e| ScanError::Worker(e.to_string()))?;

    Ok(Json(page))
}

/// Pull the `file` field out of a multipart form.
async fn read_upload(mut multipart: Multipart, limit: usize) -> ScanResult<Vec<u8>> {
    let upload_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ScanError::UploadTooLarge(limit)
        } else {
            ScanError::Upload(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() == Some(UPLOAD_FIELD) {
            let data = field.bytes().await.map_err(upload_error)?;
            return Ok(data.to_vec());
        }
    }
    Err(ScanError::InvalidRequest(format!(
        "missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

impl ScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::UnknownDetector(_) => StatusCode::NOT_FOUND,
            ScanError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScanError::Upload(_) => StatusCode::BAD_REQUEST,
            ScanError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log::warn!("Request failed ({}): {}", status, self);
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
