// ==========================================
// Tecnova POS - HTTP transport (axum)
// ==========================================
// Routes:
//   GET  /health
//   POST /inventory/import?mode=insert|upsert&dryRun=true|false
// Caller identity comes from the upstream auth layer via the
// `x-user-id` header.
// ==========================================

use crate::api::{ApiError, ImportRequest};
use crate::app::state::AppState;
use crate::domain::import::ImportSummary;
use crate::importer::ImportError;
use crate::APP_NAME;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Header carrying the authenticated caller id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Room for multipart boundaries and part headers above the file cap.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health))
        .route("/inventory/import", post(import_inventory))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");
    axum::serve(listener, router(state)).await
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": APP_NAME,
        "ts": Utc::now().timestamp_millis(),
    }))
}

/// POST /inventory/import
async fn import_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(request): Query<ImportRequest>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    let summary = run_import(&state, &headers, request, multipart).await?;
    Ok(Json(summary))
}

fn caller_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

async fn run_import(
    state: &AppState,
    headers: &HeaderMap,
    mut request: ImportRequest,
    mut multipart: Multipart,
) -> Result<ImportSummary, ApiError> {
    let user = caller_id(headers).ok_or(ApiError::Unauthenticated)?;
    if !state.rate_limiter.check(&user) {
        warn!(user = %user, "import rejected by rate limiter");
        return Err(ApiError::RateLimited);
    }
    request.requested_by = Some(user);

    // first file part only; any later parts are never read
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::from(ImportError::Upload(e.to_string())))?;

        match field {
            None => return Err(ImportError::MissingFile.into()),
            Some(field) if field.file_name().is_some() || field.name() == Some("file") => {
                return state
                    .import_api
                    .import_inventory(Box::pin(field), request)
                    .await;
            }
            Some(_) => continue,
        }
    }
}
