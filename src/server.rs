//! HTTP parse server.
//!
//! One JSON endpoint, `POST /api/parse`, takes a multipart upload with field
//! `file` and answers with a [`ParseResponse`]. Every other path is served
//! from the static directory, so the upload page and this API share an
//! origin. CORS is permissive.

use crate::config::{ServerConfig, PARSE_ROUTE};
use crate::error::ReportError;
use crate::parse::{is_docx_name, parse_upload};
use crate::report::{ErrorResponse, ParseResponse};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// Request failures, each answered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("未選擇檔案")]
    NoFile,

    #[error("請上傳 .docx 檔案")]
    NotDocx,

    #[error("解析錯誤: {0}")]
    Parse(ReportError),

    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NoFile | ApiError::NotDocx => StatusCode::BAD_REQUEST,
            ApiError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(e) => e.status(),
        };
        let error = match &self {
            ApiError::Multipart(e) => e.body_text(),
            other => other.to_string(),
        };
        warn!("{} {}: {}", PARSE_ROUTE, status.as_u16(), error);

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    Router::new()
        .route(PARSE_ROUTE, post(parse_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
}

/// Bind `config.addr` and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.addr).await?;
    serve_on(listener, config).await
}

/// Serve on an already-bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, config: &ServerConfig) -> std::io::Result<()> {
    info!(
        "Serving {} and static files from {} on http://{}",
        PARSE_ROUTE,
        config.static_dir.display(),
        listener.local_addr()?
    );
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

async fn parse_handler(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ParseResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::NoFile)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((name, bytes));
            break;
        }
    }

    let Some((name, bytes)) = upload else {
        return Err(ApiError::NoFile);
    };
    if name.is_empty() {
        return Err(ApiError::NoFile);
    }
    if !is_docx_name(&name) {
        return Err(ApiError::NotDocx);
    }

    let response = parse_upload(&name, bytes.to_vec())
        .await
        .map_err(ApiError::Parse)?;
    Ok(Json(response))
}
