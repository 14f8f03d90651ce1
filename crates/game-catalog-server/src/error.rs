//! Error types for the HTTP endpoint and CLI.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use game_catalog::CatalogError;

/// All errors the server surfaces to callers.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Storefront error: {0}")]
    Storefront(#[from] CatalogError),

    #[error("A populate run is already in progress")]
    Busy,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Populate task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Storefront(_) => StatusCode::BAD_GATEWAY,
            ServerError::Busy => StatusCode::CONFLICT,
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::Io(_) | ServerError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "ok": false,
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
