//! HTTP transport: the populate trigger, optional bearer auth and /health.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use game_catalog::Ingestor;
use serde_json::Value;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{ServerError, ServerResult};
use crate::populate;

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub token: Option<String>,
    pub ingestor: Arc<Ingestor>,
    /// Held by the running task until the run ends; at most one run at a time.
    run_lock: Arc<Mutex<()>>,
}

impl ServerState {
    pub fn new(ingestor: Ingestor, token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            ingestor: Arc::new(ingestor),
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the axum Router. `/health` bypasses authentication.
pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/games/populate", post(handle_populate))
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

pub struct HttpTransport {
    state: Arc<ServerState>,
}

impl HttpTransport {
    pub fn new(state: ServerState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> ServerResult<()> {
        let app = router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("HTTP endpoint listening on http://{addr}");

        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn auth_layer(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    if let Some(expected) = &state.token {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            return ServerError::Unauthorized.into_response();
        }
    }

    next.run(request).await
}

/// Run one populate pass with the query string merged over the defaults.
///
/// The run lives in its own task, so it finishes even if the caller
/// disconnects before the reply is written.
async fn handle_populate(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ServerResult<Json<Value>> {
    let running = state
        .run_lock
        .clone()
        .try_lock_owned()
        .map_err(|_| ServerError::Busy)?;

    let query = populate::listing_query(params);
    let ingestor = state.ingestor.clone();
    let task = tokio::spawn(async move {
        let _running = running;
        populate::run(&ingestor, &query).await
    });
    let report = task.await??;

    Ok(Json(serde_json::json!({
        "ok": true,
        "report": report,
    })))
}

async fn handle_health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
