//! HTTP query endpoint.
//!
//! A thin transport shell over the answer pipeline: handlers decode the
//! request, call [`query::answer`], and map tagged pipeline failures to
//! status codes. No pipeline logic lives here.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/v1/query` | Answer a question from the ingested corpus |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Error responses carry a machine-readable code and the failure message:
//!
//! ```json
//! { "error": { "code": "retrieval_error", "message": "..." } }
//! ```
//!
//! Codes: `bad_request` (400), `retrieval_error` (500),
//! `generation_error` (502).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::embedding::{self, Embedder};
use crate::llm::{self, Generator};
use crate::models::QueryResponse;
use crate::query::{self, QueryError};
use crate::store::sqlite::SqliteStore;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<SqliteStore>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
}

/// Start the query server on the configured bind address.
///
/// The store is opened and the providers constructed once per process;
/// each request is handled as an independent task with no coordination
/// between in-flight questions.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = SqliteStore::open(&config.store).await?;
    let embedder = embedding::create_embedder(&config.embedding)?;
    let generator = llm::create_generator(&config.llm)?;

    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(store),
        embedder: Arc::from(embedder),
        generator: Arc::from(generator),
    };

    let cors = if config.server.allow_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origin = config
            .server
            .allow_origin
            .parse::<axum::http::HeaderValue>()?;
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .route("/api/v1/query", post(handle_query))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("query server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Map a tagged pipeline failure to a status code, logging the original
/// message once at the boundary.
fn classify_query_error(err: QueryError) -> AppError {
    tracing::error!("query failed: {}", err);
    match err {
        QueryError::Retrieval(_) => AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "retrieval_error".to_string(),
            message: err.to_string(),
        },
        QueryError::Generation(_) => AppError {
            status: StatusCode::BAD_GATEWAY,
            code: "generation_error".to_string(),
            message: err.to_string(),
        },
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/v1/query ============

#[derive(Deserialize)]
struct QueryRequest {
    query_text: String,
}

async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    if request.query_text.trim().is_empty() {
        return Err(bad_request("query_text must not be empty"));
    }

    let result = query::answer(
        state.store.as_ref(),
        state.embedder.as_ref(),
        state.generator.as_ref(),
        &request.query_text,
        state.config.retrieval.top_k,
    )
    .await
    .map_err(classify_query_error)?;

    Ok(Json(result))
}
