//! JSON HTTP API for the markdown explorer.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/content-groups` | List the acting user's content groups |
//! | `POST`   | `/content-groups` | Create a group with its initial files |
//! | `GET`    | `/documents` | List a group's documents, or fetch one by path |
//! | `PUT`    | `/documents` | Update a document's content |
//! | `DELETE` | `/documents` | Delete a document by id |
//! | `POST`   | `/generate-summary` | Generate or serve a cached summary |
//! | `GET`    | `/generate-summary` | Fetch the stored summary for a document |
//! | `OPTIONS`| `/generate-summary` | List registered summarization models |
//! | `GET`    | `/models` | Models listing alias for browser clients |
//! | `GET`    | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "groupId query parameter is required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `unavailable` (503),
//! `internal` (500). A failed database open maps to `unavailable`; library
//! errors are classified by message at the boundary.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! explorer frontends.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::db;
use crate::models::{ContentGroup, Document, GroupWithDocuments, NewFile, Summary, User};
use crate::provider::{ModelInfo, ProviderRegistry};
use crate::summary::{self, SummaryOutcome, SummaryRequest};
use crate::{documents, groups};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    registry: Arc<ProviderRegistry>,
}

/// Starts the explorer HTTP server.
///
/// Binds to the address configured in `[server].bind` and registers all
/// route handlers. The server runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let registry = Arc::new(ProviderRegistry::with_defaults(&config.summarizer));

    let state = AppState {
        config: Arc::new(config.clone()),
        registry,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route(
            "/content-groups",
            get(handle_list_groups).post(handle_create_group),
        )
        .route(
            "/documents",
            get(handle_get_documents)
                .put(handle_update_document)
                .delete(handle_delete_document),
        )
        // The CORS layer answers browser preflight OPTIONS itself, so the
        // OPTIONS models listing here only serves non-preflight clients;
        // browsers use the GET /models alias instead.
        .route(
            "/generate-summary",
            get(handle_get_summary)
                .post(handle_generate_summary)
                .options(handle_list_models),
        )
        .route("/models", get(handle_list_models))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("mdexplore server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
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

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Constructs a 503 error for a database that cannot be opened.
fn unavailable(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "unavailable".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 error with the message passed through.
fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Maps library errors to the HTTP taxonomy by message pattern, so the
/// storage and cache layers can stay on plain `anyhow` errors.
fn classify_error(err: anyhow::Error) -> AppError {
    let msg = err.to_string();

    if msg.contains("not found") {
        not_found(msg)
    } else if msg.contains("must not be empty") || msg.contains("unsupported model") {
        bad_request(msg)
    } else {
        internal(msg)
    }
}

/// Opens the database for one request; failures are 503, matching the
/// storage-unavailable taxonomy.
async fn open_db(state: &AppState) -> Result<SqlitePool, AppError> {
    db::connect(&state.config)
        .await
        .map_err(|e| unavailable(format!("database unavailable: {}", e)))
}

/// Resolves the acting user from configuration, creating it on first use.
async fn acting_user(state: &AppState, pool: &SqlitePool) -> Result<User, AppError> {
    groups::ensure_user(pool, &state.config.user.email, state.config.user.name.as_deref())
        .await
        .map_err(classify_error)
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

// ============ /content-groups ============

/// Handler for `GET /content-groups`: the acting user's groups, newest first.
async fn handle_list_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentGroup>>, AppError> {
    let pool = open_db(&state).await?;
    let user = acting_user(&state, &pool).await?;

    let result = groups::list_groups(&pool, &user.id).await;
    pool.close().await;

    result.map(Json).map_err(classify_error)
}

/// Wire shape for `POST /content-groups`. Required fields stay `Option`
/// here so an absent field reaches the handler and gets the documented
/// 400 error body instead of the extractor's default rejection.
#[derive(Deserialize)]
struct CreateGroupRequest {
    name: Option<String>,
    #[serde(default)]
    files: Vec<NewFile>,
}

/// Handler for `POST /content-groups`.
///
/// Creates one group row and one document row per file, atomically.
async fn handle_create_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<GroupWithDocuments>, AppError> {
    let name = req
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| bad_request("name is required"))?;

    let pool = open_db(&state).await?;
    let user = acting_user(&state, &pool).await?;

    let result = groups::create_group(&pool, &user.id, &name, &req.files).await;
    pool.close().await;

    result.map(Json).map_err(classify_error)
}

// ============ /documents ============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentsQuery {
    group_id: Option<String>,
    path: Option<String>,
}

/// Handler for `GET /documents`.
///
/// With `path` returns the single matching document; without it, every
/// document in the group.
async fn handle_get_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentsQuery>,
) -> Result<Response, AppError> {
    let group_id = query
        .group_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("groupId query parameter is required"))?;

    let pool = open_db(&state).await?;

    let response = match query.path {
        Some(path) => {
            let result = documents::get_document(&pool, &group_id, &path).await;
            pool.close().await;
            Json(result.map_err(classify_error)?).into_response()
        }
        None => {
            let result = documents::list_documents(&pool, &group_id).await;
            pool.close().await;
            Json(result.map_err(classify_error)?).into_response()
        }
    };

    Ok(response)
}

#[derive(Deserialize)]
struct UpdateDocumentRequest {
    id: Option<String>,
    content: Option<String>,
}

/// Handler for `PUT /documents`: overwrite content, bump the timestamp.
async fn handle_update_document(
    State(state): State<AppState>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<Document>, AppError> {
    let id = req
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("id is required"))?;
    let content = req.content.ok_or_else(|| bad_request("content is required"))?;

    let pool = open_db(&state).await?;
    let result = documents::update_content(&pool, &id, &content).await;
    pool.close().await;

    result.map(Json).map_err(classify_error)
}

#[derive(Deserialize)]
struct DeleteDocumentQuery {
    id: Option<String>,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

/// Handler for `DELETE /documents`: remove one row, 404 when absent.
async fn handle_delete_document(
    State(state): State<AppState>,
    Query(query): Query<DeleteDocumentQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("id query parameter is required"))?;

    let pool = open_db(&state).await?;
    let result = documents::delete_document(&pool, &id).await;
    pool.close().await;

    result
        .map(|_| Json(DeleteResponse { success: true }))
        .map_err(classify_error)
}

// ============ /generate-summary ============

/// Wire shape for `POST /generate-summary`; required fields validated in
/// the handler so their absence yields the documented 400 error body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateSummaryRequest {
    document_id: Option<String>,
    content: Option<String>,
    model: Option<String>,
    #[serde(default)]
    force_refresh: bool,
}

/// Handler for `POST /generate-summary`.
///
/// Serves the cached summary when valid, otherwise calls the provider and
/// persists the result. See [`crate::summary::generate_summary`].
async fn handle_generate_summary(
    State(state): State<AppState>,
    Json(req): Json<GenerateSummaryRequest>,
) -> Result<Json<SummaryOutcome>, AppError> {
    let request = SummaryRequest {
        document_id: req
            .document_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| bad_request("documentId is required"))?,
        content: req
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| bad_request("content is required"))?,
        model: req.model,
        force_refresh: req.force_refresh,
    };

    let pool = open_db(&state).await?;
    let result =
        summary::generate_summary(&pool, &state.registry, &state.config.summarizer, &request)
            .await;
    pool.close().await;

    result.map(Json).map_err(classify_error)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetSummaryQuery {
    document_id: Option<String>,
}

/// Handler for `GET /generate-summary`: the stored summary record.
async fn handle_get_summary(
    State(state): State<AppState>,
    Query(query): Query<GetSummaryQuery>,
) -> Result<Json<Summary>, AppError> {
    let document_id = query
        .document_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("documentId query parameter is required"))?;

    let pool = open_db(&state).await?;
    let result = summary::get_summary(&pool, &document_id).await;
    pool.close().await;

    result.map(Json).map_err(classify_error)
}

#[derive(Serialize)]
struct ModelsResponse {
    models: BTreeMap<String, ModelInfo>,
}

/// Handler for `OPTIONS /generate-summary`: registered models and metadata.
async fn handle_list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.registry.models(),
    })
}
