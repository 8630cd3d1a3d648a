//! HTTP API server for integration with other systems.
//!
//! Exposes stored videos, summary ingestion, chat logging and summary search
//! as JSON endpoints.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::YtsumError;
use crate::library::{Library, SearchHit};
use crate::store::{ChatMessage, Video};
use crate::summary::{PersistOutcome, StoredSummary, VideoSummary};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
pub struct AppState {
    pub library: Library,
}

/// Build the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/videos", get(list_videos))
        .route("/summaries", post(store_summary))
        .route("/videos/{video_id}/summary", get(get_summary))
        .route("/videos/{video_id}/chat", post(add_chat_message))
        .route("/videos/{video_id}/chat/{session_id}", get(get_chat_history))
        .route("/search", post(search))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let public_url = settings.server.public_url.clone();

    let library = Library::new(settings)?;
    let provider = library.embedding_provider();
    let app = router(Arc::new(AppState { library }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("ytsum API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Public URL", &public_url);
    Output::kv("Embeddings", &provider.to_string());
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("List videos", "GET  /videos");
    Output::kv("Store summary", "POST /summaries");
    Output::kv("Get summary", "GET  /videos/{video_id}/summary");
    Output::kv("Log chat", "POST /videos/{video_id}/chat");
    Output::kv("Chat history", "GET  /videos/{video_id}/chat/{session_id}");
    Output::kv("Search", "POST /search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct VideoListResponse {
    videos: Vec<Video>,
    total: usize,
}

#[derive(Deserialize)]
struct ChatRequest {
    /// Generated when absent
    #[serde(default)]
    session_id: Option<String>,
    message: String,
    response: String,
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct ChatHistoryResponse {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// A library error rendered as a JSON response.
struct ApiError(YtsumError);

impl From<YtsumError> for ApiError {
    fn from(err: YtsumError) -> Self {
        Self(err)
    }
}

fn status_for(err: &YtsumError) -> StatusCode {
    match err {
        YtsumError::VideoNotFound(_) => StatusCode::NOT_FOUND,
        YtsumError::DuplicateKey { .. } => StatusCode::CONFLICT,
        YtsumError::ForeignKeyViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        YtsumError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        YtsumError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_videos(State(state): State<Arc<AppState>>) -> ApiResult<Json<VideoListResponse>> {
    let videos = state.library.list_videos().await?;
    Ok(Json(VideoListResponse {
        total: videos.len(),
        videos,
    }))
}

async fn store_summary(
    State(state): State<Arc<AppState>>,
    Json(bundle): Json<VideoSummary>,
) -> ApiResult<(StatusCode, Json<PersistOutcome>)> {
    let outcome = state.library.store_summary(&bundle).await?;
    let status = if outcome.is_noop() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<StoredSummary>> {
    state
        .library
        .get_stored_summary(&video_id)
        .await?
        .map(Json)
        .ok_or_else(|| YtsumError::VideoNotFound(video_id).into())
}

async fn add_chat_message(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let session_id = req
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let turn = state
        .library
        .add_chat_message(&video_id, &session_id, &req.message, &req.response)
        .await?;
    Ok((StatusCode::CREATED, Json(turn)))
}

async fn get_chat_history(
    State(state): State<Arc<AppState>>,
    Path((video_id, session_id)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    if !state.library.store().video_exists(&video_id).await? {
        return Err(YtsumError::VideoNotFound(video_id).into());
    }
    let messages = state
        .library
        .get_chat_history(&video_id, &session_id, query.limit)
        .await?;
    Ok(Json(ChatHistoryResponse { messages }))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let results = state.library.search(&req.query, req.limit).await?;
    Ok(Json(SearchResponse { results }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::FallbackEmbedder;
    use crate::library::tests::{bundle, library_with, KeywordEmbedder};

    fn state_with_keywords() -> Arc<AppState> {
        Arc::new(AppState {
            library: library_with(Arc::new(KeywordEmbedder)),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&YtsumError::VideoNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&YtsumError::DuplicateKey {
                entity: "video",
                key: "x".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&YtsumError::ForeignKeyViolation {
                entity: "chat message",
                video_id: "x".into()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&YtsumError::StorageUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&YtsumError::Embedding("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_store_then_fetch_summary() {
        let state = state_with_keywords();

        let (status, Json(outcome)) =
            store_summary(State(state.clone()), Json(bundle("abc123", "T", "short summary")))
                .await
                .map_err(|e| e.0)
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(outcome.summary_created);

        let (status, Json(outcome)) =
            store_summary(State(state.clone()), Json(bundle("abc123", "T", "other")))
                .await
                .map_err(|e| e.0)
                .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(outcome.is_noop());

        let response = get_summary(State(state.clone()), Path("abc123".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"], "short summary");
        assert_eq!(body["audio_path"], serde_json::Value::Null);
        assert_eq!(body["chat_history"], serde_json::json!([]));

        let response = get_summary(State(state), Path("missing".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("missing"));
    }

    #[tokio::test]
    async fn test_chat_endpoints() {
        let state = state_with_keywords();
        state
            .library
            .store_summary(&bundle("abc123", "T", "s"))
            .await
            .unwrap();

        for message in ["first", "second"] {
            let response = add_chat_message(
                State(state.clone()),
                Path("abc123".to_string()),
                Json(ChatRequest {
                    session_id: Some("s1".to_string()),
                    message: message.to_string(),
                    response: "ok".to_string(),
                }),
            )
            .await
            .into_response();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = get_chat_history(
            State(state.clone()),
            Path(("abc123".to_string(), "s1".to_string())),
            Query(HistoryQuery { limit: Some(1) }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["message"], "second");

        let response = add_chat_message(
            State(state.clone()),
            Path("nope".to_string()),
            Json(ChatRequest {
                session_id: None,
                message: "q".to_string(),
                response: "a".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = get_chat_history(
            State(state),
            Path(("nope".to_string(), "s1".to_string())),
            Query(HistoryQuery { limit: None }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_and_list() {
        let state = state_with_keywords();
        state
            .library
            .store_summary(&bundle("v1", "Rust talk", "rust rust"))
            .await
            .unwrap();
        state
            .library
            .store_summary(&bundle("v2", "Kitchen", "cooking"))
            .await
            .unwrap();

        let Json(listing) = list_videos(State(state.clone()))
            .await
            .map_err(|e| e.0)
            .unwrap();
        assert_eq!(listing.total, 2);

        let Json(found) = search(
            State(state.clone()),
            Json(SearchRequest {
                query: "rust".to_string(),
                limit: None,
            }),
        )
        .await
        .map_err(|e| e.0)
        .unwrap();
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.results[0].video_id, "v1");

        let response = search(
            State(state),
            Json(SearchRequest {
                query: " ".to_string(),
                limit: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_router_builds() {
        let state = Arc::new(AppState {
            library: library_with(Arc::new(FallbackEmbedder::default())),
        });
        let _ = router(state);
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
