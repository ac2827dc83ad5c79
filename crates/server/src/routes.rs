use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tileworld_common::{WorldGrid, WorldRequest};
use tileworld_worldgen::generate_world;
use tower_http::cors::CorsLayer;

use crate::server::ServerConfig;

pub(crate) const INDEX_BANNER: &str =
    "tileworld generation service is running. Request /generate_world?seed=<int>&size=<int> for world data.";

const DEFAULT_SEED: i64 = 0;
const DEFAULT_SIZE: i64 = 64;

/// Shared by every handler.
#[derive(Clone)]
pub(crate) struct AppState {
    config: Arc<ServerConfig>,
    served: Arc<AtomicUsize>,
}

impl AppState {
    pub(crate) fn new(config: ServerConfig, served: Arc<AtomicUsize>) -> Self {
        Self {
            config: Arc::new(config),
            served,
        }
    }
}

/// JSON error body `{"error": "..."}` with a status.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
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

/// Query string of `/generate_world`. Both parameters are optional.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorldParams {
    seed: Option<i64>,
    size: Option<i64>,
}

impl WorldParams {
    pub(crate) fn into_request(self, max_size: u32) -> Result<WorldRequest, ApiError> {
        let seed = self.seed.unwrap_or(DEFAULT_SEED);
        let size = self.size.unwrap_or(DEFAULT_SIZE);
        if size < 1 || size > i64::from(max_size) {
            return Err(ApiError::bad_request(format!(
                "size must be between 1 and {max_size}, got {size}"
            )));
        }
        Ok(WorldRequest::new(seed, size as u32))
    }
}

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate_world", get(generate))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), count_responses))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn count_responses(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    state.served.fetch_add(1, Ordering::SeqCst);
    tracing::debug!(%method, %uri, status = %response.status(), "request");
    response
}

async fn index() -> &'static str {
    INDEX_BANNER
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, format!("no route for {}", uri.path()))
}

async fn generate(
    State(state): State<AppState>,
    params: Result<Query<WorldParams>, QueryRejection>,
) -> Result<Json<WorldGrid>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let request = params.into_request(state.config.max_size)?;
    let noise = state.config.noise;

    let grid = tokio::task::spawn_blocking(move || generate_world(&request, &noise))
        .await
        .map_err(|e| {
            tracing::error!("world generation task failed: {e}");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "world generation failed")
        })?
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    tracing::info!(seed = request.seed, size = grid.size(), "world generated");
    Ok(Json(grid))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(uri: &str) -> Result<WorldParams, QueryRejection> {
        let uri: Uri = uri.parse().unwrap();
        Query::<WorldParams>::try_from_uri(&uri).map(|Query(p)| p)
    }

    fn state() -> AppState {
        AppState::new(ServerConfig::default(), Arc::new(AtomicUsize::new(0)))
    }

    #[test]
    fn defaults_apply_when_params_missing() {
        let request = params("/generate_world").unwrap().into_request(512).unwrap();
        assert_eq!(request, WorldRequest::new(0, 64));
    }

    #[test]
    fn explicit_params() {
        let request = params("/generate_world?seed=-9&size=12")
            .unwrap()
            .into_request(512)
            .unwrap();
        assert_eq!(request, WorldRequest::new(-9, 12));
    }

    #[test]
    fn percent_encoded_params_are_decoded() {
        let request = params("/generate_world?seed=%2D5&size=%38")
            .unwrap()
            .into_request(512)
            .unwrap();
        assert_eq!(request, WorldRequest::new(-5, 8));
    }

    #[test]
    fn non_integer_params_are_rejected() {
        for uri in [
            "/generate_world?seed=abc&size=8",
            "/generate_world?seed=1&size=",
            "/generate_world?seed=1.5",
        ] {
            assert!(params(uri).is_err(), "uri {uri}");
        }
    }

    #[test]
    fn out_of_range_sizes_are_400() {
        for size in ["0", "-3", "100000"] {
            let err = params(&format!("/generate_world?seed=1&size={size}"))
                .unwrap()
                .into_request(512)
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "size {size}");
        }
    }

    #[test]
    fn error_body_is_json() {
        let response = ApiError::bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[tokio::test]
    async fn generate_world_body_is_valid_grid() {
        let params = WorldParams {
            seed: Some(123),
            size: Some(16),
        };
        let Json(grid) = generate(State(state()), Ok(Query(params))).await.unwrap();
        assert_eq!(grid.size(), 16);
    }

    #[tokio::test]
    async fn generate_rejects_size_above_limit() {
        let state = AppState::new(
            ServerConfig {
                max_size: 8,
                ..ServerConfig::default()
            },
            Arc::new(AtomicUsize::new(0)),
        );
        let params = WorldParams {
            seed: None,
            size: Some(9),
        };
        let err = generate(State(state), Ok(Query(params))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn index_banner() {
        assert_eq!(index().await, INDEX_BANNER);
    }
}
