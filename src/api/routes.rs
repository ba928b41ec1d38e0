use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{markets_api, preferences_api, signals_api};
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitLayer};
use crate::store::SignalRepository;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<SignalRepository>,
}

impl AppState {
    pub fn new(repo: Arc<SignalRepository>) -> Self {
        Self { repo }
    }
}

/// Create the API router. Rate limiting is optional so tests and local
/// tooling can drive the router without a limiter.
pub fn create_router(state: AppState, limiter: Option<RateLimitLayer>) -> Router {
    let mut api = Router::new()
        .route("/api/init", post(markets_api::init_board))
        .route("/api/signals", get(signals_api::list_signals))
        .route("/api/signals/:id", get(signals_api::get_signal))
        .route("/api/stats", get(signals_api::get_stats))
        .route("/api/feed/:user_id", get(signals_api::get_feed))
        .route("/api/markets", get(markets_api::list_markets))
        .route("/api/markets/:event_id", get(markets_api::get_market))
        .route(
            "/api/preferences/:user_id",
            get(preferences_api::get_preferences).put(preferences_api::put_preferences),
        )
        .with_state(state.clone());

    if let Some(limiter) = limiter {
        api = api.route_layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .merge(api)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ===== Route Handlers =====

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let board = state.repo.snapshot()?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        signals: board.signals.len(),
        markets: board.markets.len(),
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    signals: usize,
    markets: usize,
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
}

impl ApiError {
    pub fn bad_request(err: impl std::fmt::Display) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

// Extractor rejections become JSON errors like every other failure

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Internal(err) => {
                tracing::error!("Store error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err = anyhow::anyhow!("Test error");
        let api_err: ApiError = err.into();

        match api_err {
            ApiError::Internal(_) => (),
            _ => panic!("Expected Internal error"),
        }
    }

    #[test]
    fn test_error_status_codes() {
        let resp = ApiError::NotFound("gone".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::bad_request("bad").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Internal(anyhow::anyhow!("disk")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
