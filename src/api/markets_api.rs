//! Market endpoints and board initialization

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::routes::{ApiError, AppState};
use super::signals_api::{finite_param, parse_param};
use crate::models::{InitSummary, MarketState, Sport};

pub const DEFAULT_INIT_MARKETS: usize = 40;
pub const MAX_INIT_MARKETS: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub struct InitQuery {
    pub markets: Option<usize>,
    pub seed: Option<u64>,
    pub threshold: Option<f64>,
}

/// POST /api/init
/// Regenerate markets and signals, replacing the stored board
pub async fn init_board(
    State(state): State<AppState>,
    params: Result<Query<InitQuery>, QueryRejection>,
) -> Result<Json<InitSummary>, ApiError> {
    let Query(params) = params?;
    let markets = params.markets.unwrap_or(DEFAULT_INIT_MARKETS);
    if markets == 0 || markets > MAX_INIT_MARKETS {
        return Err(ApiError::BadRequest(format!(
            "markets must be within 1..={}, got {}",
            MAX_INIT_MARKETS, markets
        )));
    }
    if let Some(threshold) = finite_param("threshold", params.threshold)? {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ApiError::BadRequest(format!(
                "threshold must be within 0..=100, got {}",
                threshold
            )));
        }
    }

    let summary = state.repo.init(markets, params.seed, params.threshold)?;
    Ok(Json(summary))
}

#[derive(Debug, Default, Deserialize)]
pub struct MarketsQuery {
    pub sport: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketsResponse {
    pub markets: Vec<MarketState>,
    pub count: usize,
    pub timestamp: String,
}

/// GET /api/markets
/// Soonest start first
pub async fn list_markets(
    State(state): State<AppState>,
    params: Result<Query<MarketsQuery>, QueryRejection>,
) -> Result<Json<MarketsResponse>, ApiError> {
    let Query(params) = params?;
    let sport: Option<Sport> = parse_param(params.sport.as_deref())?;

    let mut markets = state.repo.markets()?;
    if let Some(sport) = sport {
        markets.retain(|m| m.sport == sport);
    }
    markets.sort_by(|a, b| {
        a.starts_at
            .cmp(&b.starts_at)
            .then_with(|| a.event_id.cmp(&b.event_id))
    });

    Ok(Json(MarketsResponse {
        count: markets.len(),
        markets,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/markets/:event_id
pub async fn get_market(
    State(state): State<AppState>,
    event_id: Result<Path<String>, PathRejection>,
) -> Result<Json<MarketState>, ApiError> {
    let Path(event_id) = event_id?;
    state
        .repo
        .market(&event_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Market {} not found", event_id)))
}
