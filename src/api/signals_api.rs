//! Signal endpoints: list with filter/sort, lookup, stats and per-user feed

use std::collections::BTreeMap;
use std::str::FromStr;

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
use crate::models::{ConfidenceLevel, InitSummary, Signal, UserPreferences};
use crate::signals::query::{self, SignalFilter, SortKey, SortOrder};
use crate::store::repository::validate_user_id;

/// Query parameters for listing signals
#[derive(Debug, Default, Deserialize)]
pub struct SignalsQuery {
    pub sport: Option<String>,
    pub market_type: Option<String>,
    pub confidence: Option<String>,
    pub min_score: Option<f64>,
    pub min_edge: Option<f64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<usize>,
}

impl SignalsQuery {
    fn filter(&self) -> Result<SignalFilter, ApiError> {
        Ok(SignalFilter {
            sport: parse_param(self.sport.as_deref())?,
            market_type: parse_param(self.market_type.as_deref())?,
            confidence: parse_param(self.confidence.as_deref())?,
            min_score: finite_param("min_score", self.min_score)?,
            min_edge: finite_param("min_edge", self.min_edge)?,
            ..Default::default()
        })
    }

    fn sort(&self) -> Result<(SortKey, SortOrder), ApiError> {
        Ok((
            parse_param(self.sort.as_deref())?.unwrap_or_default(),
            parse_param(self.order.as_deref())?.unwrap_or_default(),
        ))
    }
}

pub(crate) fn parse_param<T>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = anyhow::Error>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some).map_err(ApiError::bad_request),
        None => Ok(None),
    }
}

/// NaN compares false against everything and would switch a filter off
pub(crate) fn finite_param(name: &str, value: Option<f64>) -> Result<Option<f64>, ApiError> {
    match value {
        Some(v) if !v.is_finite() => Err(ApiError::BadRequest(format!(
            "{} must be a finite number, got {}",
            name, v
        ))),
        _ => Ok(value),
    }
}

#[derive(Debug, Serialize)]
pub struct SignalsResponse {
    pub signals: Vec<Signal>,
    pub count: usize,
    /// Signals on the board before filtering
    pub total: usize,
    pub timestamp: String,
}

/// GET /api/signals
pub async fn list_signals(
    State(state): State<AppState>,
    params: Result<Query<SignalsQuery>, QueryRejection>,
) -> Result<Json<SignalsResponse>, ApiError> {
    let Query(params) = params?;
    let filter = params.filter()?;
    let (sort, order) = params.sort()?;
    let limit = query::clamp_limit(params.limit);

    let signals = state.repo.signals()?;
    let total = signals.len();
    let signals = query::apply(signals, &filter, sort, order, limit);

    Ok(Json(SignalsResponse {
        count: signals.len(),
        signals,
        total,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/signals/:id
pub async fn get_signal(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Signal>, ApiError> {
    let Path(id) = id?;
    state
        .repo
        .signal(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Signal {} not found", id)))
}

#[derive(Debug, Serialize)]
pub struct SignalStats {
    pub total_signals: usize,
    pub total_markets: usize,
    pub by_sport: BTreeMap<String, usize>,
    pub by_confidence: BTreeMap<String, usize>,
    pub avg_score: f64,
    pub avg_edge_pct: f64,
    pub high_confidence_count: usize,
    pub top_signal: Option<Signal>,
    pub last_init: Option<InitSummary>,
}

/// Aggregate a board; market count and init summary are filled by the caller
pub fn compute_stats(signals: &[Signal]) -> SignalStats {
    let mut by_sport = BTreeMap::new();
    let mut by_confidence = BTreeMap::new();
    let mut score_sum = 0.0;
    let mut edge_sum = 0.0;

    for signal in signals {
        *by_sport.entry(signal.sport.to_string()).or_insert(0) += 1;
        *by_confidence
            .entry(signal.confidence.to_string())
            .or_insert(0) += 1;
        score_sum += signal.score;
        edge_sum += signal.edge_pct;
    }

    let n = signals.len();
    let avg = |sum: f64| {
        if n > 0 {
            (sum / n as f64 * 100.0).round() / 100.0
        } else {
            0.0
        }
    };

    let top_signal = signals
        .iter()
        .max_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .cloned();

    SignalStats {
        total_signals: n,
        total_markets: 0,
        by_sport,
        high_confidence_count: by_confidence
            .get(ConfidenceLevel::High.as_str())
            .copied()
            .unwrap_or(0),
        by_confidence,
        avg_score: avg(score_sum),
        avg_edge_pct: avg(edge_sum),
        top_signal,
        last_init: None,
    }
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<SignalStats>, ApiError> {
    let board = state.repo.snapshot()?;
    let mut stats = compute_stats(&board.signals);
    stats.total_markets = board.markets.len();
    stats.last_init = board.last_init;
    Ok(Json(stats))
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub user_id: String,
    pub preferences: UserPreferences,
    pub signals: Vec<Signal>,
    pub count: usize,
}

/// GET /api/feed/:user_id
/// Signals filtered by the user's saved preferences, best first
pub async fn get_feed(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    params: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<FeedResponse>, ApiError> {
    let Path(user_id) = user_id?;
    let Query(params) = params?;
    validate_user_id(&user_id).map_err(ApiError::bad_request)?;

    let preferences = state.repo.preferences(&user_id)?;
    let filter = SignalFilter::from_preferences(&preferences);
    let signals = query::apply(
        state.repo.signals()?,
        &filter,
        SortKey::Score,
        SortOrder::Desc,
        query::clamp_limit(params.limit),
    );

    Ok(Json(FeedResponse {
        user_id,
        preferences,
        count: signals.len(),
        signals,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketType, Sport};

    fn signal(id: &str, sport: Sport, score: f64, edge: f64) -> Signal {
        Signal {
            id: id.to_string(),
            event_id: format!("evt-{}", id),
            sport,
            market_type: MarketType::Spread,
            matchup: "A @ B".into(),
            selection: "B -3.5".into(),
            score,
            edge_pct: edge,
            confidence: crate::signals::confidence_for_score(score),
            best_odds: 100,
            best_book: "FanDuel".into(),
            consensus_odds: -110,
            reasoning: String::new(),
            key_factors: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_compute_stats() {
        let signals = vec![
            signal("a", Sport::Nba, 80.0, 4.0),
            signal("b", Sport::Nba, 60.0, 2.0),
            signal("c", Sport::Nfl, 40.0, 0.0),
        ];
        let stats = compute_stats(&signals);
        assert_eq!(stats.total_signals, 3);
        assert_eq!(stats.by_sport.get("nba"), Some(&2));
        assert_eq!(stats.by_sport.get("nfl"), Some(&1));
        assert_eq!(stats.by_confidence.get("high"), Some(&1));
        assert_eq!(stats.by_confidence.get("medium"), Some(&1));
        assert_eq!(stats.by_confidence.get("low"), Some(&1));
        assert_eq!(stats.high_confidence_count, 1);
        assert_eq!(stats.avg_score, 60.0);
        assert_eq!(stats.avg_edge_pct, 2.0);
        assert_eq!(stats.top_signal.unwrap().id, "a");
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_signals, 0);
        assert_eq!(stats.avg_score, 0.0);
        assert!(stats.top_signal.is_none());
    }

    #[test]
    fn test_bad_query_values_are_rejected() {
        let params = SignalsQuery {
            sport: Some("curling".into()),
            ..Default::default()
        };
        assert!(matches!(params.filter(), Err(ApiError::BadRequest(_))));

        let params = SignalsQuery {
            sort: Some("alphabetical".into()),
            ..Default::default()
        };
        assert!(matches!(params.sort(), Err(ApiError::BadRequest(_))));

        let params = SignalsQuery {
            sport: Some("".into()),
            ..Default::default()
        };
        assert!(params.filter().unwrap().sport.is_none());
    }

    #[test]
    fn test_non_finite_thresholds_are_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let params = SignalsQuery {
                min_score: Some(value),
                ..Default::default()
            };
            assert!(matches!(params.filter(), Err(ApiError::BadRequest(_))));

            let params = SignalsQuery {
                min_edge: Some(value),
                ..Default::default()
            };
            assert!(matches!(params.filter(), Err(ApiError::BadRequest(_))));
        }

        let params = SignalsQuery {
            min_score: Some(55.5),
            ..Default::default()
        };
        assert_eq!(params.filter().unwrap().min_score, Some(55.5));
    }
}
