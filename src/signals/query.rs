//! In-memory filtering and sorting for the signals endpoints

use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::{ConfidenceLevel, MarketType, Signal, Sport, UserPreferences};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct SignalFilter {
    pub sport: Option<Sport>,
    pub sports: Vec<Sport>,
    pub market_type: Option<MarketType>,
    /// Exact bucket match
    pub confidence: Option<ConfidenceLevel>,
    /// Bucket floor, used by preference feeds
    pub min_confidence: Option<ConfidenceLevel>,
    pub min_score: Option<f64>,
    pub min_edge: Option<f64>,
}

impl SignalFilter {
    /// Filter equivalent to a user's saved preferences
    pub fn from_preferences(prefs: &UserPreferences) -> Self {
        Self {
            sports: prefs.favorite_sports.clone(),
            min_confidence: Some(prefs.min_confidence),
            min_score: (prefs.min_score > 0.0).then_some(prefs.min_score),
            ..Default::default()
        }
    }

    pub fn matches(&self, signal: &Signal) -> bool {
        if self.sport.is_some_and(|s| s != signal.sport) {
            return false;
        }
        if !self.sports.is_empty() && !self.sports.contains(&signal.sport) {
            return false;
        }
        if self.market_type.is_some_and(|m| m != signal.market_type) {
            return false;
        }
        if self.confidence.is_some_and(|c| c != signal.confidence) {
            return false;
        }
        if self.min_confidence.is_some_and(|c| signal.confidence < c) {
            return false;
        }
        if self.min_score.is_some_and(|s| signal.score < s) {
            return false;
        }
        if self.min_edge.is_some_and(|e| signal.edge_pct < e) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Score,
    Edge,
    Recent,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(SortKey::Score),
            "edge" | "edge_pct" => Ok(SortKey::Edge),
            "recent" | "created_at" => Ok(SortKey::Recent),
            other => anyhow::bail!("unknown sort key '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" => Ok(SortOrder::Desc),
            "asc" => Ok(SortOrder::Asc),
            other => anyhow::bail!("unknown sort order '{}'", other),
        }
    }
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

/// Filter, sort and truncate. Ties break on id so paging is stable.
pub fn apply(
    mut signals: Vec<Signal>,
    filter: &SignalFilter,
    sort: SortKey,
    order: SortOrder,
    limit: usize,
) -> Vec<Signal> {
    signals.retain(|s| filter.matches(s));

    signals.sort_by(|a, b| {
        let primary = match sort {
            SortKey::Score => a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal),
            SortKey::Edge => a.edge_pct.partial_cmp(&b.edge_pct).unwrap_or(Ordering::Equal),
            SortKey::Recent => a.created_at.cmp(&b.created_at),
        };
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });

    signals.truncate(limit);
    signals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::scoring::confidence_for_score;
    use chrono::{Duration, TimeZone, Utc};

    fn signal(id: &str, sport: Sport, score: f64, edge: f64, minutes: i64) -> Signal {
        Signal {
            id: id.to_string(),
            event_id: format!("evt-{}", id),
            sport,
            market_type: MarketType::Moneyline,
            matchup: "Away @ Home".to_string(),
            selection: "Home ML".to_string(),
            score,
            edge_pct: edge,
            confidence: confidence_for_score(score),
            best_odds: -105,
            best_book: "Pinnacle".to_string(),
            consensus_odds: -110,
            reasoning: "test".to_string(),
            key_factors: vec!["Line movement".to_string()],
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    fn board() -> Vec<Signal> {
        vec![
            signal("a", Sport::Nba, 80.0, 2.0, 0),
            signal("b", Sport::Nfl, 60.0, 6.5, 5),
            signal("c", Sport::Nba, 40.0, 1.0, 10),
            signal("d", Sport::Mlb, 60.0, 3.0, 15),
        ]
    }

    fn ids(signals: &[Signal]) -> Vec<&str> {
        signals.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_default_sort_is_score_desc_with_id_tiebreak() {
        let out = apply(board(), &SignalFilter::default(), SortKey::Score, SortOrder::Desc, 50);
        assert_eq!(ids(&out), vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_sort_by_edge_and_recent() {
        let out = apply(board(), &SignalFilter::default(), SortKey::Edge, SortOrder::Desc, 50);
        assert_eq!(ids(&out), vec!["b", "d", "a", "c"]);

        let out = apply(board(), &SignalFilter::default(), SortKey::Recent, SortOrder::Asc, 50);
        assert_eq!(ids(&out), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_filters_combine() {
        let filter = SignalFilter {
            sport: Some(Sport::Nba),
            min_score: Some(50.0),
            ..Default::default()
        };
        let out = apply(board(), &filter, SortKey::Score, SortOrder::Desc, 50);
        assert_eq!(ids(&out), vec!["a"]);

        let filter = SignalFilter {
            confidence: Some(ConfidenceLevel::Medium),
            min_edge: Some(5.0),
            ..Default::default()
        };
        let out = apply(board(), &filter, SortKey::Score, SortOrder::Desc, 50);
        assert_eq!(ids(&out), vec!["b"]);
    }

    #[test]
    fn test_preferences_filter() {
        let prefs = UserPreferences {
            favorite_sports: vec![Sport::Nba, Sport::Mlb],
            min_confidence: ConfidenceLevel::Medium,
            ..Default::default()
        };
        let filter = SignalFilter::from_preferences(&prefs);
        let out = apply(board(), &filter, SortKey::Score, SortOrder::Desc, 50);
        assert_eq!(ids(&out), vec!["a", "d"]);
    }

    #[test]
    fn test_limit_truncates_and_caps() {
        let out = apply(board(), &SignalFilter::default(), SortKey::Score, SortOrder::Desc, 2);
        assert_eq!(ids(&out), vec!["a", "b"]);

        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
    }

    #[test]
    fn test_parse_sort_params() {
        assert_eq!("EDGE".parse::<SortKey>().unwrap(), SortKey::Edge);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
