use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sports covered by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
    Ncaaf,
    Ncaab,
    Soccer,
    Mma,
}

impl Sport {
    pub const ALL: [Sport; 8] = [
        Sport::Nfl,
        Sport::Nba,
        Sport::Mlb,
        Sport::Nhl,
        Sport::Ncaaf,
        Sport::Ncaab,
        Sport::Soccer,
        Sport::Mma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nfl => "nfl",
            Sport::Nba => "nba",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
            Sport::Ncaaf => "ncaaf",
            Sport::Ncaab => "ncaab",
            Sport::Soccer => "soccer",
            Sport::Mma => "mma",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Sport::ALL
            .iter()
            .copied()
            .find(|sport| sport.as_str() == needle)
            .ok_or_else(|| anyhow::anyhow!("unknown sport '{}'", s))
    }
}

/// Market types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Moneyline,
    Spread,
    Total,
    PlayerProp,
}

impl MarketType {
    pub const ALL: [MarketType; 4] = [
        MarketType::Moneyline,
        MarketType::Spread,
        MarketType::Total,
        MarketType::PlayerProp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Moneyline => "moneyline",
            MarketType::Spread => "spread",
            MarketType::Total => "total",
            MarketType::PlayerProp => "player_prop",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        MarketType::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| anyhow::anyhow!("unknown market type '{}'", s))
    }
}

/// Confidence bucket, derived from the signal score only
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ConfidenceLevel::Low),
            "medium" => Ok(ConfidenceLevel::Medium),
            "high" => Ok(ConfidenceLevel::High),
            other => anyhow::bail!("unknown confidence level '{}'", other),
        }
    }
}

/// One sportsbook's price for a selection (American odds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookOdds {
    pub book: String,
    pub american: i32,
}

/// Odds snapshot for a single event market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketState {
    pub event_id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub market_type: MarketType,
    /// What the prices are for, e.g. "Celtics -4.5" or "Over 221.5"
    pub selection: String,
    /// Points line for spread/total/prop markets
    pub line: Option<f64>,
    pub books: Vec<BookOdds>,
    /// 0.0 = frozen, 1.0 = moving every tick
    pub volatility: f64,
    /// Direction and strength of recent line movement, -1.0..=1.0
    pub momentum: f64,
    pub starts_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl MarketState {
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

/// A betting signal as served to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub event_id: String,
    pub sport: Sport,
    pub market_type: MarketType,
    pub matchup: String,
    pub selection: String,
    pub score: f64,
    pub edge_pct: f64,
    pub confidence: ConfidenceLevel,
    pub best_odds: i32,
    pub best_book: String,
    pub consensus_odds: i32,
    pub reasoning: String,
    pub key_factors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of an init/regenerate call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSummary {
    pub markets: usize,
    pub signals: usize,
    pub threshold: f64,
    pub seed: Option<u64>,
    pub generated_at: DateTime<Utc>,
}

/// Per-user dashboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub favorite_sports: Vec<Sport>,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: ConfidenceLevel,
    #[serde(default)]
    pub min_score: f64,
    #[serde(default = "default_notify")]
    pub notify_high_confidence: bool,
}

fn default_min_confidence() -> ConfidenceLevel {
    ConfidenceLevel::Low
}

fn default_notify() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            favorite_sports: Vec::new(),
            min_confidence: default_min_confidence(),
            min_score: 0.0,
            notify_high_confidence: default_notify(),
        }
    }
}

impl UserPreferences {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.min_score.is_finite() || !(0.0..=100.0).contains(&self.min_score) {
            anyhow::bail!("min_score must be within 0..=100, got {}", self.min_score);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_parse_is_case_insensitive() {
        assert_eq!("NBA".parse::<Sport>().unwrap(), Sport::Nba);
        assert_eq!(" soccer ".parse::<Sport>().unwrap(), Sport::Soccer);
        assert!("cricket".parse::<Sport>().is_err());
    }

    #[test]
    fn test_market_type_accepts_dashes() {
        assert_eq!(
            "player-prop".parse::<MarketType>().unwrap(),
            MarketType::PlayerProp
        );
    }

    #[test]
    fn test_signal_serializes_snake_case_enums() {
        let json = serde_json::to_value(ConfidenceLevel::High).unwrap();
        assert_eq!(json, "high");
        let json = serde_json::to_value(MarketType::PlayerProp).unwrap();
        assert_eq!(json, "player_prop");
    }

    #[test]
    fn test_preferences_defaults_fill_missing_fields() {
        let prefs: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UserPreferences::default());
        assert!(prefs.notify_high_confidence);
    }

    #[test]
    fn test_preferences_reject_out_of_range_score() {
        let prefs = UserPreferences {
            min_score: 120.0,
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }
}
