//! Synthetic market and signal fabrication
//!
//! Nothing here looks at real data. Markets are sampled from fixed rosters
//! with prices scattered around a random fair probability, and each market
//! becomes a signal only if its score clears a single threshold.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::models::{BookOdds, MarketState, MarketType, Signal, Sport};
use crate::signals::catalog;
use crate::signals::odds::{
    american_to_decimal, best_price, consensus_price, decimal_to_american, edge_pct,
};
use crate::signals::scoring::{compute_signal_score, confidence_for_score, ScoreInputs};

const MIN_BOOKS: usize = 3;
const MAX_BOOKS: usize = 6;
/// Latest kickoff, in minutes from now
const MAX_START_MINUTES: i64 = 72 * 60;

pub struct SignalGenerator {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl SignalGenerator {
    /// A seeded generator reproduces the same board on every run
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng, seed }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw a seed for a new generator from this one's stream
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    pub fn generate_markets(&mut self, count: usize) -> Vec<MarketState> {
        (0..count).map(|_| self.generate_market()).collect()
    }

    fn generate_market(&mut self) -> MarketState {
        let now = Utc::now();
        let sport = *Sport::ALL.choose(&mut self.rng).unwrap_or(&Sport::Nfl);

        let teams: Vec<&str> = catalog::roster(sport)
            .choose_multiple(&mut self.rng, 2)
            .copied()
            .collect();
        let (home, away) = match teams.as_slice() {
            [home, away] => (home.to_string(), away.to_string()),
            _ => ("Home".to_string(), "Away".to_string()),
        };

        let market_type = if sport == Sport::Mma {
            *[MarketType::Moneyline, MarketType::Total]
                .choose(&mut self.rng)
                .unwrap_or(&MarketType::Moneyline)
        } else {
            *MarketType::ALL
                .choose(&mut self.rng)
                .unwrap_or(&MarketType::Moneyline)
        };

        let side = if self.rng.gen_bool(0.5) { &home } else { &away };
        let (selection, line) = self.selection_for(sport, market_type, side);

        let fair_prob: f64 = self.rng.gen_range(0.30..0.70);
        let vig: f64 = self.rng.gen_range(0.02..0.05);
        let book_count = self.rng.gen_range(MIN_BOOKS..=MAX_BOOKS);
        let book_names: Vec<&str> = catalog::SPORTSBOOKS
            .choose_multiple(&mut self.rng, book_count)
            .copied()
            .collect();
        let books = book_names
            .into_iter()
            .map(|book| {
                let noise: f64 = self.rng.gen_range(-0.03..0.03);
                let prob = (fair_prob * (1.0 + vig) + noise).clamp(0.05, 0.95);
                BookOdds {
                    book: book.to_string(),
                    american: decimal_to_american(1.0 / prob),
                }
            })
            .collect();

        let event_id = format!("{}-{:08x}", sport.as_str(), self.rng.gen::<u32>());
        let starts_in = self.rng.gen_range(30..MAX_START_MINUTES);

        MarketState {
            event_id,
            sport,
            home_team: home,
            away_team: away,
            market_type,
            selection,
            line,
            books,
            volatility: round3(self.rng.gen_range(0.0..=1.0)),
            momentum: round3(self.rng.gen_range(-1.0..=1.0)),
            starts_at: now + Duration::minutes(starts_in),
            last_updated: now,
        }
    }

    fn selection_for(
        &mut self,
        sport: Sport,
        market_type: MarketType,
        team: &str,
    ) -> (String, Option<f64>) {
        match market_type {
            MarketType::Moneyline => (format!("{} ML", team), None),
            MarketType::Spread => {
                let points = match sport {
                    Sport::Mlb | Sport::Nhl => 1.5,
                    Sport::Soccer => *[0.5, 1.0, 1.5].choose(&mut self.rng).unwrap_or(&0.5),
                    _ => self.rng.gen_range(1..=14) as f64 - 0.5,
                };
                let line = if self.rng.gen_bool(0.5) { -points } else { points };
                (format!("{} {:+}", team, line), Some(line))
            }
            MarketType::Total => {
                let base = catalog::base_total(sport);
                let steps = self.rng.gen_range(-6..=6) as f64;
                let step = if base > 20.0 { 1.0 } else { 0.5 };
                let line = (base + steps * step).max(0.5);
                let side = if self.rng.gen_bool(0.5) { "Over" } else { "Under" };
                (format!("{} {}", side, line), Some(line))
            }
            MarketType::PlayerProp => {
                let stat = catalog::PROP_STATS
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or("Points");
                let line = self.rng.gen_range(1..=30) as f64 + 0.5;
                (
                    format!("{} top player Over {} {}", team, line, stat),
                    Some(line),
                )
            }
        }
    }

    /// Score every market and keep those at or above `threshold`
    pub fn generate_signals(&mut self, markets: &[MarketState], threshold: f64) -> Vec<Signal> {
        let signals: Vec<Signal> = markets
            .iter()
            .filter_map(|market| self.signal_for(market, threshold))
            .collect();

        debug!(
            markets = markets.len(),
            signals = signals.len(),
            threshold,
            "generated signals"
        );
        signals
    }

    fn signal_for(&mut self, market: &MarketState, threshold: f64) -> Option<Signal> {
        let best = best_price(&market.books)?;
        let consensus = consensus_price(&market.books)?;
        let edge = edge_pct(best.american, consensus);

        let inputs = ScoreInputs {
            edge_pct: edge,
            sharp_money: self.rng.gen_range(0.0..=1.0),
            momentum: market.momentum,
            volatility: market.volatility,
        };
        let score = compute_signal_score(&inputs);
        if score < threshold {
            return None;
        }

        let reasoning = catalog::REASONING
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default()
            .to_string();
        let factor_count = self.rng.gen_range(2..=3);
        let key_factors = catalog::KEY_FACTORS
            .choose_multiple(&mut self.rng, factor_count)
            .map(|f| f.to_string())
            .collect();
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();

        Some(Signal {
            id: id.to_string(),
            event_id: market.event_id.clone(),
            sport: market.sport,
            market_type: market.market_type,
            matchup: market.matchup(),
            selection: market.selection.clone(),
            score,
            edge_pct: edge,
            confidence: confidence_for_score(score),
            best_odds: best.american,
            best_book: best.book.clone(),
            consensus_odds: consensus,
            reasoning,
            key_factors,
            created_at: Utc::now(),
        })
    }

    /// One random-walk step for a live market
    pub fn drift_market(&mut self, market: &mut MarketState) {
        let vol_step: f64 = self.rng.gen_range(-0.1..0.1);
        market.volatility = round3((market.volatility + vol_step).clamp(0.0, 1.0));

        let mom_step: f64 = self.rng.gen_range(-0.3..0.3);
        market.momentum = round3((market.momentum * 0.7 + mom_step).clamp(-1.0, 1.0));

        // Always move at least a little so a frozen market still ticks.
        let scale = market.volatility.max(0.1);
        for book in &mut market.books {
            let shift: f64 = self.rng.gen_range(-0.02..0.02) * scale;
            let decimal = (american_to_decimal(book.american) * (1.0 + shift)).max(1.01);
            book.american = decimal_to_american(decimal);
        }

        market.last_updated = Utc::now();
    }
}

#[inline]
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::odds::validate_american;

    #[test]
    fn test_markets_are_well_formed() {
        let mut gen = SignalGenerator::new(Some(7));
        let markets = gen.generate_markets(200);
        assert_eq!(markets.len(), 200);

        for m in &markets {
            assert_ne!(m.home_team, m.away_team);
            assert!((MIN_BOOKS..=MAX_BOOKS).contains(&m.books.len()));
            assert!((0.0..=1.0).contains(&m.volatility));
            assert!((-1.0..=1.0).contains(&m.momentum));
            assert!(m.starts_at > m.last_updated);
            assert!(m.event_id.starts_with(m.sport.as_str()));
            for b in &m.books {
                validate_american(b.american).expect("generated price in dead band");
            }
            if m.sport == Sport::Mma {
                assert!(matches!(
                    m.market_type,
                    MarketType::Moneyline | MarketType::Total
                ));
            }
            match m.market_type {
                MarketType::Moneyline => assert!(m.line.is_none()),
                _ => assert!(m.line.is_some()),
            }
        }
    }

    #[test]
    fn test_same_seed_same_board() {
        let mut a = SignalGenerator::new(Some(42));
        let mut b = SignalGenerator::new(Some(42));
        let ma = a.generate_markets(25);
        let mb = b.generate_markets(25);

        let ids_a: Vec<_> = ma.iter().map(|m| m.event_id.clone()).collect();
        let ids_b: Vec<_> = mb.iter().map(|m| m.event_id.clone()).collect();
        assert_eq!(ids_a, ids_b);

        let sa = a.generate_signals(&ma, 0.0);
        let sb = b.generate_signals(&mb, 0.0);
        let scores_a: Vec<_> = sa.iter().map(|s| (s.id.clone(), s.score)).collect();
        let scores_b: Vec<_> = sb.iter().map(|s| (s.id.clone(), s.score)).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn test_threshold_gates_signals() {
        let mut gen = SignalGenerator::new(Some(3));
        let markets = gen.generate_markets(100);

        let all = gen.generate_signals(&markets, 0.0);
        assert_eq!(all.len(), markets.len());

        let gated = gen.generate_signals(&markets, 60.0);
        assert!(gated.len() < all.len());
        assert!(gated.iter().all(|s| s.score >= 60.0));

        let none = gen.generate_signals(&markets, 100.1);
        assert!(none.is_empty());
    }

    #[test]
    fn test_signal_fields_follow_market() {
        let mut gen = SignalGenerator::new(Some(11));
        let markets = gen.generate_markets(30);
        let signals = gen.generate_signals(&markets, 0.0);

        for (signal, market) in signals.iter().zip(markets.iter()) {
            assert_eq!(signal.event_id, market.event_id);
            assert_eq!(signal.confidence, confidence_for_score(signal.score));
            assert!((0.0..=100.0).contains(&signal.score));
            assert!(market.books.iter().any(|b| b.book == signal.best_book));
            assert!(!signal.reasoning.is_empty());
            assert!((2..=3).contains(&signal.key_factors.len()));

            let mut factors = signal.key_factors.clone();
            factors.sort();
            factors.dedup();
            assert_eq!(factors.len(), signal.key_factors.len());
        }
    }

    #[test]
    fn test_drift_keeps_market_in_bounds() {
        let mut gen = SignalGenerator::new(Some(5));
        let mut markets = gen.generate_markets(20);
        for _ in 0..50 {
            for m in &mut markets {
                gen.drift_market(m);
            }
        }
        for m in &markets {
            assert!((0.0..=1.0).contains(&m.volatility));
            assert!((-1.0..=1.0).contains(&m.momentum));
            for b in &m.books {
                validate_american(b.american).expect("drifted price in dead band");
            }
        }
    }
}
