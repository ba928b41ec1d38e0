//! Key layout and record operations used by the HTTP handlers
//!
//! | key              | value                  |
//! |------------------|------------------------|
//! | `markets`        | `Vec<MarketState>`     |
//! | `signals`        | `Vec<Signal>`          |
//! | `meta:last_init` | `InitSummary`          |
//! | `prefs:<user>`   | `UserPreferences`      |

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info};

use super::BlobStore;
use crate::models::{InitSummary, MarketState, Signal, UserPreferences};
use crate::signals::SignalGenerator;

const MARKETS_KEY: &str = "markets";
const SIGNALS_KEY: &str = "signals";
const LAST_INIT_KEY: &str = "meta:last_init";
const PREFS_PREFIX: &str = "prefs:";

const MAX_USER_ID_LEN: usize = 64;

/// Outcome of one refresher tick
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub markets: usize,
    pub signals: usize,
}

/// Markets, signals and the init summary read together under one lock
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub markets: Vec<MarketState>,
    pub signals: Vec<Signal>,
    pub last_init: Option<InitSummary>,
}

/// Board writes (`init`, `refresh`) hold `board` exclusively for the whole
/// read-generate-write sequence; board reads take it shared.
pub struct SignalRepository {
    store: BlobStore,
    board: RwLock<()>,
    generator: Mutex<SignalGenerator>,
    default_threshold: f64,
}

impl SignalRepository {
    pub fn new(store: BlobStore, seed: Option<u64>, default_threshold: f64) -> Self {
        Self {
            store,
            board: RwLock::new(()),
            generator: Mutex::new(SignalGenerator::new(seed)),
            default_threshold,
        }
    }

    /// Fabricate a fresh board and overwrite whatever was stored.
    /// Unseeded calls draw a seed from the generator, so the recorded seed
    /// always reproduces the board.
    pub fn init(
        &self,
        market_count: usize,
        seed: Option<u64>,
        threshold: Option<f64>,
    ) -> Result<InitSummary> {
        let threshold = threshold.unwrap_or(self.default_threshold);
        let _board = self.board.write();

        let (markets, signals, seed) = {
            let mut generator = self.generator.lock();
            let seed = seed.unwrap_or_else(|| generator.next_seed());
            *generator = SignalGenerator::new(Some(seed));
            let markets = generator.generate_markets(market_count);
            let signals = generator.generate_signals(&markets, threshold);
            (markets, signals, seed)
        };

        self.store
            .set_json(MARKETS_KEY, &markets)
            .context("Failed to store markets")?;
        self.store
            .set_json(SIGNALS_KEY, &signals)
            .context("Failed to store signals")?;

        let summary = InitSummary {
            markets: markets.len(),
            signals: signals.len(),
            threshold,
            seed: Some(seed),
            generated_at: Utc::now(),
        };
        self.store.set_json(LAST_INIT_KEY, &summary)?;

        info!(
            markets = summary.markets,
            signals = summary.signals,
            threshold,
            seed,
            "board initialized"
        );
        Ok(summary)
    }

    /// Drift every stored market one step and regenerate signals.
    /// Returns `None` when nothing has been initialized yet.
    pub fn refresh(&self) -> Result<Option<RefreshOutcome>> {
        let _board = self.board.write();

        let mut markets = self.load_markets()?;
        if markets.is_empty() {
            return Ok(None);
        }
        let threshold = self
            .load_last_init()?
            .map(|s| s.threshold)
            .unwrap_or(self.default_threshold);

        let signals = {
            let mut generator = self.generator.lock();
            for market in &mut markets {
                generator.drift_market(market);
            }
            generator.generate_signals(&markets, threshold)
        };

        self.store.set_json(MARKETS_KEY, &markets)?;
        self.store.set_json(SIGNALS_KEY, &signals)?;

        let outcome = RefreshOutcome {
            markets: markets.len(),
            signals: signals.len(),
        };
        debug!(
            markets = outcome.markets,
            signals = outcome.signals,
            "board refreshed"
        );
        Ok(Some(outcome))
    }

    /// Consistent view of the whole board
    pub fn snapshot(&self) -> Result<BoardSnapshot> {
        let _board = self.board.read();
        Ok(BoardSnapshot {
            markets: self.load_markets()?,
            signals: self.load_signals()?,
            last_init: self.load_last_init()?,
        })
    }

    pub fn markets(&self) -> Result<Vec<MarketState>> {
        let _board = self.board.read();
        self.load_markets()
    }

    pub fn market(&self, event_id: &str) -> Result<Option<MarketState>> {
        Ok(self
            .markets()?
            .into_iter()
            .find(|m| m.event_id == event_id))
    }

    pub fn signals(&self) -> Result<Vec<Signal>> {
        let _board = self.board.read();
        self.load_signals()
    }

    pub fn signal(&self, id: &str) -> Result<Option<Signal>> {
        Ok(self.signals()?.into_iter().find(|s| s.id == id))
    }

    pub fn last_init(&self) -> Result<Option<InitSummary>> {
        let _board = self.board.read();
        self.load_last_init()
    }

    /// Stored preferences, or defaults for an unknown user
    pub fn preferences(&self, user_id: &str) -> Result<UserPreferences> {
        let key = preferences_key(user_id)?;
        Ok(self.store.get_json(&key)?.unwrap_or_default())
    }

    pub fn save_preferences(&self, user_id: &str, prefs: &UserPreferences) -> Result<()> {
        let key = preferences_key(user_id)?;
        prefs.validate()?;
        self.store.set_json(&key, prefs)?;
        debug!(user_id, "preferences saved");
        Ok(())
    }

    pub fn user_count(&self) -> Result<usize> {
        Ok(self.store.keys(PREFS_PREFIX)?.len())
    }

    // Unlocked reads; callers hold `board`
    fn load_markets(&self) -> Result<Vec<MarketState>> {
        Ok(self.store.get_json(MARKETS_KEY)?.unwrap_or_default())
    }

    fn load_signals(&self) -> Result<Vec<Signal>> {
        Ok(self.store.get_json(SIGNALS_KEY)?.unwrap_or_default())
    }

    fn load_last_init(&self) -> Result<Option<InitSummary>> {
        self.store.get_json(LAST_INIT_KEY)
    }
}

/// User ids become part of a storage key: 1-64 chars of `[A-Za-z0-9_-]`
pub fn validate_user_id(user_id: &str) -> Result<()> {
    let valid = !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        anyhow::bail!("invalid user id '{}'", user_id);
    }
    Ok(())
}

fn preferences_key(user_id: &str) -> Result<String> {
    validate_user_id(user_id)?;
    Ok(format!("{}{}", PREFS_PREFIX, user_id))
}
