//! Background board refresher
//!
//! Polling dashboards expect the board to move between polls, so every tick
//! drifts the stored markets and regenerates signals from them.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::store::SignalRepository;

pub fn spawn(repo: Arc<SignalRepository>, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs(), "🔄 Starting board refresher");

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick fires immediately; the board was just seeded
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_tick(&repo);
        }
    })
}

fn run_tick(repo: &SignalRepository) {
    match repo.refresh() {
        Ok(Some(outcome)) => debug!(
            markets = outcome.markets,
            signals = outcome.signals,
            "refresh tick"
        ),
        Ok(None) => debug!("refresh tick skipped, board not initialized"),
        Err(e) => warn!("Board refresh failed: {:#}", e),
    }
}
