//! Signal scoring
//!
//! A fixed weighted sum over four normalised inputs. Weights add up to 1.0
//! so the raw score already lands in 0..=100; the final clamp only matters
//! for out-of-range inputs.

use serde::{Deserialize, Serialize};

use crate::models::ConfidenceLevel;

const EDGE_WEIGHT: f64 = 0.40;
const SHARP_WEIGHT: f64 = 0.25;
const MOMENTUM_WEIGHT: f64 = 0.20;
const STABILITY_WEIGHT: f64 = 0.15;

/// Edge (percent) that saturates the edge component
const EDGE_SATURATION_PCT: f64 = 10.0;

const HIGH_CUTOFF: f64 = 75.0;
const MEDIUM_CUTOFF: f64 = 55.0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub edge_pct: f64,
    /// Share of handle from sharp bettors, 0..=1
    pub sharp_money: f64,
    /// -1..=1, only magnitude counts
    pub momentum: f64,
    /// 0..=1, lower is better
    pub volatility: f64,
}

#[inline]
fn component(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Score a candidate signal, 0..=100 with one decimal
pub fn compute_signal_score(inputs: &ScoreInputs) -> f64 {
    let edge = component(inputs.edge_pct.max(0.0) * (100.0 / EDGE_SATURATION_PCT));
    let sharp = component(inputs.sharp_money * 100.0);
    let momentum = component(inputs.momentum.abs() * 100.0);
    let stability = component((1.0 - inputs.volatility) * 100.0);

    let raw = EDGE_WEIGHT * edge
        + SHARP_WEIGHT * sharp
        + MOMENTUM_WEIGHT * momentum
        + STABILITY_WEIGHT * stability;

    (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

pub fn confidence_for_score(score: f64) -> ConfidenceLevel {
    if score > HIGH_CUTOFF {
        ConfidenceLevel::High
    } else if score > MEDIUM_CUTOFF {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
