//! American odds arithmetic
//!
//! Prices are stored as American odds (`-110`, `+145`) because that is what
//! the dashboard shows. Everything else is computed through decimal odds.

use anyhow::Result;

use crate::models::BookOdds;

/// Reject prices in the dead band between -100 and +100
pub fn validate_american(american: i32) -> Result<()> {
    if american > -100 && american < 100 {
        anyhow::bail!("invalid American price {}", american);
    }
    Ok(())
}

#[inline]
pub fn american_to_decimal(american: i32) -> f64 {
    let a = american as f64;
    if american > 0 {
        1.0 + a / 100.0
    } else {
        1.0 + 100.0 / a.abs()
    }
}

/// Inverse of [`american_to_decimal`], rounded to a whole price.
///
/// Decimal odds at or below 1.0 have no American equivalent and clamp to
/// a -10000 favourite.
pub fn decimal_to_american(decimal: f64) -> i32 {
    if !decimal.is_finite() || decimal <= 1.0001 {
        return -10_000;
    }
    if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round() as i32
    } else {
        (-100.0 / (decimal - 1.0)).round() as i32
    }
}

#[inline]
pub fn implied_probability(american: i32) -> f64 {
    1.0 / american_to_decimal(american)
}

/// The book paying the most for the selection
pub fn best_price(books: &[BookOdds]) -> Option<&BookOdds> {
    books.iter().max_by(|a, b| {
        american_to_decimal(a.american)
            .partial_cmp(&american_to_decimal(b.american))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Mean implied probability across books, expressed as an American price
pub fn consensus_price(books: &[BookOdds]) -> Option<i32> {
    if books.is_empty() {
        return None;
    }
    let mean_prob =
        books.iter().map(|b| implied_probability(b.american)).sum::<f64>() / books.len() as f64;
    Some(decimal_to_american(1.0 / mean_prob))
}

/// How much better `best` pays than `consensus`, in percent
pub fn edge_pct(best: i32, consensus: i32) -> f64 {
    let edge = (american_to_decimal(best) / american_to_decimal(consensus) - 1.0) * 100.0;
    (edge * 100.0).round() / 100.0
}
