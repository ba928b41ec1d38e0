//! Edgeboard Backend Library
//!
//! Synthetic sports-betting signals for the Edgeboard dashboard: market and
//! signal fabrication, the mock scoring formula, a JSON blob store and the
//! HTTP API the dashboard polls.

pub mod api;
pub mod config;
pub mod middleware;
pub mod models;
pub mod refresher;
pub mod signals;
pub mod store;
