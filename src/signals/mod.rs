pub mod catalog;
pub mod generator;
pub mod odds;
pub mod query;
pub mod scoring;

pub use generator::SignalGenerator;
pub use query::{SignalFilter, SortKey, SortOrder};
pub use scoring::{compute_signal_score, confidence_for_score, ScoreInputs};
