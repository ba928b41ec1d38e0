pub mod markets_api;
pub mod preferences_api;
pub mod routes;
pub mod signals_api;

pub use markets_api::{DEFAULT_INIT_MARKETS, MAX_INIT_MARKETS};
pub use routes::{create_router, ApiError, AppState};
