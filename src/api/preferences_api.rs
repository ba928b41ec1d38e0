use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
};

use super::routes::{ApiError, AppState};
use crate::models::UserPreferences;
use crate::store::repository::validate_user_id;

/// GET /api/preferences/:user_id
/// Unknown users get the defaults rather than a 404
pub async fn get_preferences(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<Json<UserPreferences>, ApiError> {
    let Path(user_id) = user_id?;
    validate_user_id(&user_id).map_err(ApiError::bad_request)?;
    Ok(Json(state.repo.preferences(&user_id)?))
}

/// PUT /api/preferences/:user_id
pub async fn put_preferences(
    State(state): State<AppState>,
    user_id: Result<Path<String>, PathRejection>,
    prefs: Result<Json<UserPreferences>, JsonRejection>,
) -> Result<Json<UserPreferences>, ApiError> {
    let Path(user_id) = user_id?;
    let Json(prefs) = prefs?;
    validate_user_id(&user_id).map_err(ApiError::bad_request)?;
    prefs.validate().map_err(ApiError::bad_request)?;

    state.repo.save_preferences(&user_id, &prefs)?;
    Ok(Json(prefs))
}
