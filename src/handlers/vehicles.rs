use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::error::AppError;

/// GET /api/makes
pub async fn list_makes(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.vehicles.makes().await?))
}

/// GET /api/models/:make
pub async fn list_models(
    State(state): State<AppState>,
    Path(make): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.vehicles.models(&make).await?))
}
