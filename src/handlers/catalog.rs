use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::AppState;
use crate::catalog::ServiceEntry;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub key: String,
    pub name: String,
    pub service_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    pub key: String,
    pub name: String,
    pub services: Vec<ServiceEntry>,
}

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategorySummary>>, AppError> {
    let index = state.catalog.index().await?;

    let categories = index
        .categories()
        .iter()
        .map(|category| CategorySummary {
            key: category.key.clone(),
            name: category.name.clone(),
            service_count: category.services().len(),
        })
        .collect();

    Ok(Json(categories))
}

/// GET /services/:category_key
pub async fn list_services(
    State(state): State<AppState>,
    Path(category_key): Path<String>,
) -> Result<Json<CategoryDetail>, AppError> {
    let index = state.catalog.index().await?;
    let category = index
        .find_category(&category_key)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    Ok(Json(CategoryDetail {
        key: category.key.clone(),
        name: category.name.clone(),
        services: category.services().to_vec(),
    }))
}
