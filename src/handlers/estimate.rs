use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

use super::AppState;
use crate::error::AppError;
use crate::metrics;
use crate::pricing::{EstimateRequest, EstimateResult};

/// Estimate as returned to clients and downstream report generators
#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub estimate: EstimateResult,
    pub currency: String,
    pub generated_at: DateTime<Utc>,
}

/// POST /estimate
pub async fn create_estimate(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<EstimateResponse>, AppError> {
    let Json(request) = payload?;
    let start = Instant::now();

    let index = state.catalog.index().await?;
    let estimate = state.calculator.quote(&index, &request)?;

    metrics::record_estimate(
        &estimate.category_key,
        &estimate.pricing_mode.to_string(),
        start.elapsed(),
    );
    info!(
        category = %estimate.category_key,
        service = %estimate.service_code,
        mode = %estimate.pricing_mode,
        total_low = estimate.total_low,
        total_high = estimate.total_high,
        "Estimate computed"
    );

    Ok(Json(EstimateResponse {
        estimate,
        currency: state.config.pricing.currency.clone(),
        generated_at: Utc::now(),
    }))
}
