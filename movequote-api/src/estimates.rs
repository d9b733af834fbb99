use axum::{extract::State, routing::post, Json, Router};
use movequote_pricing::PriceBreakdown;
use movequote_shared::UserOrder;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/estimates", post(create_estimate))
}

/// POST /v1/estimates
/// Price a move without recording anything
async fn create_estimate(
    State(state): State<AppState>,
    Json(order): Json<UserOrder>,
) -> Result<Json<PriceBreakdown>, AppError> {
    let breakdown = state.pricing.quote(&order).await?;
    Ok(Json(breakdown))
}
