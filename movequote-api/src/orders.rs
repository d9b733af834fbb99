use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use movequote_shared::{CustomerId, UserOrder};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub customer_id: CustomerId,
    pub price: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/orders", post(submit_order))
}

/// POST /v1/orders
/// Price the move, then record the request
async fn submit_order(
    State(state): State<AppState>,
    Json(order): Json<UserOrder>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    // Quote first so that an unpriceable request is never stored.
    let price = state.pricing.compute_price(&order).await?;
    let customer_id = state.registrar.register_order(&order).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse { customer_id, price })))
}
