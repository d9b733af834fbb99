use axum::{extract::State, routing::get, Json, Router};
use movequote_shared::{CodeEnum, OptionalServiceType, Prefecture};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct OptionServiceResponse {
    pub service: OptionalServiceType,
    pub code: i32,
    pub label: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/prefectures", get(list_prefectures))
        .route("/v1/option-services", get(list_option_services))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /v1/prefectures
async fn list_prefectures(State(state): State<AppState>) -> Result<Json<Vec<Prefecture>>, AppError> {
    let prefectures = state.repo.list_prefectures().await?;
    Ok(Json(prefectures))
}

/// GET /v1/option-services
async fn list_option_services() -> Json<Vec<OptionServiceResponse>> {
    let services = OptionalServiceType::ALL
        .iter()
        .map(|service| OptionServiceResponse {
            service: *service,
            code: service.code(),
            label: service.label().to_string(),
        })
        .collect();
    Json(services)
}
