use crate::api::responses::{db_error_response, CountResponse};
use crate::bridge::KlineDataCollector;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Shared state for orchestration handlers
#[derive(Clone)]
pub struct BridgeState {
    pub collector: Arc<KlineDataCollector>,
}

/// Collect candles for every pair and append them to the store
#[utoipa::path(
    post,
    path = "/bridge/kline",
    tag = "bridge",
    responses(
        (status = 200, description = "Number of candles inserted", body = CountResponse)
    )
)]
pub async fn collect_kline_data(
    State(state): State<BridgeState>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    state
        .collector
        .collect_entire_kline_data()
        .await
        .map(|count| Json(CountResponse { count }))
        .map_err(db_error_response)
}

/// Collect candles for every pair and replace the store with them
#[utoipa::path(
    put,
    path = "/bridge/kline",
    tag = "bridge",
    responses(
        (status = 200, description = "Number of candles the store now holds", body = CountResponse)
    )
)]
pub async fn update_kline_data(
    State(state): State<BridgeState>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    state
        .collector
        .update_entire_kline_data()
        .await
        .map(|count| Json(CountResponse { count }))
        .map_err(db_error_response)
}
