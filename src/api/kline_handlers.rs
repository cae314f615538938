use crate::api::responses::{db_error_response, CountResponse};
use crate::database::models::KlineData;
use crate::database::repositories::KlineRepository;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state for kline store handlers
#[derive(Clone)]
pub struct KlineState {
    pub kline_repository: Arc<dyn KlineRepository>,
}

fn check_klines(klines: &[KlineData]) -> Result<(), (StatusCode, String)> {
    for kline in klines {
        kline
            .validate()
            .map_err(|message| (StatusCode::BAD_REQUEST, message))?;
    }
    Ok(())
}

/// Insert a single candle
#[utoipa::path(
    post,
    path = "/kline/insert",
    tag = "kline",
    request_body = KlineData,
    responses(
        (status = 204, description = "Candle stored"),
        (status = 400, description = "Invalid candle or unknown trading pair"),
        (status = 409, description = "Candle already exists for this pair and open time")
    )
)]
pub async fn insert_kline(
    State(state): State<KlineState>,
    Json(kline): Json<KlineData>,
) -> Result<StatusCode, (StatusCode, String)> {
    check_klines(std::slice::from_ref(&kline))?;
    state
        .kline_repository
        .insert_kline(kline)
        .map_err(db_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Insert a batch of candles atomically
#[utoipa::path(
    post,
    path = "/kline/insertMany",
    tag = "kline",
    request_body = Vec<KlineData>,
    responses(
        (status = 200, description = "Number of candles stored", body = CountResponse),
        (status = 400, description = "An invalid candle in the batch"),
        (status = 409, description = "A candle in the batch already exists")
    )
)]
pub async fn insert_klines(
    State(state): State<KlineState>,
    Json(klines): Json<Vec<KlineData>>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    check_klines(&klines)?;
    state
        .kline_repository
        .insert_klines(klines)
        .map(|count| Json(CountResponse { count }))
        .map_err(db_error_response)
}

/// Get all candles grouped by trading pair
#[utoipa::path(
    get,
    path = "/kline/all",
    tag = "kline",
    responses(
        (status = 200, description = "Candles per trading pair ID")
    )
)]
pub async fn get_all_klines(
    State(state): State<KlineState>,
) -> Result<Json<HashMap<i32, Vec<KlineData>>>, (StatusCode, String)> {
    state
        .kline_repository
        .get_all_klines()
        .map(Json)
        .map_err(db_error_response)
}

/// Get candles for one trading pair
#[utoipa::path(
    get,
    path = "/kline/{idTradePair}",
    tag = "kline",
    params(
        ("idTradePair" = i32, Path, description = "Trading pair ID")
    ),
    responses(
        (status = 200, description = "Candles ordered by open time", body = Vec<KlineData>)
    )
)]
pub async fn get_klines_for_trading_pair(
    State(state): State<KlineState>,
    Path(id_trade_pair): Path<i32>,
) -> Result<Json<Vec<KlineData>>, (StatusCode, String)> {
    state
        .kline_repository
        .get_klines_for_trading_pair(id_trade_pair)
        .map(Json)
        .map_err(db_error_response)
}

/// Delete all candles for one trading pair
#[utoipa::path(
    delete,
    path = "/kline/{idTradePair}",
    tag = "kline",
    params(
        ("idTradePair" = i32, Path, description = "Trading pair ID")
    ),
    responses(
        (status = 200, description = "Number of candles removed", body = CountResponse)
    )
)]
pub async fn delete_klines_for_trading_pair(
    State(state): State<KlineState>,
    Path(id_trade_pair): Path<i32>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    state
        .kline_repository
        .delete_klines_for_trading_pair(id_trade_pair)
        .map(|count| Json(CountResponse { count }))
        .map_err(db_error_response)
}

/// Replace the entire store with the given candles
#[utoipa::path(
    put,
    path = "/kline/replaceAll",
    tag = "kline",
    request_body = Vec<KlineData>,
    responses(
        (status = 200, description = "Number of candles the store now holds", body = CountResponse),
        (status = 400, description = "An invalid candle in the batch")
    )
)]
pub async fn replace_all_klines(
    State(state): State<KlineState>,
    Json(klines): Json<Vec<KlineData>>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    check_klines(&klines)?;
    state
        .kline_repository
        .replace_all_klines(klines)
        .map(|count| Json(CountResponse { count }))
        .map_err(db_error_response)
}
