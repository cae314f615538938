use crate::database::enums::KlineInterval;
use crate::exchanges::{ExchangesDataCollector, Kline, KlineDataRequestFormatted, ListedCoins};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

/// Shared state for exchange aggregation handlers
#[derive(Clone)]
pub struct ExchangesState {
    pub collector: Arc<ExchangesDataCollector>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "PascalCase")]
pub struct KlineDataQueryParams {
    /// Main coin symbol (e.g., BTC)
    pub coin_main: String,

    /// Quote coin symbol (e.g., USDT)
    pub coin_quote: String,

    /// Interval token (1m, 5m, 15m, 30m, 1h, 4h, 1d, 1w, 1M)
    pub interval: String,

    /// Window start (Unix milliseconds)
    pub start_time: i64,

    /// Window end (Unix milliseconds)
    pub end_time: i64,

    /// Maximum candles to request
    #[serde(default = "default_kline_limit")]
    pub limit: u16,
}

fn default_kline_limit() -> u16 {
    1000
}

/// Fetch candles for a pair across exchanges in priority order
#[utoipa::path(
    get,
    path = "/exchanges/klineData",
    tag = "exchanges",
    params(KlineDataQueryParams),
    responses(
        (status = 200, description = "Candles from the first exchange that had data", body = Vec<Kline>),
        (status = 400, description = "Unknown interval token")
    )
)]
pub async fn get_kline_data(
    State(state): State<ExchangesState>,
    Query(params): Query<KlineDataQueryParams>,
) -> Result<Json<Vec<Kline>>, (StatusCode, String)> {
    let interval = KlineInterval::from_str(&params.interval).ok_or((
        StatusCode::BAD_REQUEST,
        format!("Unknown interval: {}", params.interval),
    ))?;

    let request = KlineDataRequestFormatted {
        symbol: format!(
            "{}{}",
            params.coin_main.to_uppercase(),
            params.coin_quote.to_uppercase()
        ),
        interval,
        start_time: params.start_time,
        end_time: params.end_time,
        limit: params.limit,
    };

    Ok(Json(state.collector.get_kline_data(&request).await))
}

/// Fetch every exchange's listed base coins
#[utoipa::path(
    get,
    path = "/exchanges/allListedCoins",
    tag = "exchanges",
    responses(
        (status = 200, description = "Per-exchange symbol lists", body = ListedCoins)
    )
)]
pub async fn get_all_listed_coins(State(state): State<ExchangesState>) -> Json<ListedCoins> {
    Json(state.collector.get_all_listed_coins().await)
}
