use crate::api::responses::{db_error_response, CountResponse, TradingPairCreatedResponse};
use crate::database::enums::Exchange;
use crate::database::models::{
    Coin, CoinMarketDataUpdate, CoinRef, NewCoin, NewTradingPair, TradingPairSpec,
    TradingPairWithExchanges,
};
use crate::database::repositories::{CoinsRepository, TradingPairsRepository};
use crate::models::{
    CoinCreationRequest, CoinMarketDataUpdateRequest, QuoteCoinCreationRequest,
    TradingPairCreationRequest,
};
use crate::validators::{CoinsValidator, ValidationOutcome, ViolationCategory, ViolationKind};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Shared state for coin registry handlers
#[derive(Clone)]
pub struct CoinsState {
    pub coins_repository: Arc<dyn CoinsRepository>,
    pub trading_pairs_repository: Arc<dyn TradingPairsRepository>,
    pub validator: Arc<CoinsValidator>,
}

/// A failed validation becomes one response: duplicates are conflicts,
/// missing targets are 404, everything else a 400 with every violation
/// listed
fn validation_failure(outcome: &ValidationOutcome) -> (StatusCode, String) {
    let has_duplicate = outcome
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::DuplicateCoin);
    let status = if has_duplicate {
        StatusCode::CONFLICT
    } else {
        match outcome.category() {
            ViolationCategory::NotFound => StatusCode::NOT_FOUND,
            ViolationCategory::BadRequest => StatusCode::BAD_REQUEST,
        }
    };
    (status, outcome.combined_message())
}

/// Insert a coin together with its trading pairs
#[utoipa::path(
    post,
    path = "/coins/insert",
    tag = "coins",
    request_body = CoinCreationRequest,
    responses(
        (status = 204, description = "Coin created"),
        (status = 400, description = "Invalid exchange or referenced coin"),
        (status = 409, description = "Coin already exists")
    )
)]
pub async fn insert_coin(
    State(state): State<CoinsState>,
    Json(request): Json<CoinCreationRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let outcome = state
        .validator
        .validate_coin_creation_requests(std::slice::from_ref(&request))
        .map_err(db_error_response)?;
    if !outcome.is_ok() {
        return Err(validation_failure(&outcome));
    }

    // An explicit ID attaches the pairs to that coin; otherwise a new coin
    // is created. The whole write is one transaction in the repository.
    let coin_main = match request.id {
        Some(id) => CoinRef::Existing(id),
        None => CoinRef::New(request.to_new_coin()),
    };
    let pairs = request
        .trading_pairs
        .iter()
        .map(|pair_request| TradingPairSpec {
            coin_quote: match pair_request.coin_quote.id {
                Some(id) => CoinRef::Existing(id),
                None => CoinRef::New(NewCoin::new(
                    pair_request.coin_quote.symbol.clone(),
                    pair_request.coin_quote.name.clone(),
                )),
            },
            exchanges: pair_request.parsed_exchanges(),
        })
        .collect();

    state
        .coins_repository
        .insert_coin_with_pairs(coin_main, pairs)
        .map_err(db_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Insert standalone quote coins
#[utoipa::path(
    post,
    path = "/coins/quoteCoins/insert",
    tag = "coins",
    request_body = Vec<QuoteCoinCreationRequest>,
    responses(
        (status = 204, description = "Quote coins created"),
        (status = 409, description = "A coin already exists")
    )
)]
pub async fn insert_quote_coins(
    State(state): State<CoinsState>,
    Json(requests): Json<Vec<QuoteCoinCreationRequest>>,
) -> Result<StatusCode, (StatusCode, String)> {
    let outcome = state
        .validator
        .validate_quote_coin_creation_requests(&requests)
        .map_err(db_error_response)?;
    if !outcome.is_ok() {
        return Err(validation_failure(&outcome));
    }

    let new_coins = requests.iter().map(|r| r.to_new_coin()).collect();
    state
        .coins_repository
        .insert_coins(new_coins)
        .map_err(db_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get all coins
#[utoipa::path(
    get,
    path = "/coins/all",
    tag = "coins",
    responses(
        (status = 200, description = "All registered coins", body = Vec<Coin>)
    )
)]
pub async fn get_all_coins(
    State(state): State<CoinsState>,
) -> Result<Json<Vec<Coin>>, (StatusCode, String)> {
    state
        .coins_repository
        .get_all_coins()
        .map(Json)
        .map_err(db_error_response)
}

/// Get quote coins ordered by ascending priority value
#[utoipa::path(
    get,
    path = "/coins/quoteCoinsPrioritized",
    tag = "coins",
    responses(
        (status = 200, description = "Quote coins, most preferred first", body = Vec<Coin>)
    )
)]
pub async fn get_quote_coins_prioritized(
    State(state): State<CoinsState>,
) -> Result<Json<Vec<Coin>>, (StatusCode, String)> {
    state
        .coins_repository
        .get_quote_coins_prioritized()
        .map(Json)
        .map_err(db_error_response)
}

/// Delete a coin and every trading pair referencing it
#[utoipa::path(
    delete,
    path = "/coins/{id}",
    tag = "coins",
    params(
        ("id" = i32, Path, description = "Coin ID")
    ),
    responses(
        (status = 204, description = "Coin deleted"),
        (status = 404, description = "No coin with this ID")
    )
)]
pub async fn delete_coin(
    State(state): State<CoinsState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state
        .coins_repository
        .delete_coin(id)
        .map_err(db_error_response)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Coin {} not found", id)))
    }
}

/// Delete coins no trading pair references
#[utoipa::path(
    delete,
    path = "/coins/unreferenced",
    tag = "coins",
    responses(
        (status = 200, description = "Number of coins removed", body = CountResponse)
    )
)]
pub async fn delete_unreferenced_coins(
    State(state): State<CoinsState>,
) -> Result<Json<CountResponse>, (StatusCode, String)> {
    state
        .coins_repository
        .delete_coins_not_referenced_by_trading_pairs()
        .map(|count| Json(CountResponse { count }))
        .map_err(db_error_response)
}

/// Apply market data values to coins by ID
#[utoipa::path(
    put,
    path = "/coins/marketData",
    tag = "coins",
    request_body = Vec<CoinMarketDataUpdateRequest>,
    responses(
        (status = 204, description = "Market data updated"),
        (status = 404, description = "A targeted coin ID does not exist")
    )
)]
pub async fn update_market_data(
    State(state): State<CoinsState>,
    Json(requests): Json<Vec<CoinMarketDataUpdateRequest>>,
) -> Result<StatusCode, (StatusCode, String)> {
    let outcome = state
        .validator
        .validate_market_data_update_requests(&requests)
        .map_err(db_error_response)?;
    if !outcome.is_ok() {
        return Err(validation_failure(&outcome));
    }

    let updates = requests
        .into_iter()
        .map(|r| CoinMarketDataUpdate {
            id: r.id,
            price_usd: r.price_usd,
            market_cap_usd: r.market_cap_usd,
        })
        .collect();
    state
        .coins_repository
        .update_market_data(updates)
        .map_err(db_error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Insert a trading pair between two existing coins
#[utoipa::path(
    post,
    path = "/coins/tradingPairs/insert",
    tag = "coins",
    request_body = TradingPairCreationRequest,
    responses(
        (status = 200, description = "Trading pair created", body = TradingPairCreatedResponse),
        (status = 400, description = "Unknown exchange or referenced coin")
    )
)]
pub async fn insert_trading_pair(
    State(state): State<CoinsState>,
    Json(request): Json<TradingPairCreationRequest>,
) -> Result<Json<TradingPairCreatedResponse>, (StatusCode, String)> {
    let mut exchanges = Vec::with_capacity(request.exchanges.len());
    for name in &request.exchanges {
        match Exchange::from_str(name) {
            Some(exchange) => exchanges.push(exchange),
            None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("Unsupported exchange: {}", name),
                ))
            }
        }
    }

    for id in [request.id_coin_main, request.id_coin_quote] {
        let exists = state
            .coins_repository
            .coin_exists(id)
            .map_err(db_error_response)?;
        if !exists {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Coin {} does not exist", id),
            ));
        }
    }

    let id_trading_pair = state
        .trading_pairs_repository
        .insert_trading_pair(
            NewTradingPair {
                id_coin_main: request.id_coin_main,
                id_coin_quote: request.id_coin_quote,
            },
            &exchanges,
        )
        .map_err(db_error_response)?;

    Ok(Json(TradingPairCreatedResponse { id_trading_pair }))
}

/// Get all trading pairs with their exchange sets
#[utoipa::path(
    get,
    path = "/coins/tradingPairs/all",
    tag = "coins",
    responses(
        (status = 200, description = "All trading pairs", body = Vec<TradingPairWithExchanges>)
    )
)]
pub async fn get_all_trading_pairs(
    State(state): State<CoinsState>,
) -> Result<Json<Vec<TradingPairWithExchanges>>, (StatusCode, String)> {
    state
        .trading_pairs_repository
        .get_all_trading_pairs()
        .map(Json)
        .map_err(db_error_response)
}
