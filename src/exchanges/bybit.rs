use crate::database::enums::{Exchange, KlineInterval};
use crate::exchanges::client::{ExchangeClient, Kline, KlineDataRequestFormatted, ListedCoins};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

const BYBIT_API_BASE: &str = "https://api.bybit.com";

/// Bybit v5 spot market data client
pub struct BybitClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct V5Response<T> {
    #[serde(rename = "retCode")]
    ret_code: i32,

    #[serde(rename = "retMsg")]
    ret_msg: String,

    result: T,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    /// Rows are [start, open, high, low, close, volume, turnover], all
    /// strings, newest first
    list: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct InstrumentsResult {
    list: Vec<InstrumentInfo>,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    #[serde(rename = "baseCoin")]
    base_coin: String,
    status: String,
}

/// Bybit interval tokens: minutes as bare numbers, then D / W / M
fn interval_token(interval: KlineInterval) -> &'static str {
    match interval {
        KlineInterval::OneMinute => "1",
        KlineInterval::FiveMinutes => "5",
        KlineInterval::FifteenMinutes => "15",
        KlineInterval::ThirtyMinutes => "30",
        KlineInterval::OneHour => "60",
        KlineInterval::FourHours => "240",
        KlineInterval::OneDay => "D",
        KlineInterval::OneWeek => "W",
        KlineInterval::OneMonth => "M",
    }
}

impl BybitClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, BYBIT_API_BASE.to_string())
    }

    /// Point the client at a different host; used by tests
    pub fn with_base_url(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    async fn fetch_klines(
        &self,
        request: &KlineDataRequestFormatted,
    ) -> Result<Vec<Kline>, String> {
        let url = format!("{}/v5/market/kline", self.base_url);
        let response: V5Response<KlineResult> = self
            .http
            .get(&url)
            .query(&[
                ("category", "spot"),
                ("symbol", request.symbol.as_str()),
                ("interval", interval_token(request.interval)),
            ])
            .query(&[("start", request.start_time), ("end", request.end_time)])
            .query(&[("limit", request.limit)])
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        if response.ret_code != 0 {
            return Err(format!(
                "retCode {}: {}",
                response.ret_code, response.ret_msg
            ));
        }

        let candle_span = request.interval.duration_ms();
        let mut klines: Vec<Kline> = response
            .result
            .list
            .iter()
            .filter_map(|row| parse_kline_row(row, candle_span))
            .collect();
        // Bybit returns newest first
        klines.reverse();
        Ok(klines)
    }

    async fn fetch_listed_coins(&self) -> Result<Vec<String>, String> {
        let url = format!("{}/v5/market/instruments-info", self.base_url);
        let response: V5Response<InstrumentsResult> = self
            .http
            .get(&url)
            .query(&[("category", "spot")])
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        if response.ret_code != 0 {
            return Err(format!(
                "retCode {}: {}",
                response.ret_code, response.ret_msg
            ));
        }

        let mut coins: Vec<String> = response
            .result
            .list
            .into_iter()
            .filter(|i| i.status == "Trading")
            .map(|i| i.base_coin)
            .collect();
        coins.sort();
        coins.dedup();
        Ok(coins)
    }
}

/// Bybit rows carry no close time; derive it from the interval span
fn parse_kline_row(row: &[String], candle_span: i64) -> Option<Kline> {
    let open_time = i64::from_str(row.first()?).ok()?;
    Some(Kline {
        open_time,
        open_price: decimal_at(row, 1)?,
        high_price: decimal_at(row, 2)?,
        low_price: decimal_at(row, 3)?,
        close_price: decimal_at(row, 4)?,
        volume: decimal_at(row, 5)?,
        close_time: open_time + candle_span - 1,
    })
}

fn decimal_at(row: &[String], index: usize) -> Option<Decimal> {
    Decimal::from_str(row.get(index)?).ok()
}

#[async_trait]
impl ExchangeClient for BybitClient {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    async fn get_kline_data(&self, request: &KlineDataRequestFormatted) -> Vec<Kline> {
        match self.fetch_klines(request).await {
            Ok(klines) => klines,
            Err(e) => {
                tracing::warn!("Bybit kline request for {} failed: {}", request.symbol, e);
                Vec::new()
            }
        }
    }

    async fn get_all_listed_coins(&self, listed_coins: &mut ListedCoins) {
        match self.fetch_listed_coins().await {
            Ok(coins) => {
                tracing::info!("Bybit lists {} tradable base coins", coins.len());
                listed_coins.set_for(Exchange::Bybit, coins);
            }
            Err(e) => {
                tracing::warn!("Bybit listed coins request failed: {}", e);
            }
        }
    }
}
