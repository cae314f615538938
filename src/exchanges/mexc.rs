use crate::database::enums::{Exchange, KlineInterval};
use crate::exchanges::client::{ExchangeClient, Kline, KlineDataRequestFormatted, ListedCoins};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

const MEXC_API_BASE: &str = "https://api.mexc.com";

/// MEXC spot market data client
///
/// The API is Binance-shaped (positional kline arrays, exchangeInfo listing)
/// with its own interval tokens and status codes.
pub struct MexcClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    #[serde(rename = "baseAsset")]
    base_asset: String,
    status: String,
}

/// MEXC tokens: hours spelled in minutes ("60m"), capitalized week
fn interval_token(interval: KlineInterval) -> &'static str {
    match interval {
        KlineInterval::OneMinute => "1m",
        KlineInterval::FiveMinutes => "5m",
        KlineInterval::FifteenMinutes => "15m",
        KlineInterval::ThirtyMinutes => "30m",
        KlineInterval::OneHour => "60m",
        KlineInterval::FourHours => "4h",
        KlineInterval::OneDay => "1d",
        KlineInterval::OneWeek => "1W",
        KlineInterval::OneMonth => "1M",
    }
}

impl MexcClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, MEXC_API_BASE.to_string())
    }

    /// Point the client at a different host; used by tests
    pub fn with_base_url(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    async fn fetch_klines(
        &self,
        request: &KlineDataRequestFormatted,
    ) -> Result<Vec<Kline>, reqwest::Error> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let rows: Vec<Vec<serde_json::Value>> = self
            .http
            .get(&url)
            .query(&[
                ("symbol", request.symbol.as_str()),
                ("interval", interval_token(request.interval)),
            ])
            .query(&[
                ("startTime", request.start_time),
                ("endTime", request.end_time),
            ])
            .query(&[("limit", request.limit)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(rows.iter().filter_map(|row| parse_kline_row(row)).collect())
    }

    async fn fetch_listed_coins(&self) -> Result<Vec<String>, reqwest::Error> {
        let url = format!("{}/api/v3/exchangeInfo", self.base_url);
        let info: ExchangeInfoResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut coins: Vec<String> = info
            .symbols
            .into_iter()
            .filter(|s| s.status == "1" || s.status == "ENABLED")
            .map(|s| s.base_asset)
            .collect();
        coins.sort();
        coins.dedup();
        Ok(coins)
    }
}

/// MEXC kline rows: [openTime, open, high, low, close, volume, closeTime, ...]
fn parse_kline_row(row: &[serde_json::Value]) -> Option<Kline> {
    Some(Kline {
        open_time: row.first()?.as_i64()?,
        open_price: decimal_at(row, 1)?,
        high_price: decimal_at(row, 2)?,
        low_price: decimal_at(row, 3)?,
        close_price: decimal_at(row, 4)?,
        volume: decimal_at(row, 5)?,
        close_time: row.get(6)?.as_i64()?,
    })
}

fn decimal_at(row: &[serde_json::Value], index: usize) -> Option<Decimal> {
    Decimal::from_str(row.get(index)?.as_str()?).ok()
}

#[async_trait]
impl ExchangeClient for MexcClient {
    fn exchange(&self) -> Exchange {
        Exchange::Mexc
    }

    async fn get_kline_data(&self, request: &KlineDataRequestFormatted) -> Vec<Kline> {
        match self.fetch_klines(request).await {
            Ok(klines) => klines,
            Err(e) => {
                tracing::warn!("MEXC kline request for {} failed: {}", request.symbol, e);
                Vec::new()
            }
        }
    }

    async fn get_all_listed_coins(&self, listed_coins: &mut ListedCoins) {
        match self.fetch_listed_coins().await {
            Ok(coins) => {
                tracing::info!("MEXC lists {} tradable base coins", coins.len());
                listed_coins.set_for(Exchange::Mexc, coins);
            }
            Err(e) => {
                tracing::warn!("MEXC listed coins request failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_tokens() {
        assert_eq!(interval_token(KlineInterval::OneHour), "60m");
        assert_eq!(interval_token(KlineInterval::OneWeek), "1W");
        assert_eq!(interval_token(KlineInterval::OneMinute), "1m");
    }

    #[test]
    fn test_parse_kline_row() {
        let row: Vec<serde_json::Value> = serde_json::from_str(
            r#"[1700000000000, "0.5", "0.6", "0.4", "0.55", "99", 1700003599999]"#,
        )
        .unwrap();

        let kline = parse_kline_row(&row).unwrap();
        assert_eq!(kline.open_time, 1_700_000_000_000);
        assert_eq!(kline.close_time, 1_700_003_599_999);
    }
}
