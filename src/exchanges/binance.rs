use crate::database::enums::Exchange;
use crate::exchanges::client::{ExchangeClient, Kline, KlineDataRequestFormatted, ListedCoins};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

const BINANCE_API_BASE: &str = "https://api.binance.com";

/// Binance spot market data client
pub struct BinanceClient {
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

impl BinanceClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, BINANCE_API_BASE.to_string())
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
                ("interval", request.interval.as_str()),
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
            .filter(|s| s.status == "TRADING")
            .map(|s| s.base_asset)
            .collect();
        coins.sort();
        coins.dedup();
        Ok(coins)
    }
}

/// Parse one positional kline row:
/// [openTime, open, high, low, close, volume, closeTime, ...]
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
impl ExchangeClient for BinanceClient {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    async fn get_kline_data(&self, request: &KlineDataRequestFormatted) -> Vec<Kline> {
        match self.fetch_klines(request).await {
            Ok(klines) => klines,
            Err(e) => {
                tracing::warn!("Binance kline request for {} failed: {}", request.symbol, e);
                Vec::new()
            }
        }
    }

    async fn get_all_listed_coins(&self, listed_coins: &mut ListedCoins) {
        match self.fetch_listed_coins().await {
            Ok(coins) => {
                tracing::info!("Binance lists {} tradable base coins", coins.len());
                listed_coins.set_for(Exchange::Binance, coins);
            }
            Err(e) => {
                tracing::warn!("Binance listed coins request failed: {}", e);
            }
        }
    }
}
