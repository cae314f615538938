use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kline (candlestick) entity for a trading pair
///
/// Keyed by (id_trade_pair, open_time). Open/close times are milliseconds
/// since the Unix epoch; prices and volume are exact decimals.
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = crate::database::schema::kline_data)]
pub struct KlineData {
    /// Trading pair the candle belongs to
    pub id_trade_pair: i32,

    /// Candle open time (Unix milliseconds)
    pub open_time: i64,

    #[schema(value_type = String, example = "64000.00")]
    pub open_price: Decimal,

    #[schema(value_type = String, example = "64500.00")]
    pub high_price: Decimal,

    #[schema(value_type = String, example = "63800.00")]
    pub low_price: Decimal,

    #[schema(value_type = String, example = "64250.00")]
    pub close_price: Decimal,

    #[schema(value_type = String, example = "1234.56")]
    pub volume: Decimal,

    /// Candle close time (Unix milliseconds)
    pub close_time: i64,
}

impl KlineData {
    /// Check the candlestick invariants: open before close, no negative
    /// prices or volume. Violations are rejected before insertion.
    pub fn validate(&self) -> Result<(), String> {
        if self.open_time >= self.close_time {
            return Err(format!(
                "open_time {} must be before close_time {}",
                self.open_time, self.close_time
            ));
        }
        let prices = [
            ("open_price", self.open_price),
            ("high_price", self.high_price),
            ("low_price", self.low_price),
            ("close_price", self.close_price),
            ("volume", self.volume),
        ];
        for (field, value) in prices {
            if value < Decimal::ZERO {
                return Err(format!("{} must be non-negative, got: {}", field, value));
            }
        }
        Ok(())
    }
}
