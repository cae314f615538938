use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Kline (candlestick) interval enumeration
///
/// The generic interval for a kline request. Each exchange client translates
/// this into its own query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum KlineInterval {
    #[serde(rename = "1m")]
    OneMinute,

    #[serde(rename = "5m")]
    FiveMinutes,

    #[serde(rename = "15m")]
    FifteenMinutes,

    #[serde(rename = "30m")]
    ThirtyMinutes,

    #[serde(rename = "1h")]
    OneHour,

    #[serde(rename = "4h")]
    FourHours,

    #[serde(rename = "1d")]
    OneDay,

    #[serde(rename = "1w")]
    OneWeek,

    #[serde(rename = "1M")]
    OneMonth,
}

impl KlineInterval {
    /// Canonical string representation ("1M" is one month, "1m" one minute)
    pub fn as_str(&self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::FourHours => "4h",
            KlineInterval::OneDay => "1d",
            KlineInterval::OneWeek => "1w",
            KlineInterval::OneMonth => "1M",
        }
    }

    /// Parse string to KlineInterval enum
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(KlineInterval::OneMinute),
            "5m" => Some(KlineInterval::FiveMinutes),
            "15m" => Some(KlineInterval::FifteenMinutes),
            "30m" => Some(KlineInterval::ThirtyMinutes),
            "1h" => Some(KlineInterval::OneHour),
            "4h" => Some(KlineInterval::FourHours),
            "1d" => Some(KlineInterval::OneDay),
            "1w" => Some(KlineInterval::OneWeek),
            "1M" => Some(KlineInterval::OneMonth),
            _ => None,
        }
    }

    /// Candle span in milliseconds. One month is treated as 30 days; the
    /// authoritative close time always comes from the exchange payload when
    /// it carries one.
    pub fn duration_ms(&self) -> i64 {
        const MINUTE: i64 = 60_000;
        match self {
            KlineInterval::OneMinute => MINUTE,
            KlineInterval::FiveMinutes => 5 * MINUTE,
            KlineInterval::FifteenMinutes => 15 * MINUTE,
            KlineInterval::ThirtyMinutes => 30 * MINUTE,
            KlineInterval::OneHour => 60 * MINUTE,
            KlineInterval::FourHours => 240 * MINUTE,
            KlineInterval::OneDay => 1_440 * MINUTE,
            KlineInterval::OneWeek => 10_080 * MINUTE,
            KlineInterval::OneMonth => 43_200 * MINUTE,
        }
    }

    /// Get all interval variants
    pub fn all() -> Vec<Self> {
        vec![
            KlineInterval::OneMinute,
            KlineInterval::FiveMinutes,
            KlineInterval::FifteenMinutes,
            KlineInterval::ThirtyMinutes,
            KlineInterval::OneHour,
            KlineInterval::FourHours,
            KlineInterval::OneDay,
            KlineInterval::OneWeek,
            KlineInterval::OneMonth,
        ]
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
