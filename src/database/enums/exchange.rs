use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use utoipa::ToSchema;

/// Supported exchange enumeration
///
/// Closed reference set: trading pairs are associated with exchanges from
/// this list and creation requests naming anything else are rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
pub enum Exchange {
    Binance,
    Bybit,
    Mexc,
}

impl Exchange {
    /// Convert enum to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "Binance",
            Exchange::Bybit => "Bybit",
            Exchange::Mexc => "Mexc",
        }
    }

    /// Parse string to Exchange enum (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binance" => Some(Exchange::Binance),
            "bybit" => Some(Exchange::Bybit),
            "mexc" => Some(Exchange::Mexc),
            _ => None,
        }
    }

    /// Get all exchange variants in fallback priority order
    pub fn all() -> Vec<Self> {
        vec![Exchange::Binance, Exchange::Bybit, Exchange::Mexc]
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Diesel ToSql implementation - convert Rust enum to SQL TEXT
impl ToSql<Text, Pg> for Exchange {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

// Diesel FromSql implementation - convert SQL TEXT to Rust enum
impl FromSql<Text, Pg> for Exchange {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Exchange::from_str(&text).ok_or_else(|| format!("Invalid exchange value: {}", text).into())
    }
}
