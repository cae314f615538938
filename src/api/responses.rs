use crate::database::connection::DatabaseError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Response carrying the ID of a newly created trading pair
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradingPairCreatedResponse {
    pub id_trading_pair: i32,
}

/// Response carrying a row count (inserted, deleted or stored)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: usize,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Map a database error onto its HTTP status and caller-facing message
pub fn db_error_response(error: DatabaseError) -> (StatusCode, String) {
    let status = match &error {
        DatabaseError::UniqueViolation(_) => StatusCode::CONFLICT,
        DatabaseError::ForeignKeyViolation(_) => StatusCode::BAD_REQUEST,
        DatabaseError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Database operation failed: {}", error);
    }
    (status, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let (status, _) =
            db_error_response(DatabaseError::UniqueViolation("duplicate key".to_string()));
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_foreign_key_violation_maps_to_bad_request() {
        let (status, _) =
            db_error_response(DatabaseError::ForeignKeyViolation("bad ref".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let (status, _) = db_error_response(DatabaseError::NotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
