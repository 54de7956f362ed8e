//! API Handlers
//! /api 以下の各エンドポイント

pub mod autodeals;
pub mod autos;
pub mod clients;
pub mod docs;
pub mod items;
pub mod orders;
pub mod sessions;

use axum::{http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::error::DealershipError;

// ========================================
// Response Types
// ========================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

// ========================================
// Handlers
// ========================================

/// GET /api/health - ヘルスチェック
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "dealership-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ========================================
// エラーレスポンスヘルパー
// ========================================

pub fn error_response(status: StatusCode, message: String) -> ApiError {
    warn!("❌ {} {}", status.as_u16(), message);
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message,
        }),
    )
}

/// ドメインエラーの HTTP ステータス
pub fn status_for(err: &DealershipError) -> StatusCode {
    match err {
        DealershipError::NotFound { .. } => StatusCode::NOT_FOUND,
        DealershipError::InsufficientStock { .. }
        | DealershipError::InvalidQuantity { .. }
        | DealershipError::OrderRejected(_)
        | DealershipError::Validation(_) => StatusCode::BAD_REQUEST,
        DealershipError::SelectionRequired(_) => StatusCode::CONFLICT,
        DealershipError::NetworkFailure(_) => StatusCode::BAD_GATEWAY,
    }
}

pub fn domain_error(err: DealershipError) -> ApiError {
    error_response(status_for(&err), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&DealershipError::not_found("Client", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&DealershipError::OrderRejected(vec![1])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DealershipError::SelectionRequired("a client")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&DealershipError::NetworkFailure("refused".to_string())),
            StatusCode::BAD_GATEWAY
        );
    }
}
