//! Auto Deals API Handlers
//! /api/autodeals エンドポイント（車両購入）

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use super::status_for;
use crate::error::DealershipError;
use crate::models::{Order, VehiclePurchaseRequest};
use crate::orders::commit_vehicle_purchase;
use crate::AppState;

// ========================================
// Response Types
// ========================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DealErrorResponse {
    pub success: bool,
    pub message: String,
}

// ========================================
// Handlers
// ========================================

/// GET /api/autodeals - 車両購入の一覧
#[utoipa::path(
    get,
    path = "/api/autodeals",
    tag = "autodeals",
    responses((status = 200, body = [Order]))
)]
pub async fn list_deals(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let db = state.db.read().await;
    Json(db.orders.vehicle_purchases())
}

/// POST /api/autodeals - 車両購入の確定（顧客の所有車両に追加）
#[utoipa::path(
    post,
    path = "/api/autodeals",
    tag = "autodeals",
    request_body = VehiclePurchaseRequest,
    responses(
        (status = 201, body = Order),
        (status = 404, body = DealErrorResponse)
    )
)]
pub async fn create_deal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VehiclePurchaseRequest>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, Json<DealErrorResponse>)> {
    let mut db = state.db.write().await;
    let db = &mut *db;

    let committed = commit_vehicle_purchase(&mut db.clients, &db.vehicles, &mut db.orders, req)
        .map_err(deal_error_response)?;

    Ok((StatusCode::CREATED, Json(committed.order)))
}

// ========================================
// エラーレスポンスヘルパー
// ========================================

fn deal_error_response(err: DealershipError) -> (StatusCode, Json<DealErrorResponse>) {
    warn!("❌ Auto deal rejected: {}", err);
    (
        status_for(&err),
        Json(DealErrorResponse {
            success: false,
            message: err.to_string(),
        }),
    )
}
