//! Orders API Handlers
//! /api/orders エンドポイント（部品注文）

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use super::{domain_error, status_for, ApiError, ErrorResponse};
use crate::error::DealershipError;
use crate::models::{ClientId, Order, OrderId, PartId, PartsOrderRequest};
use crate::orders::commit_parts_order;
use crate::AppState;

// ========================================
// Response Types
// ========================================

/// 注文失敗時のレスポンス（在庫不足の部品IDを含む）
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<u64>)]
    pub item_ids: Vec<PartId>,
}

// ========================================
// Handlers
// ========================================

/// GET /api/orders - 注文一覧取得
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "orders",
    responses((status = 200, body = [Order]))
)]
pub async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    let db = state.db.read().await;
    Json(db.orders.list().to_vec())
}

/// GET /api/orders/:id - 注文詳細取得
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "orders",
    params(("id" = u64, Path, description = "注文ID")),
    responses(
        (status = 200, body = Order),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    let db = state.db.read().await;
    let order = db
        .orders
        .find(id)
        .ok_or_else(|| domain_error(DealershipError::not_found("Order", id)))?;
    Ok(Json(order.clone()))
}

/// GET /api/orders/client/:client_id - 顧客別の注文一覧
#[utoipa::path(
    get,
    path = "/api/orders/client/{client_id}",
    tag = "orders",
    params(("client_id" = u64, Path, description = "顧客ID")),
    responses((status = 200, body = [Order]))
)]
pub async fn orders_by_client(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<ClientId>,
) -> Json<Vec<Order>> {
    let db = state.db.read().await;
    Json(db.orders.by_client(client_id))
}

/// POST /api/orders - 部品注文の確定
///
/// 全明細を検証してから在庫を減らす。1件でも失敗すれば何も変更しない。
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "orders",
    request_body = PartsOrderRequest,
    responses(
        (status = 201, body = Order),
        (status = 400, body = OrderErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PartsOrderRequest>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, Json<OrderErrorResponse>)> {
    let mut db = state.db.write().await;
    let db = &mut *db;

    let order = commit_parts_order(&mut db.ledger, &mut db.orders, req)
        .map_err(order_error_response)?;

    Ok((StatusCode::CREATED, Json(order)))
}

// ========================================
// エラーレスポンスヘルパー
// ========================================

fn order_error_response(err: DealershipError) -> (StatusCode, Json<OrderErrorResponse>) {
    let status = status_for(&err);
    let item_ids = match &err {
        DealershipError::OrderRejected(ids) => ids.clone(),
        _ => Vec::new(),
    };
    warn!("❌ Order rejected: {}", err);
    (
        status,
        Json(OrderErrorResponse {
            success: false,
            error: err.to_string(),
            item_ids,
        }),
    )
}
