//! Items API Handlers
//! /api/items エンドポイント（部品の在庫台帳）

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::info;

use super::{domain_error, error_response, ApiError, ErrorResponse};
use crate::error::DealershipError;
use crate::models::{Part, PartId, PartRequest, PriceRange};
use crate::AppState;

// ========================================
// Handlers
// ========================================

/// GET /api/items - 部品一覧取得
#[utoipa::path(
    get,
    path = "/api/items",
    tag = "items",
    responses((status = 200, body = [Part]))
)]
pub async fn list_items(State(state): State<Arc<AppState>>) -> Json<Vec<Part>> {
    let db = state.db.read().await;
    Json(db.ledger.list().to_vec())
}

/// GET /api/items/all-models - 対応車種の一覧
#[utoipa::path(
    get,
    path = "/api/items/all-models",
    tag = "items",
    responses((status = 200, body = [String]))
)]
pub async fn all_models(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let db = state.db.read().await;
    Json(db.ledger.all_models())
}

/// GET /api/items/:id - 部品詳細取得
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    tag = "items",
    params(("id" = u64, Path, description = "部品ID")),
    responses(
        (status = 200, body = Part),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PartId>,
) -> Result<Json<Part>, ApiError> {
    let db = state.db.read().await;
    let part = db
        .ledger
        .find_by_id(id)
        .ok_or_else(|| domain_error(DealershipError::not_found("Part", id)))?;
    Ok(Json(part.clone()))
}

/// GET /api/items/models/:model?minPrice&maxPrice - 車種で絞り込み
#[utoipa::path(
    get,
    path = "/api/items/models/{model}",
    tag = "items",
    params(
        ("model" = String, Path, description = "車種（完全一致）"),
        ("minPrice" = Option<f64>, Query, description = "最低価格（含む）"),
        ("maxPrice" = Option<f64>, Query, description = "最高価格（含む）")
    ),
    responses((status = 200, body = [Part]))
)]
pub async fn items_by_model(
    State(state): State<Arc<AppState>>,
    Path(model): Path<String>,
    Query(range): Query<PriceRange>,
) -> Json<Vec<Part>> {
    let db = state.db.read().await;
    Json(db.ledger.list_by_model(&model, &range))
}

/// POST /api/items - 部品登録
#[utoipa::path(
    post,
    path = "/api/items",
    tag = "items",
    request_body = PartRequest,
    responses(
        (status = 201, body = Part),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PartRequest>,
) -> Result<(StatusCode, Json<Part>), ApiError> {
    validate(&req)?;

    let mut db = state.db.write().await;
    let part = db.ledger.insert(req);
    info!(
        "🔩 Part created: id={}, name={}, quantity={}",
        part.id, part.name, part.quantity
    );

    Ok((StatusCode::CREATED, Json(part)))
}

/// PUT /api/items/:id - 部品更新（全置換）
#[utoipa::path(
    put,
    path = "/api/items/{id}",
    tag = "items",
    params(("id" = u64, Path, description = "部品ID")),
    request_body = PartRequest,
    responses(
        (status = 200, body = Part),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PartId>,
    Json(req): Json<PartRequest>,
) -> Result<Json<Part>, ApiError> {
    validate(&req)?;

    let mut db = state.db.write().await;
    let part = db
        .ledger
        .replace(id, req)
        .ok_or_else(|| domain_error(DealershipError::not_found("Part", id)))?;
    info!("🔩 Part updated: id={}, quantity={}", part.id, part.quantity);

    Ok(Json(part))
}

/// DELETE /api/items/:id - 部品削除
#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    tag = "items",
    params(("id" = u64, Path, description = "部品ID")),
    responses(
        (status = 204),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PartId>,
) -> Result<StatusCode, ApiError> {
    let mut db = state.db.write().await;
    let part = db
        .ledger
        .remove(id)
        .ok_or_else(|| domain_error(DealershipError::not_found("Part", id)))?;
    info!("🗑️  Part deleted: id={}", part.id);

    Ok(StatusCode::NO_CONTENT)
}

fn validate(req: &PartRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "name is required".to_string(),
        ));
    }
    if req.price < 0.0 {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}
