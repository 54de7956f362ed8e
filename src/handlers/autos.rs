//! Autos API Handlers
//! /api/auto エンドポイント（販売車両）

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::info;

use super::{domain_error, error_response, ApiError, ErrorResponse};
use crate::models::{Vehicle, VehicleId, VehicleRequest};
use crate::AppState;

// ========================================
// Handlers
// ========================================

/// GET /api/auto - 車両一覧取得
#[utoipa::path(
    get,
    path = "/api/auto",
    tag = "autos",
    responses((status = 200, body = [Vehicle]))
)]
pub async fn list_autos(State(state): State<Arc<AppState>>) -> Json<Vec<Vehicle>> {
    let db = state.db.read().await;
    Json(db.vehicles.clone())
}

/// GET /api/auto/:id - 車両詳細取得
#[utoipa::path(
    get,
    path = "/api/auto/{id}",
    tag = "autos",
    params(("id" = u64, Path, description = "車両ID")),
    responses(
        (status = 200, body = Vehicle),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_auto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<VehicleId>,
) -> Result<Json<Vehicle>, ApiError> {
    let db = state.db.read().await;
    let vehicle = db.vehicle(id).map_err(domain_error)?;
    Ok(Json(vehicle.clone()))
}

/// POST /api/auto - 車両登録
#[utoipa::path(
    post,
    path = "/api/auto",
    tag = "autos",
    request_body = VehicleRequest,
    responses(
        (status = 201, body = Vehicle),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn create_auto(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), ApiError> {
    validate(&req)?;

    let mut db = state.db.write().await;
    let vehicle = db.create_vehicle(req);
    info!(
        "🚗 Vehicle created: id={}, model={}",
        vehicle.id, vehicle.model_type
    );

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// PUT /api/auto/:id - 車両更新（全置換）
#[utoipa::path(
    put,
    path = "/api/auto/{id}",
    tag = "autos",
    params(("id" = u64, Path, description = "車両ID")),
    request_body = VehicleRequest,
    responses(
        (status = 200, body = Vehicle),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_auto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<VehicleId>,
    Json(req): Json<VehicleRequest>,
) -> Result<Json<Vehicle>, ApiError> {
    validate(&req)?;

    let mut db = state.db.write().await;
    let vehicle = db.replace_vehicle(id, req).map_err(domain_error)?;
    info!("🚗 Vehicle updated: id={}", vehicle.id);

    Ok(Json(vehicle))
}

/// DELETE /api/auto/:id - 車両削除
#[utoipa::path(
    delete,
    path = "/api/auto/{id}",
    tag = "autos",
    params(("id" = u64, Path, description = "車両ID")),
    responses(
        (status = 204),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn delete_auto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<VehicleId>,
) -> Result<StatusCode, ApiError> {
    let mut db = state.db.write().await;
    let vehicle = db.delete_vehicle(id).map_err(domain_error)?;
    info!("🗑️  Vehicle deleted: id={}", vehicle.id);

    Ok(StatusCode::NO_CONTENT)
}

fn validate(req: &VehicleRequest) -> Result<(), ApiError> {
    if req.model_type.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "modelType is required".to_string(),
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
