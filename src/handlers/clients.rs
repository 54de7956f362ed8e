//! Clients API Handlers
//! /api/clients エンドポイント

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::info;

use super::{domain_error, error_response, ApiError, ErrorResponse};
use crate::models::{Client, ClientId, CreateClientRequest, UpdateClientRequest};
use crate::AppState;

// ========================================
// Handlers
// ========================================

/// GET /api/clients - 顧客一覧取得
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "clients",
    responses((status = 200, body = [Client]))
)]
pub async fn list_clients(State(state): State<Arc<AppState>>) -> Json<Vec<Client>> {
    let db = state.db.read().await;
    Json(db.clients.clone())
}

/// GET /api/clients/:id - 顧客詳細取得
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = u64, Path, description = "顧客ID")),
    responses(
        (status = 200, body = Client),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ClientId>,
) -> Result<Json<Client>, ApiError> {
    let db = state.db.read().await;
    let client = db.client(id).map_err(domain_error)?;
    Ok(Json(client.clone()))
}

/// POST /api/clients - 顧客作成（所有車両は空で開始）
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, body = Client),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "name is required".to_string(),
        ));
    }

    let mut db = state.db.write().await;
    let client = db.create_client(req);
    info!("👤 Client created: id={}, name={}", client.id, client.name);

    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /api/clients/:id - 顧客更新
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = u64, Path, description = "顧客ID")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, body = Client),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ClientId>,
    Json(req): Json<UpdateClientRequest>,
) -> Result<Json<Client>, ApiError> {
    let mut db = state.db.write().await;
    let client = db.update_client(id, req).map_err(domain_error)?;
    info!("👤 Client updated: id={}", client.id);

    Ok(Json(client))
}
