//! Sessions API Handlers
//! /api/sessions エンドポイント
//!
//! 顧客・車両の選択、カート、注文確定までの一連の操作をサーバ側セッションで扱う。
//! ロック順は常に store → sessions。

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{domain_error, status_for, ApiError};
use crate::error::DealershipError;
use crate::models::{ClientId, Order, Part, PartId, PriceRange, VehicleId};
use crate::selection::Notice;
use crate::session::{Session, SessionView, Step};
use crate::AppState;

// ========================================
// Request / Response Types
// ========================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectClientRequest {
    #[serde(default)]
    pub client_id: Option<ClientId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectVehicleRequest {
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub part_id: PartId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    /// 省略時は当日
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: SessionView,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub success: bool,
    pub model: Option<String>,
    pub parts: Vec<Part>,
}

type SessionResult = Result<(StatusCode, Json<SessionResponse>), ApiError>;

// ========================================
// Handlers
// ========================================

/// POST /api/sessions - セッション作成
pub async fn create_session(State(state): State<Arc<AppState>>) -> (StatusCode, Json<SessionResponse>) {
    let session = Session::new();
    let response = SessionResponse {
        success: true,
        session: session.view(),
        notices: Vec::new(),
        order: None,
        error: None,
    };

    let mut sessions = state.sessions.lock().await;
    info!("🧾 Session created: id={}", session.id);
    sessions.insert(session.id, session);

    (StatusCode::CREATED, Json(response))
}

/// GET /api/sessions/:id - セッション状態取得
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> SessionResult {
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;
    Ok(respond(session, Step::done(None)))
}

/// DELETE /api/sessions/:id - セッション破棄
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions.lock().await;
    sessions
        .remove(&id)
        .ok_or_else(|| domain_error(DealershipError::not_found("Session", id)))?;
    info!("🗑️  Session deleted: id={}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/sessions/:id/client - 顧客の選択（null で解除）
pub async fn select_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectClientRequest>,
) -> SessionResult {
    let db = state.db.read().await;
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.select_client(&db, req.client_id);
    Ok(respond(session, step.map(|()| None)))
}

/// PUT /api/sessions/:id/vehicle - 所有車両の選択（null で解除）
pub async fn select_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectVehicleRequest>,
) -> SessionResult {
    let db = state.db.read().await;
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.select_vehicle(&db, req.vehicle_id);
    Ok(respond(session, step.map(|()| None)))
}

/// PUT /api/sessions/:id/purchase - 購入対象車両の指定（null で取消）
pub async fn designate_purchase(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectVehicleRequest>,
) -> SessionResult {
    let db = state.db.read().await;
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.designate_purchase(&db, req.vehicle_id);
    Ok(respond(session, step.map(|()| None)))
}

/// GET /api/sessions/:id/catalog - 選択中の車両に合う部品一覧
pub async fn session_catalog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(range): Query<PriceRange>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let db = state.db.read().await;
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    Ok(Json(CatalogResponse {
        success: true,
        model: session.selection().catalog_model().map(str::to_string),
        parts: session.catalog(&db, &range),
    }))
}

/// POST /api/sessions/:id/cart - カートに部品を追加
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddToCartRequest>,
) -> SessionResult {
    let db = state.db.read().await;
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.add_to_cart(&db, req.part_id, req.quantity);
    Ok(respond(session, step.map(|()| None)))
}

/// PUT /api/sessions/:id/cart/:part_id - 数量の変更
pub async fn set_cart_quantity(
    State(state): State<Arc<AppState>>,
    Path((id, part_id)): Path<(Uuid, PartId)>,
    Json(req): Json<SetQuantityRequest>,
) -> SessionResult {
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.set_cart_quantity(part_id, req.quantity);
    Ok(respond(session, step.map(|()| None)))
}

/// DELETE /api/sessions/:id/cart/:part_id - カートから部品を削除
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    Path((id, part_id)): Path<(Uuid, PartId)>,
) -> SessionResult {
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.remove_from_cart(part_id);
    Ok(respond(session, step.map(|()| None)))
}

/// DELETE /api/sessions/:id/cart - カートを空にする
pub async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> SessionResult {
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    session.clear_cart();
    Ok(respond(session, Step::done(None)))
}

/// POST /api/sessions/:id/checkout - カートを部品注文として確定
pub async fn checkout_parts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    req: Option<Json<CheckoutRequest>>,
) -> SessionResult {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let mut db = state.db.write().await;
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.checkout_parts(&mut db, req.date);
    Ok(respond(session, step.map(Some)))
}

/// POST /api/sessions/:id/purchase/checkout - 車両購入を確定
pub async fn checkout_purchase(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    req: Option<Json<CheckoutRequest>>,
) -> SessionResult {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let mut db = state.db.write().await;
    let mut sessions = state.sessions.lock().await;
    let session = find(&mut sessions, id)?;

    let step = session.checkout_purchase(&mut db, req.date);
    Ok(respond(session, step.map(Some)))
}

// ========================================
// Helpers
// ========================================

fn find(sessions: &mut HashMap<Uuid, Session>, id: Uuid) -> Result<&mut Session, ApiError> {
    sessions
        .get_mut(&id)
        .ok_or_else(|| domain_error(DealershipError::not_found("Session", id)))
}

/// 拒否された操作も変更前のセッションと通知を返す
fn respond(session: &Session, step: Step<Option<Order>>) -> (StatusCode, Json<SessionResponse>) {
    let (status, order, error) = match step.result {
        Ok(order) => (StatusCode::OK, order, None),
        Err(err) => (status_for(&err), None, Some(err.to_string())),
    };
    (
        status,
        Json(SessionResponse {
            success: error.is_none(),
            session: session.view(),
            notices: step.notices,
            order,
            error,
        }),
    )
}
