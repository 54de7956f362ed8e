//! Dealership server
//!
//! 顧客・車両・部品・注文を管理するディーラー向け API サーバ。

pub mod cart;
pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod models;
pub mod orders;
pub mod selection;
pub mod session;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::db::Dealership;
use crate::handlers::orders as order_handlers;
use crate::handlers::{autodeals, autos, clients, docs, health_check, items, sessions};
use crate::session::Session;

// ========================================
// アプリケーション状態
// ========================================

/// ハンドラ間で共有する状態（ロック順: db → sessions）
pub struct AppState {
    pub db: RwLock<Dealership>,
    pub sessions: Mutex<HashMap<Uuid, Session>>,
}

impl AppState {
    pub fn new(db: Dealership) -> Arc<Self> {
        Arc::new(Self {
            db: RwLock::new(db),
            sessions: Mutex::new(HashMap::new()),
        })
    }
}

// ========================================
// ルーター構築
// ========================================

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // OpenAPI ドキュメント
        .route("/api-docs", get(docs::openapi_json))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        // Clients
        .route(
            "/api/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/api/clients/:id",
            get(clients::get_client).put(clients::update_client),
        )
        // Autos
        .route("/api/auto", get(autos::list_autos).post(autos::create_auto))
        .route(
            "/api/auto/:id",
            get(autos::get_auto)
                .put(autos::update_auto)
                .delete(autos::delete_auto),
        )
        // Items
        .route("/api/items", get(items::list_items).post(items::create_item))
        .route("/api/items/all-models", get(items::all_models))
        .route("/api/items/models/:model", get(items::items_by_model))
        .route(
            "/api/items/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        // Orders
        .route(
            "/api/orders",
            get(order_handlers::list_orders).post(order_handlers::create_order),
        )
        .route("/api/orders/client/:client_id", get(order_handlers::orders_by_client))
        .route("/api/orders/:id", get(order_handlers::get_order))
        .route(
            "/api/autodeals",
            get(autodeals::list_deals).post(autodeals::create_deal),
        )
        // Sessions
        .route("/api/sessions", post(sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/sessions/:id/client", put(sessions::select_client))
        .route("/api/sessions/:id/vehicle", put(sessions::select_vehicle))
        .route("/api/sessions/:id/purchase", put(sessions::designate_purchase))
        .route(
            "/api/sessions/:id/purchase/checkout",
            post(sessions::checkout_purchase),
        )
        .route("/api/sessions/:id/catalog", get(sessions::session_catalog))
        .route(
            "/api/sessions/:id/cart",
            post(sessions::add_to_cart).delete(sessions::clear_cart),
        )
        .route(
            "/api/sessions/:id/cart/:part_id",
            put(sessions::set_cart_quantity).delete(sessions::remove_from_cart),
        )
        .route("/api/sessions/:id/checkout", post(sessions::checkout_parts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
