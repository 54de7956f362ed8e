//! OpenAPI Docs
//! /api-docs エンドポイント（REST API の OpenAPI ドキュメント）

use axum::response::Json;
use utoipa::OpenApi;

use super::orders::OrderErrorResponse;
use super::{autodeals::DealErrorResponse, ErrorResponse, HealthResponse};
use crate::models::{
    Client, CreateClientRequest, Order, OrderItem, OrderKind, OwnedVehicle, Part, PartRequest,
    PartsOrder, PartsOrderRequest, UpdateClientRequest, Vehicle, VehiclePurchase,
    VehiclePurchaseRequest, VehicleRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Dealership API", description = "顧客・車両・部品・注文の REST API"),
    paths(
        super::health_check,
        super::clients::list_clients,
        super::clients::get_client,
        super::clients::create_client,
        super::clients::update_client,
        super::autos::list_autos,
        super::autos::get_auto,
        super::autos::create_auto,
        super::autos::update_auto,
        super::autos::delete_auto,
        super::items::list_items,
        super::items::all_models,
        super::items::get_item,
        super::items::items_by_model,
        super::items::create_item,
        super::items::update_item,
        super::items::delete_item,
        super::orders::list_orders,
        super::orders::get_order,
        super::orders::orders_by_client,
        super::orders::create_order,
        super::autodeals::list_deals,
        super::autodeals::create_deal,
    ),
    components(schemas(
        Client,
        OwnedVehicle,
        CreateClientRequest,
        UpdateClientRequest,
        Vehicle,
        VehicleRequest,
        Part,
        PartRequest,
        Order,
        OrderKind,
        PartsOrder,
        VehiclePurchase,
        OrderItem,
        PartsOrderRequest,
        VehiclePurchaseRequest,
        ErrorResponse,
        OrderErrorResponse,
        DealErrorResponse,
        HealthResponse,
    )),
    tags(
        (name = "health", description = "ヘルスチェック"),
        (name = "clients", description = "顧客"),
        (name = "autos", description = "販売車両"),
        (name = "items", description = "部品の在庫台帳"),
        (name = "orders", description = "部品注文"),
        (name = "autodeals", description = "車両購入"),
    )
)]
pub struct ApiDoc;

/// GET /api-docs - OpenAPI ドキュメント（JSON）
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_rest_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/clients/{id}",
            "/api/auto/{id}",
            "/api/items/models/{model}",
            "/api/orders",
            "/api/autodeals",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(!doc.paths.paths.keys().any(|p| p.starts_with("/api/sessions")));
    }

    #[test]
    fn test_document_carries_wire_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in ["Client", "Vehicle", "Part", "Order", "OrderErrorResponse"] {
            assert!(schemas.contains_key(name), "missing {}", name);
        }
    }
}
