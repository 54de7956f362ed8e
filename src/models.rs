//! Data Models
//! Client, Vehicle, Part, Order などのデータ構造定義

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

pub type ClientId = u64;
pub type VehicleId = u64;
pub type PartId = u64;
pub type OrderId = u64;

// ========================================
// Client
// ========================================

/// Client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[schema(value_type = u64)]
    pub id: ClientId,
    pub name: String,
    pub phone: String,
    /// 所有車両（Vehicle の非正規化コピー）
    #[serde(default)]
    pub autos: Vec<OwnedVehicle>,
}

/// 顧客が所有する車両のサマリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedVehicle {
    #[schema(value_type = u64)]
    pub id: VehicleId,
    pub model_type: String,
    pub year: i32,
}

/// Client 作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    pub name: String,
    pub phone: String,
}

/// Client 更新リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateClientRequest {
    pub name: String,
    pub phone: String,
    /// 指定された場合のみ所有車両を置き換える
    pub autos: Option<Vec<OwnedVehicle>>,
}

// ========================================
// Vehicle
// ========================================

/// Vehicle (販売車両)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[schema(value_type = u64)]
    pub id: VehicleId,
    pub brand: String,
    pub model_type: String,
    pub year: i32,
    pub price: f64,
}

impl Vehicle {
    pub fn ownership(&self) -> OwnedVehicle {
        OwnedVehicle {
            id: self.id,
            model_type: self.model_type.clone(),
            year: self.year,
        }
    }
}

/// Vehicle 作成・更新リクエスト（PUT は全置換）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    pub brand: String,
    pub model_type: String,
    pub year: i32,
    pub price: f64,
}

// ========================================
// Part
// ========================================

/// Part (在庫台帳の行)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[schema(value_type = u64)]
    pub id: PartId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub compatible_models: Vec<String>,
    pub price: f64,
    pub quantity: u32,
}

impl Part {
    pub fn fits(&self, model: &str) -> bool {
        self.compatible_models.iter().any(|m| m == model)
    }

    pub fn priced_within(&self, range: &PriceRange) -> bool {
        range.min_price.map_or(true, |min| self.price >= min)
            && range.max_price.map_or(true, |max| self.price <= max)
    }
}

/// Part 作成・更新リクエスト（PUT は全置換）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub compatible_models: Vec<String>,
    pub price: f64,
    pub quantity: u32,
}

/// 価格フィルタ（両端を含む）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

// ========================================
// Order
// ========================================

/// Order (部品注文 または 車両購入)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[schema(value_type = u64)]
    pub id: OrderId,
    #[schema(value_type = u64)]
    pub client_id: ClientId,
    pub date: String,
    pub price: f64,
    #[serde(flatten)]
    pub kind: OrderKind,
}

impl Order {
    pub fn is_vehicle_purchase(&self) -> bool {
        matches!(self.kind, OrderKind::VehiclePurchase(_))
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        match &self.kind {
            OrderKind::Parts(parts) => parts.auto_id,
            OrderKind::VehiclePurchase(purchase) => Some(purchase.auto_id),
        }
    }
}

/// 注文の種類
///
/// `autoBuy: true` を持つものが車両購入、`items` を持つものが部品注文。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum OrderKind {
    VehiclePurchase(VehiclePurchase),
    Parts(PartsOrder),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartsOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<u64>)]
    pub auto_id: Option<VehicleId>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePurchase {
    #[schema(value_type = bool)]
    pub auto_buy: PurchaseTag,
    #[schema(value_type = u64)]
    pub auto_id: VehicleId,
    pub model_type: String,
    pub year: i32,
}

/// 注文明細
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    #[schema(value_type = u64)]
    pub id: PartId,
    pub quantity: i64,
}

/// `autoBuy: true` マーカー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurchaseTag;

impl Serialize for PurchaseTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

impl<'de> Deserialize<'de> for PurchaseTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if bool::deserialize(deserializer)? {
            Ok(PurchaseTag)
        } else {
            Err(de::Error::custom("autoBuy must be true"))
        }
    }
}

/// 部品注文リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartsOrderRequest {
    #[schema(value_type = u64)]
    pub client_id: ClientId,
    #[serde(default, alias = "vehicleId")]
    #[schema(value_type = Option<u64>)]
    pub auto_id: Option<VehicleId>,
    /// 省略時は当日（DD.MM.YYYY）
    #[serde(default)]
    pub date: Option<String>,
    pub items: Vec<OrderItem>,
    pub price: f64,
}

/// 車両購入リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePurchaseRequest {
    #[schema(value_type = u64)]
    pub client_id: ClientId,
    #[serde(alias = "vehicleId")]
    #[schema(value_type = u64)]
    pub auto_id: VehicleId,
    #[serde(default)]
    pub date: Option<String>,
    pub price: f64,
    /// 省略時は車両の値を使う
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// 注文日の表示形式
pub fn today() -> String {
    chrono::Local::now().format("%d.%m.%Y").to_string()
}
