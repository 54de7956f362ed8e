//! API Client
//! /api エンドポイントの HTTP クライアント
//!
//! 通信失敗は [`DealershipError::NetworkFailure`]、サーバ側の拒否は元のドメインエラーに戻す。

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::DealershipError;
use crate::models::{
    Client, ClientId, CreateClientRequest, Order, OrderId, Part, PartId, PartRequest,
    PartsOrderRequest, PriceRange, UpdateClientRequest, Vehicle, VehicleId,
    VehiclePurchaseRequest, VehicleRequest,
};

#[derive(Debug, Clone)]
pub struct DealershipClient {
    http: reqwest::Client,
    base_url: Url,
}

/// 404 のときに `NotFound` を組み立てるための対象
struct Target {
    entity: &'static str,
    id: String,
}

impl Target {
    fn new(entity: &'static str, id: impl ToString) -> Self {
        Self {
            entity,
            id: id.to_string(),
        }
    }
}

impl DealershipClient {
    pub fn new(base_url: &str) -> Result<Self, DealershipError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DealershipError::validation(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DealershipError::validation("base url cannot carry a path"));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Ok(Self { http, base_url })
    }

    // ========================================
    // Clients
    // ========================================

    pub async fn clients(&self) -> Result<Vec<Client>, DealershipError> {
        self.get(&["clients"], Target::new("Clients", "")).await
    }

    pub async fn client(&self, id: ClientId) -> Result<Client, DealershipError> {
        self.get(&["clients", &id.to_string()], Target::new("Client", id))
            .await
    }

    pub async fn create_client(&self, req: &CreateClientRequest) -> Result<Client, DealershipError> {
        self.send(Method::POST, &["clients"], req, Target::new("Client", ""))
            .await
    }

    pub async fn update_client(
        &self,
        id: ClientId,
        req: &UpdateClientRequest,
    ) -> Result<Client, DealershipError> {
        self.send(
            Method::PUT,
            &["clients", &id.to_string()],
            req,
            Target::new("Client", id),
        )
        .await
    }

    // ========================================
    // Vehicles
    // ========================================

    pub async fn autos(&self) -> Result<Vec<Vehicle>, DealershipError> {
        self.get(&["auto"], Target::new("Vehicles", "")).await
    }

    pub async fn auto(&self, id: VehicleId) -> Result<Vehicle, DealershipError> {
        self.get(&["auto", &id.to_string()], Target::new("Vehicle", id))
            .await
    }

    pub async fn create_auto(&self, req: &VehicleRequest) -> Result<Vehicle, DealershipError> {
        self.send(Method::POST, &["auto"], req, Target::new("Vehicle", ""))
            .await
    }

    // ========================================
    // Parts
    // ========================================

    pub async fn items(&self) -> Result<Vec<Part>, DealershipError> {
        self.get(&["items"], Target::new("Parts", "")).await
    }

    pub async fn item(&self, id: PartId) -> Result<Part, DealershipError> {
        self.get(&["items", &id.to_string()], Target::new("Part", id))
            .await
    }

    pub async fn items_by_model(
        &self,
        model: &str,
        range: &PriceRange,
    ) -> Result<Vec<Part>, DealershipError> {
        let url = self.url(&["items", "models", model])?;
        let request = self.http.get(url).query(range);
        self.execute(request, Target::new("Model", model)).await
    }

    pub async fn all_models(&self) -> Result<Vec<String>, DealershipError> {
        self.get(&["items", "all-models"], Target::new("Models", ""))
            .await
    }

    pub async fn create_item(&self, req: &PartRequest) -> Result<Part, DealershipError> {
        self.send(Method::POST, &["items"], req, Target::new("Part", ""))
            .await
    }

    // ========================================
    // Orders
    // ========================================

    pub async fn orders(&self) -> Result<Vec<Order>, DealershipError> {
        self.get(&["orders"], Target::new("Orders", "")).await
    }

    pub async fn order(&self, id: OrderId) -> Result<Order, DealershipError> {
        self.get(&["orders", &id.to_string()], Target::new("Order", id))
            .await
    }

    pub async fn orders_by_client(&self, client_id: ClientId) -> Result<Vec<Order>, DealershipError> {
        self.get(
            &["orders", "client", &client_id.to_string()],
            Target::new("Client", client_id),
        )
        .await
    }

    /// 部品注文の確定。在庫不足は [`DealershipError::OrderRejected`]（部品ID付き）
    pub async fn create_order(&self, req: &PartsOrderRequest) -> Result<Order, DealershipError> {
        self.send(Method::POST, &["orders"], req, Target::new("Order", ""))
            .await
    }

    pub async fn auto_deals(&self) -> Result<Vec<Order>, DealershipError> {
        self.get(&["autodeals"], Target::new("Auto deals", "")).await
    }

    pub async fn create_auto_deal(
        &self,
        req: &VehiclePurchaseRequest,
    ) -> Result<Order, DealershipError> {
        let target = Target::new("Client or vehicle", format!("{}/{}", req.client_id, req.auto_id));
        self.send(Method::POST, &["autodeals"], req, target).await
    }

    // ========================================
    // Transport
    // ========================================

    fn url(&self, segments: &[&str]) -> Result<Url, DealershipError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DealershipError::validation("base url cannot carry a path"))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        target: Target,
    ) -> Result<T, DealershipError> {
        let url = self.url(segments)?;
        self.execute(self.http.get(url), target).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        target: Target,
    ) -> Result<T, DealershipError> {
        let url = self.url(segments)?;
        self.execute(self.http.request(method, url).json(body), target)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Target,
    ) -> Result<T, DealershipError> {
        let response = request
            .send()
            .await
            .map_err(|e| DealershipError::NetworkFailure(e.to_string()))?;
        let status = response.status();
        debug!("api response: status={}, target={}", status, target.entity);

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| DealershipError::NetworkFailure(format!("read body failed: {e}")));
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Err(rejection(status, &body, target))
    }
}

/// エラーレスポンスをドメインエラーに変換
fn rejection(status: StatusCode, body: &Value, target: Target) -> DealershipError {
    let message = body
        .get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {status}"));

    match status {
        StatusCode::NOT_FOUND => DealershipError::NotFound {
            entity: target.entity,
            id: target.id,
        },
        StatusCode::BAD_REQUEST => match body.get("itemIds").and_then(Value::as_array) {
            Some(ids) => DealershipError::OrderRejected(ids.iter().filter_map(Value::as_u64).collect()),
            None => DealershipError::Validation(message),
        },
        s if s.is_server_error() => DealershipError::NetworkFailure(message),
        _ => DealershipError::Validation(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_building() {
        let client = DealershipClient::new("http://localhost:3000/").unwrap();
        let url = client.url(&["items", "models", "BMW X5"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/items/models/BMW%20X5");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            DealershipClient::new("not a url"),
            Err(DealershipError::Validation(_))
        ));
    }

    #[test]
    fn test_rejection_mapping() {
        let err = rejection(
            StatusCode::BAD_REQUEST,
            &json!({ "success": false, "error": "...", "itemIds": [4, 42] }),
            Target::new("Order", ""),
        );
        assert_eq!(err, DealershipError::OrderRejected(vec![4, 42]));

        let err = rejection(
            StatusCode::NOT_FOUND,
            &json!({ "success": false, "message": "missing" }),
            Target::new("Client", 5),
        );
        assert_eq!(err, DealershipError::not_found("Client", 5));

        let err = rejection(StatusCode::BAD_GATEWAY, &Value::Null, Target::new("Parts", ""));
        assert!(matches!(err, DealershipError::NetworkFailure(_)));
    }
}
