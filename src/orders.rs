//! Order Committer
//! 部品注文と車両購入の確定
//!
//! 部品注文は在庫台帳に対して検証してから適用し、車両購入は顧客の所有車両に記録する。
//! どちらも全体が適用されるか、何も変わらないかのどちらか。

use tracing::info;

use crate::error::DealershipError;
use crate::inventory::Ledger;
use crate::models::{
    today, Client, ClientId, Order, OrderId, OrderItem, OrderKind, OwnedVehicle, PartId,
    PartsOrder, PartsOrderRequest, PurchaseTag, Vehicle, VehiclePurchase, VehiclePurchaseRequest,
};

/// 注文一覧（追記のみ）
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最後の注文ID + 1（空なら 1）
    pub fn next_id(&self) -> OrderId {
        self.orders.last().map_or(1, |o| o.id + 1)
    }

    pub fn list(&self) -> &[Order] {
        &self.orders
    }

    pub fn find(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn by_client(&self, client_id: ClientId) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.client_id == client_id)
            .cloned()
            .collect()
    }

    pub fn vehicle_purchases(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.is_vehicle_purchase())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn append(&mut self, client_id: ClientId, date: String, price: f64, kind: OrderKind) -> Order {
        let order = Order {
            id: self.next_id(),
            client_id,
            date,
            price,
            kind,
        };
        self.orders.push(order.clone());
        order
    }
}

/// 確定した車両購入と、追加された所有車両
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedPurchase {
    pub order: Order,
    pub ownership: OwnedVehicle,
}

/// 全明細を検証してから在庫を減らす
///
/// 存在しない部品、0 以下の数量、在庫超過（同じ部品の明細は合算）の明細を集め、
/// 1件でもあれば [`DealershipError::OrderRejected`] で注文全体を拒否する。
pub fn commit_parts_order(
    ledger: &mut Ledger,
    book: &mut OrderBook,
    req: PartsOrderRequest,
) -> Result<Order, DealershipError> {
    if req.items.is_empty() {
        return Err(DealershipError::validation("order has no items"));
    }

    let requested = sum_by_part(&req.items);
    let mut rejected: Vec<PartId> = Vec::new();
    for item in &req.items {
        let total = requested
            .iter()
            .find(|(id, _)| *id == item.id)
            .map_or(item.quantity, |(_, total)| *total);
        let failed = item.quantity < 1 || ledger.check(item.id, total).is_err();
        if failed && !rejected.contains(&item.id) {
            rejected.push(item.id);
        }
    }
    if !rejected.is_empty() {
        return Err(DealershipError::OrderRejected(rejected));
    }

    for (id, total) in &requested {
        let quantity = u32::try_from(*total).map_err(|_| DealershipError::InvalidQuantity {
            quantity: *total,
            max: u32::MAX,
        })?;
        let remaining = ledger.decrement(*id, quantity)?;
        if remaining == 0 {
            info!("Part sold out and removed: part_id={}", id);
        }
    }

    let order = book.append(
        req.client_id,
        req.date.unwrap_or_else(today),
        req.price,
        OrderKind::Parts(PartsOrder {
            auto_id: req.auto_id,
            items: req.items,
        }),
    );
    info!(
        "Parts order committed: order_id={}, client_id={}, lines={}",
        order.id,
        order.client_id,
        requested.len()
    );
    Ok(order)
}

/// 車両購入を記録（顧客に車両を追加し、購入注文を追記）。再送すると所有が重複する
pub fn commit_vehicle_purchase(
    clients: &mut [Client],
    vehicles: &[Vehicle],
    book: &mut OrderBook,
    req: VehiclePurchaseRequest,
) -> Result<CommittedPurchase, DealershipError> {
    let client = clients
        .iter_mut()
        .find(|c| c.id == req.client_id)
        .ok_or_else(|| DealershipError::not_found("Client", req.client_id))?;
    let vehicle = vehicles
        .iter()
        .find(|v| v.id == req.auto_id)
        .ok_or_else(|| DealershipError::not_found("Vehicle", req.auto_id))?;

    let ownership = vehicle.ownership();
    client.autos.push(ownership.clone());

    let order = book.append(
        req.client_id,
        req.date.unwrap_or_else(today),
        req.price,
        OrderKind::VehiclePurchase(VehiclePurchase {
            auto_buy: PurchaseTag,
            auto_id: vehicle.id,
            model_type: req.model_type.unwrap_or_else(|| vehicle.model_type.clone()),
            year: req.year.unwrap_or(vehicle.year),
        }),
    );
    info!(
        "Vehicle purchase committed: order_id={}, client_id={}, vehicle_id={}",
        order.id, order.client_id, vehicle.id
    );
    Ok(CommittedPurchase { order, ownership })
}

fn sum_by_part(items: &[OrderItem]) -> Vec<(PartId, i64)> {
    let mut totals: Vec<(PartId, i64)> = Vec::new();
    for item in items {
        match totals.iter_mut().find(|(id, _)| *id == item.id) {
            Some((_, total)) => *total = total.saturating_add(item.quantity),
            None => totals.push((item.id, item.quantity)),
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PartRequest;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        for (name, quantity) in [("glass", 3), ("lamp", 5), ("tyres", 15)] {
            ledger.insert(PartRequest {
                name: name.to_string(),
                description: String::new(),
                compatible_models: vec!["BMW X5".to_string()],
                price: 100.0,
                quantity,
            });
        }
        ledger
    }

    fn parts_request(items: Vec<(PartId, i64)>) -> PartsOrderRequest {
        PartsOrderRequest {
            client_id: 1,
            auto_id: Some(10),
            date: Some("01.02.2024".to_string()),
            items: items
                .into_iter()
                .map(|(id, quantity)| OrderItem { id, quantity })
                .collect(),
            price: 0.0,
        }
    }

    fn stock(ledger: &Ledger) -> Vec<(PartId, u32)> {
        ledger.list().iter().map(|p| (p.id, p.quantity)).collect()
    }

    #[test]
    fn test_empty_book_assigns_one() {
        assert_eq!(OrderBook::new().next_id(), 1);
    }

    #[test]
    fn test_parts_order_decrements_and_removes_exhausted() {
        let mut ledger = ledger();
        let mut book = OrderBook::new();

        let order = commit_parts_order(&mut ledger, &mut book, parts_request(vec![(1, 3), (2, 2)]))
            .unwrap();

        assert_eq!(order.id, 1);
        assert!(ledger.find_by_id(1).is_none());
        assert_eq!(ledger.find_by_id(2).unwrap().quantity, 3);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_rejected_order_changes_nothing() {
        let mut ledger = ledger();
        let mut book = OrderBook::new();
        let before = stock(&ledger);

        let err = commit_parts_order(
            &mut ledger,
            &mut book,
            parts_request(vec![(2, 1), (1, 4), (42, 1)]),
        )
        .unwrap_err();

        assert_eq!(err, DealershipError::OrderRejected(vec![1, 42]));
        assert_eq!(stock(&ledger), before);
        assert!(book.is_empty());
    }

    #[test]
    fn test_duplicate_lines_are_validated_together() {
        let mut ledger = ledger();
        let mut book = OrderBook::new();

        let err = commit_parts_order(&mut ledger, &mut book, parts_request(vec![(1, 2), (1, 2)]))
            .unwrap_err();
        assert_eq!(err, DealershipError::OrderRejected(vec![1]));
        assert_eq!(ledger.find_by_id(1).unwrap().quantity, 3);
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        let mut ledger = ledger();
        let mut book = OrderBook::new();

        let err = commit_parts_order(&mut ledger, &mut book, parts_request(vec![(2, 0), (3, -4)]))
            .unwrap_err();
        assert_eq!(err, DealershipError::OrderRejected(vec![2, 3]));
        assert_eq!(ledger.find_by_id(3).unwrap().quantity, 15);
    }

    #[test]
    fn test_empty_order_is_invalid() {
        let mut ledger = ledger();
        let mut book = OrderBook::new();
        let result = commit_parts_order(&mut ledger, &mut book, parts_request(vec![]));
        assert!(matches!(result, Err(DealershipError::Validation(_))));
    }

    #[test]
    fn test_order_ids_increase_by_one() {
        let mut ledger = ledger();
        let mut book = OrderBook::new();
        let first = commit_parts_order(&mut ledger, &mut book, parts_request(vec![(3, 1)])).unwrap();
        let second = commit_parts_order(&mut ledger, &mut book, parts_request(vec![(3, 1)])).unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    fn purchase_request(client_id: ClientId, auto_id: u64) -> VehiclePurchaseRequest {
        VehiclePurchaseRequest {
            client_id,
            auto_id,
            date: None,
            price: 20000.0,
            model_type: None,
            year: None,
        }
    }

    fn registry() -> (Vec<Client>, Vec<Vehicle>) {
        let clients = vec![Client {
            id: 5,
            name: "Ivan".to_string(),
            phone: "+7 900 000 00 00".to_string(),
            autos: Vec::new(),
        }];
        let vehicles = vec![Vehicle {
            id: 9,
            brand: "BMW".to_string(),
            model_type: "BMW X5".to_string(),
            year: 2021,
            price: 20000.0,
        }];
        (clients, vehicles)
    }

    #[test]
    fn test_vehicle_purchase_records_ownership() {
        let (mut clients, vehicles) = registry();
        let mut book = OrderBook::new();

        let committed =
            commit_vehicle_purchase(&mut clients, &vehicles, &mut book, purchase_request(5, 9))
                .unwrap();

        assert_eq!(clients[0].autos, vec![committed.ownership.clone()]);
        assert_eq!(committed.ownership.id, 9);
        assert!(committed.order.is_vehicle_purchase());
        assert_eq!(book.vehicle_purchases().len(), 1);
        match committed.order.kind {
            OrderKind::VehiclePurchase(purchase) => {
                assert_eq!(purchase.model_type, "BMW X5");
                assert_eq!(purchase.year, 2021);
            }
            OrderKind::Parts(_) => panic!("expected vehicle purchase"),
        }
    }

    #[test]
    fn test_vehicle_purchase_unknown_ids() {
        let (mut clients, vehicles) = registry();
        let mut book = OrderBook::new();

        let err = commit_vehicle_purchase(&mut clients, &vehicles, &mut book, purchase_request(6, 9))
            .unwrap_err();
        assert!(matches!(err, DealershipError::NotFound { entity: "Client", .. }));

        let err = commit_vehicle_purchase(&mut clients, &vehicles, &mut book, purchase_request(5, 1))
            .unwrap_err();
        assert!(matches!(err, DealershipError::NotFound { entity: "Vehicle", .. }));

        assert!(clients[0].autos.is_empty());
        assert!(book.is_empty());
    }

    #[test]
    fn test_resubmitted_purchase_duplicates_ownership() {
        let (mut clients, vehicles) = registry();
        let mut book = OrderBook::new();
        for _ in 0..2 {
            commit_vehicle_purchase(&mut clients, &vehicles, &mut book, purchase_request(5, 9))
                .unwrap();
        }
        assert_eq!(clients[0].autos.len(), 2);
        assert_eq!(book.list().iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
