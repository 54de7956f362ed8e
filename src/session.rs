//! Session Workflow
//! 選択状態とカートを持つサーバ側セッション
//!
//! イベントを [`transition`] に渡し、返ってきた副作用をストアに対して実行する。
//! 注文確定は Order Committer を通す。

use std::collections::VecDeque;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::cart::{Cart, CartChange, CartEntry};
use crate::catalog::purchasable_parts;
use crate::db::Dealership;
use crate::error::DealershipError;
use crate::models::{
    ClientId, Order, Part, PartId, PartsOrderRequest, PriceRange, VehicleId,
    VehiclePurchaseRequest,
};
use crate::orders::{commit_parts_order, commit_vehicle_purchase};
use crate::selection::{
    transition, CueTarget, Effect, Notice, Outcome, SelectionContext, SelectionEvent,
    SelectionMode, ToastKind,
};

/// 1操作の結果と通知
#[derive(Debug, Clone, PartialEq)]
pub struct Step<T = ()> {
    pub notices: Vec<Notice>,
    pub result: Result<T, DealershipError>,
}

impl<T> Step<T> {
    fn rejected(error: DealershipError, notices: Vec<Notice>) -> Self {
        Self {
            notices,
            result: Err(error),
        }
    }

    /// エラートーストのみの拒否
    fn failed(error: DealershipError) -> Self {
        let notice = Notice::toast(ToastKind::Error, error.to_string());
        Self::rejected(error, vec![notice])
    }

    /// 通知なしの成功
    pub fn done(value: T) -> Self {
        Self {
            notices: Vec::new(),
            result: Ok(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        Step {
            notices: self.notices,
            result: self.result.map(f),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    selection: SelectionContext,
    cart: Cart,
    catalog_model: Option<String>,
}

/// セッション状態のレスポンス表現
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub mode: SelectionMode,
    pub purchase_pending: bool,
    #[serde(flatten)]
    pub selection: SelectionContext,
    pub catalog_model: Option<String>,
    pub cart: Vec<CartEntry>,
    pub cart_total: f64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            selection: SelectionContext::default(),
            cart: Cart::new(),
            catalog_model: None,
        }
    }

    pub fn selection(&self) -> &SelectionContext {
        &self.selection
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            mode: self.selection.mode(),
            purchase_pending: self.selection.purchase_pending(),
            selection: self.selection.clone(),
            catalog_model: self.catalog_model.clone(),
            cart: self.cart.entries().to_vec(),
            cart_total: self.cart.total(),
        }
    }

    /// 選択中の車両で購入できる部品
    pub fn catalog(&self, db: &Dealership, range: &PriceRange) -> Vec<Part> {
        purchasable_parts(&db.ledger, self.selection.selected_vehicle.as_ref(), range)
    }

    // ========================================
    // Selection
    // ========================================

    /// 顧客を選択（`None` で解除）
    pub fn select_client(&mut self, db: &Dealership, client_id: Option<ClientId>) -> Step {
        match client_id {
            None => self.dispatch(SelectionEvent::ClearClient, db),
            Some(id) => match db.client(id) {
                Ok(client) => self.dispatch(SelectionEvent::SelectClient(client.clone()), db),
                Err(e) => Step::failed(e),
            },
        }
    }

    /// 所有車両を選択（`None` で解除）
    pub fn select_vehicle(&mut self, db: &Dealership, vehicle_id: Option<VehicleId>) -> Step {
        let event = match vehicle_id {
            None => SelectionEvent::ClearVehicle,
            Some(id) => SelectionEvent::SelectVehicle(id),
        };
        self.dispatch(event, db)
    }

    /// 購入対象の車両を指定（`None` で取消）
    pub fn designate_purchase(&mut self, db: &Dealership, vehicle_id: Option<VehicleId>) -> Step {
        match vehicle_id {
            None => self.dispatch(SelectionEvent::CancelPurchase, db),
            // 顧客未選択なら車両の存在より先にその案内を出す
            Some(_) if self.selection.selected_client.is_none() => Step::rejected(
                DealershipError::SelectionRequired("a client"),
                vec![
                    Notice::toast(ToastKind::Info, "Select a client in the Clients block first"),
                    Notice::highlight(CueTarget::ClientSelection),
                ],
            ),
            Some(id) => match db.vehicle(id) {
                Ok(vehicle) => self.dispatch(SelectionEvent::DesignatePurchase(vehicle.clone()), db),
                Err(e) => Step::failed(e),
            },
        }
    }

    // ========================================
    // Cart
    // ========================================

    pub fn add_to_cart(&mut self, db: &Dealership, part_id: PartId, quantity: i64) -> Step {
        let guard = self.dispatch(SelectionEvent::CartAddRequested, db);
        if !guard.is_ok() {
            return guard;
        }

        let part = match db.ledger.find_by_id(part_id) {
            Some(part) => part,
            None => return Step::failed(DealershipError::not_found("Part", part_id)),
        };
        if let Some(model) = self.selection.catalog_model() {
            if !part.fits(model) {
                return Step::rejected(
                    DealershipError::validation(format!(
                        "part {} does not fit {}",
                        part.id, model
                    )),
                    vec![
                        Notice::toast(ToastKind::Info, "This part does not fit the selected vehicle"),
                        Notice::highlight(CueTarget::PartsSelection),
                    ],
                );
            }
        }

        match self.cart.add(part, quantity) {
            Ok(CartChange::Added) => Step {
                notices: vec![Notice::toast(ToastKind::Change, "Part added to the order")],
                result: Ok(()),
            },
            Ok(CartChange::Increased) => Step {
                notices: vec![Notice::toast(
                    ToastKind::Change,
                    "Part quantity in the order increased",
                )],
                result: Ok(()),
            },
            Err(e) => Step::rejected(e, vec![Notice::toast(ToastKind::Info, "Invalid quantity")]),
        }
    }

    pub fn set_cart_quantity(&mut self, part_id: PartId, quantity: i64) -> Step {
        match self.cart.set_quantity(part_id, quantity) {
            Ok(()) => Step::done(()),
            Err(e) => Step::failed(e),
        }
    }

    pub fn remove_from_cart(&mut self, part_id: PartId) -> Step {
        match self.cart.remove(part_id) {
            Ok(_) => Step::done(()),
            Err(e) => Step::failed(e),
        }
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // ========================================
    // Checkout
    // ========================================

    /// カートを部品注文として確定。失敗時はカートも在庫もそのまま
    pub fn checkout_parts(&mut self, db: &mut Dealership, date: Option<String>) -> Step<Order> {
        let (Some(client_id), Some(vehicle)) = (
            self.selection.client_id(),
            self.selection.selected_vehicle.as_ref(),
        ) else {
            return Step::rejected(
                DealershipError::SelectionRequired("a client and their vehicle"),
                vec![
                    Notice::toast(ToastKind::Info, "A client and their vehicle must be selected"),
                    Notice::highlight(CueTarget::VehicleSelection),
                ],
            );
        };
        if self.cart.is_empty() {
            return Step::rejected(
                DealershipError::validation("cart is empty"),
                vec![Notice::toast(ToastKind::Info, "Add parts to the order first")],
            );
        }

        let req = PartsOrderRequest {
            client_id,
            auto_id: Some(vehicle.id),
            date,
            items: self.cart.to_order_items(),
            price: self.cart.total(),
        };
        match commit_parts_order(&mut db.ledger, &mut db.orders, req) {
            Ok(order) => {
                let step = self.dispatch(SelectionEvent::PartsOrderCommitted, db);
                Step {
                    notices: step.notices,
                    result: Ok(order),
                }
            }
            Err(e) => {
                let message = format!("Order failed: {e}");
                Step::rejected(e, vec![Notice::toast(ToastKind::Error, message)])
            }
        }
    }

    /// 購入対象の車両を確定
    pub fn checkout_purchase(&mut self, db: &mut Dealership, date: Option<String>) -> Step<Order> {
        let (Some(client_id), Some(vehicle)) = (
            self.selection.client_id(),
            self.selection.vehicle_to_buy.as_ref(),
        ) else {
            return Step::rejected(
                DealershipError::SelectionRequired("a client and a vehicle to buy"),
                vec![
                    Notice::toast(ToastKind::Info, "Select a client and a vehicle to buy"),
                    Notice::highlight(CueTarget::ClientSelection),
                ],
            );
        };

        let req = VehiclePurchaseRequest {
            client_id,
            auto_id: vehicle.id,
            date,
            price: vehicle.price,
            model_type: Some(vehicle.model_type.clone()),
            year: Some(vehicle.year),
        };
        match commit_vehicle_purchase(&mut db.clients, &db.vehicles, &mut db.orders, req) {
            Ok(committed) => {
                let step = self.dispatch(SelectionEvent::PurchaseCommitted(committed.ownership), db);
                Step {
                    notices: step.notices,
                    result: Ok(committed.order),
                }
            }
            Err(e) => {
                let message = format!("Order failed: {e}");
                Step::rejected(e, vec![Notice::toast(ToastKind::Error, message)])
            }
        }
    }

    // ========================================
    // Effects
    // ========================================

    fn dispatch(&mut self, event: SelectionEvent, db: &Dealership) -> Step {
        let mut notices = Vec::new();
        let mut result = Ok(());
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let step = transition(&self.selection, event);
            self.selection = step.context;
            if let Outcome::Rejected(e) = step.outcome {
                if result.is_ok() {
                    result = Err(e);
                }
            }

            for effect in step.effects {
                match effect {
                    Effect::ClearCart => self.cart.clear(),
                    Effect::RefreshCatalog(model) => self.catalog_model = model,
                    Effect::Notify(notice) => notices.push(notice),
                    Effect::FetchClientVehicles(id) => match db.client(id) {
                        Ok(client) => {
                            queue.push_back(SelectionEvent::ClientVehiclesLoaded(client.autos.clone()))
                        }
                        Err(e) => notices.push(Notice::toast(ToastKind::Error, e.to_string())),
                    },
                }
            }
        }

        if result.is_ok() {
            info!(
                "Session updated: session_id={}, mode={:?}, cart_lines={}",
                self.id,
                self.selection.mode(),
                self.cart.len()
            );
        }
        Step { notices, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{CreateClientRequest, OrderKind, VehicleRequest};

    /// 顧客1（所有車両: BMW X5）と販売車両2台
    fn store() -> Dealership {
        let mut db = init_db(true);
        let client = db.create_client(CreateClientRequest {
            name: "Ivan".to_string(),
            phone: "111".to_string(),
        });
        db.create_client(CreateClientRequest {
            name: "Olga".to_string(),
            phone: "222".to_string(),
        });
        let x5 = db.create_vehicle(VehicleRequest {
            brand: "BMW".to_string(),
            model_type: "BMW X5".to_string(),
            year: 2021,
            price: 20000.0,
        });
        db.create_vehicle(VehicleRequest {
            brand: "Audi".to_string(),
            model_type: "Audi A4".to_string(),
            year: 2019,
            price: 15000.0,
        });
        db.clients[(client.id - 1) as usize].autos.push(x5.ownership());
        db
    }

    #[test]
    fn test_select_client_loads_vehicles() {
        let db = store();
        let mut session = Session::new();
        assert!(session.select_client(&db, Some(1)).is_ok());
        assert_eq!(session.selection().mode(), SelectionMode::ClientOnly);
        assert_eq!(session.selection().client_vehicles.len(), 1);
    }

    #[test]
    fn test_unknown_client_is_not_found() {
        let db = store();
        let mut session = Session::new();
        let step = session.select_client(&db, Some(99));
        assert!(matches!(step.result, Err(DealershipError::NotFound { .. })));
        assert_eq!(session.selection().mode(), SelectionMode::Idle);
    }

    #[test]
    fn test_add_to_cart_without_client_surfaces_cue() {
        let db = store();
        let mut session = Session::new();
        let step = session.add_to_cart(&db, 7, 1);
        assert!(!step.is_ok());
        assert!(step.notices.iter().any(|n| matches!(n, Notice::Highlight { .. })));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_cart_cleared_on_vehicle_change_and_client_change() {
        let db = store();
        let mut session = Session::new();
        session.select_client(&db, Some(1));
        session.select_vehicle(&db, Some(1));
        assert!(session.add_to_cart(&db, 7, 2).is_ok());
        assert_eq!(session.cart().len(), 1);

        session.select_vehicle(&db, Some(1));
        assert!(session.cart().is_empty());

        session.add_to_cart(&db, 7, 1);
        session.select_client(&db, Some(2));
        assert!(session.cart().is_empty());
        assert!(session.selection().selected_vehicle.is_none());
    }

    #[test]
    fn test_incompatible_part_is_rejected() {
        let db = store();
        let mut session = Session::new();
        session.select_client(&db, Some(1));
        session.select_vehicle(&db, Some(1));
        // 部品1は Nissan Altima / Ford Mustang 用
        let step = session.add_to_cart(&db, 1, 1);
        assert!(matches!(step.result, Err(DealershipError::Validation(_))));
    }

    #[test]
    fn test_checkout_parts_commits_and_clears_cart() {
        let mut db = store();
        let mut session = Session::new();
        session.select_client(&db, Some(1));
        session.select_vehicle(&db, Some(1));
        session.add_to_cart(&db, 7, 3);

        let step = session.checkout_parts(&mut db, None);
        let order = step.result.unwrap();
        assert_eq!(order.price, 450.0);
        assert_eq!(order.vehicle_id(), Some(1));
        assert!(session.cart().is_empty());
        assert_eq!(db.ledger.find_by_id(7).unwrap().quantity, 12);
        assert_eq!(session.view().catalog_model.as_deref(), Some("BMW X5"));
    }

    #[test]
    fn test_checkout_failure_keeps_cart() {
        let mut db = store();
        let mut session = Session::new();
        session.select_client(&db, Some(1));
        session.select_vehicle(&db, Some(1));
        session.add_to_cart(&db, 7, 1);
        session.set_cart_quantity(7, 99);

        let step = session.checkout_parts(&mut db, None);
        assert_eq!(step.result.unwrap_err(), DealershipError::OrderRejected(vec![7]));
        assert_eq!(session.cart().get(7).unwrap().quantity, 99);
        assert_eq!(db.ledger.find_by_id(7).unwrap().quantity, 15);
        assert!(db.orders.is_empty());
    }

    #[test]
    fn test_purchase_flow_updates_cached_vehicles() {
        let mut db = store();
        let mut session = Session::new();
        session.select_client(&db, Some(2));
        assert!(session.designate_purchase(&db, Some(2)).is_ok());
        assert!(session.view().purchase_pending);

        let order = session.checkout_purchase(&mut db, None).result.unwrap();
        assert!(matches!(order.kind, OrderKind::VehiclePurchase(_)));
        assert!(!session.view().purchase_pending);
        assert_eq!(session.selection().client_vehicles.len(), 1);
        assert_eq!(db.client(2).unwrap().autos.len(), 1);

        // 購入した車両はそのまま選択できる
        assert!(session.select_vehicle(&db, Some(2)).is_ok());
    }

    #[test]
    fn test_designate_purchase_without_client_cues_client_selection() {
        let db = store();
        let mut session = Session::new();
        let step = session.designate_purchase(&db, Some(99));
        assert_eq!(
            step.result,
            Err(DealershipError::SelectionRequired("a client"))
        );
        assert!(step
            .notices
            .contains(&Notice::highlight(CueTarget::ClientSelection)));
        assert!(!session.view().purchase_pending);
    }

    #[test]
    fn test_purchase_pending_blocks_cart() {
        let db = store();
        let mut session = Session::new();
        session.select_client(&db, Some(1));
        session.select_vehicle(&db, Some(1));
        session.designate_purchase(&db, Some(2));
        assert!(!session.add_to_cart(&db, 7, 1).is_ok());

        session.designate_purchase(&db, None);
        assert!(session.add_to_cart(&db, 7, 1).is_ok());
    }

    #[test]
    fn test_catalog_follows_selected_vehicle() {
        let db = store();
        let mut session = Session::new();
        assert_eq!(session.catalog(&db, &PriceRange::default()).len(), 10);
        session.select_client(&db, Some(1));
        session.select_vehicle(&db, Some(1));
        let parts = session.catalog(&db, &PriceRange::default());
        assert!(!parts.is_empty());
        assert!(parts.iter().all(|p| p.fits("BMW X5")));
    }
}
