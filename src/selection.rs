//! Selection Context
//! 選択中の顧客・所有車両・購入対象車両の状態遷移
//!
//! 変更はすべて [`transition`] を通す。戻り値は次の状態と、呼び出し側が実行する
//! 副作用（所有車両の取得、カートのクリア、カタログ再計算、通知）。

use serde::{Deserialize, Serialize};

use crate::error::DealershipError;
use crate::models::{Client, ClientId, OwnedVehicle, Vehicle, VehicleId};

/// トースト表示時間
pub const TOAST_DURATION_MS: u64 = 1500;
/// ハイライト表示時間
pub const CUE_DURATION_MS: u64 = 2000;

// ========================================
// Notices
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Change,
}

/// ハイライト対象の画面領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CueTarget {
    ClientSelection,
    VehicleSelection,
    PartsSelection,
    OrderSelection,
}

/// 一時的な通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notice {
    #[serde(rename_all = "camelCase")]
    Toast {
        kind: ToastKind,
        message: String,
        duration_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Highlight { target: CueTarget, duration_ms: u64 },
}

impl Notice {
    pub fn toast(kind: ToastKind, message: impl Into<String>) -> Self {
        Notice::Toast {
            kind,
            message: message.into(),
            duration_ms: TOAST_DURATION_MS,
        }
    }

    pub fn highlight(target: CueTarget) -> Self {
        Notice::Highlight {
            target,
            duration_ms: CUE_DURATION_MS,
        }
    }
}

// ========================================
// Context
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    Idle,
    ClientOnly,
    ClientAndVehicle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    pub selected_client: Option<Client>,
    /// 選択中の顧客の所有車両（キャッシュ）
    pub client_vehicles: Vec<OwnedVehicle>,
    pub selected_vehicle: Option<OwnedVehicle>,
    pub vehicle_to_buy: Option<Vehicle>,
}

impl SelectionContext {
    pub fn mode(&self) -> SelectionMode {
        match (&self.selected_client, &self.selected_vehicle) {
            (None, _) => SelectionMode::Idle,
            (Some(_), None) => SelectionMode::ClientOnly,
            (Some(_), Some(_)) => SelectionMode::ClientAndVehicle,
        }
    }

    pub fn purchase_pending(&self) -> bool {
        self.vehicle_to_buy.is_some()
    }

    pub fn client_id(&self) -> Option<ClientId> {
        self.selected_client.as_ref().map(|c| c.id)
    }

    /// カタログを絞り込む車種
    pub fn catalog_model(&self) -> Option<&str> {
        self.selected_vehicle.as_ref().map(|v| v.model_type.as_str())
    }
}

// ========================================
// Events / Effects
// ========================================

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    SelectClient(Client),
    ClearClient,
    /// [`Effect::FetchClientVehicles`] の結果
    ClientVehiclesLoaded(Vec<OwnedVehicle>),
    SelectVehicle(VehicleId),
    ClearVehicle,
    DesignatePurchase(Vehicle),
    CancelPurchase,
    PurchaseCommitted(OwnedVehicle),
    PartsOrderCommitted,
    /// カート追加前のチェック
    CartAddRequested,
}

/// 遷移が要求する副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchClientVehicles(ClientId),
    ClearCart,
    RefreshCatalog(Option<String>),
    Notify(Notice),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted,
    Rejected(DealershipError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub context: SelectionContext,
    pub effects: Vec<Effect>,
    pub outcome: Outcome,
}

impl Transition {
    fn accepted(context: SelectionContext, effects: Vec<Effect>) -> Self {
        Self {
            context,
            effects,
            outcome: Outcome::Accepted,
        }
    }

    fn rejected(context: &SelectionContext, error: DealershipError, effects: Vec<Effect>) -> Self {
        Self {
            context: context.clone(),
            effects,
            outcome: Outcome::Rejected(error),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted)
    }
}

/// イベントを1つ適用
pub fn transition(context: &SelectionContext, event: SelectionEvent) -> Transition {
    match event {
        SelectionEvent::SelectClient(client) => {
            let client_id = client.id;
            let next = SelectionContext {
                selected_client: Some(client),
                ..SelectionContext::default()
            };
            Transition::accepted(
                next,
                vec![
                    Effect::ClearCart,
                    Effect::RefreshCatalog(None),
                    Effect::FetchClientVehicles(client_id),
                ],
            )
        }

        SelectionEvent::ClearClient => Transition::accepted(
            SelectionContext::default(),
            vec![Effect::ClearCart, Effect::RefreshCatalog(None)],
        ),

        SelectionEvent::ClientVehiclesLoaded(vehicles) => {
            // 顧客が解除済みなら古い取得結果は捨てる
            if context.selected_client.is_none() {
                return Transition::accepted(context.clone(), Vec::new());
            }
            let mut next = context.clone();
            next.client_vehicles = vehicles;
            Transition::accepted(next, Vec::new())
        }

        SelectionEvent::SelectVehicle(vehicle_id) => {
            if context.selected_client.is_none() {
                return reject_without_client(context);
            }
            let Some(vehicle) = context
                .client_vehicles
                .iter()
                .find(|v| v.id == vehicle_id)
                .cloned()
            else {
                let error = DealershipError::not_found("Owned vehicle", vehicle_id);
                let message = error.to_string();
                return Transition::rejected(
                    context,
                    error,
                    vec![Effect::Notify(Notice::toast(ToastKind::Error, message))],
                );
            };

            let model = vehicle.model_type.clone();
            let mut next = context.clone();
            next.selected_vehicle = Some(vehicle);
            Transition::accepted(
                next,
                vec![
                    Effect::ClearCart,
                    Effect::RefreshCatalog(Some(model)),
                    Effect::Notify(Notice::toast(
                        ToastKind::Change,
                        "Parts loaded for the selected vehicle",
                    )),
                    Effect::Notify(Notice::highlight(CueTarget::PartsSelection)),
                ],
            )
        }

        SelectionEvent::ClearVehicle => {
            let mut next = context.clone();
            next.selected_vehicle = None;
            Transition::accepted(next, vec![Effect::ClearCart, Effect::RefreshCatalog(None)])
        }

        SelectionEvent::DesignatePurchase(vehicle) => {
            if context.selected_client.is_none() {
                return reject_without_client(context);
            }
            let mut next = context.clone();
            next.vehicle_to_buy = Some(vehicle);
            Transition::accepted(
                next,
                vec![
                    Effect::ClearCart,
                    Effect::Notify(Notice::toast(ToastKind::Change, "Vehicle added to the order")),
                    Effect::Notify(Notice::highlight(CueTarget::OrderSelection)),
                ],
            )
        }

        SelectionEvent::CancelPurchase => {
            let mut next = context.clone();
            next.vehicle_to_buy = None;
            Transition::accepted(next, Vec::new())
        }

        SelectionEvent::PurchaseCommitted(ownership) => {
            let mut next = context.clone();
            next.vehicle_to_buy = None;
            if let Some(client) = next.selected_client.as_mut() {
                client.autos.push(ownership.clone());
                next.client_vehicles.push(ownership);
            }
            Transition::accepted(
                next,
                vec![Effect::Notify(Notice::toast(
                    ToastKind::Success,
                    "Order placed, vehicle added to the client",
                ))],
            )
        }

        SelectionEvent::PartsOrderCommitted => Transition::accepted(
            context.clone(),
            vec![
                Effect::ClearCart,
                Effect::RefreshCatalog(context.catalog_model().map(str::to_string)),
                Effect::Notify(Notice::toast(ToastKind::Success, "Order placed")),
            ],
        ),

        SelectionEvent::CartAddRequested => {
            if context.selected_client.is_none() || context.selected_vehicle.is_none() {
                let error = DealershipError::SelectionRequired("a client and their vehicle");
                let message = error.to_string();
                return Transition::rejected(
                    context,
                    error,
                    vec![
                        Effect::Notify(Notice::toast(ToastKind::Info, message)),
                        Effect::Notify(Notice::highlight(CueTarget::VehicleSelection)),
                    ],
                );
            }
            if context.purchase_pending() {
                let error = DealershipError::validation(
                    "finish or cancel the vehicle purchase before adding parts",
                );
                let message = error.to_string();
                return Transition::rejected(
                    context,
                    error,
                    vec![Effect::Notify(Notice::toast(ToastKind::Info, message))],
                );
            }
            Transition::accepted(context.clone(), Vec::new())
        }
    }
}

fn reject_without_client(context: &SelectionContext) -> Transition {
    Transition::rejected(
        context,
        DealershipError::SelectionRequired("a client"),
        vec![
            Effect::Notify(Notice::toast(
                ToastKind::Info,
                "Select a client in the Clients block first",
            )),
            Effect::Notify(Notice::highlight(CueTarget::ClientSelection)),
        ],
    )
}
