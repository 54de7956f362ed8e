//! Catalog Filter
//! 選択中の車両で購入できる部品の導出

use crate::inventory::Ledger;
use crate::models::{OwnedVehicle, Part, PriceRange};

/// `vehicle` に対応する部品（未選択なら全部品）。価格範囲でさらに絞り込む
pub fn purchasable_parts(
    ledger: &Ledger,
    vehicle: Option<&OwnedVehicle>,
    range: &PriceRange,
) -> Vec<Part> {
    match vehicle {
        Some(vehicle) => ledger.list_by_model(&vehicle.model_type, range),
        None => ledger
            .list()
            .iter()
            .filter(|p| p.priced_within(range))
            .cloned()
            .collect(),
    }
}
