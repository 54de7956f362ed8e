//! Cart Builder
//! 選択中の顧客・車両に対する未確定の部品注文
//!
//! 部品ごとに1行。同じ部品を追加すると数量を合算する。

use serde::{Deserialize, Serialize};

use crate::error::DealershipError;
use crate::models::{OrderItem, Part, PartId};

/// カートの行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub id: PartId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    /// 最初に追加した時点の在庫数
    pub max_quantity: u32,
}

impl CartEntry {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// [`Cart::add`] の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Increased,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn get(&self, part_id: PartId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id == part_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 部品を `quantity` 個追加
    ///
    /// 以下の場合はエラー:
    /// - `quantity` が `1..=part.quantity` の範囲外
    /// - 合算後の数量が `max_quantity` を超える
    pub fn add(&mut self, part: &Part, quantity: i64) -> Result<CartChange, DealershipError> {
        if quantity < 1 || quantity > i64::from(part.quantity) {
            return Err(DealershipError::InvalidQuantity {
                quantity,
                max: part.quantity,
            });
        }

        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == part.id) {
            let max = existing.max_quantity;
            let summed = existing
                .quantity
                .checked_add(quantity)
                .filter(|summed| *summed <= i64::from(max))
                .ok_or(DealershipError::InvalidQuantity {
                    quantity: existing.quantity.saturating_add(quantity),
                    max,
                })?;
            existing.quantity = summed;
            return Ok(CartChange::Increased);
        }

        self.entries.push(CartEntry {
            id: part.id,
            name: part.name.clone(),
            price: part.price,
            quantity,
            max_quantity: part.quantity,
        });
        Ok(CartChange::Added)
    }

    /// 数量を上書き（範囲チェックなし。範囲外の値は注文確定時に弾かれる）
    pub fn set_quantity(&mut self, part_id: PartId, quantity: i64) -> Result<(), DealershipError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == part_id)
            .ok_or_else(|| DealershipError::not_found("Cart entry", part_id))?;
        entry.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, part_id: PartId) -> Result<CartEntry, DealershipError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == part_id)
            .ok_or_else(|| DealershipError::not_found("Cart entry", part_id))?;
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    pub fn to_order_items(&self) -> Vec<OrderItem> {
        self.entries
            .iter()
            .map(|e| OrderItem {
                id: e.id,
                quantity: e.quantity,
            })
            .collect()
    }
}
