//! Inventory Ledger
//! 部品と在庫数の台帳
//!
//! [`Ledger::decrement`] で在庫が 0 になった部品は台帳から削除され、
//! 一覧にも車種フィルタにも現れなくなる。

use crate::error::DealershipError;
use crate::models::{Part, PartId, PartRequest, PriceRange};

/// 部品台帳（登録順）
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    parts: Vec<Part>,
    last_id: PartId,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の部品から台帳を作る（ID はそのまま）
    pub fn from_parts(parts: Vec<Part>) -> Self {
        let last_id = parts.iter().map(|p| p.id).max().unwrap_or(0);
        Self { parts, last_id }
    }

    pub fn list(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn find_by_id(&self, id: PartId) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }

    /// 対応車種に `model` を完全一致で含む部品（価格範囲は両端を含む）
    pub fn list_by_model(&self, model: &str, range: &PriceRange) -> Vec<Part> {
        self.parts
            .iter()
            .filter(|p| p.fits(model) && p.priced_within(range))
            .cloned()
            .collect()
    }

    /// 全部品の対応車種（重複なし、出現順）
    pub fn all_models(&self) -> Vec<String> {
        let mut models: Vec<String> = Vec::new();
        for model in self.parts.iter().flat_map(|p| p.compatible_models.iter()) {
            if !models.contains(model) {
                models.push(model.clone());
            }
        }
        models
    }

    /// 在庫を変更せずに `quantity` 個取り出せるか確認
    pub fn check(&self, id: PartId, quantity: i64) -> Result<&Part, DealershipError> {
        let part = self.find_by_id(id).ok_or(DealershipError::InsufficientStock {
            part_id: id,
            requested: quantity,
            available: 0,
        })?;
        if quantity > i64::from(part.quantity) {
            return Err(DealershipError::InsufficientStock {
                part_id: id,
                requested: quantity,
                available: part.quantity,
            });
        }
        Ok(part)
    }

    /// 在庫を減らして残数を返す。0 になった部品は削除
    pub fn decrement(&mut self, id: PartId, quantity: u32) -> Result<u32, DealershipError> {
        let index = self
            .parts
            .iter()
            .position(|p| p.id == id)
            .ok_or(DealershipError::InsufficientStock {
                part_id: id,
                requested: i64::from(quantity),
                available: 0,
            })?;

        let part = &mut self.parts[index];
        if quantity > part.quantity {
            return Err(DealershipError::InsufficientStock {
                part_id: id,
                requested: i64::from(quantity),
                available: part.quantity,
            });
        }

        part.quantity -= quantity;
        let remaining = part.quantity;
        if remaining == 0 {
            self.parts.remove(index);
        }
        Ok(remaining)
    }

    pub fn insert(&mut self, req: PartRequest) -> Part {
        self.last_id += 1;
        let part = Part {
            id: self.last_id,
            name: req.name,
            description: req.description,
            compatible_models: dedup_models(req.compatible_models),
            price: req.price,
            quantity: req.quantity,
        };
        self.parts.push(part.clone());
        part
    }

    /// 部品を全置換（ID は維持）
    pub fn replace(&mut self, id: PartId, req: PartRequest) -> Option<Part> {
        let part = self.parts.iter_mut().find(|p| p.id == id)?;
        *part = Part {
            id,
            name: req.name,
            description: req.description,
            compatible_models: dedup_models(req.compatible_models),
            price: req.price,
            quantity: req.quantity,
        };
        Some(part.clone())
    }

    pub fn remove(&mut self, id: PartId) -> Option<Part> {
        let index = self.parts.iter().position(|p| p.id == id)?;
        Some(self.parts.remove(index))
    }
}

fn dedup_models(models: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(models.len());
    for model in models {
        if !out.contains(&model) {
            out.push(model);
        }
    }
    out
}
