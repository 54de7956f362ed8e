//! Error Types
//! ドメインエラー定義

use thiserror::Error;

/// ドメイン・API クライアント共通のエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DealershipError {
    /// 顧客・車両・部品・注文・セッションが存在しない
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// 在庫不足
    #[error("Insufficient stock for part {part_id}: requested {requested}, available {available}")]
    InsufficientStock {
        part_id: u64,
        requested: i64,
        available: u32,
    },

    /// 0 以下、または上限を超える数量
    #[error("Invalid quantity {quantity} (allowed 1..={max})")]
    InvalidQuantity { quantity: i64, max: u32 },

    /// 在庫・存在チェックに失敗した明細がある
    #[error("Parts with ids {} not found or stock is insufficient", join_ids(.0))]
    OrderRejected(Vec<u64>),

    /// サーバに接続できない
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// 必要な選択がされていない
    #[error("Select {0} first")]
    SelectionRequired(&'static str),

    /// 入力不正
    #[error("Validation error: {0}")]
    Validation(String),
}

impl DealershipError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
