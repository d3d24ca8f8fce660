//! 庫存模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::MaterialType;

/// 庫存池（成品、半成品、原料分開管理）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryPool {
    Finished,
    SemiFinished,
    Raw,
}

impl InventoryPool {
    /// 物料類型對應的庫存池；未知類型沒有庫存池
    pub fn for_type(material_type: MaterialType) -> Option<Self> {
        match material_type {
            MaterialType::Finished => Some(InventoryPool::Finished),
            MaterialType::SemiFinished => Some(InventoryPool::SemiFinished),
            MaterialType::Raw => Some(InventoryPool::Raw),
            MaterialType::Unknown => None,
        }
    }
}

/// 庫存狀態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    /// 物料ID
    pub material_id: String,

    /// 現有庫存
    pub on_hand_qty: Decimal,

    /// 庫存池
    pub pool: InventoryPool,
}

impl Inventory {
    /// 創建新的庫存記錄
    pub fn new(material_id: impl Into<String>, on_hand_qty: Decimal, pool: InventoryPool) -> Self {
        Self {
            material_id: material_id.into(),
            on_hand_qty,
            pool,
        }
    }
}

/// 庫存帳（按庫存池查詢期初庫存）
#[derive(Debug, Clone, Default)]
pub struct InventoryBook {
    entries: HashMap<(InventoryPool, String), Decimal>,
}

impl InventoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登記庫存；同一庫存池的同一物料以第一筆為準
    pub fn insert(&mut self, inventory: Inventory) {
        self.entries
            .entry((inventory.pool, inventory.material_id))
            .or_insert(inventory.on_hand_qty);
    }

    /// 查詢庫存，沒有記錄時視為 0
    pub fn on_hand(&self, pool: InventoryPool, material_id: &str) -> Decimal {
        self.entries
            .get(&(pool, material_id.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Inventory> for InventoryBook {
    fn from_iter<T: IntoIterator<Item = Inventory>>(iter: T) -> Self {
        let mut book = InventoryBook::new();
        for inventory in iter {
            book.insert(inventory);
        }
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_are_separate() {
        let book: InventoryBook = vec![
            Inventory::new("M-01", Decimal::from(40), InventoryPool::Raw),
            Inventory::new("M-01", Decimal::from(7), InventoryPool::SemiFinished),
        ]
        .into_iter()
        .collect();

        assert_eq!(book.on_hand(InventoryPool::Raw, "M-01"), Decimal::from(40));
        assert_eq!(
            book.on_hand(InventoryPool::SemiFinished, "M-01"),
            Decimal::from(7)
        );
        assert_eq!(book.on_hand(InventoryPool::Finished, "M-01"), Decimal::ZERO);
    }

    #[test]
    fn test_first_record_wins() {
        let book: InventoryBook = vec![
            Inventory::new("R001", Decimal::from(10), InventoryPool::Raw),
            Inventory::new("R001", Decimal::from(99), InventoryPool::Raw),
        ]
        .into_iter()
        .collect();

        assert_eq!(book.on_hand(InventoryPool::Raw, "R001"), Decimal::from(10));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_unknown_type_has_no_pool() {
        assert_eq!(InventoryPool::for_type(MaterialType::Unknown), None);
        assert_eq!(
            InventoryPool::for_type(MaterialType::Raw),
            Some(InventoryPool::Raw)
        );
    }
}
