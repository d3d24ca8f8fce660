//! 供應商模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MrpError, Result};

/// 供應商報價
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    /// 物料ID（預設供應商為空字串，適用所有物料）
    pub material_id: String,

    /// 供應商ID
    pub supplier_id: String,

    /// 單價
    pub unit_price: Decimal,

    /// 最小訂購量
    pub min_order_qty: Decimal,

    /// 採購提前期（日曆日）
    pub lead_time_days: u32,
}

impl Supplier {
    /// 創建新的供應商報價
    pub fn new(
        material_id: impl Into<String>,
        supplier_id: impl Into<String>,
        unit_price: Decimal,
        min_order_qty: Decimal,
        lead_time_days: u32,
    ) -> Self {
        Self {
            material_id: material_id.into(),
            supplier_id: supplier_id.into(),
            unit_price,
            min_order_qty,
            lead_time_days,
        }
    }

    /// 預設供應商：單價 1、最小訂購量 100、提前期 15 天
    pub fn fallback() -> Self {
        Self::new("", "DEFAULT", Decimal::ONE, Decimal::from(100), 15)
    }

    /// 套用到指定物料（用於預設供應商）
    pub fn for_material(&self, material_id: &str) -> Self {
        Self {
            material_id: material_id.to_string(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_order_qty <= Decimal::ZERO {
            return Err(MrpError::InvalidParameter {
                name: format!("min_order_qty({})", self.supplier_id),
                value: self.min_order_qty.to_string(),
            });
        }
        if self.unit_price < Decimal::ZERO {
            return Err(MrpError::InvalidParameter {
                name: format!("unit_price({})", self.supplier_id),
                value: self.unit_price.to_string(),
            });
        }
        Ok(())
    }
}

/// 選擇物料的首選供應商（第一筆資料）
///
/// 不做多供應商比價。
pub fn first_supplier<'a>(suppliers: &'a [Supplier], material_id: &str) -> Option<&'a Supplier> {
    suppliers.iter().find(|s| s.material_id == material_id)
}
