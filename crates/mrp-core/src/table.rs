//! 表格輸入（匯入協作者交付的欄位/列資料）
//!
//! 檔案讀取不在本引擎範圍內；這裡負責必要欄位檢查與數值解析，
//! 任何錯誤都在產生任何狀態之前回報。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    ForecastRecord, Inventory, InventoryPool, MaterialType, MrpError, Period, PlanEntry, Result,
    Supplier,
};

/// 原始表格
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// 建構器模式：添加一列
    pub fn with_row(mut self, row: &[&str]) -> Self {
        self.rows.push(row.iter().map(|c| c.to_string()).collect());
        self
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 檢查必要欄位
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| self.column_index(name).is_none())
            .collect();

        if missing.is_empty() {
            tracing::debug!("資料表欄位檢查通過，共 {} 列", self.rows.len());
            Ok(())
        } else {
            tracing::warn!("資料表缺少必要欄位: {:?}", missing);
            Err(MrpError::Validation(format!(
                "缺少必要欄位: {}",
                missing.join(", ")
            )))
        }
    }

    fn cell<'a>(&'a self, row: &'a [String], column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|i| row.get(i))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn text(&self, row_no: usize, row: &[String], column: &str) -> Result<String> {
        self.cell(row, column)
            .map(str::to_string)
            .ok_or_else(|| MrpError::Validation(format!("第 {} 列欄位 {column} 為空", row_no + 1)))
    }

    fn parse<T: FromStr>(&self, row_no: usize, row: &[String], column: &str) -> Result<T> {
        let raw = self.text(row_no, row, column)?;
        raw.parse::<T>().map_err(|_| {
            MrpError::Validation(format!(
                "第 {} 列欄位 {column} 不是數值: {raw}",
                row_no + 1
            ))
        })
    }

    fn period(&self, row_no: usize, row: &[String]) -> Result<Period> {
        Period::new(
            self.parse(row_no, row, "year")?,
            self.parse(row_no, row, "month")?,
        )
    }
}

/// BOM 列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRow {
    pub parent_id: String,
    pub child_id: String,
    pub qty_per_unit: Decimal,
    pub parent_description: Option<String>,
    pub child_description: Option<String>,
    pub parent_type: Option<MaterialType>,
    pub child_type: Option<MaterialType>,
}

impl BomRow {
    pub const REQUIRED: [&'static str; 3] = ["parent_id", "child_id", "qty_per_unit"];

    pub fn new(parent_id: impl Into<String>, child_id: impl Into<String>, qty_per_unit: Decimal) -> Self {
        Self {
            parent_id: parent_id.into(),
            child_id: child_id.into(),
            qty_per_unit,
            parent_description: None,
            child_description: None,
            parent_type: None,
            child_type: None,
        }
    }

    /// 建構器模式：設置描述
    pub fn with_descriptions(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
        self.parent_description = Some(parent.into());
        self.child_description = Some(child.into());
        self
    }

    /// 建構器模式：明確指定物料類型
    pub fn with_types(mut self, parent: MaterialType, child: MaterialType) -> Self {
        self.parent_type = Some(parent);
        self.child_type = Some(child);
        self
    }

    pub fn from_table(table: &RawTable) -> Result<Vec<Self>> {
        table.require_columns(&Self::REQUIRED)?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(Self {
                    parent_id: table.text(i, row, "parent_id")?,
                    child_id: table.text(i, row, "child_id")?,
                    qty_per_unit: table.parse(i, row, "qty_per_unit")?,
                    parent_description: table.cell(row, "parent_description").map(str::to_string),
                    child_description: table.cell(row, "child_description").map(str::to_string),
                    parent_type: table
                        .cell(row, "parent_type")
                        .map(str::parse::<MaterialType>)
                        .transpose()?,
                    child_type: table
                        .cell(row, "child_type")
                        .map(str::parse::<MaterialType>)
                        .transpose()?,
                })
            })
            .collect()
    }
}

/// 生產計劃/預測列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub material_id: String,
    pub period: Period,
    pub quantity: Decimal,
}

impl PlanRow {
    pub const REQUIRED: [&'static str; 4] = ["material_id", "year", "month", "quantity"];

    pub fn from_table(table: &RawTable) -> Result<Vec<Self>> {
        table.require_columns(&Self::REQUIRED)?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(Self {
                    material_id: table.text(i, row, "material_id")?,
                    period: table.period(i, row)?,
                    quantity: table.parse(i, row, "quantity")?,
                })
            })
            .collect()
    }

    /// 作為預測記錄（生產計劃階段的需求）
    pub fn into_forecast(self) -> ForecastRecord {
        ForecastRecord::new(self.material_id, self.period, self.quantity)
    }

    /// 作為外部提供的生產計劃記錄（計劃量 = quantity）
    pub fn into_plan_entry(self) -> PlanEntry {
        PlanEntry::new(
            self.material_id,
            self.period,
            Decimal::ZERO,
            Decimal::ZERO,
            self.quantity,
        )
    }
}

/// 庫存列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub material_id: String,
    pub on_hand_qty: Decimal,
}

impl InventoryRow {
    pub const REQUIRED: [&'static str; 2] = ["material_id", "on_hand_qty"];

    pub fn from_table(table: &RawTable) -> Result<Vec<Self>> {
        table.require_columns(&Self::REQUIRED)?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(Self {
                    material_id: table.text(i, row, "material_id")?,
                    on_hand_qty: table.parse(i, row, "on_hand_qty")?,
                })
            })
            .collect()
    }

    /// 轉為指定庫存池的庫存記錄
    pub fn into_inventory(self, pool: InventoryPool) -> Inventory {
        Inventory::new(self.material_id, self.on_hand_qty, pool)
    }
}

/// 供應商列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRow {
    pub material_id: String,
    pub supplier_id: String,
    pub unit_price: Decimal,
    pub min_order_qty: Decimal,
    pub lead_time_days: u32,
}

impl SupplierRow {
    pub const REQUIRED: [&'static str; 5] = [
        "material_id",
        "supplier_id",
        "unit_price",
        "min_order_qty",
        "lead_time_days",
    ];

    /// 解析並驗證（最小訂購量必須為正）
    pub fn from_table(table: &RawTable) -> Result<Vec<Supplier>> {
        table.require_columns(&Self::REQUIRED)?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let row = Self {
                    material_id: table.text(i, row, "material_id")?,
                    supplier_id: table.text(i, row, "supplier_id")?,
                    unit_price: table.parse(i, row, "unit_price")?,
                    min_order_qty: table.parse(i, row, "min_order_qty")?,
                    lead_time_days: table.parse(i, row, "lead_time_days")?,
                };
                let supplier = Supplier::from(row);
                supplier.validate()?;
                Ok(supplier)
            })
            .collect()
    }
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier::new(
            row.material_id,
            row.supplier_id,
            row.unit_price,
            row.min_order_qty,
            row.lead_time_days,
        )
    }
}
