//! # MRP Core
//!
//! 核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod forecast;
pub mod inventory;
pub mod material;
pub mod plan;
pub mod supplier;
pub mod table;
pub mod warning;

// Re-export 主要類型
pub use calendar::Period;
pub use config::{HierarchyPolicy, MrpParameters};
pub use forecast::{ForecastMethod, ForecastRecord, ForecastSource, StaticForecast};
pub use inventory::{Inventory, InventoryBook, InventoryPool};
pub use material::{Material, MaterialType};
pub use plan::{CoverageDays, PlanEntry, PlanRecord, PlanTable};
pub use supplier::Supplier;
pub use table::{BomRow, InventoryRow, PlanRow, RawTable, SupplierRow};
pub use warning::{MrpWarning, WarningSeverity};

/// MRP 錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MrpError {
    /// 輸入資料不合法（缺欄位、非數值、非正用量）
    #[error("資料驗證失敗: {0}")]
    Validation(String),

    /// 參數不合法（在配置階段即拒絕）
    #[error("無效的參數 {name}: {value}")]
    InvalidParameter { name: String, value: String },

    /// BOM 存在循環引用
    #[error("BOM 結構中存在循環引用: {}", format_cycles(.cycles))]
    Cycle { cycles: Vec<Vec<String>> },

    /// BOM 層次結構不符合規則
    #[error("物料 {material} 的組成不符合要求：應為 {expected}，實際為 {actual}")]
    Hierarchy {
        material: String,
        expected: String,
        actual: String,
    },

    /// 調整目標不存在
    #[error("找不到計劃記錄: 物料={material}, 期間={period}")]
    NotFound { material: String, period: Period },

    #[error("物料 {0} 不存在於 BOM 中")]
    MaterialNotFound(String),
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| format!("[{}]", cycle.join(" -> ")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MrpError>;
