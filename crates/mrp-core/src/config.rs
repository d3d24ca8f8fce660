//! MRP 參數配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::supplier::Supplier;
use crate::{MrpError, Result};

/// MRP 計劃參數
///
/// 所有計算入口在處理資料前都會先呼叫 [`MrpParameters::validate`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MrpParameters {
    /// 安全庫存天數（以 30 天為一個月換算）
    pub safety_stock_days: Decimal,

    /// 最大庫存天數（超出僅產生提示，不改變數量）
    pub max_inventory_days: Decimal,

    /// 最小生產批量（生產的批量單位）
    pub min_batch_size: Decimal,

    /// 訂購倍數（採購批量 = 最小訂購量 × 訂購倍數）
    pub order_multiple: Decimal,

    /// 計劃期數（月）
    pub planning_horizon: u32,

    /// 層次結構違規時的處理策略
    pub hierarchy_policy: HierarchyPolicy,

    /// 物料沒有供應商資料時使用的預設供應商
    pub default_supplier: Supplier,
}

impl Default for MrpParameters {
    fn default() -> Self {
        Self {
            safety_stock_days: Decimal::from(15),
            max_inventory_days: Decimal::from(60),
            min_batch_size: Decimal::from(100),
            order_multiple: Decimal::ONE,
            planning_horizon: 6,
            hierarchy_policy: HierarchyPolicy::Reject,
            default_supplier: Supplier::fallback(),
        }
    }
}

impl MrpParameters {
    /// 從 JSON 字串載入並驗證參數（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| MrpError::Validation(format!("MRP 參數格式錯誤: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// 建構器模式：設置安全庫存天數
    pub fn with_safety_stock_days(mut self, days: Decimal) -> Self {
        self.safety_stock_days = days;
        self
    }

    /// 建構器模式：設置最大庫存天數
    pub fn with_max_inventory_days(mut self, days: Decimal) -> Self {
        self.max_inventory_days = days;
        self
    }

    /// 建構器模式：設置最小生產批量
    pub fn with_min_batch_size(mut self, size: Decimal) -> Self {
        self.min_batch_size = size;
        self
    }

    /// 建構器模式：設置訂購倍數
    pub fn with_order_multiple(mut self, multiple: Decimal) -> Self {
        self.order_multiple = multiple;
        self
    }

    /// 建構器模式：設置計劃期數
    pub fn with_planning_horizon(mut self, periods: u32) -> Self {
        self.planning_horizon = periods;
        self
    }

    /// 建構器模式：設置層次結構策略
    pub fn with_hierarchy_policy(mut self, policy: HierarchyPolicy) -> Self {
        self.hierarchy_policy = policy;
        self
    }

    /// 建構器模式：設置預設供應商
    pub fn with_default_supplier(mut self, supplier: Supplier) -> Self {
        self.default_supplier = supplier;
        self
    }

    /// 驗證參數
    ///
    /// 批量與倍數必須為正數，否則批量取整會除以零。
    pub fn validate(&self) -> Result<()> {
        if self.min_batch_size <= Decimal::ZERO {
            return Err(invalid("min_batch_size", self.min_batch_size));
        }
        if self.order_multiple <= Decimal::ZERO {
            return Err(invalid("order_multiple", self.order_multiple));
        }
        if self.safety_stock_days < Decimal::ZERO {
            return Err(invalid("safety_stock_days", self.safety_stock_days));
        }
        if self.max_inventory_days < Decimal::ZERO {
            return Err(invalid("max_inventory_days", self.max_inventory_days));
        }
        if self.planning_horizon == 0 {
            return Err(invalid("planning_horizon", self.planning_horizon));
        }
        self.default_supplier.validate()?;
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString) -> MrpError {
    MrpError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// 層次結構違規處理策略
///
/// 只在 BOM 載入時套用一次。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HierarchyPolicy {
    /// 拒絕整份 BOM
    #[default]
    Reject,
    /// 記錄警告後繼續
    Warn,
}
