//! 增量計算：手動調整後傳播庫存

use mrp_core::{MrpError, Period, PlanRecord, PlanTable, Result};
use rust_decimal::Decimal;

use crate::dirty_tracking::DirtyTracker;

/// 庫存傳播引擎
///
/// 只重算被調整物料在調整期間及之後的庫存；之後各期的計劃量保持不變。
pub struct PropagationEngine;

impl PropagationEngine {
    /// 覆寫（物料, 期間）的計劃量並向後傳播庫存
    ///
    /// 找不到記錄時回傳 `NotFound`，計劃表不變。回傳向後重算的期數。
    pub fn adjust<T: PlanRecord>(
        table: &mut PlanTable<T>,
        material_id: &str,
        period: Period,
        quantity: Decimal,
    ) -> Result<usize> {
        if quantity < Decimal::ZERO {
            return Err(MrpError::InvalidParameter {
                name: "quantity".to_string(),
                value: quantity.to_string(),
            });
        }
        let propagated = table.roll_forward(material_id, period, quantity)?;

        tracing::debug!(
            "物料 {} 在 {} 調整為 {}，向後傳播 {} 期",
            material_id,
            period,
            quantity,
            propagated
        );
        Ok(propagated)
    }

    /// 調整並記錄髒標記
    pub fn adjust_tracked<T: PlanRecord>(
        table: &mut PlanTable<T>,
        tracker: &mut DirtyTracker,
        material_id: &str,
        period: Period,
        quantity: Decimal,
    ) -> Result<usize> {
        let propagated = Self::adjust(table, material_id, period, quantity)?;
        tracker.mark_dirty(material_id);
        Ok(propagated)
    }
}
