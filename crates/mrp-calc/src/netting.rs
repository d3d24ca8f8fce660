//! 淨需求計算

use mrp_core::plan::DAYS_PER_PERIOD;
use mrp_core::{MrpError, MrpWarning, Period, PlanEntry, Result};
use rust_decimal::Decimal;

use crate::lot_sizing::LotSize;

/// 淨需求計算引擎
///
/// 成品對預測、組件對生產計劃都使用同一套公式：
///
/// ```text
/// 安全庫存 = 需求 × 安全庫存天數 / 30
/// 淨需求   = max(0, 需求 + 安全庫存 - 期初庫存)
/// 計劃量   = 淨需求 > 0 ? ceil(max(淨需求, 批量) / 批量) × 批量 : 0
/// 期末庫存 = 期初庫存 + 計劃量 - 需求
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NettingEngine {
    safety_stock_days: Decimal,
    lot_size: LotSize,
}

impl NettingEngine {
    pub fn new(safety_stock_days: Decimal, lot_size: LotSize) -> Result<Self> {
        if safety_stock_days < Decimal::ZERO {
            return Err(MrpError::InvalidParameter {
                name: "safety_stock_days".to_string(),
                value: safety_stock_days.to_string(),
            });
        }
        Ok(Self {
            safety_stock_days,
            lot_size,
        })
    }

    /// 安全庫存
    pub fn safety_stock(&self, demand: Decimal) -> Decimal {
        demand * self.safety_stock_days / DAYS_PER_PERIOD
    }

    /// 單期計算
    pub fn net_period(
        &self,
        material_id: &str,
        period: Period,
        demand: Decimal,
        beginning_inventory: Decimal,
    ) -> PlanEntry {
        let safety_stock = self.safety_stock(demand);
        let net_demand = (demand + safety_stock - beginning_inventory).max(Decimal::ZERO);
        let produced = self.lot_size.quantize(net_demand);

        PlanEntry::new(material_id, period, demand, beginning_inventory, produced)
            .with_netting(safety_stock, net_demand)
    }

    /// 按期間順序逐期計算，上期期末庫存為下期期初庫存
    ///
    /// `demands` 必須已按期間排序。
    pub fn run(
        &self,
        material_id: &str,
        demands: &[(Period, Decimal)],
        initial_inventory: Decimal,
    ) -> Vec<PlanEntry> {
        let mut inventory = initial_inventory;
        let mut entries = Vec::with_capacity(demands.len());

        for &(period, demand) in demands {
            let entry = self.net_period(material_id, period, demand, inventory);
            inventory = entry.ending_inventory;
            entries.push(entry);
        }

        tracing::debug!(
            "物料 {} 淨需求計算完成: {} 期, 期末庫存 {}",
            material_id,
            entries.len(),
            inventory
        );
        entries
    }
}

/// 庫存過高提示：覆蓋天數超過上限的期間
///
/// 僅供參考，不影響計劃量。
pub fn excess_inventory_warnings<'a>(
    entries: impl IntoIterator<Item = &'a PlanEntry>,
    max_inventory_days: Decimal,
) -> Vec<MrpWarning> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let days = entry.coverage_days.days()?;
            (days > max_inventory_days).then(|| {
                MrpWarning::info(
                    &entry.material_id,
                    format!(
                        "{} 期末庫存覆蓋 {} 天，超過上限 {} 天",
                        entry.period,
                        days.round_dp(1),
                        max_inventory_days
                    ),
                )
            })
        })
        .collect()
}
