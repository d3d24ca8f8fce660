//! 採購計劃

use chrono::NaiveDate;
use mrp_core::{PlanEntry, PlanRecord, PlanTable, Result, Supplier};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::lead_time::LeadTimeCalculator;

/// 採購計劃行
///
/// 每個（原料, 期間）一行；採購量為 0 的行成本為 0，保留下來供手動調整後傳播庫存。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseLine {
    #[serde(flatten)]
    pub entry: PlanEntry,

    /// 描述
    pub description: Option<String>,

    /// 供應商ID
    pub supplier_id: String,

    /// 採購提前期（日曆日）
    pub lead_time_days: u32,

    /// 下單日期
    pub order_date: NaiveDate,

    /// 預計到貨日期（期間起始日）
    pub delivery_date: NaiveDate,

    /// 單價
    pub unit_price: Decimal,

    /// 預計成本
    pub cost: Decimal,
}

impl PurchaseLine {
    /// 由淨需求結果與供應商報價建立
    pub fn new(entry: PlanEntry, supplier: &Supplier, description: Option<String>) -> Result<Self> {
        let order_date = LeadTimeCalculator::order_date(entry.period, supplier.lead_time_days)?;
        let delivery_date = LeadTimeCalculator::delivery_date(entry.period)?;
        let cost = entry.produced * supplier.unit_price;

        Ok(Self {
            entry,
            description,
            supplier_id: supplier.supplier_id.clone(),
            lead_time_days: supplier.lead_time_days,
            order_date,
            delivery_date,
            unit_price: supplier.unit_price,
            cost,
        })
    }

    pub fn quantity(&self) -> Decimal {
        self.entry.produced
    }
}

impl PlanRecord for PurchaseLine {
    fn entry(&self) -> &PlanEntry {
        &self.entry
    }

    fn entry_mut(&mut self) -> &mut PlanEntry {
        &mut self.entry
    }

    fn set_quantity(&mut self, quantity: Decimal) {
        self.entry.produced = quantity;
        self.cost = quantity * self.unit_price;
    }
}

/// 採購計劃表
pub type PurchasePlan = PlanTable<PurchaseLine>;

/// 採購計劃查詢
pub trait PurchasePlanExt {
    /// 採購量大於 0 的行（即實際要下的採購單）
    fn orders(&self) -> Box<dyn Iterator<Item = &PurchaseLine> + '_>;

    /// 採購總成本
    fn total_cost(&self) -> Decimal;
}

impl PurchasePlanExt for PurchasePlan {
    fn orders(&self) -> Box<dyn Iterator<Item = &PurchaseLine> + '_> {
        Box::new(
            self.entries()
                .iter()
                .filter(|line| line.quantity() > Decimal::ZERO),
        )
    }

    fn total_cost(&self) -> Decimal {
        self.entries().iter().map(|line| line.cost).sum()
    }
}
