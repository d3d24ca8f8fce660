//! # MRP Calculation Engine
//!
//! 核心 MRP 計算引擎：成品生產計劃、物料需求、採購計劃與半成品生產計劃

pub mod allocation;
pub mod bucketing;
pub mod calculator;
pub mod lead_time;
pub mod lot_sizing;
pub mod netting;
pub mod purchase;
pub mod requirements;

// Re-export 主要類型
pub use allocation::PeriodAllocator;
pub use bucketing::{BucketingCalculator, PlanningPeriods};
pub use calculator::MrpCalculator;
pub use lot_sizing::LotSize;
pub use netting::NettingEngine;
pub use purchase::{PurchaseLine, PurchasePlan, PurchasePlanExt};
pub use requirements::{Requirement, RequirementAggregator, Requirements};

use mrp_core::{MrpWarning, PlanEntry, PlanTable};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// 成品生產計劃結果
#[derive(Debug, Clone)]
pub struct ProductionPlan {
    /// 生產計劃表
    pub plan: PlanTable<PlanEntry>,

    /// 警告信息
    pub warnings: Vec<MrpWarning>,
}

/// MRP 報告摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MrpSummary {
    /// 原料種類數
    pub total_raw_materials: usize,

    /// 半成品種類數
    pub total_semifinished: usize,

    /// 採購總成本
    pub total_purchase_cost: Decimal,

    /// 實際計劃期數
    pub planning_horizon: usize,
}

/// MRP 計算結果
#[derive(Debug, Clone)]
pub struct MrpReport {
    /// 計算批次ID
    pub run_id: Uuid,

    /// 原料需求（展望期總量）
    pub raw_requirements: Vec<Requirement>,

    /// 半成品需求（展望期總量）
    pub semifinished_requirements: Vec<Requirement>,

    /// 採購計劃
    pub purchase_plan: PurchasePlan,

    /// 半成品生產計劃
    pub semifinished_plan: PlanTable<PlanEntry>,

    /// 摘要
    pub summary: MrpSummary,

    /// 警告信息
    pub warnings: Vec<MrpWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl MrpReport {
    /// 添加警告
    pub fn add_warning(&mut self, warning: MrpWarning) {
        self.warnings.push(warning);
    }
}
