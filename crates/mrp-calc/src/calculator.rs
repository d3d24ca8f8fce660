//! MRP 主計算器

use mrp_bom::{BomLoader, LoadedBom};
use mrp_core::supplier::first_supplier;
use mrp_core::{
    BomRow, ForecastRecord, ForecastSource, InventoryBook, InventoryPool, MrpError, MrpParameters,
    MrpWarning, Period, PlanEntry, PlanTable, Result, Supplier,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::allocation::PeriodAllocator;
use crate::bucketing::BucketingCalculator;
use crate::lot_sizing::LotSize;
use crate::netting::{excess_inventory_warnings, NettingEngine};
use crate::purchase::{PurchaseLine, PurchasePlan, PurchasePlanExt};
use crate::requirements::{Requirement, RequirementAggregator};
use crate::{MrpReport, MrpSummary, ProductionPlan};

/// MRP 計算器
///
/// 只持有已驗證的參數；BOM、計劃、庫存都由呼叫端逐次傳入，
/// 每次計算產生全新的結果。
pub struct MrpCalculator {
    params: MrpParameters,
}

impl MrpCalculator {
    /// 創建新的 MRP 計算器（參數不合法時拒絕）
    pub fn new(params: MrpParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MrpParameters {
        &self.params
    }

    /// 依參數中的層次違規策略載入 BOM
    pub fn load_bom(&self, rows: &[BomRow]) -> Result<LoadedBom> {
        BomLoader::load(rows, self.params.hierarchy_policy)
    }

    /// 從預測來源取得預測後計算成品生產計劃
    pub fn plan_production_from(
        &self,
        source: &dyn ForecastSource,
        inventory: &InventoryBook,
    ) -> Result<ProductionPlan> {
        let forecast = source.forecast(None, self.params.planning_horizon, None)?;
        self.plan_production(&forecast, inventory)
    }

    /// 成品生產計劃：以預測為需求，按最小生產批量計算淨需求
    pub fn plan_production(
        &self,
        forecast: &[ForecastRecord],
        inventory: &InventoryBook,
    ) -> Result<ProductionPlan> {
        tracing::info!("開始生產計劃計算：預測 {} 筆", forecast.len());

        if let Some(record) = forecast.iter().find(|r| r.value < Decimal::ZERO) {
            return Err(MrpError::Validation(format!(
                "物料 {} 在 {} 的預測值為負數: {}",
                record.material_id, record.period, record.value
            )));
        }

        let horizon = BucketingCalculator::planning_periods(
            forecast.iter().map(|r| r.period),
            self.params.planning_horizon,
        );
        let mut warnings: Vec<MrpWarning> = horizon.warning.into_iter().collect();

        // 物料 → 期間 → 預測量（同期多筆加總）
        let mut demand: BTreeMap<&str, BTreeMap<Period, Decimal>> = BTreeMap::new();
        for record in forecast {
            *demand
                .entry(record.material_id.as_str())
                .or_default()
                .entry(record.period)
                .or_default() += record.value;
        }

        let engine = NettingEngine::new(
            self.params.safety_stock_days,
            LotSize::for_make(&self.params)?,
        )?;

        let mut entries = Vec::new();
        for (material_id, by_period) in &demand {
            let series = demand_series(material_id, by_period, &horizon.periods);
            let initial = inventory.on_hand(InventoryPool::Finished, material_id);
            entries.extend(engine.run(material_id, &series, initial));
        }

        warnings.extend(excess_inventory_warnings(
            &entries,
            self.params.max_inventory_days,
        ));

        let plan = PlanTable::new(entries);
        tracing::info!(
            "生產計劃計算完成：{} 種成品，{} 期，{} 筆記錄",
            demand.len(),
            horizon.periods.len(),
            plan.len()
        );

        Ok(ProductionPlan { plan, warnings })
    }

    /// 物料計劃：需求彙總、分期、採購計劃與半成品生產計劃
    pub fn plan_materials(
        &self,
        bom: &LoadedBom,
        production: &PlanTable<PlanEntry>,
        inventory: &InventoryBook,
        suppliers: &[Supplier],
    ) -> Result<MrpReport> {
        tracing::info!(
            "開始物料計劃計算：生產計劃 {} 筆，庫存 {} 筆，供應商 {} 筆",
            production.len(),
            inventory.len(),
            suppliers.len()
        );
        let start_time = std::time::Instant::now();

        // Step 1: 計劃期間
        let horizon =
            BucketingCalculator::planning_periods(production.periods(), self.params.planning_horizon);
        let mut warnings: Vec<MrpWarning> = horizon.warning.into_iter().collect();

        // Step 2: 需求彙總
        let totals = RequirementAggregator::horizon_totals(production, &horizon.periods);
        let requirements = RequirementAggregator::new(bom).aggregate(&totals)?;
        warnings.extend(requirements.warnings);

        // Step 3: 分期
        let allocator = PeriodAllocator::from_plan(production, bom, &horizon.periods);

        // Step 4: 採購計劃
        let (purchase_plan, purchase_warnings) =
            self.purchase_plan(&requirements.raw, &allocator, inventory, suppliers)?;
        warnings.extend(purchase_warnings);

        // Step 5: 半成品生產計劃
        let semifinished_plan =
            self.semifinished_plan(&requirements.semifinished, &allocator, inventory)?;
        warnings.extend(excess_inventory_warnings(
            semifinished_plan.entries(),
            self.params.max_inventory_days,
        ));

        let summary = MrpSummary {
            total_raw_materials: requirements.raw.len(),
            total_semifinished: requirements.semifinished.len(),
            total_purchase_cost: purchase_plan.total_cost(),
            planning_horizon: horizon.periods.len(),
        };

        let mut report = MrpReport {
            run_id: Uuid::new_v4(),
            raw_requirements: requirements.raw,
            semifinished_requirements: requirements.semifinished,
            purchase_plan,
            semifinished_plan,
            summary,
            warnings: Vec::new(),
            calculation_time_ms: None,
        };
        for warning in warnings {
            report.add_warning(warning);
        }
        report.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("物料計劃計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "採購單 {} 筆，總成本 {}",
            report.purchase_plan.orders().count(),
            report.summary.total_purchase_cost
        );

        Ok(report)
    }

    /// 原料採購計劃
    fn purchase_plan(
        &self,
        raw: &[Requirement],
        allocator: &PeriodAllocator,
        inventory: &InventoryBook,
        suppliers: &[Supplier],
    ) -> Result<(PurchasePlan, Vec<MrpWarning>)> {
        let mut lines = Vec::new();
        let mut warnings = Vec::new();

        for requirement in raw {
            let material_id = requirement.material_id.as_str();
            let supplier = match first_supplier(suppliers, material_id) {
                Some(supplier) => supplier.clone(),
                None => {
                    tracing::warn!("物料 {} 沒有供應商資料，使用預設供應商", material_id);
                    let fallback = &self.params.default_supplier;
                    warnings.push(MrpWarning::warning(
                        material_id,
                        format!("沒有供應商資料，使用預設供應商 {}", fallback.supplier_id),
                    ));
                    fallback.for_material(material_id)
                }
            };
            supplier.validate()?;

            let engine = NettingEngine::new(
                self.params.safety_stock_days,
                LotSize::for_buy(&supplier, &self.params)?,
            )?;
            let series = allocator.allocate(requirement.total_qty);
            let initial = inventory.on_hand(InventoryPool::Raw, material_id);
            let entries = engine.run(material_id, &series, initial);

            warnings.extend(excess_inventory_warnings(
                &entries,
                self.params.max_inventory_days,
            ));
            for entry in entries {
                lines.push(PurchaseLine::new(
                    entry,
                    &supplier,
                    requirement.description.clone(),
                )?);
            }
        }

        let plan = PurchasePlan::new(lines);
        tracing::debug!("採購計劃 {} 行，其中採購單 {} 筆", plan.len(), plan.orders().count());
        Ok((plan, warnings))
    }

    /// 半成品生產計劃（最小生產批量，含安全庫存）
    fn semifinished_plan(
        &self,
        semifinished: &[Requirement],
        allocator: &PeriodAllocator,
        inventory: &InventoryBook,
    ) -> Result<PlanTable<PlanEntry>> {
        let engine = NettingEngine::new(
            self.params.safety_stock_days,
            LotSize::for_make(&self.params)?,
        )?;

        let mut entries = Vec::new();
        for requirement in semifinished {
            let material_id = requirement.material_id.as_str();
            let series = allocator.allocate(requirement.total_qty);
            let initial = inventory.on_hand(InventoryPool::SemiFinished, material_id);
            entries.extend(engine.run(material_id, &series, initial));
        }

        Ok(PlanTable::new(entries))
    }
}

/// 按計劃期間排列的需求；沒有預測的期間需求為 0
fn demand_series(
    material_id: &str,
    by_period: &BTreeMap<Period, Decimal>,
    periods: &[Period],
) -> Vec<(Period, Decimal)> {
    periods
        .iter()
        .map(|&period| {
            let value = by_period.get(&period).copied().unwrap_or_else(|| {
                tracing::debug!("物料 {} 在 {} 沒有預測，需求視為 0", material_id, period);
                Decimal::ZERO
            });
            (period, value)
        })
        .collect()
}
