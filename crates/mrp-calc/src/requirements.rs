//! 物料需求彙總

use mrp_bom::{ExplodeOptions, LoadedBom};
use mrp_core::{MaterialType, MrpWarning, Period, PlanEntry, PlanTable, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 單一組件在整個展望期的總需求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    pub material_id: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
    pub total_qty: Decimal,
}

/// 彙總結果（原料、半成品分開，按物料ID排序）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Requirements {
    pub raw: Vec<Requirement>,
    pub semifinished: Vec<Requirement>,
    pub warnings: Vec<MrpWarning>,
}

/// 需求彙總器
pub struct RequirementAggregator<'a> {
    bom: &'a LoadedBom,
}

impl<'a> RequirementAggregator<'a> {
    pub fn new(bom: &'a LoadedBom) -> Self {
        Self { bom }
    }

    /// 計劃表在指定期間內各物料的計劃量合計
    pub fn horizon_totals(plan: &PlanTable<PlanEntry>, periods: &[Period]) -> BTreeMap<String, Decimal> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for entry in plan.entries() {
            if periods.contains(&entry.period) {
                *totals.entry(entry.material_id.clone()).or_default() += entry.produced;
            }
        }
        totals
    }

    /// 展開每個成品的計劃量，累加原料與半成品需求
    ///
    /// 計劃中的非成品物料無法展開，略過並提示。
    pub fn aggregate(&self, plan_totals: &BTreeMap<String, Decimal>) -> Result<Requirements> {
        let raw_options = ExplodeOptions::new().with_type_filter(MaterialType::Raw);
        let semi_options = ExplodeOptions::new()
            .with_intermediates()
            .with_type_filter(MaterialType::SemiFinished);

        let mut raw: BTreeMap<String, Requirement> = BTreeMap::new();
        let mut semifinished: BTreeMap<String, Requirement> = BTreeMap::new();
        let mut warnings = Vec::new();

        for (material_id, &quantity) in plan_totals {
            match self.bom.material_type(material_id) {
                Some(MaterialType::Finished) => {}
                Some(other) => {
                    tracing::warn!("物料 {} 不是成品（{}），跳過", material_id, other);
                    warnings.push(MrpWarning::warning(
                        material_id,
                        format!("物料類型為 {other}，不是成品，無法展開"),
                    ));
                    continue;
                }
                None => {
                    tracing::warn!("物料 {} 不存在於 BOM 中，跳過", material_id);
                    warnings.push(MrpWarning::warning(material_id, "物料不存在於 BOM 中，無法展開"));
                    continue;
                }
            }
            if quantity <= Decimal::ZERO {
                continue;
            }

            let explosion = self.bom.explosion();
            for component in explosion.explode_for_quantity(material_id, quantity, &raw_options)? {
                accumulate(
                    &mut raw,
                    component.component_id,
                    component.description,
                    MaterialType::Raw,
                    component.total_qty,
                );
            }
            for component in explosion.explode_for_quantity(material_id, quantity, &semi_options)? {
                accumulate(
                    &mut semifinished,
                    component.component_id,
                    component.description,
                    MaterialType::SemiFinished,
                    component.total_qty,
                );
            }
        }

        tracing::info!(
            "物料需求彙總完成，原料: {} 種，半成品: {} 種",
            raw.len(),
            semifinished.len()
        );

        Ok(Requirements {
            raw: raw.into_values().collect(),
            semifinished: semifinished.into_values().collect(),
            warnings,
        })
    }
}

fn accumulate(
    table: &mut BTreeMap<String, Requirement>,
    material_id: String,
    description: Option<String>,
    material_type: MaterialType,
    quantity: Decimal,
) {
    table
        .entry(material_id.clone())
        .or_insert_with(|| Requirement {
            material_id,
            description,
            material_type,
            total_qty: Decimal::ZERO,
        })
        .total_qty += quantity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_bom::BomLoader;
    use mrp_core::{BomRow, HierarchyPolicy};

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn bike_bom() -> LoadedBom {
        let rows = vec![
            BomRow::new("BIKE", "FRAME", dec(1)),
            BomRow::new("BIKE", "BOLT", dec(4)),
            BomRow::new("FRAME", "TUBE", dec(3)),
            BomRow::new("SCOOTER", "FRAME", dec(1)),
            BomRow::new("SCOOTER", "BOLT", dec(2)),
        ];
        BomLoader::load(&rows, HierarchyPolicy::Reject).unwrap()
    }

    fn totals(requirements: &[Requirement]) -> Vec<(&str, Decimal)> {
        requirements
            .iter()
            .map(|r| (r.material_id.as_str(), r.total_qty))
            .collect()
    }

    #[test]
    fn test_aggregate_across_finished_goods() {
        let bom = bike_bom();
        let plan = BTreeMap::from([
            ("BIKE".to_string(), dec(10)),
            ("SCOOTER".to_string(), dec(5)),
        ]);

        let result = RequirementAggregator::new(&bom).aggregate(&plan).unwrap();

        // BOLT = 10*4 + 5*2，TUBE = (10 + 5) * 3
        assert_eq!(totals(&result.raw), vec![("BOLT", dec(50)), ("TUBE", dec(45))]);
        assert_eq!(totals(&result.semifinished), vec![("FRAME", dec(15))]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_non_finished_plan_rows_skipped() {
        let bom = bike_bom();
        let plan = BTreeMap::from([
            ("BIKE".to_string(), dec(1)),
            ("FRAME".to_string(), dec(100)),
            ("GHOST".to_string(), dec(7)),
        ]);

        let result = RequirementAggregator::new(&bom).aggregate(&plan).unwrap();

        assert_eq!(totals(&result.raw), vec![("BOLT", dec(4)), ("TUBE", dec(3))]);
        let skipped: Vec<&str> = result.warnings.iter().map(|w| w.component_id.as_str()).collect();
        assert_eq!(skipped, vec!["FRAME", "GHOST"]);
    }

    #[test]
    fn test_zero_quantity_contributes_nothing() {
        let bom = bike_bom();
        let plan = BTreeMap::from([("BIKE".to_string(), Decimal::ZERO)]);

        let result = RequirementAggregator::new(&bom).aggregate(&plan).unwrap();
        assert!(result.raw.is_empty());
        assert!(result.semifinished.is_empty());
    }

    #[test]
    fn test_horizon_totals_respects_periods() {
        let p1 = Period::new(2025, 1).unwrap();
        let p2 = Period::new(2025, 2).unwrap();
        let p3 = Period::new(2025, 3).unwrap();
        let plan = PlanTable::new(vec![
            PlanEntry::new("BIKE", p1, dec(0), dec(0), dec(100)),
            PlanEntry::new("BIKE", p2, dec(0), dec(0), dec(200)),
            PlanEntry::new("BIKE", p3, dec(0), dec(0), dec(400)),
        ]);

        let totals = RequirementAggregator::horizon_totals(&plan, &[p1, p2]);
        assert_eq!(totals.get("BIKE"), Some(&dec(300)));
    }
}
