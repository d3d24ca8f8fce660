//! 需求分期

use mrp_bom::LoadedBom;
use mrp_core::{MaterialType, Period, PlanEntry, PlanTable};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 按成品生產比例把展望期總需求分配到各期
///
/// 某期比例 = 該期所有成品計劃量 / 展望期成品計劃總量；總量為 0 時平均分配。
/// 各層之間不做提前期偏移。各期分配量加總恰為總需求。
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodAllocator {
    periods: Vec<Period>,
    volumes: Vec<Decimal>,
    total_volume: Decimal,
}

impl PeriodAllocator {
    /// `periods` 必須已排序；不在 `volumes` 中的期間視為 0
    pub fn new(periods: Vec<Period>, volumes: &BTreeMap<Period, Decimal>) -> Self {
        let volumes: Vec<Decimal> = periods
            .iter()
            .map(|p| volumes.get(p).copied().unwrap_or(Decimal::ZERO))
            .collect();
        let total_volume = volumes.iter().copied().sum();
        Self {
            periods,
            volumes,
            total_volume,
        }
    }

    /// 由生產計劃建立；只計入成品
    pub fn from_plan(plan: &PlanTable<PlanEntry>, bom: &LoadedBom, periods: &[Period]) -> Self {
        let mut volumes: BTreeMap<Period, Decimal> = BTreeMap::new();
        for entry in plan.entries() {
            if bom.material_type(&entry.material_id) == Some(MaterialType::Finished) {
                *volumes.entry(entry.period).or_default() += entry.produced;
            }
        }
        Self::new(periods.to_vec(), &volumes)
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// 分配總需求
    pub fn allocate(&self, total_demand: Decimal) -> Vec<(Period, Decimal)> {
        if self.periods.is_empty() {
            return Vec::new();
        }

        let (mut shares, last) = if self.total_volume > Decimal::ZERO {
            let shares: Vec<Decimal> = self
                .volumes
                .iter()
                .map(|&volume| total_demand * volume / self.total_volume)
                .collect();
            (shares, self.volumes.iter().rposition(|v| *v > Decimal::ZERO))
        } else {
            let even = total_demand / Decimal::from(self.periods.len());
            (vec![even; self.periods.len()], Some(self.periods.len() - 1))
        };

        // 除法捨入誤差歸入最後一個有產量的期間，產量為 0 的期間保持 0
        if let Some(last) = last {
            let others: Decimal = shares
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != last)
                .map(|(_, share)| *share)
                .sum();
            shares[last] = total_demand - others;
        }

        self.periods.iter().copied().zip(shares).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_bom::BomLoader;
    use mrp_core::{BomRow, HierarchyPolicy};
    use proptest::prelude::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn period(month: u32) -> Period {
        Period::new(2025, month).unwrap()
    }

    #[test]
    fn test_allocate_by_production_share() {
        let volumes = BTreeMap::from([(period(1), dec(100)), (period(2), dec(300))]);
        let allocator = PeriodAllocator::new(vec![period(1), period(2), period(3)], &volumes);

        assert_eq!(
            allocator.allocate(dec(1000)),
            vec![(period(1), dec(250)), (period(2), dec(750)), (period(3), dec(0))]
        );
    }

    #[test]
    fn test_zero_production_distributes_evenly() {
        let allocator = PeriodAllocator::new(vec![period(1), period(2)], &BTreeMap::new());
        assert_eq!(
            allocator.allocate(dec(90)),
            vec![(period(1), dec(45)), (period(2), dec(45))]
        );
    }

    #[test]
    fn test_uneven_split_sums_to_total() {
        let allocator = PeriodAllocator::new(
            vec![period(1), period(2), period(3)],
            &BTreeMap::new(),
        );
        let shares = allocator.allocate(dec(100));
        let total: Decimal = shares.iter().map(|(_, qty)| *qty).sum();
        assert_eq!(total, dec(100));
        assert_eq!(shares[0].1, shares[1].1);
        assert!(shares[2].1 >= shares[0].1);
    }

    #[test]
    fn test_rounding_remainder_skips_idle_periods() {
        let volumes = BTreeMap::from([(period(1), dec(1)), (period(2), dec(2))]);
        let allocator = PeriodAllocator::new(vec![period(1), period(2), period(3)], &volumes);

        let shares = allocator.allocate(dec(100));
        let total: Decimal = shares.iter().map(|(_, qty)| *qty).sum();
        assert_eq!(total, dec(100));
        assert_eq!(shares[2], (period(3), Decimal::ZERO));
    }

    #[test]
    fn test_no_periods_allocates_nothing() {
        let allocator = PeriodAllocator::new(Vec::new(), &BTreeMap::new());
        assert!(allocator.allocate(dec(90)).is_empty());
    }

    #[test]
    fn test_from_plan_counts_only_finished_goods() {
        let bom = BomLoader::load(
            &[
                BomRow::new("FG", "SF", dec(1)),
                BomRow::new("FG", "R", dec(1)),
                BomRow::new("SF", "R", dec(1)),
            ],
            HierarchyPolicy::Reject,
        )
        .unwrap();
        let plan = PlanTable::new(vec![
            PlanEntry::new("FG", period(1), dec(0), dec(0), dec(100)),
            PlanEntry::new("FG", period(2), dec(0), dec(0), dec(100)),
            // 半成品的計劃量不影響比例
            PlanEntry::new("SF", period(1), dec(0), dec(0), dec(800)),
        ]);

        let allocator = PeriodAllocator::from_plan(&plan, &bom, &[period(1), period(2)]);

        assert_eq!(
            allocator.allocate(dec(60)),
            vec![(period(1), dec(30)), (period(2), dec(30))]
        );
    }

    proptest! {
        #[test]
        fn prop_allocation_sums_to_total(
            volumes in prop::collection::vec(0i64..1_000, 1..12),
            total in 0i64..1_000_000,
        ) {
            let periods: Vec<Period> = (1..=volumes.len() as u32).map(period).collect();
            let by_period: BTreeMap<Period, Decimal> = periods
                .iter()
                .zip(&volumes)
                .map(|(&p, &v)| (p, dec(v)))
                .collect();
            let shares = PeriodAllocator::new(periods, &by_period).allocate(dec(total));

            let sum: Decimal = shares.iter().map(|(_, qty)| *qty).sum();
            prop_assert_eq!(sum, dec(total));
            for ((_, qty), &volume) in shares.iter().zip(&volumes) {
                if volume == 0 && volumes.iter().any(|&v| v > 0) {
                    prop_assert_eq!(*qty, Decimal::ZERO);
                }
            }
        }
    }
}
