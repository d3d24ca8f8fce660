//! 時間分桶（計劃期間與展望期截斷）

use mrp_core::calendar::sorted_unique;
use mrp_core::{MrpWarning, Period};

/// 截斷後的計劃期間
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningPeriods {
    /// 按時間排序的期間
    pub periods: Vec<Period>,

    /// 要求的期數超過實際資料期數時的警告
    pub warning: Option<MrpWarning>,
}

/// 時間分桶計算器
pub struct BucketingCalculator;

impl BucketingCalculator {
    /// 由資料中的期間建立計劃期間
    ///
    /// 期間排序去重後取前 `horizon` 期；資料期數不足時以實際期數為準並提示。
    pub fn planning_periods(
        periods: impl IntoIterator<Item = Period>,
        horizon: u32,
    ) -> PlanningPeriods {
        let mut periods = sorted_unique(periods);
        let available = periods.len();
        let requested = horizon as usize;

        let warning = if requested > available {
            tracing::warn!(
                "計劃期數 {} 超過資料期數 {}，以資料期數為準",
                requested,
                available
            );
            Some(MrpWarning::warning(
                "",
                format!("計劃期數 {requested} 超過資料期數 {available}，以資料期數為準"),
            ))
        } else {
            if requested < available {
                tracing::info!("計劃期數超過設定值，已截斷為 {} 期", requested);
            }
            periods.truncate(requested);
            None
        };

        PlanningPeriods { periods, warning }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(month: u32) -> Period {
        Period::new(2025, month).unwrap()
    }

    #[test]
    fn test_periods_sorted_and_truncated() {
        let result = BucketingCalculator::planning_periods(
            vec![period(3), period(1), period(2), period(1), period(4)],
            3,
        );

        assert_eq!(result.periods, vec![period(1), period(2), period(3)]);
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_horizon_clamped_to_available_data() {
        let result = BucketingCalculator::planning_periods(vec![period(2), period(1)], 6);

        assert_eq!(result.periods, vec![period(1), period(2)]);
        let warning = result.warning.unwrap();
        assert!(warning.message.contains('6'));
        assert!(warning.message.contains('2'));
    }

    #[test]
    fn test_crosses_year_boundary() {
        let dec = Period::new(2024, 12).unwrap();
        let result = BucketingCalculator::planning_periods(vec![period(1), dec], 2);
        assert_eq!(result.periods, vec![dec, period(1)]);
    }
}
