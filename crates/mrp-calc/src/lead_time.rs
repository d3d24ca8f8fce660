//! 交期計算

use chrono::NaiveDate;
use mrp_core::{Period, Result};

/// 交期計算器
///
/// 採購量在期間起始日到貨，下單日從到貨日往前推算提前期（日曆日，不排除假日）。
pub struct LeadTimeCalculator;

impl LeadTimeCalculator {
    /// 到貨日期（期間起始日）
    pub fn delivery_date(period: Period) -> Result<NaiveDate> {
        period.start_date()
    }

    /// 下單日期（向後推算提前期）
    pub fn order_date(period: Period, lead_time_days: u32) -> Result<NaiveDate> {
        period.days_before_start(lead_time_days)
    }
}
