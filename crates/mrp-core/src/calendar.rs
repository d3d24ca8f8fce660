//! 計劃期間（年-月）模型

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MrpError, Result};

/// 計劃期間
///
/// 以 `year * 12 + month` 全序排列；欄位順序即比較順序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// 創建新的期間，月份必須在 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(MrpError::Validation(format!(
                "無效的月份: {year}-{month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// 期間起始日（當月 1 日）
    pub fn start_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| MrpError::Validation(format!("無效的日期: {self}")))
    }

    /// 從起始日往前推算天數（日曆日）
    pub fn days_before_start(&self, days: u32) -> Result<NaiveDate> {
        self.start_date()?
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| MrpError::Validation(format!("日期溢出: {self} - {days} 天")))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// 整理期間序列：排序並去重
pub fn sorted_unique(periods: impl IntoIterator<Item = Period>) -> Vec<Period> {
    let mut sorted: Vec<Period> = periods.into_iter().collect();
    sorted.sort();
    sorted.dedup();
    sorted
}
