//! 銷售預測（外部協作者介面）
//!
//! 統計預測模型不在本引擎範圍內，這裡只定義生產計劃階段消費的記錄格式。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Period, Result};

/// 預測方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastMethod {
    Arima,
    ExponentialSmoothing,
    MovingAverage,
}

/// 預測記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// 物料ID
    pub material_id: String,

    /// 期間
    pub period: Period,

    /// 預測值
    pub value: Decimal,

    /// 信賴區間下限
    pub lower: Option<Decimal>,

    /// 信賴區間上限
    pub upper: Option<Decimal>,
}

impl ForecastRecord {
    pub fn new(material_id: impl Into<String>, period: Period, value: Decimal) -> Self {
        Self {
            material_id: material_id.into(),
            period,
            value,
            lower: None,
            upper: None,
        }
    }

    /// 建構器模式：設置信賴區間
    pub fn with_bounds(mut self, lower: Decimal, upper: Decimal) -> Self {
        self.lower = Some(lower);
        self.upper = Some(upper);
        self
    }
}

/// 預測來源
pub trait ForecastSource {
    /// 產生預測
    ///
    /// * `material` - 只預測指定物料，`None` 表示全部
    /// * `periods` - 每個物料的預測期數
    /// * `method` - 預測方法，`None` 由實作自行選擇
    fn forecast(
        &self,
        material: Option<&str>,
        periods: u32,
        method: Option<ForecastMethod>,
    ) -> Result<Vec<ForecastRecord>>;
}

/// 記憶體內的固定預測（測試與外部已算好的預測結果）
#[derive(Debug, Clone, Default)]
pub struct StaticForecast {
    records: Vec<ForecastRecord>,
}

impl StaticForecast {
    pub fn new(records: Vec<ForecastRecord>) -> Self {
        Self { records }
    }
}

impl ForecastSource for StaticForecast {
    fn forecast(
        &self,
        material: Option<&str>,
        periods: u32,
        _method: Option<ForecastMethod>,
    ) -> Result<Vec<ForecastRecord>> {
        // 每個物料按期間排序後取前 N 期
        let mut by_material: BTreeMap<&str, Vec<&ForecastRecord>> = BTreeMap::new();
        for record in &self.records {
            if material.is_some_and(|m| m != record.material_id) {
                continue;
            }
            by_material
                .entry(record.material_id.as_str())
                .or_default()
                .push(record);
        }

        let mut result = Vec::new();
        for (_, mut records) in by_material {
            records.sort_by_key(|r| r.period);
            result.extend(records.into_iter().take(periods as usize).cloned());
        }
        Ok(result)
    }
}
