//! 計劃表模型

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::{MrpError, Period};

/// 每月換算天數
pub const DAYS_PER_PERIOD: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// 庫存覆蓋天數
///
/// 需求為 0 時覆蓋天數為無限大。序列化為數字字串或 `"inf"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageDays {
    Days(Decimal),
    Infinite,
}

impl CoverageDays {
    /// `ending / (demand / 30)`
    pub fn compute(ending_inventory: Decimal, demand: Decimal) -> Self {
        if demand > Decimal::ZERO {
            CoverageDays::Days(ending_inventory * DAYS_PER_PERIOD / demand)
        } else {
            CoverageDays::Infinite
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, CoverageDays::Infinite)
    }

    /// 有限值
    pub fn days(&self) -> Option<Decimal> {
        match self {
            CoverageDays::Days(days) => Some(*days),
            CoverageDays::Infinite => None,
        }
    }

    /// 轉為浮點數（報表用）
    pub fn as_f64(&self) -> f64 {
        match self {
            CoverageDays::Days(days) => days.to_string().parse().unwrap_or(f64::NAN),
            CoverageDays::Infinite => f64::INFINITY,
        }
    }
}

impl fmt::Display for CoverageDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageDays::Days(days) => write!(f, "{}", days.round_dp(1)),
            CoverageDays::Infinite => f.write_str("inf"),
        }
    }
}

impl Serialize for CoverageDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CoverageDays::Days(days) => Serialize::serialize(days, serializer),
            CoverageDays::Infinite => serializer.serialize_str("inf"),
        }
    }
}

impl<'de> Deserialize<'de> for CoverageDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "inf" {
            return Ok(CoverageDays::Infinite);
        }
        raw.parse::<Decimal>()
            .map(CoverageDays::Days)
            .map_err(serde::de::Error::custom)
    }
}

/// 單期計劃記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// 物料ID
    pub material_id: String,

    /// 期間
    pub period: Period,

    /// 毛需求
    pub demand: Decimal,

    /// 安全庫存（需求 × 安全庫存天數 / 30）
    pub safety_stock: Decimal,

    /// 淨需求（計劃時計算，調整時不變）
    pub net_demand: Decimal,

    /// 期初庫存
    pub beginning_inventory: Decimal,

    /// 計劃生產/採購量
    pub produced: Decimal,

    /// 期末庫存
    pub ending_inventory: Decimal,

    /// 庫存覆蓋天數
    pub coverage_days: CoverageDays,
}

impl PlanEntry {
    /// 以期初庫存、生產量與需求建立記錄，並推導期末庫存與覆蓋天數
    pub fn new(
        material_id: impl Into<String>,
        period: Period,
        demand: Decimal,
        beginning_inventory: Decimal,
        produced: Decimal,
    ) -> Self {
        let mut entry = Self {
            material_id: material_id.into(),
            period,
            demand,
            safety_stock: Decimal::ZERO,
            net_demand: Decimal::ZERO,
            beginning_inventory,
            produced,
            ending_inventory: Decimal::ZERO,
            coverage_days: CoverageDays::Infinite,
        };
        entry.recompute_ending();
        entry
    }

    /// 建構器模式：設置安全庫存與淨需求
    pub fn with_netting(mut self, safety_stock: Decimal, net_demand: Decimal) -> Self {
        self.safety_stock = safety_stock;
        self.net_demand = net_demand;
        self
    }

    /// 期末庫存 = 期初 + 生產 - 需求
    pub fn recompute_ending(&mut self) {
        self.ending_inventory = self.beginning_inventory + self.produced - self.demand;
        self.coverage_days = CoverageDays::compute(self.ending_inventory, self.demand);
    }

    /// 庫存守恆檢查
    pub fn is_conserved(&self) -> bool {
        self.ending_inventory == self.beginning_inventory + self.produced - self.demand
    }
}

/// 可放入計劃表的記錄
///
/// 生產計劃直接使用 [`PlanEntry`]；採購計劃在其上附加供應商與成本。
pub trait PlanRecord {
    fn entry(&self) -> &PlanEntry;

    fn entry_mut(&mut self) -> &mut PlanEntry;

    /// 手動覆寫數量；附加欄位（如成本）由實作自行更新
    fn set_quantity(&mut self, quantity: Decimal) {
        self.entry_mut().produced = quantity;
    }
}

impl PlanRecord for PlanEntry {
    fn entry(&self) -> &PlanEntry {
        self
    }

    fn entry_mut(&mut self) -> &mut PlanEntry {
        self
    }
}

/// 計劃表
///
/// 每次完整計算產生新的 `run_id`；記錄按（物料, 期間）排序。
/// 記錄只能透過 [`PlanTable::roll_forward`] 修改，排序不會被破壞。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanTable<T> {
    run_id: Uuid,
    entries: Vec<T>,
}

impl<T: PlanRecord> PlanTable<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self::sorted(Uuid::new_v4(), entries)
    }

    /// 還原已儲存的計劃表（保留原 `run_id`）
    ///
    /// 記錄重新排序；同一（物料, 期間）出現兩次時回傳 `Validation`。
    pub fn restore(run_id: Uuid, entries: Vec<T>) -> crate::Result<Self> {
        let table = Self::sorted(run_id, entries);
        if let Some(pair) = table
            .entries
            .windows(2)
            .find(|pair| record_key(&pair[0]) == record_key(&pair[1]))
        {
            let (material_id, period) = record_key(&pair[0]);
            return Err(MrpError::Validation(format!(
                "計劃表記錄重複: {material_id} {period}"
            )));
        }
        Ok(table)
    }

    fn sorted(run_id: Uuid, mut entries: Vec<T>) -> Self {
        entries.sort_by(|a, b| record_key(a).cmp(&record_key(b)));
        Self { run_id, entries }
    }

    /// 計算批次ID
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 查找（物料, 期間）的位置
    pub fn position(&self, material_id: &str, period: Period) -> Option<usize> {
        self.entries
            .binary_search_by(|record| record_key(record).cmp(&(material_id, period)))
            .ok()
    }

    /// 覆寫（物料, 期間）的計劃量，並依序重算同物料之後各期的庫存
    ///
    /// 之後各期的計劃量不變，只更新期初/期末庫存與覆蓋天數。
    /// 找不到記錄時回傳 `NotFound`，計劃表不變。回傳向後重算的期數。
    pub fn roll_forward(
        &mut self,
        material_id: &str,
        period: Period,
        quantity: Decimal,
    ) -> crate::Result<usize> {
        let start = self
            .position(material_id, period)
            .ok_or_else(|| MrpError::NotFound {
                material: material_id.to_string(),
                period,
            })?;

        let (edited, later) = self.entries[start..]
            .split_first_mut()
            .ok_or_else(|| MrpError::NotFound {
                material: material_id.to_string(),
                period,
            })?;
        edited.set_quantity(quantity);
        edited.entry_mut().recompute_ending();
        let mut previous_ending = edited.entry().ending_inventory;

        // 同物料的後續期間緊接在後
        let mut propagated = 0;
        for record in later
            .iter_mut()
            .take_while(|record| record.entry().material_id == material_id)
        {
            let entry = record.entry_mut();
            entry.beginning_inventory = previous_ending;
            entry.recompute_ending();
            previous_ending = entry.ending_inventory;
            propagated += 1;
        }
        Ok(propagated)
    }

    pub fn find(&self, material_id: &str, period: Period) -> Option<&T> {
        self.position(material_id, period).map(|i| &self.entries[i])
    }

    /// 指定物料的所有記錄（按期間排序）
    pub fn for_material<'a>(&'a self, material_id: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        self.entries
            .iter()
            .filter(move |record| record.entry().material_id == material_id)
    }

    /// 所有物料ID（排序、去重）
    pub fn materials(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .map(|record| record.entry().material_id.as_str())
            .collect();
        ids.dedup();
        ids
    }

    /// 所有期間（排序、去重）
    pub fn periods(&self) -> Vec<Period> {
        crate::calendar::sorted_unique(self.entries.iter().map(|record| record.entry().period))
    }
}

impl<'de, T> Deserialize<'de> for PlanTable<T>
where
    T: PlanRecord + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Stored<R> {
            run_id: Uuid,
            entries: Vec<R>,
        }

        let stored = Stored::<T>::deserialize(deserializer)?;
        PlanTable::restore(stored.run_id, stored.entries).map_err(serde::de::Error::custom)
    }
}

fn record_key<T: PlanRecord>(record: &T) -> (&str, Period) {
    let entry = record.entry();
    (entry.material_id.as_str(), entry.period)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(month: u32) -> Period {
        Period::new(2025, month).unwrap()
    }

    #[test]
    fn test_coverage_days() {
        assert_eq!(
            CoverageDays::compute(Decimal::from(500), Decimal::from(1000)),
            CoverageDays::Days(Decimal::from(15))
        );
        assert!(CoverageDays::compute(Decimal::from(500), Decimal::ZERO).is_infinite());
        assert_eq!(CoverageDays::Infinite.as_f64(), f64::INFINITY);
        assert_eq!(CoverageDays::Infinite.to_string(), "inf");
    }

    #[test]
    fn test_coverage_days_serde() {
        let json = serde_json::to_string(&CoverageDays::Infinite).unwrap();
        assert_eq!(json, "\"inf\"");
        let back: CoverageDays = serde_json::from_str(&json).unwrap();
        assert!(back.is_infinite());

        let finite: CoverageDays = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(finite.days(), Some(Decimal::new(125, 1)));
    }

    #[test]
    fn test_finite_coverage_serializes_as_decimal_string() {
        let days = CoverageDays::Days(Decimal::from(15));
        let json = serde_json::to_string(&days).unwrap();
        assert_eq!(json, "\"15\"");
        let back: CoverageDays = serde_json::from_str(&json).unwrap();
        assert_eq!(back, days);
    }

    #[test]
    fn test_plan_entry_conservation() {
        let entry = PlanEntry::new(
            "FG-1",
            period(1),
            Decimal::from(1000),
            Decimal::from(200),
            Decimal::from(1300),
        );
        assert_eq!(entry.ending_inventory, Decimal::from(500));
        assert_eq!(entry.coverage_days, CoverageDays::Days(Decimal::from(15)));
        assert!(entry.is_conserved());
    }

    #[test]
    fn test_plan_table_sorted_lookup() {
        let table = PlanTable::new(vec![
            PlanEntry::new("B", period(2), Decimal::ONE, Decimal::ZERO, Decimal::ONE),
            PlanEntry::new("A", period(2), Decimal::ONE, Decimal::ZERO, Decimal::ONE),
            PlanEntry::new("A", period(1), Decimal::ONE, Decimal::ZERO, Decimal::ONE),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.materials(), vec!["A", "B"]);
        assert_eq!(table.periods(), vec![period(1), period(2)]);
        assert_eq!(table.position("A", period(1)), Some(0));
        assert_eq!(table.position("B", period(2)), Some(2));
        assert!(table.find("C", period(1)).is_none());
        assert_eq!(table.for_material("A").count(), 2);
    }

    #[test]
    fn test_each_run_gets_new_id() {
        let first: PlanTable<PlanEntry> = PlanTable::new(Vec::new());
        let second: PlanTable<PlanEntry> = PlanTable::new(Vec::new());
        assert_ne!(first.run_id(), second.run_id());
    }

    fn rolling_plan() -> PlanTable<PlanEntry> {
        // A：每期需求 80、計劃量 100，期初 0
        let mut entries = Vec::new();
        let mut beginning = Decimal::ZERO;
        for month in 1..=3 {
            let entry = PlanEntry::new("A", period(month), Decimal::from(80), beginning, Decimal::from(100));
            beginning = entry.ending_inventory;
            entries.push(entry);
        }
        entries.push(PlanEntry::new("B", period(1), Decimal::from(10), Decimal::ZERO, Decimal::from(10)));
        PlanTable::new(entries)
    }

    #[test]
    fn test_roll_forward_updates_later_periods_only() {
        let mut table = rolling_plan();
        let propagated = table.roll_forward("A", period(1), Decimal::from(500)).unwrap();
        assert_eq!(propagated, 2);

        let a: Vec<&PlanEntry> = table.for_material("A").collect();
        assert_eq!(a[0].ending_inventory, Decimal::from(420));
        assert_eq!(a[1].beginning_inventory, Decimal::from(420));
        assert_eq!(a[1].produced, Decimal::from(100));
        assert_eq!(a[2].beginning_inventory, Decimal::from(440));
        assert!(a.iter().all(|e| e.is_conserved()));
        assert_eq!(table.find("B", period(1)).unwrap().ending_inventory, Decimal::ZERO);
    }

    #[test]
    fn test_deserialized_table_is_resorted() {
        let table = rolling_plan();
        let mut json = serde_json::to_value(&table).unwrap();
        json["entries"].as_array_mut().unwrap().reverse();

        let mut restored: PlanTable<PlanEntry> = serde_json::from_value(json).unwrap();
        assert_eq!(restored, table);
        assert_eq!(restored.run_id(), table.run_id());

        let propagated = restored.roll_forward("A", period(1), Decimal::from(500)).unwrap();
        assert_eq!(propagated, 2);
        assert_eq!(
            restored.find("A", period(2)).unwrap().beginning_inventory,
            Decimal::from(420)
        );
    }

    #[test]
    fn test_deserialize_rejects_duplicate_keys() {
        let mut json = serde_json::to_value(rolling_plan()).unwrap();
        let entries = json["entries"].as_array_mut().unwrap();
        let duplicate = entries[0].clone();
        entries.push(duplicate);

        let result: std::result::Result<PlanTable<PlanEntry>, _> = serde_json::from_value(json);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("計劃表記錄重複"), "{message}");
    }
}
