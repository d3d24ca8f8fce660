//! 髒標記追蹤

use std::collections::BTreeSet;
use uuid::Uuid;

/// 髒標記追蹤器
///
/// 記錄某次計算（`run_id`）之後被手動調整過的物料。
/// 由這次計算衍生的報表與摘要在有髒標記時需要重新計算。
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    baseline: Option<Uuid>,
    dirty_components: BTreeSet<String>,
}

impl DirtyTracker {
    /// 創建新的追蹤器（尚未綁定計算批次）
    pub fn new() -> Self {
        Self::default()
    }

    /// 綁定計算批次
    pub fn for_run(run_id: Uuid) -> Self {
        Self {
            baseline: Some(run_id),
            dirty_components: BTreeSet::new(),
        }
    }

    /// 重新計算後以新的批次為基準，清除所有髒標記
    pub fn reset(&mut self, run_id: Uuid) {
        self.baseline = Some(run_id);
        self.dirty_components.clear();
    }

    /// 標記物料為髒
    pub fn mark_dirty(&mut self, component_id: impl Into<String>) {
        self.dirty_components.insert(component_id.into());
    }

    /// 檢查物料是否為髒
    pub fn is_dirty(&self, component_id: &str) -> bool {
        self.dirty_components.contains(component_id)
    }

    /// 指定批次的衍生結果是否已過期
    ///
    /// 批次不是目前基準，或基準之後有任何調整，都視為過期。
    pub fn is_stale(&self, run_id: Uuid) -> bool {
        self.baseline != Some(run_id) || !self.dirty_components.is_empty()
    }

    /// 獲取所有髒物料（按ID排序）
    pub fn dirty_components(&self) -> Vec<&str> {
        self.dirty_components.iter().map(String::as_str).collect()
    }
}
