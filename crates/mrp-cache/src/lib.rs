//! # MRP Cache
//!
//! 增量計算模組：手動調整後的庫存傳播與衍生結果過期追蹤

pub mod dirty_tracking;
pub mod incremental;

// Re-export 主要類型
pub use dirty_tracking::DirtyTracker;
pub use incremental::PropagationEngine;
