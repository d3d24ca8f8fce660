//! # MRP Planner
//!
//! 多層 BOM 展開與分期淨需求計算引擎
//!
//! - [`mrp_core`]：資料模型、參數、錯誤
//! - [`mrp_bom`]：BOM 圖、類型推斷、展開
//! - [`mrp_calc`]：生產計劃、物料需求、採購計劃
//! - [`mrp_cache`]：手動調整後的庫存傳播

pub mod logging;
pub mod settings;

pub use mrp_bom::{BomLoader, ExplodeOptions, ExplodedComponent, LoadedBom, MaterialGraph};
pub use mrp_cache::{DirtyTracker, PropagationEngine};
pub use mrp_calc::{
    MrpCalculator, MrpReport, MrpSummary, ProductionPlan, PurchasePlan, PurchasePlanExt,
};
pub use mrp_core::{
    MaterialType, MrpError, MrpParameters, MrpWarning, Period, PlanEntry, PlanTable, Result,
};
pub use settings::{load_parameters, SettingsError};
