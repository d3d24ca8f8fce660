//! # MRP BOM
//!
//! 物料清單圖、類型推斷與多層展開

pub mod classify;
pub mod explosion;
pub mod graph;
pub mod loader;

pub use classify::{Classification, TypeClassifier};
pub use explosion::{BomExplosion, ExplodeOptions, ExplodedComponent};
pub use graph::{BomEdge, MaterialGraph, MaterialGraphBuilder, MaterialNode, NodeIndex};
pub use loader::{BomLoader, LoadedBom};
