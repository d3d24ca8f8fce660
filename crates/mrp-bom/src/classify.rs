//! 物料類型推斷與層次結構驗證

use mrp_core::{MaterialType, MrpError, Result};
use std::collections::BTreeSet;

use crate::graph::{MaterialGraph, NodeIndex};

/// 分類結果（按節點索引）
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    types: Vec<MaterialType>,
}

impl Classification {
    pub fn type_of(&self, idx: NodeIndex) -> MaterialType {
        self.types[idx.index()]
    }

    /// 指定類型的物料數量
    pub fn count(&self, material_type: MaterialType) -> usize {
        self.types.iter().filter(|&&t| t == material_type).count()
    }

    pub fn nodes_of_type(&self, material_type: MaterialType) -> impl Iterator<Item = NodeIndex> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(move |(_, t)| **t == material_type)
            .map(|(i, _)| NodeIndex::from_index(i))
    }
}

/// 物料類型分類器
pub struct TypeClassifier;

impl TypeClassifier {
    /// 根據拓撲推斷類型；已明確指定類型的物料保持原值
    ///
    /// | 出度 | 入度 | 類型 |
    /// |------|------|------|
    /// | 0    | >0   | Raw |
    /// | >0   | 0    | Finished |
    /// | >0   | >0   | SemiFinished |
    /// | 0    | 0    | Unknown（孤立節點） |
    pub fn classify(graph: &MaterialGraph) -> Classification {
        let types: Vec<MaterialType> = graph
            .nodes()
            .map(|(idx, node)| {
                if let Some(declared) = node.declared_type {
                    return declared;
                }
                match (graph.out_degree(idx) > 0, graph.in_degree(idx) > 0) {
                    (false, true) => MaterialType::Raw,
                    (true, false) => MaterialType::Finished,
                    (true, true) => MaterialType::SemiFinished,
                    (false, false) => {
                        tracing::warn!("物料 {} 在 BOM 中是孤立節點，無法確定類型", node.id);
                        MaterialType::Unknown
                    }
                }
            })
            .collect();

        let classification = Classification { types };
        tracing::info!(
            "物料類型推斷完成，成品: {}, 半成品: {}, 基礎原料: {}, 未知: {}",
            classification.count(MaterialType::Finished),
            classification.count(MaterialType::SemiFinished),
            classification.count(MaterialType::Raw),
            classification.count(MaterialType::Unknown)
        );
        classification
    }

    /// 驗證層次結構，回報第一個違規（按物料ID順序）
    pub fn validate_hierarchy(graph: &MaterialGraph, types: &Classification) -> Result<()> {
        match Self::hierarchy_violations(graph, types).into_iter().next() {
            Some(violation) => Err(violation),
            None => Ok(()),
        }
    }

    /// 所有層次結構違規
    ///
    /// - 成品：子件全為原料，或由原料與半成品組成（至少一個原料，不含其他類型）
    /// - 半成品：子件全為原料
    pub fn hierarchy_violations(graph: &MaterialGraph, types: &Classification) -> Vec<MrpError> {
        let mut violations = Vec::new();

        for (idx, node) in graph.nodes() {
            let parent_type = types.type_of(idx);
            let child_types: Vec<MaterialType> =
                graph.children(idx).map(|e| types.type_of(e.child)).collect();

            let (valid, expected) = match parent_type {
                MaterialType::Finished => {
                    let only_raw_or_semi = child_types
                        .iter()
                        .all(|t| matches!(t, MaterialType::Raw | MaterialType::SemiFinished));
                    let has_raw = child_types.contains(&MaterialType::Raw);
                    (only_raw_or_semi && has_raw, "Raw 或 Raw+SemiFinished")
                }
                MaterialType::SemiFinished => (
                    child_types.iter().all(|t| *t == MaterialType::Raw),
                    "Raw",
                ),
                MaterialType::Raw | MaterialType::Unknown => continue,
            };

            if child_types.is_empty() {
                // 只有明確指定類型時才會出現
                tracing::warn!("{} {} 沒有子件", parent_type, node.id);
                continue;
            }

            if !valid {
                let actual = child_types
                    .iter()
                    .map(|t| t.label())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect::<Vec<_>>()
                    .join("+");
                violations.push(MrpError::Hierarchy {
                    material: node.id.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        violations
    }
}
