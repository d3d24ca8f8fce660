//! BOM 載入：建圖、循環檢查、類型推斷、層次驗證

use mrp_core::{BomRow, HierarchyPolicy, Material, MaterialType, MrpError, MrpWarning, Result};
use rust_decimal::Decimal;

use crate::classify::{Classification, TypeClassifier};
use crate::explosion::{BomExplosion, ExplodeOptions, ExplodedComponent};
use crate::graph::MaterialGraph;

/// 已驗證的 BOM
#[derive(Debug, Clone)]
pub struct LoadedBom {
    graph: MaterialGraph,
    types: Classification,
    warnings: Vec<MrpWarning>,
}

impl LoadedBom {
    pub fn graph(&self) -> &MaterialGraph {
        &self.graph
    }

    pub fn classification(&self) -> &Classification {
        &self.types
    }

    /// 載入過程產生的警告（孤立節點、層次違規等）
    pub fn warnings(&self) -> &[MrpWarning] {
        &self.warnings
    }

    /// 物料類型；不在 BOM 中時回傳 `None`
    pub fn material_type(&self, id: &str) -> Option<MaterialType> {
        self.graph.find_node(id).map(|idx| self.types.type_of(idx))
    }

    pub fn material(&self, id: &str) -> Option<Material> {
        let idx = self.graph.find_node(id)?;
        let node = self.graph.node(idx);
        Some(Material {
            id: node.id.clone(),
            material_type: self.types.type_of(idx),
            description: node.description.clone(),
        })
    }

    /// 所有物料，按ID排序
    pub fn materials(&self) -> Vec<Material> {
        self.graph
            .nodes()
            .map(|(idx, node)| Material {
                id: node.id.clone(),
                material_type: self.types.type_of(idx),
                description: node.description.clone(),
            })
            .collect()
    }

    pub fn explosion(&self) -> BomExplosion<'_> {
        BomExplosion::new(&self.graph, &self.types)
    }

    pub fn explode(&self, root_id: &str, options: &ExplodeOptions) -> Result<Vec<ExplodedComponent>> {
        self.explosion().explode(root_id, options)
    }

    pub fn explode_for_quantity(
        &self,
        root_id: &str,
        quantity: Decimal,
        options: &ExplodeOptions,
    ) -> Result<Vec<ExplodedComponent>> {
        self.explosion().explode_for_quantity(root_id, quantity, options)
    }
}

/// BOM 載入器
pub struct BomLoader;

impl BomLoader {
    /// 由 BOM 資料列載入
    ///
    /// 有循環時一律拒絕；層次違規依 `policy` 拒絕或轉為警告。
    pub fn load(rows: &[BomRow], policy: HierarchyPolicy) -> Result<LoadedBom> {
        let mut builder = MaterialGraph::builder();
        for row in rows {
            builder.add_edge(&row.parent_id, &row.child_id, row.qty_per_unit)?;
            if let Some(description) = &row.parent_description {
                builder.describe(&row.parent_id, description);
            }
            if let Some(description) = &row.child_description {
                builder.describe(&row.child_id, description);
            }
            if let Some(t) = row.parent_type {
                builder.declare_type(&row.parent_id, t)?;
            }
            if let Some(t) = row.child_type {
                builder.declare_type(&row.child_id, t)?;
            }
        }
        let graph = builder.build();

        graph.validate_acyclic()?;

        let types = TypeClassifier::classify(&graph);
        let mut warnings: Vec<MrpWarning> = types
            .nodes_of_type(MaterialType::Unknown)
            .map(|idx| MrpWarning::warning(&graph.node(idx).id, "孤立節點，無法確定物料類型"))
            .collect();

        let violations = TypeClassifier::hierarchy_violations(&graph, &types);
        match policy {
            HierarchyPolicy::Reject => {
                if let Some(violation) = violations.into_iter().next() {
                    tracing::error!("BOM 層次結構驗證失敗: {}", violation);
                    return Err(violation);
                }
            }
            HierarchyPolicy::Warn => {
                for violation in violations {
                    tracing::warn!("BOM 層次結構違規（僅警告）: {}", violation);
                    let material = match &violation {
                        MrpError::Hierarchy { material, .. } => material.clone(),
                        _ => String::new(),
                    };
                    warnings.push(MrpWarning::warning(material, violation.to_string()));
                }
            }
        }

        tracing::info!(
            "BOM 載入完成: {} 個物料, {} 條邊, {} 個警告",
            graph.node_count(),
            graph.edge_count(),
            warnings.len()
        );

        Ok(LoadedBom {
            graph,
            types,
            warnings,
        })
    }
}
