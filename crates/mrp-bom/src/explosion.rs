//! BOM 展開

use mrp_core::{MaterialType, MrpError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::classify::Classification;
use crate::graph::{MaterialGraph, NodeIndex};

/// 展開選項
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplodeOptions {
    /// 展開層數，`None` 表示全部展開
    pub max_levels: Option<u32>,

    /// 只保留指定類型的組件
    pub type_filter: Option<MaterialType>,

    /// 同時輸出中間節點（半成品需求計算用）
    pub include_intermediate: bool,
}

impl ExplodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置展開層數
    pub fn with_max_levels(mut self, levels: u32) -> Self {
        self.max_levels = Some(levels);
        self
    }

    /// 建構器模式：設置類型篩選
    pub fn with_type_filter(mut self, material_type: MaterialType) -> Self {
        self.type_filter = Some(material_type);
        self
    }

    /// 建構器模式：輸出中間節點的累計用量
    pub fn with_intermediates(mut self) -> Self {
        self.include_intermediate = true;
        self
    }
}

/// 展開後的組件（同一組件多條路徑已合併）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplodedComponent {
    /// 組件ID
    pub component_id: String,

    /// 描述
    pub description: Option<String>,

    /// 物料類型
    pub material_type: MaterialType,

    /// 相對於頂層物料一個單位的總用量
    pub total_qty: Decimal,

    /// 出現的最小層級（直接子件為 1）
    pub min_level: u32,
}

/// 每個節點按到達層級累計的路徑用量
type Arrivals = BTreeMap<u32, Decimal>;

/// BOM 展開器
pub struct BomExplosion<'a> {
    graph: &'a MaterialGraph,
    types: &'a Classification,
}

impl<'a> BomExplosion<'a> {
    pub fn new(graph: &'a MaterialGraph, types: &'a Classification) -> Self {
        Self { graph, types }
    }

    /// 展開 BOM，回傳每個組件相對於頂層一個單位的累計用量
    ///
    /// 葉節點（或到達 `max_levels` 的節點）輸出所有路徑用量乘積之和，
    /// 層級取最小值。`include_intermediate` 時中間節點也輸出，並繼續向下展開。
    /// 按拓撲順序處理，同一節點、同一層級的多條路徑先合併再往下傳，
    /// 每條邊在每個層級最多走一次。結果按組件ID排序。
    pub fn explode(&self, root_id: &str, options: &ExplodeOptions) -> Result<Vec<ExplodedComponent>> {
        let root = self
            .graph
            .find_node(root_id)
            .ok_or_else(|| MrpError::MaterialNotFound(root_id.to_string()))?;

        let aggregated = match self.graph.topological_order() {
            Ok(order) => self.explode_in_order(root, &order, options),
            Err(_) => {
                tracing::warn!("BOM 圖含循環，物料 {} 的展開結果只沿每條邊走一次", root_id);
                self.explode_guarded(root, options)
            }
        };

        let components: Vec<ExplodedComponent> = aggregated
            .into_values()
            .filter(|c| options.type_filter.map_or(true, |t| c.material_type == t))
            .collect();

        if components.is_empty() {
            tracing::warn!("物料 {} 沒有符合條件的子組件", root_id);
        } else {
            tracing::debug!("展開物料 {} 的 BOM，包含 {} 個組件", root_id, components.len());
        }
        Ok(components)
    }

    /// 展開並乘上計劃數量
    pub fn explode_for_quantity(
        &self,
        root_id: &str,
        quantity: Decimal,
        options: &ExplodeOptions,
    ) -> Result<Vec<ExplodedComponent>> {
        let mut components = self.explode(root_id, options)?;
        for component in &mut components {
            component.total_qty *= quantity;
        }
        Ok(components)
    }

    /// 無循環圖：按拓撲順序傳遞路徑用量
    ///
    /// 處理到某節點時所有父件都已處理完，到達該節點的路徑已全部累計。
    /// 不限層數時只有最小層級會影響輸出，各層合併為一筆。
    fn explode_in_order(
        &self,
        root: NodeIndex,
        order: &[NodeIndex],
        options: &ExplodeOptions,
    ) -> BTreeMap<NodeIndex, ExplodedComponent> {
        let collapse = options.max_levels.is_none();
        let mut arrivals: Vec<Arrivals> = vec![Arrivals::new(); self.graph.node_count()];
        arrivals[root.index()].insert(0, Decimal::ONE);

        // NodeIndex 順序即ID順序，BTreeMap 輸出自然按ID排序
        let mut aggregated = BTreeMap::new();
        let from = order.iter().position(|&n| n == root).unwrap_or(0);

        for &node in &order[from..] {
            let reached = std::mem::take(&mut arrivals[node.index()]);
            for (level, path_qty) in reached {
                if !self.emit(&mut aggregated, root, node, level, path_qty, options) {
                    continue;
                }
                for edge in self.graph.children(node) {
                    arrive(
                        &mut arrivals[edge.child.index()],
                        level + 1,
                        path_qty * edge.quantity,
                        collapse,
                    );
                }
            }
        }
        aggregated
    }

    /// 含循環的圖（尚未通過循環檢查）：逐層廣度優先，每條（父件, 子件）邊只走一次
    fn explode_guarded(
        &self,
        root: NodeIndex,
        options: &ExplodeOptions,
    ) -> BTreeMap<NodeIndex, ExplodedComponent> {
        let mut aggregated = BTreeMap::new();
        let mut visited_edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        let mut frontier: BTreeMap<NodeIndex, Decimal> = BTreeMap::from([(root, Decimal::ONE)]);
        let mut level = 0;

        while !frontier.is_empty() {
            let mut next: BTreeMap<NodeIndex, Decimal> = BTreeMap::new();
            for (node, path_qty) in frontier {
                if !self.emit(&mut aggregated, root, node, level, path_qty, options) {
                    continue;
                }
                for edge in self.graph.children(node) {
                    if visited_edges.insert((edge.parent, edge.child)) {
                        *next.entry(edge.child).or_default() += path_qty * edge.quantity;
                    }
                }
            }
            frontier = next;
            level += 1;
        }
        aggregated
    }

    /// 輸出符合條件的節點；回傳是否繼續向下展開
    fn emit(
        &self,
        aggregated: &mut BTreeMap<NodeIndex, ExplodedComponent>,
        root: NodeIndex,
        node: NodeIndex,
        level: u32,
        path_qty: Decimal,
        options: &ExplodeOptions,
    ) -> bool {
        let is_leaf = self.graph.out_degree(node) == 0;
        let at_limit = options.max_levels.is_some_and(|max| level >= max);

        if (is_leaf || at_limit || options.include_intermediate) && node != root {
            aggregated
                .entry(node)
                .and_modify(|c: &mut ExplodedComponent| {
                    c.total_qty += path_qty;
                    c.min_level = c.min_level.min(level);
                })
                .or_insert_with(|| {
                    let material = self.graph.node(node);
                    ExplodedComponent {
                        component_id: material.id.clone(),
                        description: material.description.clone(),
                        material_type: self.types.type_of(node),
                        total_qty: path_qty,
                        min_level: level,
                    }
                });
        }
        !at_limit
    }
}

/// 累計到達子件的路徑用量；`collapse` 時只保留最小層級
fn arrive(arrivals: &mut Arrivals, level: u32, qty: Decimal, collapse: bool) {
    if collapse {
        let (level, sum) = match arrivals.pop_first() {
            Some((existing, sum)) => (existing.min(level), sum + qty),
            None => (level, qty),
        };
        arrivals.insert(level, sum);
    } else {
        *arrivals.entry(level).or_default() += qty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TypeClassifier;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn qty(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn explode_edges(
        edges: &[(&str, &str, i64)],
        root: &str,
        options: ExplodeOptions,
    ) -> Vec<ExplodedComponent> {
        let graph =
            MaterialGraph::from_edges(edges.iter().map(|&(p, c, q)| (p, c, qty(q)))).unwrap();
        let types = TypeClassifier::classify(&graph);
        BomExplosion::new(&graph, &types)
            .explode(root, &options)
            .unwrap()
    }

    fn totals(components: &[ExplodedComponent]) -> Vec<(&str, Decimal)> {
        components
            .iter()
            .map(|c| (c.component_id.as_str(), c.total_qty))
            .collect()
    }

    #[test]
    fn test_single_level_explosion_scaled_by_plan() {
        let graph = MaterialGraph::from_edges([("M001", "R001", qty(5)), ("M001", "C001", qty(3))])
            .unwrap();
        let types = TypeClassifier::classify(&graph);
        let explosion = BomExplosion::new(&graph, &types);

        let components = explosion
            .explode_for_quantity("M001", qty(10), &ExplodeOptions::new())
            .unwrap();

        assert_eq!(
            totals(&components),
            vec![("C001", qty(30)), ("R001", qty(50))]
        );
        assert!(components.iter().all(|c| c.min_level == 1));
    }

    #[test]
    fn test_multi_level_multiplies_path() {
        // BIKE -> FRAME x1 -> TUBE x3；BIKE -> WHEEL x2 -> SPOKE x36
        let components = explode_edges(
            &[
                ("BIKE", "FRAME", 1),
                ("FRAME", "TUBE", 3),
                ("BIKE", "WHEEL", 2),
                ("WHEEL", "SPOKE", 36),
            ],
            "BIKE",
            ExplodeOptions::new(),
        );

        assert_eq!(
            totals(&components),
            vec![("SPOKE", qty(72)), ("TUBE", qty(3))]
        );
        assert!(components.iter().all(|c| c.min_level == 2));
    }

    #[test]
    fn test_shared_component_sums_all_paths() {
        // 菱形結構：R 經由 S1、S2 兩條路徑，且 R 之下還有共用的邊 R -> X
        let components = explode_edges(
            &[
                ("FG", "S1", 2),
                ("FG", "S2", 3),
                ("S1", "R", 1),
                ("S2", "R", 1),
                ("R", "X", 4),
                ("FG", "X", 1),
            ],
            "FG",
            ExplodeOptions::new(),
        );

        // X = 2*1*4 + 3*1*4 + 1 = 21，最小層級來自直接邊
        let x = components.iter().find(|c| c.component_id == "X").unwrap();
        assert_eq!(x.total_qty, qty(21));
        assert_eq!(x.min_level, 1);
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn test_max_levels_stops_at_limit() {
        let edges = [("FG", "SF", 2), ("SF", "R", 5), ("FG", "R2", 1)];

        let level_one = explode_edges(&edges, "FG", ExplodeOptions::new().with_max_levels(1));
        assert_eq!(totals(&level_one), vec![("R2", qty(1)), ("SF", qty(2))]);

        let full = explode_edges(&edges, "FG", ExplodeOptions::new());
        assert_eq!(totals(&full), vec![("R", qty(10)), ("R2", qty(1))]);

        let none = explode_edges(&edges, "FG", ExplodeOptions::new().with_max_levels(0));
        assert!(none.is_empty());
    }

    #[test]
    fn test_type_filter_applied_after_aggregation() {
        let edges = [("FG", "SF", 2), ("SF", "R", 5), ("FG", "R", 1)];

        let raw = explode_edges(
            &edges,
            "FG",
            ExplodeOptions::new().with_type_filter(MaterialType::Raw),
        );
        assert_eq!(totals(&raw), vec![("R", qty(11))]);

        // 半成品不是葉節點，只有限制層數時才會輸出
        let semi = explode_edges(
            &edges,
            "FG",
            ExplodeOptions::new()
                .with_max_levels(1)
                .with_type_filter(MaterialType::SemiFinished),
        );
        assert_eq!(totals(&semi), vec![("SF", qty(2))]);
    }

    #[test]
    fn test_intermediates_report_gross_usage() {
        // FG -> SF x2 -> R x5；FG -> R x1
        let edges = [
            ("FG", "SF", 2),
            ("SF", "R", 5),
            ("FG", "R", 1),
        ];

        let semi = explode_edges(
            &edges,
            "FG",
            ExplodeOptions::new()
                .with_intermediates()
                .with_type_filter(MaterialType::SemiFinished),
        );
        assert_eq!(totals(&semi), vec![("SF", qty(2))]);

        // 葉節點的用量不受影響
        let all = explode_edges(&edges, "FG", ExplodeOptions::new().with_intermediates());
        assert_eq!(totals(&all), vec![("R", qty(11)), ("SF", qty(2))]);

        let plain = explode_edges(
            &edges,
            "FG",
            ExplodeOptions::new().with_type_filter(MaterialType::SemiFinished),
        );
        assert!(plain.is_empty());
    }

    #[test]
    fn test_max_levels_with_paths_of_different_length() {
        // A 在第 1 層（FG -> A）與第 2 層（FG -> B -> A）都會出現
        let edges = [("FG", "A", 1), ("FG", "B", 1), ("B", "A", 1), ("A", "R", 1)];

        let limited = explode_edges(&edges, "FG", ExplodeOptions::new().with_max_levels(2));
        assert_eq!(totals(&limited), vec![("A", qty(1)), ("R", qty(1))]);
        assert_eq!(limited[0].min_level, 2);
        assert_eq!(limited[1].min_level, 2);

        let full = explode_edges(&edges, "FG", ExplodeOptions::new());
        assert_eq!(totals(&full), vec![("R", qty(2))]);
        assert_eq!(full[0].min_level, 2);
    }

    #[test]
    fn test_deep_shared_layers_stay_linear() {
        // 每層兩個節點，相鄰兩層全連接：到底層的路徑數為 2^DEPTH
        const DEPTH: usize = 60;
        let name = |layer: usize, slot: usize| format!("L{layer:02}-{slot}");

        let mut owned: Vec<(String, String)> = vec![
            ("ROOT".to_string(), name(0, 0)),
            ("ROOT".to_string(), name(0, 1)),
        ];
        for layer in 0..DEPTH - 1 {
            for from in 0..2 {
                for to in 0..2 {
                    owned.push((name(layer, from), name(layer + 1, to)));
                }
            }
        }
        owned.push((name(DEPTH - 1, 0), "LEAF".to_string()));
        owned.push((name(DEPTH - 1, 1), "LEAF".to_string()));

        let graph = MaterialGraph::from_edges(
            owned.iter().map(|(p, c)| (p.as_str(), c.as_str(), Decimal::ONE)),
        )
        .unwrap();
        let types = TypeClassifier::classify(&graph);
        let explosion = BomExplosion::new(&graph, &types);

        let leaves = explosion.explode("ROOT", &ExplodeOptions::new()).unwrap();
        assert_eq!(totals(&leaves), vec![("LEAF", Decimal::from(1u64 << DEPTH))]);
        assert_eq!(leaves[0].min_level, DEPTH as u32 + 1);

        let limited = explosion
            .explode("ROOT", &ExplodeOptions::new().with_max_levels(DEPTH as u32))
            .unwrap();
        assert_eq!(limited.len(), 2);
        assert!(limited
            .iter()
            .all(|c| c.total_qty == Decimal::from(1u64 << (DEPTH - 1))));
    }

    #[test]
    fn test_unknown_root_rejected() {
        let graph = MaterialGraph::from_edges([("FG", "R", qty(1))]).unwrap();
        let types = TypeClassifier::classify(&graph);
        let result = BomExplosion::new(&graph, &types).explode("NOPE", &ExplodeOptions::new());
        assert!(matches!(result, Err(MrpError::MaterialNotFound(id)) if id == "NOPE"));
    }

    #[test]
    fn test_cycle_does_not_loop_forever() {
        // 未經循環檢查的圖：A -> B -> A，B -> R
        let components = explode_edges(
            &[("A", "B", 2), ("B", "A", 1), ("B", "R", 3)],
            "A",
            ExplodeOptions::new(),
        );
        assert!(components.iter().any(|c| c.component_id == "R"));
    }

    /// 以遞迴方式列舉所有路徑計算期望用量
    fn path_sums(
        children: &HashMap<String, Vec<(String, i64)>>,
        node: &str,
        multiplier: i64,
        out: &mut HashMap<String, i64>,
    ) {
        match children.get(node) {
            Some(list) if !list.is_empty() => {
                for (child, q) in list {
                    path_sums(children, child, multiplier * q, out);
                }
            }
            _ => *out.entry(node.to_string()).or_default() += multiplier,
        }
    }

    /// 產生分層 DAG：邊只從較小層指向較大層
    fn layered_edges() -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
        prop::collection::vec((0usize..4, 1usize..4, 0usize..3, 1i64..5), 1..12).prop_map(
            |raw| {
                let mut seen = std::collections::HashSet::new();
                raw.into_iter()
                    .filter_map(|(layer, gap, slot, q)| {
                        let from = layer * 3 + slot;
                        let to = ((layer + gap).min(4)) * 3 + slot.min(2);
                        (from / 3 < to / 3 && seen.insert((from, to))).then_some((from, to, q))
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_total_equals_sum_over_paths(edges in layered_edges(), plan_qty in 1i64..20) {
            prop_assume!(!edges.is_empty());
            let name = |i: usize| format!("N{i:02}");
            let root = name(edges[0].0);

            let named: Vec<(String, String, i64)> =
                edges.iter().map(|&(p, c, q)| (name(p), name(c), q)).collect();
            let graph = MaterialGraph::from_edges(
                named.iter().map(|(p, c, q)| (p.as_str(), c.as_str(), qty(*q))),
            )
            .unwrap();
            let types = TypeClassifier::classify(&graph);
            let result = BomExplosion::new(&graph, &types)
                .explode_for_quantity(&root, qty(plan_qty), &ExplodeOptions::new())
                .unwrap();

            let mut children: HashMap<String, Vec<(String, i64)>> = HashMap::new();
            for &(p, c, q) in &edges {
                children.entry(name(p)).or_default().push((name(c), q));
            }
            let mut expected = HashMap::new();
            path_sums(&children, &root, plan_qty, &mut expected);
            expected.remove(&root);

            prop_assert_eq!(result.len(), expected.len());
            for component in &result {
                prop_assert_eq!(component.total_qty, qty(expected[&component.component_id]));
            }
        }

        #[test]
        fn prop_result_independent_of_edge_order(edges in layered_edges(), seed in any::<u64>()) {
            prop_assume!(!edges.is_empty());
            let name = |i: usize| format!("N{i:02}");
            let root = name(edges[0].0);

            let mut shuffled = edges.clone();
            // 簡單的確定性洗牌
            let len = shuffled.len();
            for i in 0..len {
                let j = ((seed as usize).wrapping_add(i * 7919)) % len;
                shuffled.swap(i, j);
            }

            let run = |list: &[(usize, usize, i64)]| {
                let named: Vec<(String, String, i64)> =
                    list.iter().map(|&(p, c, q)| (name(p), name(c), q)).collect();
                let graph = MaterialGraph::from_edges(
                    named.iter().map(|(p, c, q)| (p.as_str(), c.as_str(), qty(*q))),
                )
                .unwrap();
                let types = TypeClassifier::classify(&graph);
                BomExplosion::new(&graph, &types)
                    .explode(&root, &ExplodeOptions::new())
                    .unwrap()
            };

            prop_assert_eq!(run(&edges), run(&shuffled));
        }
    }
}
