//! BOM 有向圖（arena + 索引）

use mrp_core::{MaterialType, MrpError, Result};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 節點索引
///
/// `build()` 之後節點按物料ID排序，索引順序即ID順序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(i: usize) -> Self {
        NodeIndex(i as u32)
    }
}

/// 物料節點
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialNode {
    /// 物料ID
    pub id: String,

    /// 描述
    pub description: Option<String>,

    /// 輸入資料明確指定的類型（優先於推斷）
    pub declared_type: Option<MaterialType>,
}

/// BOM 邊：父件 → 子件，單位用量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BomEdge {
    pub parent: NodeIndex,
    pub child: NodeIndex,
    pub quantity: Decimal,
}

/// BOM 圖建構器
#[derive(Debug, Default)]
pub struct MaterialGraphBuilder {
    nodes: Vec<MaterialNode>,
    index: HashMap<String, usize>,
    edges: BTreeMap<(usize, usize), Decimal>,
}

impl MaterialGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, id: &str) -> usize {
        if let Some(&i) = self.index.get(id) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(MaterialNode {
            id: id.to_string(),
            description: None,
            declared_type: None,
        });
        self.index.insert(id.to_string(), i);
        i
    }

    /// 登記物料（孤立節點也可加入）
    pub fn add_material(&mut self, id: &str) -> &mut Self {
        self.intern(id);
        self
    }

    /// 設置描述；只保留第一個非空描述
    pub fn describe(&mut self, id: &str, description: &str) -> &mut Self {
        let i = self.intern(id);
        let node = &mut self.nodes[i];
        if node.description.is_none() && !description.trim().is_empty() {
            node.description = Some(description.to_string());
        }
        self
    }

    /// 明確指定物料類型；同一物料不可指定為不同類型
    pub fn declare_type(&mut self, id: &str, material_type: MaterialType) -> Result<&mut Self> {
        let i = self.intern(id);
        let node = &mut self.nodes[i];
        match node.declared_type {
            Some(existing) if existing != material_type => {
                return Err(MrpError::Validation(format!(
                    "物料 {id} 的類型衝突: {existing} / {material_type}"
                )));
            }
            _ => node.declared_type = Some(material_type),
        }
        Ok(self)
    }

    /// 添加 BOM 邊；同一（父件, 子件）重複出現時以後者的用量覆蓋
    pub fn add_edge(&mut self, parent: &str, child: &str, quantity: Decimal) -> Result<&mut Self> {
        if quantity <= Decimal::ZERO {
            return Err(MrpError::Validation(format!(
                "單位用量必須為正數: {parent} -> {child} = {quantity}"
            )));
        }
        let p = self.intern(parent);
        let c = self.intern(child);
        if self.edges.insert((p, c), quantity).is_some() {
            tracing::debug!("重複的 BOM 邊 {} -> {}，用量覆蓋為 {}", parent, child, quantity);
        }
        Ok(self)
    }

    /// 構建圖；節點按ID重新編號，與輸入順序無關
    pub fn build(self) -> MaterialGraph {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by(|&a, &b| self.nodes[a].id.cmp(&self.nodes[b].id));

        let mut remap = vec![0usize; self.nodes.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }

        let nodes: Vec<MaterialNode> = order.iter().map(|&old| self.nodes[old].clone()).collect();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), NodeIndex(i as u32)))
            .collect();

        let mut edges: Vec<BomEdge> = self
            .edges
            .iter()
            .map(|(&(p, c), &quantity)| BomEdge {
                parent: NodeIndex(remap[p] as u32),
                child: NodeIndex(remap[c] as u32),
                quantity,
            })
            .collect();
        edges.sort_by_key(|e| (e.parent, e.child));

        let mut children = vec![Vec::new(); nodes.len()];
        let mut parents = vec![Vec::new(); nodes.len()];
        for (i, edge) in edges.iter().enumerate() {
            children[edge.parent.index()].push(i);
            parents[edge.child.index()].push(i);
        }
        // edges 已按（父, 子）排序，children 自然按子件ID排序；parents 需另外排序
        for list in &mut parents {
            list.sort_by_key(|&i| edges[i].parent);
        }

        let graph = MaterialGraph {
            nodes,
            index,
            edges,
            children,
            parents,
        };
        tracing::info!(
            "BOM 圖構建成功，包含 {} 個節點和 {} 條邊",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }
}

/// BOM 有向圖
#[derive(Debug, Clone)]
pub struct MaterialGraph {
    nodes: Vec<MaterialNode>,
    index: HashMap<String, NodeIndex>,
    edges: Vec<BomEdge>,
    children: Vec<Vec<usize>>,
    parents: Vec<Vec<usize>>,
}

impl MaterialGraph {
    pub fn builder() -> MaterialGraphBuilder {
        MaterialGraphBuilder::new()
    }

    /// 從（父件, 子件, 用量）三元組構建
    pub fn from_edges<'a, I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str, Decimal)>,
    {
        let mut builder = MaterialGraphBuilder::new();
        for (parent, child, quantity) in edges {
            builder.add_edge(parent, child, quantity)?;
        }
        Ok(builder.build())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &MaterialNode {
        &self.nodes[idx.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &MaterialNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }

    pub fn edges(&self) -> &[BomEdge] {
        &self.edges
    }

    /// 直接子件（按子件ID排序）
    pub fn children(&self, idx: NodeIndex) -> impl Iterator<Item = &BomEdge> {
        self.children[idx.index()].iter().map(|&i| &self.edges[i])
    }

    /// 直接父件（按父件ID排序）
    pub fn parents(&self, idx: NodeIndex) -> impl Iterator<Item = &BomEdge> {
        self.parents[idx.index()].iter().map(|&i| &self.edges[i])
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.children[idx.index()].len()
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.parents[idx.index()].len()
    }

    /// 指定物料的直接子件及用量；物料不存在時回傳空列表
    pub fn children_of(&self, id: &str) -> Vec<(String, Decimal)> {
        match self.find_node(id) {
            Some(idx) => self
                .children(idx)
                .map(|e| (self.node(e.child).id.clone(), e.quantity))
                .collect(),
            None => {
                tracing::warn!("物料 {} 不存在於 BOM 中", id);
                Vec::new()
            }
        }
    }

    /// 使用指定物料的父件及用量；物料不存在時回傳空列表
    pub fn parents_of(&self, id: &str) -> Vec<(String, Decimal)> {
        match self.find_node(id) {
            Some(idx) => self
                .parents(idx)
                .map(|e| (self.node(e.parent).id.clone(), e.quantity))
                .collect(),
            None => {
                tracing::warn!("物料 {} 不存在於 BOM 中", id);
                Vec::new()
            }
        }
    }

    /// 驗證無循環
    pub fn validate_acyclic(&self) -> Result<()> {
        let cycles = self.find_cycles();
        if cycles.is_empty() {
            Ok(())
        } else {
            tracing::error!("BOM 結構中存在 {} 個循環引用", cycles.len());
            Err(MrpError::Cycle { cycles })
        }
    }

    /// 找出循環（每條回邊一個循環，起點旋轉到最小ID，去重）
    ///
    /// 迭代式 DFS，不受 BOM 深度影響堆疊。
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        let mut marks = vec![Mark::White; self.nodes.len()];
        let mut found: BTreeSet<Vec<NodeIndex>> = BTreeSet::new();

        for start in 0..self.nodes.len() {
            if marks[start] != Mark::White {
                continue;
            }
            // (節點, 下一個待處理的子件位置)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            marks[start] = Mark::Gray;

            while let Some(top) = stack.len().checked_sub(1) {
                let (node, next) = stack[top];
                if let Some(&edge_idx) = self.children[node].get(next) {
                    stack[top].1 += 1;
                    let child = self.edges[edge_idx].child.index();
                    match marks[child] {
                        Mark::White => {
                            marks[child] = Mark::Gray;
                            stack.push((child, 0));
                        }
                        Mark::Gray => {
                            let from = stack
                                .iter()
                                .position(|&(n, _)| n == child)
                                .unwrap_or(0);
                            let cycle: Vec<NodeIndex> = stack[from..]
                                .iter()
                                .map(|&(n, _)| NodeIndex(n as u32))
                                .collect();
                            found.insert(rotate_to_min(cycle));
                        }
                        Mark::Black => {}
                    }
                } else {
                    marks[node] = Mark::Black;
                    stack.pop();
                }
            }
        }

        found
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|n| self.node(n).id.clone()).collect())
            .collect()
    }

    /// 拓撲排序（父件在前）
    pub fn topological_order(&self) -> Result<Vec<NodeIndex>> {
        let mut in_degree: Vec<usize> = (0..self.nodes.len()).map(|i| self.parents[i].len()).collect();
        // BTreeSet 保證同層按ID輸出
        let mut ready: BTreeSet<usize> = (0..self.nodes.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(NodeIndex(node as u32));
            for &edge_idx in &self.children[node] {
                let child = self.edges[edge_idx].child.index();
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.insert(child);
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            Err(MrpError::Cycle {
                cycles: self.find_cycles(),
            })
        }
    }
}

fn rotate_to_min(mut cycle: Vec<NodeIndex>) -> Vec<NodeIndex> {
    if let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| **n)
        .map(|(i, _)| i)
    {
        cycle.rotate_left(min_pos);
    }
    cycle
}
