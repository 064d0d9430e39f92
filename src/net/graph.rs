//! 网络拓扑图
//!
//! 无向带权图，节点、边和邻接表都按加入顺序保存，保证遍历结果可复现。

use std::collections::HashMap;

use super::id::NodeId;

/// 无向边（`a` 为先加入图的一端）
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// 两端节点之间的距离
    pub weight: f64,
}

/// 以 sink 为根的网络拓扑
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    names: Vec<String>,
    index: HashMap<String, NodeId>,
    adj: Vec<Vec<NodeId>>,
    edges: Vec<Edge>,
    sink: NodeId,
}

impl NetworkGraph {
    /// 只包含 sink 的图
    pub fn new(sink: impl Into<String>) -> Self {
        let sink = sink.into();
        let mut index = HashMap::new();
        index.insert(sink.clone(), NodeId(0));
        Self {
            names: vec![sink],
            index,
            adj: vec![Vec::new()],
            edges: Vec::new(),
            sink: NodeId(0),
        }
    }

    /// 查找或加入节点
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = NodeId(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.adj.push(Vec::new());
        id
    }

    /// 加入一条无向边，端点不存在时自动加入；重复边只更新权重
    pub fn add_edge(&mut self, a: &str, b: &str, weight: f64) -> (NodeId, NodeId) {
        let a = self.add_node(a);
        let b = self.add_node(b);
        if let Some(edge) = self
            .edges
            .iter_mut()
            .find(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
        {
            edge.weight = weight;
            return (a, b);
        }
        self.edges.push(Edge { a, b, weight });
        self.adj[a.0].push(b);
        if a != b {
            self.adj[b.0].push(a);
        }
        (a, b)
    }

    pub fn sink(&self) -> NodeId {
        self.sink
    }

    pub fn sink_name(&self) -> &str {
        &self.names[self.sink.0]
    }

    /// 图中节点个数
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.names[id.0]
    }

    /// 按加入顺序遍历所有节点
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.names.len()).map(NodeId)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// 邻居（按边加入顺序）
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.adj[id.0]
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adj[id.0].len()
    }

    /// 邻接表（`adj[i]` 为节点 `i` 的邻居）
    pub fn adjacency(&self) -> &[Vec<NodeId>] {
        &self.adj
    }
}
