//! 跳数与子树计算
//!
//! 只读地作用在已经构建完成的 [`NetworkGraph`] 上：
//! - 两点之间的最短跳数（无权 BFS）
//! - 以 sink 为根的 DFS 生成树，读出每个节点的直接子节点数（successors）

use std::collections::VecDeque;

use super::graph::NetworkGraph;
use super::id::NodeId;

impl NetworkGraph {
    /// `from` 到 `to` 的最短跳数；不连通时返回 `None`
    pub fn hops_to(&self, from: NodeId, to: NodeId) -> Option<usize> {
        self.hops_from(to)[from.0]
    }

    /// 所有节点到 sink 的最短跳数（下标为 [`NodeId`]）
    pub fn hops_to_sink(&self) -> Vec<Option<usize>> {
        self.hops_from(self.sink())
    }

    /// 从 `root` 出发做一次 BFS，得到所有节点的跳数（无向图上距离对称）
    pub fn hops_from(&self, root: NodeId) -> Vec<Option<usize>> {
        let adj = self.adjacency();
        let mut dist: Vec<Option<usize>> = vec![None; adj.len()];
        let mut q: VecDeque<NodeId> = VecDeque::new();

        dist[root.0] = Some(0);
        q.push_back(root);
        while let Some(v) = q.pop_front() {
            let dv = dist[v.0].unwrap_or_default();
            for &nh in &adj[v.0] {
                if dist[nh.0].is_none() {
                    dist[nh.0] = Some(dv + 1);
                    q.push_back(nh);
                }
            }
        }
        dist
    }

    /// 以 `root` 为根的 DFS 生成树中每个节点的子节点列表
    ///
    /// 邻居按边加入顺序访问；使用显式栈，避免深图递归。
    pub fn dfs_successors(&self, root: NodeId) -> Vec<Vec<NodeId>> {
        let adj = self.adjacency();
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); adj.len()];
        let mut visited = vec![false; adj.len()];
        // (节点, 下一个待检查的邻居下标)
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        visited[root.0] = true;

        while let Some(top) = stack.last_mut() {
            let (v, next) = *top;
            if next >= adj[v.0].len() {
                stack.pop();
                continue;
            }
            top.1 += 1;
            let child = adj[v.0][next];
            if !visited[child.0] {
                visited[child.0] = true;
                children[v.0].push(child);
                stack.push((child, 0));
            }
        }
        children
    }

    /// sink 生成树中每个节点的直接子节点数
    pub fn successor_counts(&self) -> Vec<usize> {
        self.dfs_successors(self.sink())
            .iter()
            .map(Vec::len)
            .collect()
    }
}
