//! 受约束的随机拓扑构建
//!
//! 从 sink 开始做 BFS 扩展：每弹出一个节点，在满足距离约束的候选节点中
//! 随机挑选若干个作为下游邻居，直到队列为空或达到节点上限。

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::index;
use tracing::{debug, info, trace};

use super::TopologyError;
use super::roster::Roster;
use crate::net::{NetworkGraph, RosterNode};
use crate::viz;

/// sink 固定挂两个邻居
pub const SINK_NEIGHBORS: usize = 2;

/// 拓扑构建参数
#[derive(Debug, Clone, PartialEq)]
pub struct SynthOpts {
    /// 候选节点与扩展时已入网节点之间的最小距离（同一批次的兄弟节点之间不检查）
    pub min_distance: f64,
    /// 父子节点之间的最大距离（严格小于）
    pub max_distance: f64,
    /// 每个非 sink 节点的下游邻居数下限
    pub min_neighbors: usize,
    /// 每个非 sink 节点的下游邻居数上限
    pub max_neighbors: usize,
    /// 网络节点数上限（含 sink）
    pub max_nodes: usize,
}

impl Default for SynthOpts {
    fn default() -> Self {
        Self {
            min_distance: 2.2,
            max_distance: 6.5,
            min_neighbors: 1,
            max_neighbors: 3,
            max_nodes: 50,
        }
    }
}

impl SynthOpts {
    pub fn validate(&self) -> Result<(), TopologyError> {
        let invalid = |reason: String| Err(TopologyError::InvalidOptions { reason });
        if !(self.min_distance.is_finite() && self.max_distance.is_finite()) {
            return invalid("distances must be finite".to_string());
        }
        if self.min_neighbors > self.max_neighbors {
            return invalid(format!(
                "min_neighbors ({}) exceeds max_neighbors ({})",
                self.min_neighbors, self.max_neighbors
            ));
        }
        if self.max_nodes == 0 {
            return invalid("max_nodes must be at least 1".to_string());
        }
        Ok(())
    }
}

/// 以 `sink` 为根构建连通拓扑
///
/// 只有在线节点参与构建；`sink` 不在线（或不在清单中）时直接报错，不做任何构建。
/// 相同的清单、参数和随机数序列得到相同的图。
#[tracing::instrument(skip(roster, rng), fields(roster = roster.len()))]
pub fn synthesize<R: Rng>(
    roster: &Roster,
    sink: &str,
    opts: &SynthOpts,
    rng: &mut R,
) -> Result<NetworkGraph, TopologyError> {
    opts.validate()?;
    let pool: Vec<&RosterNode> = roster.alive().collect();
    let Some(&sink_node) = pool.iter().find(|n| n.name == sink) else {
        return Err(TopologyError::SinkUnusable {
            sink: sink.to_string(),
        });
    };
    info!(alive = pool.len(), "🌱 开始构建拓扑");

    let mut graph = NetworkGraph::new(sink);
    let mut placed: Vec<&RosterNode> = vec![sink_node];
    let mut visited: HashSet<&str> = HashSet::from([sink]);
    let mut queue: VecDeque<&RosterNode> = VecDeque::from([sink_node]);

    while graph.len() < opts.max_nodes {
        let Some(node) = queue.pop_front() else {
            break;
        };
        let candidates = candidates(&pool, node, &placed, &graph, opts);
        if candidates.is_empty() {
            trace!(node = %node.name, "无候选邻居，跳过");
            continue;
        }

        let num_neigh = if node.name == sink {
            SINK_NEIGHBORS.min(candidates.len())
        } else {
            let lo = opts.min_neighbors.min(candidates.len());
            let hi = opts.max_neighbors.min(candidates.len());
            rng.gen_range(lo..=hi)
        };
        debug!(
            node = %node.name,
            candidates = candidates.len(),
            num_neigh,
            "扩展节点"
        );

        for i in index::sample(rng, candidates.len(), num_neigh).into_iter() {
            let neigh = candidates[i];
            if !visited.insert(neigh.name.as_str()) {
                continue;
            }
            graph.add_edge(&node.name, &neigh.name, node.distance(neigh));
            placed.push(neigh);
            if graph.len() >= opts.max_nodes {
                info!(nodes = graph.len(), "达到节点上限");
                return Ok(graph);
            }
            queue.push_back(neigh);
        }
    }

    info!(nodes = graph.len(), edges = graph.edges().len(), "✅ 拓扑构建完成");
    Ok(graph)
}

/// `node` 的候选邻居：尚未入网、距 `node` 小于 `max_distance`，
/// 且与所有已入网节点的距离都不小于 `min_distance`
fn candidates<'a>(
    pool: &[&'a RosterNode],
    node: &RosterNode,
    placed: &[&RosterNode],
    graph: &NetworkGraph,
    opts: &SynthOpts,
) -> Vec<&'a RosterNode> {
    pool.iter()
        .copied()
        .filter(|neigh| neigh.name != node.name)
        .filter(|neigh| !graph.contains(&neigh.name))
        .filter(|neigh| node.distance(neigh) < opts.max_distance)
        .filter(|neigh| !placed.iter().any(|p| neigh.distance(p) < opts.min_distance))
        .collect()
}

/// 构建、保存边表并渲染两张布局图
pub fn construct_network<R: Rng>(
    roster: &Roster,
    sink: &str,
    opts: &SynthOpts,
    rng: &mut R,
    data_path: &Path,
) -> Result<(NetworkGraph, PathBuf), TopologyError> {
    let graph = synthesize(roster, sink, opts, rng)?;
    let path = save_topology(&graph, roster, data_path)?;
    Ok((graph, path))
}

/// 写出 `{network}.edgelist`、`{network}_logic.svg` 和 `{network}_geo.svg`
pub fn save_topology(
    graph: &NetworkGraph,
    roster: &Roster,
    data_path: &Path,
) -> Result<PathBuf, TopologyError> {
    let network = graph.network_name();
    for (layout, suffix) in [
        (viz::logical_layout(graph), "logic"),
        (viz::geographic_layout(graph, roster), "geo"),
    ] {
        let path = data_path.join(format!("{network}_{suffix}.svg"));
        viz::write_svg(&layout, &path).map_err(|source| TopologyError::Io {
            path: path.clone(),
            source,
        })?;
    }
    Ok(graph.save_edgelist(data_path)?)
}
