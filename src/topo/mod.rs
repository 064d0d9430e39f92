//! 拓扑构建模块
//!
//! 从测试床节点清单中随机生成一个以 sink 为根、满足距离约束的多跳网络。

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::net::{GraphError, NetworkGraph};

pub mod roster;
pub mod synth;

pub use roster::{ARCHI_FULL, ARCHI_SHORT, Roster, node_name};
pub use synth::{SINK_NEIGHBORS, SynthOpts, construct_network, save_topology, synthesize};

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("sink {sink} is not alive (maybe booked by another experiment?)")]
    SinkUnusable { sink: String },
    #[error("sink {sink} is not part of network {network}")]
    SinkNotInNetwork { sink: String, network: String },
    #[error("invalid construction options: {reason}")]
    InvalidOptions { reason: String },
    #[error("failed to parse roster {path}: {source}")]
    Roster {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// 读取已保存的拓扑，并检查 sink 确实在图中
///
/// 空边表表示只有 sink 的孤立网络，照常返回单节点图。
pub fn load_network(sink: &str, path: &Path) -> Result<NetworkGraph, TopologyError> {
    let graph = NetworkGraph::load_edgelist(sink, path)?;
    if graph.degree(graph.sink()) == 0 && !graph.edges().is_empty() {
        return Err(TopologyError::SinkNotInNetwork {
            sink: sink.to_string(),
            network: path.display().to_string(),
        });
    }
    Ok(graph)
}
