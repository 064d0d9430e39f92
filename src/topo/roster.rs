//! 节点清单
//!
//! 清单由外部查询工具导出为 JSON 数组：
//!
//! ```json
//! [{ "node": "m3-12", "x": 1.5, "y": 20.25, "z": 9.4, "state": "Alive", "archi": "m3:at86rf231" }]
//! ```

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use super::TopologyError;
use crate::net::RosterNode;

pub const ARCHI_SHORT: &str = "m3";
pub const ARCHI_FULL: &str = "m3:at86rf231";

/// 由架构短名和节点编号得到节点名（`m3`, 12 → `m3-12`）
pub fn node_name(archi_short: &str, number: u32) -> String {
    format!("{archi_short}-{number}")
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    nodes: Vec<RosterNode>,
}

impl Roster {
    pub fn new(nodes: Vec<RosterNode>) -> Self {
        Self { nodes }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        let nodes: Vec<RosterNode> = serde_json::from_reader(reader)?;
        Ok(Self { nodes })
    }

    pub fn load(path: &Path) -> Result<Self, TopologyError> {
        let file = fs::File::open(path).map_err(|source| TopologyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_reader(BufReader::new(file)).map_err(|source| {
            TopologyError::Roster {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), nodes = roster.len(), "roster loaded");
        Ok(roster)
    }

    /// 只保留指定架构的节点（不改变顺序）
    pub fn with_archi(&self, archi: &str) -> Self {
        Self {
            nodes: self
                .nodes
                .iter()
                .filter(|n| n.archi == archi)
                .cloned()
                .collect(),
        }
    }

    pub fn nodes(&self) -> &[RosterNode] {
        &self.nodes
    }

    pub fn get(&self, name: &str) -> Option<&RosterNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// 在线节点
    pub fn alive(&self) -> impl Iterator<Item = &RosterNode> {
        self.nodes.iter().filter(|n| n.is_alive())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
