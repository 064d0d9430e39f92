//! 测试床节点
//!
//! 节点清单（roster）中的一条记录：名字、三维坐标、在线状态和硬件架构。

use serde::{Deserialize, Serialize};

/// 节点在测试床中的坐标（米）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 两点之间的欧氏距离
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// 节点在线状态（与测试床清单中的取值一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    Alive,
    Busy,
    Absent,
    Suspected,
    Dead,
    #[serde(other)]
    Unknown,
}

/// 清单中的单个节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterNode {
    /// 节点名，例如 `m3-12`
    #[serde(rename = "node")]
    pub name: String,
    #[serde(flatten)]
    pub position: Position,
    pub state: NodeState,
    pub archi: String,
}

impl RosterNode {
    pub fn new(name: impl Into<String>, position: Position, state: NodeState, archi: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            state,
            archi: archi.into(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == NodeState::Alive
    }

    pub fn distance(&self, other: &RosterNode) -> f64 {
        self.position.distance(&other.position)
    }
}
