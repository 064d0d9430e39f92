//! 标识符类型
//!
//! 图内节点使用稠密下标；节点名（如 `m3-12`）由 [`NetworkGraph`](super::NetworkGraph) 维护。

use std::fmt;

/// 图内节点标识符（按加入顺序分配的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
