//! 网络模块
//!
//! 测试床节点、拓扑图、跳数/子树计算、拓扑持久化和节点地址表。

// 子模块声明
mod id;
mod node;
mod graph;
mod routing;
mod edgelist;
mod address;

// 重新导出公共接口
pub use id::NodeId;
pub use node::{NodeState, Position, RosterNode};
pub use graph::{Edge, NetworkGraph};
pub use edgelist::{EDGELIST_SUFFIX, GraphError, edgelist_path, sink_of_network};
pub use address::{
    ADDRESS_TABLE_SUFFIX, AddressEntry, AddressPrefixes, AddressTable, AddressTableError,
    DEFAULT_GLOBAL_PREFIX, LINK_LOCAL_PREFIX, address_table_path,
};
