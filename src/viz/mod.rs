//! 拓扑布局图（供人工检查用）
//!
//! - **逻辑布局**：力导向布局，只看连接关系
//! - **地理布局**：节点在测试床中的真实 x/y 坐标
//!
//! 两种布局都渲染为独立的 SVG 文件，不影响拓扑本身。

mod layout;
mod types;

pub use layout::{geographic_layout, logical_layout};
pub use types::{SINK_COLOR, SINK_NEIGHBORS_COLOR, SOURCE_COLOR, VizLayout, VizLinkInfo, VizNodeInfo, VizNodeKind, write_svg};
