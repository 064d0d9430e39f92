use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const SINK_COLOR: &str = "#330099";
pub const SINK_NEIGHBORS_COLOR: &str = "#d3d3d3";
pub const SOURCE_COLOR: &str = "#b5a3da";

const CANVAS: f64 = 600.0;
const MARGIN: f64 = 20.0;
const NODE_RADIUS: f64 = 5.0;

/// 节点角色（用于上色）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VizNodeKind {
    Sink,
    SinkNeighbor,
    Source,
}

impl VizNodeKind {
    pub fn color(self) -> &'static str {
        match self {
            VizNodeKind::Sink => SINK_COLOR,
            VizNodeKind::SinkNeighbor => SINK_NEIGHBORS_COLOR,
            VizNodeKind::Source => SOURCE_COLOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizNodeInfo {
    pub id: usize,
    pub name: String,
    pub kind: VizNodeKind,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VizLinkInfo {
    pub from: usize,
    pub to: usize,
    /// 两端距离
    pub weight: f64,
}

/// 一张布局图
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VizLayout {
    pub nodes: Vec<VizNodeInfo>,
    pub links: Vec<VizLinkInfo>,
}

impl VizLayout {
    /// 渲染为 SVG（坐标缩放到固定画布，y 轴朝上）
    pub fn to_svg(&self) -> String {
        let (min_x, max_x) = bounds(self.nodes.iter().map(|n| n.x));
        let (min_y, max_y) = bounds(self.nodes.iter().map(|n| n.y));
        let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
        let scale = (CANVAS - 2.0 * MARGIN) / span;
        let project = |n: &VizNodeInfo| {
            (
                MARGIN + (n.x - min_x) * scale,
                CANVAS - MARGIN - (n.y - min_y) * scale,
            )
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{CANVAS}" height="{CANVAS}" viewBox="0 0 {CANVAS} {CANVAS}">"#
        );
        for link in &self.links {
            let (Some(a), Some(b)) = (self.nodes.get(link.from), self.nodes.get(link.to)) else {
                continue;
            };
            let ((x1, y1), (x2, y2)) = (project(a), project(b));
            let _ = writeln!(
                svg,
                r#"  <line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="black" stroke-width="0.5"/>"#
            );
        }
        for node in &self.nodes {
            let (cx, cy) = project(node);
            let _ = writeln!(
                svg,
                r#"  <circle cx="{cx:.2}" cy="{cy:.2}" r="{NODE_RADIUS}" fill="{}"/>"#,
                node.kind.color()
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{cx:.2}" y="{cy:.2}" font-size="2" fill="white" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
                node.name
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

pub fn write_svg(layout: &VizLayout, path: &Path) -> io::Result<()> {
    fs::write(path, layout.to_svg())
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 0.0)
    }
}
