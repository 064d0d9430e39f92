use std::f64::consts::TAU;

use tracing::warn;

use super::types::{VizLayout, VizLinkInfo, VizNodeInfo, VizNodeKind};
use crate::net::{NetworkGraph, NodeId};
use crate::topo::Roster;

const SPRING_ITERATIONS: usize = 200;

fn node_kind(graph: &NetworkGraph, id: NodeId) -> VizNodeKind {
    let sink = graph.sink();
    if id == sink {
        VizNodeKind::Sink
    } else if graph.neighbors(sink).contains(&id) {
        VizNodeKind::SinkNeighbor
    } else {
        VizNodeKind::Source
    }
}

fn build(graph: &NetworkGraph, pos: &[(f64, f64)]) -> VizLayout {
    let nodes = graph
        .nodes()
        .map(|id| VizNodeInfo {
            id: id.0,
            name: graph.name(id).to_string(),
            kind: node_kind(graph, id),
            x: pos[id.0].0,
            y: pos[id.0].1,
        })
        .collect();
    let links = graph
        .edges()
        .iter()
        .map(|e| VizLinkInfo {
            from: e.a.0,
            to: e.b.0,
            weight: e.weight,
        })
        .collect();
    VizLayout { nodes, links }
}

/// 按清单中的真实坐标布局；清单里找不到的节点放在原点
pub fn geographic_layout(graph: &NetworkGraph, roster: &Roster) -> VizLayout {
    let pos: Vec<(f64, f64)> = graph
        .nodes()
        .map(|id| match roster.get(graph.name(id)) {
            Some(node) => (node.position.x, node.position.y),
            None => {
                warn!(node = graph.name(id), "节点不在清单中，无法确定坐标");
                (0.0, 0.0)
            }
        })
        .collect();
    build(graph, &pos)
}

/// Fruchterman-Reingold 力导向布局（初始位置在单位圆上，结果确定）
pub fn logical_layout(graph: &NetworkGraph) -> VizLayout {
    let n = graph.len();
    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n.max(1) as f64;
            (angle.cos(), angle.sin())
        })
        .collect();
    if n < 2 {
        return build(graph, &pos);
    }

    let k = (4.0 / n as f64).sqrt();
    let t0 = 0.1;
    let mut disp = vec![(0.0_f64, 0.0_f64); n];
    for iter in 0..SPRING_ITERATIONS {
        disp.fill((0.0, 0.0));
        // 斥力
        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                let d = dx.hypot(dy).max(0.01);
                let f = k * k / d;
                disp[i].0 += dx / d * f;
                disp[i].1 += dy / d * f;
                disp[j].0 -= dx / d * f;
                disp[j].1 -= dy / d * f;
            }
        }
        // 引力
        for e in graph.edges() {
            let (a, b) = (e.a.0, e.b.0);
            let (dx, dy) = (pos[a].0 - pos[b].0, pos[a].1 - pos[b].1);
            let d = dx.hypot(dy).max(0.01);
            let f = d * d / k;
            disp[a].0 -= dx / d * f;
            disp[a].1 -= dy / d * f;
            disp[b].0 += dx / d * f;
            disp[b].1 += dy / d * f;
        }
        let t = t0 * (1.0 - iter as f64 / SPRING_ITERATIONS as f64);
        for (p, d) in pos.iter_mut().zip(&disp) {
            let len = d.0.hypot(d.1);
            if len > 0.0 {
                let step = len.min(t);
                p.0 += d.0 / len * step;
                p.1 += d.1 / len * step;
            }
        }
    }
    build(graph, &pos)
}
