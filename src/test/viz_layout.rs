use super::fixtures::{five_node_graph, grid_roster};
use crate::net::NetworkGraph;
use crate::viz::{
    SINK_COLOR, SINK_NEIGHBORS_COLOR, SOURCE_COLOR, VizLayout, VizNodeKind, geographic_layout,
    logical_layout,
};

#[test]
fn node_kinds_follow_distance_to_sink() {
    let layout = logical_layout(&five_node_graph());
    let kinds: Vec<VizNodeKind> = layout.nodes.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        [
            VizNodeKind::Sink,
            VizNodeKind::SinkNeighbor,
            VizNodeKind::SinkNeighbor,
            VizNodeKind::Source,
            VizNodeKind::Source,
        ]
    );
    assert_eq!(layout.links.len(), 5);
}

#[test]
fn logical_layout_is_deterministic_and_finite() {
    let g = five_node_graph();
    let a = logical_layout(&g);
    let b = logical_layout(&g);
    for (na, nb) in a.nodes.iter().zip(&b.nodes) {
        assert_eq!((na.x, na.y), (nb.x, nb.y));
        assert!(na.x.is_finite() && na.y.is_finite());
    }
}

#[test]
fn geographic_layout_uses_roster_coordinates() {
    let roster = grid_roster(3, 3.0);
    let mut g = NetworkGraph::new("m3-0");
    g.add_edge("m3-0", "m3-4", 4.24);
    g.add_edge("m3-0", "m3-77", 1.0);
    let layout = geographic_layout(&g, &roster);
    assert_eq!((layout.nodes[1].x, layout.nodes[1].y), (3.0, 3.0));
    // not in the roster
    assert_eq!((layout.nodes[2].x, layout.nodes[2].y), (0.0, 0.0));
}

#[test]
fn svg_colors_nodes_by_role() {
    let svg = logical_layout(&five_node_graph()).to_svg();
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<circle").count(), 5);
    assert_eq!(svg.matches("<line").count(), 5);
    assert_eq!(svg.matches(SINK_COLOR).count(), 1);
    assert_eq!(svg.matches(SINK_NEIGHBORS_COLOR).count(), 2);
    assert_eq!(svg.matches(SOURCE_COLOR).count(), 2);
    assert!(svg.contains(">m3-4</text>"));
}

#[test]
fn layout_serializes_to_json() {
    let layout = logical_layout(&five_node_graph());
    let json = serde_json::to_string(&layout).expect("serialize");
    assert!(json.contains(r#""kind":"sink_neighbor""#));
    let back: VizLayout = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.nodes.len(), 5);
}

#[test]
fn empty_layout_renders() {
    let svg = VizLayout::default().to_svg();
    assert!(svg.contains("</svg>"));
}
