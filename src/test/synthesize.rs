use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::fixtures::{grid_roster, unique_temp_dir};
use crate::net::{NetworkGraph, NodeState, Position, RosterNode};
use crate::topo::{Roster, SynthOpts, TopologyError, construct_network, synthesize};

fn build(roster: &Roster, sink: &str, opts: &SynthOpts, seed: u64) -> NetworkGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    synthesize(roster, sink, opts, &mut rng).expect("synthesize")
}

fn node(name: &str, x: f64, y: f64, state: NodeState) -> RosterNode {
    RosterNode::new(name, Position::new(x, y, 0.0), state, "m3:at86rf231")
}

#[test]
fn grown_graph_is_a_tree_rooted_at_the_sink() {
    let roster = grid_roster(8, 3.0);
    let opts = SynthOpts::default();
    for seed in 0..10 {
        let g = build(&roster, "m3-0", &opts, seed);
        assert_eq!(g.sink_name(), "m3-0");
        assert!(g.len() > 1);
        assert!(g.len() <= opts.max_nodes);
        assert_eq!(g.edges().len(), g.len() - 1, "seed {seed}");
        assert!(
            g.hops_to_sink().iter().all(Option::is_some),
            "seed {seed}: graph is not connected"
        );
    }
}

#[test]
fn sink_gets_two_neighbors_and_others_respect_fanout() {
    let roster = grid_roster(8, 3.0);
    let opts = SynthOpts::default();
    for seed in 0..10 {
        let g = build(&roster, "m3-0", &opts, seed);
        assert_eq!(g.degree(g.sink()), 2, "seed {seed}");
        for id in g.nodes().filter(|&id| id != g.sink()) {
            // one edge to the parent plus at most max_neighbors children
            assert!(g.degree(id) <= opts.max_neighbors + 1, "seed {seed}");
        }
    }
}

#[test]
fn edge_weights_are_distances_below_max_distance() {
    let roster = grid_roster(8, 3.0);
    let opts = SynthOpts::default();
    let g = build(&roster, "m3-0", &opts, 7);
    for e in g.edges() {
        let a = roster.get(g.name(e.a)).expect("node a in roster");
        let b = roster.get(g.name(e.b)).expect("node b in roster");
        assert_eq!(e.weight, a.distance(b));
        assert!(e.weight < opts.max_distance);
    }
}

/// Parent of every non-sink node in the BFS tree (the neighbour one hop closer to the sink).
fn parents(g: &NetworkGraph) -> Vec<Option<usize>> {
    let hops = g.hops_to_sink();
    g.nodes()
        .map(|id| {
            let up = hops[id.0]?.checked_sub(1)?;
            g.neighbors(id)
                .iter()
                .find(|n| hops[n.0] == Some(up))
                .map(|n| n.0)
        })
        .collect()
}

#[test]
fn placed_nodes_keep_min_distance_from_earlier_nodes() {
    // Siblings come out of one candidate set and are not checked against each other.
    let roster = grid_roster(10, 2.0);
    let opts = SynthOpts {
        min_distance: 3.5,
        ..SynthOpts::default()
    };
    for seed in 0..10 {
        let g = build(&roster, "m3-0", &opts, seed);
        let parent = parents(&g);
        let placed: Vec<&RosterNode> = g
            .names()
            .iter()
            .map(|n| roster.get(n).expect("placed node in roster"))
            .collect();
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                if parent[i].is_some() && parent[i] == parent[j] {
                    continue;
                }
                let (a, b) = (placed[i], placed[j]);
                assert!(
                    a.distance(b) >= opts.min_distance,
                    "seed {seed}: {} and {} are {} apart",
                    a.name,
                    b.name,
                    a.distance(b)
                );
            }
        }
    }
}

#[test]
fn sink_takes_two_candidates_even_when_they_are_close_together() {
    let roster = Roster::new(vec![
        node("m3-1", 0.0, 0.0, NodeState::Alive),
        node("m3-2", 3.0, 0.0, NodeState::Alive),
        node("m3-3", 3.0, 1.0, NodeState::Alive),
    ]);
    for seed in 0..10 {
        let g = build(&roster, "m3-1", &SynthOpts::default(), seed);
        assert_eq!(g.degree(g.sink()), 2, "seed {seed}: {:?}", g.names());
        assert_eq!(g.len(), 3);
    }
}

#[test]
fn expansion_attaches_at_least_min_neighbors() {
    // m3-2 sees m3-3 and m3-4 as candidates; they are 1 m apart.
    let roster = Roster::new(vec![
        node("m3-1", 0.0, 0.0, NodeState::Alive),
        node("m3-2", 5.0, 0.0, NodeState::Alive),
        node("m3-3", 9.0, 0.0, NodeState::Alive),
        node("m3-4", 9.0, 1.0, NodeState::Alive),
    ]);
    let opts = SynthOpts {
        min_neighbors: 2,
        max_neighbors: 2,
        ..SynthOpts::default()
    };
    for seed in 0..10 {
        let g = build(&roster, "m3-1", &opts, seed);
        let m3_2 = g.id("m3-2").expect("m3-2 placed");
        assert_eq!(g.degree(g.sink()), 1);
        assert_eq!(g.degree(m3_2), 3, "seed {seed}: {:?}", g.names());
        assert_eq!(g.len(), 4);
    }
}

#[test]
fn same_seed_gives_same_graph() {
    let roster = grid_roster(8, 3.0);
    let opts = SynthOpts::default();
    let a = build(&roster, "m3-0", &opts, 42);
    let b = build(&roster, "m3-0", &opts, 42);
    assert_eq!(a.names(), b.names());
    assert_eq!(a.edges(), b.edges());
    assert_eq!(a.network_name(), b.network_name());
}

#[test]
fn node_budget_stops_growth_mid_expansion() {
    let roster = grid_roster(8, 3.0);
    let opts = SynthOpts {
        max_nodes: 3,
        ..SynthOpts::default()
    };
    let g = build(&roster, "m3-0", &opts, 1);
    assert_eq!(g.len(), 3);
    assert_eq!(g.degree(g.sink()), 2);

    let opts = SynthOpts {
        max_nodes: 12,
        ..SynthOpts::default()
    };
    let g = build(&roster, "m3-0", &opts, 1);
    assert_eq!(g.len(), 12);
}

#[test]
fn dead_or_unknown_sink_is_rejected() {
    let roster = Roster::new(vec![
        node("m3-1", 0.0, 0.0, NodeState::Suspected),
        node("m3-2", 3.0, 0.0, NodeState::Alive),
        node("m3-3", 0.0, 3.0, NodeState::Alive),
    ]);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let err = synthesize(&roster, "m3-1", &SynthOpts::default(), &mut rng).unwrap_err();
    assert!(matches!(err, TopologyError::SinkUnusable { ref sink } if sink == "m3-1"));

    let err = synthesize(&roster, "m3-99", &SynthOpts::default(), &mut rng).unwrap_err();
    assert!(matches!(err, TopologyError::SinkUnusable { .. }));
}

#[test]
fn dead_nodes_are_never_placed() {
    let roster = Roster::new(vec![
        node("m3-1", 0.0, 0.0, NodeState::Alive),
        node("m3-2", 3.0, 0.0, NodeState::Dead),
        node("m3-3", 0.0, 3.0, NodeState::Alive),
        node("m3-4", 3.0, 3.0, NodeState::Busy),
    ]);
    let g = build(&roster, "m3-1", &SynthOpts::default(), 3);
    assert_eq!(g.names(), ["m3-1", "m3-3"]);
}

#[test]
fn isolated_sink_yields_single_node_graph() {
    let roster = Roster::new(vec![
        node("m3-1", 0.0, 0.0, NodeState::Alive),
        node("m3-2", 50.0, 0.0, NodeState::Alive),
        node("m3-3", 0.0, 50.0, NodeState::Alive),
    ]);
    let g = build(&roster, "m3-1", &SynthOpts::default(), 0);
    assert_eq!(g.len(), 1);
    assert!(g.edges().is_empty());
}

#[test]
fn isolated_sink_network_round_trips_through_edgelist() {
    let dir = unique_temp_dir("isolated-sink");
    let roster = Roster::new(vec![
        node("m3-1", 0.0, 0.0, NodeState::Alive),
        node("m3-2", 50.0, 0.0, NodeState::Alive),
    ]);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let (graph, path) =
        construct_network(&roster, "m3-1", &SynthOpts::default(), &mut rng, &dir).expect("construct");
    assert_eq!(graph.len(), 1);

    let reloaded = crate::topo::load_network("m3-1", &path).expect("reload sink-only network");
    assert_eq!(reloaded.names(), ["m3-1"]);
    assert_eq!(reloaded.network_name(), graph.network_name());
}

#[test]
fn sink_with_one_candidate_gets_one_neighbor() {
    let roster = Roster::new(vec![
        node("m3-1", 0.0, 0.0, NodeState::Alive),
        node("m3-2", 4.0, 0.0, NodeState::Alive),
        node("m3-3", 8.0, 0.0, NodeState::Alive),
    ]);
    let g = build(&roster, "m3-1", &SynthOpts::default(), 0);
    assert_eq!(g.degree(g.sink()), 1);
    // m3-3 is only reachable through m3-2
    assert_eq!(g.len(), 3);
    assert_eq!(g.hops_to_sink(), vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn invalid_options_are_rejected() {
    let roster = grid_roster(3, 3.0);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let opts = SynthOpts {
        min_neighbors: 4,
        max_neighbors: 2,
        ..SynthOpts::default()
    };
    let err = synthesize(&roster, "m3-0", &opts, &mut rng).unwrap_err();
    assert!(matches!(err, TopologyError::InvalidOptions { .. }));

    let opts = SynthOpts {
        max_nodes: 0,
        ..SynthOpts::default()
    };
    assert!(opts.validate().is_err());
}

#[test]
fn construct_network_writes_edgelist_and_drawings() {
    let dir = unique_temp_dir("construct");
    let roster = grid_roster(6, 3.0);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let (graph, path) =
        construct_network(&roster, "m3-0", &SynthOpts::default(), &mut rng, &dir).expect("construct");

    let network = graph.network_name();
    assert!(network.starts_with("m3-0x"));
    assert_eq!(path, dir.join(format!("{network}.edgelist")));
    assert!(dir.join(format!("{network}_logic.svg")).exists());
    assert!(dir.join(format!("{network}_geo.svg")).exists());

    let reloaded = crate::topo::load_network("m3-0", &path).expect("reload");
    assert_eq!(reloaded.network_name(), network);
    assert_eq!(reloaded.len(), graph.len());
}
