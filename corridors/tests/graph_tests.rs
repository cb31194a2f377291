//! Corridor graph integration tests

use std::collections::HashSet;

use aifi_corridors::{Corridor, CorridorDataset, CorridorGraph, Country, SyntheticCorridorGenerator};
use proptest::prelude::*;

fn graph_from_edges(edges: &[(u8, u8)]) -> CorridorGraph {
    let mut graph = CorridorGraph::new();
    for (source, destination) in edges {
        if source == destination {
            continue;
        }
        graph
            .add_corridor(Corridor::percentage(
                format!("C{}", source),
                format!("C{}", destination),
                1.0,
                1.0,
                50.0,
            ))
            .unwrap();
    }
    graph
}

#[test]
fn test_synthetic_dataset_builds_graph() {
    let dataset = SyntheticCorridorGenerator::new(42).generate();
    let graph = CorridorGraph::from_corridors(dataset.corridors.clone()).unwrap();

    assert_eq!(graph.edge_count(), dataset.len());
    assert_eq!(graph.node_count(), 20);
    for corridor in &dataset.corridors {
        assert!(graph.has_edge(corridor.source.as_str(), corridor.destination.as_str()));
    }
}

#[test]
fn test_invalid_record_aborts_construction() {
    let dataset = CorridorDataset::new(vec![
        Corridor::percentage("US", "MEX", 2.0, 2.0, 100.0),
        Corridor::percentage("MEX", "PHL", 2.0, 100.0, 2.0),
    ]);

    assert!(CorridorGraph::from_corridors(dataset.corridors).is_err());
}

#[test]
fn test_asymmetric_edges() {
    let graph = CorridorGraph::from_corridors(vec![Corridor::percentage("A", "B", 1.0, 1.0, 10.0)]).unwrap();

    assert!(graph.has_edge("A", "B"));
    assert!(!graph.has_edge("B", "A"));
    assert_eq!(graph.all_simple_paths("B", "A", 5).count(), 0);
}

proptest! {
    #[test]
    fn prop_simple_paths_are_simple_and_bounded(
        edges in prop::collection::vec((0u8..7, 0u8..7), 0..30),
        max_length in 2usize..6,
    ) {
        let graph = graph_from_edges(&edges);

        for path in graph.all_simple_paths("C0", "C6", max_length) {
            prop_assert!(path.len() >= 2);
            prop_assert!(path.len() <= max_length);
            prop_assert_eq!(path.first(), Some(&Country::from("C0")));
            prop_assert_eq!(path.last(), Some(&Country::from("C6")));

            let unique: HashSet<&Country> = path.iter().collect();
            prop_assert_eq!(unique.len(), path.len());

            for hop in path.windows(2) {
                prop_assert!(graph.has_edge(hop[0].as_str(), hop[1].as_str()));
            }
        }
    }

    #[test]
    fn prop_longer_bound_finds_superset(
        edges in prop::collection::vec((0u8..6, 0u8..6), 0..25),
    ) {
        let graph = graph_from_edges(&edges);

        let short: HashSet<Vec<Country>> = graph.all_simple_paths("C0", "C5", 3).collect();
        let long: HashSet<Vec<Country>> = graph.all_simple_paths("C0", "C5", 4).collect();

        prop_assert!(short.is_subset(&long));
    }
}
