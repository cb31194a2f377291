//! Directed corridor graph
//!
//! Countries are nodes and corridors are attributed, directed edges. The graph
//! may be asymmetric and may contain cycles; path enumeration only ever yields
//! simple paths.

use std::collections::btree_map::Keys;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::types::{Corridor, Country};
use crate::Result;

/// Adjacency-map corridor graph with at most one edge per ordered pair
#[derive(Debug, Clone, Default)]
pub struct CorridorGraph {
    /// source -> destination -> corridor. Every node has an entry, including
    /// nodes with no outgoing corridors.
    adjacency: BTreeMap<Country, BTreeMap<Country, Corridor>>,
    edge_count: usize,
}

impl CorridorGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from corridor records, rejecting the first invalid one
    pub fn from_corridors<I>(corridors: I) -> Result<Self>
    where
        I: IntoIterator<Item = Corridor>,
    {
        let mut graph = Self::new();
        for corridor in corridors {
            graph.add_corridor(corridor)?;
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Corridor graph built"
        );
        Ok(graph)
    }

    /// Insert or overwrite the edge for `(source, destination)`
    ///
    /// Both countries become nodes if they were not already. Returns the
    /// corridor that was replaced, if any.
    pub fn add_corridor(&mut self, corridor: Corridor) -> Result<Option<Corridor>> {
        corridor.validate()?;

        self.adjacency
            .entry(corridor.destination.clone())
            .or_default();

        let outgoing = self.adjacency.entry(corridor.source.clone()).or_default();
        let replaced = outgoing.insert(corridor.destination.clone(), corridor);

        match &replaced {
            Some(previous) => debug!(
                source = %previous.source,
                destination = %previous.destination,
                "Overwrote existing corridor"
            ),
            None => self.edge_count += 1,
        }

        Ok(replaced)
    }

    /// Whether a corridor `source -> destination` exists
    pub fn has_edge(&self, source: &str, destination: &str) -> bool {
        self.get_edge(source, destination).is_some()
    }

    /// Get the corridor `source -> destination`
    pub fn get_edge(&self, source: &str, destination: &str) -> Option<&Corridor> {
        self.adjacency.get(source)?.get(destination)
    }

    /// Whether the country is a node of the graph
    pub fn contains_country(&self, country: &str) -> bool {
        self.adjacency.contains_key(country)
    }

    /// Outgoing corridors of a country, in destination order
    pub fn neighbors<'a>(&'a self, country: &str) -> impl Iterator<Item = &'a Corridor> + 'a {
        self.adjacency
            .get(country)
            .into_iter()
            .flat_map(|outgoing| outgoing.values())
    }

    /// All countries, in order
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.adjacency.keys()
    }

    /// All corridors, ordered by source then destination
    pub fn corridors(&self) -> impl Iterator<Item = &Corridor> {
        self.adjacency.values().flat_map(|outgoing| outgoing.values())
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Lazily enumerate simple paths from `source` to `destination`
    ///
    /// `max_length` bounds the number of nodes in a yielded path, so a path
    /// has at most `max_length - 1` hops. Each call returns a fresh iterator.
    /// Unknown countries and `max_length < 2` yield nothing.
    pub fn all_simple_paths(&self, source: &str, destination: &str, max_length: usize) -> SimplePaths<'_> {
        let mut paths = SimplePaths {
            graph: self,
            target: None,
            max_length,
            path: Vec::new(),
            on_path: HashSet::new(),
            stack: Vec::new(),
        };

        if max_length < 2 {
            return paths;
        }

        let (Some((start, outgoing)), Some((target, _))) = (
            self.adjacency.get_key_value(source),
            self.adjacency.get_key_value(destination),
        ) else {
            return paths;
        };

        paths.target = Some(target);
        paths.path.push(start);
        paths.on_path.insert(start);
        paths.stack.push(outgoing.keys());
        paths
    }
}

/// Iterator over simple paths, produced by [`CorridorGraph::all_simple_paths`]
///
/// Depth-bounded backtracking search. The visited set tracks only the nodes
/// of the current path, so a country can appear in many yielded paths but
/// never twice in one.
pub struct SimplePaths<'a> {
    graph: &'a CorridorGraph,
    target: Option<&'a Country>,
    max_length: usize,
    path: Vec<&'a Country>,
    on_path: HashSet<&'a Country>,
    stack: Vec<Keys<'a, Country, Corridor>>,
}

impl<'a> SimplePaths<'a> {
    fn backtrack(&mut self) {
        self.stack.pop();
        if let Some(node) = self.path.pop() {
            self.on_path.remove(node);
        }
    }
}

impl<'a> Iterator for SimplePaths<'a> {
    type Item = Vec<Country>;

    fn next(&mut self) -> Option<Self::Item> {
        let target = self.target?;
        let graph = self.graph;

        while let Some(children) = self.stack.last_mut() {
            let Some(child) = children.next() else {
                self.backtrack();
                continue;
            };

            if self.on_path.contains(child) {
                continue;
            }

            if child == target {
                let mut found: Vec<Country> = self.path.iter().map(|c| (*c).clone()).collect();
                found.push(child.clone());
                return Some(found);
            }

            // Descend only if the child still leaves room for the target.
            if self.path.len() + 2 <= self.max_length {
                if let Some(outgoing) = graph.adjacency.get(child) {
                    self.path.push(child);
                    self.on_path.insert(child);
                    self.stack.push(outgoing.keys());
                }
            }
        }

        None
    }
}
