//! Point-in-time copy of the registry as a `petgraph` graph.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use weave_common::MetadataId;

use crate::registry::DependencyRegistry;

/// A directed graph copied from a [`DependencyRegistry`].
///
/// Edges point from upstream to downstream, the direction in which change
/// notifications travel.
pub struct GraphSnapshot {
    graph: DiGraph<MetadataId, &'static str>,
}

impl GraphSnapshot {
    /// Copies every edge of `registry`.
    pub fn from_registry(registry: &DependencyRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<MetadataId, NodeIndex> = HashMap::new();
        let mut node = |graph: &mut DiGraph<MetadataId, &'static str>, mid: &MetadataId| {
            *nodes
                .entry(mid.clone())
                .or_insert_with(|| graph.add_node(mid.clone()))
        };
        for (up, down) in registry.edges() {
            let u = node(&mut graph, up);
            let d = node(&mut graph, down);
            graph.add_edge(u, d, "");
        }
        Self { graph }
    }

    /// Returns the number of distinct MIDs in the snapshot.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the snapshot.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns every dependency cycle, each sorted, the list sorted by first member.
    pub fn cycles(&self) -> Vec<Vec<MetadataId>> {
        let mut cycles: Vec<Vec<MetadataId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut mids: Vec<MetadataId> = component
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect();
                mids.sort();
                mids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Renders the snapshot as Graphviz DOT text.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
    }
}
