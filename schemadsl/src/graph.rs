//! Connectivity graph.
//!
//! A petgraph DiGraph over the snapshot: component and net nodes, with one
//! pin-labelled edge per net member. The librarian runs its 1-hop context
//! traversal over this instead of rescanning member lists.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::model::{Component, Net};

/// Node payload: an index into the snapshot's component or net vector.
#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Component(usize),
    Net(usize),
}

/// Pin designator carried on each component→net edge.
type PinEdge = String;

#[derive(Debug, Default)]
pub struct ConnectivityGraph {
    graph: DiGraph<NodeKind, PinEdge>,
    component_indices: HashMap<String, NodeIndex>,
    net_indices: HashMap<String, NodeIndex>,
}

impl ConnectivityGraph {
    /// Build the bipartite graph: edges run from components to nets, one
    /// per member pin.
    pub fn build(components: &[Component], nets: &[Net]) -> Self {
        let mut graph = DiGraph::new();
        let mut component_indices = HashMap::new();
        let mut net_indices = HashMap::new();

        for (idx, component) in components.iter().enumerate() {
            let node = graph.add_node(NodeKind::Component(idx));
            component_indices.insert(component.refdes.clone(), node);
        }
        for (idx, net) in nets.iter().enumerate() {
            let node = graph.add_node(NodeKind::Net(idx));
            net_indices.insert(net.name.clone(), node);
            for member in &net.members {
                if let Some(&comp_node) = component_indices.get(&member.refdes) {
                    graph.add_edge(comp_node, node, member.pin.clone());
                }
            }
        }

        Self {
            graph,
            component_indices,
            net_indices,
        }
    }

    /// Indices (into the snapshot's net vector) of every net a component
    /// touches, deduplicated.
    pub fn nets_for_component(&self, refdes: &str) -> Vec<usize> {
        let Some(&node) = self.component_indices.get(refdes) else {
            return Vec::new();
        };
        let mut seen = Vec::new();
        for edge in self.graph.edges_directed(node, Direction::Outgoing) {
            if let Some(NodeKind::Net(idx)) = self.graph.node_weight(edge.target()) {
                if !seen.contains(idx) {
                    seen.push(*idx);
                }
            }
        }
        seen
    }

    /// Indices (into the snapshot's component vector) of every component on
    /// a net, deduplicated.
    pub fn components_on_net(&self, net_name: &str) -> Vec<usize> {
        let Some(&node) = self.net_indices.get(net_name) else {
            return Vec::new();
        };
        let mut seen = Vec::new();
        for edge in self.graph.edges_directed(node, Direction::Incoming) {
            if let Some(NodeKind::Component(idx)) = self.graph.node_weight(edge.source()) {
                if !seen.contains(idx) {
                    seen.push(*idx);
                }
            }
        }
        seen
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
