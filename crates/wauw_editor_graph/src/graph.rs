// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! Node insertion order is the z-order: later nodes render on top and are
//! hit-tested first. Connections live in one canonical edge set; each
//! source's outputs are a view derived from it, ordered by output slot.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::port::OutputSlot;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in z-order
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Whether a node may output to itself
    allow_self_connection: bool,
}

/// Result of toggling the edge between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionToggle {
    /// The edge was created
    Connected,
    /// The existing edge was removed
    Disconnected,
    /// Neither happened (self-connection, capability mismatch, missing node)
    Rejected,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            allow_self_connection: false,
        }
    }

    /// Allow or forbid edges from a node to itself
    pub fn set_allow_self_connection(&mut self, allow: bool) {
        self.allow_self_connection = allow;
    }

    /// Whether self-connections are allowed
    pub fn allows_self_connection(&self) -> bool {
        self.allow_self_connection
    }

    /// Add a node on top of the z-order
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        tracing::debug!("Adding node {} ({:?})", node.name, id);
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections, keeping the order of the rest
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// All nodes, bottom-most first
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    /// All nodes, top-most first
    pub fn nodes_topmost_first(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().rev()
    }

    /// Get all node IDs in z-order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connect `from` to `to`.
    ///
    /// Returns `false` without touching the graph if the edge already
    /// exists, if it would be a forbidden self-connection, or if `from` does
    /// not want to output to `to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> bool {
        let (Some(source), Some(target)) = (self.nodes.get(&from), self.nodes.get(&to)) else {
            tracing::debug!("Connect rejected: unknown node");
            return false;
        };

        if from == to && !self.allow_self_connection {
            tracing::debug!("Connect rejected: self-connection on {}", source.name);
            return false;
        }

        if self.is_connected(from, to) {
            tracing::debug!("Connect rejected: {} already outputs to {}", source.name, target.name);
            return false;
        }

        if !source.wants_output_to(target) {
            tracing::debug!("Connect rejected: {} does not output to {}", source.name, target.name);
            return false;
        }

        let slot = self.free_slot(from);
        tracing::debug!("Connecting {} -> {} on slot {}", source.name, target.name, slot.0);
        let connection = Connection::new(from, to, slot);
        self.connections.insert(connection.id, connection);
        true
    }

    /// Remove the edge `from -> to`; `false` if there was none
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) -> bool {
        let Some(id) = self.connection_between(from, to).map(|c| c.id) else {
            return false;
        };
        tracing::debug!("Disconnecting {:?} -> {:?}", from, to);
        self.connections.shift_remove(&id).is_some()
    }

    /// Connect if unconnected, otherwise disconnect
    pub fn toggle_connection(&mut self, from: NodeId, to: NodeId) -> ConnectionToggle {
        if self.disconnect(from, to) {
            ConnectionToggle::Disconnected
        } else if self.connect(from, to) {
            ConnectionToggle::Connected
        } else {
            ConnectionToggle::Rejected
        }
    }

    /// Whether the edge `from -> to` exists
    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.connection_between(from, to).is_some()
    }

    /// The edge `from -> to`, if any
    pub fn connection_between(&self, from: NodeId, to: NodeId) -> Option<&Connection> {
        self.connections.values().find(|c| c.links(from, to))
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Outgoing connections of a node, ordered by output slot
    pub fn connections_from(&self, node_id: NodeId) -> Vec<&Connection> {
        let mut out: Vec<_> = self
            .connections
            .values()
            .filter(|c| c.from_node == node_id)
            .collect();
        out.sort_by_key(|c| c.slot);
        out
    }

    /// Targets of a node in output-slot order
    pub fn outputs(&self, node_id: NodeId) -> Vec<NodeId> {
        self.connections_from(node_id)
            .into_iter()
            .map(|c| c.to_node)
            .collect()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Smallest output slot on `node_id` not held by a live connection
    fn free_slot(&self, node_id: NodeId) -> OutputSlot {
        let used: Vec<OutputSlot> = self
            .connections
            .values()
            .filter(|c| c.from_node == node_id)
            .map(|c| c.slot)
            .collect();
        let mut slot = 0;
        while used.contains(&OutputSlot(slot)) {
            slot += 1;
        }
        OutputSlot(slot)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Graph and catalog errors
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// No node kind with this tag is registered
    #[error("Node kind {0:?} is not handled")]
    UnsupportedKind(String),

    /// A kind with this tag is already registered
    #[error("Node kind {0:?} is already registered")]
    DuplicateKind(String),

    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeCategory, NodeType};
    use crate::port::Capabilities;

    fn audio_type(inputs: usize, outputs: usize) -> NodeType {
        NodeType {
            id: "gain".to_string(),
            name: "gain".to_string(),
            category: NodeCategory::Effect,
            description: String::new(),
            input_port_count: inputs,
            output_port_count: outputs,
            accepts: if inputs > 0 { Capabilities::AUDIO } else { Capabilities::NONE },
            outputs_to: Capabilities::AUDIO,
            params: Vec::new(),
            composite: None,
        }
    }

    fn graph_with(count: usize) -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::default();
        let ids = (0..count)
            .map(|_| graph.add_node(Node::new(&audio_type(1, 1), 0.25)))
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_double_connect_keeps_one_edge() {
        let (mut graph, ids) = graph_with(2);
        assert!(graph.connect(ids[0], ids[1]));
        assert!(!graph.connect(ids[0], ids[1]));
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.outputs(ids[0]), vec![ids[1]]);
    }

    #[test]
    fn test_connect_then_disconnect_restores_outputs() {
        let (mut graph, ids) = graph_with(5);
        assert!(graph.connect(ids[0], ids[1]));
        assert!(graph.connect(ids[0], ids[2]));
        assert!(graph.connect(ids[0], ids[3]));
        let before = graph.outputs(ids[0]);

        assert!(graph.connect(ids[0], ids[4]));
        assert!(graph.disconnect(ids[0], ids[4]));
        assert_eq!(graph.outputs(ids[0]), before);
    }

    #[test]
    fn test_slots_are_stable_across_removal() {
        let (mut graph, ids) = graph_with(4);
        graph.connect(ids[0], ids[1]);
        graph.connect(ids[0], ids[2]);
        graph.connect(ids[0], ids[3]);

        assert!(graph.disconnect(ids[0], ids[1]));
        let slot_of = |g: &Graph, to| g.connection_between(ids[0], to).map(|c| c.slot);
        assert_eq!(slot_of(&graph, ids[2]), Some(OutputSlot(1)));
        assert_eq!(slot_of(&graph, ids[3]), Some(OutputSlot(2)));

        // The freed slot is reused by the next new edge
        graph.connect(ids[0], ids[1]);
        assert_eq!(slot_of(&graph, ids[1]), Some(OutputSlot(0)));
        assert_eq!(graph.outputs(ids[0]), vec![ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn test_self_connection_is_configurable() {
        let (mut graph, ids) = graph_with(1);
        assert!(!graph.connect(ids[0], ids[0]));
        assert_eq!(graph.connection_count(), 0);

        graph.set_allow_self_connection(true);
        assert!(graph.connect(ids[0], ids[0]));
    }

    #[test]
    fn test_disconnect_missing_edge() {
        let (mut graph, ids) = graph_with(2);
        assert!(!graph.disconnect(ids[0], ids[1]));
    }

    #[test]
    fn test_capability_mismatch_is_rejected() {
        let mut graph = Graph::default();
        let source = graph.add_node(Node::new(&audio_type(1, 1), 0.25));
        let oscillator = graph.add_node(Node::new(&audio_type(0, 1), 0.25));
        assert!(!graph.connect(source, oscillator));
        assert_eq!(graph.toggle_connection(source, oscillator), ConnectionToggle::Rejected);
    }

    #[test]
    fn test_toggle_connection() {
        let (mut graph, ids) = graph_with(2);
        assert_eq!(graph.toggle_connection(ids[0], ids[1]), ConnectionToggle::Connected);
        assert_eq!(graph.toggle_connection(ids[0], ids[1]), ConnectionToggle::Disconnected);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_remove_node_drops_edges_and_keeps_order() {
        let (mut graph, ids) = graph_with(3);
        graph.connect(ids[0], ids[1]);
        graph.connect(ids[1], ids[2]);
        graph.remove_node(ids[1]);

        assert_eq!(graph.connection_count(), 0);
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![ids[0], ids[2]]);
    }
}
