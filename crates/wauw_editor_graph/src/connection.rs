// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::port::OutputSlot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed connection from one node's output slot to another node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub from_node: NodeId,
    /// Target node ID
    pub to_node: NodeId,
    /// Output port on the source, fixed for the connection's lifetime
    pub slot: OutputSlot,
}

impl Connection {
    /// Create a new connection
    pub fn new(from_node: NodeId, to_node: NodeId, slot: OutputSlot) -> Self {
        Self {
            id: ConnectionId::new(),
            from_node,
            to_node,
            slot,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection links `from` to `to`
    pub fn links(&self, from: NodeId, to: NodeId) -> bool {
        self.from_node == from && self.to_node == to
    }
}
