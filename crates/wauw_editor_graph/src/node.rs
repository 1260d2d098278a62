// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and the node-kind catalog.

use crate::graph::GraphError;
use crate::keyboard::KeyboardLayout;
use crate::port::Capabilities;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label font size in world units
pub const DEFAULT_FONT_SIZE: f32 = 0.25;

/// Average glyph advance relative to the font size
const GLYPH_ADVANCE: f32 = 0.6;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Signal generators (oscillators, constants, media sources)
    Source,
    /// Signal processors (filters, gain, delay)
    Effect,
    /// Analysis taps
    Analysis,
    /// Destinations
    Output,
    /// Interactive controllers (keyboard)
    Control,
}

/// Composite body attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Composite {
    /// Playable piano keys below a drag header
    Keyboard(KeyboardLayout),
}

impl Composite {
    /// Full node size for this body
    pub fn node_size(&self) -> [f32; 2] {
        match self {
            Self::Keyboard(layout) => layout.node_size(),
        }
    }
}

/// Declared range of an editable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Lower bound (may be `-inf`)
    pub min: f32,
    /// Upper bound (may be `inf`)
    pub max: f32,
    /// Initial value
    pub default: f32,
    /// Knob turns spanning the whole range
    pub max_rotation: f32,
}

impl ParamSpec {
    /// Create a parameter spec with one knob turn
    pub fn new(name: impl Into<String>, min: f32, max: f32, default: f32) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            default,
            max_rotation: 1.0,
        }
    }

    /// Set the knob turn count
    pub fn with_rotation(mut self, turns: f32) -> Self {
        self.max_rotation = turns;
        self
    }
}

/// A parameter value on a node instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Range and defaults
    pub spec: ParamSpec,
    /// Current value
    pub value: f32,
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique kind tag
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Number of input ports
    pub input_port_count: usize,
    /// Number of output ports
    pub output_port_count: usize,
    /// Inputs this kind offers to sources
    pub accepts: Capabilities,
    /// What a target must accept for this kind to output to it
    pub outputs_to: Capabilities,
    /// Editable parameters
    pub params: Vec<ParamSpec>,
    /// Composite body, if any
    pub composite: Option<Composite>,
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind tag
    pub kind: String,
    /// Display name (can be customized)
    pub name: String,
    /// Center of the node in world units
    pub position: [f32; 2],
    /// Size in world units
    pub size: [f32; 2],
    /// Number of input ports
    pub input_port_count: usize,
    /// Number of output ports
    pub output_port_count: usize,
    /// Inputs this node offers to sources
    pub accepts: Capabilities,
    /// What a target must accept for this node to output to it
    pub outputs_to: Capabilities,
    /// Editable parameters
    pub params: Vec<Param>,
    /// Composite body, if any
    pub composite: Option<Composite>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType, font_size: f32) -> Self {
        let size = match &node_type.composite {
            Some(composite) => composite.node_size(),
            None => label_size(&node_type.name, font_size),
        };
        Self {
            id: NodeId::new(),
            kind: node_type.id.clone(),
            name: node_type.name.clone(),
            position: [0.0, 0.0],
            size,
            input_port_count: node_type.input_port_count,
            output_port_count: node_type.output_port_count,
            accepts: node_type.accepts,
            outputs_to: node_type.outputs_to,
            params: node_type
                .params
                .iter()
                .map(|spec| Param { spec: spec.clone(), value: spec.default })
                .collect(),
            composite: node_type.composite,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Move by a world-space delta
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position[0] += dx;
        self.position[1] += dy;
    }

    /// Whether this node is willing to output to `target`
    pub fn wants_output_to(&self, target: &Node) -> bool {
        self.output_port_count > 0
            && target.input_capable()
            && target.accepts.contains(self.outputs_to)
    }

    fn input_capable(&self) -> bool {
        !self.accepts.is_empty()
    }

    /// Get a parameter by name
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.spec.name == name)
    }

    /// Keyboard layout, if this is a keyboard node
    pub fn keyboard(&self) -> Option<&KeyboardLayout> {
        match &self.composite {
            Some(Composite::Keyboard(layout)) => Some(layout),
            None => None,
        }
    }
}

/// Size of a plain node from its label metrics
pub fn label_size(label: &str, font_size: f32) -> [f32; 2] {
    let chars = label.chars().count().max(1) as f32;
    [chars * font_size * GLYPH_ADVANCE, font_size * 2.0]
}

/// Catalog of available node kinds; the factory for new nodes
#[derive(Debug, Clone)]
pub struct NodeCatalog {
    /// Registered node types by kind tag
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            types: indexmap::IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) -> Result<(), GraphError> {
        if self.types.contains_key(&node_type.id) {
            return Err(GraphError::DuplicateKind(node_type.id));
        }
        self.types.insert(node_type.id.clone(), node_type);
        Ok(())
    }

    /// Get a node type by kind tag
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Create a node of the given kind.
    ///
    /// Unknown kinds are refused outright; no partial node is produced.
    pub fn create_node(&self, kind: &str, font_size: f32) -> Result<Node, GraphError> {
        self.get(kind)
            .map(|t| Node::new(t, font_size))
            .ok_or_else(|| GraphError::UnsupportedKind(kind.to_string()))
    }
}

impl Default for NodeCatalog {
    fn default() -> Self {
        Self::new()
    }
}
