// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hit-testing of world-space points against the graph.
//!
//! Every lookup walks the nodes top-most first. Composite nodes split
//! their box into a header (drag handle) and a body (content clicks); a
//! header hit anywhere in the graph beats a body hit anywhere.

use crate::geometry::Rect;
use crate::graph::Graph;
use crate::node::{Node, NodeId};

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A node's drag region
    Header(NodeId),
    /// A composite node's content region
    Body(NodeId),
    /// Empty canvas
    Canvas,
}

/// World-space box of a node; `position` is its center
pub fn node_bounds(node: &Node) -> Rect {
    Rect::from_center_size(node.position, node.size)
}

/// Region that starts a drag: the header strip for composite nodes, the
/// whole box otherwise
pub fn header_rect(node: &Node) -> Rect {
    let bounds = node_bounds(node);
    match node.keyboard() {
        Some(layout) => bounds.split_top(layout.header_height).0,
        None => bounds,
    }
}

/// Content region of a composite node
pub fn body_rect(node: &Node) -> Option<Rect> {
    let layout = node.keyboard()?;
    Some(node_bounds(node).split_top(layout.header_height).1)
}

/// Top-most node whose box contains `point`
pub fn pick_node(graph: &Graph, point: [f32; 2]) -> Option<NodeId> {
    graph
        .nodes_topmost_first()
        .find(|n| node_bounds(n).contains(point))
        .map(|n| n.id)
}

/// Top-most node whose drag region contains `point`
pub fn pick_drag_target(graph: &Graph, point: [f32; 2]) -> Option<NodeId> {
    graph
        .nodes_topmost_first()
        .find(|n| header_rect(n).contains(point))
        .map(|n| n.id)
}

/// Top-most composite node whose body contains `point`
pub fn pick_body(graph: &Graph, point: [f32; 2]) -> Option<NodeId> {
    graph
        .nodes_topmost_first()
        .find(|n| body_rect(n).is_some_and(|r| r.contains(point)))
        .map(|n| n.id)
}

/// Resolve a point with drag taking priority over content interaction
pub fn pick(graph: &Graph, point: [f32; 2]) -> Hit {
    if let Some(id) = pick_drag_target(graph, point) {
        Hit::Header(id)
    } else if let Some(id) = pick_body(graph, point) {
        Hit::Body(id)
    } else {
        Hit::Canvas
    }
}

/// Body-local coordinates of a world point on a composite node
pub fn body_local(node: &Node, point: [f32; 2]) -> Option<[f32; 2]> {
    let body = body_rect(node)?;
    Some([point[0] - body.min[0], point[1] - body.min[1]])
}
