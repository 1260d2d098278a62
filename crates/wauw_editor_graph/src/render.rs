// SPDX-License-Identifier: MIT OR Apache-2.0
//! What the renderer gets to see.
//!
//! Input handlers never draw. They mark the scene dirty, and once per display
//! refresh the host asks the [`FrameScheduler`] whether a redraw is due.
//! The redraw resolves every node into a screen-space [`NodeView`] and hands
//! it to a [`NodeRenderer`].

use crate::camera::Camera;
use crate::geometry::{round_to, Rect};
use crate::graph::Graph;
use crate::hit::{body_rect, header_rect, node_bounds};
use crate::node::{Node, NodeId};
use crate::port::{OutputSlot, PortDirection};

/// Dirty flag debouncing redraws against the display refresh
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    needs_render: bool,
    frames: u64,
}

impl FrameScheduler {
    /// Create a scheduler that renders on the first tick
    pub fn new() -> Self {
        Self {
            needs_render: true,
            frames: 0,
        }
    }

    /// Request a redraw on the next tick
    pub fn mark_dirty(&mut self) {
        self.needs_render = true;
    }

    /// Whether a redraw is pending
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Per-frame check: returns `true` (and clears the flag) if a redraw is due
    pub fn tick(&mut self) -> bool {
        if !self.needs_render {
            return false;
        }
        self.needs_render = false;
        self.frames += 1;
        true
    }

    /// Number of redraws performed so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

/// One outgoing edge resolved to screen space
#[derive(Debug, Clone, PartialEq)]
pub struct OutputView {
    /// Output port on the source
    pub slot: OutputSlot,
    /// Target node
    pub target: NodeId,
    /// Screen position of the source's output port marker
    pub from: [f32; 2],
    /// Screen position of the target's input marker
    pub to: [f32; 2],
    /// Edge color
    pub color: [u8; 3],
}

/// A node resolved to screen space
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    /// Node ID
    pub id: NodeId,
    /// Kind tag
    pub kind: String,
    /// Label
    pub name: String,
    /// Screen-space box
    pub screen_rect: Rect,
    /// Whether the node has a composite body
    pub composite: bool,
    /// Screen-space drag header for composite nodes
    pub header_rect: Option<Rect>,
    /// Number of input ports
    pub input_ports: usize,
    /// Number of output ports
    pub output_ports: usize,
    /// Outgoing edges in slot order
    pub outputs: Vec<OutputView>,
    /// Whether this is the active selection
    pub selected: bool,
    /// Current zoom, for scaling strokes and text
    pub zoom: f32,
}

/// Drawing backend for nodes and edges
pub trait NodeRenderer {
    /// Draw the background grid, given as screen-space line offsets
    fn render_grid(&mut self, _grid: &GridLines) {}

    /// Draw one edge
    fn render_edge(&mut self, edge: &OutputView);

    /// Draw one node; called bottom-most first
    fn render_node(&mut self, node: &NodeView, model: &Node);
}

/// Screen position of port `index` out of `count` on one side of `rect`
pub fn port_anchor(rect: Rect, direction: PortDirection, index: usize, count: usize) -> [f32; 2] {
    let count = count.max(1);
    let index = index.min(count - 1);
    let step = rect.height() / count as f32;
    let y = rect.min[1] + step * (index as f32 + 0.5);
    match direction {
        PortDirection::Input => [rect.min[0], y],
        PortDirection::Output => [rect.max[0], y],
    }
}

fn screen_rect(camera: &Camera, world: Rect) -> Rect {
    Rect {
        min: camera.world_to_screen(world.min),
        max: camera.world_to_screen(world.max),
    }
}

/// Resolve every node into screen space, bottom-most first
pub fn node_views(graph: &Graph, camera: &Camera, selected: Option<NodeId>) -> Vec<NodeView> {
    graph
        .nodes()
        .map(|node| {
            let rect = screen_rect(camera, node_bounds(node));
            let outputs = graph
                .connections_from(node.id)
                .into_iter()
                .filter_map(|c| {
                    let target = graph.node(c.to_node)?;
                    let target_rect = screen_rect(camera, node_bounds(target));
                    Some(OutputView {
                        slot: c.slot,
                        target: c.to_node,
                        from: port_anchor(rect, PortDirection::Output, c.slot.0, node.output_port_count),
                        to: port_anchor(target_rect, PortDirection::Input, 0, target.input_port_count),
                        color: node.outputs_to.color(),
                    })
                })
                .collect();

            NodeView {
                id: node.id,
                kind: node.kind.clone(),
                name: node.name.clone(),
                screen_rect: rect,
                composite: node.composite.is_some(),
                header_rect: body_rect(node).map(|_| screen_rect(camera, header_rect(node))),
                input_ports: node.input_port_count,
                output_ports: node.output_port_count,
                outputs,
                selected: selected == Some(node.id),
                zoom: camera.zoom(),
            }
        })
        .collect()
}

/// Screen-space snapshot of the graph, rebuilt only when the scene is dirty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Background grid, if enabled
    pub grid: Option<GridLines>,
    /// Nodes bottom-most first
    pub nodes: Vec<NodeView>,
}

impl Scene {
    /// Resolve the graph against the camera
    pub fn build(graph: &Graph, camera: &Camera, selected: Option<NodeId>, grid_spacing: Option<f32>) -> Self {
        Self {
            grid: grid_spacing.map(|spacing| grid_lines(camera, spacing)),
            nodes: node_views(graph, camera, selected),
        }
    }

    /// Draw grid, then edges, then nodes in z-order.
    ///
    /// Nodes removed since the snapshot was built are skipped.
    pub fn draw(&self, graph: &Graph, renderer: &mut dyn NodeRenderer) {
        if let Some(grid) = &self.grid {
            renderer.render_grid(grid);
        }
        for view in &self.nodes {
            for edge in &view.outputs {
                renderer.render_edge(edge);
            }
        }
        for view in &self.nodes {
            if let Some(node) = graph.node(view.id) {
                renderer.render_node(view, node);
            }
        }
    }
}

/// Build and draw the scene in one go
pub fn render_scene(
    graph: &Graph,
    camera: &Camera,
    selected: Option<NodeId>,
    grid_spacing: Option<f32>,
    renderer: &mut dyn NodeRenderer,
) {
    Scene::build(graph, camera, selected, grid_spacing).draw(graph, renderer);
}

/// Grid line positions in screen pixels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLines {
    /// x coordinates of vertical lines
    pub vertical: Vec<f32>,
    /// y coordinates of horizontal lines
    pub horizontal: Vec<f32>,
}

/// Upper bound on lines per axis, so a tiny spacing cannot stall a frame
const MAX_GRID_LINES: usize = 2048;

/// Lines every `spacing` world units across the visible area
pub fn grid_lines(camera: &Camera, spacing: f32) -> GridLines {
    if spacing <= 0.0 || !spacing.is_finite() {
        return GridLines::default();
    }
    let visible = camera.visible_world_rect();
    let axis = |min: f32, max: f32, to_screen: &dyn Fn(f32) -> f32| {
        let mut lines = Vec::new();
        let mut world = round_to(min, spacing);
        while world < max && lines.len() < MAX_GRID_LINES {
            if world >= min {
                lines.push(to_screen(world));
            }
            world += spacing;
        }
        lines
    };
    GridLines {
        vertical: axis(visible.min[0], visible.max[0], &|x| camera.world_to_screen([x, 0.0])[0]),
        horizontal: axis(visible.min[1], visible.max[1], &|y| camera.world_to_screen([0.0, y])[1]),
    }
}
